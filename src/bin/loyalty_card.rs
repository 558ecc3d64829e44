//! loyalty-card CLI - compose a loyalty card and save it as PNG
//!
//! Outputs a JSON summary to stdout, logs to stderr.
//! Returns non-zero when the card could not be exported.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use loyalty_card_renderer::{CardProfile, CardSession, ExportOutcome, FsPlatform, RendererConfig};

#[derive(Parser)]
#[command(name = "loyalty-card")]
#[command(about = "Compose a loyalty card and export it as an image")]
struct Cli {
    /// Brand name shown in the header (max 20 characters)
    #[arg(short, long)]
    brand: Option<String>,

    /// Barcode value (max 13 characters)
    #[arg(long)]
    barcode: Option<String>,

    /// Header color, e.g. "#3b82f6"
    #[arg(short, long)]
    color: Option<String>,

    /// Draw the brand name in dark text
    #[arg(long)]
    dark_text: bool,

    /// JSON payload (CardProfile), applied before the other flags
    #[arg(short, long)]
    profile: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the card is saved into
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Browser user-agent to emulate when choosing a delivery channel
    #[arg(long)]
    user_agent: Option<String>,

    /// Print the composed SVG instead of exporting
    #[arg(long)]
    svg: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = match &cli.config {
        Some(path) => match RendererConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to load config");
                return ExitCode::FAILURE;
            }
        },
        None => RendererConfig::default(),
    };

    let mut platform = FsPlatform::new(&cli.out_dir);
    if let Some(user_agent) = &cli.user_agent {
        platform = platform.with_user_agent(user_agent);
    }
    let mut session = CardSession::new(&config, Arc::new(platform));

    if let Err(message) = apply_inputs(&mut session, &cli) {
        let output = serde_json::json!({ "success": false, "error": message });
        println!("{output}");
        return ExitCode::from(2);
    }

    if cli.svg {
        println!("{}", session.compose_svg());
        return ExitCode::SUCCESS;
    }

    match session.export().await {
        ExportOutcome::Delivered { filename, channel } => {
            let output = serde_json::json!({
                "success": true,
                "filename": filename,
                "channel": channel.to_string(),
                "outDir": cli.out_dir.display().to_string(),
            });
            println!("{output}");
            ExitCode::SUCCESS
        }
        ExportOutcome::Failed(e) => {
            let output = serde_json::json!({ "success": false, "error": e.to_string() });
            println!("{output}");
            ExitCode::FAILURE
        }
        ExportOutcome::Ignored => ExitCode::FAILURE,
    }
}

/// Applies the profile payload, then the individual flags on top of it.
fn apply_inputs(session: &mut CardSession, cli: &Cli) -> Result<(), String> {
    if let Some(payload) = &cli.profile {
        let profile =
            CardProfile::from_json(payload).map_err(|e| format!("Invalid profile: {e}"))?;
        session.apply_profile(&profile).map_err(|e| e.to_string())?;
    }
    if let Some(brand) = &cli.brand {
        session.set_brand_name(brand);
    }
    if let Some(barcode) = &cli.barcode {
        session.set_barcode_value(barcode);
    }
    if let Some(color) = &cli.color {
        session.set_header_color_str(color).map_err(|e| e.to_string())?;
    }
    if cli.dark_text {
        session.set_text_dark(true);
    }
    Ok(())
}
