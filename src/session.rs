//! The card editing session: one card, its preview, and its exporter.

use std::sync::Arc;

use tokio::sync::watch;

use crate::barcode::BarcodeSurface;
use crate::card::CardSpec;
use crate::color::HexColor;
use crate::config::RendererConfig;
use crate::error::{CaptureError, ColorError};
use crate::export::{
    DownloadStatus, ExportArtifact, ExportOutcome, Exporter, Platform, RegionCapture, SvgSnapshot,
};
use crate::layout::CardLayout;
use crate::profile::CardProfile;

/// Owns the card being edited and everything derived from it.
///
/// The barcode surface is redrawn whenever the barcode value changes, so
/// the composed preview always shows the last value that encoded.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use loyalty_card_renderer::{CardSession, FsPlatform, RendererConfig};
///
/// # async fn run() {
/// let platform = Arc::new(FsPlatform::new("cards"));
/// let mut session = CardSession::new(&RendererConfig::default(), platform);
///
/// session.set_brand_name("Coffee Club");
/// session.set_barcode_value("9780201379624");
/// session.set_header_color_str("#7c2d12").unwrap();
///
/// let outcome = session.export().await;
/// assert!(outcome.is_delivered());
/// # }
/// ```
pub struct CardSession {
    spec: CardSpec,
    layout: CardLayout,
    surface: BarcodeSurface,
    exporter: Exporter,
    preview_url: Option<String>,
}

impl CardSession {
    /// Creates a session that captures with resvg.
    pub fn new(config: &RendererConfig, platform: Arc<dyn Platform>) -> Self {
        let capture = SvgSnapshot::from_config(&config.export);
        Self::with_capture(config, Box::new(capture), platform)
    }

    /// Creates a session with a custom capture step.
    pub fn with_capture(
        config: &RendererConfig,
        capture: Box<dyn RegionCapture>,
        platform: Arc<dyn Platform>,
    ) -> Self {
        let spec = CardSpec::default();
        let mut surface = BarcodeSurface::new(config.barcode.clone());
        surface.render(spec.barcode_value());

        Self {
            spec,
            layout: CardLayout::default(),
            surface,
            exporter: Exporter::new(&config.export, capture, platform),
            preview_url: None,
        }
    }

    pub fn spec(&self) -> &CardSpec {
        &self.spec
    }

    pub fn layout(&self) -> &CardLayout {
        &self.layout
    }

    pub fn surface(&self) -> &BarcodeSurface {
        &self.surface
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    // ---- Inputs ----

    pub fn set_brand_name(&mut self, name: &str) {
        self.spec.set_brand_name(name);
    }

    /// Updates the barcode value and redraws the barcode surface.
    pub fn set_barcode_value(&mut self, value: &str) {
        self.spec.set_barcode_value(value);
        self.surface.render(self.spec.barcode_value());
    }

    pub fn set_header_color(&mut self, color: HexColor) {
        self.spec.header_color = color;
    }

    /// Parses and sets the header color; an invalid string changes nothing.
    pub fn set_header_color_str(&mut self, color: &str) -> Result<(), ColorError> {
        self.spec.header_color = HexColor::parse(color)?;
        Ok(())
    }

    pub fn set_text_dark(&mut self, dark: bool) {
        self.spec.text_is_dark = dark;
    }

    /// Applies every field of a profile through the regular setters.
    pub fn apply_profile(&mut self, profile: &CardProfile) -> Result<(), ColorError> {
        let color = HexColor::parse(&profile.header_color)?;
        self.set_brand_name(&profile.brand_name);
        self.set_barcode_value(&profile.barcode_value);
        self.set_header_color(color);
        self.set_text_dark(profile.text_is_dark);
        Ok(())
    }

    pub fn export_profile(&self) -> CardProfile {
        CardProfile::from(&self.spec)
    }

    // ---- Outputs ----

    /// The current preview region as SVG.
    pub fn compose_svg(&self) -> String {
        self.layout.compose(&self.spec, self.surface.glyph())
    }

    pub fn status(&self) -> DownloadStatus {
        self.exporter.status()
    }

    pub fn subscribe(&self) -> watch::Receiver<DownloadStatus> {
        self.exporter.subscribe()
    }

    /// Captures the current preview and delivers it to the user.
    pub async fn export(&self) -> ExportOutcome {
        let region = self.compose_svg();
        let filename = self.spec.filename();
        self.exporter.export(&region, &filename).await
    }

    // ---- Preview overlay ----

    /// Captures the current preview for the overlay without delivering it.
    pub async fn open_preview(&mut self) -> Result<(), CaptureError> {
        let snapshot = SvgSnapshot::new(1.0, 1.0);
        let artifact = snapshot.capture(&self.compose_svg()).await?;
        self.show_preview(&artifact);
        Ok(())
    }

    pub fn show_preview(&mut self, artifact: &ExportArtifact) {
        self.preview_url = Some(artifact.data_url());
    }

    /// The overlay image URL; the overlay is visible while this is set.
    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    /// Closes the overlay (close button or click outside).
    pub fn dismiss_preview(&mut self) {
        self.preview_url = None;
    }
}
