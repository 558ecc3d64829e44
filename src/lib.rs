//! loyalty-card-renderer: Loyalty card composition and image export
//!
//! This crate composes a loyalty card (colored header with a brand name,
//! a Code 128 barcode and its printed value) and exports it as a PNG
//! through whichever delivery channel the platform supports.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use loyalty_card_renderer::{CardSession, DownloadStatus, FsPlatform, RendererConfig};
//!
//! # async fn run() {
//! let platform = Arc::new(FsPlatform::new("cards"));
//! let mut session = CardSession::new(&RendererConfig::default(), platform);
//!
//! // Inputs are truncated to their limits and redraw the preview
//! session.set_brand_name("Coffee Club");
//! session.set_barcode_value("9780201379624");
//! session.set_text_dark(true);
//!
//! // Writes cards/coffee-club-card.png
//! let outcome = session.export().await;
//! assert!(outcome.is_delivered());
//! assert_eq!(session.status(), DownloadStatus::Succeeded);
//! # }
//! ```
//!
//! # Serializable Profiles
//!
//! For handing the form inputs across a process boundary, use
//! [`CardProfile`]:
//!
//! ```
//! use loyalty_card_renderer::CardProfile;
//!
//! let profile = CardProfile {
//!     brand_name: "Coffee Club".into(),
//!     ..CardProfile::default()
//! };
//! let spec = profile.to_spec().unwrap();
//! assert_eq!(spec.filename(), "coffee-club-card.png");
//! ```

mod barcode;
mod card;
mod color;
mod config;
mod error;
mod export;
mod geometry;
mod layout;
mod profile;
mod raster;
mod session;

pub use barcode::code128;
pub use barcode::{BarcodeGlyph, BarcodeOptions, BarcodeSurface};
pub use card::{CardSpec, MAX_BARCODE_CHARS, MAX_BRAND_NAME_CHARS, export_filename};
pub use color::{DARK_TEXT, HexColor, LIGHT_TEXT};
pub use config::{ExportConfig, RendererConfig};
pub use error::{
    CaptureError, ColorError, ConfigError, DeliveryError, EncodingError, ExportError,
};
pub use export::{
    Capabilities, ChannelKind, DeliveryChannel, DirectDownload, DownloadStatus, ExportArtifact,
    ExportOutcome, Exporter, FsPlatform, NativeShare, ObjectUrl, Platform, RegionCapture,
    ShareRequest, SvgSnapshot, select_channel,
};
pub use geometry::{RectPx, SizePx};
pub use layout::CardLayout;
pub use profile::CardProfile;
pub use raster::{encode_png, rasterize_svg, system_fonts};
pub use session::CardSession;
