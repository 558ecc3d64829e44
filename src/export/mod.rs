//! Snapshot export: capture the card region, deliver it, report status.
//!
//! # Status lifecycle
//!
//! ```text
//!            export()                delivered            reset delay
//!   Idle ──────────────► InProgress ───────────► Succeeded ─────────► Idle
//!    ▲                      │
//!    └──────────────────────┘ capture or delivery failed
//! ```
//!
//! An export requested while another is in progress is ignored. The reset
//! back to Idle runs on a timer task; starting a new export cancels it.

pub mod delivery;
pub mod platform;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use resvg::usvg::fontdb;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub use delivery::{ChannelKind, DeliveryChannel, DirectDownload, NativeShare, select_channel};
pub use platform::{Capabilities, FsPlatform, ObjectUrl, Platform, ShareRequest};

use crate::config::ExportConfig;
use crate::error::{CaptureError, ExportError};
use crate::geometry::SizePx;
use crate::raster::{self, PNG_MIME};

// ============================================================================
// DownloadStatus
// ============================================================================

/// Export status shown on the download button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadStatus {
    #[default]
    Idle,
    InProgress,
    Succeeded,
}

impl DownloadStatus {
    /// Button label for this status.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Download Card",
            Self::InProgress => "Generating...",
            Self::Succeeded => "Downloaded Successfully",
        }
    }

    /// The trigger is disabled while an export runs.
    pub fn accepts_trigger(&self) -> bool {
        *self != Self::InProgress
    }
}

// ============================================================================
// ExportArtifact
// ============================================================================

/// A captured raster image of the card region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub size: SizePx,
}

impl ExportArtifact {
    pub fn png(bytes: Vec<u8>, size: SizePx) -> Self {
        Self {
            bytes,
            mime_type: PNG_MIME,
            size,
        }
    }

    /// Inline `data:` URL, used for the preview overlay.
    pub fn data_url(&self) -> String {
        raster::data_url(&self.bytes, self.mime_type)
    }
}

// ============================================================================
// RegionCapture
// ============================================================================

/// Rasterizes a composed card region.
#[async_trait]
pub trait RegionCapture: Send + Sync {
    async fn capture(&self, region_svg: &str) -> Result<ExportArtifact, CaptureError>;
}

/// Captures the region with resvg and encodes it as PNG.
pub struct SvgSnapshot {
    quality: f32,
    pixel_ratio: f32,
    fonts: Option<Arc<fontdb::Database>>,
}

impl SvgSnapshot {
    pub fn new(quality: f32, pixel_ratio: f32) -> Self {
        Self {
            quality: quality.clamp(0.0, 1.0),
            pixel_ratio: pixel_ratio.max(0.0),
            fonts: None,
        }
    }

    /// Builds a snapshotter from config, loading system fonts if enabled.
    pub fn from_config(config: &ExportConfig) -> Self {
        let snapshot = Self::new(config.quality, config.pixel_ratio);
        if config.system_fonts {
            snapshot.with_fonts(raster::system_fonts())
        } else {
            snapshot
        }
    }

    pub fn with_fonts(mut self, fonts: Arc<fontdb::Database>) -> Self {
        self.fonts = Some(fonts);
        self
    }
}

#[async_trait]
impl RegionCapture for SvgSnapshot {
    async fn capture(&self, region_svg: &str) -> Result<ExportArtifact, CaptureError> {
        let image = raster::rasterize_svg(region_svg, self.pixel_ratio, self.fonts.as_ref())?;
        let bytes = raster::encode_png(&image, self.quality)?;
        Ok(ExportArtifact::png(
            bytes,
            SizePx::new(image.width(), image.height()),
        ))
    }
}

// ============================================================================
// Exporter
// ============================================================================

/// Result of one call to [`Exporter::export`].
#[derive(Debug)]
pub enum ExportOutcome {
    /// Another export was in progress; nothing happened.
    Ignored,
    Delivered {
        filename: String,
        channel: ChannelKind,
    },
    /// The status went back to Idle without reaching Succeeded.
    Failed(ExportError),
}

impl ExportOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Drives the export state machine.
pub struct Exporter {
    capture: Box<dyn RegionCapture>,
    platform: Arc<dyn Platform>,
    status: Arc<watch::Sender<DownloadStatus>>,
    reset_timer: Mutex<Option<JoinHandle<()>>>,
    reset_delay: Duration,
    share_title: String,
}

impl Exporter {
    pub fn new(
        config: &ExportConfig,
        capture: Box<dyn RegionCapture>,
        platform: Arc<dyn Platform>,
    ) -> Self {
        let (status, _) = watch::channel(DownloadStatus::Idle);
        Self {
            capture,
            platform,
            status: Arc::new(status),
            reset_timer: Mutex::new(None),
            reset_delay: config.reset_delay(),
            share_title: config.share_title.clone(),
        }
    }

    pub fn status(&self) -> DownloadStatus {
        *self.status.borrow()
    }

    /// Subscribes to status changes.
    pub fn subscribe(&self) -> watch::Receiver<DownloadStatus> {
        self.status.subscribe()
    }

    /// Captures `region_svg` and delivers it as `filename`.
    ///
    /// Must run inside a tokio runtime: a successful export spawns the timer
    /// that resets the status to Idle.
    pub async fn export(&self, region_svg: &str, filename: &str) -> ExportOutcome {
        let started = self.status.send_if_modified(|status| {
            if status.accepts_trigger() {
                *status = DownloadStatus::InProgress;
                true
            } else {
                false
            }
        });
        if !started {
            tracing::debug!("export already in progress, ignoring trigger");
            return ExportOutcome::Ignored;
        }
        self.cancel_reset();
        tracing::debug!(filename, "export started");
        let guard = InProgressGuard::new(&self.status);

        let result = self.capture_and_deliver(region_svg, filename).await;
        guard.disarm();
        match result {
            Ok(channel) => {
                self.status.send_replace(DownloadStatus::Succeeded);
                tracing::info!(filename, %channel, "card exported");
                self.schedule_reset();
                ExportOutcome::Delivered {
                    filename: filename.to_string(),
                    channel,
                }
            }
            Err(error) => {
                tracing::error!(%error, "error generating image");
                self.status.send_replace(DownloadStatus::Idle);
                ExportOutcome::Failed(error)
            }
        }
    }

    async fn capture_and_deliver(
        &self,
        region_svg: &str,
        filename: &str,
    ) -> Result<ChannelKind, ExportError> {
        let artifact = self.capture.capture(region_svg).await?;
        tracing::debug!(
            width = artifact.size.width,
            height = artifact.size.height,
            bytes = artifact.bytes.len(),
            "region captured"
        );

        let channel = select_channel(self.platform.capabilities(), &self.share_title);
        channel
            .deliver(&*self.platform, &artifact, filename)
            .await?;
        Ok(channel.kind())
    }

    fn schedule_reset(&self) {
        let status = Arc::clone(&self.status);
        let delay = self.reset_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            status.send_if_modified(|status| {
                if *status == DownloadStatus::Succeeded {
                    *status = DownloadStatus::Idle;
                    true
                } else {
                    false
                }
            });
        });
        if let Some(previous) = self.timer().replace(handle) {
            previous.abort();
        }
    }

    fn cancel_reset(&self) {
        if let Some(pending) = self.timer().take() {
            pending.abort();
        }
    }

    fn timer(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.reset_timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the status to Idle if an export future is dropped mid-flight.
struct InProgressGuard<'a> {
    status: &'a watch::Sender<DownloadStatus>,
    armed: bool,
}

impl<'a> InProgressGuard<'a> {
    fn new(status: &'a watch::Sender<DownloadStatus>) -> Self {
        Self {
            status,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let reset = self.status.send_if_modified(|status| {
            if *status == DownloadStatus::InProgress {
                *status = DownloadStatus::Idle;
                true
            } else {
                false
            }
        });
        if reset {
            tracing::warn!("export abandoned before completion, status reset");
        }
    }
}

impl Drop for Exporter {
    fn drop(&mut self) {
        self.cancel_reset();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Counts captures and yields once so concurrent triggers interleave.
    #[derive(Default)]
    struct CountingCapture {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl RegionCapture for CountingCapture {
        async fn capture(&self, _region_svg: &str) -> Result<ExportArtifact, CaptureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail {
                Err(CaptureError::Parse("tainted canvas".into()))
            } else {
                Ok(ExportArtifact::png(vec![0x89], SizePx::new(320, 400)))
            }
        }
    }

    struct SharedCapture(Arc<CountingCapture>);

    #[async_trait]
    impl RegionCapture for SharedCapture {
        async fn capture(&self, region_svg: &str) -> Result<ExportArtifact, CaptureError> {
            self.0.capture(region_svg).await
        }
    }

    fn exporter(capture: Arc<CountingCapture>, dir: &std::path::Path) -> Exporter {
        Exporter::new(
            &ExportConfig::default(),
            Box::new(SharedCapture(capture)),
            Arc::new(FsPlatform::new(dir)),
        )
    }

    #[test]
    fn status_labels() {
        assert_eq!(DownloadStatus::Idle.label(), "Download Card");
        assert_eq!(DownloadStatus::InProgress.label(), "Generating...");
        assert!(!DownloadStatus::InProgress.accepts_trigger());
        assert!(DownloadStatus::Succeeded.accepts_trigger());
    }

    #[test]
    fn artifact_data_url() {
        let artifact = ExportArtifact::png(vec![0, 0, 0], SizePx::new(1, 1));
        assert_eq!(artifact.data_url(), "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn svg_snapshot_produces_png_of_region_size() {
        let snapshot = SvgSnapshot::new(0.95, 2.0);
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="32" height="40"><rect width="32" height="40"/></svg>"#;
        let artifact = snapshot.capture(svg).await.unwrap();

        assert_eq!(artifact.mime_type, "image/png");
        assert_eq!(artifact.size, SizePx::new(64, 80));
        let decoded = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 80));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_trigger_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let capture = Arc::new(CountingCapture::default());
        let exporter = exporter(Arc::clone(&capture), dir.path());

        let (first, second) = tokio::join!(
            exporter.export("<svg/>", "a-card.png"),
            exporter.export("<svg/>", "a-card.png"),
        );

        assert!(first.is_delivered());
        assert!(matches!(second, ExportOutcome::Ignored));
        assert_eq!(capture.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_capture_returns_to_idle() {
        let dir = tempfile::tempdir().unwrap();
        let capture = Arc::new(CountingCapture {
            fail: true,
            ..Default::default()
        });
        let exporter = exporter(capture, dir.path());
        let mut updates = exporter.subscribe();

        let outcome = exporter.export("<svg/>", "a-card.png").await;

        assert!(matches!(
            outcome,
            ExportOutcome::Failed(ExportError::Capture(_))
        ));
        assert_eq!(exporter.status(), DownloadStatus::Idle);
        assert!(updates.has_changed().unwrap());
        assert_eq!(*updates.borrow_and_update(), DownloadStatus::Idle);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    /// Never finishes within the test's timeout.
    struct StalledCapture;

    #[async_trait]
    impl RegionCapture for StalledCapture {
        async fn capture(&self, _region_svg: &str) -> Result<ExportArtifact, CaptureError> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(ExportArtifact::png(vec![0x89], SizePx::new(320, 400)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_export_returns_to_idle() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(
            &ExportConfig::default(),
            Box::new(StalledCapture),
            Arc::new(FsPlatform::new(dir.path())),
        );

        let timed_out =
            tokio::time::timeout(Duration::from_secs(1), exporter.export("<svg/>", "a-card.png"))
                .await;

        assert!(timed_out.is_err());
        assert_eq!(exporter.status(), DownloadStatus::Idle);

        // The trigger is accepted again.
        let retry =
            tokio::time::timeout(Duration::from_secs(1), exporter.export("<svg/>", "a-card.png"))
                .await;
        assert!(retry.is_err(), "second trigger should start a fresh capture");
        assert_eq!(exporter.status(), DownloadStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn new_export_cancels_pending_reset() {
        let dir = tempfile::tempdir().unwrap();
        let capture = Arc::new(CountingCapture::default());
        let exporter = exporter(capture, dir.path());

        exporter.export("<svg/>", "a-card.png").await;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(exporter.status(), DownloadStatus::Succeeded);

        // Second export restarts the 2 s window.
        exporter.export("<svg/>", "a-card.png").await;
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(exporter.status(), DownloadStatus::Succeeded);

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(exporter.status(), DownloadStatus::Idle);
    }
}
