//! Delivery channels: how a captured artifact reaches the user.

use std::fmt;

use async_trait::async_trait;

use super::ExportArtifact;
use super::platform::{Capabilities, ObjectUrl, Platform, ShareRequest};
use crate::error::DeliveryError;

/// Which channel delivered an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    NativeShare,
    DirectDownload,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NativeShare => f.write_str("native-share"),
            Self::DirectDownload => f.write_str("direct-download"),
        }
    }
}

#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    async fn deliver(
        &self,
        platform: &dyn Platform,
        artifact: &ExportArtifact,
        filename: &str,
    ) -> Result<(), DeliveryError>;
}

/// Picks the channel for one export.
pub fn select_channel(capabilities: Capabilities, share_title: &str) -> Box<dyn DeliveryChannel> {
    if capabilities.prefers_native_share() {
        Box::new(NativeShare::new(share_title))
    } else {
        Box::new(DirectDownload)
    }
}

// ============================================================================
// NativeShare
// ============================================================================

/// Shares the artifact through the platform share sheet.
///
/// If sharing fails or is cancelled, the artifact is opened directly through
/// a temporary object reference as a last-resort save path.
#[derive(Debug, Clone)]
pub struct NativeShare {
    title: String,
}

impl NativeShare {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[async_trait]
impl DeliveryChannel for NativeShare {
    fn kind(&self) -> ChannelKind {
        ChannelKind::NativeShare
    }

    async fn deliver(
        &self,
        platform: &dyn Platform,
        artifact: &ExportArtifact,
        filename: &str,
    ) -> Result<(), DeliveryError> {
        let request = ShareRequest {
            title: &self.title,
            filename,
            artifact,
        };
        match platform.share(request).await {
            Ok(()) => Ok(()),
            Err(error) => {
                tracing::warn!(%error, "share failed, opening the image directly");
                let url = ObjectUrl::create(platform, artifact)?;
                platform.navigate(url.as_str())
            }
        }
    }
}

// ============================================================================
// DirectDownload
// ============================================================================

/// Triggers a file download named after the card.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectDownload;

#[async_trait]
impl DeliveryChannel for DirectDownload {
    fn kind(&self) -> ChannelKind {
        ChannelKind::DirectDownload
    }

    async fn deliver(
        &self,
        platform: &dyn Platform,
        artifact: &ExportArtifact,
        filename: &str,
    ) -> Result<(), DeliveryError> {
        let url = ObjectUrl::create(platform, artifact)?;
        platform.trigger_download(url.as_str(), filename)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::geometry::SizePx;

    /// Records every platform call in order.
    #[derive(Default)]
    struct ScriptedPlatform {
        share_fails: bool,
        navigate_fails: bool,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedPlatform {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl Platform for ScriptedPlatform {
        fn capabilities(&self) -> Capabilities {
            Capabilities::default()
        }

        async fn share(&self, request: ShareRequest<'_>) -> Result<(), DeliveryError> {
            self.record(format!("share {} {}", request.title, request.filename));
            if self.share_fails {
                Err(DeliveryError::Cancelled)
            } else {
                Ok(())
            }
        }

        fn create_object_url(&self, _bytes: &[u8], mime: &str) -> Result<String, DeliveryError> {
            self.record(format!("create {mime}"));
            Ok("blob:1".to_string())
        }

        fn revoke_object_url(&self, url: &str) {
            self.record(format!("revoke {url}"));
        }

        fn trigger_download(&self, url: &str, filename: &str) -> Result<(), DeliveryError> {
            self.record(format!("download {url} {filename}"));
            Ok(())
        }

        fn navigate(&self, url: &str) -> Result<(), DeliveryError> {
            self.record(format!("navigate {url}"));
            if self.navigate_fails {
                Err(DeliveryError::Platform("blocked".into()))
            } else {
                Ok(())
            }
        }
    }

    fn artifact() -> ExportArtifact {
        ExportArtifact::png(vec![0; 4], SizePx::new(1, 1))
    }

    #[test]
    fn selection_follows_capabilities() {
        let handheld = Capabilities {
            native_share: true,
            handheld_touch: true,
        };
        let desktop_with_share = Capabilities {
            native_share: true,
            handheld_touch: false,
        };
        assert_eq!(select_channel(handheld, "t").kind(), ChannelKind::NativeShare);
        assert_eq!(
            select_channel(desktop_with_share, "t").kind(),
            ChannelKind::DirectDownload
        );
        assert_eq!(
            select_channel(Capabilities::default(), "t").kind(),
            ChannelKind::DirectDownload
        );
    }

    #[tokio::test]
    async fn download_creates_uses_and_revokes_url() {
        let platform = ScriptedPlatform::default();
        DirectDownload
            .deliver(&platform, &artifact(), "store-card.png")
            .await
            .unwrap();

        assert_eq!(
            platform.calls(),
            vec![
                "create image/png",
                "download blob:1 store-card.png",
                "revoke blob:1",
            ]
        );
    }

    #[tokio::test]
    async fn share_success_needs_no_object_url() {
        let platform = ScriptedPlatform::default();
        NativeShare::new("Save Loyalty Card")
            .deliver(&platform, &artifact(), "store-card.png")
            .await
            .unwrap();

        assert_eq!(platform.calls(), vec!["share Save Loyalty Card store-card.png"]);
    }

    #[tokio::test]
    async fn cancelled_share_falls_back_to_navigation() {
        let platform = ScriptedPlatform {
            share_fails: true,
            ..Default::default()
        };
        NativeShare::new("Save Loyalty Card")
            .deliver(&platform, &artifact(), "store-card.png")
            .await
            .unwrap();

        assert_eq!(
            platform.calls(),
            vec![
                "share Save Loyalty Card store-card.png",
                "create image/png",
                "navigate blob:1",
                "revoke blob:1",
            ]
        );
    }

    #[tokio::test]
    async fn failed_fallback_still_revokes() {
        let platform = ScriptedPlatform {
            share_fails: true,
            navigate_fails: true,
            ..Default::default()
        };
        let result = NativeShare::new("t")
            .deliver(&platform, &artifact(), "x.png")
            .await;

        assert!(matches!(result, Err(DeliveryError::Platform(_))));
        assert_eq!(platform.calls().last().map(String::as_str), Some("revoke blob:1"));
    }

    #[test]
    fn channel_kind_display() {
        assert_eq!(ChannelKind::NativeShare.to_string(), "native-share");
        assert_eq!(ChannelKind::DirectDownload.to_string(), "direct-download");
    }
}
