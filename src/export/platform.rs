//! Host platform capabilities used by the delivery channels.
//!
//! A [`Platform`] is whatever environment the card is exported into: a
//! browser with a native share sheet, or a desktop filesystem. The delivery
//! channels only talk to it through this trait.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex, PoisonError};

use async_trait::async_trait;
use regex::Regex;

use super::ExportArtifact;
use crate::error::DeliveryError;

static HANDHELD_TOUCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"iPad|iPhone|iPod").expect("static regex"));

// ============================================================================
// Capabilities
// ============================================================================

/// What the host platform can do, evaluated once per export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// A native share sheet accepting files is available.
    pub native_share: bool,
    /// The device is a handheld touch device.
    pub handheld_touch: bool,
}

impl Capabilities {
    /// Derives capabilities from a user-agent string.
    pub fn from_user_agent(user_agent: &str, native_share: bool) -> Self {
        Self {
            native_share,
            handheld_touch: HANDHELD_TOUCH.is_match(user_agent),
        }
    }

    /// Native share is only used on handheld touch devices; desktops download.
    pub fn prefers_native_share(&self) -> bool {
        self.native_share && self.handheld_touch
    }
}

// ============================================================================
// Platform
// ============================================================================

/// A request to the native share sheet.
#[derive(Debug, Clone, Copy)]
pub struct ShareRequest<'a> {
    pub title: &'a str,
    pub filename: &'a str,
    pub artifact: &'a ExportArtifact,
}

#[async_trait]
pub trait Platform: Send + Sync {
    fn capabilities(&self) -> Capabilities;

    /// Opens the native share sheet. Cancellation is an error.
    async fn share(&self, request: ShareRequest<'_>) -> Result<(), DeliveryError>;

    /// Registers binary data and returns a temporary reference to it.
    ///
    /// Prefer [`ObjectUrl::create`], which releases the reference on drop.
    fn create_object_url(&self, bytes: &[u8], mime_type: &str) -> Result<String, DeliveryError>;

    fn revoke_object_url(&self, url: &str);

    /// Saves the referenced data under `filename`.
    fn trigger_download(&self, url: &str, filename: &str) -> Result<(), DeliveryError>;

    /// Opens the referenced data directly, letting the user save it by hand.
    fn navigate(&self, url: &str) -> Result<(), DeliveryError>;
}

// ============================================================================
// ObjectUrl
// ============================================================================

/// A temporary object reference, revoked when dropped.
pub struct ObjectUrl<'p> {
    platform: &'p dyn Platform,
    url: String,
}

impl<'p> ObjectUrl<'p> {
    pub fn create(
        platform: &'p dyn Platform,
        artifact: &ExportArtifact,
    ) -> Result<Self, DeliveryError> {
        let url = platform.create_object_url(&artifact.bytes, artifact.mime_type)?;
        Ok(Self { platform, url })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl<'_> {
    fn drop(&mut self) {
        self.platform.revoke_object_url(&self.url);
        tracing::trace!(url = %self.url, "object url revoked");
    }
}

// ============================================================================
// FsPlatform
// ============================================================================

/// A desktop host that "downloads" by writing files into a directory.
///
/// Object references live in memory until revoked. Native share is not
/// available, so every export goes through the download channel unless the
/// capabilities are overridden.
pub struct FsPlatform {
    out_dir: PathBuf,
    capabilities: Capabilities,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    next_id: AtomicU64,
}

impl FsPlatform {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            capabilities: Capabilities::default(),
            objects: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Reports capabilities derived from a browser user-agent string.
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.capabilities = Capabilities::from_user_agent(user_agent, false);
        self
    }

    /// Overrides the reported capabilities.
    ///
    /// Claiming `native_share` still fails at share time, so a handheld
    /// profile exercises the navigation fallback.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Number of object references created but not yet revoked.
    pub fn live_object_urls(&self) -> usize {
        self.objects().len()
    }

    fn objects(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, url: &str, filename: &str) -> Result<PathBuf, DeliveryError> {
        let objects = self.objects();
        let bytes = objects
            .get(url)
            .ok_or_else(|| DeliveryError::Platform(format!("unknown object url {url}")))?;
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(sanitize_filename(filename));
        std::fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "card saved");
        Ok(path)
    }
}

#[async_trait]
impl Platform for FsPlatform {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn share(&self, _request: ShareRequest<'_>) -> Result<(), DeliveryError> {
        Err(DeliveryError::ShareUnavailable)
    }

    fn create_object_url(&self, bytes: &[u8], _mime_type: &str) -> Result<String, DeliveryError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = format!("blob:loyalty-card/{id}");
        self.objects().insert(url.clone(), bytes.to_vec());
        Ok(url)
    }

    fn revoke_object_url(&self, url: &str) {
        self.objects().remove(url);
    }

    fn trigger_download(&self, url: &str, filename: &str) -> Result<(), DeliveryError> {
        self.write(url, filename).map(|_| ())
    }

    fn navigate(&self, url: &str) -> Result<(), DeliveryError> {
        let id = url.rsplit('/').next().unwrap_or("card");
        self.write(url, &format!("{id}.png")).map(|_| ())
    }
}

/// Keeps a download inside the output directory.
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "card.png".to_string(),
        _ => cleaned,
    }
}
