// Sharing - best-effort side channel, never part of the core contract

use thiserror::Error;
use tracing::info;

use crate::catalog::CatalogEntry;

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("sharing is not supported on this platform")]
    NotSupported,
    #[error("no resolved recommendation to share yet")]
    NothingToShare,
    #[error("share failed: {0}")]
    Failed(String),
}

/// What gets handed to the platform share capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareContent {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// Platform share capability, injected by the host.
pub trait SharePlatform: Send + Sync {
    fn is_available(&self) -> bool;
    fn share(&self, content: &ShareContent) -> Result<(), ShareError>;
}

/// Compose the share message for a recommended product.
pub fn compose(entry: &CatalogEntry, page_url: &str) -> ShareContent {
    ShareContent {
        title: "Your custom sunglasses pick".to_string(),
        text: format!(
            "{} - {} {}",
            entry.recommended_name, entry.brand, entry.model
        ),
        url: page_url.to_string(),
    }
}

/// Invoke the platform share capability when present; surface a
/// not-supported notice otherwise.
pub fn share_product(
    platform: &dyn SharePlatform,
    entry: &CatalogEntry,
    page_url: &str,
) -> Result<(), ShareError> {
    if !platform.is_available() {
        return Err(ShareError::NotSupported);
    }
    let content = compose(entry, page_url);
    info!(product_id = entry.id, "invoking platform share");
    platform.share(&content)
}
