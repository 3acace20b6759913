use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Catalog store errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },
}

impl CatalogError {
    fn unavailable(reason: impl Into<String>) -> Self {
        CatalogError::CatalogUnavailable {
            reason: reason.into(),
        }
    }
}

/// One product in the sunglasses catalog. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Normalized numeric id; source ids may be sparse and arrive as
    /// strings or numbers
    pub id: i64,
    pub brand: String,
    pub model: String,
    pub image_url: String,
    pub recommended_name: String,
    pub description: String,
}

/// Wire record as stored in the catalog JSON (camelCase field names,
/// string-or-number ids).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRecord {
    id: serde_json::Value,
    product_image: String,
    brand: String,
    model: String,
    recommended_name: String,
    description: String,
}

impl ProductRecord {
    fn into_entry(self) -> Result<CatalogEntry, CatalogError> {
        let id = normalize_id(&self.id)?;
        Ok(CatalogEntry {
            id,
            brand: self.brand,
            model: self.model,
            image_url: self.product_image,
            recommended_name: self.recommended_name,
            description: self.description,
        })
    }
}

fn normalize_id(raw: &serde_json::Value) -> Result<i64, CatalogError> {
    match raw {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| CatalogError::unavailable(format!("non-integer product id {n}"))),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| CatalogError::unavailable(format!("unparseable product id {s:?}"))),
        other => Err(CatalogError::unavailable(format!(
            "product id must be a number or numeric string, got {other}"
        ))),
    }
}

/// Where the catalog JSON lives.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    File(PathBuf),
    Http(String),
}

impl CatalogSource {
    /// Interpret a configured source string: http(s) URLs fetch, anything
    /// else is a local path.
    pub fn from_config(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            CatalogSource::Http(source.to_string())
        } else {
            CatalogSource::File(PathBuf::from(source))
        }
    }
}

/// Loads the product list once per session and hands out the cached copy
/// afterwards. Failures are not cached, so a later call may still succeed.
#[derive(Debug)]
pub struct CatalogStore {
    source: CatalogSource,
    client: reqwest::Client,
    cache: OnceCell<Arc<Vec<CatalogEntry>>>,
}

impl CatalogStore {
    pub fn new(source: CatalogSource) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            source,
            client,
            cache: OnceCell::new(),
        }
    }

    /// Load the catalog, idempotent within a session.
    pub async fn load(&self) -> Result<Arc<Vec<CatalogEntry>>, CatalogError> {
        let entries = self
            .cache
            .get_or_try_init(|| async {
                let entries = self.fetch().await?;
                info!(products = entries.len(), "catalog loaded");
                Ok::<_, CatalogError>(Arc::new(entries))
            })
            .await?;
        Ok(Arc::clone(entries))
    }

    /// Degrade path: the rest of the UI must stay usable when the catalog
    /// cannot be retrieved, so decorative consumers get an empty sequence.
    pub async fn load_or_empty(&self) -> Arc<Vec<CatalogEntry>> {
        match self.load().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "catalog load failed, continuing with empty catalog");
                Arc::new(Vec::new())
            }
        }
    }

    /// The already-loaded catalog, if any. Used by collaborators running
    /// after the session has warmed the cache (e.g. the result view).
    pub fn cached(&self) -> Option<Arc<Vec<CatalogEntry>>> {
        self.cache.get().cloned()
    }

    /// Ordered product image URLs for the decorative intake carousel.
    pub async fn slider_images(&self) -> Vec<String> {
        self.load_or_empty()
            .await
            .iter()
            .map(|e| e.image_url.clone())
            .collect()
    }

    async fn fetch(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let body = match &self.source {
            CatalogSource::File(path) => {
                debug!(path = %path.display(), "reading catalog file");
                tokio::fs::read_to_string(path).await.map_err(|e| {
                    CatalogError::unavailable(format!("read {}: {e}", path.display()))
                })?
            }
            CatalogSource::Http(url) => {
                debug!(url = %url, "fetching catalog");
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| CatalogError::unavailable(format!("fetch {url}: {e}")))?;
                response
                    .text()
                    .await
                    .map_err(|e| CatalogError::unavailable(format!("read body: {e}")))?
            }
        };

        let records: Vec<ProductRecord> = serde_json::from_str(&body)
            .map_err(|e| CatalogError::unavailable(format!("parse catalog JSON: {e}")))?;

        records.into_iter().map(ProductRecord::into_entry).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {"id": "3", "productImage": "img/a.jpg", "brand": "Lumen", "model": "LX-3",
         "recommendedName": "Round Retro", "description": "Soft round frame."},
        {"id": 7, "productImage": "img/b.jpg", "brand": "Vanta", "model": "V-07",
         "recommendedName": "Square Bold", "description": "Wide square frame."}
    ]"#;

    fn write_catalog(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn loads_and_normalizes_string_and_number_ids() {
        let file = write_catalog(SAMPLE);
        let store = CatalogStore::new(CatalogSource::File(file.path().to_path_buf()));

        let entries = store.load().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 3);
        assert_eq!(entries[1].id, 7);
        assert_eq!(entries[0].brand, "Lumen");
        assert_eq!(entries[1].image_url, "img/b.jpg");
    }

    #[tokio::test]
    async fn second_load_returns_cached_copy() {
        let file = write_catalog(SAMPLE);
        let store = CatalogStore::new(CatalogSource::File(file.path().to_path_buf()));

        let first = store.load().await.unwrap();
        drop(file); // backing file gone, cache must survive
        let second = store.load().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn unparseable_id_fails_the_whole_load() {
        let file = write_catalog(
            r#"[{"id": "round", "productImage": "x", "brand": "b", "model": "m",
                 "recommendedName": "r", "description": "d"}]"#,
        );
        let store = CatalogStore::new(CatalogSource::File(file.path().to_path_buf()));

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, CatalogError::CatalogUnavailable { .. }));
    }

    #[tokio::test]
    async fn missing_file_degrades_to_empty() {
        let store = CatalogStore::new(CatalogSource::File("no-such-catalog.json".into()));
        assert!(store.load().await.is_err());
        assert!(store.load_or_empty().await.is_empty());
        assert!(store.slider_images().await.is_empty());
    }

    #[tokio::test]
    async fn slider_images_follow_catalog_order() {
        let file = write_catalog(SAMPLE);
        let store = CatalogStore::new(CatalogSource::File(file.path().to_path_buf()));
        assert_eq!(store.slider_images().await, vec!["img/a.jpg", "img/b.jpg"]);
    }
}
