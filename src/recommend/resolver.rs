use thiserror::Error;
use tracing::debug;

use crate::catalog::CatalogEntry;

#[derive(Debug, Error)]
pub enum RecommendError {
    /// Only reachable when navigation is attempted with zero catalog
    /// entries; submission should be prevented upstream before this point.
    #[error("no catalog data available to recommend from")]
    NoCatalogDataAvailable,
}

/// Map a classifier-provided index to a catalog entry.
///
/// Returns the first entry in catalog order whose id equals the index. A
/// recommendation must always be presentable, so when nothing matches the
/// catalog's first entry is the deterministic fallback.
pub fn resolve(
    classification_index: i64,
    catalog: &[CatalogEntry],
) -> Result<&CatalogEntry, RecommendError> {
    let first = catalog.first().ok_or(RecommendError::NoCatalogDataAvailable)?;
    let entry = catalog
        .iter()
        .find(|e| e.id == classification_index)
        .unwrap_or_else(|| {
            debug!(
                classification_index,
                fallback_id = first.id,
                "no catalog match, falling back to first entry"
            );
            first
        });
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64) -> CatalogEntry {
        CatalogEntry {
            id,
            brand: format!("brand-{id}"),
            model: format!("model-{id}"),
            image_url: format!("img/{id}.jpg"),
            recommended_name: format!("pick-{id}"),
            description: String::new(),
        }
    }

    #[test]
    fn exact_match_wins() {
        let catalog = vec![entry(1), entry(3), entry(7)];
        assert_eq!(resolve(3, &catalog).unwrap().id, 3);
        assert_eq!(resolve(7, &catalog).unwrap().id, 7);
    }

    #[test]
    fn first_match_in_catalog_order_is_returned() {
        let mut duplicate = entry(3);
        duplicate.brand = "first".to_string();
        let mut shadowed = entry(3);
        shadowed.brand = "second".to_string();
        let catalog = vec![entry(1), duplicate, shadowed];

        assert_eq!(resolve(3, &catalog).unwrap().brand, "first");
    }

    #[test]
    fn unmatched_index_falls_back_to_first_entry() {
        let catalog = vec![entry(4), entry(9)];
        assert_eq!(resolve(99, &catalog).unwrap().id, 4);
        assert_eq!(resolve(-1, &catalog).unwrap().id, 4);
    }

    #[test]
    fn empty_catalog_is_the_only_failure() {
        let err = resolve(1, &[]).unwrap_err();
        assert!(matches!(err, RecommendError::NoCatalogDataAvailable));
    }
}
