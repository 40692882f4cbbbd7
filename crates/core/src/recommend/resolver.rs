use crate::artifacts::{ArtifactStore, ProductMetadata};
use crate::errors::LookupMiss;

/// Metadata for `item_id`, or an all-empty record when nothing is known.
pub fn resolve(store: &ArtifactStore, item_id: &str) -> ProductMetadata {
    try_resolve(store, item_id).unwrap_or_default()
}

/// Code-indexed metadata first, then the item_id index.
pub fn try_resolve(store: &ArtifactStore, item_id: &str) -> Result<ProductMetadata, LookupMiss> {
    store
        .items
        .encode(item_id)
        .and_then(|code| store.catalog.by_code(code))
        .or_else(|| store.catalog.by_item_id(item_id))
        .cloned()
        .ok_or_else(|| LookupMiss::NoMetadata(item_id.to_string()))
}
