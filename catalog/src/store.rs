//! Catalog persistence and on-disk hygiene.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::CatalogError;
use crate::types::Catalog;

/// Load a catalog from disk.
pub fn load(path: &Path) -> Result<Catalog, CatalogError> {
    let data = fs::read_to_string(path)?;
    let catalog: Catalog = serde_json::from_str(&data)?;
    Ok(catalog)
}

/// Write the catalog atomically: serialize to a sibling temp file, then
/// rename over the destination. Readers never observe a half-written
/// catalog.
pub fn save(path: &Path, catalog: &Catalog) -> Result<(), CatalogError> {
    let data = serde_json::to_string_pretty(catalog)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Delete `.wav` files in `dir` that no catalog entry references.
/// Returns the number of files removed.
pub fn cleanup_orphans(dir: &Path, catalog: &Catalog) -> Result<usize, CatalogError> {
    let referenced: std::collections::HashSet<&str> =
        catalog.clips.iter().map(|c| c.clip_file.as_str()).collect();

    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.ends_with(".wav") && !referenced.contains(name.as_ref()) {
            fs::remove_file(entry.path())?;
            debug!(file = %name, "removed orphaned clip");
            removed += 1;
        }
    }
    if removed > 0 {
        info!(count = removed, "cleaned up orphaned clip files");
    }
    Ok(removed)
}
