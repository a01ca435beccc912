//! Package removal logic

use std::path::PathBuf;

use crate::core::record::PackageRecord;
use crate::core::store::PackageStore;
use crate::error::AlarmError;
use crate::infra::filesystem;
use crate::infra::layout::ProjectLayout;

/// Result of removing a package
#[derive(Debug)]
pub struct RemoveResult {
    /// The record as it was before removal
    pub record: PackageRecord,
    /// Directories deleted from disk
    pub removed_dirs: Vec<PathBuf>,
    /// Stored paths left alone because they point outside the package areas
    pub refused_paths: Vec<String>,
}

/// Remove a package's directories and its record
///
/// Missing directories are not an error. A stored path that does not
/// resolve strictly inside `pkgbuild/` or `packages/` is never deleted.
/// The record is only removed once its directories are gone.
pub fn remove_package(
    layout: &ProjectLayout,
    store: &mut PackageStore,
    name: &str,
) -> Result<RemoveResult, AlarmError> {
    let record = store.get(name)?;

    let mut removed_dirs = Vec::new();
    let mut refused_paths = Vec::new();
    for stored in [&record.paths.pkgbuild, &record.paths.repository] {
        let Some(dir) = layout.owned_dir(stored) else {
            tracing::warn!("Refusing to delete '{stored}' for {name}");
            refused_paths.push(stored.clone());
            continue;
        };
        if dir.exists() {
            filesystem::remove_dir_all(&dir)?;
            removed_dirs.push(dir);
        }
    }

    let record = store.remove(name)?;
    Ok(RemoveResult {
        record,
        removed_dirs,
        refused_paths,
    })
}
