//! Package addition logic
//!
//! Adding a package creates its on-disk scaffolding before the record is
//! written: the repository directory (with a `.gitkeep`) and the pkgbuild
//! directory with a PKGBUILD header.

use std::path::PathBuf;

use crate::core::record::PackageRecord;
use crate::core::store::{NewPackage, PackageStore};
use crate::error::{AlarmError, StoreError};
use crate::infra::filesystem;
use crate::infra::layout::{self, ProjectLayout};
use crate::tasks::pkgbuild;

/// Marker keeping empty repository directories under version control
const GITKEEP: &str = ".gitkeep";

/// A package to add
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRequest {
    /// Unique package name
    pub name: String,
    /// Initial version
    pub version: String,
    /// Source type (e.g. "https")
    pub source_type: String,
    /// Source URL template with `{x}` placeholders
    pub source_url: String,
    /// Upstream version page
    pub upstream_url: String,
    /// Repository the package belongs to (e.g. "core")
    pub repository: String,
}

impl AddRequest {
    fn into_new_package(self) -> NewPackage {
        NewPackage {
            repository_path: layout::stored_repository_path(&self.repository, &self.name),
            pkgbuild_path: layout::stored_pkgbuild_path(&self.name),
            name: self.name,
            version: self.version,
            source_type: self.source_type,
            source_url: self.source_url,
            upstream_url: self.upstream_url,
        }
    }
}

/// Result of adding a package
#[derive(Debug)]
pub struct AddResult {
    /// The stored record
    pub record: PackageRecord,
    /// Resolved pkgbuild directory
    pub pkgbuild_dir: PathBuf,
    /// Resolved repository directory
    pub repository_dir: PathBuf,
    /// Whether a PKGBUILD template was written
    pub pkgbuild_created: bool,
}

/// Check that a name can be used as a path component
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    let invalid = |reason: &str| StoreError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.contains(['/', '\\']) {
        return Err(invalid("name contains a path separator"));
    }
    if name == "." || name == ".." {
        return Err(invalid("name is a relative path"));
    }
    Ok(())
}

/// Add a package to the store
///
/// Nothing is created on disk when the name is invalid or already taken.
/// An existing PKGBUILD is left untouched.
pub fn add_package(
    layout: &ProjectLayout,
    store: &mut PackageStore,
    request: AddRequest,
) -> Result<AddResult, AlarmError> {
    validate_name(&request.name)?;
    validate_name(&request.repository)?;
    if store.contains(&request.name) {
        return Err(StoreError::DuplicatePackage { name: request.name }.into());
    }

    let package = request.into_new_package();
    let repository_dir = layout.resolve_path(&package.repository_path);
    let pkgbuild_dir = layout.resolve_path(&package.pkgbuild_path);

    filesystem::create_dir_all(&repository_dir)?;
    filesystem::touch(&repository_dir.join(GITKEEP))?;

    filesystem::create_dir_all(&pkgbuild_dir)?;
    let recipe = pkgbuild_dir.join(pkgbuild::PKGBUILD);
    let pkgbuild_created = !recipe.exists();
    if pkgbuild_created {
        filesystem::write_file(&recipe, &pkgbuild::template(&package.name))?;
    }

    let record = store.add(package)?;
    tracing::info!(
        "Created {} and {} for {}",
        pkgbuild_dir.display(),
        repository_dir.display(),
        record.name
    );

    Ok(AddResult {
        record,
        pkgbuild_dir,
        repository_dir,
        pkgbuild_created,
    })
}
