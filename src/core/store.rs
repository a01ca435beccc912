//! Package metadata store
//!
//! The store owns every [`PackageRecord`], backed by a single JSON document
//! that is loaded entirely into memory. Every mutation is written through to
//! the backing file before the call returns.
//!
//! Writes go through a temporary sibling file that is renamed over the
//! database, so a crash mid-write leaves the previous document intact.
//! There is no locking: at most one process should mutate a database at a
//! time (last writer wins).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::core::record::{BuildState, PackageEntry, PackagePaths, PackageRecord, PackageUrls};
use crate::error::StoreError;
use crate::infra::filesystem;

/// Suffix of the backup written before a sync run
pub const BACKUP_SUFFIX: &str = ".old.json";

/// On-disk database document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Package names in processing order
    pub packages: Vec<String>,

    /// Package entries keyed by name
    pub package_info: BTreeMap<String, PackageEntry>,
}

impl Document {
    /// Check that the name list and the entry map describe the same set
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::with_capacity(self.packages.len());
        for name in &self.packages {
            if !seen.insert(name.as_str()) {
                return Err(format!("package '{name}' is listed more than once"));
            }
            if !self.package_info.contains_key(name) {
                return Err(format!("package '{name}' is listed but has no entry"));
            }
        }

        if let Some(orphan) = self
            .package_info
            .keys()
            .find(|name| !seen.contains(name.as_str()))
        {
            return Err(format!("package '{orphan}' has an entry but is not listed"));
        }

        Ok(())
    }
}

/// Inputs for adding a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPackage {
    /// Unique package name
    pub name: String,
    /// Initial version
    pub version: String,
    /// Source type (e.g. "https")
    pub source_type: String,
    /// Source URL template
    pub source_url: String,
    /// Upstream version page
    pub upstream_url: String,
    /// Root-relative repository directory
    pub repository_path: String,
    /// Root-relative PKGBUILD directory
    pub pkgbuild_path: String,
}

impl NewPackage {
    fn into_entry(self) -> (String, PackageEntry) {
        let build = BuildState::for_package(&self.name);
        let entry = PackageEntry {
            version: self.version,
            urls: PackageUrls {
                source_type: self.source_type,
                source_url: self.source_url,
                upstream_url: self.upstream_url,
            },
            paths: PackagePaths {
                repository: self.repository_path,
                pkgbuild: self.pkgbuild_path,
            },
            build,
        };
        (self.name, entry)
    }
}

/// Package store backed by a JSON document
#[derive(Debug)]
pub struct PackageStore {
    path: PathBuf,
    document: Document,
}

impl PackageStore {
    /// Load the database at `path`
    ///
    /// A missing, unreadable, malformed or inconsistent document is a
    /// [`StoreError::Load`].
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let load_err = |error: String| StoreError::Load {
            path: path.to_path_buf(),
            error,
        };

        let content = filesystem::read_file(path).map_err(|e| load_err(e.to_string()))?;
        let document: Document =
            serde_json::from_str(&content).map_err(|e| load_err(e.to_string()))?;
        document.validate().map_err(load_err)?;

        tracing::debug!(
            "Loaded {} package(s) from {}",
            document.packages.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Open the database at `path`, writing an empty one first if it is missing
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        if path.exists() {
            return Self::open(path);
        }

        let mut store = Self {
            path: path.to_path_buf(),
            document: Document::default(),
        };
        store.commit(Document::default())?;
        tracing::info!("Created empty package database at {}", path.display());
        Ok(store)
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of packages
    pub fn len(&self) -> usize {
        self.document.packages.len()
    }

    /// Whether the store has no packages
    pub fn is_empty(&self) -> bool {
        self.document.packages.is_empty()
    }

    /// Package names in store order
    pub fn names(&self) -> &[String] {
        &self.document.packages
    }

    /// Whether a package exists
    pub fn contains(&self, name: &str) -> bool {
        self.document.packages.iter().any(|n| n == name)
    }

    /// Look up one package
    pub fn get(&self, name: &str) -> Result<PackageRecord, StoreError> {
        if !self.contains(name) {
            return Err(not_found(name));
        }
        self.document
            .package_info
            .get(name)
            .map(|entry| PackageRecord::from_entry(name, entry.clone()))
            .ok_or_else(|| not_found(name))
    }

    /// All packages in store order
    pub fn list(&self) -> Vec<PackageRecord> {
        self.document
            .packages
            .iter()
            .filter_map(|name| {
                self.document
                    .package_info
                    .get(name)
                    .map(|entry| PackageRecord::from_entry(name, entry.clone()))
            })
            .collect()
    }

    /// Set the stale flag of one package and write through
    pub fn set_marked_for_build(&mut self, name: &str, marked: bool) -> Result<(), StoreError> {
        self.update_entry(name, |entry| entry.build.marked_for_build = marked)?;
        tracing::debug!("Set markedForBuild={marked} for {name}");
        Ok(())
    }

    /// Set the version of one package and write through
    pub fn set_version(&mut self, name: &str, version: &str) -> Result<(), StoreError> {
        self.update_entry(name, |entry| entry.version = version.to_string())?;
        tracing::debug!("Set version={version} for {name}");
        Ok(())
    }

    /// Record a newer upstream version: mark for build and replace the
    /// version in a single write
    pub fn mark_outdated(&mut self, name: &str, version: &str) -> Result<(), StoreError> {
        self.update_entry(name, |entry| {
            entry.build.marked_for_build = true;
            entry.version = version.to_string();
        })?;
        tracing::debug!("Marked {name} for build at version {version}");
        Ok(())
    }

    /// Add a package
    ///
    /// The new record is appended to the processing order, marked for build,
    /// and gets task names derived from its name.
    pub fn add(&mut self, package: NewPackage) -> Result<PackageRecord, StoreError> {
        if self.contains(&package.name) {
            return Err(StoreError::DuplicatePackage { name: package.name });
        }

        let (name, entry) = package.into_entry();
        let mut document = self.document.clone();
        document.packages.push(name.clone());
        document.package_info.insert(name.clone(), entry.clone());
        self.commit(document)?;

        tracing::info!("Added package {name} v{}", entry.version);
        Ok(PackageRecord::from_entry(&name, entry))
    }

    /// Remove a package, returning its last record
    pub fn remove(&mut self, name: &str) -> Result<PackageRecord, StoreError> {
        let record = self.get(name)?;

        let mut document = self.document.clone();
        document.packages.retain(|n| n != name);
        document.package_info.remove(name);
        self.commit(document)?;

        tracing::info!("Removed package {name}");
        Ok(record)
    }

    /// Copy the backing document next to itself as `<stem>.old.json`
    pub fn backup(&self) -> Result<PathBuf, StoreError> {
        let dest = backup_path(&self.path);
        filesystem::copy_file(&self.path, &dest).map_err(|e| StoreError::Write {
            path: dest.clone(),
            error: e.to_string(),
        })?;
        tracing::info!("Backed up package database to {}", dest.display());
        Ok(dest)
    }

    fn update_entry(
        &mut self,
        name: &str,
        apply: impl FnOnce(&mut PackageEntry),
    ) -> Result<(), StoreError> {
        if !self.contains(name) {
            return Err(not_found(name));
        }

        let mut document = self.document.clone();
        let entry = document
            .package_info
            .get_mut(name)
            .ok_or_else(|| not_found(name))?;
        apply(entry);
        self.commit(document)
    }

    /// Persist `document` and only then make it the in-memory state
    fn commit(&mut self, document: Document) -> Result<(), StoreError> {
        let write_err = |error: String| StoreError::Write {
            path: self.path.clone(),
            error,
        };

        let json = serde_json::to_string_pretty(&document).map_err(|e| write_err(e.to_string()))?;
        filesystem::write_file_atomic(&self.path, json.as_bytes())
            .map_err(|e| write_err(e.to_string()))?;

        self.document = document;
        Ok(())
    }
}

/// Backup location for a database file
pub fn backup_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "db".to_string());
    path.with_file_name(format!("{stem}{BACKUP_SUFFIX}"))
}

fn not_found(name: &str) -> StoreError {
    StoreError::PackageNotFound {
        name: name.to_string(),
    }
}
