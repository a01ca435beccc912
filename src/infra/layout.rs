//! Project directory layout
//!
//! Every location the pipeline touches is derived from a project root:
//!
//! ```text
//! <root>/
//! ├── alarmpkg.toml              optional configuration
//! ├── db/db.json                 package database
//! ├── pkgbuild/<name>/PKGBUILD   build recipes
//! ├── packages/<repo>/os/aarch64/<name>/
//! └── temp/<name>/               scratch space for prepare tasks
//! ```
//!
//! Record paths are stored root-relative with a leading `/` and resolved
//! by joining onto the root.
//!
//! `ALARMPKG_CONFIG_DIR` overrides the user config directory.

use std::env;
use std::path::{Component, Path, PathBuf};

use crate::config::defaults;
use crate::core::record::PackageRecord;

/// Environment variable for the user config directory
pub const ENV_CONFIG_DIR: &str = "ALARMPKG_CONFIG_DIR";

const APP_NAME: &str = "alarmpkg";
const PKGBUILD_DIR: &str = "pkgbuild";
const PACKAGES_DIR: &str = "packages";
const SCRATCH_DIR: &str = "temp";

/// Resolved locations for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
    db_path: PathBuf,
}

impl ProjectLayout {
    /// Layout with an explicit database path
    pub fn new(root: impl Into<PathBuf>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            db_path: db_path.into(),
        }
    }

    /// Layout using `<root>/db/db.json`
    pub fn with_default_db(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let db_path = root.join(defaults::DATABASE_PATH);
        Self { root, db_path }
    }

    /// Resolve the database path for `root`
    ///
    /// Precedence: explicit path, then the configured path, then the default.
    pub fn resolve(root: PathBuf, db: Option<PathBuf>, configured: Option<PathBuf>) -> Self {
        match db.or(configured) {
            Some(path) if path.is_absolute() => Self::new(root, path),
            Some(path) => {
                let db_path = root.join(path);
                Self::new(root, db_path)
            }
            None => Self::with_default_db(root),
        }
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Resolve a stored root-relative path
    pub fn resolve_path(&self, stored: &str) -> PathBuf {
        self.root.join(stored.trim_start_matches('/'))
    }

    /// Directory holding a record's PKGBUILD
    pub fn pkgbuild_dir(&self, record: &PackageRecord) -> PathBuf {
        self.resolve_path(&record.paths.pkgbuild)
    }

    /// Directory receiving a record's built artifacts
    pub fn repository_dir(&self, record: &PackageRecord) -> PathBuf {
        self.resolve_path(&record.paths.repository)
    }

    /// Resolve a stored path that names a directory the project owns
    ///
    /// Only plain components are accepted, and the path must lie strictly
    /// below `pkgbuild/` or `packages/`. Parent components or the top-level
    /// directories themselves yield `None`.
    pub fn owned_dir(&self, stored: &str) -> Option<PathBuf> {
        let relative = Path::new(stored.trim_start_matches('/'));
        let mut components = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => components.push(part),
                _ => return None,
            }
        }

        let top = components.first()?;
        if components.len() < 2 || (*top != PKGBUILD_DIR && *top != PACKAGES_DIR) {
            return None;
        }
        Some(self.root.join(relative))
    }

    /// Scratch directory for a package's prepare task
    pub fn scratch_dir(&self, package: &str) -> PathBuf {
        self.root.join(SCRATCH_DIR).join(package)
    }

    /// Top-level directories created by `init`
    pub fn skeleton_dirs(&self) -> [PathBuf; 2] {
        [self.root.join(PKGBUILD_DIR), self.root.join(PACKAGES_DIR)]
    }
}

/// Project root from an explicit path or the current directory
pub fn resolve_root(explicit: Option<PathBuf>) -> std::io::Result<PathBuf> {
    match explicit {
        Some(root) => Ok(root),
        None => env::current_dir(),
    }
}

/// Stored pkgbuild path for a new package
pub fn stored_pkgbuild_path(name: &str) -> String {
    format!("/{PKGBUILD_DIR}/{name}")
}

/// Stored repository path for a new package
pub fn stored_repository_path(repository: &str, name: &str) -> String {
    format!(
        "/{PACKAGES_DIR}/{repository}/os/{}/{name}",
        defaults::TARGET_ARCH
    )
}

/// User-level configuration file
///
/// `ALARMPKG_CONFIG_DIR/config.toml` when set, otherwise
/// `<platform config dir>/alarmpkg/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    if let Ok(dir) = env::var(ENV_CONFIG_DIR) {
        return Some(PathBuf::from(dir).join("config.toml"));
    }
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{BuildState, PackagePaths, PackageUrls};

    fn record(pkgbuild: &str, repository: &str) -> PackageRecord {
        PackageRecord {
            name: "linux".to_string(),
            version: "6.1".to_string(),
            urls: PackageUrls {
                source_type: "tar".to_string(),
                source_url: String::new(),
                upstream_url: String::new(),
            },
            paths: PackagePaths {
                repository: repository.to_string(),
                pkgbuild: pkgbuild.to_string(),
            },
            build: BuildState::for_package("linux"),
        }
    }

    #[test]
    fn test_default_db_path() {
        let layout = ProjectLayout::with_default_db("/srv/alarm");
        assert_eq!(layout.db_path(), Path::new("/srv/alarm/db/db.json"));
    }

    #[test]
    fn test_resolve_precedence() {
        let root = PathBuf::from("/srv/alarm");

        let layout = ProjectLayout::resolve(
            root.clone(),
            Some(PathBuf::from("/tmp/db.json")),
            Some(PathBuf::from("state/db.json")),
        );
        assert_eq!(layout.db_path(), Path::new("/tmp/db.json"));

        let layout = ProjectLayout::resolve(root.clone(), None, Some(PathBuf::from("state/db.json")));
        assert_eq!(layout.db_path(), Path::new("/srv/alarm/state/db.json"));

        let layout = ProjectLayout::resolve(root, None, None);
        assert_eq!(layout.db_path(), Path::new("/srv/alarm/db/db.json"));
    }

    #[test]
    fn test_record_paths_resolve_under_root() {
        let layout = ProjectLayout::with_default_db("/srv/alarm");
        let record = record("/pkgbuild/linux", "/packages/core/os/aarch64/linux");

        assert_eq!(layout.pkgbuild_dir(&record), PathBuf::from("/srv/alarm/pkgbuild/linux"));
        assert_eq!(
            layout.repository_dir(&record),
            PathBuf::from("/srv/alarm/packages/core/os/aarch64/linux")
        );
        assert_eq!(layout.scratch_dir("linux"), PathBuf::from("/srv/alarm/temp/linux"));
    }

    #[test]
    fn test_owned_dir_accepts_package_dirs() {
        let layout = ProjectLayout::with_default_db("/srv/alarm");
        assert_eq!(
            layout.owned_dir("/pkgbuild/linux"),
            Some(PathBuf::from("/srv/alarm/pkgbuild/linux"))
        );
        assert_eq!(
            layout.owned_dir("/packages/core/os/aarch64/linux"),
            Some(PathBuf::from("/srv/alarm/packages/core/os/aarch64/linux"))
        );
    }

    #[test]
    fn test_owned_dir_rejects_escapes() {
        let layout = ProjectLayout::with_default_db("/srv/alarm");
        for stored in [
            "/pkgbuild/..",
            "/pkgbuild/../db",
            "/packages/core/../../..",
            "/pkgbuild",
            "/packages/",
            "/",
            "",
            "/db/linux",
            "/temp/linux",
        ] {
            assert_eq!(layout.owned_dir(stored), None, "accepted {stored:?}");
        }
    }

    #[test]
    fn test_stored_paths() {
        assert_eq!(stored_pkgbuild_path("linux"), "/pkgbuild/linux");
        assert_eq!(
            stored_repository_path("core", "linux"),
            "/packages/core/os/aarch64/linux"
        );
    }

    #[test]
    fn test_explicit_root_wins() {
        let root = resolve_root(Some(PathBuf::from("/explicit"))).unwrap();
        assert_eq!(root, PathBuf::from("/explicit"));
        assert_eq!(resolve_root(None).unwrap(), env::current_dir().unwrap());
    }
}
