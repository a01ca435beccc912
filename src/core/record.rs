//! Package record definitions
//!
//! A [`PackageRecord`] is one package's persisted metadata: identity,
//! version, source/upstream locations, filesystem paths and build state.
//! The serialized field names follow the on-disk database schema.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder substituted positionally in source URL templates
pub const URL_PLACEHOLDER: &str = "{x}";

/// The two procedure tables a record points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Fetch/extract upstream source and refresh PKGBUILD metadata
    Prepare,
    /// Invoke the packaging tool and move artifacts into the repository
    Build,
}

impl TaskKind {
    /// Prefix used when deriving task names from package names
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Prepare => "prepare_pkg_",
            Self::Build => "build_pkg_",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prepare => write!(f, "prepare"),
            Self::Build => write!(f, "build"),
        }
    }
}

/// Derive the task name for a package
///
/// Lowercases the name and replaces every non-alphanumeric character with
/// an underscore, behind a fixed per-kind prefix.
pub fn task_name(kind: TaskKind, package_name: &str) -> String {
    let body: String = package_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{body}", kind.prefix())
}

/// Source and upstream locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageUrls {
    /// Source type (e.g. "https")
    #[serde(rename = "type")]
    pub source_type: String,

    /// Source URL, possibly containing `{x}` placeholders
    pub source_url: String,

    /// Page that reports the latest upstream version
    pub upstream_url: String,
}

impl PackageUrls {
    /// Fill the source URL template
    ///
    /// Each `{x}` is replaced, left to right, by the next value. With no
    /// values the raw template is returned.
    pub fn source_url_with(&self, values: &[&str]) -> String {
        let mut url = self.source_url.clone();
        for value in values {
            url = url.replacen(URL_PLACEHOLDER, value, 1);
        }
        url
    }
}

/// Root-relative filesystem locations used by the build collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagePaths {
    /// Repository directory receiving built artifacts
    #[serde(rename = "repo")]
    pub repository: String,

    /// Directory holding the PKGBUILD
    pub pkgbuild: String,
}

/// Build state of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildState {
    /// Whether the record is stale and needs prepare + build work
    pub marked_for_build: bool,

    /// Name of the build procedure
    #[serde(rename = "buildFunctionName")]
    pub build_task: String,

    /// Name of the prepare procedure
    #[serde(rename = "prepareFunctionName")]
    pub prepare_task: String,
}

impl BuildState {
    /// Fresh build state for a new package: stale, with derived task names
    pub fn for_package(name: &str) -> Self {
        Self {
            marked_for_build: true,
            build_task: task_name(TaskKind::Build, name),
            prepare_task: task_name(TaskKind::Prepare, name),
        }
    }

    /// Task name for the given table
    pub fn task(&self, kind: TaskKind) -> &str {
        match kind {
            TaskKind::Prepare => &self.prepare_task,
            TaskKind::Build => &self.build_task,
        }
    }
}

/// A persisted package entry, keyed by name in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    /// Current known version
    pub version: String,

    /// Source and upstream URLs
    pub urls: PackageUrls,

    /// Filesystem paths
    pub paths: PackagePaths,

    /// Build state
    #[serde(rename = "buildInfo")]
    pub build: BuildState,
}

/// One package's metadata together with its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    /// Unique package name
    pub name: String,

    /// Current known version
    pub version: String,

    /// Source and upstream URLs
    pub urls: PackageUrls,

    /// Filesystem paths
    pub paths: PackagePaths,

    /// Build state
    pub build: BuildState,
}

impl PackageRecord {
    /// Combine a name with its persisted entry
    pub fn from_entry(name: &str, entry: PackageEntry) -> Self {
        Self {
            name: name.to_string(),
            version: entry.version,
            urls: entry.urls,
            paths: entry.paths,
            build: entry.build,
        }
    }

    /// Whether downstream stages should process this record
    pub fn is_marked_for_build(&self) -> bool {
        self.build.marked_for_build
    }

    /// Task name for the given table
    pub fn task(&self, kind: TaskKind) -> &str {
        self.build.task(kind)
    }

    /// Major version component (text before the first '.')
    pub fn major_version(&self) -> &str {
        self.version.split('.').next().unwrap_or(&self.version)
    }
}
