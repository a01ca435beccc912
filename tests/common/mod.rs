//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use alarmpkg::core::store::{NewPackage, PackageStore};

/// Test project context
///
/// Creates a temporary project root and provides utilities for setting
/// up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a test project whose database holds [`SAMPLE_DB`]
    pub fn with_sample_db() -> Self {
        let project = Self::new();
        project.create_file("db/db.json", SAMPLE_DB);
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Default database location
    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("db").join("db.json")
    }

    /// Open the project's database
    pub fn store(&self) -> PackageStore {
        PackageStore::open(&self.db_path()).expect("Failed to open package database")
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Run the alarmpkg binary with `--root` pointing at this project
    pub fn run(&self, args: &[&str]) -> Output {
        run_alarmpkg(self.dir.path(), args)
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the alarmpkg binary against a project root
pub fn run_alarmpkg(root: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_alarmpkg"));
    cmd.current_dir(root)
        .arg("--root")
        .arg(root)
        .env_remove("ALARMPKG_ROOT")
        .env_remove("ALARMPKG_DB")
        .env("ALARMPKG_CONFIG_DIR", root.join(".no-user-config"));
    for arg in args {
        cmd.arg(arg);
    }
    cmd.output().expect("Failed to execute alarmpkg")
}

/// A package to add, with paths laid out the standard way
pub fn new_package(name: &str, version: &str) -> NewPackage {
    NewPackage {
        name: name.to_string(),
        version: version.to_string(),
        source_type: "https".to_string(),
        source_url: format!("https://example.com/{name}-{{x}}.tar.gz"),
        upstream_url: format!("https://archlinux.org/packages/core/x86_64/{name}/"),
        repository_path: format!("/packages/core/os/aarch64/{name}"),
        pkgbuild_path: format!("/pkgbuild/{name}"),
    }
}

/// Upstream page fragment reporting `version`
pub fn arch_page(version: &str) -> String {
    format!(
        r#"<html><body><div id="pkgdetails"><meta itemprop="version" content="{version}.arch1-1"/></div></body></html>"#
    )
}

/// Sample database with three packages
///
/// - `example-package`: template record, not marked
/// - `linux`: not marked, registered task names
/// - `zlib`: marked for build, with unregistered task names
pub const SAMPLE_DB: &str = r#"{
  "packages": ["example-package", "linux", "zlib"],
  "package_info": {
    "example-package": {
      "version": "1.0",
      "urls": {
        "type": "https",
        "source_url": "https://example.com/example-{x}.tar.gz",
        "upstream_url": "https://example.com/example"
      },
      "paths": {
        "repo": "/packages/core/os/aarch64/example-package",
        "pkgbuild": "/pkgbuild/example-package"
      },
      "buildInfo": {
        "markedForBuild": false,
        "buildFunctionName": "build_pkg_example_package",
        "prepareFunctionName": "prepare_pkg_example_package"
      }
    },
    "linux": {
      "version": "6.1",
      "urls": {
        "type": "https",
        "source_url": "https://cdn.kernel.org/pub/linux/kernel/v{x}.x/linux-{x}.tar.xz",
        "upstream_url": "https://archlinux.org/packages/core/x86_64/linux/"
      },
      "paths": {
        "repo": "/packages/core/os/aarch64/linux",
        "pkgbuild": "/pkgbuild/linux"
      },
      "buildInfo": {
        "markedForBuild": false,
        "buildFunctionName": "build_pkg_linux",
        "prepareFunctionName": "prepare_pkg_linux"
      }
    },
    "zlib": {
      "version": "1.3",
      "urls": {
        "type": "https",
        "source_url": "https://zlib.net/zlib-{x}.tar.gz",
        "upstream_url": "https://archlinux.org/packages/core/x86_64/zlib/"
      },
      "paths": {
        "repo": "/packages/core/os/aarch64/zlib",
        "pkgbuild": "/pkgbuild/zlib"
      },
      "buildInfo": {
        "markedForBuild": true,
        "buildFunctionName": "build_pkg_zlib",
        "prepareFunctionName": "prepare_pkg_zlib"
      }
    }
  }
}
"#;
