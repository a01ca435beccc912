//! CLI implementation for `alarmpkg init`

use anyhow::{Context, Result};

use crate::cli::commands::Project;
use crate::cli::output::{print_detail, print_info, print_success};
use crate::core::store::PackageStore;
use crate::infra::filesystem;

/// Execute the init command
///
/// An existing database is opened and validated, never overwritten.
pub async fn execute(project: &Project) -> Result<()> {
    let layout = &project.layout;
    let existed = layout.db_path().exists();

    let store = PackageStore::create(layout.db_path())
        .with_context(|| format!("Failed to initialize {}", layout.db_path().display()))?;

    for dir in layout.skeleton_dirs() {
        filesystem::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    if existed {
        print_info(&format!(
            "Package database already exists at {} ({} package(s))",
            layout.db_path().display(),
            store.len()
        ));
    } else {
        print_success(&format!(
            "Initialized package database at {}",
            layout.db_path().display()
        ));
    }
    print_detail("Directories: pkgbuild/, packages/");

    Ok(())
}
