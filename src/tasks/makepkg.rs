//! `makepkg`-driven builds
//!
//! Runs `makepkg` in the record's pkgbuild directory and copies the
//! resulting package archives (and signatures) into its repository
//! directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::defaults;
use crate::core::record::{PackageRecord, TaskKind};
use crate::core::registry::Task;
use crate::error::{AlarmError, FilesystemError, TaskError};
use crate::infra::{filesystem, process};
use crate::tasks::TaskContext;

/// Build procedure backed by `makepkg`
#[derive(Debug, Clone)]
pub struct MakepkgBuild {
    ctx: TaskContext,
}

impl MakepkgBuild {
    /// Create the procedure
    pub fn new(ctx: TaskContext) -> Self {
        Self { ctx }
    }

    async fn build(&self, record: &PackageRecord) -> Result<Vec<PathBuf>, AlarmError> {
        let pkgbuild_dir = self.ctx.layout.pkgbuild_dir(record);
        let repository_dir = self.ctx.layout.repository_dir(record);

        let args: &[&str] = if self.ctx.sign { &["--sign"] } else { &[] };
        let makeflags = format!("-j{}", self.ctx.jobs);
        tracing::info!("Running makepkg for {} with MAKEFLAGS={makeflags}", record.name);
        process::run("makepkg", args, &pkgbuild_dir, &[("MAKEFLAGS", makeflags)]).await?;

        Ok(collect_artifacts(&pkgbuild_dir, &repository_dir)?)
    }
}

#[async_trait]
impl Task for MakepkgBuild {
    async fn execute(&self, record: &PackageRecord) -> Result<(), TaskError> {
        let task = record.task(TaskKind::Build);
        process::require_tool("makepkg").map_err(|e| TaskError::execution(task, e))?;

        let copied = self
            .build(record)
            .await
            .map_err(|e| TaskError::execution(task, e))?;

        if copied.is_empty() {
            return Err(TaskError::execution(task, "makepkg produced no packages"));
        }

        tracing::info!("Moved {} artifact(s) for {}", copied.len(), record.name);
        Ok(())
    }
}

/// Whether a file name is a package archive or signature
pub fn is_artifact(file_name: &str) -> bool {
    defaults::ARTIFACT_SUFFIXES
        .iter()
        .any(|suffix| file_name.ends_with(suffix))
}

/// Copy package artifacts from `src` (not recursive) into `dest`
///
/// Returns the destination paths, sorted.
pub fn collect_artifacts(src: &Path, dest: &Path) -> Result<Vec<PathBuf>, FilesystemError> {
    let mut copied = Vec::new();

    for entry in WalkDir::new(src)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let name = entry.file_name().to_string_lossy();
        if !is_artifact(&name) {
            continue;
        }

        let target = dest.join(entry.file_name());
        filesystem::copy_file(entry.path(), &target)?;
        tracing::debug!("Copied {} -> {}", entry.path().display(), target.display());
        copied.push(target);
    }

    Ok(copied)
}
