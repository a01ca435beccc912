//! Linux kernel preparation
//!
//! Downloads the kernel tarball for the record's version, generates an
//! AArch64 `defconfig`, copies it next to the PKGBUILD and rewrites the
//! PKGBUILD's `pkgver` and `sha256sums`. All work happens in a scratch
//! directory that is removed afterwards, whether or not the task succeeded.

use async_trait::async_trait;
use std::path::Path;

use crate::config::defaults;
use crate::core::record::{PackageRecord, TaskKind};
use crate::core::registry::Task;
use crate::error::{AlarmError, TaskError};
use crate::infra::{download, filesystem, process};
use crate::tasks::{pkgbuild, TaskContext};

/// Tools the preparation shells out to
const REQUIRED_TOOLS: &[&str] = &["tar", "make"];

/// Prepare procedure for the kernel package
#[derive(Debug, Clone)]
pub struct PrepareLinux {
    ctx: TaskContext,
}

impl PrepareLinux {
    /// Create the procedure
    pub fn new(ctx: TaskContext) -> Self {
        Self { ctx }
    }

    async fn prepare_in(&self, scratch: &Path, record: &PackageRecord) -> Result<(), AlarmError> {
        let version = record.version.as_str();
        let url = record
            .urls
            .source_url_with(&[record.major_version(), version]);
        let tarball_name = format!("linux-{version}.tar.xz");
        let tarball = scratch.join(&tarball_name);

        tracing::info!("Downloading {url}");
        let fetched = self
            .ctx
            .downloads
            .download(&url, &tarball, self.ctx.progress_for(&record.name))
            .await?;
        tracing::debug!("Downloaded {} bytes", fetched.size);

        tracing::info!("Extracting {tarball_name}");
        process::run("tar", &["-xf", &tarball_name], scratch, &[]).await?;

        let tree = scratch.join(format!("linux-{version}"));
        tracing::info!("Generating AArch64 kernel configuration");
        process::run("make", &["ARCH=arm64", "defconfig"], &tree, &[]).await?;

        let config = tree.join(".config");
        let pkgbuild_dir = self.ctx.layout.pkgbuild_dir(record);
        filesystem::copy_file(&config, &pkgbuild_dir.join("config"))?;

        let config_sum = download::file_checksum(&config)?;
        let pkgver = format!("{version}.{}", defaults::TARGET_ARCH);
        pkgbuild::rewrite_pkgbuild(
            &pkgbuild_dir,
            &pkgver,
            &[&fetched.checksum, "SKIP", &config_sum],
        )?;

        tracing::info!("Updated PKGBUILD to {pkgver}");
        Ok(())
    }
}

#[async_trait]
impl Task for PrepareLinux {
    async fn execute(&self, record: &PackageRecord) -> Result<(), TaskError> {
        let task = record.task(TaskKind::Prepare);

        for tool in REQUIRED_TOOLS {
            process::require_tool(tool).map_err(|e| TaskError::execution(task, e))?;
        }

        let scratch = self.ctx.layout.scratch_dir(&record.name);
        filesystem::remove_dir_all(&scratch).map_err(|e| TaskError::execution(task, e))?;
        filesystem::create_dir_all(&scratch).map_err(|e| TaskError::execution(task, e))?;

        let result = self.prepare_in(&scratch, record).await;

        tracing::debug!("Cleaning up {}", scratch.display());
        let cleanup = filesystem::remove_dir_all(&scratch);

        result.map_err(|e| TaskError::execution(task, e))?;
        cleanup.map_err(|e| TaskError::execution(task, e))
    }
}
