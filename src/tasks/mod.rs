//! Concrete prepare and build procedures
//!
//! [`builtin_registry`] is the single place where task names are bound to
//! procedures. A record naming anything else resolves to
//! [`TaskError::NotFound`](crate::error::TaskError::NotFound).

pub mod linux;
pub mod makepkg;
pub mod pkgbuild;

use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::core::record::{task_name, TaskKind};
use crate::core::registry::{TaskRegistry, TaskTable};
use crate::infra::download::{DownloadManager, ProgressCallback};
use crate::infra::layout::ProjectLayout;

pub use linux::PrepareLinux;
pub use makepkg::MakepkgBuild;

/// Builds a download progress callback for a labelled transfer
pub type ProgressFactory = Arc<dyn Fn(&str) -> ProgressCallback + Send + Sync>;

/// Shared collaborators handed to every procedure
#[derive(Clone)]
pub struct TaskContext {
    /// Project locations
    pub layout: ProjectLayout,
    /// HTTP client for source downloads
    pub downloads: DownloadManager,
    /// Parallel make jobs
    pub jobs: usize,
    /// Sign built packages
    pub sign: bool,
    /// Optional download progress reporting
    pub progress: Option<ProgressFactory>,
}

impl TaskContext {
    /// Context from a layout and configuration
    pub fn new(layout: ProjectLayout, config: &AppConfig) -> Self {
        Self {
            layout,
            downloads: DownloadManager::with_config(
                config.max_retries(),
                crate::config::defaults::RETRY_BASE_DELAY_MS,
            )
            .with_timeout(config.timeout_secs()),
            jobs: config.build_jobs(),
            sign: config.sign_packages(),
            progress: None,
        }
    }

    /// Attach a download progress factory
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressFactory) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Progress callback for one transfer, if reporting is enabled
    pub fn progress_for(&self, label: &str) -> Option<ProgressCallback> {
        self.progress.as_ref().map(|factory| factory(label))
    }
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("layout", &self.layout)
            .field("jobs", &self.jobs)
            .field("sign", &self.sign)
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

/// Registry with every built-in procedure
pub fn builtin_registry(ctx: &TaskContext) -> TaskRegistry {
    let prepare = TaskTable::new(TaskKind::Prepare)
        .with(task_name(TaskKind::Prepare, "linux"), PrepareLinux::new(ctx.clone()));

    let build = TaskTable::new(TaskKind::Build)
        .with(task_name(TaskKind::Build, "linux"), MakepkgBuild::new(ctx.clone()))
        .with(
            task_name(TaskKind::Build, "example-package"),
            MakepkgBuild::new(ctx.clone()),
        );

    TaskRegistry::from_tables(prepare, build)
}
