//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod init;
pub mod package;
pub mod shell;
pub mod stage;
pub mod sync;

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use crate::core::config::AppConfig;
use crate::core::record::TaskKind;
use crate::core::store::PackageStore;
use crate::infra::layout::{self, ProjectLayout};
use crate::tasks::TaskContext;

/// Resolved project: locations plus configuration
#[derive(Debug, Clone)]
pub struct Project {
    /// Project locations
    pub layout: ProjectLayout,
    /// Loaded configuration
    pub config: AppConfig,
}

impl Project {
    /// Resolve the root, load configuration, then resolve the database path
    pub fn discover(root: Option<PathBuf>, db: Option<PathBuf>) -> Result<Self> {
        let root = layout::resolve_root(root).context("Failed to determine project root")?;
        let config = AppConfig::load(&root)
            .with_context(|| format!("Failed to load configuration for {}", root.display()))?;
        let configured = config.database_path(&root);
        let layout = ProjectLayout::resolve(root, db, configured);

        tracing::debug!("Using database {}", layout.db_path().display());
        Ok(Self { layout, config })
    }

    /// Load the package database; fatal when it cannot be read
    pub fn open_store(&self) -> Result<PackageStore> {
        PackageStore::open(self.layout.db_path()).with_context(|| {
            format!(
                "Cannot continue without the package database. Run 'alarmpkg init' in {} to create one.",
                self.layout.root().display()
            )
        })
    }

    /// Collaborators for the built-in procedures
    pub fn task_context(&self) -> TaskContext {
        TaskContext::new(self.layout.clone(), &self.config)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty package database and project directories
    Init,

    /// Compare stored versions with upstream and mark stale packages
    Sync {
        /// Do not copy the database to db.old.json first
        #[arg(long)]
        no_backup: bool,
    },

    /// Run the prepare task of every package marked for build
    Prepare,

    /// Run the build task of every package marked for build
    Build,

    /// Sync, prepare and build in one go
    Run {
        /// Do not copy the database to db.old.json first
        #[arg(long)]
        no_backup: bool,
    },

    /// Package management subcommands
    Package {
        #[command(subcommand)]
        command: PackageCommands,
    },

    /// Interactive database shell
    Shell,
}

/// Package subcommands
#[derive(Subcommand, Debug)]
pub enum PackageCommands {
    /// List packages in processing order
    List,

    /// Show every field of a package
    Info {
        /// Package name
        name: String,
    },

    /// Add a package and create its directories
    Add {
        /// Package name
        name: String,

        /// Initial version
        #[arg(value_name = "VERSION")]
        pkg_version: String,

        /// Source URL template; `{x}` is filled with the major version, then the version
        #[arg(long)]
        source_url: String,

        /// Page reporting the latest upstream version
        #[arg(long)]
        upstream_url: String,

        /// Source type
        #[arg(long = "type", value_name = "TYPE", default_value = "https")]
        source_type: String,

        /// Repository the package belongs to
        #[arg(long, default_value = "core")]
        repo: String,
    },

    /// Remove a package and delete its directories
    Remove {
        /// Package name
        name: String,
    },

    /// Mark a package for build
    Mark {
        /// Package name
        name: String,

        /// Clear the mark instead
        #[arg(long)]
        clear: bool,
    },

    /// Set a package's stored version
    SetVersion {
        /// Package name
        name: String,

        /// New version
        #[arg(value_name = "VERSION")]
        pkg_version: String,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self, project: &Project) -> Result<()> {
        match self {
            Self::Init => init::execute(project).await,
            Self::Sync { no_backup } => sync::execute(project, no_backup).await,
            Self::Prepare => stage::execute(project, TaskKind::Prepare).await,
            Self::Build => stage::execute(project, TaskKind::Build).await,
            Self::Run { no_backup } => {
                sync::execute(project, no_backup).await?;
                stage::execute(project, TaskKind::Prepare).await?;
                stage::execute(project, TaskKind::Build).await
            }
            Self::Package { command } => match command {
                PackageCommands::List => package::execute_list(project).await,
                PackageCommands::Info { name } => package::execute_info(project, &name).await,
                PackageCommands::Add {
                    name,
                    pkg_version,
                    source_url,
                    upstream_url,
                    source_type,
                    repo,
                } => {
                    let request = crate::core::add::AddRequest {
                        name,
                        version: pkg_version,
                        source_type,
                        source_url,
                        upstream_url,
                        repository: repo,
                    };
                    package::execute_add(project, request).await
                }
                PackageCommands::Remove { name } => package::execute_remove(project, &name).await,
                PackageCommands::Mark { name, clear } => {
                    package::execute_mark(project, &name, !clear).await
                }
                PackageCommands::SetVersion { name, pkg_version } => {
                    package::execute_set_version(project, &name, &pkg_version).await
                }
            },
            Self::Shell => shell::execute(project).await,
        }
    }
}
