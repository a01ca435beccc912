//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use commands::{Commands, Project};

/// alarmpkg - Arch Linux ARM package mirror maintenance
///
/// Tracks upstream versions of mirrored packages and rebuilds the ones
/// that fall behind.
#[derive(Parser, Debug)]
#[command(name = "alarmpkg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, env = "ALARMPKG_ROOT", global = true)]
    pub root: Option<PathBuf>,

    /// Package database path (defaults to <root>/db/db.json)
    #[arg(long, env = "ALARMPKG_DB", global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        if let Some(cmd) = self.command {
            let project = Project::discover(self.root, self.db)?;
            cmd.run(&project).await
        } else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
