//! Error types for alarmpkg
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::record::TaskKind;

/// Package store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Package is not in the store
    #[error("Package '{name}' was not found")]
    PackageNotFound { name: String },

    /// Package already exists
    #[error("Package '{name}' already exists")]
    DuplicatePackage { name: String },

    /// Package name cannot be used as a directory name
    #[error("Invalid package name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// The backing document could not be loaded; nothing can run without it
    #[error("Failed to load package database '{path}': {error}")]
    Load { path: PathBuf, error: String },

    /// The backing document could not be written
    #[error("Failed to write package database '{path}': {error}")]
    Write { path: PathBuf, error: String },
}

/// Task resolution and execution errors
#[derive(Error, Debug)]
pub enum TaskError {
    /// No procedure is registered under the task name
    #[error("No {kind} task registered as '{task}'")]
    NotFound { kind: TaskKind, task: String },

    /// The procedure ran and failed
    #[error("Task '{task}' failed: {cause}")]
    Execution { task: String, cause: String },
}

impl TaskError {
    /// Shorthand for an execution failure
    pub fn execution(task: &str, cause: impl std::fmt::Display) -> Self {
        Self::Execution {
            task: task.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network error
    #[error("Network error downloading '{url}': {error}")]
    NetworkError { url: String, error: String },

    /// IO error
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },

    /// Max retries exceeded
    #[error("Download failed after {retries} retries: {url}")]
    MaxRetriesExceeded { url: String, retries: u32 },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to copy file
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },
}

/// External process errors
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Tool is not installed
    #[error("Required tool '{tool}' was not found in PATH")]
    ToolNotFound { tool: String },

    /// Process could not be started
    #[error("Failed to run '{command}': {error}")]
    Spawn { command: String, error: String },

    /// Process exited unsuccessfully
    #[error("'{command}' exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Top-level alarmpkg error type
#[derive(Error, Debug)]
pub enum AlarmError {
    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Task error
    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    /// Download error
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Process error
    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    /// Config error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
