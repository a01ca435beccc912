//! alarmpkg - package mirror maintenance for Arch Linux ARM
//!
//! Keeps a JSON database of packages in sync with their upstream
//! versions and drives the prepare and build procedures for every
//! package that has fallen behind.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Records, store, registry and batch stages
//! - [`tasks`] - Concrete prepare/build procedures
//! - [`infra`] - Infrastructure layer (network, filesystem, processes)
//! - [`config`] - Constants and defaults
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
pub mod tasks;

#[cfg(test)]
pub mod test_utils;
