//! Core pipeline logic
//!
//! Records, their persistent store, the task registry, and the two batch
//! stages that run over the store: version sync and prepare/build
//! orchestration. External effects go through [`crate::infra`].
//!
//! # Submodules
//!
//! - [`record`] - Package record types and task naming
//! - [`store`] - JSON-backed package store
//! - [`registry`] - Name to procedure tables
//! - [`orchestrator`] - Prepare/build batch runs
//! - [`sync`] - Upstream version synchronization
//! - [`add`] - Package addition with directory scaffolding
//! - [`remove`] - Package removal
//! - [`config`] - Runtime configuration

pub mod add;
pub mod config;
pub mod orchestrator;
pub mod record;
pub mod registry;
pub mod remove;
pub mod store;
pub mod sync;
