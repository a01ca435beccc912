//! Infrastructure layer
//!
//! Handles all I/O operations: network, filesystem, and external processes.

pub mod download;
pub mod filesystem;
pub mod layout;
pub mod process;
