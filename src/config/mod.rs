//! Configuration constants
//!
//! Compile-time defaults. Runtime settings are loaded by
//! [`crate::core::config`].

pub mod defaults;
