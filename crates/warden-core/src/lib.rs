//! Shared building blocks for the warden authorization engine.
//!
//! This crate holds everything that has no dependency on the enforcement
//! backend: configuration, stable error codes, node types, and resource name
//! validation.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
pub mod util;
