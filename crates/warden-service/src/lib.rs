//! Hierarchical ACL authorization engine.
//!
//! ## Module Organization
//!
//! - `auth`: privileges, subjects, ACLs, the operation table and the authorizer
//! - `engine`: the `Warden` facade over one unit's state
//! - `error`: `ServiceError` and its stable codes
//! - `fixture`: JSON unit fixtures and queries for `warden-check`
//! - `import`: asynchronous, all-or-nothing bulk import jobs
//! - `tree`: resource tree and its shape limits

pub mod auth;
pub mod engine;
pub mod error;
pub mod fixture;
pub mod import;
pub mod tree;

pub use engine::Warden;
pub use error::{ServiceError, ServiceResult};
