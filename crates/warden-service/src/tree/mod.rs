//! In-memory resource tree of a unit.
//!
//! ## Module Organization
//!
//! - `node`: node identifiers and records
//! - `store`: arena holding every Cell tree, with path resolution and relinking
//! - `limits`: depth and child-count enforcement for structural changes

pub mod limits;
pub mod node;
pub mod store;

pub use limits::{LimitViolation, TreeLimitEnforcer, TreeLimits};
pub use node::{NodeId, ResourceNode};
pub use store::ResourceTree;
