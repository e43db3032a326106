//! Tree-shape limits consulted before every structural change.
//!
//! Depth is counted in collections below the Box: the Box is level 0 and a
//! collection directly inside it is level 1. Files and the reserved source
//! collection of a Service collection do not add a level. The child-resource
//! limit counts files and collections under one parent together.

use thiserror::Error;

use warden_core::config::LimitsConfig;
use warden_core::constants::codes;
use warden_core::types::NodeType;

use super::node::NodeId;
use super::store::ResourceTree;
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LimitViolation {
    #[error("collection depth {depth} exceeds the maximum of {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error("parent already holds {count} children, the maximum is {max}")]
    ChildCountExceeded { count: usize, max: usize },
}

impl LimitViolation {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DepthExceeded { .. } => codes::COLLECTION_DEPTH_ERROR,
            Self::ChildCountExceeded { .. } => codes::COLLECTION_CHILDRESOURCE_ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeLimits {
    pub max_collection_depth: usize,
    pub max_child_resource_count: usize,
}

impl From<LimitsConfig> for TreeLimits {
    fn from(config: LimitsConfig) -> Self {
        Self {
            max_collection_depth: config.max_collection_depth,
            max_child_resource_count: config.max_child_resource_count,
        }
    }
}

impl Default for TreeLimits {
    fn default() -> Self {
        LimitsConfig::default().into()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeLimitEnforcer {
    limits: TreeLimits,
}

impl TreeLimitEnforcer {
    #[must_use]
    pub const fn new(limits: TreeLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub const fn limits(&self) -> TreeLimits {
        self.limits
    }

    /// ## Summary
    /// Checks whether `parent` may receive one more child of type `child_type`.
    ///
    /// ## Errors
    /// Returns `LimitExceeded` when the parent is full or a new collection
    /// would sit deeper than allowed, and `NotFound` for an unknown parent.
    pub fn check_create(
        &self,
        tree: &ResourceTree,
        parent: NodeId,
        child_type: NodeType,
    ) -> ServiceResult<()> {
        let parent_node = tree.node(parent)?;
        self.check_child_count(parent_node.child_count())?;

        if adds_level(child_type) {
            self.check_depth(tree.collection_depth(parent)? + 1)?;
        }
        Ok(())
    }

    /// ## Summary
    /// Checks whether the subtree rooted at `node` fits below `destination`.
    ///
    /// A move within the same parent (a rename) does not change the count.
    ///
    /// ## Errors
    /// Returns `LimitExceeded` when the destination is full or the deepest
    /// collection of the moved subtree would exceed the depth limit.
    pub fn check_move(
        &self,
        tree: &ResourceTree,
        node: NodeId,
        destination: NodeId,
    ) -> ServiceResult<()> {
        let moved = tree.node(node)?;
        if moved.parent != Some(destination) {
            self.check_child_count(tree.node(destination)?.child_count())?;
        }

        let height = tree.collection_height(node)?;
        if height > 0 {
            self.check_depth(tree.collection_depth(destination)? + height)?;
        }
        Ok(())
    }

    fn check_child_count(&self, count: usize) -> ServiceResult<()> {
        let max = self.limits.max_child_resource_count;
        if count >= max {
            tracing::debug!(count, max, "Child resource limit reached");
            return Err(ServiceError::LimitExceeded(
                LimitViolation::ChildCountExceeded { count, max },
            ));
        }
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> ServiceResult<()> {
        let max = self.limits.max_collection_depth;
        if depth > max {
            tracing::debug!(depth, max, "Collection depth limit reached");
            return Err(ServiceError::LimitExceeded(LimitViolation::DepthExceeded {
                depth,
                max,
            }));
        }
        Ok(())
    }
}

/// Returns `true` for node types that count as a collection level.
#[must_use]
pub const fn adds_level(node_type: NodeType) -> bool {
    node_type.is_collection() && !matches!(node_type, NodeType::ServiceSource)
}
