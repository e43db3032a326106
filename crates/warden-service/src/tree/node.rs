use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use warden_core::types::NodeType;

/// Arena key of a node. Time-ordered so ids sort by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct NodeId(uuid::Uuid);

impl NodeId {
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A node of the resource tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNode {
    pub id: NodeId,
    pub name: String,
    pub node_type: NodeType,
    /// `None` only for Cells.
    pub parent: Option<NodeId>,
    /// Children by name.
    pub children: BTreeMap<String, NodeId>,
    /// Name of the Cell this node lives in.
    pub cell: String,
    /// Name of the Box this node lives in; `None` for Cells.
    pub owning_box: Option<String>,
    /// Set on Boxes created with the schema-authorization requirement.
    pub require_schema_authz: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceNode {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        node_type: NodeType,
        parent: Option<NodeId>,
        cell: impl Into<String>,
        owning_box: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: NodeId::new(),
            name: name.into(),
            node_type,
            parent,
            children: BTreeMap::new(),
            cell: cell.into(),
            owning_box,
            require_schema_authz: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Children counted against the child-resource limit.
    ///
    /// The reserved source collection of a Service collection is not counted.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children
            .keys()
            .filter(|name| !warden_core::util::name::is_reserved_name(name))
            .count()
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
