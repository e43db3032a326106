//! Arena of resource nodes for every Cell of a unit.
//!
//! ## Summary
//! Nodes are keyed by [`NodeId`] and link to their parent and named children.
//! The arena enforces containment and name uniqueness; name validation,
//! authorization and limits are the caller's concern.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;

use warden_core::types::NodeType;

use super::limits::adds_level;
use super::node::{NodeId, ResourceNode};
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Default)]
pub struct ResourceTree {
    nodes: HashMap<NodeId, ResourceNode>,
    cells: BTreeMap<String, NodeId>,
}

impl ResourceTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&ResourceNode> {
        self.nodes.get(&id)
    }

    /// ## Errors
    /// Returns `NotFound` if no node has this id.
    pub fn node(&self, id: NodeId) -> ServiceResult<&ResourceNode> {
        self.nodes
            .get(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("node {id}")))
    }

    fn node_mut(&mut self, id: NodeId) -> ServiceResult<&mut ResourceNode> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("node {id}")))
    }

    #[must_use]
    pub fn cell(&self, name: &str) -> Option<NodeId> {
        self.cells.get(name).copied()
    }

    #[must_use]
    pub fn box_node(&self, cell: &str, box_name: &str) -> Option<NodeId> {
        let cell = self.nodes.get(self.cells.get(cell)?)?;
        cell.children.get(box_name).copied()
    }

    #[must_use]
    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes.get(&parent)?.children.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// ## Errors
    /// Returns `MethodNotAllowed` if the Cell already exists.
    pub fn insert_cell(&mut self, name: &str) -> ServiceResult<NodeId> {
        if self.cells.contains_key(name) {
            return Err(ServiceError::MethodNotAllowed(format!(
                "cell '{name}' already exists"
            )));
        }
        let node = ResourceNode::new(name, NodeType::Cell, None, name, None);
        let id = node.id;
        self.cells.insert(name.to_string(), id);
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// ## Summary
    /// Attaches a new node below `parent`.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown parent
    /// - `MethodNotAllowed` if the parent type cannot hold `node_type` or
    ///   already has a child called `name`
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        name: &str,
        node_type: NodeType,
    ) -> ServiceResult<NodeId> {
        let parent_node = self.node(parent)?;
        if !parent_node.node_type.accepts_child(node_type) {
            return Err(ServiceError::MethodNotAllowed(format!(
                "{} cannot contain {node_type}",
                parent_node.node_type
            )));
        }
        if parent_node.children.contains_key(name) {
            return Err(ServiceError::MethodNotAllowed(format!(
                "'{name}' already exists"
            )));
        }

        let owning_box = if node_type == NodeType::Box {
            Some(name.to_string())
        } else {
            parent_node.owning_box.clone()
        };
        let node = ResourceNode::new(
            name,
            node_type,
            Some(parent),
            parent_node.cell.clone(),
            owning_box,
        );
        let id = node.id;
        self.nodes.insert(id, node);

        let parent_node = self.node_mut(parent)?;
        parent_node.children.insert(name.to_string(), id);
        parent_node.updated_at = Utc::now();
        Ok(id)
    }

    /// Marks a node as requiring schema authorization.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown node.
    pub fn set_require_schema_authz(&mut self, id: NodeId, required: bool) -> ServiceResult<()> {
        self.node_mut(id)?.require_schema_authz = required;
        Ok(())
    }

    /// ## Summary
    /// Detaches `id` from its parent and removes it with all descendants.
    ///
    /// Returns the removed ids, root first.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown node.
    pub fn remove_subtree(&mut self, id: NodeId) -> ServiceResult<Vec<NodeId>> {
        let removed = self.descendants(id)?;
        let node = self.node(id)?;
        let (parent, name) = (node.parent, node.name.clone());

        match parent {
            Some(parent) => {
                let parent_node = self.node_mut(parent)?;
                parent_node.children.remove(&name);
                parent_node.updated_at = Utc::now();
            }
            None => {
                self.cells.remove(&name);
            }
        }
        for removed_id in &removed {
            self.nodes.remove(removed_id);
        }
        Ok(removed)
    }

    /// ## Summary
    /// Moves `id` below `new_parent` under `new_name`.
    ///
    /// ## Errors
    /// - `NotFound` for unknown nodes
    /// - `MethodNotAllowed` when the node is a Cell or the new name is taken
    pub fn relink(&mut self, id: NodeId, new_parent: NodeId, new_name: &str) -> ServiceResult<()> {
        let node = self.node(id)?;
        let Some(old_parent) = node.parent else {
            return Err(ServiceError::MethodNotAllowed("cells cannot be moved".to_string()));
        };
        let old_name = node.name.clone();
        if self.child(new_parent, new_name).is_some() {
            return Err(ServiceError::MethodNotAllowed(format!(
                "'{new_name}' already exists"
            )));
        }
        // destination must exist before anything is detached
        self.node(new_parent)?;

        let now = Utc::now();
        let old_parent_node = self.node_mut(old_parent)?;
        old_parent_node.children.remove(&old_name);
        old_parent_node.updated_at = now;

        let new_parent_node = self.node_mut(new_parent)?;
        new_parent_node.children.insert(new_name.to_string(), id);
        new_parent_node.updated_at = now;

        let node = self.node_mut(id)?;
        node.parent = Some(new_parent);
        new_name.clone_into(&mut node.name);
        node.updated_at = now;
        Ok(())
    }

    /// Walks from `id` up to its Cell, yielding `id` first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &ResourceNode> + '_ {
        std::iter::successors(self.nodes.get(&id), |node| {
            node.parent.and_then(|parent| self.nodes.get(&parent))
        })
    }

    /// Returns `true` if `ancestor` is `id` itself or one of its ancestors.
    #[must_use]
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).any(|node| node.id == ancestor)
    }

    /// ## Summary
    /// Collection level of a node: 0 for the Box, parent level plus one for
    /// each collection that adds a level.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown node.
    pub fn collection_depth(&self, id: NodeId) -> ServiceResult<usize> {
        self.node(id)?;
        Ok(self
            .ancestors(id)
            .filter(|node| adds_level(node.node_type))
            .count())
    }

    /// ## Summary
    /// Number of collection levels the subtree rooted at `id` spans,
    /// counting `id` itself. 0 for a file.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown node.
    pub fn collection_height(&self, id: NodeId) -> ServiceResult<usize> {
        let node = self.node(id)?;
        let own = usize::from(adds_level(node.node_type));
        let mut deepest = 0;
        for child in node.children.values() {
            deepest = deepest.max(self.collection_height(*child)?);
        }
        Ok(own + deepest)
    }

    /// ## Summary
    /// `id` and all nodes below it, parents before children.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown node.
    pub fn descendants(&self, id: NodeId) -> ServiceResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let node = self.node(next)?;
            out.push(next);
            stack.extend(node.children.values().rev().copied());
        }
        Ok(out)
    }

    /// ## Summary
    /// Resolves a slash-separated path relative to a Cell.
    ///
    /// The empty path resolves to the Cell itself.
    ///
    /// ## Errors
    /// Returns `NotFound` if the Cell or any segment is missing.
    pub fn resolve(&self, cell: &str, path: &str) -> ServiceResult<NodeId> {
        let mut current = self
            .cell(cell)
            .ok_or_else(|| ServiceError::NotFound(format!("cell '{cell}'")))?;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self
                .child(current, segment)
                .ok_or_else(|| ServiceError::NotFound(format!("'{path}' in cell '{cell}'")))?;
        }
        Ok(current)
    }

    /// Path of a node relative to its Cell, without leading slash.
    #[must_use]
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .filter(|node| node.parent.is_some())
            .map(|node| node.name.as_str())
            .collect();
        names.reverse();
        names.join("/")
    }
}
