//! The `Warden` facade: every entry point the protocol layer calls.
//!
//! ## Summary
//! All mutable state of a unit lives in one `UnitState` behind a
//! `tokio::sync::RwLock`. Decisions take the read lock and run in parallel;
//! mutations take the write lock, so a reader sees either the old or the new
//! ACL set and never a dangling role reference.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use url::Url;

use warden_core::config::Settings;
use warden_core::constants::{SERVICE_SOURCE_NAME, codes};
use warden_core::types::NodeType;
use warden_core::util::name::validate_resource_name;

use crate::auth::acl::{
    Acl, AclDocument, AclStore, AclTarget, RoleDirectory, ValidatedAcl, validate_document,
};
use crate::auth::casbin::{init_enforcer, remove_subject_policies, replace_node_policies};
use crate::auth::operation::{HttpMethod, MethodContext, operations_for_method};
use crate::auth::privilege::{Privilege, PrivilegeSet};
use crate::auth::role::{AccountRef, CallerIdentity, Resolution, RoleRegistry};
use crate::auth::service::{AuthzRequest, AuthzResult, Authorizer};
use crate::auth::subject::{ExpandedSubjects, RoleRef};
use crate::error::{ServiceError, ServiceResult};
use crate::import::{ImportItem, ImportJob, JobId};
use crate::tree::limits::{TreeLimitEnforcer, TreeLimits};
use crate::tree::node::{NodeId, ResourceNode};
use crate::tree::store::ResourceTree;

/// Mutable state of a unit.
struct UnitState {
    tree: ResourceTree,
    roles: RoleRegistry,
    acls: AclStore,
    enforcer: casbin::Enforcer,
}

/// Directory view over a tree and registry, for ACL validation.
struct Directory<'a> {
    tree: &'a ResourceTree,
    roles: &'a RoleRegistry,
}

impl RoleDirectory for Directory<'_> {
    fn cell_exists(&self, cell: &str) -> bool {
        self.tree.cell(cell).is_some()
    }

    fn box_exists(&self, cell: &str, box_name: &str) -> bool {
        self.tree.box_node(cell, box_name).is_some()
    }

    fn role_exists(&self, role: &RoleRef) -> bool {
        self.roles.contains_role(role)
    }
}

struct Inner {
    unit_url: Url,
    limits: TreeLimitEnforcer,
    state: RwLock<UnitState>,
    jobs: RwLock<HashMap<JobId, ImportJob>>,
}

/// Authorization engine of one unit. Cheap to clone.
#[derive(Clone)]
pub struct Warden {
    inner: Arc<Inner>,
}

impl Warden {
    /// ## Summary
    /// Builds an empty unit from configuration.
    ///
    /// ## Errors
    /// Returns an error if the unit URL is unusable or the enforcer cannot be
    /// initialized.
    pub async fn from_settings(settings: &Settings) -> ServiceResult<Self> {
        let unit_url = settings.unit.base_url()?;
        Self::new(unit_url, settings.limits.into()).await
    }

    /// ## Summary
    /// Builds an empty unit rooted at `unit_url`.
    ///
    /// ## Errors
    /// Returns `InvalidConfiguration` for a URL that cannot be a base, or a
    /// Casbin error if the enforcer cannot be initialized.
    pub async fn new(unit_url: Url, limits: TreeLimits) -> ServiceResult<Self> {
        if unit_url.cannot_be_a_base() {
            return Err(ServiceError::InvalidConfiguration(format!(
                "unit url '{unit_url}' cannot be a base"
            )));
        }
        let enforcer = init_enforcer().await?;
        tracing::info!(
            unit = %unit_url,
            max_collection_depth = limits.max_collection_depth,
            max_child_resource_count = limits.max_child_resource_count,
            "Unit initialized"
        );
        Ok(Self {
            inner: Arc::new(Inner {
                unit_url,
                limits: TreeLimitEnforcer::new(limits),
                state: RwLock::new(UnitState {
                    tree: ResourceTree::new(),
                    roles: RoleRegistry::new(),
                    acls: AclStore::new(),
                    enforcer,
                }),
                jobs: RwLock::new(HashMap::new()),
            }),
        })
    }

    #[must_use]
    pub fn unit_url(&self) -> &Url {
        &self.inner.unit_url
    }

    #[must_use]
    pub fn limits(&self) -> TreeLimits {
        self.inner.limits.limits()
    }

    /// ## Errors
    /// Returns `InvariantViolation` if the unit URL cannot be a base.
    pub fn role_url(&self, role: &RoleRef) -> ServiceResult<Url> {
        role.to_url(&self.inner.unit_url)
    }

    // ---- tree ----

    /// ## Errors
    /// Returns `InvalidName` for a bad name and `MethodNotAllowed` if the
    /// Cell exists.
    #[tracing::instrument(skip(self))]
    pub async fn create_cell(&self, name: &str) -> ServiceResult<NodeId> {
        validate_resource_name(name)?;
        let mut state = self.inner.state.write().await;
        let id = state.tree.insert_cell(name)?;
        tracing::info!(%id, "Cell created");
        Ok(id)
    }

    /// ## Errors
    /// Returns `NotFound` for an unknown Cell, `InvalidName` for a bad name and
    /// `MethodNotAllowed` if the Box exists.
    #[tracing::instrument(skip(self))]
    pub async fn create_box(
        &self,
        cell: &str,
        name: &str,
        require_schema_authz: bool,
    ) -> ServiceResult<NodeId> {
        validate_resource_name(name)?;
        let mut state = self.inner.state.write().await;
        let cell_id = state
            .tree
            .cell(cell)
            .ok_or_else(|| ServiceError::NotFound(format!("cell '{cell}'")))?;
        let id = state.tree.insert_child(cell_id, name, NodeType::Box)?;
        state.tree.set_require_schema_authz(id, require_schema_authz)?;
        tracing::info!(%id, "Box created");
        Ok(id)
    }

    /// ## Summary
    /// Creates a collection, file or schema resource below `parent`.
    ///
    /// Creating a Service collection also creates its reserved source
    /// collection.
    ///
    /// ## Errors
    /// - `InvalidName` for a bad name
    /// - `MethodNotAllowed` if the parent cannot hold the type or the name is taken
    /// - `LimitExceeded` if the depth or child-count limit would be exceeded
    #[tracing::instrument(skip(self))]
    pub async fn create_node(
        &self,
        parent: NodeId,
        name: &str,
        node_type: NodeType,
    ) -> ServiceResult<NodeId> {
        let mut state = self.inner.state.write().await;
        let id = create_in(&self.inner.limits, &mut state.tree, parent, name, node_type)?;
        tracing::debug!(%id, "Node created");
        Ok(id)
    }

    /// ## Summary
    /// Removes a node and drops its ACL.
    ///
    /// A Service collection is removed together with its empty source
    /// collection.
    ///
    /// ## Errors
    /// - `HasChildren` if the node is not empty
    /// - `HasRelated` for a Box that still has roles bound to it
    /// - `MethodNotAllowed` for Cells and the reserved source collection
    #[tracing::instrument(skip(self))]
    pub async fn delete_node(&self, node: NodeId) -> ServiceResult<()> {
        let mut state = self.inner.state.write().await;
        let target = state.tree.node(node)?;

        match target.node_type {
            NodeType::Cell => {
                return Err(ServiceError::MethodNotAllowed(
                    "cells are not deleted through the resource tree".to_string(),
                ));
            }
            NodeType::ServiceSource => {
                return Err(ServiceError::MethodNotAllowed(format!(
                    "'{SERVICE_SOURCE_NAME}' cannot be deleted"
                )));
            }
            _ => {}
        }
        if !deletable(&state.tree, target) {
            return Err(ServiceError::HasChildren(state.tree.path_of(node)));
        }
        if target.node_type == NodeType::Box
            && let Some(role) = state.roles.roles_of_box(&target.cell, &target.name).next()
        {
            return Err(ServiceError::HasRelated(format!(
                "role {role} is bound to box '{}'",
                target.name
            )));
        }

        let removed = state.tree.remove_subtree(node)?;
        for id in &removed {
            if state.acls.drop_node(*id).is_some() {
                replace_node_policies(&mut state.enforcer, *id, &[]).await?;
            }
        }
        tracing::info!(%node, removed = removed.len(), "Node deleted");
        Ok(())
    }

    /// ## Summary
    /// Moves `node` below `destination` as `new_name`.
    ///
    /// ## Errors
    /// - `MoveRejected` with the matching code for Boxes, the reserved source
    ///   collection, destinations inside OData or Service collections or
    ///   files, and names already taken at the destination
    /// - `MethodNotAllowed` for moves into the moved subtree or another Box
    /// - `LimitExceeded` if the destination cannot take the subtree
    #[tracing::instrument(skip(self))]
    pub async fn move_node(
        &self,
        node: NodeId,
        destination: NodeId,
        new_name: &str,
    ) -> ServiceResult<()> {
        let mut state = self.inner.state.write().await;
        let tree = &state.tree;
        let moved = tree.node(node)?;
        let dest = tree.node(destination)?;

        check_movable(moved)?;
        if moved.parent == Some(destination) && moved.name == new_name {
            return Ok(());
        }
        validate_resource_name(new_name)?;
        check_destination(moved, dest)?;
        if tree.child(destination, new_name).is_some() {
            return Err(ServiceError::MoveRejected {
                code: codes::RESOURCE_PROHIBITED_TO_OVERWRITE,
                message: format!("'{new_name}' already exists at the destination"),
            });
        }
        if tree.is_within(destination, node) {
            return Err(ServiceError::MethodNotAllowed(
                "destination lies inside the moved resource".to_string(),
            ));
        }
        if dest.cell != moved.cell || dest.owning_box != moved.owning_box {
            return Err(ServiceError::MethodNotAllowed(
                "resources cannot be moved to another box".to_string(),
            ));
        }
        self.inner.limits.check_move(tree, node, destination)?;

        state.tree.relink(node, destination, new_name)?;
        tracing::info!(%node, %destination, "Node moved");
        Ok(())
    }

    /// ## Errors
    /// Returns `NotFound` for an unknown Cell or path.
    pub async fn resolve_path(&self, cell: &str, path: &str) -> ServiceResult<NodeId> {
        self.inner.state.read().await.tree.resolve(cell, path)
    }

    /// ## Errors
    /// Returns `NotFound` for an unknown node.
    pub async fn node(&self, node: NodeId) -> ServiceResult<ResourceNode> {
        self.inner.state.read().await.tree.node(node).cloned()
    }

    /// ## Summary
    /// Checks whether `parent` may receive one more child of `child_type`.
    ///
    /// ## Errors
    /// Returns `LimitExceeded` if it may not.
    pub async fn check_create_limits(
        &self,
        parent: NodeId,
        child_type: NodeType,
    ) -> ServiceResult<()> {
        let state = self.inner.state.read().await;
        self.inner.limits.check_create(&state.tree, parent, child_type)
    }

    /// Whether requests on `node` need schema-level authorization, as
    /// configured on its Box.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown node.
    pub async fn requires_schema_authz(&self, node: NodeId) -> ServiceResult<bool> {
        let state = self.inner.state.read().await;
        Ok(state
            .tree
            .ancestors(state.tree.node(node)?.id)
            .find(|n| n.node_type == NodeType::Box)
            .is_some_and(|b| b.require_schema_authz))
    }

    // ---- roles and accounts ----

    /// ## Errors
    /// - `NotFound` if the Cell or named Box does not exist
    /// - `InvalidName` for a bad role name
    /// - `MethodNotAllowed` if the role exists
    #[tracing::instrument(skip(self), fields(role = %role))]
    pub async fn create_role(&self, role: RoleRef) -> ServiceResult<()> {
        validate_resource_name(&role.name)?;
        let mut state = self.inner.state.write().await;
        if state.tree.cell(&role.cell).is_none() {
            return Err(ServiceError::NotFound(format!("cell '{}'", role.cell)));
        }
        if let Some(box_name) = role.box_name.as_deref()
            && state.tree.box_node(&role.cell, box_name).is_none()
        {
            return Err(ServiceError::NotFound(format!("box '{box_name}'")));
        }
        state.roles.insert_role(role)?;
        tracing::info!("Role created");
        Ok(())
    }

    /// ## Summary
    /// Deletes a role, its account links and every ACE naming it.
    ///
    /// Returns the number of ACLs the cascade changed.
    ///
    /// ## Errors
    /// Returns `NotFound` if the role does not exist.
    #[tracing::instrument(skip(self), fields(role = %role))]
    pub async fn delete_role(&self, role: &RoleRef) -> ServiceResult<usize> {
        let mut state = self.inner.state.write().await;
        let unlinked = state.roles.remove_role(role)?;
        let touched = state.acls.remove_role(role);
        remove_subject_policies(&mut state.enforcer, &role.casbin_subject()).await?;
        tracing::info!(
            acls = touched.len(),
            links = unlinked,
            "Role deleted, ACEs removed"
        );
        Ok(touched.len())
    }

    /// ## Errors
    /// `NotFound` for an unknown Cell, `InvalidName`, or `MethodNotAllowed`
    /// if the account exists.
    #[tracing::instrument(skip(self), fields(account = %account))]
    pub async fn create_account(&self, account: AccountRef) -> ServiceResult<()> {
        validate_resource_name(&account.name)?;
        let mut state = self.inner.state.write().await;
        if state.tree.cell(&account.cell).is_none() {
            return Err(ServiceError::NotFound(format!("cell '{}'", account.cell)));
        }
        state.roles.insert_account(account)
    }

    /// ## Errors
    /// Returns `NotFound` if the account does not exist.
    #[tracing::instrument(skip(self), fields(account = %account))]
    pub async fn delete_account(&self, account: &AccountRef) -> ServiceResult<()> {
        self.inner.state.write().await.roles.remove_account(account)
    }

    /// ## Errors
    /// See [`RoleRegistry::link`].
    pub async fn link_account_role(
        &self,
        account: &AccountRef,
        role: &RoleRef,
    ) -> ServiceResult<()> {
        self.inner.state.write().await.roles.link(account, role)
    }

    /// ## Errors
    /// See [`RoleRegistry::unlink`].
    pub async fn unlink_account_role(
        &self,
        account: &AccountRef,
        role: &RoleRef,
    ) -> ServiceResult<()> {
        self.inner.state.write().await.roles.unlink(account, role)
    }

    pub async fn resolve(&self, caller: &CallerIdentity) -> Resolution {
        self.inner.state.read().await.roles.resolve(caller)
    }

    // ---- ACLs ----

    /// ## Summary
    /// Validates `document` and replaces the node's ACL with it.
    ///
    /// An empty ACE list clears the ACL. Returns the previous ACL.
    ///
    /// ## Errors
    /// Returns `AclValidation` with a stable code; nothing is changed then.
    #[tracing::instrument(skip(self, document), fields(aces = document.aces.len()))]
    pub async fn set_acl(&self, node: NodeId, document: &AclDocument) -> ServiceResult<Option<Acl>> {
        let mut state = self.inner.state.write().await;
        let validated = self.validate_for(&state.tree, &state.roles, node, document)?;
        let previous = store_acl(&mut state, node, validated).await?;
        tracing::info!(%node, "ACL replaced");
        if let Some(acl) = state.acls.get(node) {
            tracing::debug!(%node, version = acl.version, aces = %acl.summary(), "Current ACL");
        }
        Ok(previous)
    }

    /// Current ACL of a node; empty if none was ever set.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown node.
    pub async fn get_acl(&self, node: NodeId) -> ServiceResult<Acl> {
        let state = self.inner.state.read().await;
        state.tree.node(node)?;
        Ok(state.acls.get(node).cloned().unwrap_or_default())
    }

    fn validate_for(
        &self,
        tree: &ResourceTree,
        roles: &RoleRegistry,
        node: NodeId,
        document: &AclDocument,
    ) -> ServiceResult<ValidatedAcl> {
        let target = tree.node(node)?;
        validate_document(
            document,
            &Directory { tree, roles },
            &self.inner.unit_url,
            AclTarget {
                cell: &target.cell,
                owning_box: target.owning_box.as_deref(),
            },
        )
    }

    // ---- decisions ----

    /// ## Summary
    /// Decides whether `caller` may perform `request`.
    ///
    /// Master callers are always allowed.
    ///
    /// ## Errors
    /// Returns `NotFound` for unknown nodes and `CasbinError` if evaluation fails.
    #[tracing::instrument(skip(self), fields(operation = %request.operation))]
    pub async fn authorize(
        &self,
        caller: &CallerIdentity,
        request: &AuthzRequest,
    ) -> ServiceResult<AuthzResult> {
        let state = self.inner.state.read().await;
        match state.roles.resolve(caller) {
            Resolution::Bypass => {
                state.tree.node(request.target)?;
                Ok(AuthzResult::Allowed)
            }
            Resolution::Subjects(subjects) => {
                Authorizer::new(&state.tree, &state.enforcer).check(&subjects, request)
            }
        }
    }

    /// ## Errors
    /// Returns `PrivilegeLacking` on denial, otherwise as [`Self::authorize`].
    pub async fn require(
        &self,
        caller: &CallerIdentity,
        request: &AuthzRequest,
    ) -> ServiceResult<()> {
        let state = self.inner.state.read().await;
        match state.roles.resolve(caller) {
            Resolution::Bypass => state.tree.node(request.target).map(|_| ()),
            Resolution::Subjects(subjects) => {
                Authorizer::new(&state.tree, &state.enforcer).require(&subjects, request)
            }
        }
    }

    /// ## Summary
    /// Authorizes every operation a method maps to.
    ///
    /// For a method creating a member, `target` is the receiving collection.
    ///
    /// ## Errors
    /// As [`Self::authorize`].
    pub async fn authorize_method(
        &self,
        caller: &CallerIdentity,
        method: HttpMethod,
        context: MethodContext,
        target: NodeId,
        destination: Option<NodeId>,
    ) -> ServiceResult<AuthzResult> {
        for operation in operations_for_method(method, context) {
            let mut request = AuthzRequest::new(operation, target);
            request.destination = destination;
            if !self.authorize(caller, &request).await?.is_allowed() {
                return Ok(AuthzResult::Denied);
            }
        }
        Ok(AuthzResult::Allowed)
    }

    /// ## Summary
    /// Privileges `caller` holds on `node`, with `all` expanded.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown node.
    pub async fn current_user_privileges(
        &self,
        caller: &CallerIdentity,
        node: NodeId,
    ) -> ServiceResult<PrivilegeSet> {
        let state = self.inner.state.read().await;
        match state.roles.resolve(caller) {
            Resolution::Bypass => {
                state.tree.node(node)?;
                Ok([Privilege::All].into_iter().collect::<PrivilegeSet>().expanded())
            }
            Resolution::Subjects(subjects) => {
                Authorizer::new(&state.tree, &state.enforcer).granted(&subjects, node)
            }
        }
    }

    /// Subjects a caller is evaluated with; `None` for bypassing callers.
    pub async fn subjects_of(&self, caller: &CallerIdentity) -> Option<ExpandedSubjects> {
        match self.resolve(caller).await {
            Resolution::Bypass => None,
            Resolution::Subjects(subjects) => Some(subjects),
        }
    }

    // ---- bulk import ----

    /// ## Summary
    /// Starts installing `items` below a Box and returns the job id at once.
    ///
    /// ## Errors
    /// Returns `NotFound` if `box_id` is not a Box.
    #[tracing::instrument(skip(self, items), fields(items = items.len()))]
    pub async fn start_import(&self, box_id: NodeId, items: Vec<ImportItem>) -> ServiceResult<JobId> {
        {
            let state = self.inner.state.read().await;
            if state.tree.node(box_id)?.node_type != NodeType::Box {
                return Err(ServiceError::NotFound(format!("box {box_id}")));
            }
        }

        let job = ImportJob::processing(items.len());
        let id = job.id;
        self.inner.jobs.write().await.insert(id, job);

        let warden = self.clone();
        tokio::spawn(async move {
            let outcome = warden.run_import(box_id, &items).await;
            match &outcome {
                Ok(()) => tracing::info!(job = %id, items = items.len(), "Import completed"),
                Err(err) => tracing::warn!(job = %id, code = err.code(), error = %err, "Import failed"),
            }
            if let Some(job) = warden.inner.jobs.write().await.get_mut(&id) {
                job.finish(&outcome);
            }
        });
        Ok(id)
    }

    pub async fn import_status(&self, job: JobId) -> Option<ImportJob> {
        self.inner.jobs.read().await.get(&job).cloned()
    }

    /// Applies every item to a copy of the tree and commits only if all pass.
    async fn run_import(&self, box_id: NodeId, items: &[ImportItem]) -> ServiceResult<()> {
        let mut state = self.inner.state.write().await;
        let mut tree = state.tree.clone();
        let mut acls = Vec::new();

        for item in items {
            let (parent_path, name) = item.split_path();
            let parent = resolve_below(&tree, box_id, parent_path)?;
            let id = create_in(&self.inner.limits, &mut tree, parent, name, item.node_type)?;
            if let Some(document) = &item.acl {
                acls.push((id, self.validate_for(&tree, &state.roles, id, document)?));
            }
        }

        state.tree = tree;
        for (id, acl) in acls {
            store_acl(&mut state, id, acl).await?;
        }
        Ok(())
    }
}

/// Shared create path for direct calls and imports.
fn create_in(
    limits: &TreeLimitEnforcer,
    tree: &mut ResourceTree,
    parent: NodeId,
    name: &str,
    node_type: NodeType,
) -> ServiceResult<NodeId> {
    validate_resource_name(name)?;
    if !node_type.is_creatable_child() {
        return Err(ServiceError::MethodNotAllowed(format!(
            "{node_type} cannot be created as a resource"
        )));
    }
    let parent_node = tree.node(parent)?;
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
    limits.check_create(tree, parent, node_type)?;

    let id = tree.insert_child(parent, name, node_type)?;
    if node_type == NodeType::ServiceCollection {
        tree.insert_child(id, SERVICE_SOURCE_NAME, NodeType::ServiceSource)?;
    }
    Ok(id)
}

fn resolve_below(tree: &ResourceTree, root: NodeId, path: &str) -> ServiceResult<NodeId> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .try_fold(root, |current, segment| {
            tree.child(current, segment)
                .ok_or_else(|| ServiceError::NotFound(format!("'{path}'")))
        })
}

/// Empty nodes, and Service collections whose source collection is empty.
fn deletable(tree: &ResourceTree, node: &ResourceNode) -> bool {
    if node.node_type == NodeType::ServiceCollection {
        return node.children.iter().all(|(name, child)| {
            name == SERVICE_SOURCE_NAME && tree.get(*child).is_some_and(|c| !c.has_children())
        });
    }
    !node.has_children()
}

fn check_movable(node: &ResourceNode) -> ServiceResult<()> {
    match node.node_type {
        NodeType::Box => Err(ServiceError::MoveRejected {
            code: codes::PROHIBITED_TO_MOVE_BOX,
            message: "boxes cannot be moved".to_string(),
        }),
        NodeType::ServiceSource => Err(ServiceError::MoveRejected {
            code: codes::SERVICE_SOURCE_PROHIBITED_TO_MOVE,
            message: format!("'{SERVICE_SOURCE_NAME}' cannot be moved"),
        }),
        NodeType::Cell | NodeType::SchemaEntity => Err(ServiceError::MethodNotAllowed(format!(
            "{} cannot be moved",
            node.node_type
        ))),
        NodeType::WebDavCollection
        | NodeType::ODataCollection
        | NodeType::ServiceCollection
        | NodeType::File => Ok(()),
    }
}

fn check_destination(moved: &ResourceNode, dest: &ResourceNode) -> ServiceResult<()> {
    let rejected = |code: &'static str, what: &str| ServiceError::MoveRejected {
        code,
        message: format!("cannot move {} into {what}", moved.node_type),
    };
    match dest.node_type {
        NodeType::Box | NodeType::WebDavCollection => Ok(()),
        NodeType::ServiceSource if moved.node_type == NodeType::File => Ok(()),
        NodeType::ServiceSource | NodeType::ServiceCollection => Err(rejected(
            codes::PROHIBITED_TO_MOVE_SERVICE_COLLECTION,
            "a service collection",
        )),
        NodeType::ODataCollection => Err(rejected(
            codes::PROHIBITED_TO_MOVE_ODATA_COLLECTION,
            "an OData collection",
        )),
        NodeType::File => Err(rejected(codes::PROHIBITED_TO_MOVE_FILE, "a file")),
        NodeType::Cell | NodeType::SchemaEntity => Err(ServiceError::MethodNotAllowed(format!(
            "{} cannot hold moved resources",
            dest.node_type
        ))),
    }
}

async fn store_acl(
    state: &mut UnitState,
    node: NodeId,
    acl: ValidatedAcl,
) -> ServiceResult<Option<Acl>> {
    replace_node_policies(&mut state.enforcer, node, &acl.aces).await?;
    Ok(state.acls.replace(node, acl))
}
