#![allow(clippy::unused_async, clippy::expect_used, dead_code)]
//! Test helpers for integration tests.
//!
//! Provides utilities for:
//! - Building an isolated unit (one per test) with a Cell and a Box
//! - Seeding collections, roles and ACLs
//! - Asking the engine for decisions with short call sites
//!
//! ## Isolation
//! Every test builds its own `Warden`; nothing is shared between tests, so
//! they run in parallel without contention.

use std::time::Duration;

use url::Url;

pub use warden_test::component::auth::{
    AccountRef, AceDocument, AclDocument, AuthzRequest, AuthzResult, CallerIdentity, HttpMethod,
    MethodContext, Operation, Privilege, PrincipalElement, RoleRef,
};
pub use warden_test::component::codes;
pub use warden_test::component::import::{ImportItem, ImportJob, ImportStatus, JobId};
pub use warden_test::component::tree::{NodeId, NodeType, TreeLimits};
pub use warden_test::component::{ServiceError, Warden};

pub const UNIT_URL: &str = "https://unit.example/";
pub const CELL: &str = "cell1";
pub const BOX: &str = "box1";

/// A unit holding `cell1` with `box1`.
pub struct TestUnit {
    pub warden: Warden,
    pub cell: NodeId,
    pub box_id: NodeId,
}

impl TestUnit {
    /// Unit with default limits.
    pub async fn new() -> Self {
        Self::with_limits(TreeLimits::default()).await
    }

    pub async fn with_limits(limits: TreeLimits) -> Self {
        let unit_url = Url::parse(UNIT_URL).expect("Failed to parse unit URL");
        let warden = Warden::new(unit_url, limits)
            .await
            .expect("Failed to build warden");
        let cell = warden.create_cell(CELL).await.expect("Failed to create cell");
        let box_id = warden
            .create_box(CELL, BOX, false)
            .await
            .expect("Failed to create box");
        Self {
            warden,
            cell,
            box_id,
        }
    }

    pub async fn create(&self, parent: NodeId, name: &str, node_type: NodeType) -> NodeId {
        self.warden
            .create_node(parent, name, node_type)
            .await
            .expect("Failed to create node")
    }

    /// WebDAV collection below `parent`.
    pub async fn collection(&self, parent: NodeId, name: &str) -> NodeId {
        self.create(parent, name, NodeType::WebDavCollection).await
    }

    pub async fn file(&self, parent: NodeId, name: &str) -> NodeId {
        self.create(parent, name, NodeType::File).await
    }

    /// Nested WebDAV collections `c1/c2/...` below the Box, outermost first.
    pub async fn chain(&self, levels: usize) -> Vec<NodeId> {
        let mut parent = self.box_id;
        let mut out = Vec::with_capacity(levels);
        for level in 1..=levels {
            parent = self.collection(parent, &format!("c{level}")).await;
            out.push(parent);
        }
        out
    }

    /// Role bound to `box1`.
    pub async fn role(&self, name: &str) -> RoleRef {
        let role = RoleRef::new(CELL, Some(BOX), name);
        self.warden
            .create_role(role.clone())
            .await
            .expect("Failed to create role");
        role
    }

    /// Role bound to no Box.
    pub async fn cell_role(&self, name: &str) -> RoleRef {
        let role = RoleRef::new(CELL, None, name);
        self.warden
            .create_role(role.clone())
            .await
            .expect("Failed to create role");
        role
    }

    /// Absolute role URL usable as an ACE `href`.
    pub fn href(&self, role: &RoleRef) -> String {
        self.warden
            .role_url(role)
            .expect("Failed to build role URL")
            .to_string()
    }

    /// Replaces the ACL of `node` with one ACE for `role`.
    pub async fn grant(&self, node: NodeId, role: &RoleRef, privileges: &[Privilege]) {
        self.set_aces(node, vec![AceDocument::href(self.href(role), privileges)])
            .await;
    }

    /// Replaces the ACL of `node` with one ACE for everyone.
    pub async fn grant_all(&self, node: NodeId, privileges: &[Privilege]) {
        self.set_aces(node, vec![AceDocument::all(privileges)]).await;
    }

    pub async fn set_aces(&self, node: NodeId, aces: Vec<AceDocument>) {
        self.warden
            .set_acl(node, &AclDocument { base: None, aces })
            .await
            .expect("Failed to set ACL");
    }

    pub async fn allowed(&self, caller: &CallerIdentity, operation: Operation, target: NodeId) -> bool {
        self.warden
            .authorize(caller, &AuthzRequest::new(operation, target))
            .await
            .expect("Failed to authorize")
            .is_allowed()
    }

    pub async fn move_allowed(
        &self,
        caller: &CallerIdentity,
        target: NodeId,
        destination: NodeId,
    ) -> bool {
        let request = AuthzRequest::new(Operation::Move, target).with_destination(destination);
        self.warden
            .authorize(caller, &request)
            .await
            .expect("Failed to authorize")
            .is_allowed()
    }

    /// Waits until the job leaves `Processing`.
    pub async fn wait_for_import(&self, job: JobId) -> ImportJob {
        for _ in 0..500 {
            let current = self
                .warden
                .import_status(job)
                .await
                .expect("Import job disappeared");
            if current.status.is_terminal() {
                return current;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("import job {job} did not finish");
    }
}

/// Caller carrying exactly one role.
pub fn caller(role: &RoleRef) -> CallerIdentity {
    CallerIdentity::Roles(vec![role.clone()])
}
