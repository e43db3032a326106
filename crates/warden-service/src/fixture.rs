//! JSON fixtures describing a unit, and queries against it.
//!
//! Used by the `warden-check` binary and by scenario tests.

use serde::{Deserialize, Serialize};

use warden_core::types::NodeType;

use crate::auth::acl::AclDocument;
use crate::auth::operation::Operation;
use crate::auth::role::{AccountRef, CallerIdentity};
use crate::auth::service::{AuthzRequest, AuthzResult};
use crate::auth::subject::RoleRef;
use crate::engine::Warden;
use crate::error::ServiceResult;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub cells: Vec<CellFixture>,
    #[serde(default)]
    pub nodes: Vec<NodeFixture>,
    #[serde(default)]
    pub roles: Vec<RoleRef>,
    #[serde(default)]
    pub accounts: Vec<AccountFixture>,
    #[serde(default)]
    pub acls: Vec<AclFixture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellFixture {
    pub name: String,
    #[serde(default)]
    pub boxes: Vec<BoxFixture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxFixture {
    pub name: String,
    #[serde(default)]
    pub require_schema_authz: bool,
}

/// A node below a Box, created in listed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeFixture {
    pub cell: String,
    /// Path from the Cell, e.g. `box1/col/file.txt`.
    pub path: String,
    pub node_type: NodeType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountFixture {
    pub cell: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<RoleRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AclFixture {
    pub cell: String,
    /// Path from the Cell; empty for the Cell itself.
    #[serde(default)]
    pub path: String,
    pub acl: AclDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub caller: CallerIdentity,
    pub operation: Operation,
    pub cell: String,
    pub target: String,
    /// Destination parent path for moves.
    #[serde(default)]
    pub destination: Option<String>,
}

/// A fixture plus the query to run against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInput {
    #[serde(flatten)]
    pub fixture: Fixture,
    pub query: Query,
}

impl Fixture {
    /// ## Summary
    /// Creates everything the fixture lists, in dependency order.
    ///
    /// ## Errors
    /// Propagates the first failing engine call.
    pub async fn install(&self, warden: &Warden) -> ServiceResult<()> {
        for cell in &self.cells {
            warden.create_cell(&cell.name).await?;
            for box_fixture in &cell.boxes {
                warden
                    .create_box(&cell.name, &box_fixture.name, box_fixture.require_schema_authz)
                    .await?;
            }
        }
        for node in &self.nodes {
            let trimmed = node.path.trim_matches('/');
            let (parent, name) = trimmed.rsplit_once('/').unwrap_or(("", trimmed));
            let parent = warden.resolve_path(&node.cell, parent).await?;
            warden.create_node(parent, name, node.node_type).await?;
        }
        for role in &self.roles {
            warden.create_role(role.clone()).await?;
        }
        for account in &self.accounts {
            let account_ref = AccountRef::new(&account.cell, &account.name);
            warden.create_account(account_ref.clone()).await?;
            for role in &account.roles {
                warden.link_account_role(&account_ref, role).await?;
            }
        }
        for acl in &self.acls {
            let node = warden.resolve_path(&acl.cell, &acl.path).await?;
            warden.set_acl(node, &acl.acl).await?;
        }
        Ok(())
    }
}

impl Query {
    /// ## Errors
    /// Returns `NotFound` for unknown paths, otherwise as [`Warden::authorize`].
    pub async fn evaluate(&self, warden: &Warden) -> ServiceResult<AuthzResult> {
        let target = warden.resolve_path(&self.cell, &self.target).await?;
        let mut request = AuthzRequest::new(self.operation, target);
        if let Some(destination) = &self.destination {
            request = request.with_destination(warden.resolve_path(&self.cell, destination).await?);
        }
        warden.authorize(&self.caller, &request).await
    }
}
