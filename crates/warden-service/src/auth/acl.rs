//! ACL documents, their validation, and per-node ACL records.
//!
//! The serialization layer hands over an [`AclDocument`], the logical shape of
//! a `DAV:acl` body. Validation resolves every principal against the unit and
//! yields a list of [`Ace`]s, which [`AclStore`] swaps in as a whole.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;

use chrono::{DateTime, Utc};
use tracing_unwrap::ResultExt;
use url::Url;

use warden_core::constants::codes;

use super::privilege::{Privilege, PrivilegeSet};
use super::subject::{RoleRef, Subject};
use crate::error::{ServiceError, ServiceResult};
use crate::tree::node::NodeId;

/// One child element of a `principal`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalElement {
    Href(String),
    All,
    /// Any other element name, kept so it can be rejected.
    Other(String),
}

/// One `ace` as parsed from the wire, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AceDocument {
    #[serde(default)]
    pub principal: Option<Vec<PrincipalElement>>,
    #[serde(default)]
    pub grant: Option<Vec<String>>,
}

impl AceDocument {
    /// ACE granting `privileges` to the role behind `href`.
    #[must_use]
    pub fn href(href: impl Into<String>, privileges: &[Privilege]) -> Self {
        Self {
            principal: Some(vec![PrincipalElement::Href(href.into())]),
            grant: Some(privileges.iter().map(|p| p.as_str().to_string()).collect()),
        }
    }

    /// ACE granting `privileges` to everyone.
    #[must_use]
    pub fn all(privileges: &[Privilege]) -> Self {
        Self {
            principal: Some(vec![PrincipalElement::All]),
            grant: Some(privileges.iter().map(|p| p.as_str().to_string()).collect()),
        }
    }
}

/// An ACL body plus its `xml:base` context.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AclDocument {
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub aces: Vec<AceDocument>,
}

/// Validated principal of an ACE.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    All,
    Role(RoleRef),
}

impl Principal {
    #[must_use]
    pub fn subject(&self) -> Subject {
        match self {
            Self::All => Subject::All,
            Self::Role(role) => Subject::Role(role.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ace {
    pub principal: Principal,
    pub privileges: PrivilegeSet,
}

/// The ACL attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Acl {
    pub aces: Vec<Ace>,
    pub base: Option<Url>,
    /// Incremented by every replacement and by role cascades touching it.
    pub version: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Acl {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aces.is_empty()
    }

    /// One-line rendering for logs: `subject=priv,priv; ...`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (index, ace) in self.aces.iter().enumerate() {
            if index > 0 {
                out.push_str("; ");
            }
            write!(out, "{}=", ace.principal.subject()).ok_or_log();
            let names: Vec<&str> = ace.privileges.iter().map(Privilege::as_str).collect();
            out.push_str(&names.join(","));
        }
        out
    }

    fn roles(&self) -> impl Iterator<Item = &RoleRef> {
        self.aces.iter().filter_map(|ace| match &ace.principal {
            Principal::Role(role) => Some(role),
            Principal::All => None,
        })
    }
}

/// What ACL validation needs to know about the unit.
pub trait RoleDirectory {
    fn cell_exists(&self, cell: &str) -> bool;
    fn box_exists(&self, cell: &str, box_name: &str) -> bool;
    fn role_exists(&self, role: &RoleRef) -> bool;
}

/// The node an ACL is being set on.
#[derive(Debug, Clone, Copy)]
pub struct AclTarget<'a> {
    pub cell: &'a str,
    /// `None` for the Cell itself.
    pub owning_box: Option<&'a str>,
}

/// A document that passed validation, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAcl {
    pub aces: Vec<Ace>,
    pub base: Option<Url>,
}

/// ## Summary
/// Validates an ACL document and resolves its principals.
///
/// Nothing is stored; on error the caller leaves the current ACL untouched.
///
/// ## Errors
/// - `XML_VALIDATE_ERROR` for shape problems and unknown privileges
/// - `ROLE_NOT_FOUND` for an href that is not a role URL, a Role of another
///   Cell than the target's, or an unknown Cell or Role
/// - `BOX_LINKED_BY_ROLE_NOT_FOUND` for an unknown Box, a Role not bound to
///   the named Box, or a Box other than the target's own
pub fn validate_document(
    document: &AclDocument,
    directory: &impl RoleDirectory,
    unit: &Url,
    target: AclTarget<'_>,
) -> ServiceResult<ValidatedAcl> {
    let base = document
        .base
        .as_deref()
        .map(Url::parse)
        .transpose()
        .map_err(|e| ServiceError::acl_shape(format!("invalid base: {e}")))?;

    let aces = document
        .aces
        .iter()
        .enumerate()
        .map(|(index, ace)| validate_ace(index, ace, base.as_ref(), directory, unit, target))
        .collect::<ServiceResult<Vec<_>>>()?;

    Ok(ValidatedAcl { aces, base })
}

fn validate_ace(
    index: usize,
    ace: &AceDocument,
    base: Option<&Url>,
    directory: &impl RoleDirectory,
    unit: &Url,
    target: AclTarget<'_>,
) -> ServiceResult<Ace> {
    let (Some(principal), Some(grant)) = (&ace.principal, &ace.grant) else {
        return Err(ServiceError::acl_shape(format!(
            "ace {index} needs both a principal and a grant"
        )));
    };
    if grant.is_empty() {
        return Err(ServiceError::acl_shape(format!("ace {index} has an empty grant")));
    }

    let privileges = grant
        .iter()
        .map(|name| {
            Privilege::parse(name).ok_or_else(|| {
                ServiceError::acl_shape(format!("ace {index} grants unknown privilege '{name}'"))
            })
        })
        .collect::<ServiceResult<PrivilegeSet>>()?;

    let principal = match principal.as_slice() {
        [PrincipalElement::All] => Principal::All,
        [PrincipalElement::Href(href)] => {
            Principal::Role(resolve_href(href, base, directory, unit, target)?)
        }
        [PrincipalElement::Other(name)] => {
            return Err(ServiceError::acl_shape(format!(
                "ace {index} has unsupported principal element '{name}'"
            )));
        }
        _ => {
            return Err(ServiceError::acl_shape(format!(
                "ace {index} principal must have exactly one child"
            )));
        }
    };

    Ok(Ace {
        principal,
        privileges,
    })
}

fn resolve_href(
    href: &str,
    base: Option<&Url>,
    directory: &impl RoleDirectory,
    unit: &Url,
    target: AclTarget<'_>,
) -> ServiceResult<RoleRef> {
    let url = match base {
        Some(base) => base.join(href),
        None => Url::parse(href),
    }
    .map_err(|e| role_not_found(format!("principal href '{href}': {e}")))?;

    let role = RoleRef::parse_url(unit, &url)
        .ok_or_else(|| role_not_found(format!("principal href '{url}' is not a role url")))?;

    // roles of another Cell never apply here, whatever their Box is called
    if role.cell != target.cell {
        return Err(role_not_found(format!(
            "role {role} belongs to another cell than '{}'",
            target.cell
        )));
    }
    if !directory.cell_exists(&role.cell) {
        return Err(role_not_found(format!("cell '{}' does not exist", role.cell)));
    }
    if let Some(box_name) = role.box_name.as_deref() {
        if !directory.box_exists(&role.cell, box_name) {
            return Err(box_linked(format!("box '{box_name}' does not exist")));
        }
        if target.owning_box.is_some_and(|owner| owner != box_name) {
            return Err(box_linked(format!(
                "role {role} is not bound to the box owning the resource"
            )));
        }
    }
    if !directory.role_exists(&role) {
        return Err(if role.box_name.is_some() {
            box_linked(format!("role {role} is not bound to the named box"))
        } else {
            role_not_found(format!("role {role} does not exist"))
        });
    }
    Ok(role)
}

fn role_not_found(message: String) -> ServiceError {
    ServiceError::AclValidation {
        code: codes::ROLE_NOT_FOUND,
        message,
    }
}

fn box_linked(message: String) -> ServiceError {
    ServiceError::AclValidation {
        code: codes::BOX_LINKED_BY_ROLE_NOT_FOUND,
        message,
    }
}

/// Per-node ACL records with a reverse index from roles to the nodes whose
/// ACL mentions them.
#[derive(Debug, Clone, Default)]
pub struct AclStore {
    records: HashMap<NodeId, Acl>,
    role_index: HashMap<RoleRef, BTreeSet<NodeId>>,
}

impl AclStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&Acl> {
        self.records.get(&node)
    }

    /// Replaces the node's ACL and returns the previous one.
    ///
    /// An empty ACE list clears the ACL; the record keeps its version counter.
    pub fn replace(&mut self, node: NodeId, acl: ValidatedAcl) -> Option<Acl> {
        let previous = self.records.remove(&node);
        if let Some(previous) = &previous {
            self.unindex(node, previous);
        }

        let next = Acl {
            aces: acl.aces,
            base: acl.base,
            version: previous.as_ref().map_or(0, |p| p.version) + 1,
            updated_at: Some(Utc::now()),
        };
        for role in next.roles() {
            self.role_index.entry(role.clone()).or_default().insert(node);
        }
        self.records.insert(node, next);
        previous
    }

    /// Removes every ACE naming `role` and returns the nodes that changed.
    pub fn remove_role(&mut self, role: &RoleRef) -> Vec<NodeId> {
        let Some(nodes) = self.role_index.remove(role) else {
            return Vec::new();
        };
        let now = Utc::now();
        for node in &nodes {
            if let Some(acl) = self.records.get_mut(node) {
                acl.aces
                    .retain(|ace| !matches!(&ace.principal, Principal::Role(r) if r == role));
                acl.version += 1;
                acl.updated_at = Some(now);
            }
        }
        nodes.into_iter().collect()
    }

    /// Forgets a node's ACL entirely.
    pub fn drop_node(&mut self, node: NodeId) -> Option<Acl> {
        let previous = self.records.remove(&node)?;
        self.unindex(node, &previous);
        Some(previous)
    }

    /// Nodes whose ACL currently names `role`.
    #[cfg(test)]
    fn nodes_referencing(&self, role: &RoleRef) -> Vec<NodeId> {
        self.role_index
            .get(role)
            .map(|nodes| nodes.iter().copied().collect())
            .unwrap_or_default()
    }

    fn unindex(&mut self, node: NodeId, acl: &Acl) {
        for role in acl.roles() {
            if let Some(nodes) = self.role_index.get_mut(role) {
                nodes.remove(&node);
                if nodes.is_empty() {
                    self.role_index.remove(role);
                }
            }
        }
    }
}
