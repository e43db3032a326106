//! Authorization service for centralized access control.
//!
//! The [`Authorizer`] turns an operation into its requirements, picks the
//! evaluation node of each one, and runs the ancestor-union check against the
//! Casbin enforcer.

use crate::error::{ServiceError, ServiceResult};
use crate::tree::node::NodeId;
use crate::tree::store::ResourceTree;

use super::casbin::enforce;
use super::operation::{EvaluationNode, Operation, Requirement};
use super::privilege::{Privilege, PrivilegeSet};
use super::subject::ExpandedSubjects;

/// Result of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthzResult {
    Allowed,
    Denied,
}

impl AuthzResult {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Convert to a `Result`.
    ///
    /// ## Errors
    ///
    /// Returns `PrivilegeLacking` if denied. The error never says which
    /// requirement failed.
    pub fn require(self) -> ServiceResult<()> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied => Err(ServiceError::PrivilegeLacking),
        }
    }
}

/// Request to authorize: an operation on a target, plus a destination parent
/// for moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthzRequest {
    pub operation: Operation,
    pub target: NodeId,
    pub destination: Option<NodeId>,
}

impl AuthzRequest {
    #[must_use]
    pub const fn new(operation: Operation, target: NodeId) -> Self {
        Self {
            operation,
            target,
            destination: None,
        }
    }

    #[must_use]
    pub const fn with_destination(mut self, destination: NodeId) -> Self {
        self.destination = Some(destination);
        self
    }
}

/// Authorization over a snapshot of the tree and its compiled policies.
pub struct Authorizer<'a> {
    tree: &'a ResourceTree,
    enforcer: &'a casbin::Enforcer,
}

impl<'a> Authorizer<'a> {
    #[must_use]
    pub const fn new(tree: &'a ResourceTree, enforcer: &'a casbin::Enforcer) -> Self {
        Self { tree, enforcer }
    }

    /// Check every requirement of the request's operation.
    ///
    /// Allowed only if all pass.
    ///
    /// ## Errors
    ///
    /// - `NotFound` if the target or destination does not exist.
    /// - `InvariantViolation` for a move without destination or a structural
    ///   operation on a Cell.
    /// - `CasbinError` if Casbin evaluation fails.
    pub fn check(
        &self,
        subjects: &ExpandedSubjects,
        request: &AuthzRequest,
    ) -> ServiceResult<AuthzResult> {
        tracing::debug!(
            operation = %request.operation,
            target = %request.target,
            subject_count = subjects.len(),
            "Authorization check started"
        );
        tracing::trace!(subjects = ?subjects.casbin_subjects(), "Expanded subjects");

        for requirement in request.operation.requirements() {
            let node = self.evaluation_node(request, requirement.node)?;
            if !self.satisfied_at(subjects, node, requirement)? {
                tracing::debug!(
                    operation = %request.operation,
                    node = %node,
                    privilege = %requirement.privilege,
                    "Authorization denied"
                );
                return Ok(AuthzResult::Denied);
            }
        }

        tracing::debug!(operation = %request.operation, "Authorization granted");
        Ok(AuthzResult::Allowed)
    }

    /// Check and require permission, returning an error if denied.
    ///
    /// ## Errors
    ///
    /// - Returns `PrivilegeLacking` if access is denied.
    /// - Propagates the errors of [`Self::check`].
    pub fn require(&self, subjects: &ExpandedSubjects, request: &AuthzRequest) -> ServiceResult<()> {
        self.check(subjects, request)?.require()
    }

    /// Union of privileges the subjects hold on `node` through it and its
    /// ancestors.
    ///
    /// ## Errors
    ///
    /// Returns `NotFound` for an unknown node and `CasbinError` if Casbin
    /// evaluation fails.
    pub fn granted(&self, subjects: &ExpandedSubjects, node: NodeId) -> ServiceResult<PrivilegeSet> {
        self.tree.node(node)?;
        let mut granted = PrivilegeSet::new();
        for ancestor in self.tree.ancestors(node) {
            for subject in subjects {
                let sub = subject.casbin_subject();
                for privilege in Privilege::ALL {
                    if !granted.contains(privilege)
                        && enforce(self.enforcer, &sub, ancestor.id, privilege.as_str())?
                    {
                        granted.insert(privilege);
                    }
                }
            }
        }
        Ok(granted.expanded())
    }

    fn evaluation_node(
        &self,
        request: &AuthzRequest,
        which: EvaluationNode,
    ) -> ServiceResult<NodeId> {
        let target = self.tree.node(request.target)?;
        match which {
            EvaluationNode::Target | EvaluationNode::Container => Ok(target.id),
            EvaluationNode::Parent => target.parent.ok_or(ServiceError::InvariantViolation(
                "structural operation on a node without parent",
            )),
            EvaluationNode::DestinationParent => {
                let destination = request
                    .destination
                    .ok_or(ServiceError::InvariantViolation("move without destination"))?;
                Ok(self.tree.node(destination)?.id)
            }
        }
    }

    /// Ancestor-union: passes if `node` or any ancestor up to the Cell grants
    /// an accepted privilege to any subject.
    fn satisfied_at(
        &self,
        subjects: &ExpandedSubjects,
        node: NodeId,
        requirement: &Requirement,
    ) -> ServiceResult<bool> {
        for ancestor in self.tree.ancestors(node) {
            for subject in subjects {
                let sub = subject.casbin_subject();
                for accepted in requirement.accepted {
                    let allowed = enforce(self.enforcer, &sub, ancestor.id, accepted.as_str())?;

                    tracing::trace!(
                        subject = %sub,
                        node = %ancestor.id,
                        privilege = %accepted,
                        allowed = %allowed,
                        "Subject check result"
                    );

                    if allowed {
                        return Ok(true);
                    }
                }
            }
        }
        Ok(false)
    }
}
