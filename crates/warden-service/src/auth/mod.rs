//! Authorization: privileges, subjects, ACLs and the decision procedure.
//!
//! ## Module Organization
//!
//! - `acl`: ACL documents, validation, and per-node ACL records
//! - `casbin`: Casbin enforcer initialization and policy compilation
//! - `operation`: Operation table and method-to-operation mapping
//! - `privilege`: Privilege vocabulary and set algebra
//! - `role`: Role and account registry, caller resolution
//! - `service`: Centralized authorization service (`Authorizer`)
//! - `subject`: Role references and subject expansion

pub mod acl;
pub mod casbin;
pub mod operation;
pub mod privilege;
pub mod role;
pub mod service;
pub mod subject;

// Re-export commonly used types at module level
pub use acl::{Ace, AceDocument, Acl, AclDocument, AclStore, Principal, PrincipalElement};
pub use operation::{EvaluationNode, HttpMethod, MethodContext, Operation, operations_for_method};
pub use privilege::{Privilege, PrivilegeSet};
pub use role::{AccountRef, CallerIdentity, Resolution, RoleRegistry};
pub use service::{AuthzRequest, AuthzResult, Authorizer};
pub use subject::{ExpandedSubjects, RoleRef, Subject};
