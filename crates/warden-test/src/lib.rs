//! Scenario tests for the authorization engine.
//!
//! The crate itself only re-exports the engine crates under short names so
//! the tests in `tests/` read the same way regardless of which crate a type
//! lives in.

pub mod component {

    pub mod auth {
        pub use warden_service::auth::acl::{AceDocument, Acl, AclDocument, PrincipalElement};
        pub use warden_service::auth::operation::{HttpMethod, MethodContext, Operation};
        pub use warden_service::auth::privilege::{Privilege, PrivilegeSet};
        pub use warden_service::auth::role::{AccountRef, CallerIdentity, Resolution};
        pub use warden_service::auth::service::{AuthzRequest, AuthzResult};
        pub use warden_service::auth::subject::RoleRef;
    }

    pub mod tree {
        pub use warden_core::types::NodeType;
        pub use warden_service::tree::limits::TreeLimits;
        pub use warden_service::tree::node::{NodeId, ResourceNode};
    }

    pub mod import {
        pub use warden_service::import::{ImportItem, ImportJob, ImportStatus, JobId};
    }

    pub use warden_core::constants::codes;
    pub use warden_service::{ServiceError, ServiceResult, Warden};
}
