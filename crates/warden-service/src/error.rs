use thiserror::Error;

use warden_core::constants::codes;
use warden_core::error::CoreError;

use crate::tree::limits::LimitViolation;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Casbin error: {0}")]
    CasbinError(#[from] casbin::Error),

    #[error(transparent)]
    CoreError(#[from] CoreError),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// A malformed or unresolvable ACL document. Never partially applied.
    #[error("ACL validation error [{code}]: {message}")]
    AclValidation { code: &'static str, message: String },

    /// Uniform denial; deliberately carries no detail about which check failed.
    #[error("Necessary privilege lacking")]
    PrivilegeLacking,

    #[error("Tree limit exceeded: {0}")]
    LimitExceeded(#[from] LimitViolation),

    #[error("Resource has children: {0}")]
    HasChildren(String),

    /// Other entities still refer to the resource.
    #[error("Resource has related entities: {0}")]
    HasRelated(String),

    #[error("Move rejected [{code}]: {message}")]
    MoveRejected { code: &'static str, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

impl ServiceError {
    /// Builds an `XML_VALIDATE_ERROR`-class ACL validation error.
    #[must_use]
    pub fn acl_shape(message: impl Into<String>) -> Self {
        Self::AclValidation {
            code: codes::XML_VALIDATE_ERROR,
            message: message.into(),
        }
    }

    /// Stable code for the protocol layer.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AclValidation { code, .. } | Self::MoveRejected { code, .. } => *code,
            Self::PrivilegeLacking => codes::NECESSARY_PRIVILEGE_LACKING,
            Self::LimitExceeded(violation) => violation.code(),
            Self::HasChildren(_) => codes::HAS_CHILDREN,
            Self::HasRelated(_) => codes::CONFLICT_HAS_RELATED,
            Self::CoreError(CoreError::InvalidName(_)) => codes::RESOURCE_NAME_INVALID,
            Self::NotFound(_) => codes::RESOURCE_NOT_FOUND,
            Self::MethodNotAllowed(_) => codes::METHOD_NOT_ALLOWED,
            Self::CasbinError(_)
            | Self::CoreError(_)
            | Self::UrlError(_)
            | Self::InvalidConfiguration(_)
            | Self::InvariantViolation(_) => codes::SERVER_ERROR,
        }
    }

    /// HTTP-class status for the protocol layer.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::AclValidation { .. } | Self::LimitExceeded(_) | Self::MoveRejected { .. } => 400,
            Self::PrivilegeLacking
            | Self::HasChildren(_)
            | Self::CoreError(CoreError::InvalidName(_)) => 403,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed(_) => 405,
            Self::HasRelated(_) => 409,
            Self::CasbinError(_)
            | Self::CoreError(_)
            | Self::UrlError(_)
            | Self::InvalidConfiguration(_)
            | Self::InvariantViolation(_) => 500,
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
