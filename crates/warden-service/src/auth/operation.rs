//! Operations and the privileges they require.
//!
//! Every operation maps to one or more [`Requirement`]s, all of which must
//! pass. Structural operations are evaluated at a parent node, never at the
//! node being created, deleted or moved.

use super::privilege::Privilege;

/// Operations the engine authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Read a body or list a collection.
    Read,
    /// Write a body or data content.
    Write,
    ReadProperties,
    WriteProperties,
    ReadAcl,
    WriteAcl,
    /// Add a member to a collection. The request target is the collection
    /// receiving the member, since the member has no node yet.
    CreateChild,
    /// Remove a node from its parent. Evaluated at the parent.
    Delete,
    /// Evaluated at the source parent and the destination parent.
    Move,
    /// Read `EntityType`, Property, `AssociationEnd` or `ComplexType` resources.
    SchemaRead,
    /// Create, update, merge or delete schema resources.
    SchemaWrite,
    /// Invoke a service.
    Exec,
}

/// Which node's ACL governs a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluationNode {
    Target,
    /// Parent of the target.
    Parent,
    /// The collection a new member goes into; the request target itself.
    Container,
    /// Parent the target is moved into.
    DestinationParent,
}

/// One `(evaluation node, privilege)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub node: EvaluationNode,
    pub privilege: Privilege,
    /// Granted privileges that satisfy this requirement, besides `all`.
    pub accepted: &'static [Privilege],
}

const fn on(node: EvaluationNode, privilege: Privilege, accepted: &'static [Privilege]) -> Requirement {
    Requirement {
        node,
        privilege,
        accepted,
    }
}

use EvaluationNode::{Container, DestinationParent, Parent, Target};

const READ: &[Requirement] = &[on(Target, Privilege::Read, &[Privilege::Read])];
const WRITE: &[Requirement] = &[on(Target, Privilege::Write, &[Privilege::Write])];
const READ_PROPERTIES: &[Requirement] = &[on(
    Target,
    Privilege::ReadProperties,
    &[Privilege::ReadProperties],
)];
const WRITE_PROPERTIES: &[Requirement] = &[on(
    Target,
    Privilege::WriteProperties,
    &[Privilege::WriteProperties],
)];
const READ_ACL: &[Requirement] = &[on(Target, Privilege::ReadAcl, &[Privilege::ReadAcl])];
const WRITE_ACL: &[Requirement] = &[on(Target, Privilege::WriteAcl, &[Privilege::WriteAcl])];
// write stays accepted for bind/unbind on structural checks only
const CREATE_CHILD: &[Requirement] = &[on(
    Container,
    Privilege::Bind,
    &[Privilege::Bind, Privilege::Write],
)];
const DELETE: &[Requirement] = &[on(
    Parent,
    Privilege::Unbind,
    &[Privilege::Unbind, Privilege::Write],
)];
const MOVE: &[Requirement] = &[
    on(Parent, Privilege::Unbind, &[Privilege::Unbind, Privilege::Write]),
    on(
        DestinationParent,
        Privilege::Bind,
        &[Privilege::Bind, Privilege::Write],
    ),
];
const SCHEMA_READ: &[Requirement] = &[on(Target, Privilege::Read, &[Privilege::Read])];
const SCHEMA_WRITE: &[Requirement] = &[on(
    Target,
    Privilege::AlterSchema,
    &[Privilege::AlterSchema],
)];
const EXEC: &[Requirement] = &[on(Target, Privilege::Exec, &[Privilege::Exec])];

impl Operation {
    pub const ALL: [Self; 12] = [
        Self::Read,
        Self::Write,
        Self::ReadProperties,
        Self::WriteProperties,
        Self::ReadAcl,
        Self::WriteAcl,
        Self::CreateChild,
        Self::Delete,
        Self::Move,
        Self::SchemaRead,
        Self::SchemaWrite,
        Self::Exec,
    ];

    /// The operation table.
    #[must_use]
    pub const fn requirements(self) -> &'static [Requirement] {
        match self {
            Self::Read => READ,
            Self::Write => WRITE,
            Self::ReadProperties => READ_PROPERTIES,
            Self::WriteProperties => WRITE_PROPERTIES,
            Self::ReadAcl => READ_ACL,
            Self::WriteAcl => WRITE_ACL,
            Self::CreateChild => CREATE_CHILD,
            Self::Delete => DELETE,
            Self::Move => MOVE,
            Self::SchemaRead => SCHEMA_READ,
            Self::SchemaWrite => SCHEMA_WRITE,
            Self::Exec => EXEC,
        }
    }

    /// Returns `true` for operations that need a destination parent.
    #[must_use]
    pub const fn needs_destination(self) -> bool {
        matches!(self, Self::Move)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::ReadProperties => "read-properties",
            Self::WriteProperties => "write-properties",
            Self::ReadAcl => "read-acl",
            Self::WriteAcl => "write-acl",
            Self::CreateChild => "create-child",
            Self::Delete => "delete",
            Self::Move => "move",
            Self::SchemaRead => "schema-read",
            Self::SchemaWrite => "schema-write",
            Self::Exec => "exec",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Methods the DAV and OData front ends dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Options,
    Get,
    Head,
    Put,
    Post,
    Delete,
    Propfind,
    Proppatch,
    Mkcol,
    Move,
    Merge,
    Acl,
}

impl HttpMethod {
    /// Parse an HTTP method string into an `HttpMethod`.
    #[must_use]
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "OPTIONS" => Some(Self::Options),
            "GET" => Some(Self::Get),
            "HEAD" => Some(Self::Head),
            "PUT" => Some(Self::Put),
            "POST" => Some(Self::Post),
            "DELETE" => Some(Self::Delete),
            "PROPFIND" => Some(Self::Propfind),
            "PROPPATCH" => Some(Self::Proppatch),
            "MKCOL" => Some(Self::Mkcol),
            "MOVE" => Some(Self::Move),
            "MERGE" => Some(Self::Merge),
            "ACL" => Some(Self::Acl),
            _ => None,
        }
    }
}

/// Request details that change which operations a method maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(clippy::struct_excessive_bools, reason = "independent request flags")]
pub struct MethodContext {
    /// Whether the target resource already exists.
    pub target_exists: bool,
    /// Whether the target is an OData schema resource.
    pub schema_resource: bool,
    /// Whether a PROPFIND asks for `DAV:acl`.
    pub acl_requested: bool,
    /// Whether the target is a service endpoint.
    pub service_endpoint: bool,
}

impl Default for MethodContext {
    fn default() -> Self {
        Self::existing()
    }
}

impl MethodContext {
    #[must_use]
    pub const fn existing() -> Self {
        Self {
            target_exists: true,
            schema_resource: false,
            acl_requested: false,
            service_endpoint: false,
        }
    }

    #[must_use]
    pub const fn new_resource() -> Self {
        Self {
            target_exists: false,
            ..Self::existing()
        }
    }

    #[must_use]
    pub const fn schema() -> Self {
        Self {
            schema_resource: true,
            ..Self::existing()
        }
    }

    #[must_use]
    pub const fn with_acl(self) -> Self {
        Self {
            acl_requested: true,
            ..self
        }
    }

    #[must_use]
    pub const fn service() -> Self {
        Self {
            service_endpoint: true,
            ..Self::existing()
        }
    }
}

/// ## Summary
/// Operations to authorize for a method.
///
/// ## Notes
/// - `PUT` on a missing target creates a member (`CreateChild`)
/// - `PROPFIND` asking for `DAV:acl` additionally needs `ReadAcl`
/// - schema resources map reads to `SchemaRead` and mutations to `SchemaWrite`
#[must_use]
pub fn operations_for_method(method: HttpMethod, context: MethodContext) -> Vec<Operation> {
    if context.service_endpoint && !matches!(method, HttpMethod::Propfind | HttpMethod::Proppatch)
    {
        return vec![Operation::Exec];
    }
    if context.schema_resource {
        return match method {
            HttpMethod::Options | HttpMethod::Get | HttpMethod::Head => {
                vec![Operation::SchemaRead]
            }
            HttpMethod::Put | HttpMethod::Post | HttpMethod::Merge | HttpMethod::Delete => {
                vec![Operation::SchemaWrite]
            }
            other => operations_for_method(
                other,
                MethodContext {
                    schema_resource: false,
                    ..context
                },
            ),
        };
    }

    match method {
        HttpMethod::Options | HttpMethod::Get | HttpMethod::Head => vec![Operation::Read],
        HttpMethod::Put if context.target_exists => vec![Operation::Write],
        HttpMethod::Put | HttpMethod::Mkcol => vec![Operation::CreateChild],
        HttpMethod::Post | HttpMethod::Merge => vec![Operation::Write],
        HttpMethod::Delete => vec![Operation::Delete],
        HttpMethod::Propfind if context.acl_requested => {
            vec![Operation::ReadProperties, Operation::ReadAcl]
        }
        HttpMethod::Propfind => vec![Operation::ReadProperties],
        HttpMethod::Proppatch => vec![Operation::WriteProperties],
        HttpMethod::Move => vec![Operation::Move],
        HttpMethod::Acl => vec![Operation::WriteAcl],
    }
}
