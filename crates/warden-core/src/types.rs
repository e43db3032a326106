use serde::{Deserialize, Serialize};

/// Node type without any engine dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Tree root of a tenant.
    #[serde(rename = "cell")]
    Cell,
    /// Application container directly below a Cell.
    #[serde(rename = "box")]
    Box,
    /// Plain WebDAV collection.
    #[serde(rename = "col.webdav")]
    WebDavCollection,
    /// OData collection holding schema entities and their data.
    #[serde(rename = "col.odata")]
    ODataCollection,
    /// Service (script) collection.
    #[serde(rename = "col.svc")]
    ServiceCollection,
    /// The reserved `__src` collection inside a Service collection.
    #[serde(rename = "col.svc.src")]
    ServiceSource,
    /// WebDAV file.
    #[serde(rename = "dav.file")]
    File,
    /// Schema sub-resource of an OData collection (`EntityType`, Property, ...).
    #[serde(rename = "odata.schema")]
    SchemaEntity,
}

impl NodeType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cell => "cell",
            Self::Box => "box",
            Self::WebDavCollection => "col.webdav",
            Self::ODataCollection => "col.odata",
            Self::ServiceCollection => "col.svc",
            Self::ServiceSource => "col.svc.src",
            Self::File => "dav.file",
            Self::SchemaEntity => "odata.schema",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cell" => Some(Self::Cell),
            "box" => Some(Self::Box),
            "col.webdav" => Some(Self::WebDavCollection),
            "col.odata" => Some(Self::ODataCollection),
            "col.svc" => Some(Self::ServiceCollection),
            "col.svc.src" => Some(Self::ServiceSource),
            "dav.file" => Some(Self::File),
            "odata.schema" => Some(Self::SchemaEntity),
            _ => None,
        }
    }

    /// Returns `true` for collection types, which are subject to the depth limit.
    #[must_use]
    pub const fn is_collection(self) -> bool {
        matches!(
            self,
            Self::WebDavCollection
                | Self::ODataCollection
                | Self::ServiceCollection
                | Self::ServiceSource
        )
    }

    /// Returns `true` if nodes of this type can be created by a caller.
    ///
    /// Cells and Boxes come from their own provisioning calls and the service
    /// source collection is always created by the engine.
    #[must_use]
    pub const fn is_creatable_child(self) -> bool {
        matches!(
            self,
            Self::WebDavCollection
                | Self::ODataCollection
                | Self::ServiceCollection
                | Self::File
                | Self::SchemaEntity
        )
    }

    /// Returns `true` if a node of this type may hold a child of type `child`.
    #[must_use]
    pub const fn accepts_child(self, child: Self) -> bool {
        match self {
            Self::Cell => matches!(child, Self::Box),
            Self::Box | Self::WebDavCollection => matches!(
                child,
                Self::WebDavCollection | Self::ODataCollection | Self::ServiceCollection | Self::File
            ),
            Self::ODataCollection => matches!(child, Self::SchemaEntity),
            Self::ServiceCollection => matches!(child, Self::ServiceSource),
            Self::ServiceSource => matches!(child, Self::File),
            Self::File | Self::SchemaEntity => false,
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
