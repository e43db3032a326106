/// Path component separating a Cell URL from its role namespace.
pub const ROLE_ROUTE_COMPONENT: &str = "__role";

/// Box segment used in role URLs for roles that are not bound to any Box.
pub const NO_BOX_SEGMENT: &str = "__";

/// Prefix reserved for engine-managed resource names.
pub const RESERVED_NAME_PREFIX: &str = "__";

/// Name of the source collection every Service collection carries.
pub const SERVICE_SOURCE_NAME: &str = const_str::concat!(RESERVED_NAME_PREFIX, "src");

/// Maximum length of a single resource name.
pub const MAX_RESOURCE_NAME_LEN: usize = 128;

pub const DEFAULT_UNIT_URL: &str = "https://localhost/";
pub const DEFAULT_MAX_COLLECTION_DEPTH: usize = 5;
pub const DEFAULT_MAX_CHILD_RESOURCE_COUNT: usize = 1000;

/// Stable error codes reported to the protocol layer.
pub mod codes {
    const DAV_400: &str = "PR400-DV-";
    const DAV_403: &str = "PR403-DV-";
    const DAV_404: &str = "PR404-DV-";
    const DAV_405: &str = "PR405-DV-";
    const AUTH_403: &str = "PR403-AU-";
    const ODATA_409: &str = "PR409-OD-";

    pub const ROLE_NOT_FOUND: &str = const_str::concat!(DAV_400, "0004");
    pub const BOX_LINKED_BY_ROLE_NOT_FOUND: &str = const_str::concat!(DAV_400, "0005");
    pub const XML_VALIDATE_ERROR: &str = const_str::concat!(DAV_400, "0006");
    pub const COLLECTION_CHILDRESOURCE_ERROR: &str = const_str::concat!(DAV_400, "0007");
    pub const COLLECTION_DEPTH_ERROR: &str = const_str::concat!(DAV_400, "0008");
    pub const SERVICE_SOURCE_PROHIBITED_TO_MOVE: &str = const_str::concat!(DAV_400, "0011");
    pub const RESOURCE_PROHIBITED_TO_OVERWRITE: &str = const_str::concat!(DAV_400, "0012");
    pub const PROHIBITED_TO_MOVE_ODATA_COLLECTION: &str = const_str::concat!(DAV_400, "0013");
    pub const PROHIBITED_TO_MOVE_FILE: &str = const_str::concat!(DAV_400, "0014");
    pub const PROHIBITED_TO_MOVE_BOX: &str = const_str::concat!(DAV_400, "0015");
    pub const PROHIBITED_TO_MOVE_SERVICE_COLLECTION: &str = const_str::concat!(DAV_400, "0016");

    pub const HAS_CHILDREN: &str = const_str::concat!(DAV_403, "0003");
    pub const RESOURCE_NAME_INVALID: &str = const_str::concat!(DAV_403, "0004");
    pub const NECESSARY_PRIVILEGE_LACKING: &str = const_str::concat!(AUTH_403, "0002");

    pub const RESOURCE_NOT_FOUND: &str = const_str::concat!(DAV_404, "0001");
    pub const METHOD_NOT_ALLOWED: &str = const_str::concat!(DAV_405, "0001");
    pub const CONFLICT_HAS_RELATED: &str = const_str::concat!(ODATA_409, "0001");

    /// Catch-all for failures that are not the caller's fault.
    pub const SERVER_ERROR: &str = "PR500-SV-0000";
}
