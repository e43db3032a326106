//! Resource name validation.
//!
//! ## Summary
//! Names are single path segments chosen by the caller. The engine rejects
//! anything that would break path resolution or collide with names it manages
//! itself.

use crate::constants::{MAX_RESOURCE_NAME_LEN, RESERVED_NAME_PREFIX};
use crate::error::{CoreError, CoreResult};

/// Validate a caller-supplied resource name.
///
/// Rules:
/// - not empty and at most 128 bytes
/// - not `.` or `..`
/// - no `/`, `\` or control characters
/// - does not start with the reserved `__` prefix
///
/// ## Errors
/// Returns `CoreError::InvalidName` describing the first rule that failed.
pub fn validate_resource_name(name: &str) -> CoreResult<()> {
    if name.is_empty() {
        return Err(CoreError::InvalidName("name is empty".to_string()));
    }
    if name.len() > MAX_RESOURCE_NAME_LEN {
        return Err(CoreError::InvalidName(format!(
            "name exceeds {MAX_RESOURCE_NAME_LEN} bytes"
        )));
    }
    if name == "." || name == ".." {
        return Err(CoreError::InvalidName(format!("'{name}' is not allowed")));
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(CoreError::InvalidName(format!(
            "'{name}' contains a forbidden character"
        )));
    }
    if name.starts_with(RESERVED_NAME_PREFIX) {
        return Err(CoreError::InvalidName(format!(
            "'{name}' uses the reserved prefix"
        )));
    }
    Ok(())
}

/// Returns `true` if the name belongs to the engine-managed namespace.
#[must_use]
pub fn is_reserved_name(name: &str) -> bool {
    name.starts_with(RESERVED_NAME_PREFIX)
}
