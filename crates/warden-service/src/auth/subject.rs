//! Subject types for authorization.
//!
//! A subject is either a Role or the `all` pseudo-principal. Every caller is
//! expanded to its roles plus `all`, so an ACE granted to `all` matches
//! authenticated and anonymous callers alike.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

use warden_core::constants::{NO_BOX_SEGMENT, ROLE_ROUTE_COMPONENT};

use crate::error::{ServiceError, ServiceResult};

/// Identity of a Role: `(cell, owning box | none, name)`.
///
/// A box-scoped role and a cell-global role with the same name are distinct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct RoleRef {
    pub cell: String,
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub box_name: Option<String>,
    pub name: String,
}

impl RoleRef {
    #[must_use]
    pub fn new(cell: impl Into<String>, box_name: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            cell: cell.into(),
            box_name: box_name.map(str::to_string),
            name: name.into(),
        }
    }

    /// Box path segment used in role URLs.
    #[must_use]
    pub fn box_segment(&self) -> &str {
        self.box_name.as_deref().unwrap_or(NO_BOX_SEGMENT)
    }

    /// ## Summary
    /// Renders the role URL `{unit}{cell}/__role/{box|__}/{name}`.
    ///
    /// ## Errors
    /// Returns `InvariantViolation` if the unit URL cannot be a base.
    pub fn to_url(&self, unit: &Url) -> ServiceResult<Url> {
        let mut url = unit.clone();
        url.path_segments_mut()
            .map_err(|()| ServiceError::InvariantViolation("unit url cannot be a base"))?
            .pop_if_empty()
            .extend([
                self.cell.as_str(),
                ROLE_ROUTE_COMPONENT,
                self.box_segment(),
                self.name.as_str(),
            ]);
        Ok(url)
    }

    /// Parses a role URL hosted on `unit`, percent-decoding its segments.
    ///
    /// Returns `None` for URLs on another origin, not shaped like a role URL,
    /// or with segments that do not decode to UTF-8.
    #[must_use]
    pub fn parse_url(unit: &Url, url: &Url) -> Option<Self> {
        if url.scheme() != unit.scheme()
            || url.host_str() != unit.host_str()
            || url.port_or_known_default() != unit.port_or_known_default()
        {
            return None;
        }

        let prefix: Vec<&str> = unit
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .collect();
        let segments: Vec<&str> = url.path_segments()?.collect();
        let rest = segments.strip_prefix(prefix.as_slice())?;
        let decoded = rest
            .iter()
            .map(|segment| {
                percent_decode_str(segment)
                    .decode_utf8()
                    .ok()
                    .map(Cow::into_owned)
            })
            .collect::<Option<Vec<String>>>()?;

        match decoded.as_slice() {
            [cell, route, box_segment, name]
                if route == ROLE_ROUTE_COMPONENT && !cell.is_empty() && !name.is_empty() =>
            {
                let box_name = (box_segment != NO_BOX_SEGMENT).then_some(box_segment.as_str());
                if box_name.is_some_and(str::is_empty) {
                    return None;
                }
                Some(Self::new(cell.as_str(), box_name, name.as_str()))
            }
            _ => None,
        }
    }

    /// Returns the Casbin subject string.
    #[must_use]
    pub fn casbin_subject(&self) -> String {
        format!("role:{}/{}/{}", self.cell, self.box_segment(), self.name)
    }
}

impl std::fmt::Display for RoleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.cell, self.box_segment(), self.name)
    }
}

/// A subject for authorization checks.
///
/// In Casbin terms, this is the `sub` parameter in enforcement requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    Role(RoleRef),
    /// Matches every caller, including anonymous ones.
    All,
}

impl Subject {
    /// Returns the Casbin subject string.
    #[must_use]
    pub fn casbin_subject(&self) -> String {
        match self {
            Self::Role(role) => role.casbin_subject(),
            Self::All => "all".to_string(),
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.casbin_subject())
    }
}

/// An expanded set of subjects for authorization.
///
/// Access is granted if ANY of these subjects has the required permission.
/// The set always ends with [`Subject::All`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedSubjects {
    subjects: Vec<Subject>,
}

impl ExpandedSubjects {
    /// Create an expanded subject set from the roles a caller holds.
    #[must_use]
    pub fn from_roles(roles: impl IntoIterator<Item = RoleRef>) -> Self {
        let mut subjects: Vec<Subject> = Vec::new();
        for role in roles {
            let subject = Subject::Role(role);
            if !subjects.contains(&subject) {
                subjects.push(subject);
            }
        }
        subjects.push(Subject::All);
        Self { subjects }
    }

    /// The set used for anonymous callers: `all` only.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            subjects: vec![Subject::All],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.iter()
    }

    /// Returns all Casbin subject strings.
    #[must_use]
    pub fn casbin_subjects(&self) -> Vec<String> {
        self.subjects.iter().map(Subject::casbin_subject).collect()
    }

    #[must_use]
    pub fn contains(&self, subject: &Subject) -> bool {
        self.subjects.contains(subject)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

impl<'a> IntoIterator for &'a ExpandedSubjects {
    type Item = &'a Subject;
    type IntoIter = std::slice::Iter<'a, Subject>;

    fn into_iter(self) -> Self::IntoIter {
        self.subjects.iter()
    }
}
