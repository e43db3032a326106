//! Privilege vocabulary and set algebra.
//!
//! The only implication built into the algebra is that `all` satisfies every
//! other privilege. The `write` → `bind`/`unbind` equivalence used for
//! structural checks lives in the operation table, not here.

use std::collections::BTreeSet;

/// Privileges that can be granted by an ACE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Privilege {
    Read,
    Write,
    ReadProperties,
    WriteProperties,
    ReadAcl,
    WriteAcl,
    Bind,
    Unbind,
    Exec,
    AlterSchema,
    /// Umbrella privilege, satisfies every other one.
    All,
}

impl Privilege {
    /// Every privilege, umbrella last.
    pub const ALL: [Self; 11] = [
        Self::Read,
        Self::Write,
        Self::ReadProperties,
        Self::WriteProperties,
        Self::ReadAcl,
        Self::WriteAcl,
        Self::Bind,
        Self::Unbind,
        Self::Exec,
        Self::AlterSchema,
        Self::All,
    ];

    /// Returns the DAV local name for this privilege.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::ReadProperties => "read-properties",
            Self::WriteProperties => "write-properties",
            Self::ReadAcl => "read-acl",
            Self::WriteAcl => "write-acl",
            Self::Bind => "bind",
            Self::Unbind => "unbind",
            Self::Exec => "exec",
            Self::AlterSchema => "alter-schema",
            Self::All => "all",
        }
    }

    /// Parse a DAV local name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// Returns `true` if holding `self` is enough for an operation requiring `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self == required || self == Self::All
    }
}

impl std::fmt::Display for Privilege {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of granted privileges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivilegeSet {
    privileges: BTreeSet<Privilege>,
}

impl PrivilegeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, privilege: Privilege) -> &mut Self {
        self.privileges.insert(privilege);
        self
    }

    /// Adds every privilege of `other` to this set.
    pub fn union_with(&mut self, other: &Self) -> &mut Self {
        self.privileges.extend(other.privileges.iter().copied());
        self
    }

    #[must_use]
    pub fn contains(&self, privilege: Privilege) -> bool {
        self.privileges.contains(&privilege)
    }

    /// `required ∈ granted ∨ all ∈ granted`.
    #[must_use]
    pub fn satisfies(&self, required: Privilege) -> bool {
        self.contains(required) || self.contains(Privilege::All)
    }

    /// Returns the set with `all` expanded into every concrete privilege.
    ///
    /// Used for `DAV:current-user-privilege-set`, where clients expect the
    /// concrete privileges listed alongside the umbrella.
    #[must_use]
    pub fn expanded(&self) -> Self {
        if self.contains(Privilege::All) {
            Privilege::ALL.into_iter().collect()
        } else {
            self.clone()
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Privilege> + '_ {
        self.privileges.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.privileges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.privileges.is_empty()
    }
}

impl FromIterator<Privilege> for PrivilegeSet {
    fn from_iter<T: IntoIterator<Item = Privilege>>(iter: T) -> Self {
        Self {
            privileges: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PrivilegeSet {
    type Item = &'a Privilege;
    type IntoIter = std::collections::btree_set::Iter<'a, Privilege>;

    fn into_iter(self) -> Self::IntoIter {
        self.privileges.iter()
    }
}

/// Free-function form of [`PrivilegeSet::satisfies`].
#[must_use]
pub fn satisfies(granted: &PrivilegeSet, required: Privilege) -> bool {
    granted.satisfies(required)
}

/// Generates the casbin `g2` rows encoding the privilege algebra.
///
/// Each row `[granted, required]` means holding `granted` satisfies a request
/// for `required`. Only the umbrella privilege produces rows.
#[must_use]
pub fn implication_rules() -> Vec<Vec<String>> {
    Privilege::ALL
        .into_iter()
        .filter(|p| *p != Privilege::All)
        .map(|p| vec![Privilege::All.as_str().to_string(), p.as_str().to_string()])
        .collect()
}
