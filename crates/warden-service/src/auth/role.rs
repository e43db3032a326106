//! Role and account registry, and resolution of callers to subject sets.

use std::collections::{BTreeMap, BTreeSet};

use super::subject::{ExpandedSubjects, RoleRef};
use crate::error::{ServiceError, ServiceResult};

/// An account inside a Cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct AccountRef {
    pub cell: String,
    pub name: String,
}

impl AccountRef {
    #[must_use]
    pub fn new(cell: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            cell: cell.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for AccountRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.cell, self.name)
    }
}

/// Caller identity as handed over by the token layer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerIdentity {
    /// No or invalid credential.
    Anonymous,
    /// A local account, resolved to its linked roles.
    Account(AccountRef),
    /// Roles carried directly by a token.
    Roles(Vec<RoleRef>),
    /// Unit master token: not evaluated at all.
    Master,
}

/// Result of resolving a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Bypass,
    Subjects(ExpandedSubjects),
}

/// Roles, accounts and the links between them, for every Cell in the unit.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    roles: BTreeSet<RoleRef>,
    accounts: BTreeSet<AccountRef>,
    links: BTreeMap<AccountRef, BTreeSet<RoleRef>>,
}

impl RoleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains_role(&self, role: &RoleRef) -> bool {
        self.roles.contains(role)
    }

    /// Roles bound to the Box `box_name` of `cell`.
    pub fn roles_of_box<'a>(
        &'a self,
        cell: &'a str,
        box_name: &'a str,
    ) -> impl Iterator<Item = &'a RoleRef> + 'a {
        self.roles
            .iter()
            .filter(move |role| role.cell == cell && role.box_name.as_deref() == Some(box_name))
    }

    /// ## Errors
    /// Returns `MethodNotAllowed` if the role already exists.
    pub fn insert_role(&mut self, role: RoleRef) -> ServiceResult<()> {
        if self.roles.contains(&role) {
            return Err(ServiceError::MethodNotAllowed(format!(
                "role {role} already exists"
            )));
        }
        self.roles.insert(role);
        Ok(())
    }

    /// Removes a role and every account link to it.
    ///
    /// ## Errors
    /// Returns `NotFound` if the role does not exist.
    pub fn remove_role(&mut self, role: &RoleRef) -> ServiceResult<usize> {
        if !self.roles.remove(role) {
            return Err(ServiceError::NotFound(format!("role {role}")));
        }
        let mut unlinked = 0;
        for roles in self.links.values_mut() {
            if roles.remove(role) {
                unlinked += 1;
            }
        }
        Ok(unlinked)
    }

    /// ## Errors
    /// Returns `MethodNotAllowed` if the account already exists.
    pub fn insert_account(&mut self, account: AccountRef) -> ServiceResult<()> {
        if self.accounts.contains(&account) {
            return Err(ServiceError::MethodNotAllowed(format!(
                "account {account} already exists"
            )));
        }
        self.accounts.insert(account);
        Ok(())
    }

    /// ## Errors
    /// Returns `NotFound` if the account does not exist.
    pub fn remove_account(&mut self, account: &AccountRef) -> ServiceResult<()> {
        if !self.accounts.remove(account) {
            return Err(ServiceError::NotFound(format!("account {account}")));
        }
        self.links.remove(account);
        Ok(())
    }

    /// Links an account to a role of the same Cell.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown account or role, or a role of
    /// another Cell, and `MethodNotAllowed` if the link already exists.
    pub fn link(&mut self, account: &AccountRef, role: &RoleRef) -> ServiceResult<()> {
        if !self.accounts.contains(account) {
            return Err(ServiceError::NotFound(format!("account {account}")));
        }
        if !self.roles.contains(role) || role.cell != account.cell {
            return Err(ServiceError::NotFound(format!("role {role}")));
        }
        let linked = self.links.entry(account.clone()).or_default();
        if !linked.insert(role.clone()) {
            return Err(ServiceError::MethodNotAllowed(format!(
                "account {account} is already linked to role {role}"
            )));
        }
        Ok(())
    }

    /// ## Errors
    /// Returns `NotFound` if no such link exists.
    pub fn unlink(&mut self, account: &AccountRef, role: &RoleRef) -> ServiceResult<()> {
        let removed = self
            .links
            .get_mut(account)
            .is_some_and(|roles| roles.remove(role));
        if removed {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!(
                "link between account {account} and role {role}"
            )))
        }
    }

    /// Roles linked to an account, in a stable order.
    pub fn roles_of<'a>(&'a self, account: &AccountRef) -> impl Iterator<Item = &'a RoleRef> + 'a {
        self.links.get(account).into_iter().flatten()
    }

    /// Resolve a caller to the subjects its evaluation runs with.
    ///
    /// Unknown accounts resolve like anonymous callers.
    #[must_use]
    pub fn resolve(&self, caller: &CallerIdentity) -> Resolution {
        match caller {
            CallerIdentity::Master => Resolution::Bypass,
            CallerIdentity::Anonymous => Resolution::Subjects(ExpandedSubjects::anonymous()),
            CallerIdentity::Account(account) => {
                if !self.accounts.contains(account) {
                    tracing::debug!(%account, "Unknown account resolved as anonymous");
                    return Resolution::Subjects(ExpandedSubjects::anonymous());
                }
                Resolution::Subjects(ExpandedSubjects::from_roles(
                    self.roles_of(account).cloned(),
                ))
            }
            CallerIdentity::Roles(roles) => {
                Resolution::Subjects(ExpandedSubjects::from_roles(roles.iter().cloned()))
            }
        }
    }
}
