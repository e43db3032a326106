//! Bulk import jobs.
//!
//! A job installs a list of items below a Box on a background task. It is
//! all-or-nothing: the job ends `Ready` with every item installed, or `Failed`
//! with the tree unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::types::NodeType;

use crate::auth::acl::AclDocument;
use crate::error::ServiceResult;

/// Identifier handed back by `start_import`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(uuid::Uuid);

impl JobId {
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One node to install, addressed relative to the Box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportItem {
    /// Slash-separated path; the last segment is the new node's name.
    pub path: String,
    pub node_type: NodeType,
    #[serde(default)]
    pub acl: Option<AclDocument>,
}

impl ImportItem {
    #[must_use]
    pub fn new(path: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            path: path.into(),
            node_type,
            acl: None,
        }
    }

    #[must_use]
    pub fn with_acl(mut self, acl: AclDocument) -> Self {
        self.acl = Some(acl);
        self
    }

    /// Splits the path into parent path and name.
    #[must_use]
    pub fn split_path(&self) -> (&str, &str) {
        let trimmed = self.path.trim_matches('/');
        trimmed.rsplit_once('/').unwrap_or(("", trimmed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportStatus {
    Processing,
    Ready,
    Failed { code: String, message: String },
}

impl ImportStatus {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportJob {
    pub id: JobId,
    pub status: ImportStatus,
    pub items: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ImportJob {
    #[must_use]
    pub fn processing(items: usize) -> Self {
        Self {
            id: JobId::new(),
            status: ImportStatus::Processing,
            items,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Records the outcome of the install.
    pub fn finish(&mut self, outcome: &ServiceResult<()>) {
        self.status = match outcome {
            Ok(()) => ImportStatus::Ready,
            Err(err) => ImportStatus::Failed {
                code: err.code().to_string(),
                message: err.to_string(),
            },
        };
        self.finished_at = Some(Utc::now());
    }
}
