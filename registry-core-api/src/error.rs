use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single problem found while building the site catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum CatalogIssue {
    DuplicateSiteId { site_id: i64 },
    DuplicateCode { code: String, site_ids: Vec<i64> },
    MissingRegion { site_id: i64 },
    UnknownRegion { site_id: i64, region_id: i64 },
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogIssue::DuplicateSiteId { site_id } => {
                write!(f, "site id {site_id} appears more than once")
            }
            CatalogIssue::DuplicateCode { code, site_ids } => {
                write!(f, "code '{code}' is shared by sites {site_ids:?}")
            }
            CatalogIssue::MissingRegion { site_id } => {
                write!(f, "site {site_id} has no region")
            }
            CatalogIssue::UnknownRegion { site_id, region_id } => {
                write!(f, "site {site_id} references unknown region {region_id}")
            }
        }
    }
}

fn format_issues(issues: &[CatalogIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Ambiguous site identifier '{identifier}': candidates {candidates:?}")]
    ResolutionAmbiguous {
        identifier: String,
        candidates: Vec<i64>,
    },

    #[error("No site matches identifier '{identifier}'")]
    ResolutionNotFound { identifier: String },

    #[error("Scope configuration error for user {user_id}: {reason}")]
    ScopeConfigurationError { user_id: i64, reason: String },

    #[error("User {user_id} is not authorized: {reason}")]
    Unauthorized { user_id: i64, reason: String },

    #[error("Catalog integrity error: {}", format_issues(.0))]
    CatalogIntegrityError(Vec<CatalogIssue>),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl RegistryError {
    /// Only a broken catalog aborts a whole batch; everything else is a
    /// per-item outcome.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RegistryError::CatalogIntegrityError(_))
    }

    /// Outcomes that end up as "needs review" items in import reports.
    pub fn needs_review(&self) -> bool {
        matches!(
            self,
            RegistryError::ResolutionAmbiguous { .. } | RegistryError::ResolutionNotFound { .. }
        )
    }
}

impl From<validator::ValidationErrors> for RegistryError {
    fn from(errors: validator::ValidationErrors) -> Self {
        RegistryError::ValidationError(errors.to_string())
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for RegistryError {
    fn from(error: sqlx::Error) -> Self {
        RegistryError::DatabaseError(error.to_string())
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
