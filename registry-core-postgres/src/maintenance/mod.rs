//! Batch maintenance passes over stored equipment.
//!
//! Both passes refuse to start when the site catalog fails integrity checks.

pub mod dedup_pass;
pub mod re_resolve_pass;

pub use dedup_pass::{DedupPass, DedupRunReport};
pub use re_resolve_pass::{ReResolvePass, ReResolveReport};

use registry_core_api::RegistryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaintenanceError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Site group {group} still conflicting after {attempts} attempts")]
    RetriesExhausted { group: String, attempts: u32 },
}

impl From<Box<dyn std::error::Error + Send + Sync>> for MaintenanceError {
    fn from(error: Box<dyn std::error::Error + Send + Sync>) -> Self {
        match error.downcast::<RegistryError>() {
            Ok(registry) => MaintenanceError::Registry(*registry),
            Err(other) => match other.downcast::<sqlx::Error>() {
                Ok(database) => MaintenanceError::Database(*database),
                Err(other) => MaintenanceError::Repository(other.to_string()),
            },
        }
    }
}

pub(crate) fn group_label(site_id: Option<i64>) -> String {
    match site_id {
        Some(site_id) => format!("site {site_id}"),
        None => "unresolved".to_string(),
    }
}
