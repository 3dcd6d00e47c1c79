use async_trait::async_trait;
use sqlx::Database;

use crate::models::identifiable::Identifiable;

/// Repository trait for loading every entity attached to a site
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
/// * `T` - The entity type that must implement Identifiable trait
#[async_trait]
pub trait FindBySiteId<DB: Database, T: Identifiable>: Send + Sync {
    /// Entities whose resolved site is `site_id`, ascending by id
    async fn find_by_site_id(&self, site_id: i64) -> Result<Vec<T>, Box<dyn std::error::Error + Send + Sync>>;

    /// Entities that have no resolved site yet, ascending by id
    async fn find_unresolved(&self) -> Result<Vec<T>, Box<dyn std::error::Error + Send + Sync>>;
}
