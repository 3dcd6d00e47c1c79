use async_trait::async_trait;
use sqlx::Database;

/// Repository trait for persisting site resolutions
///
/// Only rows that are still unresolved are touched, so a concurrent manual
/// assignment is never overwritten.
#[async_trait]
pub trait UpdateResolvedSite<DB: Database>: Send + Sync {
    /// Apply `(entity id, site id)` assignments in a single transaction
    ///
    /// # Returns
    /// * `Ok(usize)` - The number of rows actually updated
    /// * `Err` - An error if the transaction could not be executed
    async fn update_resolved_site(
        &self,
        assignments: &[(i64, i64)],
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;
}
