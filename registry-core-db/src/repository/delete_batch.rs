use async_trait::async_trait;
use sqlx::Database;
use uuid::Uuid;

/// Generic repository trait for deleting multiple entities in a batch
///
/// All deletes are performed within a single transaction for atomicity.
/// Returns the number of items successfully deleted.
///
/// # Example
/// ```ignore
/// impl DeleteBatch<Postgres> for EquipmentRepositoryImpl {
///     async fn delete_batch(&self, ids: &[i64], run_id: Option<Uuid>) -> Result<usize, Box<dyn Error + Send + Sync>> {
///         // Implementation
///     }
/// }
/// ```
#[async_trait]
pub trait DeleteBatch<DB: Database>: Send + Sync {
    /// Delete multiple items by their IDs in a single transaction
    ///
    /// # Arguments
    /// * `ids` - A slice of ids of the entities to delete
    /// * `run_id` - The optional id of the run performing the deletion, recorded with each removal
    ///
    /// # Returns
    /// * `Ok(usize)` - The number of items successfully deleted
    /// * `Err` - An error if the transaction could not be executed
    async fn delete_batch(
        &self,
        ids: &[i64],
        run_id: Option<Uuid>,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;
}
