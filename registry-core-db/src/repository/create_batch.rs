use async_trait::async_trait;
use sqlx::Database;
use uuid::Uuid;

use crate::models::identifiable::Identifiable;

/// Generic repository trait for creating multiple entities in a batch
///
/// All creates are performed within a single transaction for atomicity.
/// Returns saved items with any generated fields (such as `id`) populated.
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
/// * `T` - The entity type that must implement Identifiable trait
///
/// # Example
/// ```ignore
/// impl CreateBatch<Postgres, EquipmentModel> for EquipmentRepositoryImpl {
///     async fn create_batch(&self, items: Vec<EquipmentModel>, run_id: Option<Uuid>) -> Result<Vec<EquipmentModel>, Box<dyn Error + Send + Sync>> {
///         // Implementation
///     }
/// }
/// ```
#[async_trait]
pub trait CreateBatch<DB: Database, T: Identifiable>: Send + Sync {
    /// Save multiple items in a single transaction
    ///
    /// # Arguments
    /// * `items` - A vector of entities to create
    /// * `run_id` - The optional id of the import or maintenance run performing this operation
    ///
    /// # Returns
    /// * `Ok(Vec<T>)` - A vector of created entities with generated fields populated
    /// * `Err` - An error if the transaction could not be executed
    async fn create_batch(
        &self,
        items: Vec<T>,
        run_id: Option<Uuid>,
    ) -> Result<Vec<T>, Box<dyn std::error::Error + Send + Sync>>;
}
