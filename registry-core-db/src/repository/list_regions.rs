use async_trait::async_trait;
use sqlx::Database;

use crate::models::RegionModel;

#[async_trait]
pub trait ListRegions<DB: Database>: Send + Sync {
    async fn list_regions(&self) -> Result<Vec<RegionModel>, Box<dyn std::error::Error + Send + Sync>>;
}
