use async_trait::async_trait;
use sqlx::Database;

use crate::models::SiteModel;

/// Site catalog accessor.
#[async_trait]
pub trait ListSites<DB: Database>: Send + Sync {
    /// Every known site, ascending by id.
    async fn list_sites(&self) -> Result<Vec<SiteModel>, Box<dyn std::error::Error + Send + Sync>>;
}
