use async_trait::async_trait;
use registry_core_api::{RegistryError, RegistryResult};

use super::filter::{apply, build_filter};
use crate::models::{EquipmentModel, UserContextModel};
use crate::resolver::SiteCatalog;

/// Source of the resolved principal for a request.
///
/// Session handling and authentication live outside this crate; implementors
/// only hand over the user's role and assignments.
#[async_trait]
pub trait UserContextProvider: Send + Sync {
    /// # Returns
    /// * `Ok(Some(context))` - The user's current scope
    /// * `Ok(None)` - Unknown user
    /// * `Err` - The context could not be loaded
    async fn user_context(&self, user_id: i64) -> RegistryResult<Option<UserContextModel>>;
}

/// Looks up the principal and returns the records it may see.
pub async fn list_for_user<P: UserContextProvider + ?Sized>(
    provider: &P,
    user_id: i64,
    records: Vec<EquipmentModel>,
    catalog: &SiteCatalog,
) -> RegistryResult<Vec<EquipmentModel>> {
    let context = provider
        .user_context(user_id)
        .await?
        .ok_or_else(|| RegistryError::Unauthorized {
            user_id,
            reason: "unknown user".to_string(),
        })?;
    let predicate = build_filter(&context, catalog)?;
    Ok(apply(&predicate, records, catalog))
}
