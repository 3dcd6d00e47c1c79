pub mod create_batch;
pub mod delete_batch;
pub mod find_by_site_id;
pub mod load_batch;
pub mod lock_group;
pub mod repo_impl;
pub mod update_resolved_site;

pub use repo_impl::EquipmentRepositoryImpl;
