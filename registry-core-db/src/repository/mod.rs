pub mod create_batch;
pub mod delete_batch;
pub mod find_by_site_id;
pub mod list_regions;
pub mod list_sites;
pub mod load_batch;
pub mod pagination;
pub mod update_resolved_site;

// Re-exports
pub use create_batch::*;
pub use delete_batch::*;
pub use find_by_site_id::*;
pub use list_regions::*;
pub use list_sites::*;
pub use load_batch::*;
pub use pagination::*;
pub use update_resolved_site::*;
