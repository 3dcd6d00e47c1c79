pub mod create_batch;
pub mod find_ids_by_code_hash;
pub mod list_sites;
pub mod repo_impl;

pub use repo_impl::SiteRepositoryImpl;
