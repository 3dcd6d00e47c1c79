pub mod create_batch;
pub mod list_regions;
pub mod repo_impl;

pub use repo_impl::RegionRepositoryImpl;
