pub mod catalog_cache;
pub mod config;
pub mod executor;
pub mod maintenance;
pub mod postgres_repositories;
pub mod repository;
pub mod utils;

pub use catalog_cache::CatalogCache;
pub use config::RegistryConfig;
pub use executor::Executor;
pub use maintenance::{DedupPass, MaintenanceError, ReResolvePass};
pub use postgres_repositories::{PostgresRepositories, RegistryRepositories};

#[cfg(test)]
pub mod test_helper;
