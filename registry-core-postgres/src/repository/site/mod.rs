pub mod region_repository;
pub mod site_repository;

pub use region_repository::RegionRepositoryImpl;
pub use site_repository::SiteRepositoryImpl;
