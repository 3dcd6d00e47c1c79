pub mod models;
pub mod normalize;
pub mod repository;
pub mod resolver;
pub mod scope;
pub mod utils;

pub use models::*;
