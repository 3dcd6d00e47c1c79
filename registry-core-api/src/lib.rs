pub mod domain;
pub mod dto;
pub mod error;

pub use error::*;
pub use domain::*;
pub use dto::*;
