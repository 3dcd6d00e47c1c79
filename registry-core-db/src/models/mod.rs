pub mod equipment;
pub mod identifiable;
pub mod import_row;
pub mod index;
pub mod indexable;
pub mod region;
pub mod site;
pub mod user_context;

// Re-exports
pub use equipment::*;
pub use identifiable::*;
pub use import_row::*;
pub use index::*;
pub use indexable::*;
pub use region::*;
pub use site::*;
pub use user_context::*;
