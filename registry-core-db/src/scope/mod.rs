pub mod dedup;
pub mod filter;
pub mod provider;
pub mod request;

pub use dedup::{deduplicate, DedupGroup, DedupPlan, SiteKey};
pub use filter::{apply, apply_page, build_filter, ScopePredicate};
pub use provider::{list_for_user, UserContextProvider};
pub use request::request_predicate;
