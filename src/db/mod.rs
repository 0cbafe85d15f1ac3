pub mod initialize;
pub mod log;
pub mod queries;
pub mod store;

pub use queries::EventFilter;
pub use store::{DEFAULT_TABLE, LocalStore, StoreCounts};
