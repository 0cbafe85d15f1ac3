pub mod lock;
pub mod scheduler;
pub mod sync;

pub use scheduler::{Scheduler, SchedulerHandle};
pub use sync::{SyncEngine, SyncOutcome, SyncSettings};
