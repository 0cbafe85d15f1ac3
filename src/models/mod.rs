pub mod event;
pub mod policy;

pub use event::{Event, NewEvent, RemoteRow};
pub use policy::ReconcilePolicy;
