//! Remote store adapters: where confirmed events end up.

pub mod postgres;
pub mod probe;

use crate::errors::RemoteError;
use crate::models::event::RemoteRow;
use async_trait::async_trait;

pub use postgres::PgRemote;
pub use probe::ReachabilityProbe;

/// The authoritative destination for attendance rows.
///
/// Object-safe so the engine can hold an `Arc<dyn RemoteStore>`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Lightweight connect-and-close. Never fails; an error means `false`.
    async fn ping(&self) -> bool;

    /// Insert every row of `rows` in one server-side transaction.
    ///
    /// Either all rows are committed and their count is returned, or the
    /// transaction is rolled back and an error is returned: the caller never
    /// sees a partially applied batch.
    async fn bulk_insert(&self, rows: &[RemoteRow]) -> Result<u64, RemoteError>;
}
