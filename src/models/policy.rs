use serde::{Deserialize, Serialize};
use std::fmt;

/// What happens to a local row once the server has confirmed it.
///
/// One policy is chosen per engine and applied to every batch it reconciles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePolicy {
    /// Keep the row and set `synced = 1`.
    #[default]
    MarkSynced,
    /// Remove the row from the local store.
    Delete,
}

impl ReconcilePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcilePolicy::MarkSynced => "mark_synced",
            ReconcilePolicy::Delete => "delete",
        }
    }
}

impl fmt::Display for ReconcilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
