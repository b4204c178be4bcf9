use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Visibility state of a ledger record. Permanent removal is a separate store
/// operation and has no state of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Lifecycle {
    #[default]
    Active,
    SoftDeleted { deleted_at: DateTime<Utc> },
}

impl Lifecycle {
    pub fn is_active(&self) -> bool {
        matches!(self, Lifecycle::Active)
    }

    pub fn is_deleted(&self) -> bool {
        !self.is_active()
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Lifecycle::Active => None,
            Lifecycle::SoftDeleted { deleted_at } => Some(*deleted_at),
        }
    }
}
