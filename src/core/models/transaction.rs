use super::lifecycle::Lifecycle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validated fields of a transaction as supplied by a client. Used both for
/// ingestion and for edit-overwrite.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionDraft {
    pub payer_id: Uuid,
    pub amount: f64,
    pub members: Vec<Uuid>,
    pub remark: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub payer_id: Uuid,
    pub amount: f64,
    pub members: Vec<Uuid>,
    pub remark: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub lifecycle: Lifecycle,
}

impl Transaction {
    /// Builds a new active record with a server-assigned id and timestamp.
    pub fn create(draft: TransactionDraft) -> Self {
        Transaction {
            id: Uuid::new_v4(),
            payer_id: draft.payer_id,
            amount: draft.amount,
            members: draft.members,
            remark: draft.remark,
            created_at: Utc::now(),
            lifecycle: Lifecycle::Active,
        }
    }

    /// Full overwrite of the editable fields. Identity, creation time and
    /// lifecycle are left untouched.
    pub fn overwrite(&mut self, draft: TransactionDraft) {
        self.payer_id = draft.payer_id;
        self.amount = draft.amount;
        self.members = draft.members;
        self.remark = draft.remark;
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }
}
