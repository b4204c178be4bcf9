use super::lifecycle::Lifecycle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq)]
pub struct PaymentDraft {
    pub payer_id: Uuid,
    pub receiver_id: Uuid,
    pub amount: f64,
    pub remark: String,
}

/// A direct transfer from `payer_id` to `receiver_id`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub payer_id: Uuid,
    pub receiver_id: Uuid,
    pub amount: f64,
    pub remark: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub lifecycle: Lifecycle,
}

impl Payment {
    pub fn create(draft: PaymentDraft) -> Self {
        Payment {
            id: Uuid::new_v4(),
            payer_id: draft.payer_id,
            receiver_id: draft.receiver_id,
            amount: draft.amount,
            remark: draft.remark,
            created_at: Utc::now(),
            lifecycle: Lifecycle::Active,
        }
    }

    pub fn overwrite(&mut self, draft: PaymentDraft) {
        self.payer_id = draft.payer_id;
        self.receiver_id = draft.receiver_id;
        self.amount = draft.amount;
        self.remark = draft.remark;
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }
}
