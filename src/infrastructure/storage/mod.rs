use crate::core::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::core::errors::LedgerError;
use crate::core::models::{
    payment::{Payment, PaymentDraft},
    transaction::{Transaction, TransactionDraft},
    user::User,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Optional constraints applied when listing ledger records. Date bounds are
/// inclusive calendar days in UTC.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerFilter {
    pub payer_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl LedgerFilter {
    pub fn matches(&self, payer_id: Uuid, created_at: DateTime<Utc>) -> bool {
        let day = created_at.date_naive();
        self.payer_id.is_none_or(|p| p == payer_id)
            && self.start_date.is_none_or(|start| day >= start)
            && self.end_date.is_none_or(|end| day <= end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Page {
    /// Out-of-range values fall back to the defaults instead of failing.
    pub fn new(page: Option<usize>, limit: Option<usize>) -> Self {
        let defaults = Page::default();
        Page {
            page: page.filter(|p| *p > 0).unwrap_or(defaults.page),
            limit: limit
                .filter(|l| (1..=MAX_PAGE_LIMIT).contains(l))
                .unwrap_or(defaults.limit),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn insert_user(&self, user: User) -> Result<(), LedgerError>;
    async fn list_users(&self) -> Result<Vec<User>, LedgerError>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, LedgerError>;
    async fn delete_user(&self, user_id: Uuid) -> Result<Uuid, LedgerError>;

    async fn insert_transaction(&self, transaction: Transaction) -> Result<(), LedgerError>;
    /// Active transactions matching `filter`, newest first. `None` returns every match.
    async fn query_transactions(
        &self,
        filter: &LedgerFilter,
        page: Option<Page>,
    ) -> Result<Vec<Transaction>, LedgerError>;
    /// Direct lookup; soft-deleted records are still returned.
    async fn get_transaction(&self, transaction_id: Uuid) -> Result<Option<Transaction>, LedgerError>;
    /// Overwrites the editable fields of an active transaction. The lifecycle
    /// check and the write happen atomically; a soft-deleted or missing record
    /// yields `TransactionNotFound`.
    async fn edit_transaction(
        &self,
        transaction_id: Uuid,
        draft: TransactionDraft,
    ) -> Result<Transaction, LedgerError>;
    async fn soft_delete_transaction(
        &self,
        transaction_id: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError>;
    async fn hard_delete_transaction(&self, transaction_id: Uuid) -> Result<Uuid, LedgerError>;

    async fn insert_payment(&self, payment: Payment) -> Result<(), LedgerError>;
    async fn query_payments(&self, filter: &LedgerFilter, page: Option<Page>) -> Result<Vec<Payment>, LedgerError>;
    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, LedgerError>;
    async fn edit_payment(&self, payment_id: Uuid, draft: PaymentDraft) -> Result<Payment, LedgerError>;
    async fn soft_delete_payment(&self, payment_id: Uuid, deleted_at: DateTime<Utc>) -> Result<Payment, LedgerError>;
    async fn hard_delete_payment(&self, payment_id: Uuid) -> Result<Uuid, LedgerError>;
}

pub mod in_memory;
