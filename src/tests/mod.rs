mod api_tests;

use crate::core::errors::LedgerError;
use crate::core::models::{
    payment::{Payment, PaymentDraft},
    transaction::{Transaction, TransactionDraft},
    user::User,
};
use crate::core::services::LedgerService;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use crate::infrastructure::storage::{LedgerFilter, Page, Storage};
use crate::realtime::{BroadcastHub, HubHandle};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

pub const TEST_STORE_TIMEOUT: Duration = Duration::from_secs(5);

pub fn create_test_service() -> LedgerService<InMemoryLogging, InMemoryStorage> {
    service_with_storage(InMemoryStorage::new())
}

pub fn service_with_storage<S: Storage>(storage: S) -> LedgerService<InMemoryLogging, S> {
    let (hub, _task) = BroadcastHub::spawn(64, 16);
    LedgerService::new(storage, InMemoryLogging::new(), hub, TEST_STORE_TIMEOUT)
}

/// Waits until every command sent to the hub so far has been processed, so an
/// empty outbox really means nothing was published.
pub async fn drain_hub(hub: &HubHandle) {
    hub.subscriber_count().await.unwrap();
}

/// In-memory store whose writes can be made to fail or stall, or whose edits
/// can be raced by a soft delete that lands just before them.
#[derive(Clone, Default)]
pub struct FaultyStorage {
    inner: InMemoryStorage,
    fail_writes: bool,
    write_delay: Option<Duration>,
    soft_delete_before_edit: bool,
}

impl FaultyStorage {
    pub fn failing() -> Self {
        FaultyStorage {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub fn stalling(delay: Duration) -> Self {
        FaultyStorage {
            write_delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn deleting_before_edit() -> Self {
        FaultyStorage {
            soft_delete_before_edit: true,
            ..Default::default()
        }
    }

    async fn before_write(&self) -> Result<(), LedgerError> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes {
            return Err(LedgerError::PersistenceFailure("disk unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FaultyStorage {
    async fn insert_user(&self, user: User) -> Result<(), LedgerError> {
        self.before_write().await?;
        self.inner.insert_user(user).await
    }

    async fn list_users(&self) -> Result<Vec<User>, LedgerError> {
        self.inner.list_users().await
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, LedgerError> {
        self.inner.get_user(user_id).await
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<Uuid, LedgerError> {
        self.before_write().await?;
        self.inner.delete_user(user_id).await
    }

    async fn insert_transaction(&self, transaction: Transaction) -> Result<(), LedgerError> {
        self.before_write().await?;
        self.inner.insert_transaction(transaction).await
    }

    async fn query_transactions(
        &self,
        filter: &LedgerFilter,
        page: Option<Page>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.inner.query_transactions(filter, page).await
    }

    async fn get_transaction(&self, transaction_id: Uuid) -> Result<Option<Transaction>, LedgerError> {
        self.inner.get_transaction(transaction_id).await
    }

    async fn edit_transaction(
        &self,
        transaction_id: Uuid,
        draft: TransactionDraft,
    ) -> Result<Transaction, LedgerError> {
        self.before_write().await?;
        if self.soft_delete_before_edit {
            self.inner.soft_delete_transaction(transaction_id, Utc::now()).await?;
        }
        self.inner.edit_transaction(transaction_id, draft).await
    }

    async fn soft_delete_transaction(
        &self,
        transaction_id: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        self.before_write().await?;
        self.inner.soft_delete_transaction(transaction_id, deleted_at).await
    }

    async fn hard_delete_transaction(&self, transaction_id: Uuid) -> Result<Uuid, LedgerError> {
        self.before_write().await?;
        self.inner.hard_delete_transaction(transaction_id).await
    }

    async fn insert_payment(&self, payment: Payment) -> Result<(), LedgerError> {
        self.before_write().await?;
        self.inner.insert_payment(payment).await
    }

    async fn query_payments(&self, filter: &LedgerFilter, page: Option<Page>) -> Result<Vec<Payment>, LedgerError> {
        self.inner.query_payments(filter, page).await
    }

    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, LedgerError> {
        self.inner.get_payment(payment_id).await
    }

    async fn edit_payment(&self, payment_id: Uuid, draft: PaymentDraft) -> Result<Payment, LedgerError> {
        self.before_write().await?;
        if self.soft_delete_before_edit {
            self.inner.soft_delete_payment(payment_id, Utc::now()).await?;
        }
        self.inner.edit_payment(payment_id, draft).await
    }

    async fn soft_delete_payment(&self, payment_id: Uuid, deleted_at: DateTime<Utc>) -> Result<Payment, LedgerError> {
        self.before_write().await?;
        self.inner.soft_delete_payment(payment_id, deleted_at).await
    }

    async fn hard_delete_payment(&self, payment_id: Uuid) -> Result<Uuid, LedgerError> {
        self.before_write().await?;
        self.inner.hard_delete_payment(payment_id).await
    }
}
