use crate::core::errors::LedgerError;
use crate::core::models::{
    lifecycle::Lifecycle,
    payment::{Payment, PaymentDraft},
    transaction::{Transaction, TransactionDraft},
    user::User,
};
use crate::infrastructure::storage::{LedgerFilter, Page, Storage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    transactions: Arc<RwLock<HashMap<Uuid, Transaction>>>,
    payments: Arc<RwLock<HashMap<Uuid, Payment>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            users: Arc::new(RwLock::new(HashMap::new())),
            transactions: Arc::new(RwLock::new(HashMap::new())),
            payments: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

/// Sorts newest first and cuts out the requested page window.
fn paginate<T>(mut rows: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>, page: Option<Page>) -> Vec<T> {
    rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    match page {
        Some(page) => rows.into_iter().skip(page.offset()).take(page.limit).collect(),
        None => rows,
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn insert_user(&self, user: User) -> Result<(), LedgerError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(LedgerError::PersistenceFailure(format!("duplicate user id {}", user.id)));
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, LedgerError> {
        let users = self.users.read().await;
        let mut list: Vec<User> = users.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, LedgerError> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<Uuid, LedgerError> {
        let mut users = self.users.write().await;
        users
            .remove(&user_id)
            .map(|u| u.id)
            .ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))
    }

    async fn insert_transaction(&self, transaction: Transaction) -> Result<(), LedgerError> {
        let mut transactions = self.transactions.write().await;
        if transactions.contains_key(&transaction.id) {
            return Err(LedgerError::PersistenceFailure(format!(
                "duplicate transaction id {}",
                transaction.id
            )));
        }
        transactions.insert(transaction.id, transaction);
        Ok(())
    }

    async fn query_transactions(
        &self,
        filter: &LedgerFilter,
        page: Option<Page>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let transactions = self.transactions.read().await;
        let rows: Vec<Transaction> = transactions
            .values()
            .filter(|t| t.is_active() && filter.matches(t.payer_id, t.created_at))
            .cloned()
            .collect();
        Ok(paginate(rows, |t: &Transaction| t.created_at, page))
    }

    async fn get_transaction(&self, transaction_id: Uuid) -> Result<Option<Transaction>, LedgerError> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(&transaction_id).cloned())
    }

    async fn edit_transaction(
        &self,
        transaction_id: Uuid,
        draft: TransactionDraft,
    ) -> Result<Transaction, LedgerError> {
        let mut transactions = self.transactions.write().await;
        match transactions.get_mut(&transaction_id) {
            Some(transaction) if transaction.is_active() => {
                transaction.overwrite(draft);
                Ok(transaction.clone())
            }
            _ => Err(LedgerError::TransactionNotFound(transaction_id.to_string())),
        }
    }

    async fn soft_delete_transaction(
        &self,
        transaction_id: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        let mut transactions = self.transactions.write().await;
        match transactions.get_mut(&transaction_id) {
            Some(transaction) if transaction.is_active() => {
                transaction.lifecycle = Lifecycle::SoftDeleted { deleted_at };
                Ok(transaction.clone())
            }
            _ => Err(LedgerError::TransactionNotFound(transaction_id.to_string())),
        }
    }

    async fn hard_delete_transaction(&self, transaction_id: Uuid) -> Result<Uuid, LedgerError> {
        let mut transactions = self.transactions.write().await;
        transactions
            .remove(&transaction_id)
            .map(|t| t.id)
            .ok_or_else(|| LedgerError::TransactionNotFound(transaction_id.to_string()))
    }

    async fn insert_payment(&self, payment: Payment) -> Result<(), LedgerError> {
        let mut payments = self.payments.write().await;
        if payments.contains_key(&payment.id) {
            return Err(LedgerError::PersistenceFailure(format!("duplicate payment id {}", payment.id)));
        }
        payments.insert(payment.id, payment);
        Ok(())
    }

    async fn query_payments(&self, filter: &LedgerFilter, page: Option<Page>) -> Result<Vec<Payment>, LedgerError> {
        let payments = self.payments.read().await;
        let rows: Vec<Payment> = payments
            .values()
            .filter(|p| p.is_active() && filter.matches(p.payer_id, p.created_at))
            .cloned()
            .collect();
        Ok(paginate(rows, |p: &Payment| p.created_at, page))
    }

    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, LedgerError> {
        let payments = self.payments.read().await;
        Ok(payments.get(&payment_id).cloned())
    }

    async fn edit_payment(&self, payment_id: Uuid, draft: PaymentDraft) -> Result<Payment, LedgerError> {
        let mut payments = self.payments.write().await;
        match payments.get_mut(&payment_id) {
            Some(payment) if payment.is_active() => {
                payment.overwrite(draft);
                Ok(payment.clone())
            }
            _ => Err(LedgerError::PaymentNotFound(payment_id.to_string())),
        }
    }

    async fn soft_delete_payment(&self, payment_id: Uuid, deleted_at: DateTime<Utc>) -> Result<Payment, LedgerError> {
        let mut payments = self.payments.write().await;
        match payments.get_mut(&payment_id) {
            Some(payment) if payment.is_active() => {
                payment.lifecycle = Lifecycle::SoftDeleted { deleted_at };
                Ok(payment.clone())
            }
            _ => Err(LedgerError::PaymentNotFound(payment_id.to_string())),
        }
    }

    async fn hard_delete_payment(&self, payment_id: Uuid) -> Result<Uuid, LedgerError> {
        let mut payments = self.payments.write().await;
        payments
            .remove(&payment_id)
            .map(|p| p.id)
            .ok_or_else(|| LedgerError::PaymentNotFound(payment_id.to_string()))
    }
}
