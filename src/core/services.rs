use crate::core::balance::{self, LedgerBalances, LedgerSummary};
use crate::core::constants::{
    PAYMENT_ADDED, PAYMENT_DELETED, PAYMENT_EDITED, PAYMENT_SOFT_DELETED, TRANSACTION_ADDED, TRANSACTION_DELETED,
    TRANSACTION_EDITED, TRANSACTION_SOFT_DELETED, USER_ADDED, USER_DELETED,
};
use crate::core::errors::LedgerError;
use crate::core::ingestion::{self, PaymentInput, TransactionInput};
use crate::core::models::{audit::AppLog, payment::Payment, transaction::Transaction, user::User};
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::{LedgerFilter, Page, Storage};
use crate::realtime::HubHandle;
use chrono::Utc;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct LedgerService<L: LoggingService, S: Storage> {
    storage: S,
    logging: L,
    hub: HubHandle,
    store_timeout: Duration,
}

impl<L: LoggingService, S: Storage> LedgerService<L, S> {
    pub fn new(storage: S, logging: L, hub: HubHandle, store_timeout: Duration) -> Self {
        LedgerService {
            storage,
            logging,
            hub,
            store_timeout,
        }
    }

    pub fn hub(&self) -> &HubHandle {
        &self.hub
    }

    /// Bounds a single store call by the configured timeout. An expired call is
    /// abandoned, not retried.
    async fn store<T, F>(&self, operation: &str, call: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, LedgerError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                if let LedgerError::PersistenceFailure(ref reason) = err {
                    error!(operation, reason = %reason, "store operation failed");
                }
                Err(err)
            }
            Err(_) => {
                warn!(operation, timeout_secs = self.store_timeout.as_secs(), "store operation timed out");
                Err(LedgerError::Timeout(operation.to_string()))
            }
        }
    }

    /// Audit failures never undo a committed write, so they are only reported.
    async fn audit(&self, action: &str, details: serde_json::Value, subject_id: Option<&str>) {
        if let Err(err) = self.logging.log_action(action, details, subject_id).await {
            warn!(action, error = %err, "failed to record audit entry");
        }
    }

    // Users

    pub async fn add_user(&self, name: &str) -> Result<User, LedgerError> {
        let user = User::new(ingestion::validate_name(name)?);
        self.store("insert_user", self.storage.insert_user(user.clone())).await?;
        info!(user_id = %user.id, "user added");
        self.audit(USER_ADDED, json!({ "user_id": user.id, "name": user.name }), Some(&user.id.to_string()))
            .await;
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, LedgerError> {
        self.store("list_users", self.storage.list_users()).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, LedgerError> {
        let id = ingestion::parse_id("user_id", user_id)?;
        self.store("get_user", self.storage.get_user(id))
            .await?
            .ok_or_else(|| LedgerError::UserNotFound(id.to_string()))
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<Uuid, LedgerError> {
        let id = ingestion::parse_id("user_id", user_id)?;
        let deleted = self.store("delete_user", self.storage.delete_user(id)).await?;
        info!(user_id = %deleted, "user deleted");
        self.audit(USER_DELETED, json!({ "user_id": deleted }), Some(&deleted.to_string()))
            .await;
        Ok(deleted)
    }

    // Transactions

    /// Validates, persists and then broadcasts a new transaction. Nothing is
    /// published unless the insert succeeded.
    pub async fn add_transaction(&self, input: TransactionInput) -> Result<Transaction, LedgerError> {
        let draft = ingestion::parse_transaction(input)?;
        let transaction = Transaction::create(draft);

        self.store("insert_transaction", self.storage.insert_transaction(transaction.clone()))
            .await?;
        info!(
            transaction_id = %transaction.id,
            payer_id = %transaction.payer_id,
            amount = transaction.amount,
            members = transaction.members.len(),
            "transaction recorded"
        );

        self.hub.publish(transaction.clone()).await;
        self.audit(
            TRANSACTION_ADDED,
            json!({
                "transaction_id": transaction.id,
                "payer_id": transaction.payer_id,
                "amount": transaction.amount,
                "members": transaction.members,
            }),
            Some(&transaction.payer_id.to_string()),
        )
        .await;

        Ok(transaction)
    }

    pub async fn list_transactions(&self, filter: &LedgerFilter, page: Page) -> Result<Vec<Transaction>, LedgerError> {
        self.store("query_transactions", self.storage.query_transactions(filter, Some(page)))
            .await
    }

    /// Direct lookup by id, soft-deleted records included.
    pub async fn get_transaction(&self, transaction_id: &str) -> Result<Transaction, LedgerError> {
        let id = ingestion::parse_id("transaction_id", transaction_id)?;
        self.store("get_transaction", self.storage.get_transaction(id))
            .await?
            .ok_or_else(|| LedgerError::TransactionNotFound(id.to_string()))
    }

    /// Overwrites payer, amount, members and remark of an active transaction.
    pub async fn edit_transaction(
        &self,
        path_id: &str,
        body_id: &str,
        input: TransactionInput,
    ) -> Result<Transaction, LedgerError> {
        let id = ingestion::parse_id("transaction_id", path_id)?;
        if ingestion::parse_id("id", body_id)? != id {
            return Err(LedgerError::IdMismatch {
                path: path_id.to_string(),
                body: body_id.to_string(),
            });
        }
        let draft = ingestion::parse_transaction(input)?;

        let transaction = self
            .store("edit_transaction", self.storage.edit_transaction(id, draft))
            .await?;

        info!(transaction_id = %id, "transaction edited");
        self.audit(
            TRANSACTION_EDITED,
            json!({ "transaction_id": id, "amount": transaction.amount, "members": transaction.members }),
            Some(&transaction.payer_id.to_string()),
        )
        .await;
        Ok(transaction)
    }

    pub async fn soft_delete_transaction(&self, transaction_id: &str) -> Result<Transaction, LedgerError> {
        let id = ingestion::parse_id("transaction_id", transaction_id)?;
        let transaction = self
            .store("soft_delete_transaction", self.storage.soft_delete_transaction(id, Utc::now()))
            .await?;
        info!(transaction_id = %id, "transaction soft deleted");
        self.audit(TRANSACTION_SOFT_DELETED, json!({ "transaction_id": id }), None)
            .await;
        Ok(transaction)
    }

    /// Permanent removal, regardless of lifecycle state.
    pub async fn delete_transaction(&self, transaction_id: &str) -> Result<Uuid, LedgerError> {
        let id = ingestion::parse_id("transaction_id", transaction_id)?;
        let deleted = self
            .store("hard_delete_transaction", self.storage.hard_delete_transaction(id))
            .await?;
        info!(transaction_id = %deleted, "transaction deleted");
        self.audit(TRANSACTION_DELETED, json!({ "transaction_id": deleted }), None)
            .await;
        Ok(deleted)
    }

    pub async fn get_balances(&self, filter: &LedgerFilter) -> Result<LedgerBalances, LedgerError> {
        let transactions = self
            .store("query_transactions", self.storage.query_transactions(filter, None))
            .await?;
        Ok(balance::compute_balances(&transactions))
    }

    pub async fn get_summary(&self, filter: &LedgerFilter) -> Result<LedgerSummary, LedgerError> {
        let transactions = self
            .store("query_transactions", self.storage.query_transactions(filter, None))
            .await?;
        Ok(balance::summarize(&transactions))
    }

    // Payments

    pub async fn add_payment(&self, input: PaymentInput) -> Result<Payment, LedgerError> {
        let payment = Payment::create(ingestion::parse_payment(input)?);
        self.store("insert_payment", self.storage.insert_payment(payment.clone()))
            .await?;
        info!(payment_id = %payment.id, amount = payment.amount, "payment recorded");
        self.audit(
            PAYMENT_ADDED,
            json!({
                "payment_id": payment.id,
                "payer_id": payment.payer_id,
                "receiver_id": payment.receiver_id,
                "amount": payment.amount,
            }),
            Some(&payment.payer_id.to_string()),
        )
        .await;
        Ok(payment)
    }

    pub async fn list_payments(&self, filter: &LedgerFilter, page: Page) -> Result<Vec<Payment>, LedgerError> {
        self.store("query_payments", self.storage.query_payments(filter, Some(page)))
            .await
    }

    pub async fn get_payment(&self, payment_id: &str) -> Result<Payment, LedgerError> {
        let id = ingestion::parse_id("payment_id", payment_id)?;
        self.store("get_payment", self.storage.get_payment(id))
            .await?
            .ok_or_else(|| LedgerError::PaymentNotFound(id.to_string()))
    }

    pub async fn edit_payment(&self, path_id: &str, body_id: &str, input: PaymentInput) -> Result<Payment, LedgerError> {
        let id = ingestion::parse_id("payment_id", path_id)?;
        if ingestion::parse_id("id", body_id)? != id {
            return Err(LedgerError::IdMismatch {
                path: path_id.to_string(),
                body: body_id.to_string(),
            });
        }
        let draft = ingestion::parse_payment(input)?;

        let payment = self
            .store("edit_payment", self.storage.edit_payment(id, draft))
            .await?;

        info!(payment_id = %id, "payment edited");
        self.audit(
            PAYMENT_EDITED,
            json!({ "payment_id": id, "amount": payment.amount }),
            Some(&payment.payer_id.to_string()),
        )
        .await;
        Ok(payment)
    }

    pub async fn soft_delete_payment(&self, payment_id: &str) -> Result<Payment, LedgerError> {
        let id = ingestion::parse_id("payment_id", payment_id)?;
        let payment = self
            .store("soft_delete_payment", self.storage.soft_delete_payment(id, Utc::now()))
            .await?;
        info!(payment_id = %id, "payment soft deleted");
        self.audit(PAYMENT_SOFT_DELETED, json!({ "payment_id": id }), None).await;
        Ok(payment)
    }

    pub async fn delete_payment(&self, payment_id: &str) -> Result<Uuid, LedgerError> {
        let id = ingestion::parse_id("payment_id", payment_id)?;
        let deleted = self
            .store("hard_delete_payment", self.storage.hard_delete_payment(id))
            .await?;
        info!(payment_id = %deleted, "payment deleted");
        self.audit(PAYMENT_DELETED, json!({ "payment_id": deleted }), None).await;
        Ok(deleted)
    }

    pub async fn get_payment_balances(&self) -> Result<LedgerBalances, LedgerError> {
        let payments = self
            .store("query_payments", self.storage.query_payments(&LedgerFilter::default(), None))
            .await?;
        Ok(balance::compute_payment_balances(&payments))
    }

    pub async fn get_app_logs(&self) -> Result<Vec<AppLog>, LedgerError> {
        self.logging.get_logs().await
    }
}
