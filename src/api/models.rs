use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::core::balance::{DailyTrend, LedgerBalances, LedgerSummary};
use crate::core::errors::LedgerError;
use crate::core::ingestion::{self, PaymentInput, TransactionInput};
use crate::core::models::{payment::Payment, transaction::Transaction};
use crate::infrastructure::storage::{LedgerFilter, Page};

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
}

#[derive(Deserialize, Serialize, ToSchema, Clone)]
pub struct TransactionRequest {
    pub payer_id: String,
    pub amount: f64,
    #[serde(default)]
    pub members: Vec<String>,
    pub remark: Option<String>,
}

impl From<TransactionRequest> for TransactionInput {
    fn from(req: TransactionRequest) -> Self {
        TransactionInput {
            payer_id: req.payer_id,
            amount: req.amount,
            members: req.members,
            remark: req.remark,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct EditTransactionRequest {
    pub id: String,
    #[serde(flatten)]
    pub fields: TransactionRequest,
}

#[derive(Deserialize, ToSchema)]
pub struct PaymentRequest {
    pub payer_id: String,
    pub receiver_id: String,
    pub amount: f64,
    pub remark: Option<String>,
}

impl From<PaymentRequest> for PaymentInput {
    fn from(req: PaymentRequest) -> Self {
        PaymentInput {
            payer_id: req.payer_id,
            receiver_id: req.receiver_id,
            amount: req.amount,
            remark: req.remark,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct EditPaymentRequest {
    pub id: String,
    #[serde(flatten)]
    pub fields: PaymentRequest,
}

fn parse_day(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
}

/// Listing filters. Unparsable dates and paging values are ignored.
#[derive(Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub payer_id: Option<String>,
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    pub fn filter(&self) -> Result<LedgerFilter, LedgerError> {
        let payer_id = match self.payer_id.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(raw) => Some(ingestion::parse_id("payer_id", raw)?),
            None => None,
        };
        Ok(LedgerFilter {
            payer_id,
            start_date: parse_day(self.start_date.as_deref()),
            end_date: parse_day(self.end_date.as_deref()),
        })
    }

    pub fn page(&self) -> Page {
        Page::new(
            self.page.as_deref().and_then(|p| p.parse().ok()),
            self.limit.as_deref().and_then(|l| l.parse().ok()),
        )
    }
}

#[derive(Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl PeriodQuery {
    pub fn filter(&self) -> LedgerFilter {
        LedgerFilter {
            payer_id: None,
            start_date: parse_day(self.start_date.as_deref()),
            end_date: parse_day(self.end_date.as_deref()),
        }
    }
}

// Response structs

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct TransactionView {
    pub id: Uuid,
    pub payer_id: Uuid,
    pub amount: f64,
    pub members: Vec<Uuid>,
    pub remark: String,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[schema(value_type = Option<String>)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&Transaction> for TransactionView {
    fn from(t: &Transaction) -> Self {
        TransactionView {
            id: t.id,
            payer_id: t.payer_id,
            amount: t.amount,
            members: t.members.clone(),
            remark: t.remark.clone(),
            created_at: t.created_at,
            is_deleted: t.lifecycle.is_deleted(),
            deleted_at: t.lifecycle.deleted_at(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct PaymentView {
    pub id: Uuid,
    pub payer_id: Uuid,
    pub receiver_id: Uuid,
    pub amount: f64,
    pub remark: String,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[schema(value_type = Option<String>)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&Payment> for PaymentView {
    fn from(p: &Payment) -> Self {
        PaymentView {
            id: p.id,
            payer_id: p.payer_id,
            receiver_id: p.receiver_id,
            amount: p.amount,
            remark: p.remark.clone(),
            created_at: p.created_at,
            is_deleted: p.lifecycle.is_deleted(),
            deleted_at: p.lifecycle.deleted_at(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct TransactionListResponse {
    pub transactions: Vec<TransactionView>,
    pub page: usize,
    pub limit: usize,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct PaymentListResponse {
    pub payments: Vec<PaymentView>,
    pub page: usize,
    pub limit: usize,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct DeletedResponse {
    pub message: String,
    pub id: Uuid,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct BalancesResponse {
    pub total_expenses: f64,
    pub user_expenses: BTreeMap<Uuid, f64>,
    pub user_balances: BTreeMap<Uuid, f64>,
}

impl From<LedgerBalances> for BalancesResponse {
    fn from(b: LedgerBalances) -> Self {
        BalancesResponse {
            total_expenses: b.total_expenses,
            user_expenses: b.user_expenses,
            user_balances: b.user_balances,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct DailyTrendView {
    pub date: String,
    pub total: f64,
    pub count: usize,
    pub max_amount: f64,
    pub avg_amount: f64,
}

impl From<DailyTrend> for DailyTrendView {
    fn from(d: DailyTrend) -> Self {
        DailyTrendView {
            date: d.date.format("%Y-%m-%d").to_string(),
            total: d.total,
            count: d.count,
            max_amount: d.max_amount,
            avg_amount: d.avg_amount,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct PeriodView {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct SummaryResponse {
    pub total_expenses: f64,
    pub transaction_count: usize,
    pub average_transaction: f64,
    pub largest_transaction: f64,
    pub active_users: usize,
    pub user_expenses: BTreeMap<Uuid, f64>,
    pub user_balances: BTreeMap<Uuid, f64>,
    pub daily_trends: Vec<DailyTrendView>,
    pub period: PeriodView,
}

impl SummaryResponse {
    pub fn new(summary: LedgerSummary, period: &PeriodQuery) -> Self {
        SummaryResponse {
            total_expenses: summary.balances.total_expenses,
            transaction_count: summary.transaction_count,
            average_transaction: summary.average_transaction,
            largest_transaction: summary.largest_transaction,
            active_users: summary.active_users,
            user_expenses: summary.balances.user_expenses,
            user_balances: summary.balances.user_balances,
            daily_trends: summary.daily_trends.into_iter().map(DailyTrendView::from).collect(),
            period: PeriodView {
                start_date: period.start_date.clone().unwrap_or_default(),
                end_date: period.end_date.clone().unwrap_or_default(),
            },
        }
    }
}

// Error response struct
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for LedgerError to implement IntoResponse
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self.0 {
            LedgerError::InvalidInput(field, detail) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid input for {}: {}", field, detail.description),
            ),
            LedgerError::IdMismatch { path, body } => (
                StatusCode::BAD_REQUEST,
                format!("Id mismatch: path {} but body {}", path, body),
            ),
            LedgerError::UserNotFound(id) => (StatusCode::NOT_FOUND, format!("User {} not found", id)),
            LedgerError::TransactionNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Transaction {} not found or already deleted", id),
            ),
            LedgerError::PaymentNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Payment {} not found or already deleted", id),
            ),
            LedgerError::Timeout(op) => (StatusCode::GATEWAY_TIMEOUT, format!("Store operation {} timed out", op)),
            LedgerError::PersistenceFailure(msg) => {
                error!("persistence failure: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to persist ledger change".to_string())
            }
            LedgerError::LoggingError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Logging error: {}", msg)),
        };
        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}
