use crate::{
    api::models::*,
    api::ws::transactions_ws,
    core::{
        models::{audit::AppLog, user::User},
        services::LedgerService,
    },
    infrastructure::{logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use std::sync::Arc;

pub type AppService = LedgerService<InMemoryLogging, InMemoryStorage>;
pub type AppState = Arc<AppService>;

fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

// Define API routes
pub fn api_routes(service: AppState) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{user_id}", get(get_user).delete(delete_user))
        .route("/transactions", get(list_transactions).post(add_transaction))
        .route(
            "/transactions/{transaction_id}",
            get(get_transaction).put(edit_transaction).delete(delete_transaction),
        )
        .route(
            "/transactions/{transaction_id}/soft-delete",
            delete(soft_delete_transaction),
        )
        .route("/summary", get(get_summary))
        .route("/balances", get(get_balances))
        .route("/payments", get(list_payments).post(add_payment))
        .route(
            "/payments/{payment_id}",
            get(get_payment).put(edit_payment).delete(delete_payment),
        )
        .route("/payments/{payment_id}/soft-delete", delete(soft_delete_payment))
        .route("/payment-summary", get(get_payment_summary))
        .route("/logs", get(get_app_logs))
        .with_state(service)
}

/// Routes served outside the `/api` prefix.
pub fn realtime_routes(service: AppState) -> Router {
    Router::new()
        .route("/ws/transactions", get(transactions_ws))
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = User),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub(crate) async fn create_user(
    State(service): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = service.add_user(&req.name).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 204, description = "No users registered")
    )
)]
pub(crate) async fn list_users(State(service): State<AppState>) -> Result<Response, ApiError> {
    let users = service.list_users().await?;
    if users.is_empty() {
        return Ok(no_content());
    }
    Ok(Json(users).into_response())
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(
        ("user_id" = String, Path, description = "ID of the user to retrieve")
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = User),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_user(
    State(service): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(service.get_user(&user_id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    params(
        ("user_id" = String, Path, description = "ID of the user to delete")
    ),
    responses(
        (status = 200, description = "User deleted", body = DeletedResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub(crate) async fn delete_user(
    State(service): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = service.delete_user(&user_id).await?;
    Ok(Json(DeletedResponse {
        message: "User deleted successfully".to_string(),
        id,
    }))
}

#[utoipa::path(
    post,
    path = "/api/transactions",
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded and broadcast", body = TransactionView),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Persistence failure", body = ErrorResponse),
        (status = 504, description = "Store timed out", body = ErrorResponse)
    )
)]
pub(crate) async fn add_transaction(
    State(service): State<AppState>,
    Json(req): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionView>), ApiError> {
    let transaction = service.add_transaction(req.into()).await?;
    Ok((StatusCode::CREATED, Json(TransactionView::from(&transaction))))
}

#[utoipa::path(
    get,
    path = "/api/transactions",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of active transactions, newest first", body = TransactionListResponse),
        (status = 204, description = "No matching transactions")
    )
)]
pub(crate) async fn list_transactions(
    State(service): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let page = query.page();
    let transactions = service.list_transactions(&query.filter()?, page).await?;
    if transactions.is_empty() {
        return Ok(no_content());
    }
    Ok(Json(TransactionListResponse {
        transactions: transactions.iter().map(TransactionView::from).collect(),
        page: page.page,
        limit: page.limit,
    })
    .into_response())
}

#[utoipa::path(
    get,
    path = "/api/transactions/{transaction_id}",
    params(
        ("transaction_id" = String, Path, description = "Transaction id")
    ),
    responses(
        (status = 200, description = "Transaction, soft-deleted ones included", body = TransactionView),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_transaction(
    State(service): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionView>, ApiError> {
    let transaction = service.get_transaction(&transaction_id).await?;
    Ok(Json(TransactionView::from(&transaction)))
}

#[utoipa::path(
    put,
    path = "/api/transactions/{transaction_id}",
    params(
        ("transaction_id" = String, Path, description = "Transaction id")
    ),
    request_body = EditTransactionRequest,
    responses(
        (status = 200, description = "Transaction overwritten", body = TransactionView),
        (status = 400, description = "Invalid input or id mismatch", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse)
    )
)]
pub(crate) async fn edit_transaction(
    State(service): State<AppState>,
    Path(transaction_id): Path<String>,
    Json(req): Json<EditTransactionRequest>,
) -> Result<Json<TransactionView>, ApiError> {
    let transaction = service
        .edit_transaction(&transaction_id, &req.id, req.fields.into())
        .await?;
    Ok(Json(TransactionView::from(&transaction)))
}

#[utoipa::path(
    delete,
    path = "/api/transactions/{transaction_id}",
    params(
        ("transaction_id" = String, Path, description = "Transaction id")
    ),
    responses(
        (status = 200, description = "Transaction permanently removed", body = DeletedResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse)
    )
)]
pub(crate) async fn delete_transaction(
    State(service): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = service.delete_transaction(&transaction_id).await?;
    Ok(Json(DeletedResponse {
        message: "Transaction deleted successfully".to_string(),
        id,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/transactions/{transaction_id}/soft-delete",
    params(
        ("transaction_id" = String, Path, description = "Transaction id")
    ),
    responses(
        (status = 200, description = "Transaction soft deleted", body = DeletedResponse),
        (status = 404, description = "Transaction not found or already deleted", body = ErrorResponse)
    )
)]
pub(crate) async fn soft_delete_transaction(
    State(service): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let transaction = service.soft_delete_transaction(&transaction_id).await?;
    Ok(Json(DeletedResponse {
        message: "Transaction soft deleted successfully".to_string(),
        id: transaction.id,
    }))
}

#[utoipa::path(
    get,
    path = "/api/summary",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Ledger statistics and balances", body = SummaryResponse),
        (status = 204, description = "No active transactions in the period")
    )
)]
pub(crate) async fn get_summary(
    State(service): State<AppState>,
    Query(period): Query<PeriodQuery>,
) -> Result<Response, ApiError> {
    let summary = service.get_summary(&period.filter()).await?;
    if summary.transaction_count == 0 {
        return Ok(no_content());
    }
    Ok(Json(SummaryResponse::new(summary, &period)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/balances",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Net balance per member", body = BalancesResponse),
        (status = 204, description = "No active transactions in the period")
    )
)]
pub(crate) async fn get_balances(
    State(service): State<AppState>,
    Query(period): Query<PeriodQuery>,
) -> Result<Response, ApiError> {
    let balances = service.get_balances(&period.filter()).await?;
    if balances.user_expenses.is_empty() {
        return Ok(no_content());
    }
    Ok(Json(BalancesResponse::from(balances)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = PaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = PaymentView),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Persistence failure", body = ErrorResponse)
    )
)]
pub(crate) async fn add_payment(
    State(service): State<AppState>,
    Json(req): Json<PaymentRequest>,
) -> Result<(StatusCode, Json<PaymentView>), ApiError> {
    let payment = service.add_payment(req.into()).await?;
    Ok((StatusCode::CREATED, Json(PaymentView::from(&payment))))
}

#[utoipa::path(
    get,
    path = "/api/payments",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of active payments, newest first", body = PaymentListResponse),
        (status = 204, description = "No matching payments")
    )
)]
pub(crate) async fn list_payments(
    State(service): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let page = query.page();
    let payments = service.list_payments(&query.filter()?, page).await?;
    if payments.is_empty() {
        return Ok(no_content());
    }
    Ok(Json(PaymentListResponse {
        payments: payments.iter().map(PaymentView::from).collect(),
        page: page.page,
        limit: page.limit,
    })
    .into_response())
}

#[utoipa::path(
    get,
    path = "/api/payments/{payment_id}",
    params(
        ("payment_id" = String, Path, description = "Payment id")
    ),
    responses(
        (status = 200, description = "Payment, soft-deleted ones included", body = PaymentView),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_payment(
    State(service): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<Json<PaymentView>, ApiError> {
    let payment = service.get_payment(&payment_id).await?;
    Ok(Json(PaymentView::from(&payment)))
}

#[utoipa::path(
    put,
    path = "/api/payments/{payment_id}",
    params(
        ("payment_id" = String, Path, description = "Payment id")
    ),
    request_body = EditPaymentRequest,
    responses(
        (status = 200, description = "Payment overwritten", body = PaymentView),
        (status = 400, description = "Invalid input or id mismatch", body = ErrorResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    )
)]
pub(crate) async fn edit_payment(
    State(service): State<AppState>,
    Path(payment_id): Path<String>,
    Json(req): Json<EditPaymentRequest>,
) -> Result<Json<PaymentView>, ApiError> {
    let payment = service.edit_payment(&payment_id, &req.id, req.fields.into()).await?;
    Ok(Json(PaymentView::from(&payment)))
}

#[utoipa::path(
    delete,
    path = "/api/payments/{payment_id}",
    params(
        ("payment_id" = String, Path, description = "Payment id")
    ),
    responses(
        (status = 200, description = "Payment permanently removed", body = DeletedResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    )
)]
pub(crate) async fn delete_payment(
    State(service): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = service.delete_payment(&payment_id).await?;
    Ok(Json(DeletedResponse {
        message: "Payment deleted successfully".to_string(),
        id,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/payments/{payment_id}/soft-delete",
    params(
        ("payment_id" = String, Path, description = "Payment id")
    ),
    responses(
        (status = 200, description = "Payment soft deleted", body = DeletedResponse),
        (status = 404, description = "Payment not found or already deleted", body = ErrorResponse)
    )
)]
pub(crate) async fn soft_delete_payment(
    State(service): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let payment = service.soft_delete_payment(&payment_id).await?;
    Ok(Json(DeletedResponse {
        message: "Payment soft deleted successfully".to_string(),
        id: payment.id,
    }))
}

#[utoipa::path(
    get,
    path = "/api/payment-summary",
    responses(
        (status = 200, description = "Net effect of active payments", body = BalancesResponse),
        (status = 204, description = "No active payments")
    )
)]
pub(crate) async fn get_payment_summary(State(service): State<AppState>) -> Result<Response, ApiError> {
    let balances = service.get_payment_balances().await?;
    if balances.user_expenses.is_empty() {
        return Ok(no_content());
    }
    Ok(Json(BalancesResponse::from(balances)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Audit trail of ledger changes", body = [AppLog])
    )
)]
pub(crate) async fn get_app_logs(State(service): State<AppState>) -> Result<Json<Vec<AppLog>>, ApiError> {
    Ok(Json(service.get_app_logs().await?))
}
