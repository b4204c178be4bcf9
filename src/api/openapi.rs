use utoipa::OpenApi;

use crate::{
    api::models::{
        BalancesResponse, CreateUserRequest, DailyTrendView, DeletedResponse, EditPaymentRequest,
        EditTransactionRequest, ErrorResponse, PaymentListResponse, PaymentRequest, PaymentView, PeriodView,
        SummaryResponse, TransactionListResponse, TransactionRequest, TransactionView,
    },
    core::models::{audit::AppLog, user::User},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::create_user,
        super::handlers::list_users,
        super::handlers::get_user,
        super::handlers::delete_user,
        super::handlers::add_transaction,
        super::handlers::list_transactions,
        super::handlers::get_transaction,
        super::handlers::edit_transaction,
        super::handlers::delete_transaction,
        super::handlers::soft_delete_transaction,
        super::handlers::get_summary,
        super::handlers::get_balances,
        super::handlers::add_payment,
        super::handlers::list_payments,
        super::handlers::get_payment,
        super::handlers::edit_payment,
        super::handlers::delete_payment,
        super::handlers::soft_delete_payment,
        super::handlers::get_payment_summary,
        super::handlers::get_app_logs
    ),
    components(schemas(
        CreateUserRequest,
        TransactionRequest,
        EditTransactionRequest,
        PaymentRequest,
        EditPaymentRequest,
        TransactionView,
        PaymentView,
        TransactionListResponse,
        PaymentListResponse,
        DeletedResponse,
        BalancesResponse,
        DailyTrendView,
        PeriodView,
        SummaryResponse,
        ErrorResponse,
        User,
        AppLog
    )),
    info(
        title = "Splitledger API",
        description = "Shared expense ledger with live transaction broadcast",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
