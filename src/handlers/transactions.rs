use super::common::{created_response, map_service_error, message_response, success_response, ValidatedJson};
use crate::{
    common::DateRangeParams,
    errors::ApiError,
    handlers::AppState,
    services::transactions::{
        CreateTransactionInput, CreatedTransaction, ReversalSummary, TransactionView,
    },
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};

/// Creates the router for sales transaction endpoints
pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route("/:id", get(get_transaction).delete(delete_transaction))
}

/// List sales, newest first. Defaults to the current week.
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    params(DateRangeParams),
    responses(
        (status = 200, description = "Transactions returned", body = [TransactionView]),
        (status = 400, description = "Malformed date range", body = crate::errors::ErrorResponse)
    ),
    tag = "transactions"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(range): Query<DateRangeParams>,
) -> Result<impl IntoResponse, ApiError> {
    let window = range.to_window().map_err(map_service_error)?;
    let transactions = state
        .services
        .transactions
        .list(window)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(transactions))
}

/// Get one sale with its items and stock reductions
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{id}",
    params(("id" = i64, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction returned", body = TransactionView),
        (status = 404, description = "Transaction not found", body = crate::errors::ErrorResponse)
    ),
    tag = "transactions"
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction = state
        .services
        .transactions
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(transaction))
}

/// Post a sale and deduct ingredient stock
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = CreateTransactionInput,
    responses(
        (status = 201, description = "Transaction created", body = CreatedTransaction),
        (status = 400, description = "Invalid request or insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Menu or ingredient not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transaction code collision", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "transactions"
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateTransactionInput>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .services
        .transactions
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(created, "Transaction created successfully"))
}

/// Delete a sale and restore the stock it consumed
#[utoipa::path(
    delete,
    path = "/api/v1/transactions/{id}",
    params(("id" = i64, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction deleted and stock restored", body = ReversalSummary),
        (status = 404, description = "Transaction not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "transactions"
)]
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .services
        .transactions
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response(
        summary,
        "Transaction deleted successfully and stock restored",
    ))
}
