use super::common::{map_service_error, success_response};
use crate::{
    common::DateRangeParams, errors::ApiError, handlers::AppState,
    services::reports::TransactionReport,
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};

pub fn report_routes() -> Router<AppState> {
    Router::new().route("/transactions", get(transactions_report))
}

/// Sales, ingredient usage and menu totals over a date range
#[utoipa::path(
    get,
    path = "/api/v1/reports/transactions",
    params(DateRangeParams),
    responses(
        (status = 200, description = "Report generated", body = TransactionReport),
        (status = 400, description = "Malformed date range", body = crate::errors::ErrorResponse),
        (status = 404, description = "No transactions in the period", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn transactions_report(
    State(state): State<AppState>,
    Query(range): Query<DateRangeParams>,
) -> Result<impl IntoResponse, ApiError> {
    let window = range.to_window().map_err(map_service_error)?;
    let report = state
        .services
        .reports
        .transactions_report(window)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(report))
}
