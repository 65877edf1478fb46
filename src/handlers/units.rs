use super::common::{created_response, map_service_error, message_response, success_response, ValidatedJson};
use crate::{errors::ApiError, handlers::AppState, services::units::UnitInput};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};

/// Creates the router for unit endpoints
pub fn unit_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_units).post(create_unit))
        .route("/:id", get(get_unit).put(update_unit).delete(delete_unit))
}

/// List units of measure
#[utoipa::path(
    get,
    path = "/api/v1/units",
    responses(
        (status = 200, description = "Units returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "units"
)]
pub async fn list_units(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let units = state.services.units.list().await.map_err(map_service_error)?;
    Ok(success_response(units))
}

/// Get a unit by ID
#[utoipa::path(
    get,
    path = "/api/v1/units/{id}",
    params(("id" = i64, Path, description = "Unit ID")),
    responses(
        (status = 200, description = "Unit returned"),
        (status = 404, description = "Unit not found", body = crate::errors::ErrorResponse)
    ),
    tag = "units"
)]
pub async fn get_unit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let unit = state.services.units.get(id).await.map_err(map_service_error)?;
    Ok(success_response(unit))
}

/// Create a unit
#[utoipa::path(
    post,
    path = "/api/v1/units",
    request_body = UnitInput,
    responses(
        (status = 201, description = "Unit created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Symbol already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "units"
)]
pub async fn create_unit(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UnitInput>,
) -> Result<impl IntoResponse, ApiError> {
    let unit = state
        .services
        .units
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(unit, "Unit created successfully"))
}

/// Rename a unit that nothing references yet
#[utoipa::path(
    put,
    path = "/api/v1/units/{id}",
    params(("id" = i64, Path, description = "Unit ID")),
    request_body = UnitInput,
    responses(
        (status = 200, description = "Unit updated"),
        (status = 404, description = "Unit not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Unit in use or symbol taken", body = crate::errors::ErrorResponse)
    ),
    tag = "units"
)]
pub async fn update_unit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UnitInput>,
) -> Result<impl IntoResponse, ApiError> {
    let unit = state
        .services
        .units
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(message_response(unit, "Unit updated successfully"))
}

/// Delete a unit that nothing references
#[utoipa::path(
    delete,
    path = "/api/v1/units/{id}",
    params(("id" = i64, Path, description = "Unit ID")),
    responses(
        (status = 200, description = "Unit deleted"),
        (status = 404, description = "Unit not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Unit in use", body = crate::errors::ErrorResponse)
    ),
    tag = "units"
)]
pub async fn delete_unit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .units
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response(
        serde_json::json!({ "id": id }),
        "Unit deleted successfully",
    ))
}
