use super::common::{created_response, map_service_error, message_response, success_response, ValidatedJson};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::menus::{MenuInput, MenuView},
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};

/// Creates the router for menu endpoints
pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_menus).post(create_menu))
        .route("/:id", get(get_menu).put(update_menu).delete(delete_menu))
}

/// List menus with their recipes
#[utoipa::path(
    get,
    path = "/api/v1/menus",
    responses(
        (status = 200, description = "Menus returned", body = [MenuView]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "menus"
)]
pub async fn list_menus(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let menus = state.services.menus.list().await.map_err(map_service_error)?;
    Ok(success_response(menus))
}

/// Get a menu by ID
#[utoipa::path(
    get,
    path = "/api/v1/menus/{id}",
    params(("id" = i64, Path, description = "Menu ID")),
    responses(
        (status = 200, description = "Menu returned", body = MenuView),
        (status = 404, description = "Menu not found", body = crate::errors::ErrorResponse)
    ),
    tag = "menus"
)]
pub async fn get_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let menu = state.services.menus.get(id).await.map_err(map_service_error)?;
    Ok(success_response(menu))
}

/// Create a menu with its recipe
#[utoipa::path(
    post,
    path = "/api/v1/menus",
    request_body = MenuInput,
    responses(
        (status = 201, description = "Menu created", body = MenuView),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Ingredient or unit not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Slug already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "menus"
)]
pub async fn create_menu(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<MenuInput>,
) -> Result<impl IntoResponse, ApiError> {
    let menu = state
        .services
        .menus
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(menu, "Menu created successfully"))
}

/// Replace a menu and its recipe
#[utoipa::path(
    put,
    path = "/api/v1/menus/{id}",
    params(("id" = i64, Path, description = "Menu ID")),
    request_body = MenuInput,
    responses(
        (status = 200, description = "Menu updated", body = MenuView),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Menu, ingredient or unit not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Slug already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "menus"
)]
pub async fn update_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<MenuInput>,
) -> Result<impl IntoResponse, ApiError> {
    let menu = state
        .services
        .menus
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(message_response(menu, "Menu updated successfully"))
}

/// Delete a menu that has never been sold
#[utoipa::path(
    delete,
    path = "/api/v1/menus/{id}",
    params(("id" = i64, Path, description = "Menu ID")),
    responses(
        (status = 200, description = "Menu deleted"),
        (status = 404, description = "Menu not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Menu has sales", body = crate::errors::ErrorResponse)
    ),
    tag = "menus"
)]
pub async fn delete_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.services.menus.delete(id).await.map_err(map_service_error)?;
    Ok(message_response(
        serde_json::json!({ "id": id }),
        "Menu deleted successfully",
    ))
}
