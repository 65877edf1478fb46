use super::common::{created_response, map_service_error, message_response, success_response, ValidatedJson};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::ingredients::{IngredientInput, IngredientView, StockAdjustmentInput, StockAdjustmentView},
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};

/// Creates the router for ingredient endpoints
pub fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ingredients).post(create_ingredient))
        .route(
            "/:id",
            get(get_ingredient)
                .put(update_ingredient)
                .delete(delete_ingredient),
        )
        .route("/:id/stock-adjustments", post(adjust_stock))
}

/// List ingredients with their units
#[utoipa::path(
    get,
    path = "/api/v1/ingredients",
    responses(
        (status = 200, description = "Ingredients returned", body = [IngredientView]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "ingredients"
)]
pub async fn list_ingredients(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let ingredients = state
        .services
        .ingredients
        .list()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(ingredients))
}

/// Get an ingredient by ID
#[utoipa::path(
    get,
    path = "/api/v1/ingredients/{id}",
    params(("id" = i64, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Ingredient returned", body = IngredientView),
        (status = 404, description = "Ingredient not found", body = crate::errors::ErrorResponse)
    ),
    tag = "ingredients"
)]
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let ingredient = state
        .services
        .ingredients
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(ingredient))
}

/// Create an ingredient
#[utoipa::path(
    post,
    path = "/api/v1/ingredients",
    request_body = IngredientInput,
    responses(
        (status = 201, description = "Ingredient created", body = IngredientView),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unit not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Slug already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "ingredients"
)]
pub async fn create_ingredient(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<IngredientInput>,
) -> Result<impl IntoResponse, ApiError> {
    let ingredient = state
        .services
        .ingredients
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(ingredient, "Ingredient created successfully"))
}

/// Update an ingredient, including its stock level
#[utoipa::path(
    put,
    path = "/api/v1/ingredients/{id}",
    params(("id" = i64, Path, description = "Ingredient ID")),
    request_body = IngredientInput,
    responses(
        (status = 200, description = "Ingredient updated", body = IngredientView),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Ingredient or unit not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Slug already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "ingredients"
)]
pub async fn update_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<IngredientInput>,
) -> Result<impl IntoResponse, ApiError> {
    let ingredient = state
        .services
        .ingredients
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(message_response(ingredient, "Ingredient updated successfully"))
}

/// Delete an ingredient that no menu or sale references
#[utoipa::path(
    delete,
    path = "/api/v1/ingredients/{id}",
    params(("id" = i64, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Ingredient deleted"),
        (status = 404, description = "Ingredient not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Ingredient in use", body = crate::errors::ErrorResponse)
    ),
    tag = "ingredients"
)]
pub async fn delete_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .ingredients
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response(
        serde_json::json!({ "id": id }),
        "Ingredient deleted successfully",
    ))
}

/// Apply a signed stock correction
#[utoipa::path(
    post,
    path = "/api/v1/ingredients/{id}/stock-adjustments",
    params(("id" = i64, Path, description = "Ingredient ID")),
    request_body = StockAdjustmentInput,
    responses(
        (status = 200, description = "Stock adjusted", body = StockAdjustmentView),
        (status = 400, description = "Invalid request or stock would go negative", body = crate::errors::ErrorResponse),
        (status = 404, description = "Ingredient not found", body = crate::errors::ErrorResponse)
    ),
    tag = "ingredients"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<StockAdjustmentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let adjustment = state
        .services
        .ingredients
        .adjust_stock(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(message_response(adjustment, "Stock adjusted successfully"))
}
