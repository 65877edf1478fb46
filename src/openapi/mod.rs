use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pantry API",
        version = "0.1.0",
        description = r#"
# Pantry API

Units of measure, ingredients with running stock, menus with recipes, and
sales transactions that consume ingredient stock.

## Sales and stock

Posting a sale (`POST /api/v1/transactions`) deducts the recipe quantities of
every menu sold and writes one stock-reduction row per ingredient consumed.
The whole sale is rejected with `400` when any ingredient would go below zero,
and nothing is written. Deleting a sale restores the stock recorded in its
reduction rows.

## Error Handling

Errors share one body shape:

```json
{
  "error": "Bad Request",
  "message": "Insufficient stock for ingredient: Garam. Available: 4.00, Required: 6.00",
  "details": "insufficient_stock",
  "request_id": "3f0c...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

Decimal quantities and amounts are serialized as strings.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "units", description = "Units of measure"),
        (name = "ingredients", description = "Ingredients and stock"),
        (name = "menus", description = "Menus and recipes"),
        (name = "transactions", description = "Sales and stock deduction"),
        (name = "reports", description = "Sales reports"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::units::list_units,
        crate::handlers::units::get_unit,
        crate::handlers::units::create_unit,
        crate::handlers::units::update_unit,
        crate::handlers::units::delete_unit,

        crate::handlers::ingredients::list_ingredients,
        crate::handlers::ingredients::get_ingredient,
        crate::handlers::ingredients::create_ingredient,
        crate::handlers::ingredients::update_ingredient,
        crate::handlers::ingredients::delete_ingredient,
        crate::handlers::ingredients::adjust_stock,

        crate::handlers::menus::list_menus,
        crate::handlers::menus::get_menu,
        crate::handlers::menus::create_menu,
        crate::handlers::menus::update_menu,
        crate::handlers::menus::delete_menu,

        crate::handlers::transactions::list_transactions,
        crate::handlers::transactions::get_transaction,
        crate::handlers::transactions::create_transaction,
        crate::handlers::transactions::delete_transaction,

        crate::handlers::reports::transactions_report,

        crate::handlers::health::api_status,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::services::units::UnitInput,
            crate::services::ingredients::IngredientInput,
            crate::services::ingredients::StockAdjustmentInput,
            crate::services::ingredients::IngredientView,
            crate::services::ingredients::UnitSummary,
            crate::services::ingredients::StockAdjustmentView,
            crate::services::menus::MenuInput,
            crate::services::menus::RecipeLineInput,
            crate::services::menus::MenuView,
            crate::services::menus::RecipeLineView,
            crate::services::menus::IngredientRef,
            crate::services::menus::UnitRef,
            crate::services::transactions::CreateTransactionInput,
            crate::services::transactions::TransactionItemInput,
            crate::services::transactions::CreatedTransaction,
            crate::services::transactions::TransactionView,
            crate::services::transactions::TransactionItemView,
            crate::services::transactions::StockReductionView,
            crate::services::transactions::MenuSummary,
            crate::services::transactions::ReversalSummary,
            crate::services::reports::TransactionReport,
            crate::services::reports::ReportSummary,
            crate::services::reports::IngredientUsage,
            crate::services::reports::MenuSales,
            crate::common::DateWindow,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::StatusResponse,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
