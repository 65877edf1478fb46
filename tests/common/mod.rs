#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use pantry_api::{
    config::AppConfig,
    db,
    entities::{ingredient, stock_reduction, transaction, transaction_item},
    handlers::AppServices,
    services::transactions::{DatedCodeGenerator, TransactionCodeGenerator},
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

/// Always hands out the same code, to force collisions.
pub struct FixedCodeGenerator(pub String);

impl TransactionCodeGenerator for FixedCodeGenerator {
    fn generate(&self, _now: DateTime<Utc>) -> String {
        self.0.clone()
    }
}

/// Helper harness for spinning up the full router over a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_code_generator(Arc::new(DatedCodeGenerator)).await
    }

    pub async fn with_code_generator(codes: Arc<dyn TransactionCodeGenerator>) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = dir.path().join("pantry_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.cors_allow_any_origin = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.db_connect_max_attempts = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let services = AppServices::with_code_generator(db_arc.clone(), &cfg, codes);
        let state = AppState {
            db: db_arc,
            config: cfg,
            services,
        };
        let router = pantry_api::build_router(state.clone()).expect("router should build");

        Self {
            router,
            state,
            _dir: dir,
        }
    }

    /// Send a request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and decodes the JSON body.
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body should be JSON")
        };
        (status, value)
    }

    pub async fn create_unit(&self, name: &str, symbol: &str) -> i64 {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/v1/units",
                Some(json!({ "name": name, "symbol": symbol })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "unit create failed: {body}");
        body["data"]["id"].as_i64().expect("unit id")
    }

    pub async fn create_ingredient(&self, name: &str, stock: &str, unit_id: i64) -> i64 {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/v1/ingredients",
                Some(json!({ "name": name, "stock": stock, "unit_id": unit_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "ingredient create failed: {body}");
        body["data"]["id"].as_i64().expect("ingredient id")
    }

    /// Creates a menu whose recipe is `(ingredient_id, quantity)` pairs, all in `unit_id`.
    pub async fn create_menu(
        &self,
        name: &str,
        price: &str,
        recipe: &[(i64, &str)],
        unit_id: i64,
    ) -> i64 {
        let lines: Vec<Value> = recipe
            .iter()
            .map(|(ingredient_id, quantity)| {
                json!({ "ingredient_id": ingredient_id, "quantity": quantity, "unit_id": unit_id })
            })
            .collect();
        let (status, body) = self
            .json(
                Method::POST,
                "/api/v1/menus",
                Some(json!({
                    "name": name,
                    "image": format!("menus/{}.jpg", name.to_lowercase().replace(' ', "-")),
                    "price": price,
                    "ingredients": lines,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "menu create failed: {body}");
        body["data"]["id"].as_i64().expect("menu id")
    }

    /// Posts a sale of `(menu_id, quantity)` pairs.
    pub async fn sell(&self, items: &[(i64, i32)]) -> (StatusCode, Value) {
        let items: Vec<Value> = items
            .iter()
            .map(|(menu_id, quantity)| json!({ "menu_id": menu_id, "quantity": quantity }))
            .collect();
        self.json(
            Method::POST,
            "/api/v1/transactions",
            Some(json!({ "items": items })),
        )
        .await
    }

    pub async fn stock_of(&self, ingredient_id: i64) -> Decimal {
        ingredient::Entity::find_by_id(ingredient_id)
            .one(self.state.db.as_ref())
            .await
            .expect("ingredient lookup")
            .expect("ingredient exists")
            .stock
    }

    pub async fn ledger_counts(&self) -> (u64, u64, u64) {
        let db = self.state.db.as_ref();
        (
            transaction::Entity::find().count(db).await.expect("count transactions"),
            transaction_item::Entity::find().count(db).await.expect("count items"),
            stock_reduction::Entity::find().count(db).await.expect("count reductions"),
        )
    }
}

/// Reads a decimal the API serialized as a JSON string.
pub fn decimal(value: &Value) -> Decimal {
    let raw = value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"));
    Decimal::from_str(raw).expect("valid decimal")
}
