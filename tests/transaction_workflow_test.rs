mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{decimal, FixedCodeGenerator, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

/// Kitchen with two ingredients in kilograms and one menu using both.
struct Kitchen {
    app: TestApp,
    kg: i64,
    rice: i64,
    egg: i64,
    fried_rice: i64,
}

async fn kitchen_with(app: TestApp) -> Kitchen {
    let kg = app.create_unit("Kilogram", "kg").await;
    let rice = app.create_ingredient("Beras", "10.00", kg).await;
    let egg = app.create_ingredient("Telur", "2.00", kg).await;
    let fried_rice = app
        .create_menu("Nasi Goreng", "25000.00", &[(rice, "0.25"), (egg, "0.5")], kg)
        .await;
    Kitchen {
        app,
        kg,
        rice,
        egg,
        fried_rice,
    }
}

async fn kitchen() -> Kitchen {
    kitchen_with(TestApp::new().await).await
}

#[tokio::test]
async fn sale_deducts_recipe_and_records_ledger() {
    let k = kitchen().await;

    let (status, body) = k.app.sell(&[(k.fried_rice, 2)]).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Transaction created successfully"));
    assert_eq!(decimal(&body["data"]["total_amount"]), dec!(50000));
    let code = body["data"]["transaction_code"].as_str().unwrap();
    assert!(code.starts_with("TRX-"), "unexpected code {code}");

    assert_eq!(k.app.stock_of(k.rice).await, dec!(9.5));
    assert_eq!(k.app.stock_of(k.egg).await, dec!(1));
    assert_eq!(k.app.ledger_counts().await, (1, 1, 2));
}

#[tokio::test]
async fn transaction_detail_shows_items_and_reductions() {
    let k = kitchen().await;
    let (_, created) = k.app.sell(&[(k.fried_rice, 2)]).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, body) = k
        .app
        .json(Method::GET, &format!("/api/v1/transactions/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item["menu_id"], json!(k.fried_rice));
    assert_eq!(item["quantity"], json!(2));
    assert_eq!(decimal(&item["price"]), dec!(25000));
    assert_eq!(decimal(&item["subtotal"]), dec!(50000));
    assert_eq!(item["menu"]["name"], json!("Nasi Goreng"));

    let reductions = item["stock_reductions"].as_array().unwrap();
    assert_eq!(reductions.len(), 2);
    let rice = reductions
        .iter()
        .find(|r| r["ingredient_id"] == json!(k.rice))
        .expect("rice reduction");
    assert_eq!(decimal(&rice["quantity_reduced"]), dec!(0.5));
    assert_eq!(decimal(&rice["stock_before"]), dec!(10));
    assert_eq!(decimal(&rice["stock_after"]), dec!(9.5));
    assert_eq!(rice["unit_id"], json!(k.kg));
    assert_eq!(rice["ingredient"]["slug"], json!("beras"));
}

#[tokio::test]
async fn later_items_see_stock_taken_by_earlier_items() {
    let k = kitchen().await;

    let (status, _) = k.app.sell(&[(k.fried_rice, 1), (k.fried_rice, 1)]).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = k.app.json(Method::GET, "/api/v1/transactions", None).await;
    let items = list["data"][0]["items"].as_array().unwrap();
    let egg_after: Vec<_> = items
        .iter()
        .flat_map(|item| item["stock_reductions"].as_array().unwrap().iter())
        .filter(|r| r["ingredient_id"] == json!(k.egg))
        .map(|r| (decimal(&r["stock_before"]), decimal(&r["stock_after"])))
        .collect();
    assert_eq!(egg_after, vec![(dec!(2), dec!(1.5)), (dec!(1.5), dec!(1))]);
}

#[tokio::test]
async fn insufficient_stock_rejects_whole_sale() {
    let k = kitchen().await;

    // First item fits, second one runs the eggs dry.
    let (status, body) = k.app.sell(&[(k.fried_rice, 2), (k.fried_rice, 3)]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["details"], json!("insufficient_stock"));
    assert!(body["message"].as_str().unwrap().contains("Telur"));

    assert_eq!(k.app.stock_of(k.rice).await, dec!(10));
    assert_eq!(k.app.stock_of(k.egg).await, dec!(2));
    assert_eq!(k.app.ledger_counts().await, (0, 0, 0));
}

#[tokio::test]
async fn selling_exactly_remaining_stock_reaches_zero() {
    let k = kitchen().await;

    let (status, _) = k.app.sell(&[(k.fried_rice, 4)]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(k.app.stock_of(k.egg).await, dec!(0));

    let (status, _) = k.app.sell(&[(k.fried_rice, 1)]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(k.app.stock_of(k.egg).await, dec!(0));
}

#[tokio::test]
async fn unknown_menu_rejects_whole_sale() {
    let k = kitchen().await;

    let (status, body) = k.app.sell(&[(k.fried_rice, 1), (9_999, 1)]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Menu with ID 9999 not found"));

    assert_eq!(k.app.stock_of(k.rice).await, dec!(10));
    assert_eq!(k.app.ledger_counts().await, (0, 0, 0));
}

#[tokio::test]
async fn deleting_sale_restores_stock_exactly() {
    let k = kitchen().await;
    let (_, first) = k.app.sell(&[(k.fried_rice, 1)]).await;
    let (_, second) = k.app.sell(&[(k.fried_rice, 2)]).await;
    assert_eq!(k.app.stock_of(k.egg).await, dec!(0.5));

    let id = second["data"]["id"].as_i64().unwrap();
    let (status, body) = k
        .app
        .json(Method::DELETE, &format!("/api/v1/transactions/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(
        body["message"],
        json!("Transaction deleted successfully and stock restored")
    );
    assert_eq!(body["data"]["items_removed"], json!(1));
    assert_eq!(body["data"]["reductions_reversed"], json!(2));

    assert_eq!(k.app.stock_of(k.rice).await, dec!(9.75));
    assert_eq!(k.app.stock_of(k.egg).await, dec!(1.5));
    assert_eq!(k.app.ledger_counts().await, (1, 1, 2));

    // The earlier sale is untouched.
    let first_id = first["data"]["id"].as_i64().unwrap();
    let (status, _) = k
        .app
        .json(Method::GET, &format!("/api/v1/transactions/{first_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn deleting_sale_twice_is_not_found() {
    let k = kitchen().await;
    let (_, created) = k.app.sell(&[(k.fried_rice, 1)]).await;
    let uri = format!("/api/v1/transactions/{}", created["data"]["id"]);

    let (status, _) = k.app.json(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = k.app.json(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["details"], json!("not_found"));
    assert_eq!(k.app.stock_of(k.egg).await, dec!(2));
}

#[tokio::test]
async fn restore_uses_ledger_not_current_recipe() {
    let k = kitchen().await;
    let (_, created) = k.app.sell(&[(k.fried_rice, 2)]).await;

    // Recipe changes after the sale; reversal must give back what was taken.
    let (status, _) = k
        .app
        .json(
            Method::PUT,
            &format!("/api/v1/menus/{}", k.fried_rice),
            Some(json!({
                "name": "Nasi Goreng",
                "image": "menus/nasi-goreng.jpg",
                "price": "27000.00",
                "ingredients": [{ "ingredient_id": k.rice, "quantity": "1.5", "unit_id": k.kg }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let id = created["data"]["id"].as_i64().unwrap();
    let (status, _) = k
        .app
        .json(Method::DELETE, &format!("/api/v1/transactions/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(k.app.stock_of(k.rice).await, dec!(10));
    assert_eq!(k.app.stock_of(k.egg).await, dec!(2));
}

#[tokio::test]
async fn price_is_snapshotted_at_sale_time() {
    let k = kitchen().await;
    let (_, created) = k.app.sell(&[(k.fried_rice, 1)]).await;

    let (status, _) = k
        .app
        .json(
            Method::PUT,
            &format!("/api/v1/menus/{}", k.fried_rice),
            Some(json!({
                "name": "Nasi Goreng",
                "image": "menus/nasi-goreng.jpg",
                "price": "30000.00",
                "ingredients": [{ "ingredient_id": k.rice, "quantity": "0.25", "unit_id": k.kg }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let id = created["data"]["id"].as_i64().unwrap();
    let (_, body) = k
        .app
        .json(Method::GET, &format!("/api/v1/transactions/{id}"), None)
        .await;
    assert_eq!(decimal(&body["data"]["total_amount"]), dec!(25000));
    assert_eq!(decimal(&body["data"]["items"][0]["price"]), dec!(25000));
}

#[tokio::test]
async fn code_collision_is_conflict_and_rolls_back() {
    let app = TestApp::with_code_generator(Arc::new(FixedCodeGenerator(
        "TRX-20240601-DEADBEEF".to_string(),
    )))
    .await;
    let k = kitchen_with(app).await;

    let (status, _) = k.app.sell(&[(k.fried_rice, 1)]).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = k.app.sell(&[(k.fried_rice, 1)]).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(
        body["message"],
        json!("Conflict: Transaction code TRX-20240601-DEADBEEF already exists")
    );
    assert_eq!(k.app.stock_of(k.egg).await, dec!(1.5));
    assert_eq!(k.app.ledger_counts().await, (1, 1, 2));
}

#[tokio::test]
async fn total_beyond_column_range_rejects_whole_sale() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;
    let salt = app.create_ingredient("Garam", "100.00", kg).await;
    let banquet = app
        .create_menu("Jamuan", "9999999999.99", &[(salt, "0.01")], kg)
        .await;

    let (status, body) = app.sell(&[(banquet, 1000)]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(app.stock_of(salt).await, dec!(100));
    assert_eq!(app.ledger_counts().await, (0, 0, 0));
}

#[tokio::test]
async fn rejects_malformed_sale_bodies() {
    let k = kitchen().await;

    let (status, _) = k
        .app
        .json(Method::POST, "/api/v1/transactions", Some(json!({ "items": [] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = k.app.sell(&[(k.fried_rice, 0)]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = k
        .app
        .json(
            Method::POST,
            "/api/v1/transactions",
            Some(json!({ "items": [{ "menu_id": "one", "quantity": 1 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], json!("invalid_body"));

    assert_eq!(k.app.ledger_counts().await, (0, 0, 0));
}

#[tokio::test]
async fn list_defaults_to_current_week_and_honours_ranges() {
    let k = kitchen().await;
    let (_, created) = k.app.sell(&[(k.fried_rice, 1)]).await;

    let (status, body) = k.app.json(Method::GET, "/api/v1/transactions", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body["data"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], created["data"]["id"]);

    let (status, body) = k
        .app
        .json(
            Method::GET,
            "/api/v1/transactions?start_date=2000-01-01&end_date=2000-01-31",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = k
        .app
        .json(Method::GET, "/api/v1/transactions?start_date=2000-01-01", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = k
        .app
        .json(
            Method::GET,
            "/api/v1/transactions?start_date=2000-02-01&end_date=2000-01-01",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn round_trip_restores_original_level() {
    let app = TestApp::new().await;
    let pcs = app.create_unit("Packages", "pcs").await;
    let a = app.create_ingredient("Roti", "100", pcs).await;
    let menu = app.create_menu("Sandwich", "15000", &[(a, "2")], pcs).await;

    let (status, created) = app.sell(&[(menu, 3)]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.stock_of(a).await, dec!(94));

    let id = created["data"]["id"].as_i64().unwrap();
    let (_, detail) = app
        .json(Method::GET, &format!("/api/v1/transactions/{id}"), None)
        .await;
    let reduction = &detail["data"]["items"][0]["stock_reductions"][0];
    assert_eq!(decimal(&reduction["stock_before"]), dec!(100));
    assert_eq!(decimal(&reduction["stock_after"]), dec!(94));
    assert_eq!(decimal(&reduction["quantity_reduced"]), dec!(6));

    let (status, _) = app
        .json(Method::DELETE, &format!("/api/v1/transactions/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.stock_of(a).await, dec!(100));
    assert_eq!(app.ledger_counts().await, (0, 0, 0));
}
