mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn unit_crud_round() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/api/v1/units/{kg}"),
            Some(json!({ "name": "Kilo", "symbol": "kg" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Kilo"));

    let (status, body) = app.json(Method::GET, "/api/v1/units", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .json(Method::DELETE, &format!("/api/v1/units/{kg}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .json(Method::GET, &format!("/api/v1/units/{kg}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!(format!("Unit with ID {kg} not found")));
}

#[tokio::test]
async fn duplicate_unit_symbol_is_conflict() {
    let app = TestApp::new().await;
    app.create_unit("Gram", "g").await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/units",
            Some(json!({ "name": "Gramme", "symbol": "g" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["details"], json!("conflict"));
}

#[tokio::test]
async fn unit_in_use_cannot_change() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;
    app.create_ingredient("Gula", "3.00", kg).await;

    let (status, _) = app
        .json(Method::DELETE, &format!("/api/v1/units/{kg}"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/api/v1/units/{kg}"),
            Some(json!({ "name": "Kilogram", "symbol": "kilo" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn ingredient_slug_and_unit_are_returned() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;
    let id = app.create_ingredient("Tepung Terigu", "25.00", kg).await;

    let (status, body) = app
        .json(Method::GET, &format!("/api/v1/ingredients/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], json!("tepung-terigu"));
    assert_eq!(body["data"]["unit"]["symbol"], json!("kg"));
    assert_eq!(decimal(&body["data"]["stock"]), dec!(25));
}

#[tokio::test]
async fn duplicate_ingredient_slug_is_conflict() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;
    app.create_ingredient("Tepung Terigu", "25.00", kg).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/ingredients",
            Some(json!({ "name": "tepung  terigu", "stock": "1", "unit_id": kg })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

#[tokio::test]
async fn ingredient_rejects_bad_input() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/ingredients",
            Some(json!({ "name": "Garam", "stock": "-1", "unit_id": kg })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/ingredients",
            Some(json!({ "name": "   ", "stock": "1", "unit_id": kg })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/ingredients",
            Some(json!({ "name": "Garam", "stock": "1", "unit_id": 404 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Unit with ID 404 not found"));
}

#[tokio::test]
async fn ingredient_update_sets_stock_level() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;
    let id = app.create_ingredient("Garam", "5.00", kg).await;

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/api/v1/ingredients/{id}"),
            Some(json!({ "name": "Garam Laut", "stock": "7.5", "unit_id": kg })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["slug"], json!("garam-laut"));
    assert_eq!(app.stock_of(id).await, dec!(7.5));
}

#[tokio::test]
async fn stock_adjustment_never_goes_negative() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;
    let id = app.create_ingredient("Gula", "2.00", kg).await;
    let uri = format!("/api/v1/ingredients/{id}/stock-adjustments");

    let (status, body) = app
        .json(
            Method::POST,
            &uri,
            Some(json!({ "delta": "1.5", "reason": "delivery" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(decimal(&body["data"]["stock_before"]), dec!(2));
    assert_eq!(decimal(&body["data"]["stock_after"]), dec!(3.5));

    let (status, body) = app
        .json(Method::POST, &uri, Some(json!({ "delta": "-4" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], json!("insufficient_stock"));
    assert_eq!(app.stock_of(id).await, dec!(3.5));

    let (status, _) = app
        .json(Method::POST, &uri, Some(json!({ "delta": "0" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stock_adjustment_outside_column_range_is_rejected() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;
    let id = app.create_ingredient("Gula", "2.00", kg).await;
    let uri = format!("/api/v1/ingredients/{id}/stock-adjustments");

    for delta in ["79228162514264337593543950335", "-79228162514264337593543950335", "10000000000"] {
        let (status, body) = app
            .json(Method::POST, &uri, Some(json!({ "delta": delta })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{delta}: {body}");
    }

    let (status, _) = app
        .json(Method::POST, &uri, Some(json!({ "delta": "9999999997.99" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app
        .json(Method::POST, &uri, Some(json!({ "delta": "0.01" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(app.stock_of(id).await, dec!(9999999999.99));
}

#[tokio::test]
async fn amounts_with_more_than_two_places_are_rejected() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;
    let salt = app.create_ingredient("Garam", "5.00", kg).await;

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/ingredients",
            Some(json!({ "name": "Gula", "stock": "1.005", "unit_id": kg })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            &format!("/api/v1/ingredients/{salt}/stock-adjustments"),
            Some(json!({ "delta": "0.125" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stock_of(salt).await, dec!(5));

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/menus",
            Some(json!({
                "name": "Sup",
                "image": "sup.jpg",
                "price": "1000.999",
                "ingredients": [{ "ingredient_id": salt, "quantity": "1", "unit_id": kg }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/menus",
            Some(json!({
                "name": "Sup",
                "image": "sup.jpg",
                "price": "1000",
                "ingredients": [{ "ingredient_id": salt, "quantity": "0.3333", "unit_id": kg }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = app.json(Method::GET, "/api/v1/menus", None).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn ingredient_used_by_menu_cannot_be_deleted() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;
    let salt = app.create_ingredient("Garam", "5.00", kg).await;
    let spare = app.create_ingredient("Merica", "1.00", kg).await;
    app.create_menu("Sup", "12000", &[(salt, "0.01")], kg).await;

    let (status, _) = app
        .json(Method::DELETE, &format!("/api/v1/ingredients/{salt}"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .json(Method::DELETE, &format!("/api/v1/ingredients/{spare}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn menu_carries_recipe_with_references() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;
    let salt = app.create_ingredient("Garam", "5.00", kg).await;
    let sugar = app.create_ingredient("Gula", "5.00", kg).await;
    let id = app
        .create_menu("Nasi Goreng Spesial", "25000.00", &[(salt, "0.25"), (sugar, "0.5")], kg)
        .await;

    let (status, body) = app
        .json(Method::GET, &format!("/api/v1/menus/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let menu = &body["data"];
    assert_eq!(menu["slug"], json!("nasi-goreng-spesial"));
    assert_eq!(decimal(&menu["price"]), dec!(25000));
    let lines = menu["ingredients"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["ingredient"]["name"], json!("Garam"));
    assert_eq!(lines[1]["unit"]["name"], json!("Kilogram"));
}

#[tokio::test]
async fn menu_rejects_bad_recipe() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;
    let salt = app.create_ingredient("Garam", "5.00", kg).await;

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/menus",
            Some(json!({ "name": "Sup", "image": "sup.jpg", "price": "1000", "ingredients": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/menus",
            Some(json!({
                "name": "Sup",
                "image": "sup.jpg",
                "price": "1000",
                "ingredients": [{ "ingredient_id": salt, "quantity": "0", "unit_id": kg }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/menus",
            Some(json!({
                "name": "Sup",
                "image": "sup.jpg",
                "price": "1000",
                "ingredients": [{ "ingredient_id": 777, "quantity": "1", "unit_id": kg }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Ingredient with ID 777 not found"));

    let (_, list) = app.json(Method::GET, "/api/v1/menus", None).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn menu_update_replaces_recipe() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;
    let salt = app.create_ingredient("Garam", "5.00", kg).await;
    let sugar = app.create_ingredient("Gula", "5.00", kg).await;
    let id = app
        .create_menu("Teh Manis", "5000", &[(salt, "0.01"), (sugar, "0.05")], kg)
        .await;

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/api/v1/menus/{id}"),
            Some(json!({
                "name": "Teh Manis Jumbo",
                "image": "teh.jpg",
                "price": "7000",
                "ingredients": [{ "ingredient_id": sugar, "quantity": "0.1", "unit_id": kg }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["slug"], json!("teh-manis-jumbo"));
    let lines = body["data"]["ingredients"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["ingredient_id"], json!(sugar));
}

#[tokio::test]
async fn sold_menu_cannot_be_deleted() {
    let app = TestApp::new().await;
    let kg = app.create_unit("Kilogram", "kg").await;
    let salt = app.create_ingredient("Garam", "5.00", kg).await;
    let sold = app.create_menu("Sup", "12000", &[(salt, "0.25")], kg).await;
    let unsold = app.create_menu("Bakso", "15000", &[(salt, "0.25")], kg).await;
    let (status, _) = app.sell(&[(sold, 1)]).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .json(Method::DELETE, &format!("/api/v1/menus/{sold}"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        json!("Conflict: Menu 'Sup' has been sold and cannot be deleted")
    );

    let (status, _) = app
        .json(Method::DELETE, &format!("/api/v1/menus/{unsold}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .json(Method::GET, &format!("/api/v1/menus/{unsold}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_and_status_report_up() {
    let app = TestApp::new().await;

    let (status, body) = app.json(Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("up"));
    assert_eq!(body["data"]["database"]["status"], json!("up"));

    let (status, body) = app.json(Method::GET, "/api/v1/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["service"], json!("pantry-api"));
    assert_eq!(body["data"]["environment"], json!("test"));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/units/42", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;

    let (status, body) = app.json(Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/transactions"].is_object());
    assert!(body["paths"]["/api/v1/reports/transactions"].is_object());
}
