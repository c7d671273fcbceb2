mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use rust_storefront::entities::cart;

#[tokio::test]
async fn test_get_cart_before_adding() {
    let app = TestApp::new().await;
    let token = app.user_token("ann@example.com").await;

    let (status, body) = app.get("/cart", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Cart not found");
}

#[tokio::test]
async fn test_add_product_to_cart_accumulates() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let token = app.user_token("ann@example.com").await;
    let mug = app.create_product(&admin, "Mug", 9.99, 10).await;
    let plate = app.create_product(&admin, "Plate", 4.5, 10).await;

    let (status, _) = app.add_to_cart(&token, mug, 1).await;
    assert_eq!(status, StatusCode::OK);
    app.add_to_cart(&token, plate, 3).await;
    let (status, body) = app.add_to_cart(&token, mug, 2).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        body["items"],
        json!([
            { "product_id": mug, "quantity": 3 },
            { "product_id": plate, "quantity": 3 }
        ])
    );

    let (status, fetched) = app.get("/cart", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, body);

    // One cart per user, however many adds.
    assert_eq!(cart::Entity::find().count(&*app.db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_add_to_cart_rejects_bad_input() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let token = app.user_token("ann@example.com").await;
    let mug = app.create_product(&admin, "Mug", 9.99, 10).await;

    let (status, _) = app.add_to_cart(&token, mug, 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.add_to_cart(&token, 999, 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.add_to_cart("", mug, 1).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A rejected add must not leave an empty cart behind.
    assert_eq!(cart::Entity::find().count(&*app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_remove_product_from_cart() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let token = app.user_token("ann@example.com").await;
    let mug = app.create_product(&admin, "Mug", 9.99, 10).await;
    let plate = app.create_product(&admin, "Plate", 4.5, 10).await;
    app.add_to_cart(&token, mug, 1).await;
    app.add_to_cart(&token, plate, 2).await;

    let uri = format!("/cart?product_id={mug}");
    let (status, body) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([{ "product_id": plate, "quantity": 2 }]));

    // Removing again is a no-op.
    let (status, again) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again, body);
}

#[tokio::test]
async fn test_remove_without_cart() {
    let app = TestApp::new().await;
    let token = app.user_token("ann@example.com").await;

    let (status, body) = app
        .request(Method::DELETE, "/cart?product_id=1", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Cart not found");
}

#[tokio::test]
async fn test_carts_are_per_user() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let ann = app.user_token("ann@example.com").await;
    let bob = app.user_token("bob@example.com").await;
    let mug = app.create_product(&admin, "Mug", 9.99, 10).await;

    let (_, ann_cart) = app.add_to_cart(&ann, mug, 1).await;
    let (_, bob_cart) = app.add_to_cart(&bob, mug, 5).await;

    assert_ne!(ann_cart["id"], bob_cart["id"]);
    assert_eq!(ann_cart["items"][0]["quantity"], 1);
    assert_eq!(bob_cart["items"][0]["quantity"], 5);
}

#[tokio::test]
async fn test_add_to_cart_quantity_overflow() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let token = app.user_token("ann@example.com").await;
    let mug = app.create_product(&admin, "Mug", 9.99, 10).await;

    let (status, _) = app.add_to_cart(&token, mug, i32::MAX).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.add_to_cart(&token, mug, 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "quantity is too large");

    let (_, cart) = app.get("/cart", Some(&token)).await;
    assert_eq!(cart["items"], json!([{ "product_id": mug, "quantity": i32::MAX }]));
}

#[tokio::test]
async fn test_remove_requires_product_id() {
    let app = TestApp::new().await;
    let token = app.user_token("ann@example.com").await;

    for uri in ["/cart", "/cart?product_id=abc"] {
        let (status, body) = app.request(Method::DELETE, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid query"));
    }
}
