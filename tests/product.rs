mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_create_and_get_product() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let id = app.create_product(&admin, "Mug", 9.99, 10).await;

    let (status, body) = app.get(&format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Mug");
    assert_eq!(body["price"], 9.99);
    assert_eq!(body["stock"], 10);
}

#[tokio::test]
async fn test_get_products_in_id_order() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_product(&admin, "Mug", 9.99, 10).await;
    app.create_product(&admin, "Plate", 4.5, 3).await;

    let (status, body) = app.get("/products", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|product| product["name"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, ["Mug", "Plate"]);
}

#[tokio::test]
async fn test_get_missing_product() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/products/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn test_create_product_validation() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (status, _) = app
        .post(
            "/products",
            Some(&admin),
            json!({ "name": "Mug", "price": -1.0, "stock": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/products",
            Some(&admin),
            json!({ "name": "", "price": 1.0, "stock": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_management_is_admin_only() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let user = app.user_token("ann@example.com").await;
    let id = app.create_product(&admin, "Mug", 9.99, 10).await;

    let (status, body) = app
        .post(
            "/products",
            Some(&user),
            json!({ "name": "Bowl", "price": 3.0, "stock": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden: Admins only");

    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/products/{id}"),
            Some(&user),
            Some(json!({ "stock": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(Method::DELETE, &format!("/products/{id}"), Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post("/products", None, json!({ "name": "Bowl", "price": 3.0, "stock": 1 }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.stock_of(id).await, 10);
}

#[tokio::test]
async fn test_update_product_partial() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let id = app.create_product(&admin, "Mug", 9.99, 10).await;

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/products/{id}"),
            Some(&admin),
            Some(json!({ "stock": 4 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock"], 4);
    assert_eq!(body["name"], "Mug");
    assert_eq!(body["price"], 9.99);

    let (status, _) = app
        .request(
            Method::PUT,
            "/products/999",
            Some(&admin),
            Some(json!({ "stock": 4 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_product() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let id = app.create_product(&admin, "Mug", 9.99, 10).await;

    let (status, body) = app
        .request(Method::DELETE, &format!("/products/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");

    let (status, _) = app.get(&format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(Method::DELETE, &format!("/products/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_product_id() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (status, body) = app.get("/products/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid path"));

    let (status, body) = app
        .request(Method::DELETE, "/products/abc", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
