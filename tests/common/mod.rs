#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use rust_storefront::api::{create_api_router, AppState};
use rust_storefront::entities::{seed_admin, setup_schema};
use rust_storefront::middleware::auth::JwtKeys;
use rust_storefront::notify::{self, Mailer, NotificationQueue, Outbox};
use rust_storefront::storage::ProofStore;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const PASSWORD: &str = "correct-horse";
pub const BOUNDARY: &str = "storefront-test-boundary";

/// One in-process app over a private in-memory database.
pub struct TestApp {
    pub router: Router,
    pub db: Arc<DatabaseConnection>,
    pub keys: Arc<JwtKeys>,
    pub outbox: Outbox,
    pub queue: NotificationQueue,
    pub upload_dir: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        setup_schema(&db).await.unwrap();
        seed_admin(&db, ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

        let db = Arc::new(db);
        let keys = Arc::new(JwtKeys::new("integration-test-secret"));
        let (mailer, outbox) = Mailer::recording();
        let (notifier, queue) = notify::channel();
        let upload_dir = std::env::temp_dir().join(format!("storefront-{}", Uuid::new_v4()));

        let router = create_api_router(AppState {
            db: db.clone(),
            keys: keys.clone(),
            mailer,
            notifier,
            proofs: ProofStore::new(upload_dir.clone()),
            public_url: "http://shop.test".to_owned(),
            max_proof_bytes: 1024 * 1024,
            request_timeout: Duration::from_secs(30),
        });

        Self {
            router,
            db,
            keys,
            outbox,
            queue,
            upload_dir,
        }
    }

    /// Sends the request and returns (status, JSON body). An empty body reads as `Value::Null`.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&body).into_owned())
            })
        };
        (status, value)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn register(&self, name: &str, email: &str) -> (StatusCode, Value) {
        self.post(
            "/register",
            None,
            json!({
                "name": name,
                "email": email,
                "password": PASSWORD,
                "address": {
                    "street": "1 Main St",
                    "city": "Springfield",
                    "state": "IL",
                    "zipcode": "62701"
                }
            }),
        )
        .await
    }

    /// Pulls the token out of the last verification link mailed to `email`.
    pub fn verification_token(&self, email: &str) -> String {
        let message = self
            .outbox
            .messages()
            .into_iter()
            .rev()
            .find(|message| message.to == email && message.subject == "Verify Your Email")
            .expect("no verification email sent");
        let (_, rest) = message
            .text_body
            .split_once("token=")
            .expect("verification link has no token");
        rest.split_whitespace().next().unwrap_or_default().to_owned()
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.post("/login", None, json!({ "email": email, "password": password }))
            .await
    }

    /// Registers, verifies and logs in a fresh user, returning the bearer token.
    pub async fn user_token(&self, email: &str) -> String {
        let (status, _) = self.register("Ann", email).await;
        assert_eq!(status, StatusCode::CREATED);

        let token = self.verification_token(email);
        let (status, _) = self.get(&format!("/verify?token={token}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = self.login(email, PASSWORD).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_owned()
    }

    pub async fn admin_token(&self) -> String {
        let (status, body) = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_owned()
    }

    pub async fn create_product(&self, admin: &str, name: &str, price: f64, stock: i32) -> i64 {
        let (status, body) = self
            .post(
                "/products",
                Some(admin),
                json!({ "name": name, "description": "", "price": price, "stock": stock }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    pub async fn add_to_cart(&self, token: &str, product_id: i64, quantity: i32) -> (StatusCode, Value) {
        self.post(
            "/cart",
            Some(token),
            json!({ "product_id": product_id, "quantity": quantity }),
        )
        .await
    }

    pub async fn stock_of(&self, product_id: i64) -> i64 {
        let (status, body) = self.get(&format!("/products/{product_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        body["stock"].as_i64().unwrap()
    }

    /// `POST /order` as `multipart/form-data`, optionally carrying a proof file.
    pub async fn post_order_multipart(
        &self,
        token: &str,
        payment_method: &str,
        proof: Option<(&str, &[u8])>,
    ) -> (StatusCode, Value) {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"payment_method\"\r\n\r\n{payment_method}\r\n"
            )
            .as_bytes(),
        );
        if let Some((file_name, data)) = proof {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"crypto_proof\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/order")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}
