use axum::{
    body::Body,
    extract::Extension,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
    routing::{get, patch},
    Json, Router,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::warn;
use validator::Validate;

use crate::api::extract::{ApiPath, ValidJson};
use crate::entities::order;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{auth::Claims, logging::with_outcome};
use crate::notify::Mailer;
use crate::orders;

//ROUTERS
pub fn admin_order_router() -> Router {
    Router::new()
        .route("/order/:id", patch(update_payment_status))
        .route("/order/:id/proof", get(print_proof))
}

//ROUTES
async fn update_payment_status(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(mailer): Extension<Mailer>,
    Extension(claims): Extension<Claims>,
    ValidJson(payload): ValidJson<UpdatePaymentStatus>,
) -> ApiResult<Response> {
    let order =
        orders::update_payment_status(&db, &mailer, &claims, id, &payload.payment_status).await?;

    Ok(with_outcome(
        (
            StatusCode::OK,
            Json(json!({
                "message": "Payment status updated successfully",
                "order_id": order.id,
                "payment_status": order.payment_status,
            })),
        ),
        Ok(()),
    ))
}

/// Streams the proof of payment attached to a crypto order.
async fn print_proof(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> ApiResult<Response> {
    let order = order::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".into()))?;

    let path = order
        .crypto_proof_path
        .ok_or_else(|| ApiError::NotFound("Order has no proof of payment".into()))?;

    let file = tokio::fs::File::open(&path).await.map_err(|err| {
        warn!(order_id = id, path = %path, error = %err, "Proof file is missing");
        ApiError::NotFound("Proof of payment file not found".into())
    })?;

    let content_type = mime_guess::from_path(&path)
        .first_raw()
        .unwrap_or("application/octet-stream");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("inline"),
    );

    let body = Body::from_stream(ReaderStream::new(file));

    Ok(with_outcome((StatusCode::OK, headers, body), Ok(())))
}

//Structs
#[derive(Deserialize, Validate, Debug)]
struct UpdatePaymentStatus {
    #[validate(length(min = 1, message = "payment_status is required"))]
    payment_status: String,
}
