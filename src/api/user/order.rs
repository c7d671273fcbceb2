use axum::{
    extract::{multipart::MultipartError, Extension, FromRequest, Multipart, Request},
    http::{header, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{auth::Claims, logging::with_outcome};
use crate::notify::Notifier;
use crate::orders::{self, OrderRequest, ProofUpload};
use crate::storage::ProofStore;

const PAYMENT_METHOD_FIELD: &str = "payment_method";
const PROOF_FIELD: &str = "crypto_proof";

//ROUTERS
pub fn order_router() -> Router {
    Router::new()
        .route("/order", post(create_order))
        .route("/orders", get(get_orders))
}

//ROUTES
async fn create_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(proofs): Extension<ProofStore>,
    Extension(notifier): Extension<Notifier>,
    Extension(claims): Extension<Claims>,
    req: Request,
) -> ApiResult<Response> {
    let request = read_order_request(req).await?;
    let summary = orders::place_order(&db, &proofs, &notifier, &claims, request).await?;

    Ok(with_outcome((StatusCode::CREATED, Json(summary)), Ok(())))
}

async fn get_orders(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let orders = orders::list_orders(&db, &claims).await?;

    Ok(with_outcome((StatusCode::OK, Json(orders)), Ok(())))
}

//utilities

/// Card orders may come as plain JSON; crypto orders need `multipart/form-data`
/// to carry the proof file.
async fn read_order_request(req: Request) -> ApiResult<OrderRequest> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    if !is_multipart {
        let Json(payload) = Json::<OrderPayload>::from_request(req, &())
            .await
            .map_err(|rejection| {
                ApiError::InvalidArgument(format!("Invalid request body: {}", rejection.body_text()))
            })?;
        return Ok(OrderRequest {
            payment_method: payload.payment_method,
            proof: None,
        });
    }

    let mut multipart = Multipart::from_request(req, &()).await.map_err(|rejection| {
        ApiError::InvalidArgument(format!("Invalid multipart payload: {}", rejection.body_text()))
    })?;

    let mut payment_method = None;
    let mut proof = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            PAYMENT_METHOD_FIELD => {
                payment_method = Some(field.text().await.map_err(multipart_error)?);
            }
            PROOF_FIELD => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let data = field.bytes().await.map_err(multipart_error)?;
                proof = Some(ProofUpload { file_name, data });
            }
            _ => {}
        }
    }

    // Checked against `PaymentMethod` after the user and cart lookups.
    Ok(OrderRequest {
        payment_method: payment_method.unwrap_or_default(),
        proof,
    })
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::InvalidArgument("Payload too large".into());
    }
    ApiError::InvalidArgument(format!("Failed to parse multipart form: {}", err.body_text()))
}

//Structs
#[derive(Deserialize, Debug)]
struct OrderPayload {
    #[serde(default)]
    payment_method: String,
}
