use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use std::sync::Arc;

use crate::api::extract::ApiPath;
use crate::entities::product::{self, Entity as ProductEntity};
use crate::error::{ApiError, ApiResult};
use crate::middleware::logging::with_outcome;

pub fn product_router() -> Router {
    Router::new()
        .route("/products", get(get_products))
        .route("/products/:id", get(get_product))
}

async fn get_products(Extension(db): Extension<Arc<DatabaseConnection>>) -> ApiResult<Response> {
    let products = ProductEntity::find()
        .order_by_asc(product::Column::Id)
        .all(&*db)
        .await?;

    Ok(with_outcome((StatusCode::OK, Json(products)), Ok(())))
}

async fn get_product(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> ApiResult<Response> {
    let product = ProductEntity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    Ok(with_outcome((StatusCode::OK, Json(product)), Ok(())))
}
