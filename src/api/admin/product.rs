use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::{post, put},
    Json, Router,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, Set};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::api::extract::{ApiPath, ValidJson};
use crate::entities::product::{self, Entity as ProductEntity};
use crate::error::{ApiError, ApiResult};
use crate::middleware::logging::with_outcome;

//ROUTERS
pub fn admin_product_router() -> Router {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
}

//ROUTES
async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidJson(payload): ValidJson<CreateProduct>,
) -> ApiResult<Response> {
    let created = product::ActiveModel {
        name: Set(payload.name),
        description: Set(payload.description.unwrap_or_default()),
        price: Set(payload.price),
        stock: Set(payload.stock),
        ..Default::default()
    }
    .insert(&*db)
    .await?;
    info!(product_id = created.id, name = %created.name, "Product created");

    Ok(with_outcome((StatusCode::CREATED, Json(created)), Ok(())))
}

async fn update_product(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidJson(payload): ValidJson<UpdateProduct>,
) -> ApiResult<Response> {
    let existing = ProductEntity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    let mut product: product::ActiveModel = existing.into();

    if let Some(name) = payload.name {
        product.name = Set(name);
    }

    if let Some(description) = payload.description {
        product.description = Set(description);
    }

    if let Some(price) = payload.price {
        product.price = Set(price);
    }

    if let Some(stock) = payload.stock {
        product.stock = Set(stock);
    }

    let updated = product.update(&*db).await?;
    info!(product_id = updated.id, "Product updated");

    Ok(with_outcome((StatusCode::OK, Json(updated)), Ok(())))
}

async fn delete_product(
    ApiPath(id): ApiPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> ApiResult<Response> {
    let existing = ProductEntity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    existing.delete(&*db).await?;
    info!(product_id = id, "Product deleted");

    Ok(with_outcome(
        (
            StatusCode::OK,
            Json(json!({
                "message": "Product deleted successfully"
            })),
        ),
        Ok(()),
    ))
}

//Structs
#[derive(Deserialize, Validate, Debug)]
struct CreateProduct {
    #[validate(length(min = 1, message = "name is required"))]
    name: String,
    description: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    price: f64,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    stock: i32,
}

#[derive(Deserialize, Validate, Debug)]
struct UpdateProduct {
    #[validate(length(min = 1, message = "name must not be empty"))]
    name: Option<String>,
    description: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    price: Option<f64>,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    stock: Option<i32>,
}
