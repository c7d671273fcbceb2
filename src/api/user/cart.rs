use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::api::extract::{ApiQuery, ValidJson};
use crate::entities::{cart, cart::Entity as CartEntity, cart_item, product, user};
use crate::error::{ApiError, ApiResult};
use crate::middleware::{auth::Claims, logging::with_outcome};

//ROUTERS
pub fn cart_router() -> Router {
    Router::new().route(
        "/cart",
        get(get_cart).post(add_product).delete(remove_product),
    )
}

async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let owner = find_user(&*db, &claims).await?;
    let cart = find_cart(&*db, owner.id).await?;
    let view = CartView::load(&*db, cart).await?;

    Ok(with_outcome((StatusCode::OK, Json(view)), Ok(())))
}

/// Creates the cart on first use; adding a product that is already in the
/// cart increases that line's quantity.
async fn add_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ValidJson(payload): ValidJson<AddProduct>,
) -> ApiResult<Response> {
    let txn = db.begin().await?;

    let owner = find_user(&txn, &claims).await?;

    if product::Entity::find_by_id(payload.product_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!(
            "No product with {} id was found",
            payload.product_id
        )));
    }

    let cart = match CartEntity::find()
        .filter(cart::Column::UserId.eq(owner.id))
        .one(&txn)
        .await?
    {
        Some(cart) => cart,
        None => {
            cart::ActiveModel {
                user_id: Set(owner.id),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    let existing = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(payload.product_id))
        .one(&txn)
        .await?;

    match existing {
        Some(entry) => {
            let quantity = entry
                .quantity
                .checked_add(payload.quantity)
                .ok_or_else(|| ApiError::InvalidArgument("quantity is too large".into()))?;
            let mut entry: cart_item::ActiveModel = entry.into();
            entry.quantity = Set(quantity);
            entry.update(&txn).await?;
        }
        None => {
            cart_item::ActiveModel {
                cart_id: Set(cart.id),
                product_id: Set(payload.product_id),
                quantity: Set(payload.quantity),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    let view = CartView::load(&txn, cart).await?;
    txn.commit().await?;

    Ok(with_outcome((StatusCode::OK, Json(view)), Ok(())))
}

/// Removing a product that is not in the cart leaves the cart as it was.
async fn remove_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ApiQuery(query): ApiQuery<RemoveProduct>,
) -> ApiResult<Response> {
    let txn = db.begin().await?;

    let owner = find_user(&txn, &claims).await?;
    let cart = find_cart(&txn, owner.id).await?;

    cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(query.product_id))
        .exec(&txn)
        .await?;

    let view = CartView::load(&txn, cart).await?;
    txn.commit().await?;

    Ok(with_outcome((StatusCode::OK, Json(view)), Ok(())))
}

//utilities
async fn find_user<C: ConnectionTrait>(db: &C, claims: &Claims) -> ApiResult<user::Model> {
    user::find_by_email(db, &claims.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

async fn find_cart<C: ConnectionTrait>(db: &C, user_id: i32) -> ApiResult<cart::Model> {
    CartEntity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart not found".into()))
}

//Structs
#[derive(Deserialize, Validate, Debug)]
struct AddProduct {
    product_id: i32,
    #[validate(range(min = 1, message = "quantity must be greater than 0"))]
    quantity: i32,
}

#[derive(Deserialize)]
struct RemoveProduct {
    product_id: i32,
}

#[derive(Serialize)]
struct CartView {
    id: i32,
    user_id: i32,
    items: Vec<cart_item::Model>,
}

impl CartView {
    async fn load<C: ConnectionTrait>(db: &C, cart: cart::Model) -> ApiResult<Self> {
        let items = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .order_by_asc(cart_item::Column::Id)
            .all(db)
            .await?;

        Ok(Self {
            id: cart.id,
            user_id: cart.user_id,
            items,
        })
    }
}
