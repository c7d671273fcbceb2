//! Checkout: turning a cart into an order.
//!
//! Stock deduction, the order snapshot, the proof-of-payment record and cart
//! removal share one database transaction. A rejected line, a missing or
//! unwritable proof file, or any store error rolls all of it back, and a proof
//! file that already reached the disk is deleted again. Notifications go out
//! only after commit.

use axum::body::Bytes;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

use crate::entities::{
    cart, cart_item,
    order::{self, PaymentMethod, PaymentStatus},
    order_item, product,
    user::{self, Role},
};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::Claims;
use crate::notify::{self, Mailer, Notifier};
use crate::storage::ProofStore;

/// Seven working days, rounded to calendar days.
pub const DELIVERY_DAYS: i64 = 10;

pub const ORDER_PLACED_MESSAGE: &str =
    "Order created successfully. It will take 7 working days to arrive at your provided address.";

pub struct ProofUpload {
    pub file_name: String,
    pub data: Bytes,
}

pub struct OrderRequest {
    pub payment_method: String,
    pub proof: Option<ProofUpload>,
}

#[derive(Debug, Serialize)]
pub struct OrderSummary {
    pub order_id: i32,
    pub total_amount: f64,
    pub delivery_date: String,
    pub payment_status: PaymentStatus,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

pub fn delivery_date(placed_at: DateTime<Utc>) -> String {
    (placed_at + Duration::days(DELIVERY_DAYS))
        .format("%Y-%m-%d")
        .to_string()
}

pub async fn place_order(
    db: &DatabaseConnection,
    proofs: &ProofStore,
    notifier: &Notifier,
    claims: &Claims,
    request: OrderRequest,
) -> ApiResult<OrderSummary> {
    let txn = db.begin().await?;
    let mut written_proof: Option<PathBuf> = None;

    let placed = match place_order_in(&txn, proofs, claims, request, &mut written_proof).await {
        Ok(placed) => match txn.commit().await {
            Ok(()) => placed,
            Err(err) => {
                discard_proof(proofs, written_proof).await;
                return Err(err.into());
            }
        },
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "Failed to roll back order transaction");
            }
            discard_proof(proofs, written_proof).await;
            return Err(err);
        }
    };

    let order = &placed.order;
    info!(
        order_id = order.id,
        user_id = order.user_id,
        total_amount = order.total_amount,
        payment_method = %order.payment_method,
        "Order placed"
    );

    match order.payment_method {
        PaymentMethod::Card => notifier.dispatch(notify::order_confirmation_email(
            &placed.user.email,
            &placed.user.name,
            order.id,
            &order.delivery_date,
            order.total_amount,
            order.payment_method,
        )),
        PaymentMethod::Crypto => notifier.dispatch(notify::crypto_payment_received_email(
            &placed.user.email,
            &placed.user.name,
            order.id,
        )),
    }

    Ok(OrderSummary {
        order_id: order.id,
        total_amount: order.total_amount,
        delivery_date: order.delivery_date.clone(),
        payment_status: order.payment_status,
        message: ORDER_PLACED_MESSAGE.to_owned(),
    })
}

struct PlacedOrder {
    user: user::Model,
    order: order::Model,
}

async fn place_order_in(
    txn: &DatabaseTransaction,
    proofs: &ProofStore,
    claims: &Claims,
    request: OrderRequest,
    written_proof: &mut Option<PathBuf>,
) -> ApiResult<PlacedOrder> {
    let user = user::find_by_email(txn, &claims.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let cart = cart::Entity::find()
        .filter(cart::Column::UserId.eq(user.id))
        .one(txn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart not found".into()))?;

    let items = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .order_by_asc(cart_item::Column::Id)
        .all(txn)
        .await?;
    if items.is_empty() {
        return Err(ApiError::InvalidState("Cart is empty".into()));
    }

    let payment_method = PaymentMethod::from_str(&request.payment_method)
        .map_err(|_| ApiError::InvalidArgument("Invalid payment method".into()))?;

    let mut total_amount = 0.0;
    let mut snapshot = Vec::with_capacity(items.len());
    for item in &items {
        let product = product::Entity::find_by_id(item.product_id)
            .one(txn)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Product with ID {} not found", item.product_id))
            })?;
        if product.stock < item.quantity {
            return Err(insufficient_stock(&product.name));
        }
        total_amount += product.price * f64::from(item.quantity);
        snapshot.push((item, product));
    }

    for (item, product) in &snapshot {
        let result = product::Entity::update_many()
            .col_expr(
                product::Column::Stock,
                Expr::col(product::Column::Stock).sub(item.quantity),
            )
            .filter(product::Column::Id.eq(product.id))
            .filter(product::Column::Stock.gte(item.quantity))
            .exec(txn)
            .await?;
        if result.rows_affected != 1 {
            return Err(insufficient_stock(&product.name));
        }
    }

    let placed_at = Utc::now();
    let order = order::ActiveModel {
        user_id: Set(user.id),
        total_amount: Set(total_amount),
        payment_method: Set(payment_method),
        payment_status: Set(PaymentStatus::Pending),
        delivery_date: Set(delivery_date(placed_at)),
        crypto_proof_path: Set(None),
        created_at: Set(placed_at),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    order_item::Entity::insert_many(snapshot.iter().map(|(item, product)| {
        order_item::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            unit_price: Set(product.price),
            ..Default::default()
        }
    }))
    .exec(txn)
    .await?;

    let order_id = order.id;
    let mut pending: order::ActiveModel = order.into();
    match payment_method {
        PaymentMethod::Crypto => {
            let proof = request.proof.ok_or_else(|| {
                ApiError::InvalidArgument("Failed to retrieve file: crypto_proof is required".into())
            })?;
            let path = proofs
                .save(user.id, order_id, &proof.file_name, &proof.data)
                .await
                .map_err(|err| ApiError::Internal(err.to_string()))?;
            pending.crypto_proof_path = Set(Some(path.to_string_lossy().into_owned()));
            *written_proof = Some(path);
        }
        // Gateway integration is out of scope; card payments settle immediately.
        PaymentMethod::Card => {
            pending.payment_status = Set(PaymentStatus::Completed);
        }
    }
    let order = pending.update(txn).await?;

    cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .exec(txn)
        .await?;
    cart::Entity::delete_by_id(cart.id).exec(txn).await?;

    Ok(PlacedOrder { user, order })
}

fn insufficient_stock(product_name: &str) -> ApiError {
    ApiError::InvalidState(format!("Insufficient stock for product: {product_name}"))
}

async fn discard_proof(proofs: &ProofStore, written_proof: Option<PathBuf>) {
    if let Some(path) = written_proof {
        proofs.remove(&path).await;
    }
}

pub async fn list_orders(db: &DatabaseConnection, claims: &Claims) -> ApiResult<Vec<OrderView>> {
    let user = user::find_by_email(db, &claims.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let orders = order::Entity::find()
        .filter(order::Column::UserId.eq(user.id))
        .order_by_asc(order::Column::Id)
        .find_with_related(order_item::Entity)
        .all(db)
        .await?;

    Ok(orders
        .into_iter()
        .map(|(order, items)| OrderView { order, items })
        .collect())
}

/// Admin-only. The new status is committed before the owner is emailed, so a
/// mail failure is logged and the update still succeeds.
pub async fn update_payment_status(
    db: &DatabaseConnection,
    mailer: &Mailer,
    claims: &Claims,
    order_id: i32,
    new_status: &str,
) -> ApiResult<order::Model> {
    if claims.role != Role::Admin {
        return Err(ApiError::Forbidden("Forbidden: Admins only".into()));
    }

    let status = match PaymentStatus::from_str(new_status) {
        Ok(status @ (PaymentStatus::Completed | PaymentStatus::Failed)) => status,
        _ => return Err(ApiError::InvalidArgument("Invalid payment status".into())),
    };

    let order = order::Entity::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".into()))?;

    let mut order: order::ActiveModel = order.into();
    order.payment_status = Set(status);
    let order = order.update(db).await?;
    info!(order_id = order.id, payment_status = %status, "Payment status updated");

    match user::Entity::find_by_id(order.user_id).one(db).await {
        Ok(Some(owner)) => {
            let email = notify::payment_status_email(&owner.email, &owner.name, order.id, status);
            if let Err(err) = mailer.send(&email).await {
                warn!(to = %owner.email, error = %err, "Failed to send payment status email");
            }
        }
        Ok(None) => warn!(order_id = order.id, "Order owner not found, skipping status email"),
        Err(err) => warn!(order_id = order.id, error = %err, "Failed to load order owner"),
    }

    Ok(order)
}
