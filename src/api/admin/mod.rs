pub mod order;
pub mod product;

use axum::{middleware::from_fn_with_state, Router};
use std::sync::Arc;

use order::admin_order_router;
use product::admin_product_router;

use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState, JwtKeys};

pub fn admin_api_router(keys: Arc<JwtKeys>) -> Router {
    Router::new()
        .merge(admin_product_router())
        .merge(admin_order_router())
        .layer(from_fn_with_state(
            AuthState {
                keys,
                role: Role::Admin,
            },
            auth_middleware,
        ))
}
