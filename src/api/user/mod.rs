pub mod cart;
pub mod order;
pub mod profile;

use axum::{extract::DefaultBodyLimit, middleware::from_fn_with_state, Router};
use std::sync::Arc;

use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState, JwtKeys};
use cart::cart_router;
use order::order_router;
use profile::profile_router;

pub fn user_api_router(keys: Arc<JwtKeys>, max_proof_bytes: usize) -> Router {
    Router::new()
        .merge(profile_router())
        .merge(cart_router())
        .merge(order_router().layer(DefaultBodyLimit::max(max_proof_bytes)))
        .layer(from_fn_with_state(
            AuthState {
                keys,
                role: Role::User,
            },
            auth_middleware,
        ))
}
