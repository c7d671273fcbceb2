pub mod admin;
pub mod extract;
pub mod public;
pub mod user;

use axum::{middleware, Extension, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use admin::admin_api_router;
use public::public_api_router;
use user::user_api_router;

use crate::middleware::{auth::JwtKeys, logging::logging_middleware};
use crate::notify::{Mailer, Notifier};
use crate::storage::ProofStore;

/// Base URL that links in outgoing mail point at.
#[derive(Clone, Debug)]
pub struct SiteUrl(pub String);

/// Everything the handlers share. Built once in `main` (or by a test harness).
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub keys: Arc<JwtKeys>,
    pub mailer: Mailer,
    pub notifier: Notifier,
    pub proofs: ProofStore,
    pub public_url: String,
    pub max_proof_bytes: usize,
    pub request_timeout: Duration,
}

pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .merge(public_api_router())
        .merge(user_api_router(state.keys.clone(), state.max_proof_bytes))
        .merge(admin_api_router(state.keys.clone()))
        .layer(Extension(state.db))
        .layer(Extension(state.keys))
        .layer(Extension(state.mailer))
        .layer(Extension(state.notifier))
        .layer(Extension(state.proofs))
        .layer(Extension(SiteUrl(state.public_url)))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.request_timeout))
}
