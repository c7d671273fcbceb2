use axum::{extract::Extension, http::StatusCode, response::Response, routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;

use crate::entities::user::{self, Address, Role};
use crate::error::{ApiError, ApiResult};
use crate::middleware::{auth::Claims, logging::with_outcome};

pub fn profile_router() -> Router {
    Router::new().route("/profile", get(get_profile))
}

async fn get_profile(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let model = user::find_by_email(&*db, &claims.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(with_outcome(
        (StatusCode::OK, Json(Profile::from(model))),
        Ok(()),
    ))
}

/// A user record without the password hash or verification token.
#[derive(Serialize)]
struct Profile {
    id: i32,
    name: String,
    email: String,
    role: Role,
    address: Address,
    is_verified: bool,
}

impl From<user::Model> for Profile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            address: model.address,
            is_verified: model.is_verified,
        }
    }
}
