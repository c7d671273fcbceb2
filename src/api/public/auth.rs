use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use validator::Validate;

use crate::api::{
    extract::{ApiQuery, ValidJson},
    SiteUrl,
};
use crate::entities::user::{self, Address, Entity as UserEntity, Role};
use crate::error::{ApiError, ApiResult};
use crate::middleware::{auth::JwtKeys, logging::with_outcome};
use crate::notify::{self, Mailer};

pub fn auth_router() -> Router {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
        .route("/verify", get(verify_email))
}

async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(keys): Extension<Arc<JwtKeys>>,
    Extension(mailer): Extension<Mailer>,
    Extension(site): Extension<SiteUrl>,
    ValidJson(payload): ValidJson<RegisterUser>,
) -> ApiResult<Response> {
    if user::find_by_email(&*db, &payload.email).await?.is_some() {
        return Err(ApiError::InvalidState("User already exists".into()));
    }

    let password = user::hash_password(&payload.password)
        .map_err(|err| ApiError::Internal(format!("Failed to hash password: {err}")))?;

    let verification_token = keys
        .generate_verification_token(&payload.email, Role::User)
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let new_user = user::ActiveModel {
        name: Set(payload.name),
        email: Set(payload.email),
        password: Set(password),
        role: Set(Role::User),
        address: Set(payload.address),
        is_verified: Set(false),
        verification_token: Set(Some(verification_token.clone())),
        ..Default::default()
    }
    .insert(&*db)
    .await?;
    info!(user_id = new_user.id, email = %new_user.email, "User registered");

    let email = notify::verification_email(&new_user.email, &site.0, &verification_token);
    if let Err(err) = mailer.send(&email).await {
        error!(to = %new_user.email, error = %err, "Failed to send verification email");
        return Err(ApiError::Internal(format!(
            "Error sending verification email: {err}"
        )));
    }

    Ok(with_outcome(
        (
            StatusCode::CREATED,
            Json(json!({
                "message": "User registered successfully. Please check your email to verify your account."
            })),
        ),
        Ok(()),
    ))
}

async fn verify_email(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(keys): Extension<Arc<JwtKeys>>,
    ApiQuery(query): ApiQuery<VerifyQuery>,
) -> ApiResult<Response> {
    let token = query
        .token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::InvalidArgument("Verification token missing".into()))?;

    keys.validate_verification_token(&token)
        .map_err(|_| ApiError::InvalidArgument("Invalid token".into()))?;

    let found = UserEntity::find()
        .filter(user::Column::VerificationToken.eq(token.as_str()))
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::InvalidArgument("User not found or already verified".into()))?;

    let mut found: user::ActiveModel = found.into();
    found.is_verified = Set(true);
    found.verification_token = Set(None);
    let verified = found.update(&*db).await?;
    info!(user_id = verified.id, "Email verified");

    Ok(with_outcome(
        (
            StatusCode::OK,
            Json(json!({
                "message": "Email verified successfully. You can now log in."
            })),
        ),
        Ok(()),
    ))
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(keys): Extension<Arc<JwtKeys>>,
    ValidJson(payload): ValidJson<UserLogin>,
) -> ApiResult<Response> {
    let model = user::find_by_email(&*db, &payload.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    if !model.is_verified {
        return Err(ApiError::Unauthorized("Email not verified".into()));
    }

    model
        .check_hash(&payload.password)
        .map_err(|_| ApiError::Unauthorized("Invalid password".into()))?;

    let token = keys
        .generate_token(&model.email, model.role)
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(with_outcome(
        (
            StatusCode::OK,
            Json(json!({
                "token": token
            })),
        ),
        Ok(()),
    ))
}

//structs
#[derive(Deserialize, Validate, Debug)]
struct RegisterUser {
    #[validate(length(min = 1, message = "name is required"))]
    name: String,
    #[validate(email(message = "email is not a valid address"))]
    email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    password: String,
    #[serde(default)]
    address: Address,
}

#[derive(Deserialize, Validate, Debug)]
struct UserLogin {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct VerifyQuery {
    token: Option<String>,
}
