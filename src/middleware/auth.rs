use crate::entities::user::Role;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub const TOKEN_TTL_HOURS: i64 = 24;

/// Authenticates the bearer token and inserts the caller's `Claims` into the request.
///
/// `Role::User` routes accept any valid identity; `Role::Admin` routes answer 403
/// to everyone else.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Authorization header missing".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".into()))?;

    let claims = state
        .keys
        .validate_token(token)
        .map_err(|err| ApiError::Unauthorized(err.to_string()))?;

    if state.role == Role::Admin && claims.role != Role::Admin {
        return Err(ApiError::Forbidden("Forbidden: Admins only".into()));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

#[derive(Clone)]
pub struct AuthState {
    pub keys: Arc<JwtKeys>,
    pub role: Role,
}

/// Signing material derived once from the configured secret.
///
/// Email verification tokens are signed with a separate key so they can never
/// pass as bearer tokens.
pub struct JwtKeys {
    identity: KeyPair,
    verification: KeyPair,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        let verification_secret = format!("{secret}:email-verification");
        Self {
            identity: KeyPair::from_secret(secret.as_bytes()),
            verification: KeyPair::from_secret(verification_secret.as_bytes()),
        }
    }

    pub fn generate_token(&self, email: &str, role: Role) -> Result<String, AuthError> {
        self.generate_token_with_ttl(email, role, Duration::hours(TOKEN_TTL_HOURS))
    }

    pub fn generate_token_with_ttl(
        &self,
        email: &str,
        role: Role,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        sign(&self.identity, email, role, ttl)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        verify(&self.identity, token)
    }

    pub fn generate_verification_token(&self, email: &str, role: Role) -> Result<String, AuthError> {
        sign(&self.verification, email, role, Duration::hours(TOKEN_TTL_HOURS))
    }

    pub fn validate_verification_token(&self, token: &str) -> Result<Claims, AuthError> {
        verify(&self.verification, token)
    }
}

fn sign(keys: &KeyPair, email: &str, role: Role, ttl: Duration) -> Result<String, AuthError> {
    let exp = Utc::now()
        .checked_add_signed(ttl)
        .ok_or(AuthError::GenerationFail)?
        .timestamp();

    let claims = Claims {
        email: email.to_owned(),
        role,
        exp: usize::try_from(exp).map_err(|_| AuthError::GenerationFail)?,
    };

    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
        .map_err(|_| AuthError::GenerationFail)
}

fn verify(keys: &KeyPair, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(token, &keys.decoding, &validation)
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::ValidationFail,
        })
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token")]
    ValidationFail,
    #[error("Failed to generate token")]
    GenerationFail,
}
