//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - sea-orm connection string (e.g. `sqlite://store.db?mode=rwc`)
//! - `JWT_SECRET` - HMAC secret for identity and verification tokens
//!
//! ## Optional
//! - `POSTMARK_API_TOKEN` - Postmark server token; without it mail is only logged
//! - `EMAIL_SENDER` - From address (required together with `POSTMARK_API_TOKEN`)
//! - `PORT` - Listen port (default: 8000)
//! - `PUBLIC_URL` - Base URL used in verification links (default: `http://localhost:<PORT>`)
//! - `UPLOAD_DIR` - Root directory for payment proofs (default: `uploads`)
//! - `MAX_PROOF_BYTES` - Upload size cap for `POST /order` (default: 10 MiB)
//! - `DB_TIMEOUT_SECS` - Connect/acquire timeout for the database (default: 10)
//! - `REQUEST_TIMEOUT_SECS` - Whole-request timeout (default: 30)
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` - Bootstrap admin account

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_PROOF_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub mail: Option<MailConfig>,
    pub port: u16,
    pub public_url: String,
    pub upload_dir: PathBuf,
    pub max_proof_bytes: usize,
    pub db_timeout: Duration,
    pub request_timeout: Duration,
    pub admin: Option<AdminSeed>,
}

#[derive(Clone)]
pub struct MailConfig {
    pub postmark_token: String,
    pub sender: String,
}

#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"[REDACTED]")
            .field("mail_enabled", &self.mail.is_some())
            .field("port", &self.port)
            .field("public_url", &self.public_url)
            .field("upload_dir", &self.upload_dir)
            .field("max_proof_bytes", &self.max_proof_bytes)
            .field("db_timeout", &self.db_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("admin_seed", &self.admin.as_ref().map(|a| a.email.as_str()))
            .finish()
    }
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let mail = match optional("POSTMARK_API_TOKEN") {
            Some(postmark_token) => Some(MailConfig {
                postmark_token,
                sender: required("EMAIL_SENDER")?,
            }),
            None => None,
        };

        let port = parsed("PORT", DEFAULT_PORT)?;
        let public_url =
            optional("PUBLIC_URL").unwrap_or_else(|| format!("http://localhost:{port}"));

        let admin = match (optional("ADMIN_EMAIL"), optional("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("ADMIN_PASSWORD".into())),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("ADMIN_EMAIL".into())),
        };

        Ok(Self {
            database_url,
            jwt_secret,
            mail,
            port,
            public_url: public_url.trim_end_matches('/').to_owned(),
            upload_dir: optional("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            max_proof_bytes: parsed("MAX_PROOF_BYTES", DEFAULT_MAX_PROOF_BYTES)?,
            db_timeout: Duration::from_secs(parsed("DB_TIMEOUT_SECS", DEFAULT_DB_TIMEOUT_SECS)?),
            request_timeout: Duration::from_secs(parsed(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            admin,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn required(key: &str) -> Result<String, ConfigError> {
    optional(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_owned()))
}

fn parsed<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(key) {
        Some(raw) => raw
            .parse()
            .map_err(|err: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), err.to_string())),
        None => Ok(default),
    }
}
