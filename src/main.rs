use std::error::Error;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rust_storefront::api::{create_api_router, AppState};
use rust_storefront::config::Config;
use rust_storefront::entities::{seed_admin, setup_schema};
use rust_storefront::middleware::auth::JwtKeys;
use rust_storefront::notify::{self, Mailer};
use rust_storefront::storage::ProofStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(?config, "Loaded configuration");

    let db = rust_storefront::connect(&config.database_url, config.db_timeout).await?;
    setup_schema(&db).await?;

    if let Some(admin) = &config.admin {
        seed_admin(&db, &admin.email, &admin.password).await?;
    }

    let mailer = match &config.mail {
        Some(mail) => Mailer::postmark(mail)?,
        None => {
            warn!("POSTMARK_API_TOKEN is not set, outgoing mail will only be logged");
            Mailer::log_only()
        }
    };

    let (notifier, queue) = notify::channel();
    tokio::spawn(queue.run(mailer.clone()));

    let app = create_api_router(AppState {
        db: Arc::new(db),
        keys: Arc::new(JwtKeys::new(&config.jwt_secret)),
        mailer,
        notifier,
        proofs: ProofStore::new(config.upload_dir.clone()),
        public_url: config.public_url.clone(),
        max_proof_bytes: config.max_proof_bytes,
        request_timeout: config.request_timeout,
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(address = %listener.local_addr()?, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
