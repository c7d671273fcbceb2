pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod middleware;
pub mod notify;
pub mod orders;
pub mod storage;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

/// Opens the pool with every connect/acquire bounded by `timeout`.
pub async fn connect(url: &str, timeout: Duration) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url.to_owned());
    options
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .sqlx_logging(false);

    Database::connect(options).await
}
