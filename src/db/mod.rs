pub mod catalog;
pub mod models;
pub mod users;

use std::{str::FromStr, time::Duration};

use sqlx::{
  migrate::MigrateDatabase,
  sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
  Sqlite,
};

use crate::config::Config;

pub type DbPool = SqlitePool;

pub async fn create_pool(config: &Config) -> Result<DbPool, sqlx::Error> {
  let database_url = config.database_url.as_str();

  if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
    tracing::info!("Creating database: {}", database_url);
    Sqlite::create_database(database_url).await?;
  }

  let options = SqliteConnectOptions::from_str(database_url)?
    .foreign_keys(true)
    .busy_timeout(Duration::from_secs(5));

  let pool = SqlitePoolOptions::new()
    .max_connections(config.max_connections)
    .acquire_timeout(config.acquire_timeout)
    .connect_with(options)
    .await?;

  tracing::info!("Running migrations...");
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await?;

  tracing::info!("Database ready");
  Ok(pool)
}

/// Current time as Unix seconds, the unit every timestamp column uses
pub fn now_ts() -> i64 {
  chrono::Utc::now().timestamp()
}

/// Single-connection in-memory database with the schema applied
#[cfg(test)]
pub async fn test_pool() -> DbPool {
  let options = SqliteConnectOptions::from_str("sqlite::memory:")
    .expect("parse in-memory url")
    .foreign_keys(true);

  let pool = SqlitePoolOptions::new()
    .max_connections(1)
    .connect_with(options)
    .await
    .expect("connect in-memory sqlite");

  sqlx::migrate!("./migrations").run(&pool).await.expect("migrate");
  pool
}
