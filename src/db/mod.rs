pub mod store;
#[cfg(test)]
pub mod test_utils;

pub use store::TransactionStore;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::{AppError, Result};

/// Open (creating if missing) the SQLite file at `path` and apply migrations.
pub async fn open(path: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{path}"))
        .map_err(AppError::StoreConnect)?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .map_err(AppError::StoreConnect)?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
