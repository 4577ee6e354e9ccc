use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::db::TransactionStore;
use crate::types::SeedRecord;

/// Private in-memory database with migrations applied. Pinned to a single
/// connection that is never recycled, since each SQLite memory connection
/// is its own database.
pub async fn open_in_memory() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations apply");
    pool
}

pub fn record(title: &str, price: f64, category: &str, date: &str, sold: bool) -> SeedRecord {
    SeedRecord {
        id: None,
        title: title.to_string(),
        description: format!("{title} description"),
        price,
        category: category.to_string(),
        image: None,
        sold,
        date_of_sale: date.to_string(),
    }
}

pub async fn seeded_store(records: &[SeedRecord]) -> TransactionStore {
    let store = TransactionStore::new(open_in_memory().await);
    store.replace_all(records).await.expect("seed in-memory store");
    store
}
