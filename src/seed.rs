use std::time::Duration;

use tracing::info;

use crate::config::SEED_FETCH_TIMEOUT_SECS;
use crate::db::TransactionStore;
use crate::error::{AppError, Result};
use crate::types::SeedRecord;

/// Replaces the store contents with the records served by the seed feed.
#[derive(Debug, Clone)]
pub struct SeedLoader {
    client: reqwest::Client,
    url: String,
    store: TransactionStore,
}

impl SeedLoader {
    pub fn new(store: TransactionStore, url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SEED_FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(store, client, url))
    }

    pub fn with_client(store: TransactionStore, client: reqwest::Client, url: String) -> Self {
        Self { client, url, store }
    }

    /// Fetch the feed and replace the store. Nothing is written unless the
    /// whole feed was fetched and decoded. Returns the number of records
    /// inserted.
    pub async fn load(&self) -> Result<u64> {
        let records = fetch_seed(&self.client, &self.url).await?;
        info!(url = %self.url, records = records.len(), "seed feed fetched");
        let inserted = self.store.replace_all(&records).await?;
        info!(inserted, "store reseeded");
        Ok(inserted)
    }
}

/// GET `url` and decode a JSON array of seed records.
pub async fn fetch_seed(client: &reqwest::Client, url: &str) -> Result<Vec<SeedRecord>> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(AppError::UpstreamFetch(format!("seed feed returned {status}")));
    }
    resp.json::<Vec<SeedRecord>>()
        .await
        .map_err(|e| AppError::UpstreamFetch(format!("seed feed was not a transaction array: {e}")))
}
