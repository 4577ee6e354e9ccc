use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::config::INSERT_CHUNK_SIZE;
use crate::error::{AppError, Result};
use crate::query::filter::{sale_month, Page, TransactionFilter};
use crate::types::{CategoryCount, SeedRecord, Statistics, Transaction};

const SELECT_TRANSACTION: &str = "SELECT id, source_id, title, description, price, category, image, sold, date_of_sale FROM transactions";

/// SQLite-backed transaction collection. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TransactionStore {
    pool: SqlitePool,
}

impl TransactionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Delete every record and insert `records` in one SQL transaction.
    /// On any failure the transaction is rolled back and the previous
    /// contents stay visible.
    pub async fn replace_all(&self, records: &[SeedRecord]) -> Result<u64> {
        let mut tx = self.pool.begin().await.map_err(AppError::StoreWrite)?;

        let deleted = sqlx::query("DELETE FROM transactions")
            .execute(&mut *tx)
            .await
            .map_err(AppError::StoreWrite)?
            .rows_affected();

        let mut inserted = 0u64;
        for chunk in records.chunks(INSERT_CHUNK_SIZE) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO transactions \
                 (source_id, title, description, price, price_text, category, image, sold, date_of_sale, sale_month) ",
            );
            qb.push_values(chunk, |mut row, r| {
                row.push_bind(r.id)
                    .push_bind(r.title.clone())
                    .push_bind(r.description.clone())
                    .push_bind(r.price)
                    .push_bind(r.price.to_string())
                    .push_bind(r.category.clone())
                    .push_bind(r.image.clone())
                    .push_bind(r.sold)
                    .push_bind(r.date_of_sale.clone())
                    .push_bind(sale_month(&r.date_of_sale).map(i64::from));
            });
            inserted += qb
                .build()
                .execute(&mut *tx)
                .await
                .map_err(AppError::StoreWrite)?
                .rows_affected();
        }

        tx.commit().await.map_err(AppError::StoreWrite)?;
        debug!(deleted, inserted, "transactions replaced");
        Ok(inserted)
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::StoreRead)
    }

    /// One page of matching records in insertion order.
    pub async fn find_page(&self, filter: &TransactionFilter, page: Page) -> Result<Vec<Transaction>> {
        let mut qb = QueryBuilder::new(SELECT_TRANSACTION);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        qb.build_query_as::<Transaction>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::StoreRead)
    }

    pub async fn count_matching(&self, filter: &TransactionFilter) -> Result<i64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM transactions");
        push_filter(&mut qb, filter);
        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::StoreRead)
    }

    pub async fn statistics(&self, filter: &TransactionFilter) -> Result<Statistics> {
        // TOTAL() is 0.0 rather than NULL over an empty set.
        let mut qb = QueryBuilder::new(
            "SELECT TOTAL(CASE WHEN sold THEN price ELSE 0 END), \
                    COUNT(CASE WHEN sold THEN 1 END), \
                    COUNT(CASE WHEN NOT sold THEN 1 END) \
             FROM transactions",
        );
        push_filter(&mut qb, filter);
        let (total_sales, total_sold_items, total_not_sold_items) = qb
            .build_query_as::<(f64, i64, i64)>()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::StoreRead)?;
        Ok(Statistics {
            total_sales,
            total_sold_items,
            total_not_sold_items,
        })
    }

    pub async fn prices(&self, filter: &TransactionFilter) -> Result<Vec<f64>> {
        let mut qb = QueryBuilder::new("SELECT price FROM transactions");
        push_filter(&mut qb, filter);
        qb.build_query_scalar::<f64>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::StoreRead)
    }

    pub async fn category_counts(&self, filter: &TransactionFilter) -> Result<Vec<CategoryCount>> {
        let mut qb = QueryBuilder::new("SELECT category, COUNT(*) AS count FROM transactions");
        push_filter(&mut qb, filter);
        qb.push(" GROUP BY category ORDER BY category");
        qb.build_query_as::<CategoryCount>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::StoreRead)
    }
}

#[cfg(test)]
impl TransactionStore {
    pub async fn all(&self) -> Result<Vec<Transaction>> {
        sqlx::query_as::<_, Transaction>(&format!("{SELECT_TRANSACTION} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::StoreRead)
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &TransactionFilter) {
    qb.push(" WHERE sale_month = ").push_bind(filter.month_number());
    if let Some(pattern) = filter.like_pattern() {
        qb.push(" AND (title LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR description LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR price_text LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{open_in_memory, record, seeded_store};
    use chrono::Month;

    #[tokio::test]
    async fn replace_all_swaps_contents_and_preserves_fields() {
        let store = seeded_store(&[record("old", 1.0, "a", "2024-01-01", false)]).await;

        let mut fresh = record("Backpack", 109.95, "men's clothing", "2021-11-27T20:29:54+05:30", true);
        fresh.id = Some(1);
        fresh.image = Some("https://example.com/1.jpg".to_string());
        let inserted = store.replace_all(&[fresh.clone()]).await.unwrap();

        assert_eq!(inserted, 1);
        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 1);
        let tx = &all[0];
        assert_eq!(tx.source_id, Some(1));
        assert_eq!(tx.title, fresh.title);
        assert_eq!(tx.description, fresh.description);
        assert_eq!(tx.price, 109.95);
        assert_eq!(tx.category, fresh.category);
        assert_eq!(tx.image, fresh.image);
        assert!(tx.sold);
        assert_eq!(tx.date_of_sale, fresh.date_of_sale);
    }

    #[tokio::test]
    async fn replace_all_inserts_across_chunks() {
        let records: Vec<_> = (0..(INSERT_CHUNK_SIZE * 2 + 7))
            .map(|i| record(&format!("item {i}"), i as f64, "c", "2024-03-01", i % 2 == 0))
            .collect();
        let store = seeded_store(&records).await;
        assert_eq!(store.count().await.unwrap(), records.len() as i64);
    }

    #[tokio::test]
    async fn month_filter_ignores_year_and_other_months() {
        let store = seeded_store(&[
            record("a", 10.0, "x", "2021-03-05", true),
            record("b", 20.0, "x", "2022-03-28T10:00:00+05:30", false),
            record("c", 30.0, "x", "2022-04-01", true),
            record("d", 40.0, "x", "not a date", true),
        ])
        .await;

        let march = TransactionFilter::month(Month::March);
        assert_eq!(store.count_matching(&march).await.unwrap(), 2);
        let april = TransactionFilter::month(Month::April);
        assert_eq!(store.count_matching(&april).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn search_matches_title_description_and_price_text() {
        let mut plain = record("Plain shirt", 15.0, "x", "2024-03-01", true);
        plain.description = "Cotton".to_string();
        let store = seeded_store(&[
            record("Mens Casual Jacket", 55.99, "x", "2024-03-01", true),
            plain,
            record("Ring", 329.85, "x", "2024-03-01", false),
        ])
        .await;

        let by = |s: &str| TransactionFilter::month(Month::March).with_search(Some(s));
        let page = Page::new(None, None, 10, 100);

        let titles = |txs: Vec<Transaction>| txs.into_iter().map(|t| t.title).collect::<Vec<_>>();
        assert_eq!(titles(store.find_page(&by("jacket"), page).await.unwrap()), ["Mens Casual Jacket"]);
        assert_eq!(titles(store.find_page(&by("COTTON"), page).await.unwrap()), ["Plain shirt"]);
        assert_eq!(titles(store.find_page(&by("329.8"), page).await.unwrap()), ["Ring"]);
        assert!(store.find_page(&by("%"), page).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn price_search_uses_printed_form() {
        let store = seeded_store(&[
            record("Alpha", 15.0, "x", "2024-03-01", true),
            record("Beta", 329.85, "x", "2024-03-01", false),
        ])
        .await;
        let by = |s: &str| TransactionFilter::month(Month::March).with_search(Some(s));

        assert_eq!(store.count_matching(&by("0")).await.unwrap(), 0);
        assert_eq!(store.count_matching(&by("5.0")).await.unwrap(), 0);
        assert_eq!(store.count_matching(&by("15.0")).await.unwrap(), 0);
        let hits = store.find_page(&by("15"), Page::new(None, None, 10, 100)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Alpha");
    }

    #[tokio::test]
    async fn failed_replace_rolls_back() {
        let store = seeded_store(&[record("kept", 1.0, "x", "2024-03-01", false)]).await;

        // NaN binds as NULL and trips the NOT NULL constraint on price.
        let res = store
            .replace_all(&[
                record("new", 2.0, "x", "2024-03-01", true),
                record("bad", f64::NAN, "x", "2024-03-01", true),
            ])
            .await;

        assert!(matches!(res, Err(AppError::StoreWrite(_))), "got {res:?}");
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.all().await.unwrap()[0].title, "kept");
    }

    #[tokio::test]
    async fn pages_slice_the_stable_order() {
        let records: Vec<_> = (0..25)
            .map(|i| record(&format!("item {i:02}"), 1.0, "c", "2024-03-01", true))
            .collect();
        let store = seeded_store(&records).await;
        let march = TransactionFilter::month(Month::March);

        let all = store.find_page(&march, Page::new(Some(1), Some(100), 10, 100)).await.unwrap();
        assert_eq!(all.len(), 25);

        let third = store.find_page(&march, Page::new(Some(3), Some(10), 10, 100)).await.unwrap();
        assert_eq!(third.len(), 5);
        assert_eq!(third, all[20..25].to_vec());

        let second = store.find_page(&march, Page::new(Some(2), Some(7), 10, 100)).await.unwrap();
        assert_eq!(second, all[7..14].to_vec());

        let beyond = store.find_page(&march, Page::new(Some(9), Some(10), 10, 100)).await.unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn aggregates_over_empty_store() {
        let store = TransactionStore::new(open_in_memory().await);
        let march = TransactionFilter::month(Month::March);

        assert_eq!(store.statistics(&march).await.unwrap(), Statistics::default());
        assert!(store.prices(&march).await.unwrap().is_empty());
        assert!(store.category_counts(&march).await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn statistics_split_sold_and_unsold() {
        let store = seeded_store(&[
            record("a", 100.0, "x", "2024-03-01", true),
            record("b", 50.5, "y", "2024-03-02", true),
            record("c", 999.0, "x", "2024-03-03", false),
            record("d", 70.0, "x", "2024-05-03", true),
        ])
        .await;

        let stats = store.statistics(&TransactionFilter::month(Month::March)).await.unwrap();
        assert!((stats.total_sales - 150.5).abs() < 1e-9, "total_sales={}", stats.total_sales);
        assert_eq!(stats.total_sold_items, 2);
        assert_eq!(stats.total_not_sold_items, 1);
    }

    #[tokio::test]
    async fn category_counts_group_by_category() {
        let store = seeded_store(&[
            record("a", 1.0, "electronics", "2024-03-01", true),
            record("b", 1.0, "jewelery", "2024-03-01", true),
            record("c", 1.0, "electronics", "2024-03-01", false),
            record("d", 1.0, "jewelery", "2024-06-01", false),
        ])
        .await;

        let counts = store.category_counts(&TransactionFilter::month(Month::March)).await.unwrap();
        assert_eq!(
            counts,
            vec![
                CategoryCount { category: "electronics".to_string(), count: 2 },
                CategoryCount { category: "jewelery".to_string(), count: 1 },
            ]
        );
    }
}
