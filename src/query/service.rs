use chrono::Month;

use crate::db::TransactionStore;
use crate::error::Result;
use crate::query::filter::{Page, TransactionFilter};
use crate::query::price_range::histogram;
use crate::types::{CategoryCount, CombinedSummary, Statistics, Transaction};

/// A page of the list operation plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPage {
    pub items: Vec<Transaction>,
    pub total: i64,
}

/// Read side of the application. Route handlers talk to this, never to the
/// store directly.
#[derive(Debug, Clone)]
pub struct QueryService {
    store: TransactionStore,
}

impl QueryService {
    pub fn new(store: TransactionStore) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &TransactionFilter, page: Page) -> Result<TransactionPage> {
        let (items, total) = tokio::try_join!(
            self.store.find_page(filter, page),
            self.store.count_matching(filter),
        )?;
        Ok(TransactionPage { items, total })
    }

    pub async fn statistics(&self, month: Month) -> Result<Statistics> {
        self.store.statistics(&TransactionFilter::month(month)).await
    }

    /// Ten counts, one per price range in ascending order.
    pub async fn bar_chart(&self, month: Month) -> Result<Vec<i64>> {
        let prices = self.store.prices(&TransactionFilter::month(month)).await?;
        Ok(histogram(prices))
    }

    pub async fn pie_chart(&self, month: Month) -> Result<Vec<CategoryCount>> {
        self.store.category_counts(&TransactionFilter::month(month)).await
    }

    pub async fn combined(&self, month: Month) -> Result<CombinedSummary> {
        let (statistics, bar_chart, pie_chart) = tokio::try_join!(
            self.statistics(month),
            self.bar_chart(month),
            self.pie_chart(month),
        )?;
        Ok(CombinedSummary {
            statistics,
            bar_chart,
            pie_chart,
        })
    }

    pub async fn total(&self) -> Result<i64> {
        self.store.count().await
    }
}
