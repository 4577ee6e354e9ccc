use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A stored transaction as served by `/transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    #[sqlx(rename = "id")]
    pub store_id: i64,
    /// Identifier carried over from the seed feed, if it had one.
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    #[sqlx(rename = "source_id")]
    pub source_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub sold: bool,
    pub date_of_sale: String,
}

/// One element of the seed feed. Only `title`, `price` and `dateOfSale`
/// are required; the rest fall back to the store defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub sold: bool,
    pub date_of_sale: String,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_sales: f64,
    pub total_sold_items: i64,
    pub total_not_sold_items: i64,
}

/// One pie-chart slice. Serialized with the `_id` key the dashboard expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryCount {
    #[serde(rename = "_id")]
    pub category: String,
    pub count: i64,
}

/// `/combined` response: the three monthly aggregates in one body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedSummary {
    pub statistics: Statistics,
    pub bar_chart: Vec<i64>,
    pub pie_chart: Vec<CategoryCount>,
}
