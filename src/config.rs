use crate::error::{AppError, Result};

pub const SEED_URL: &str = "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// Page size used by `/transactions` when `perPage` is absent.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Upper bound on `perPage`; larger requests are clamped.
pub const MAX_PER_PAGE: u32 = 100;

/// Number of bar-chart price ranges. The last range is open-ended.
pub const PRICE_RANGE_COUNT: usize = 10;

/// Width of each bounded price range.
pub const PRICE_RANGE_WIDTH: f64 = 100.0;

/// Rows per multi-row INSERT during seeding. Keeps the bound parameter
/// count well under SQLite's limit.
pub const INSERT_CHUNK_SIZE: usize = 100;

/// Timeout for the seed feed request (seconds).
pub const SEED_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Source of the seed feed (SEED_URL)
    pub seed_url: String,
    /// Replace the store contents once at startup (SEED_ON_STARTUP)
    pub seed_on_startup: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "transactions.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            seed_url: std::env::var("SEED_URL").unwrap_or_else(|_| SEED_URL.to_string()),
            seed_on_startup: std::env::var("SEED_ON_STARTUP")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        })
    }
}

fn parse_flag(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
