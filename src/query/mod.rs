pub mod filter;
pub mod price_range;
pub mod service;

pub use filter::{parse_month, Page, TransactionFilter};
pub use service::QueryService;
