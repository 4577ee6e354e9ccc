use chrono::{DateTime, Datelike, Month, NaiveDate, NaiveDateTime};

use crate::error::{AppError, Result};

/// Parse a month given as a name (`"March"`), abbreviation (`"mar"`) or
/// number (`"3"`, `"03"`). Case-insensitive.
pub fn parse_month(raw: &str) -> Result<Month> {
    let s = raw.trim();
    if let Ok(n) = s.parse::<u8>() {
        return Month::try_from(n)
            .map_err(|_| AppError::BadRequest(format!("month out of range: {s}")));
    }
    s.parse::<Month>()
        .map_err(|_| AppError::BadRequest(format!("unrecognized month: {s:?}")))
}

/// Month component of a stored `dateOfSale`, as written (no UTC shift).
/// Returns None for text that is not a recognizable date.
pub fn sale_month(date_of_sale: &str) -> Option<u32> {
    let s = date_of_sale.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.month());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.month());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.month())
}

/// Filter shared by every read operation: a calendar month plus an
/// optional free-text search (used by the list only).
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFilter {
    pub month: Month,
    pub search: Option<String>,
}

impl TransactionFilter {
    pub fn month(month: Month) -> Self {
        Self { month, search: None }
    }

    /// Blank searches collapse to None.
    pub fn with_search(mut self, search: Option<&str>) -> Self {
        self.search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self
    }

    pub fn month_number(&self) -> i64 {
        i64::from(self.month.number_from_month())
    }

    /// `LIKE` pattern for the search text, with `\` as the escape character.
    pub fn like_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|s| {
            let mut out = String::with_capacity(s.len() + 2);
            out.push('%');
            for c in s.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('%');
            out
        })
    }
}

/// Validated pagination window for the list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    /// Zero values are bumped to 1; `per_page` is capped at `max_per_page`.
    pub fn new(page: Option<u32>, per_page: Option<u32>, default_per_page: u32, max_per_page: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(default_per_page).clamp(1, max_per_page),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_accepts_names_abbreviations_and_numbers() {
        for raw in ["March", "march", "MARCH", "mar", "3", "03", " 3 "] {
            assert_eq!(parse_month(raw).unwrap(), Month::March, "{raw:?}");
        }
        assert_eq!(parse_month("12").unwrap(), Month::December);
    }

    #[test]
    fn month_rejects_garbage() {
        for raw in ["", "0", "13", "undefined", "Marchh"] {
            assert!(
                matches!(parse_month(raw), Err(AppError::BadRequest(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn sale_month_keeps_the_written_offset() {
        // 2021-12-01T01:00 at +05:30 is still November in UTC.
        assert_eq!(sale_month("2021-12-01T01:00:00+05:30"), Some(12));
        assert_eq!(sale_month("2021-11-27T20:29:54+05:30"), Some(11));
        assert_eq!(sale_month("2022-06-10T09:00:00Z"), Some(6));
    }

    #[test]
    fn sale_month_handles_naive_forms() {
        assert_eq!(sale_month("2024-03-05"), Some(3));
        assert_eq!(sale_month("2024-07-05T10:11:12"), Some(7));
        assert_eq!(sale_month("2024-07-05T10:11:12.345"), Some(7));
        assert_eq!(sale_month("yesterday"), None);
        assert_eq!(sale_month(""), None);
    }

    #[test]
    fn blank_search_is_no_search() {
        let f = TransactionFilter::month(Month::May).with_search(Some("   "));
        assert!(f.search.is_none());
        assert!(f.like_pattern().is_none());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        let f = TransactionFilter::month(Month::May).with_search(Some("50%_off\\"));
        assert_eq!(f.like_pattern().as_deref(), Some("%50\\%\\_off\\\\%"));
    }

    #[test]
    fn page_defaults_and_clamps() {
        assert_eq!(Page::new(None, None, 10, 100), Page { page: 1, per_page: 10 });
        assert_eq!(Page::new(Some(0), Some(0), 10, 100), Page { page: 1, per_page: 1 });
        assert_eq!(Page::new(Some(3), Some(500), 10, 100), Page { page: 3, per_page: 100 });

        let p = Page::new(Some(3), Some(4), 10, 100);
        assert_eq!(p.offset(), 8);
        assert_eq!(p.limit(), 4);
    }
}
