use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// API response types (mirror the server's JSON shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow {
    #[serde(rename = "_id")]
    pub store_id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub sold: bool,
    pub date_of_sale: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub total_sales: f64,
    pub total_sold_items: i64,
    pub total_not_sold_items: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryCountResponse {
    #[serde(rename = "_id")]
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitializeResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Requests and responses exchanged with the fetch tasks
// ---------------------------------------------------------------------------

/// The four result sets the dashboard keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Transactions,
    Statistics,
    BarChart,
    PieChart,
}

impl ResultKind {
    pub const ALL: [ResultKind; 4] = [
        ResultKind::Transactions,
        ResultKind::Statistics,
        ResultKind::BarChart,
        ResultKind::PieChart,
    ];

    fn index(self) -> usize {
        match self {
            ResultKind::Transactions => 0,
            ResultKind::Statistics => 1,
            ResultKind::BarChart => 2,
            ResultKind::PieChart => 3,
        }
    }
}

/// Parameters captured when a request is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub month: String,
    pub search: String,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub kind: ResultKind,
    pub generation: u64,
    pub params: QueryParams,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Transactions(Vec<TransactionRow>),
    Statistics(StatisticsResponse),
    BarChart(Vec<i64>),
    PieChart(Vec<CategoryCountResponse>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub kind: ResultKind,
    pub generation: u64,
    pub result: Result<Payload, String>,
}

/// Everything the fetch tasks report back to the UI loop.
#[derive(Debug)]
pub enum Message {
    Fetched(Response),
    Initialized(Result<String, String>),
}

/// What the UI loop should do after a key press.
#[derive(Debug, PartialEq)]
pub enum Command {
    None,
    Quit,
    Fetch(Vec<Request>),
    Initialize,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

pub const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

pub const DEFAULT_MONTH: &str = "March";

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Error(String),
    Connecting,
}

#[derive(Debug, Clone)]
pub struct AppState {
    month_index: usize,
    pub search: String,
    pub page: u32,
    pub per_page: u32,
    pub transactions: Vec<TransactionRow>,
    pub statistics: StatisticsResponse,
    pub bar_chart: Vec<i64>,
    pub pie_chart: Vec<CategoryCountResponse>,
    pub status: ConnectionStatus,
    pub notice: Option<String>,
    /// Latest issued generation per result kind. Responses carrying an older
    /// generation are dropped.
    generations: [u64; 4],
    /// Generation of the last successful response per kind.
    loaded: [u64; 4],
    /// Last error per kind, cleared when that kind next succeeds.
    failures: [Option<String>; 4],
    initialize_failure: Option<String>,
}

impl AppState {
    /// `initial_month` may be a month name or number; unknown values fall
    /// back to March.
    pub fn new(initial_month: &str, per_page: u32) -> Self {
        Self {
            month_index: month_index(initial_month).unwrap_or(2),
            search: String::new(),
            page: 1,
            per_page: per_page.max(1),
            transactions: Vec::new(),
            statistics: StatisticsResponse::default(),
            bar_chart: vec![0; PRICE_RANGE_LABELS.len()],
            pie_chart: Vec::new(),
            status: ConnectionStatus::Connecting,
            notice: None,
            generations: [0; 4],
            loaded: [0; 4],
            failures: Default::default(),
            initialize_failure: None,
        }
    }

    pub fn month(&self) -> &'static str {
        MONTHS[self.month_index]
    }

    pub fn params(&self) -> QueryParams {
        QueryParams {
            month: self.month().to_string(),
            search: self.search.clone(),
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Requests issued once when the dashboard first renders.
    pub fn mount(&mut self) -> Vec<Request> {
        self.refresh_all()
    }

    /// Issue all four reads with the current state.
    pub fn refresh_all(&mut self) -> Vec<Request> {
        ResultKind::ALL.iter().map(|&k| self.issue(k)).collect()
    }

    fn issue(&mut self, kind: ResultKind) -> Request {
        let slot = &mut self.generations[kind.index()];
        *slot += 1;
        Request {
            kind,
            generation: *slot,
            params: self.params(),
        }
    }

    pub fn set_month(&mut self, index: usize) -> Vec<Request> {
        self.month_index = index % MONTHS.len();
        self.page = 1;
        self.refresh_all()
    }

    pub fn next_month(&mut self) -> Vec<Request> {
        self.set_month(self.month_index + 1)
    }

    pub fn prev_month(&mut self) -> Vec<Request> {
        self.set_month(self.month_index + MONTHS.len() - 1)
    }

    pub fn push_search(&mut self, c: char) -> Vec<Request> {
        self.search.push(c);
        self.page = 1;
        self.refresh_all()
    }

    pub fn pop_search(&mut self) -> Vec<Request> {
        if self.search.pop().is_none() {
            return Vec::new();
        }
        self.page = 1;
        self.refresh_all()
    }

    /// Only the list is re-fetched on page moves. A short page means there is
    /// nothing after it. Rows left over from an earlier month or search say
    /// nothing about the current one, so wait for the current list.
    pub fn next_page(&mut self) -> Option<Request> {
        let list = ResultKind::Transactions.index();
        if self.loaded[list] != self.generations[list] {
            return None;
        }
        if (self.transactions.len() as u32) < self.per_page {
            return None;
        }
        self.page += 1;
        Some(self.issue(ResultKind::Transactions))
    }

    pub fn prev_page(&mut self) -> Option<Request> {
        if self.page <= 1 {
            return None;
        }
        self.page -= 1;
        Some(self.issue(ResultKind::Transactions))
    }

    /// Apply a fetch result. Returns false when the response was stale.
    pub fn apply(&mut self, response: Response) -> bool {
        let current = self.generations[response.kind.index()];
        if response.generation != current {
            debug!(
                kind = ?response.kind,
                generation = response.generation,
                current,
                "dropping stale response"
            );
            return false;
        }

        let slot = response.kind.index();
        match response.result {
            Ok(payload) => {
                match payload {
                    Payload::Transactions(rows) => self.transactions = rows,
                    Payload::Statistics(stats) => self.statistics = stats,
                    Payload::BarChart(counts) => self.bar_chart = counts,
                    Payload::PieChart(slices) => self.pie_chart = slices,
                }
                self.loaded[slot] = response.generation;
                self.failures[slot] = None;
            }
            Err(e) => {
                warn!(kind = ?response.kind, error = %e, "fetch failed, keeping previous data");
                self.failures[slot] = Some(e);
            }
        }
        self.refresh_status();
        true
    }

    /// Any outstanding failure wins over a later success from another kind.
    fn refresh_status(&mut self) {
        let failure = self
            .initialize_failure
            .iter()
            .chain(self.failures.iter().flatten())
            .next();
        self.status = match failure {
            Some(e) => ConnectionStatus::Error(e.clone()),
            None => ConnectionStatus::Connected,
        };
    }

    /// Outcome of `/initialize`. A successful reseed refreshes everything.
    pub fn apply_initialized(&mut self, result: Result<String, String>) -> Vec<Request> {
        match result {
            Ok(message) => {
                self.notice = Some(message);
                self.initialize_failure = None;
                self.refresh_status();
                self.page = 1;
                self.refresh_all()
            }
            Err(e) => {
                warn!(error = %e, "initialize failed");
                self.initialize_failure = Some(e);
                self.refresh_status();
                Vec::new()
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => Command::Quit,
            KeyCode::Char('c') if ctrl => Command::Quit,
            KeyCode::Left => Command::Fetch(self.prev_month()),
            KeyCode::Right => Command::Fetch(self.next_month()),
            KeyCode::PageDown => Command::Fetch(self.next_page().into_iter().collect()),
            KeyCode::PageUp => Command::Fetch(self.prev_page().into_iter().collect()),
            KeyCode::Backspace => Command::Fetch(self.pop_search()),
            KeyCode::F(5) => Command::Fetch(self.refresh_all()),
            KeyCode::F(2) => Command::Initialize,
            KeyCode::Char(c) if !ctrl => Command::Fetch(self.push_search(c)),
            _ => Command::None,
        }
    }
}

/// Month index (0-based) from a name, three-letter abbreviation or number.
pub fn month_index(raw: &str) -> Option<usize> {
    let s = raw.trim();
    if let Ok(n) = s.parse::<usize>() {
        return (1..=12).contains(&n).then(|| n - 1);
    }
    let lower = s.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS.iter().position(|m| {
        let m = m.to_lowercase();
        m == lower || (lower.len() == 3 && m.starts_with(&lower))
    })
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub const PRICE_RANGE_LABELS: [&str; 10] = [
    "0-100", "101-200", "201-300", "301-400", "401-500", "501-600", "601-700", "701-800",
    "801-900", "901+",
];

pub fn format_price(v: f64) -> String {
    format!("{v:.2}")
}

/// Date part of a `dateOfSale` value.
pub fn format_date(date_of_sale: &str) -> String {
    date_of_sale.chars().take(10).collect()
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
