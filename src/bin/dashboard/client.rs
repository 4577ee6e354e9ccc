use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::{
    CategoryCountResponse, ErrorResponse, InitializeResponse, Message, Payload, Request, ResultKind,
    Response, StatisticsResponse, TransactionRow,
};

const HTTP_TIMEOUT_SECS: u64 = 5;

/// Thin wrapper over the server's read endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch(&self, req: &Request) -> Result<Payload, String> {
        let month = ("month", req.params.month.clone());
        match req.kind {
            ResultKind::Transactions => {
                let mut query = vec![
                    month,
                    ("page", req.params.page.to_string()),
                    ("perPage", req.params.per_page.to_string()),
                ];
                if !req.params.search.is_empty() {
                    query.push(("search", req.params.search.clone()));
                }
                self.get_json::<Vec<TransactionRow>>("/transactions", &query)
                    .await
                    .map(Payload::Transactions)
            }
            ResultKind::Statistics => self
                .get_json::<StatisticsResponse>("/statistics", &[month])
                .await
                .map(Payload::Statistics),
            ResultKind::BarChart => self
                .get_json::<Vec<i64>>("/bar-chart", &[month])
                .await
                .map(Payload::BarChart),
            ResultKind::PieChart => self
                .get_json::<Vec<CategoryCountResponse>>("/pie-chart", &[month])
                .await
                .map(Payload::PieChart),
        }
    }

    pub async fn initialize(&self) -> Result<String, String> {
        self.get_json::<InitializeResponse>("/initialize", &[])
            .await
            .map(|r| r.message)
    }

    /// Run `req` on its own task and report the outcome on `tx`.
    pub fn spawn_fetch(&self, req: Request, tx: UnboundedSender<Message>) {
        let client = self.clone();
        tokio::spawn(async move {
            let result = client.fetch(&req).await;
            // Receiver gone means the UI is shutting down.
            let _ = tx.send(Message::Fetched(Response {
                kind: req.kind,
                generation: req.generation,
                result,
            }));
        });
    }

    pub fn spawn_initialize(&self, tx: UnboundedSender<Message>) {
        let client = self.clone();
        tokio::spawn(async move {
            let result = client.initialize().await;
            let _ = tx.send(Message::Initialized(result));
        });
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, String> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| format!("{path}: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp
                .json::<ErrorResponse>()
                .await
                .map(|b| b.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(format!("{path}: {detail}"));
        }

        resp.json::<T>()
            .await
            .map_err(|e| format!("{path}: parse error: {e}"))
    }
}
