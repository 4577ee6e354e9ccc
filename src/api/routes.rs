use axum::{
    extract::{Query, State},
    http::HeaderName,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Month;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::api::health::get_health;
use crate::config::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use crate::error::AppError;
use crate::query::{parse_month, Page, QueryService, TransactionFilter};
use crate::seed::SeedLoader;
use crate::types::{CategoryCount, CombinedSummary, Statistics};

/// Size of the whole filtered set behind a `/transactions` page.
pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

#[derive(Clone)]
pub struct ApiState {
    pub queries: QueryService,
    pub seeder: SeedLoader,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/initialize", get(initialize))
        .route("/transactions", get(get_transactions))
        .route("/statistics", get(get_statistics))
        .route("/bar-chart", get(get_bar_chart))
        .route("/pie-chart", get(get_pie_chart))
        .route("/combined", get(get_combined))
        .route("/health", get(get_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub month: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

#[derive(Serialize)]
pub struct InitializeResponse {
    pub message: String,
}

fn required_month(raw: Option<&str>) -> Result<Month, AppError> {
    let raw = raw.ok_or_else(|| AppError::BadRequest("month query parameter is required".to_string()))?;
    parse_month(raw)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn initialize(State(state): State<ApiState>) -> Result<Json<InitializeResponse>, AppError> {
    let inserted = state.seeder.load().await?;
    info!(inserted, "initialize completed");
    Ok(Json(InitializeResponse {
        message: format!("Database initialized with {inserted} transactions"),
    }))
}

async fn get_transactions(
    State(state): State<ApiState>,
    Query(params): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let month = required_month(params.month.as_deref())?;
    let filter = TransactionFilter::month(month).with_search(params.search.as_deref());
    let page = Page::new(params.page, params.per_page, DEFAULT_PER_PAGE, MAX_PER_PAGE);

    let result = state.queries.list(&filter, page).await?;

    Ok(([(TOTAL_COUNT_HEADER, result.total.to_string())], Json(result.items)))
}

async fn get_statistics(
    State(state): State<ApiState>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<Statistics>, AppError> {
    let month = required_month(params.month.as_deref())?;
    Ok(Json(state.queries.statistics(month).await?))
}

async fn get_bar_chart(
    State(state): State<ApiState>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<Vec<i64>>, AppError> {
    let month = required_month(params.month.as_deref())?;
    Ok(Json(state.queries.bar_chart(month).await?))
}

async fn get_pie_chart(
    State(state): State<ApiState>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<Vec<CategoryCount>>, AppError> {
    let month = required_month(params.month.as_deref())?;
    Ok(Json(state.queries.pie_chart(month).await?))
}

async fn get_combined(
    State(state): State<ApiState>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<CombinedSummary>, AppError> {
    let month = required_month(params.month.as_deref())?;
    Ok(Json(state.queries.combined(month).await?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
