//! Liveness probe: reports the store size so an operator can tell whether
//! `/initialize` has run.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::routes::ApiState;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub transactions: i64,
}

pub async fn get_health(State(state): State<ApiState>) -> Result<Json<HealthResponse>, AppError> {
    let transactions = state.queries.total().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        transactions,
    }))
}
