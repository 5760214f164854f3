//! Reporting endpoints

use axum::{extract::State, Json};
use chrono::Utc;

use crate::{error::AppResult, services::stats::Metrics, AppState};

use super::AuthenticatedOperator;

/// Aggregate circulation metrics
#[utoipa::path(
    get,
    path = "/admin/metrics",
    tag = "reporting",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current metrics", body = Metrics)
    )
)]
pub async fn get_metrics(
    State(state): State<AppState>,
    _operator: AuthenticatedOperator,
) -> AppResult<Json<Metrics>> {
    let metrics = state.services.stats.metrics(Utc::now()).await?;
    Ok(Json(metrics))
}
