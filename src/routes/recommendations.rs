use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{RecsResponse, UserId},
    routes::AppState,
    services::offline::UsageStats,
};

#[derive(Debug, Deserialize)]
pub struct RecsQuery {
    pub user_id: UserId,
    pub k: Option<usize>,
}

impl RecsQuery {
    fn k_or(&self, default_k: usize) -> AppResult<usize> {
        match self.k.unwrap_or(default_k) {
            0 => Err(AppError::InvalidInput("k must be at least 1".to_string())),
            k => Ok(k),
        }
    }
}

/// Offline recommendations: personal list or the default top tracks
pub async fn offline(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecsQuery>,
) -> AppResult<Json<RecsResponse>> {
    let k = query.k_or(state.default_k)?;
    let recs = state.recommendations.resolve_offline(query.user_id, k);

    tracing::info!(count = recs.len(), "Recommendations served");

    Ok(Json(RecsResponse { recs }))
}

/// Online recommendations from recent events and similar items
pub async fn online(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecsQuery>,
) -> AppResult<Json<RecsResponse>> {
    let k = query.k_or(state.default_k)?;
    let recs = state.recommendations.resolve_online(query.user_id, k).await;

    tracing::info!(count = recs.len(), "Recommendations served");

    Ok(Json(RecsResponse { recs }))
}

/// Blended recommendations: online and offline interleaved
pub async fn blended(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecsQuery>,
) -> AppResult<Json<RecsResponse>> {
    let k = query.k_or(state.default_k)?;
    let recs = state.recommendations.resolve_blended(query.user_id, k).await;

    tracing::info!(count = recs.len(), "Recommendations served");

    Ok(Json(RecsResponse { recs }))
}

/// Offline table usage counters
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<UsageStats> {
    Json(state.recommendations.stats())
}
