use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::AppResult, models::SummaryResponse, services::summary};

use super::AppState;

/// Generates, stores and returns the article summary
pub async fn resumir(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SummaryResponse>> {
    let response =
        summary::summarize_article(state.store.as_ref(), state.summarizer.as_deref(), id).await?;
    Ok(Json(response))
}
