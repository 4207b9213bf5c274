use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Query;

use crate::{
    error::AppResult,
    middleware::OptionalAuthUser,
    models::{ArticleDetail, FeedQuery, FeedResponse, Recommendations},
    services::{articles, feed, recommendations},
};

use super::AppState;

/// Home feed with subject/period filters and sort
pub async fn index(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<FeedResponse>> {
    let response = feed::build_feed(
        state.store.as_ref(),
        state.cache.as_ref(),
        &query,
        viewer,
    )
    .await?;
    Ok(Json(response))
}

pub async fn recomendadas(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
) -> AppResult<Json<Recommendations>> {
    let recs = recommendations::recommend_for(state.store.as_ref(), viewer).await?;
    Ok(Json(recs))
}

pub async fn detalhe(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ArticleDetail>> {
    let detail = articles::article_detail(state.store.as_ref(), id, viewer).await?;
    Ok(Json(detail))
}
