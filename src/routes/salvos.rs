use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::ArticleCard,
    services::saves,
};

use super::{is_ajax, redirect_to_detail, AppState};

pub async fn toggle_salvo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let outcome = saves::toggle_save(state.store.as_ref(), user_id, id).await?;

    if is_ajax(&headers) {
        Ok(Json(outcome).into_response())
    } else {
        Ok(redirect_to_detail(id, Some(&outcome.message)).into_response())
    }
}

pub async fn toggle_salvo_get() -> AppError {
    AppError::Forbidden("Método não permitido.".to_string())
}

pub async fn minhas_salvas(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<ArticleCard>>> {
    let articles = saves::saved_articles(state.store.as_ref(), user_id).await?;
    Ok(Json(articles))
}
