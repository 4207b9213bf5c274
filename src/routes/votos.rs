use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};

use crate::{
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::VoteForm,
    services::votes,
};

use super::{is_ajax, redirect_to_detail, AppState};

/// Toggles the caller's vote; JSON for AJAX callers, a redirect otherwise
pub async fn votar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    headers: HeaderMap,
    form: Option<Form<VoteForm>>,
) -> AppResult<Response> {
    if state.store.find_article(id).await?.is_none() {
        return Err(AppError::NotFound("Notícia não encontrada".to_string()));
    }

    let form = form.map(|Form(form)| form).unwrap_or_default();
    let ajax = is_ajax(&headers);

    let value = match votes::parse_vote(form.valor.as_deref()) {
        Ok(value) => value,
        Err(e) if !ajax => {
            tracing::debug!(error = %e, "Rejected vote from form post");
            return Ok(redirect_to_detail(id, Some("Voto inválido.")).into_response());
        }
        Err(e) => return Err(e),
    };

    let outcome = votes::toggle_vote(state.store.as_ref(), user_id, id, value).await?;

    if ajax {
        Ok(Json(outcome).into_response())
    } else {
        Ok(redirect_to_detail(id, None).into_response())
    }
}

/// Votes are only cast by POST; a plain visit goes back to the article
pub async fn votar_get(Path(id): Path<i64>) -> Redirect {
    redirect_to_detail(id, None)
}
