use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{LoginInput, SignupInput, UserWithToken},
};

use super::AppState;

/// Creates an account and returns it already logged in
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupInput>,
) -> AppResult<(StatusCode, Json<UserWithToken>)> {
    let created = state.auth.signup(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<UserWithToken>> {
    let logged = state.auth.login(input).await?;
    Ok(Json(logged))
}
