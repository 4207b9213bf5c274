use axum::{
    http::{HeaderMap, StatusCode},
    middleware,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::{Cache, NewsStore},
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{AuthService, Summarizer},
};

pub mod auth;
pub mod noticias;
pub mod resumo;
pub mod salvos;
pub mod votos;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NewsStore>,
    pub cache: Option<Cache>,
    pub summarizer: Option<Arc<dyn Summarizer>>,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn NewsStore>,
        cache: Option<Cache>,
        summarizer: Option<Arc<dyn Summarizer>>,
        auth: AuthService,
    ) -> Self {
        Self {
            store,
            cache,
            summarizer,
            auth,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(noticias::index))
        .route("/recomendadas", get(noticias::recomendadas))
        .route("/noticia/:id", get(noticias::detalhe))
        .route("/noticia/:id/votar", get(votos::votar_get).post(votos::votar))
        .route(
            "/noticia/:id/toggle-salvo",
            get(salvos::toggle_salvo_get).post(salvos::toggle_salvo),
        )
        .route("/noticia/:id/resumir", post(resumo::resumir))
        .route("/minhas-salvas", get(salvos::minhas_salvas))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// True for requests sent by the page's scripts (`X-Requested-With: XMLHttpRequest`)
pub(crate) fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// 303 to the article page, optionally carrying a flash message
pub(crate) fn redirect_to_detail(article_id: i64, message: Option<&str>) -> Redirect {
    let mut location = format!("/noticia/{}", article_id);
    if let Some(message) = message {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("mensagem", message)
            .finish();
        location.push('?');
        location.push_str(&query);
    }
    Redirect::to(&location)
}
