use chrono::{Duration, Utc};
use tracing::instrument;

use crate::{
    cached,
    db::{
        redis::{SUBJECTS_TTL, WEEKLY_TOP_TTL},
        Cache, CacheKey, NewsStore,
    },
    error::AppResult,
    models::{ArticleFilter, FeedQuery, FeedResponse, Subject, WeeklyTopArticle},
    services::recommendations::recommend_for,
};

pub const WEEKLY_TOP_LIMIT: usize = 3;

/// Articles most voted in the last 7 days, read through the cache when present
#[instrument(name = "feed.weekly_top", skip(store, cache))]
pub async fn weekly_top(
    store: &dyn NewsStore,
    cache: Option<&Cache>,
) -> AppResult<Vec<WeeklyTopArticle>> {
    cached!(cache, CacheKey::WeeklyTop, WEEKLY_TOP_TTL, async {
        let since = Utc::now() - Duration::days(7);
        store.weekly_top(since, WEEKLY_TOP_LIMIT).await
    })
}

pub async fn subjects(store: &dyn NewsStore, cache: Option<&Cache>) -> AppResult<Vec<Subject>> {
    cached!(cache, CacheKey::Subjects, SUBJECTS_TTL, async {
        store.list_subjects().await
    })
}

/// Assembles the home page: filtered listing, subjects, weekly top 3 and
/// recommendations
#[instrument(name = "feed.build", skip(store, cache))]
pub async fn build_feed(
    store: &dyn NewsStore,
    cache: Option<&Cache>,
    query: &FeedQuery,
    viewer: Option<i64>,
) -> AppResult<FeedResponse> {
    let filter = ArticleFilter::from_query(query, Utc::now());

    let noticias = store.list_articles(&filter, viewer).await?;
    let assuntos = subjects(store, cache).await?;
    let top3 = weekly_top(store, cache).await?;
    let recomendadas = recommend_for(store, viewer).await?;

    tracing::debug!(
        results = noticias.len(),
        subjects = filter.subject_slugs.len(),
        sort = filter.sort.as_str(),
        "Feed built"
    );

    Ok(FeedResponse {
        noticias,
        assuntos,
        selecionados: filter.subject_slugs,
        periodo: query.periodo.clone().unwrap_or_default(),
        sort: filter.sort.as_str().to_string(),
        top3,
        recomendadas,
    })
}
