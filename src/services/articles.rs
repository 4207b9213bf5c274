use tracing::instrument;

use crate::{
    db::NewsStore,
    error::{AppError, AppResult},
    models::ArticleDetail,
};

/// Loads an article page and counts the view
#[instrument(name = "articles.detail", skip(store))]
pub async fn article_detail(
    store: &dyn NewsStore,
    article_id: i64,
    viewer: Option<i64>,
) -> AppResult<ArticleDetail> {
    store.increment_views(article_id).await?;
    let article = store
        .find_article(article_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notícia não encontrada".to_string()))?;
    let subjects = store.article_subjects(article_id).await?;
    let tally = store.vote_tally(article_id).await?;
    let salvos_count = store.saves_count(article_id).await?;

    let (voto_usuario, is_saved) = match viewer {
        Some(user_id) => {
            let vote = store.find_vote(user_id, article_id).await?;
            (
                vote.map(|v| v.value).unwrap_or(0),
                store.is_saved(user_id, article_id).await?,
            )
        }
        None => (0, false),
    };

    Ok(ArticleDetail {
        article,
        subjects,
        score: tally.score,
        up: tally.upvotes,
        down: tally.downvotes,
        voto_usuario,
        is_saved,
        salvos_count,
    })
}
