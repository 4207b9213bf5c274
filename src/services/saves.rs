use tracing::instrument;

use crate::{
    db::NewsStore,
    error::{AppError, AppResult},
    models::{ArticleCard, SaveOutcome},
};

/// Flips the saved state of an article for a user
#[instrument(name = "saves.toggle", skip(store))]
pub async fn toggle_save(
    store: &dyn NewsStore,
    user_id: i64,
    article_id: i64,
) -> AppResult<SaveOutcome> {
    if store.find_article(article_id).await?.is_none() {
        return Err(AppError::NotFound("Notícia não encontrada".to_string()));
    }

    let saved = if store.delete_save(user_id, article_id).await? {
        false
    } else {
        store.get_or_create_save(user_id, article_id).await?;
        true
    };

    tracing::info!(saved, "Save toggled");
    Ok(SaveOutcome::new(saved))
}

/// The user's saved articles, most recently saved first
pub async fn saved_articles(store: &dyn NewsStore, user_id: i64) -> AppResult<Vec<ArticleCard>> {
    store.saved_articles(user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::MemoryNewsStore, models::NewArticle};

    #[tokio::test]
    async fn test_toggle_flips_state() {
        let store = MemoryNewsStore::new();
        let article = store
            .create_article(NewArticle::new("Economia", "..."))
            .await
            .unwrap();

        let first = toggle_save(&store, 7, article.id).await.unwrap();
        assert!(first.saved);
        assert!(store.is_saved(7, article.id).await.unwrap());

        let second = toggle_save(&store, 7, article.id).await.unwrap();
        assert!(!second.saved);
        assert!(!store.is_saved(7, article.id).await.unwrap());
        assert_eq!(store.saves_count(article.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_saved_articles_most_recent_first() {
        let store = MemoryNewsStore::new();
        let a = store.create_article(NewArticle::new("A", "...")).await.unwrap();
        let b = store.create_article(NewArticle::new("B", "...")).await.unwrap();

        toggle_save(&store, 1, b.id).await.unwrap();
        toggle_save(&store, 1, a.id).await.unwrap();

        let ids: Vec<i64> = saved_articles(&store, 1)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_unknown_article() {
        let store = MemoryNewsStore::new();
        let result = toggle_save(&store, 1, 42).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
