use tracing::instrument;

use crate::{
    db::NewsStore,
    error::AppResult,
    models::{RecommendationSource, Recommendations, RECOMMENDATION_LIMIT},
};

/// Builds the "para você" list
///
/// Anonymous viewers get the latest articles. Signed-in users get unseen
/// articles sharing subjects with what they up-voted or saved, ranked by the
/// number of shared subjects, then score, then recency. When that yields
/// nothing, they get the latest articles they have not voted on or saved.
#[instrument(name = "recommendations.for_viewer", skip(store))]
pub async fn recommend_for(
    store: &dyn NewsStore,
    viewer: Option<i64>,
) -> AppResult<Recommendations> {
    let Some(user_id) = viewer else {
        return recent(store, None, None).await;
    };

    let subject_ids = store.affinity_subject_ids(user_id).await?;
    if subject_ids.is_empty() {
        tracing::debug!("No affinity signal, falling back to recent articles");
        return recent(store, viewer, viewer).await;
    }

    let candidates = store
        .affinity_candidates(user_id, &subject_ids, RECOMMENDATION_LIMIT)
        .await?;
    if candidates.is_empty() {
        tracing::debug!(
            subjects = subject_ids.len(),
            "Affinity query returned nothing, falling back to recent articles"
        );
        return recent(store, viewer, viewer).await;
    }

    Ok(Recommendations {
        origem: RecommendationSource::Afinidade,
        noticias: candidates.into_iter().map(|c| c.card).collect(),
    })
}

async fn recent(
    store: &dyn NewsStore,
    viewer: Option<i64>,
    unseen_by: Option<i64>,
) -> AppResult<Recommendations> {
    let noticias = store
        .recent_articles(viewer, unseen_by, RECOMMENDATION_LIMIT)
        .await?;
    Ok(Recommendations {
        origem: RecommendationSource::Recentes,
        noticias,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryNewsStore,
        models::{NewArticle, VoteValue},
    };
    use chrono::{Duration, Utc};

    struct Fixture {
        store: MemoryNewsStore,
        politica: i64,
        economia: i64,
        esportes: i64,
    }

    async fn fixture() -> Fixture {
        let store = MemoryNewsStore::new();
        let politica = store.create_subject("Política", "politica").await.unwrap().id;
        let economia = store.create_subject("Economia", "economia").await.unwrap().id;
        let esportes = store.create_subject("Esportes", "esportes").await.unwrap().id;
        Fixture {
            store,
            politica,
            economia,
            esportes,
        }
    }

    async fn article(store: &MemoryNewsStore, title: &str, subjects: &[i64], age_hours: i64) -> i64 {
        store
            .create_article(
                NewArticle::new(title, "...")
                    .with_subjects(subjects)
                    .created_at(Utc::now() - Duration::hours(age_hours)),
            )
            .await
            .unwrap()
            .id
    }

    fn ids(recs: &Recommendations) -> Vec<i64> {
        recs.noticias.iter().map(|c| c.id).collect()
    }

    #[tokio::test]
    async fn test_anonymous_gets_latest() {
        let f = fixture().await;
        for i in 0..10 {
            article(&f.store, &format!("N{i}"), &[], i).await;
        }

        let recs = recommend_for(&f.store, None).await.unwrap();
        assert_eq!(recs.origem, RecommendationSource::Recentes);
        assert_eq!(recs.noticias.len(), RECOMMENDATION_LIMIT);
        assert_eq!(recs.noticias[0].title, "N0");
    }

    #[tokio::test]
    async fn test_ranked_by_matches_then_score_then_recency() {
        let f = fixture().await;
        let s = &f.store;

        let liked = article(s, "Lida", &[f.politica, f.economia], 50).await;
        s.get_or_create_vote(1, liked, VoteValue::Up).await.unwrap();

        let both = article(s, "Ambos", &[f.politica, f.economia], 40).await;
        let popular = article(s, "Popular", &[f.economia], 30).await;
        let newest = article(s, "Nova", &[f.politica], 1).await;
        let older = article(s, "Antiga", &[f.politica], 20).await;
        let unrelated = article(s, "Esporte", &[f.esportes], 0).await;

        s.get_or_create_vote(2, popular, VoteValue::Up).await.unwrap();
        s.get_or_create_vote(3, popular, VoteValue::Up).await.unwrap();

        let recs = recommend_for(s, Some(1)).await.unwrap();
        assert_eq!(recs.origem, RecommendationSource::Afinidade);
        assert_eq!(ids(&recs), vec![both, popular, newest, older]);
        assert!(!ids(&recs).contains(&unrelated));
        assert!(!ids(&recs).contains(&liked));
    }

    #[tokio::test]
    async fn test_never_includes_seen_and_caps_at_limit() {
        let f = fixture().await;
        let s = &f.store;

        let saved = article(s, "Salva", &[f.esportes], 100).await;
        s.get_or_create_save(1, saved).await.unwrap();
        let downvoted = article(s, "Negativa", &[f.esportes], 90).await;
        s.get_or_create_vote(1, downvoted, VoteValue::Down).await.unwrap();

        for i in 0..12 {
            article(s, &format!("E{i}"), &[f.esportes], i).await;
        }

        let recs = recommend_for(s, Some(1)).await.unwrap();
        assert_eq!(recs.noticias.len(), RECOMMENDATION_LIMIT);
        assert!(!ids(&recs).contains(&saved));
        assert!(!ids(&recs).contains(&downvoted));
        assert!(recs.noticias.iter().all(|c| !c.is_saved));
    }

    #[tokio::test]
    async fn test_downvotes_are_not_a_signal() {
        let f = fixture().await;
        let s = &f.store;

        let disliked = article(s, "Ruim", &[f.politica], 10).await;
        s.get_or_create_vote(1, disliked, VoteValue::Down).await.unwrap();
        let other = article(s, "Outra", &[f.politica], 5).await;

        let recs = recommend_for(s, Some(1)).await.unwrap();
        assert_eq!(recs.origem, RecommendationSource::Recentes);
        assert_eq!(ids(&recs), vec![other]);
    }

    #[tokio::test]
    async fn test_empty_affinity_falls_back_to_unseen_recent() {
        let f = fixture().await;
        let s = &f.store;

        let saved = article(s, "Única de política", &[f.politica], 10).await;
        s.get_or_create_save(1, saved).await.unwrap();
        let sport = article(s, "Esporte", &[f.esportes], 1).await;

        let recs = recommend_for(s, Some(1)).await.unwrap();
        assert_eq!(recs.origem, RecommendationSource::Recentes);
        assert_eq!(ids(&recs), vec![sport]);
    }
}
