use tracing::instrument;

use crate::{
    db::NewsStore,
    error::{AppError, AppResult},
    models::SummaryResponse,
    services::summarizers::{build_prompt, Summarizer},
};

/// Used whenever no usable generated summary is available
pub const FALLBACK_SUMMARY: &str = "Resumo gerado automaticamente para testes E2E BRASA. \
     Este texto é usado apenas para validação de interface e integração.";

/// Generated text must be longer than this, after trimming, to be kept
pub const MIN_SUMMARY_CHARS: usize = 30;

/// Generates and stores the summary of an article
///
/// The summarizer is optional; when it is missing, fails, or returns text that
/// is too short, [`FALLBACK_SUMMARY`] is stored instead. Only storage errors and
/// an unknown article fail the call.
#[instrument(name = "summary.generate", skip(store, summarizer))]
pub async fn summarize_article(
    store: &dyn NewsStore,
    summarizer: Option<&dyn Summarizer>,
    article_id: i64,
) -> AppResult<SummaryResponse> {
    let article = store
        .find_article(article_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notícia não encontrada".to_string()))?;

    let generated = match summarizer {
        Some(summarizer) => {
            let prompt = build_prompt(&article.title, &article.body);
            match summarizer.summarize(&prompt).await {
                Ok(text) => accept(&text),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        summarizer = summarizer.name(),
                        "Summarizer failed, using fallback"
                    );
                    None
                }
            }
        }
        None => None,
    };

    let summary = match generated {
        Some(text) => text,
        None => {
            tracing::info!(article_id, "Storing fallback summary");
            FALLBACK_SUMMARY.to_string()
        }
    };

    let article = store.set_summary(article_id, &summary).await?;
    Ok(SummaryResponse::ok(article.summary.unwrap_or(summary)))
}

fn accept(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.chars().count() > MIN_SUMMARY_CHARS {
        Some(trimmed.to_string())
    } else {
        tracing::warn!(chars = trimmed.chars().count(), "Generated summary too short");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryNewsStore,
        models::NewArticle,
        services::summarizers::MockSummarizer,
    };

    async fn store_with_article() -> (MemoryNewsStore, i64) {
        let store = MemoryNewsStore::new();
        let article = store
            .create_article(NewArticle::new("Eleições", "Resultado apurado no domingo."))
            .await
            .unwrap();
        (store, article.id)
    }

    #[tokio::test]
    async fn test_uses_generated_text_when_long_enough() {
        let (store, id) = store_with_article().await;
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .withf(|prompt| prompt.contains("Título: Eleições"))
            .times(1)
            .returning(|_| Ok("  Resultado das eleições foi apurado no domingo à noite.  ".to_string()));

        let response = summarize_article(&store, Some(&summarizer as &dyn Summarizer), id).await.unwrap();
        assert_eq!(response.status, "ok");
        assert_eq!(
            response.resumo,
            "Resultado das eleições foi apurado no domingo à noite."
        );

        let stored = store.find_article(id).await.unwrap().unwrap();
        assert_eq!(stored.summary.as_deref(), Some(response.resumo.as_str()));
    }

    #[tokio::test]
    async fn test_short_text_falls_back() {
        let (store, id) = store_with_article().await;
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .returning(|_| Ok("curto demais".to_string()));

        let response = summarize_article(&store, Some(&summarizer as &dyn Summarizer), id).await.unwrap();
        assert_eq!(response.resumo, FALLBACK_SUMMARY);
    }

    #[tokio::test]
    async fn test_summarizer_error_falls_back() {
        let (store, id) = store_with_article().await;
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .returning(|_| Err(AppError::ExternalApi("quota".to_string())));
        summarizer.expect_name().return_const("mock");

        let response = summarize_article(&store, Some(&summarizer as &dyn Summarizer), id).await.unwrap();
        assert_eq!(response.resumo, FALLBACK_SUMMARY);
    }

    #[tokio::test]
    async fn test_missing_summarizer_falls_back() {
        let (store, id) = store_with_article().await;
        let response = summarize_article(&store, None, id).await.unwrap();
        assert_eq!(response.resumo, FALLBACK_SUMMARY);
    }

    #[tokio::test]
    async fn test_unknown_article() {
        let store = MemoryNewsStore::new();
        let result = summarize_article(&store, None, 404).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
