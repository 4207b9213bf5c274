use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Subject;

/// A news article ("notícia") as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Article {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "conteudo")]
    pub body: String,
    #[serde(rename = "imagem")]
    pub image_url: Option<String>,
    #[serde(rename = "legenda")]
    pub caption: Option<String>,
    /// Cached AI summary, filled by the summary endpoint
    #[serde(rename = "resumo")]
    pub summary: Option<String>,
    #[serde(rename = "visualizacoes")]
    pub views: i64,
    #[serde(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
}

/// Input for creating an article
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub caption: Option<String>,
    pub subject_ids: Vec<i64>,
    /// Overrides the creation timestamp, defaults to now
    pub created_at: Option<DateTime<Utc>>,
}

impl NewArticle {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_subjects(mut self, subject_ids: &[i64]) -> Self {
        self.subject_ids = subject_ids.to_vec();
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Compact article row used by every list (feed, saved, recommendations)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct ArticleCard {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "imagem")]
    pub image_url: Option<String>,
    #[serde(rename = "legenda")]
    pub caption: Option<String>,
    #[serde(rename = "visualizacoes")]
    pub views: i64,
    #[serde(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
    /// Sum of vote values, 0 without votes
    pub score: i64,
    pub is_saved: bool,
}

/// Weekly ranking entry, scored only by votes cast in the window
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct WeeklyTopArticle {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "imagem")]
    pub image_url: Option<String>,
    #[serde(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "score_semanal")]
    pub weekly_score: i64,
    #[serde(rename = "ups_semana")]
    pub weekly_upvotes: i64,
    #[serde(rename = "downs_semana")]
    pub weekly_downvotes: i64,
}

/// Everything the article page shows
#[derive(Debug, Clone, Serialize)]
pub struct ArticleDetail {
    #[serde(rename = "noticia")]
    pub article: Article,
    #[serde(rename = "assuntos")]
    pub subjects: Vec<Subject>,
    pub score: i64,
    pub up: i64,
    pub down: i64,
    /// The viewer's vote: -1, 0 or 1
    pub voto_usuario: i32,
    pub is_saved: bool,
    pub salvos_count: i64,
}

/// Response of the summary endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryResponse {
    pub status: String,
    pub resumo: String,
}

impl SummaryResponse {
    pub fn ok(resumo: String) -> Self {
        Self {
            status: "ok".to_string(),
            resumo,
        }
    }
}
