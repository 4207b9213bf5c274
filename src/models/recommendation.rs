use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::cmp::Ordering;

use super::ArticleCard;

/// Maximum size of the "para você" list
pub const RECOMMENDATION_LIMIT: usize = 8;

/// An unseen article sharing subjects with the user's history
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct AffinityCandidate {
    #[sqlx(flatten)]
    pub card: ArticleCard,
    /// Distinct subjects shared with the user's up-voted/saved articles
    pub match_count: i64,
}

impl AffinityCandidate {
    /// Matches desc, then score desc, then newest first. Id breaks exact ties.
    pub fn ranking_cmp(&self, other: &Self) -> Ordering {
        other
            .match_count
            .cmp(&self.match_count)
            .then_with(|| other.card.score.cmp(&self.card.score))
            .then_with(|| other.card.created_at.cmp(&self.card.created_at))
            .then_with(|| other.card.id.cmp(&self.card.id))
    }
}

/// Sorts candidates into recommendation order and keeps the first `limit`
pub fn rank_candidates(mut candidates: Vec<AffinityCandidate>, limit: usize) -> Vec<AffinityCandidate> {
    candidates.sort_by(AffinityCandidate::ranking_cmp);
    candidates.truncate(limit);
    candidates
}

/// Where a recommendation list came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    /// Ranked by subject affinity
    Afinidade,
    /// Most recent articles, used when there is no affinity signal
    Recentes,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendations {
    pub origem: RecommendationSource,
    pub noticias: Vec<ArticleCard>,
}
