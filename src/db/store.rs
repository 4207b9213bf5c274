//! Storage abstraction for the portal
//!
//! Every handler and service talks to a `dyn NewsStore`, so the same logic runs
//! against PostgreSQL in production and against the in-memory backend in tests
//! and local development.
use chrono::{DateTime, Utc};

use crate::{
    error::AppResult,
    models::{
        AffinityCandidate, Article, ArticleCard, ArticleFilter, NewArticle, Save, Subject, User,
        Vote, VoteTally, VoteTransition, VoteValue, WeeklyTopArticle,
    },
};

#[async_trait::async_trait]
pub trait NewsStore: Send + Sync {
    // Subjects

    async fn create_subject(&self, name: &str, slug: &str) -> AppResult<Subject>;

    /// All subjects ordered by name
    async fn list_subjects(&self) -> AppResult<Vec<Subject>>;

    async fn article_subjects(&self, article_id: i64) -> AppResult<Vec<Subject>>;

    // Articles

    async fn create_article(&self, article: NewArticle) -> AppResult<Article>;

    async fn find_article(&self, article_id: i64) -> AppResult<Option<Article>>;

    async fn increment_views(&self, article_id: i64) -> AppResult<()>;

    async fn set_summary(&self, article_id: i64, summary: &str) -> AppResult<Article>;

    /// Filtered feed. `viewer` only drives the `is_saved` flag.
    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        viewer: Option<i64>,
    ) -> AppResult<Vec<ArticleCard>>;

    /// Newest articles first. With `unseen_by`, articles that user voted on or
    /// saved are left out.
    async fn recent_articles(
        &self,
        viewer: Option<i64>,
        unseen_by: Option<i64>,
        limit: usize,
    ) -> AppResult<Vec<ArticleCard>>;

    /// Articles ranked by the votes they received since `since`
    async fn weekly_top(&self, since: DateTime<Utc>, limit: usize)
        -> AppResult<Vec<WeeklyTopArticle>>;

    // Votes

    async fn find_vote(&self, user_id: i64, article_id: i64) -> AppResult<Option<Vote>>;

    /// Returns the existing vote, or inserts one with `value`. The flag is true
    /// when this call created the row.
    async fn get_or_create_vote(
        &self,
        user_id: i64,
        article_id: i64,
        value: VoteValue,
    ) -> AppResult<(Vote, bool)>;

    /// Resolves `requested` against the stored vote and applies the result
    /// (cast, withdraw or switch) as one atomic step. Concurrent requests for
    /// the same pair behave as if they ran one after the other.
    async fn apply_vote(
        &self,
        user_id: i64,
        article_id: i64,
        requested: VoteValue,
    ) -> AppResult<VoteTransition>;

    async fn vote_tally(&self, article_id: i64) -> AppResult<VoteTally>;

    // Saves

    async fn is_saved(&self, user_id: i64, article_id: i64) -> AppResult<bool>;

    async fn get_or_create_save(&self, user_id: i64, article_id: i64) -> AppResult<(Save, bool)>;

    async fn delete_save(&self, user_id: i64, article_id: i64) -> AppResult<bool>;

    async fn saves_count(&self, article_id: i64) -> AppResult<i64>;

    /// The user's saved articles, most recently saved first
    async fn saved_articles(&self, user_id: i64) -> AppResult<Vec<ArticleCard>>;

    // Recommendations

    /// Subjects of the articles the user up-voted or saved
    async fn affinity_subject_ids(&self, user_id: i64) -> AppResult<Vec<i64>>;

    /// Unseen articles tagged with any of `subject_ids`, ranked and capped
    async fn affinity_candidates(
        &self,
        user_id: i64,
        subject_ids: &[i64],
        limit: usize,
    ) -> AppResult<Vec<AffinityCandidate>>;

    // Users

    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User>;

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn find_user_by_id(&self, user_id: i64) -> AppResult<Option<User>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
