use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    db::NewsStore,
    error::{AppError, AppResult},
    models::{
        rank_candidates, AffinityCandidate, Article, ArticleCard, ArticleFilter, NewArticle, Save,
        SortOrder, Subject, User, Vote, VoteTally, VoteTransition, VoteValue, WeeklyTopArticle,
    },
};

/// Tables of the in-memory backend. Votes and saves are keyed by
/// `(user_id, article_id)`, which enforces the one-row-per-pair invariant.
#[derive(Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<i64, User>,
    subjects: BTreeMap<i64, Subject>,
    articles: BTreeMap<i64, Article>,
    article_subjects: BTreeMap<i64, BTreeSet<i64>>,
    votes: HashMap<(i64, i64), Vote>,
    saves: HashMap<(i64, i64), Save>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn article(&self, article_id: i64) -> AppResult<&Article> {
        self.articles
            .get(&article_id)
            .ok_or_else(|| AppError::NotFound("Notícia não encontrada".to_string()))
    }

    fn subjects_of(&self, article_id: i64) -> impl Iterator<Item = i64> + '_ {
        self.article_subjects
            .get(&article_id)
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    fn tally(&self, article_id: i64) -> VoteTally {
        self.votes
            .values()
            .filter(|v| v.article_id == article_id)
            .fold(VoteTally::default(), |mut tally, vote| {
                tally.score += i64::from(vote.value);
                match vote.value {
                    1 => tally.upvotes += 1,
                    -1 => tally.downvotes += 1,
                    _ => {}
                }
                tally
            })
    }

    fn has_seen(&self, user_id: i64, article_id: i64) -> bool {
        self.votes.contains_key(&(user_id, article_id))
            || self.saves.contains_key(&(user_id, article_id))
    }

    fn card(&self, article: &Article, viewer: Option<i64>) -> ArticleCard {
        ArticleCard {
            id: article.id,
            title: article.title.clone(),
            image_url: article.image_url.clone(),
            caption: article.caption.clone(),
            views: article.views,
            created_at: article.created_at,
            score: self.tally(article.id).score,
            is_saved: viewer
                .map(|user_id| self.saves.contains_key(&(user_id, article.id)))
                .unwrap_or(false),
        }
    }
}

fn newest_first(a: &ArticleCard, b: &ArticleCard) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
}

/// [`NewsStore`] kept entirely in process memory
///
/// Used for tests and for running the API without a database. All tables sit
/// behind one lock, so every operation is atomic.
#[derive(Clone, Default)]
pub struct MemoryNewsStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryNewsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl NewsStore for MemoryNewsStore {
    async fn create_subject(&self, name: &str, slug: &str) -> AppResult<Subject> {
        let mut tables = self.tables.write().await;
        if tables
            .subjects
            .values()
            .any(|s| s.name == name || s.slug == slug)
        {
            return Err(AppError::Conflict("Assunto já existe".to_string()));
        }

        let subject = Subject {
            id: tables.next_id(),
            name: name.to_string(),
            slug: slug.to_string(),
        };
        tables.subjects.insert(subject.id, subject.clone());
        Ok(subject)
    }

    async fn list_subjects(&self) -> AppResult<Vec<Subject>> {
        let tables = self.tables.read().await;
        let mut subjects: Vec<Subject> = tables.subjects.values().cloned().collect();
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }

    async fn article_subjects(&self, article_id: i64) -> AppResult<Vec<Subject>> {
        let tables = self.tables.read().await;
        let mut subjects: Vec<Subject> = tables
            .subjects_of(article_id)
            .filter_map(|id| tables.subjects.get(&id).cloned())
            .collect();
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }

    async fn create_article(&self, article: NewArticle) -> AppResult<Article> {
        let mut tables = self.tables.write().await;
        if let Some(missing) = article
            .subject_ids
            .iter()
            .find(|id| !tables.subjects.contains_key(*id))
        {
            return Err(AppError::InvalidInput(format!(
                "Referência inválida: assunto {} não existe",
                missing
            )));
        }

        let created = Article {
            id: tables.next_id(),
            title: article.title,
            body: article.body,
            image_url: article.image_url,
            caption: article.caption,
            summary: None,
            views: 0,
            created_at: article.created_at.unwrap_or_else(Utc::now),
        };
        tables
            .article_subjects
            .insert(created.id, article.subject_ids.into_iter().collect());
        tables.articles.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_article(&self, article_id: i64) -> AppResult<Option<Article>> {
        let tables = self.tables.read().await;
        Ok(tables.articles.get(&article_id).cloned())
    }

    async fn increment_views(&self, article_id: i64) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(article) = tables.articles.get_mut(&article_id) {
            article.views += 1;
        }
        Ok(())
    }

    async fn set_summary(&self, article_id: i64, summary: &str) -> AppResult<Article> {
        let mut tables = self.tables.write().await;
        let article = tables
            .articles
            .get_mut(&article_id)
            .ok_or_else(|| AppError::NotFound("Notícia não encontrada".to_string()))?;
        article.summary = Some(summary.to_string());
        Ok(article.clone())
    }

    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        viewer: Option<i64>,
    ) -> AppResult<Vec<ArticleCard>> {
        let tables = self.tables.read().await;

        let wanted: BTreeSet<i64> = tables
            .subjects
            .values()
            .filter(|s| filter.subject_slugs.contains(&s.slug))
            .map(|s| s.id)
            .collect();

        let mut cards: Vec<ArticleCard> = tables
            .articles
            .values()
            .filter(|a| {
                filter.subject_slugs.is_empty()
                    || tables.subjects_of(a.id).any(|id| wanted.contains(&id))
            })
            .filter(|a| filter.since.map_or(true, |since| a.created_at >= since))
            .map(|a| tables.card(a, viewer))
            .collect();

        match filter.sort {
            SortOrder::Popular => {
                cards.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| newest_first(a, b)))
            }
            SortOrder::Recent => cards.sort_by(newest_first),
        }
        Ok(cards)
    }

    async fn recent_articles(
        &self,
        viewer: Option<i64>,
        unseen_by: Option<i64>,
        limit: usize,
    ) -> AppResult<Vec<ArticleCard>> {
        let tables = self.tables.read().await;
        let mut cards: Vec<ArticleCard> = tables
            .articles
            .values()
            .filter(|a| unseen_by.map_or(true, |user_id| !tables.has_seen(user_id, a.id)))
            .map(|a| tables.card(a, viewer))
            .collect();
        cards.sort_by(newest_first);
        cards.truncate(limit);
        Ok(cards)
    }

    async fn weekly_top(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> AppResult<Vec<WeeklyTopArticle>> {
        let tables = self.tables.read().await;

        let mut weekly: BTreeMap<i64, (i64, i64, i64)> = BTreeMap::new();
        for vote in tables.votes.values().filter(|v| v.created_at >= since) {
            let entry = weekly.entry(vote.article_id).or_default();
            entry.0 += i64::from(vote.value);
            if vote.value == 1 {
                entry.1 += 1;
            } else {
                entry.2 += 1;
            }
        }

        let mut top: Vec<WeeklyTopArticle> = weekly
            .into_iter()
            .filter_map(|(article_id, (score, ups, downs))| {
                tables.articles.get(&article_id).map(|a| WeeklyTopArticle {
                    id: a.id,
                    title: a.title.clone(),
                    image_url: a.image_url.clone(),
                    created_at: a.created_at,
                    weekly_score: score,
                    weekly_upvotes: ups,
                    weekly_downvotes: downs,
                })
            })
            .collect();

        top.sort_by(|a, b| {
            b.weekly_score
                .cmp(&a.weekly_score)
                .then_with(|| b.weekly_upvotes.cmp(&a.weekly_upvotes))
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        top.truncate(limit);
        Ok(top)
    }

    async fn find_vote(&self, user_id: i64, article_id: i64) -> AppResult<Option<Vote>> {
        let tables = self.tables.read().await;
        Ok(tables.votes.get(&(user_id, article_id)).cloned())
    }

    async fn get_or_create_vote(
        &self,
        user_id: i64,
        article_id: i64,
        value: VoteValue,
    ) -> AppResult<(Vote, bool)> {
        let mut tables = self.tables.write().await;
        tables.article(article_id)?;

        if let Some(existing) = tables.votes.get(&(user_id, article_id)) {
            return Ok((existing.clone(), false));
        }

        let now = Utc::now();
        let vote = Vote {
            id: tables.next_id(),
            article_id,
            user_id,
            value: value.as_i32(),
            created_at: now,
            updated_at: now,
        };
        tables.votes.insert((user_id, article_id), vote.clone());
        Ok((vote, true))
    }

    async fn apply_vote(
        &self,
        user_id: i64,
        article_id: i64,
        requested: VoteValue,
    ) -> AppResult<VoteTransition> {
        let mut tables = self.tables.write().await;
        tables.article(article_id)?;

        let key = (user_id, article_id);
        let current = tables.votes.get(&key).and_then(Vote::direction);
        let transition = VoteTransition::resolve(current, requested);

        let now = Utc::now();
        match transition {
            VoteTransition::Cast(value) => {
                let vote = Vote {
                    id: tables.next_id(),
                    article_id,
                    user_id,
                    value: value.as_i32(),
                    created_at: now,
                    updated_at: now,
                };
                tables.votes.insert(key, vote);
            }
            VoteTransition::Withdraw => {
                tables.votes.remove(&key);
            }
            VoteTransition::Switch(value) => {
                if let Some(vote) = tables.votes.get_mut(&key) {
                    vote.value = value.as_i32();
                    vote.updated_at = now;
                }
            }
        }
        Ok(transition)
    }

    async fn vote_tally(&self, article_id: i64) -> AppResult<VoteTally> {
        let tables = self.tables.read().await;
        Ok(tables.tally(article_id))
    }

    async fn is_saved(&self, user_id: i64, article_id: i64) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.saves.contains_key(&(user_id, article_id)))
    }

    async fn get_or_create_save(&self, user_id: i64, article_id: i64) -> AppResult<(Save, bool)> {
        let mut tables = self.tables.write().await;
        tables.article(article_id)?;

        if let Some(existing) = tables.saves.get(&(user_id, article_id)) {
            return Ok((existing.clone(), false));
        }

        let save = Save {
            id: tables.next_id(),
            user_id,
            article_id,
            created_at: Utc::now(),
        };
        tables.saves.insert((user_id, article_id), save.clone());
        Ok((save, true))
    }

    async fn delete_save(&self, user_id: i64, article_id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.saves.remove(&(user_id, article_id)).is_some())
    }

    async fn saves_count(&self, article_id: i64) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .saves
            .values()
            .filter(|s| s.article_id == article_id)
            .count() as i64)
    }

    async fn saved_articles(&self, user_id: i64) -> AppResult<Vec<ArticleCard>> {
        let tables = self.tables.read().await;
        let mut saves: Vec<&Save> = tables
            .saves
            .values()
            .filter(|s| s.user_id == user_id)
            .collect();
        saves.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        Ok(saves
            .into_iter()
            .filter_map(|s| tables.articles.get(&s.article_id))
            .map(|a| tables.card(a, Some(user_id)))
            .collect())
    }

    async fn affinity_subject_ids(&self, user_id: i64) -> AppResult<Vec<i64>> {
        let tables = self.tables.read().await;
        let liked = tables
            .votes
            .values()
            .filter(|v| v.user_id == user_id && v.value == 1)
            .map(|v| v.article_id);
        let saved = tables
            .saves
            .values()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.article_id);

        let subjects: BTreeSet<i64> = liked
            .chain(saved)
            .flat_map(|article_id| tables.subjects_of(article_id))
            .collect();
        Ok(subjects.into_iter().collect())
    }

    async fn affinity_candidates(
        &self,
        user_id: i64,
        subject_ids: &[i64],
        limit: usize,
    ) -> AppResult<Vec<AffinityCandidate>> {
        let tables = self.tables.read().await;
        let wanted: BTreeSet<i64> = subject_ids.iter().copied().collect();

        let candidates = tables
            .articles
            .values()
            .filter(|a| !tables.has_seen(user_id, a.id))
            .filter_map(|a| {
                let match_count = tables
                    .subjects_of(a.id)
                    .filter(|id| wanted.contains(id))
                    .count() as i64;
                (match_count > 0).then(|| AffinityCandidate {
                    card: tables.card(a, Some(user_id)),
                    match_count,
                })
            })
            .collect();

        Ok(rank_candidates(candidates, limit))
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(AppError::Conflict("Nome de usuário já existe.".to_string()));
        }

        let user = User {
            id: tables.next_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&user_id).cloned())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn seeded() -> (MemoryNewsStore, Subject, Subject) {
        let store = MemoryNewsStore::new();
        let tec = store.create_subject("Tecnologia", "tecnologia").await.unwrap();
        let esp = store.create_subject("Esportes", "esportes").await.unwrap();
        (store, tec, esp)
    }

    #[tokio::test]
    async fn test_subjects_are_unique_and_sorted() {
        let (store, _, _) = seeded().await;
        let dup = store.create_subject("Tecnologia", "outro-slug").await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));

        let names: Vec<String> = store
            .list_subjects()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Esportes", "Tecnologia"]);
    }

    #[tokio::test]
    async fn test_create_article_rejects_unknown_subject() {
        let store = MemoryNewsStore::new();
        let result = store
            .create_article(NewArticle::new("T", "B").with_subjects(&[99]))
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_get_or_create_vote_keeps_one_row() {
        let (store, tec, _) = seeded().await;
        let article = store
            .create_article(NewArticle::new("N1", "...").with_subjects(&[tec.id]))
            .await
            .unwrap();

        let (first, created) = store
            .get_or_create_vote(1, article.id, VoteValue::Up)
            .await
            .unwrap();
        assert!(created);

        let (second, created) = store
            .get_or_create_vote(1, article.id, VoteValue::Down)
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
        assert_eq!(second.value, 1);
    }

    #[tokio::test]
    async fn test_apply_vote_walks_the_state_machine() {
        let (store, tec, _) = seeded().await;
        let article = store
            .create_article(NewArticle::new("N2", "...").with_subjects(&[tec.id]))
            .await
            .unwrap();

        let cast = store.apply_vote(1, article.id, VoteValue::Up).await.unwrap();
        assert_eq!(cast, VoteTransition::Cast(VoteValue::Up));
        let id = store.find_vote(1, article.id).await.unwrap().unwrap().id;

        let switch = store.apply_vote(1, article.id, VoteValue::Down).await.unwrap();
        assert_eq!(switch, VoteTransition::Switch(VoteValue::Down));
        let switched = store.find_vote(1, article.id).await.unwrap().unwrap();
        assert_eq!((switched.id, switched.value), (id, -1));

        let withdraw = store.apply_vote(1, article.id, VoteValue::Down).await.unwrap();
        assert_eq!(withdraw, VoteTransition::Withdraw);
        assert!(store.find_vote(1, article.id).await.unwrap().is_none());

        let unknown = store.apply_vote(1, 999, VoteValue::Up).await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_filters_by_slug_and_period() {
        let (store, tec, esp) = seeded().await;
        let old = Utc::now() - Duration::days(40);
        store
            .create_article(NewArticle::new("Tec nova", "...").with_subjects(&[tec.id]))
            .await
            .unwrap();
        store
            .create_article(
                NewArticle::new("Tec antiga", "...")
                    .with_subjects(&[tec.id, esp.id])
                    .created_at(old),
            )
            .await
            .unwrap();
        store
            .create_article(NewArticle::new("Esp nova", "...").with_subjects(&[esp.id]))
            .await
            .unwrap();

        let filter = ArticleFilter {
            subject_slugs: vec!["tecnologia".to_string()],
            ..Default::default()
        };
        let titles: Vec<String> = store
            .list_articles(&filter, None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["Tec nova", "Tec antiga"]);

        let filter = ArticleFilter {
            subject_slugs: vec!["tecnologia".to_string(), "esportes".to_string()],
            since: Some(Utc::now() - Duration::days(30)),
            ..Default::default()
        };
        let cards = store.list_articles(&filter, None).await.unwrap();
        assert_eq!(cards.len(), 2);
        assert!(cards.iter().all(|c| c.title.ends_with("nova")));
    }

    #[tokio::test]
    async fn test_weekly_top_counts_only_recent_votes() {
        let (store, tec, _) = seeded().await;
        let a = store
            .create_article(NewArticle::new("A", "...").with_subjects(&[tec.id]))
            .await
            .unwrap();
        let b = store
            .create_article(NewArticle::new("B", "...").with_subjects(&[tec.id]))
            .await
            .unwrap();
        store.create_article(NewArticle::new("C", "...")).await.unwrap();

        store.get_or_create_vote(1, a.id, VoteValue::Up).await.unwrap();
        store.get_or_create_vote(1, b.id, VoteValue::Up).await.unwrap();
        store.get_or_create_vote(2, b.id, VoteValue::Up).await.unwrap();
        store.get_or_create_vote(3, a.id, VoteValue::Down).await.unwrap();

        let top = store
            .weekly_top(Utc::now() - Duration::days(7), 3)
            .await
            .unwrap();
        let ids: Vec<i64> = top.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
        assert_eq!(top[0].weekly_score, 2);
        assert_eq!(top[1].weekly_upvotes, 1);
        assert_eq!(top[1].weekly_downvotes, 1);

        let none = store
            .weekly_top(Utc::now() + Duration::days(1), 3)
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
