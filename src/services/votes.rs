use tracing::instrument;

use crate::{
    db::NewsStore,
    error::{AppError, AppResult},
    models::{VoteOutcome, VoteValue},
};

/// Parses the raw `valor` form field
pub fn parse_vote(raw: Option<&str>) -> AppResult<VoteValue> {
    raw.ok_or(crate::models::InvalidVote)
        .and_then(str::parse::<VoteValue>)
        .map_err(|e| AppError::InvalidInput(e.to_string()))
}

/// Applies a vote request to the (user, article) pair
///
/// No vote: one is cast. Same value again: the vote is withdrawn. Opposite
/// value: the vote is switched in place. Returns the viewer's resulting vote
/// and the article's recomputed tally.
#[instrument(name = "votes.toggle", skip(store))]
pub async fn toggle_vote(
    store: &dyn NewsStore,
    user_id: i64,
    article_id: i64,
    requested: VoteValue,
) -> AppResult<VoteOutcome> {
    if store.find_article(article_id).await?.is_none() {
        return Err(AppError::NotFound("Notícia não encontrada".to_string()));
    }

    let transition = store.apply_vote(user_id, article_id, requested).await?;

    let tally = store.vote_tally(article_id).await?;
    let state = transition.resulting_state();

    tracing::info!(?transition, score = tally.score, "Vote applied");

    Ok(VoteOutcome::new(tally, state))
}
