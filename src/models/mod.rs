pub mod article;
pub mod feed;
pub mod recommendation;
pub mod save;
pub mod subject;
pub mod user;
pub mod vote;

pub use article::{
    Article, ArticleCard, ArticleDetail, NewArticle, SummaryResponse, WeeklyTopArticle,
};
pub use feed::{ArticleFilter, FeedQuery, FeedResponse, Period, SortOrder};
pub use recommendation::{
    rank_candidates, AffinityCandidate, RecommendationSource, Recommendations,
    RECOMMENDATION_LIMIT,
};
pub use save::{Save, SaveOutcome};
pub use subject::Subject;
pub use user::{LoginInput, SignupInput, User, UserDto, UserWithToken};
pub use vote::{InvalidVote, Vote, VoteForm, VoteOutcome, VoteTally, VoteTransition, VoteValue};
