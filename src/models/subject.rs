use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A subject tag ("assunto") used for filtering and affinity matching
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Subject {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub slug: String,
}
