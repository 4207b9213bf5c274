use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const LABEL_SAVED: &str = "Retirar de Ver mais tarde";
pub const LABEL_UNSAVED: &str = "Ver mais tarde";

/// "Read later" bookmark of one article by one user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Save {
    pub id: i64,
    pub user_id: i64,
    pub article_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Result of toggling a save
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveOutcome {
    pub saved: bool,
    pub label: String,
    #[serde(skip_serializing, default)]
    pub message: String,
}

impl SaveOutcome {
    pub fn new(saved: bool) -> Self {
        let (label, message) = if saved {
            (LABEL_SAVED, "Salvo para ler mais tarde.")
        } else {
            (LABEL_UNSAVED, "Removido dos salvos.")
        };
        Self {
            saved,
            label: label.to_string(),
            message: message.to_string(),
        }
    }
}
