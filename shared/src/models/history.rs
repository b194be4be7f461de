//! Change history models

use serde::{Deserialize, Serialize};

/// Snapshot log action tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
}

/// Audited entity kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Client,
    Coach,
    Payment,
    Promotion,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Coach => "coach",
            Self::Payment => "payment",
            Self::Promotion => "promotion",
        }
    }
}

/// One snapshot of an entity after a change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct HistoryEntry {
    pub id: i64,
    pub entity_id: i64,
    pub action: HistoryAction,
    /// Serialized post-change state
    #[cfg_attr(feature = "db", sqlx(json))]
    pub changes: serde_json::Value,
    pub created_at: i64,
}

/// One changed field, as recorded in the structured changelog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct FieldChangeRecord {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub changed_at: i64,
}
