use crate::domain::values::day::Day;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An LLM-derived hot sector for one day. Natural key `(day, sector)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub day: Day,
    pub sector: String,
    /// Number of distinct articles referencing this sector. Computed by us,
    /// never trusted from the model.
    pub mention_count: u32,
    pub article_ids: Vec<String>,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl Topic {
    pub fn new(
        day: Day,
        sector: String,
        mention_count: u32,
        article_ids: Vec<String>,
        reason: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            day,
            sector,
            mention_count,
            article_ids,
            reason,
            created_at: Utc::now(),
        }
    }
}
