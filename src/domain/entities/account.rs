use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A source account articles are pulled from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    /// Last time a list fetch for this account succeeded.
    pub last_fetch_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            enabled: true,
            last_fetch_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
