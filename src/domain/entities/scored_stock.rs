use crate::domain::values::decision::DecisionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pool-2 result: the rule engine's verdict for one pool-1 candidate (1:1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredStock {
    pub id: String,
    pub pool1_id: String,
    pub technical_score: f64,
    pub fundamental_score: f64,
    pub total_score: f64,
    /// Free-text analysis (per-rule reasons joined).
    pub analysis: Option<String>,
    pub decision: DecisionStatus,
    /// Reason of the first failing gating rule, when rejected.
    pub fail_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ScoredStock {
    pub fn new(
        pool1_id: String,
        technical_score: f64,
        fundamental_score: f64,
        total_score: f64,
        analysis: Option<String>,
        decision: DecisionStatus,
        fail_reason: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pool1_id,
            technical_score,
            fundamental_score,
            total_score,
            analysis,
            decision,
            fail_reason,
            created_at: Utc::now(),
        }
    }
}
