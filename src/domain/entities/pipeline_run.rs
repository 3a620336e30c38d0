use crate::domain::values::day::Day;
use crate::domain::values::stage::{Stage, StageStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-stage status plus optional message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageState {
    pub status: StageStatus,
    pub message: Option<String>,
}

impl Default for StageState {
    fn default() -> Self {
        Self {
            status: StageStatus::NotStarted,
            message: None,
        }
    }
}

/// One row per calendar day: four independent stage statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub day: Day,
    pub ingest: StageState,
    pub topics: StageState,
    pub screen: StageState,
    pub select: StageState,
    pub updated_at: DateTime<Utc>,
}

impl PipelineRun {
    pub fn new(day: Day) -> Self {
        Self {
            day,
            ingest: StageState::default(),
            topics: StageState::default(),
            screen: StageState::default(),
            select: StageState::default(),
            updated_at: Utc::now(),
        }
    }

    pub fn stage(&self, stage: Stage) -> &StageState {
        match stage {
            Stage::Ingest => &self.ingest,
            Stage::Topics => &self.topics,
            Stage::Screen => &self.screen,
            Stage::Select => &self.select,
        }
    }
}
