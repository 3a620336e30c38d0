use crate::domain::error::DomainError;
use crate::domain::ports::pool_repository::PoolRepository;
use crate::domain::ports::run_repository::RunRepository;
use crate::domain::ports::topic_repository::TopicRepository;
use crate::domain::values::day::Day;
use crate::domain::values::stage::{Stage, StageStatus};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// What to delete: the day's topics, its pools, or (default) both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeTarget {
    Topics,
    Picks,
    All,
}

impl FromStr for PurgeTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "topics" | "sectors" => Ok(PurgeTarget::Topics),
            "picks" | "pools" => Ok(PurgeTarget::Picks),
            "all" => Ok(PurgeTarget::All),
            _ => Err(format!("Unknown purge target: {s}. Use topics|picks|all")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PurgeOutcome {
    pub topics_deleted: usize,
    pub pool_deleted: usize,
}

pub struct PurgeUseCase {
    topics: Arc<dyn TopicRepository>,
    pools: Arc<dyn PoolRepository>,
    runs: Arc<dyn RunRepository>,
}

impl PurgeUseCase {
    pub fn new(
        topics: Arc<dyn TopicRepository>,
        pools: Arc<dyn PoolRepository>,
        runs: Arc<dyn RunRepository>,
    ) -> Self {
        Self {
            topics,
            pools,
            runs,
        }
    }

    /// Delete a day's derived output and reset the matching stage statuses
    /// so the stages can be regenerated. Deleting topics also drops the
    /// pools built from them; pool2 goes with pool1 via cascade.
    pub fn execute(&self, day: Day, target: PurgeTarget) -> Result<PurgeOutcome, DomainError> {
        let mut outcome = PurgeOutcome::default();

        if matches!(target, PurgeTarget::Topics | PurgeTarget::All) {
            outcome.pool_deleted = self.pools.delete_day(day)?;
            outcome.topics_deleted = self.topics.delete_day(day)?;
            for stage in [Stage::Topics, Stage::Screen, Stage::Select] {
                self.runs
                    .set_status(day, stage, StageStatus::NotStarted, None)?;
            }
        } else {
            outcome.pool_deleted = self.pools.delete_day(day)?;
            for stage in [Stage::Screen, Stage::Select] {
                self.runs
                    .set_status(day, stage, StageStatus::NotStarted, None)?;
            }
        }

        info!(
            day = %day,
            topics = outcome.topics_deleted,
            pool = outcome.pool_deleted,
            "day purged"
        );
        Ok(outcome)
    }
}
