use crate::application::extract_topics::ExtractTopicsUseCase;
use crate::application::ingest::IngestUseCase;
use crate::application::screen::ScreenUseCase;
use crate::application::select::SelectUseCase;
use crate::config::Thresholds;
use crate::domain::entities::pipeline_run::PipelineRun;
use crate::domain::error::DomainError;
use crate::domain::ports::article_repository::ArticleRepository;
use crate::domain::ports::pool_repository::PoolRepository;
use crate::domain::ports::run_repository::RunRepository;
use crate::domain::ports::topic_repository::TopicRepository;
use crate::domain::values::day::Day;
use crate::domain::values::stage::{Stage, StageStatus};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Result of running (or skipping) one stage for one day.
#[derive(Debug, Clone, Serialize)]
pub struct StageResult {
    pub stage: Stage,
    pub status: StageStatus,
    pub message: String,
    pub output_count: usize,
    /// True when the stage was already done and the persisted result was
    /// returned without recomputation.
    pub cached: bool,
}

pub struct PipelineOrchestrator {
    runs: Arc<dyn RunRepository>,
    articles: Arc<dyn ArticleRepository>,
    topics: Arc<dyn TopicRepository>,
    pools: Arc<dyn PoolRepository>,
    ingest_uc: Arc<IngestUseCase>,
    topics_uc: Arc<ExtractTopicsUseCase>,
    screen_uc: Arc<ScreenUseCase>,
    select_uc: Arc<SelectUseCase>,
    snapshot_concurrency: usize,
}

impl PipelineOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        runs: Arc<dyn RunRepository>,
        articles: Arc<dyn ArticleRepository>,
        topics: Arc<dyn TopicRepository>,
        pools: Arc<dyn PoolRepository>,
        ingest_uc: Arc<IngestUseCase>,
        topics_uc: Arc<ExtractTopicsUseCase>,
        screen_uc: Arc<ScreenUseCase>,
        select_uc: Arc<SelectUseCase>,
        snapshot_concurrency: usize,
    ) -> Self {
        Self {
            runs,
            articles,
            topics,
            pools,
            ingest_uc,
            topics_uc,
            screen_uc,
            select_uc,
            snapshot_concurrency,
        }
    }

    pub fn status(&self, day: Day) -> Result<PipelineRun, DomainError> {
        self.runs.get_or_create(day)
    }

    /// Run one stage. A stage already `done` returns its persisted result
    /// unless `force`, which recomputes atop a transactional delete. A stage
    /// whose precursor produced nothing fails with `PrecursorNotReady` and
    /// writes no rows.
    pub async fn run_stage(
        &self,
        day: Day,
        stage: Stage,
        force: bool,
        t: &Thresholds,
    ) -> Result<StageResult, DomainError> {
        let run = self.runs.get_or_create(day)?;

        if !force && run.stage(stage).status == StageStatus::Done {
            let message = run
                .stage(stage)
                .message
                .clone()
                .unwrap_or_else(|| "cached".into());
            info!(day = %day, %stage, "stage already done, returning cached result");
            return Ok(StageResult {
                stage,
                status: StageStatus::Done,
                message,
                output_count: self.output_count(stage, day)?,
                cached: true,
            });
        }

        if let Some(precursor) = stage.precursor() {
            let ready = run.stage(precursor).status == StageStatus::Done
                || self.output_count(precursor, day)? > 0;
            if !ready {
                return Err(DomainError::PrecursorNotReady { stage, precursor });
            }
        }

        self.runs.set_status(day, stage, StageStatus::Running, None)?;
        info!(day = %day, %stage, force, "stage started");

        let outcome = self.dispatch(day, stage, t).await;
        match outcome {
            Ok(message) => {
                self.runs
                    .set_status(day, stage, StageStatus::Done, Some(&message))?;
                Ok(StageResult {
                    stage,
                    status: StageStatus::Done,
                    message,
                    output_count: self.output_count(stage, day)?,
                    cached: false,
                })
            }
            Err(e) => {
                let summary = e.to_string();
                error!(day = %day, %stage, error = %summary, "stage failed");
                self.runs
                    .set_status(day, stage, StageStatus::Failed, Some(&summary))?;
                Err(e)
            }
        }
    }

    /// Run A through D in order, stopping at the first failure.
    pub async fn run_all(
        &self,
        day: Day,
        force: bool,
        t: &Thresholds,
    ) -> Result<Vec<StageResult>, DomainError> {
        let mut results = Vec::with_capacity(Stage::ALL.len());
        for stage in Stage::ALL {
            results.push(self.run_stage(day, stage, force, t).await?);
        }
        Ok(results)
    }

    async fn dispatch(&self, day: Day, stage: Stage, t: &Thresholds) -> Result<String, DomainError> {
        match stage {
            Stage::Ingest => {
                let outcome = self.ingest_uc.execute().await?;
                Ok(match &outcome.first_error {
                    Some(first) => format!(
                        "stored {} articles ({} refreshed), {} fetch failures, first: {first}",
                        outcome.stored, outcome.refreshed, outcome.fetch_failures
                    ),
                    None => format!(
                        "stored {} articles ({} refreshed) from {} accounts",
                        outcome.stored, outcome.refreshed, outcome.accounts
                    ),
                })
            }
            Stage::Topics => {
                let outcome = self.topics_uc.execute(day, t).await?;
                Ok(format!(
                    "generated {} topics, dropped {}",
                    outcome.generated, outcome.dropped
                ))
            }
            Stage::Screen => {
                let outcome = self
                    .screen_uc
                    .execute(day, t, self.snapshot_concurrency)
                    .await?;
                Ok(format!(
                    "generated {} candidates from {} sectors ({} skipped, {} snapshot failures)",
                    outcome.generated,
                    outcome.matched_sectors,
                    outcome.skipped_sectors,
                    outcome.snapshot_failures
                ))
            }
            Stage::Select => {
                let outcome = self.select_uc.execute(day)?;
                Ok(format!("selected {} of {}", outcome.selected, outcome.total))
            }
        }
    }

    /// Persisted output rows for a stage and day. Doubles as the precursor
    /// readiness check: non-empty upstream output lets a stage run even when
    /// the upstream status row was lost.
    fn output_count(&self, stage: Stage, day: Day) -> Result<usize, DomainError> {
        match stage {
            Stage::Ingest => self.articles.count_for_day(day),
            Stage::Topics => self.topics.count_for_day(day),
            Stage::Screen => self.pools.count_pool1(day),
            Stage::Select => self.pools.count_pool2(day),
        }
    }
}
