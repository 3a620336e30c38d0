use crate::domain::entities::pipeline_run::PipelineRun;
use crate::domain::error::DomainError;
use crate::domain::values::day::Day;
use crate::domain::values::stage::{Stage, StageStatus};

pub trait RunRepository: Send + Sync {
    /// Fetch the day's run row, creating it (all stages not_started) if absent.
    fn get_or_create(&self, day: Day) -> Result<PipelineRun, DomainError>;

    fn set_status(
        &self,
        day: Day,
        stage: Stage,
        status: StageStatus,
        message: Option<&str>,
    ) -> Result<(), DomainError>;
}
