use crate::domain::entities::pipeline_run::{PipelineRun, StageState};
use crate::domain::error::DomainError;
use crate::domain::ports::run_repository::RunRepository;
use crate::domain::values::day::Day;
use crate::domain::values::stage::{Stage, StageStatus};
use crate::infrastructure::sqlite::SharedConn;
use chrono::{DateTime, Utc};
use rusqlite::params;

pub struct SqliteRunRepo {
    conn: SharedConn,
}

impl SqliteRunRepo {
    pub fn new(conn: SharedConn) -> Self {
        Self { conn }
    }

    fn row_to_run(row: &rusqlite::Row) -> Result<PipelineRun, rusqlite::Error> {
        fn state(row: &rusqlite::Row, status_idx: usize) -> Result<StageState, rusqlite::Error> {
            let status: String = row.get(status_idx)?;
            Ok(StageState {
                status: status
                    .parse::<StageStatus>()
                    .map_err(|_| rusqlite::Error::InvalidQuery)?,
                message: row.get(status_idx + 1)?,
            })
        }
        let day: String = row.get(0)?;
        let updated: String = row.get(9)?;
        Ok(PipelineRun {
            day: day.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
            ingest: state(row, 1)?,
            topics: state(row, 3)?,
            screen: state(row, 5)?,
            select: state(row, 7)?,
            updated_at: DateTime::parse_from_rfc3339(&updated)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

impl RunRepository for SqliteRunRepo {
    fn get_or_create(&self, day: Day) -> Result<PipelineRun, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT OR IGNORE INTO pipeline_runs (day, updated_at) VALUES (?1, ?2)",
            params![day.to_string(), Utc::now().to_rfc3339()],
        )
        .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.query_row(
            "SELECT day, ingest_status, ingest_message, topics_status, topics_message,
                    screen_status, screen_message, select_status, select_message, updated_at
             FROM pipeline_runs WHERE day = ?1",
            params![day.to_string()],
            Self::row_to_run,
        )
        .map_err(|e| DomainError::Database(e.to_string()))
    }

    fn set_status(
        &self,
        day: Day,
        stage: Stage,
        status: StageStatus,
        message: Option<&str>,
    ) -> Result<(), DomainError> {
        // Column names come from the Stage enum, never from user input.
        let (status_col, message_col) = match stage {
            Stage::Ingest => ("ingest_status", "ingest_message"),
            Stage::Topics => ("topics_status", "topics_message"),
            Stage::Screen => ("screen_status", "screen_message"),
            Stage::Select => ("select_status", "select_message"),
        };
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT OR IGNORE INTO pipeline_runs (day, updated_at) VALUES (?1, ?2)",
            params![day.to_string(), Utc::now().to_rfc3339()],
        )
        .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            &format!(
                "UPDATE pipeline_runs SET {status_col} = ?1, {message_col} = ?2, updated_at = ?3
                 WHERE day = ?4"
            ),
            params![
                status.to_string(),
                message,
                Utc::now().to_rfc3339(),
                day.to_string()
            ],
        )
        .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(())
    }
}
