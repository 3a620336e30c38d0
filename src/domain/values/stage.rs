use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four ordered pipeline stages for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// A: collect articles from enabled source accounts.
    Ingest,
    /// B: distill the day's articles into hot sectors via the LLM.
    Topics,
    /// C: map sectors to constituents and build the broad pool.
    Screen,
    /// D: apply the rule engine to produce the final pick list.
    Select,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Ingest, Stage::Topics, Stage::Screen, Stage::Select];

    /// The stage that must be `done` (or have persisted output) before this one runs.
    pub fn precursor(&self) -> Option<Stage> {
        match self {
            Stage::Ingest => None,
            Stage::Topics => Some(Stage::Ingest),
            Stage::Screen => Some(Stage::Topics),
            Stage::Select => Some(Stage::Screen),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ingest => write!(f, "ingest"),
            Stage::Topics => write!(f, "topics"),
            Stage::Screen => write!(f, "screen"),
            Stage::Select => write!(f, "select"),
        }
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a" | "ingest" => Ok(Stage::Ingest),
            "b" | "topics" => Ok(Stage::Topics),
            "c" | "screen" => Ok(Stage::Screen),
            "d" | "select" => Ok(Stage::Select),
            _ => Err(format!("Unknown stage: {s}")),
        }
    }
}

/// Persisted status of one stage within a day's run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    NotStarted,
    Running,
    Done,
    Failed,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageStatus::NotStarted => write!(f, "not_started"),
            StageStatus::Running => write!(f, "running"),
            StageStatus::Done => write!(f, "done"),
            StageStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for StageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(StageStatus::NotStarted),
            "running" => Ok(StageStatus::Running),
            "done" => Ok(StageStatus::Done),
            "failed" => Ok(StageStatus::Failed),
            _ => Err(format!("Unknown stage status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precursor_chain() {
        assert_eq!(Stage::Ingest.precursor(), None);
        assert_eq!(Stage::Topics.precursor(), Some(Stage::Ingest));
        assert_eq!(Stage::Screen.precursor(), Some(Stage::Topics));
        assert_eq!(Stage::Select.precursor(), Some(Stage::Screen));
    }

    #[test]
    fn test_parse_shorthand() {
        assert_eq!("c".parse::<Stage>().unwrap(), Stage::Screen);
        assert_eq!("TOPICS".parse::<Stage>().unwrap(), Stage::Topics);
    }
}
