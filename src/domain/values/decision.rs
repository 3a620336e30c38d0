use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Final verdict for a pool-2 stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    Pending,
    Selected,
    Rejected,
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionStatus::Pending => write!(f, "pending"),
            DecisionStatus::Selected => write!(f, "selected"),
            DecisionStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for DecisionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(DecisionStatus::Pending),
            "selected" => Ok(DecisionStatus::Selected),
            "rejected" => Ok(DecisionStatus::Rejected),
            _ => Err(format!("Unknown decision status: {s}")),
        }
    }
}
