use crate::domain::error::DomainError;
use crate::domain::values::rule_params::RuleParams;
use serde::Serialize;

/// Persisted configuration for one rule.
#[derive(Debug, Clone, Serialize)]
pub struct RuleConfig {
    pub rule_key: String,
    pub enabled: bool,
    /// Gating rules disqualify a stock on failure; scoring-only rules just
    /// contribute to the numeric score.
    pub gating: bool,
    /// Evaluation order; lower runs first.
    pub sort_order: i64,
    pub params: RuleParams,
}

pub trait RuleConfigRepository: Send + Sync {
    /// Enabled rules ordered by sort_order. Parameter bags are validated
    /// while loading; a malformed row is an error, not a silent skip.
    fn list_enabled(&self) -> Result<Vec<RuleConfig>, DomainError>;

    fn list_all(&self) -> Result<Vec<RuleConfig>, DomainError>;

    fn update(
        &self,
        rule_key: &str,
        enabled: Option<bool>,
        gating: Option<bool>,
        sort_order: Option<i64>,
        params: Option<RuleParams>,
    ) -> Result<(), DomainError>;
}
