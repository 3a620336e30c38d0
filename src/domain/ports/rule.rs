//! Rule port for the deep-selection stage.
//!
//! Defines the [`Rule`] trait and supporting types. Each rule is a pure
//! function of a [`StockContext`]: it never performs I/O, so evaluation is
//! deterministic and cheap to re-run.
//!
//! Rules come in two flavors, distinguished per rule in persisted
//! configuration:
//!
//! - **gating** — failure disqualifies the stock outright; the first failing
//!   gating rule (in sort order) short-circuits evaluation and its reason
//!   becomes the stock's `fail_reason`.
//! - **scoring-only** — failure just contributes zero to the score.

use crate::domain::entities::screened_stock::StockSnapshot;
use crate::domain::values::rule_params::RuleParams;
use serde::Serialize;

/// Which score bucket a rule's points land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Technical,
    Fundamental,
}

/// Outcome of evaluating one rule against one stock.
#[derive(Debug, Clone, Serialize)]
pub struct RuleResult {
    pub passed: bool,
    pub score: f64,
    pub reason: String,
}

impl RuleResult {
    pub fn pass(score: f64, reason: impl Into<String>) -> Self {
        Self {
            passed: true,
            score,
            reason: reason.into(),
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            score: 0.0,
            reason: reason.into(),
        }
    }

    /// Neutral result when the snapshot lacks the datum a rule needs.
    /// Passing with a half score mirrors "don't punish missing data".
    pub fn no_data(field: &str) -> Self {
        Self {
            passed: true,
            score: 0.5,
            reason: format!("no {field} data"),
        }
    }
}

/// Everything a rule may look at for one stock.
pub struct StockContext {
    pub stock_code: String,
    pub stock_name: String,
    pub snapshot: StockSnapshot,
}

/// A single screening rule, registered under a stable string key.
pub trait Rule: Send + Sync {
    /// Stable key matching `rule_configs.rule_key`.
    fn key(&self) -> &'static str;

    fn category(&self) -> RuleCategory;

    /// Evaluate against a stock. `params` is the validated parameter bag
    /// loaded from configuration for this rule's key.
    fn evaluate(&self, ctx: &StockContext, params: &RuleParams) -> RuleResult;
}
