use crate::application::rules;
use crate::domain::entities::scored_stock::ScoredStock;
use crate::domain::entities::screened_stock::ScreenedStock;
use crate::domain::error::DomainError;
use crate::domain::ports::pool_repository::PoolRepository;
use crate::domain::ports::rule::{Rule, RuleCategory, StockContext};
use crate::domain::ports::rule_config_repository::{RuleConfig, RuleConfigRepository};
use crate::domain::values::decision::DecisionStatus;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::values::day::Day;

const TECHNICAL_WEIGHT: f64 = 0.6;
const FUNDAMENTAL_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectOutcome {
    pub selected: usize,
    pub total: usize,
}

pub struct SelectUseCase {
    pools: Arc<dyn PoolRepository>,
    rule_configs: Arc<dyn RuleConfigRepository>,
    registry: HashMap<&'static str, Arc<dyn Rule>>,
}

impl SelectUseCase {
    pub fn new(pools: Arc<dyn PoolRepository>, rule_configs: Arc<dyn RuleConfigRepository>) -> Self {
        Self {
            pools,
            rule_configs,
            registry: rules::registry(),
        }
    }

    pub fn execute(&self, day: Day) -> Result<SelectOutcome, DomainError> {
        // Configs load once per invocation; misconfigured rows error here,
        // before any stock is touched.
        let configs = self.rule_configs.list_enabled()?;
        let pool1 = self.pools.list_pool1(day)?;

        let mut rows = Vec::with_capacity(pool1.len());
        let mut selected = 0;
        for stock in &pool1 {
            let scored = self.score_stock(stock, &configs)?;
            if scored.decision == DecisionStatus::Selected {
                selected += 1;
            }
            rows.push(scored);
        }

        self.pools.replace_pool2(day, &rows)?;
        info!(day = %day, selected, total = pool1.len(), "deep selection done");
        Ok(SelectOutcome {
            selected,
            total: pool1.len(),
        })
    }

    /// Evaluate every enabled rule in sort order. The first failing gating
    /// rule rejects the stock and stops evaluation; scoring-only failures
    /// just contribute nothing.
    fn score_stock(
        &self,
        stock: &ScreenedStock,
        configs: &[RuleConfig],
    ) -> Result<ScoredStock, DomainError> {
        let ctx = StockContext {
            stock_code: stock.stock_code.clone(),
            stock_name: stock.stock_name.clone(),
            snapshot: stock.snapshot.clone(),
        };

        let mut technical = 0.0;
        let mut fundamental = 0.0;
        let mut notes = Vec::new();
        let mut fail_reason = None;

        for config in configs {
            let rule = self.registry.get(config.rule_key.as_str()).ok_or_else(|| {
                DomainError::InvalidInput(format!("no rule implements key {}", config.rule_key))
            })?;
            let result = rule.evaluate(&ctx, &config.params);
            notes.push(format!("{}: {}", config.rule_key, result.reason));
            if result.passed {
                match rule.category() {
                    RuleCategory::Technical => technical += result.score,
                    RuleCategory::Fundamental => fundamental += result.score,
                }
            } else if config.gating {
                fail_reason = Some(result.reason);
                break;
            }
        }

        let total = TECHNICAL_WEIGHT * technical + FUNDAMENTAL_WEIGHT * fundamental;
        let decision = if fail_reason.is_some() {
            DecisionStatus::Rejected
        } else {
            DecisionStatus::Selected
        };
        Ok(ScoredStock::new(
            stock.id.clone(),
            technical,
            fundamental,
            total,
            Some(notes.join("; ")),
            decision,
            fail_reason,
        ))
    }
}
