use crate::domain::ports::rule::{Rule, RuleCategory, RuleResult, StockContext};
use crate::domain::values::rule_params::RuleParams;

// All bounds are inclusive. A snapshot missing the datum a rule needs yields
// the neutral no-data result instead of failing the stock.

pub struct MarketCapRule;

impl Rule for MarketCapRule {
    fn key(&self) -> &'static str {
        "market_cap"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Technical
    }

    fn evaluate(&self, ctx: &StockContext, params: &RuleParams) -> RuleResult {
        let RuleParams::MarketCap { min, max } = params else {
            return RuleResult::fail("market_cap: wrong parameter bag");
        };
        let Some(cap) = ctx.snapshot.market_cap else {
            return RuleResult::no_data("market cap");
        };
        if cap >= *min && cap <= *max {
            RuleResult::pass(1.0, format!("市值 {cap:.1} 亿，在 {min}-{max} 亿内"))
        } else {
            RuleResult::fail(format!("市值 {cap:.1} 亿，超出 {min}-{max} 亿"))
        }
    }
}

pub struct VolumeRatioRule;

impl Rule for VolumeRatioRule {
    fn key(&self) -> &'static str {
        "volume_ratio"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Technical
    }

    fn evaluate(&self, ctx: &StockContext, params: &RuleParams) -> RuleResult {
        let RuleParams::VolumeRatio { min } = params else {
            return RuleResult::fail("volume_ratio: wrong parameter bag");
        };
        let Some(ratio) = ctx.snapshot.volume_ratio else {
            return RuleResult::no_data("volume ratio");
        };
        if ratio >= *min {
            RuleResult::pass(1.0, format!("量比 {ratio:.2} >= {min}"))
        } else {
            RuleResult::fail(format!("量比 {ratio:.2} < {min}"))
        }
    }
}

pub struct PriceChangeRule;

impl Rule for PriceChangeRule {
    fn key(&self) -> &'static str {
        "price_change"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Technical
    }

    fn evaluate(&self, ctx: &StockContext, params: &RuleParams) -> RuleResult {
        let RuleParams::PriceChange { min_pct, max_pct } = params else {
            return RuleResult::fail("price_change: wrong parameter bag");
        };
        let Some(pct) = ctx.snapshot.pct_change else {
            return RuleResult::no_data("price change");
        };
        if pct >= *min_pct && pct <= *max_pct {
            RuleResult::pass(1.0, format!("涨跌幅 {pct:.2}%，在 {min_pct}%~{max_pct}% 内"))
        } else {
            RuleResult::fail(format!("涨跌幅 {pct:.2}%，超出 {min_pct}%~{max_pct}%"))
        }
    }
}

pub struct TurnoverRateRule;

impl Rule for TurnoverRateRule {
    fn key(&self) -> &'static str {
        "turnover_rate"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Technical
    }

    fn evaluate(&self, ctx: &StockContext, params: &RuleParams) -> RuleResult {
        let RuleParams::TurnoverRate { min_pct, max_pct } = params else {
            return RuleResult::fail("turnover_rate: wrong parameter bag");
        };
        let Some(turnover) = ctx.snapshot.turnover_rate else {
            return RuleResult::no_data("turnover rate");
        };
        if turnover >= *min_pct && turnover <= *max_pct {
            RuleResult::pass(1.0, format!("换手率 {turnover:.2}%，在 {min_pct}%~{max_pct}% 内"))
        } else {
            RuleResult::fail(format!("换手率 {turnover:.2}%，超出 {min_pct}%~{max_pct}%"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::screened_stock::StockSnapshot;

    fn ctx(snapshot: StockSnapshot) -> StockContext {
        StockContext {
            stock_code: "600519".into(),
            stock_name: "贵州茅台".into(),
            snapshot,
        }
    }

    #[test]
    fn test_market_cap_bounds_inclusive() {
        let rule = MarketCapRule;
        let params = RuleParams::MarketCap { min: 50.0, max: 500.0 };
        let at_min = ctx(StockSnapshot {
            market_cap: Some(50.0),
            ..Default::default()
        });
        assert!(rule.evaluate(&at_min, &params).passed);
        let at_max = ctx(StockSnapshot {
            market_cap: Some(500.0),
            ..Default::default()
        });
        assert!(rule.evaluate(&at_max, &params).passed);
        let over = ctx(StockSnapshot {
            market_cap: Some(500.1),
            ..Default::default()
        });
        assert!(!rule.evaluate(&over, &params).passed);
    }

    #[test]
    fn test_missing_data_is_neutral() {
        let rule = VolumeRatioRule;
        let result = rule.evaluate(
            &ctx(StockSnapshot::default()),
            &RuleParams::VolumeRatio { min: 1.5 },
        );
        assert!(result.passed);
        assert_eq!(result.score, 0.5);
    }

    #[test]
    fn test_volume_ratio_below_min_fails() {
        let rule = VolumeRatioRule;
        let result = rule.evaluate(
            &ctx(StockSnapshot {
                volume_ratio: Some(0.8),
                ..Default::default()
            }),
            &RuleParams::VolumeRatio { min: 1.5 },
        );
        assert!(!result.passed);
    }
}
