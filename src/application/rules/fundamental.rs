use crate::domain::ports::rule::{Rule, RuleCategory, RuleResult, StockContext};
use crate::domain::values::rule_params::RuleParams;

pub struct PeRatioRule;

impl Rule for PeRatioRule {
    fn key(&self) -> &'static str {
        "pe_ratio"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Fundamental
    }

    fn evaluate(&self, ctx: &StockContext, params: &RuleParams) -> RuleResult {
        let RuleParams::PeRatio { max } = params else {
            return RuleResult::fail("pe_ratio: wrong parameter bag");
        };
        let Some(pe) = ctx.snapshot.pe_ratio else {
            return RuleResult::no_data("P/E");
        };
        // Negative dynamic P/E means the company is loss-making.
        if pe <= 0.0 {
            return RuleResult::fail(format!("市盈率 {pe:.2}，亏损"));
        }
        if pe <= *max {
            RuleResult::pass(1.0, format!("市盈率 {pe:.2} <= {max}"))
        } else {
            RuleResult::fail(format!("市盈率 {pe:.2} > {max}"))
        }
    }
}

pub struct PbRatioRule;

impl Rule for PbRatioRule {
    fn key(&self) -> &'static str {
        "pb_ratio"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Fundamental
    }

    fn evaluate(&self, ctx: &StockContext, params: &RuleParams) -> RuleResult {
        let RuleParams::PbRatio { max } = params else {
            return RuleResult::fail("pb_ratio: wrong parameter bag");
        };
        let Some(pb) = ctx.snapshot.pb_ratio else {
            return RuleResult::no_data("P/B");
        };
        // Negative book value fails regardless of the cap.
        if pb <= 0.0 {
            return RuleResult::fail(format!("市净率 {pb:.2}，净资产为负"));
        }
        if pb <= *max {
            RuleResult::pass(1.0, format!("市净率 {pb:.2} <= {max}"))
        } else {
            RuleResult::fail(format!("市净率 {pb:.2} > {max}"))
        }
    }
}

pub struct RoeRule;

impl Rule for RoeRule {
    fn key(&self) -> &'static str {
        "roe"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Fundamental
    }

    fn evaluate(&self, ctx: &StockContext, params: &RuleParams) -> RuleResult {
        let RuleParams::Roe { min_pct } = params else {
            return RuleResult::fail("roe: wrong parameter bag");
        };
        let Some(roe) = ctx.snapshot.roe else {
            return RuleResult::no_data("ROE");
        };
        if roe >= *min_pct {
            RuleResult::pass(1.0, format!("ROE {roe:.2}% >= {min_pct}%"))
        } else {
            RuleResult::fail(format!("ROE {roe:.2}% < {min_pct}%"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::screened_stock::StockSnapshot;

    fn ctx(snapshot: StockSnapshot) -> StockContext {
        StockContext {
            stock_code: "000001".into(),
            stock_name: "平安银行".into(),
            snapshot,
        }
    }

    #[test]
    fn test_negative_pe_always_fails() {
        let rule = PeRatioRule;
        let result = rule.evaluate(
            &ctx(StockSnapshot {
                pe_ratio: Some(-12.0),
                ..Default::default()
            }),
            &RuleParams::PeRatio { max: 60.0 },
        );
        assert!(!result.passed);
    }

    #[test]
    fn test_pe_at_cap_passes() {
        let rule = PeRatioRule;
        let result = rule.evaluate(
            &ctx(StockSnapshot {
                pe_ratio: Some(60.0),
                ..Default::default()
            }),
            &RuleParams::PeRatio { max: 60.0 },
        );
        assert!(result.passed);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_roe_missing_is_neutral() {
        let rule = RoeRule;
        let result = rule.evaluate(
            &ctx(StockSnapshot::default()),
            &RuleParams::Roe { min_pct: 5.0 },
        );
        assert!(result.passed);
        assert_eq!(result.score, 0.5);
    }
}
