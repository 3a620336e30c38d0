use serde::{Deserialize, Serialize};

/// Validated parameter bag for one rule, tagged by rule key.
///
/// Persisted as JSON in `rule_configs.params`; parsing goes through
/// [`RuleParams::from_json`] so misconfiguration (unknown key, inverted
/// bounds, non-numeric values) is caught at load time, before any stock
/// is evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleParams {
    /// Total market cap in 100M CNY (亿), inclusive range.
    MarketCap { min: f64, max: f64 },
    /// Minimum volume ratio (量比).
    VolumeRatio { min: f64 },
    /// Percent change, inclusive range.
    PriceChange { min_pct: f64, max_pct: f64 },
    /// Turnover rate percent, inclusive range.
    TurnoverRate { min_pct: f64, max_pct: f64 },
    /// Maximum dynamic P/E. Negative P/E (loss-making) always fails.
    PeRatio { max: f64 },
    /// Maximum P/B.
    PbRatio { max: f64 },
    /// Minimum return on equity percent.
    Roe { min_pct: f64 },
}

impl RuleParams {
    /// Stable key this parameter bag belongs to.
    pub fn rule_key(&self) -> &'static str {
        match self {
            RuleParams::MarketCap { .. } => "market_cap",
            RuleParams::VolumeRatio { .. } => "volume_ratio",
            RuleParams::PriceChange { .. } => "price_change",
            RuleParams::TurnoverRate { .. } => "turnover_rate",
            RuleParams::PeRatio { .. } => "pe_ratio",
            RuleParams::PbRatio { .. } => "pb_ratio",
            RuleParams::Roe { .. } => "roe",
        }
    }

    /// Parse the parameter JSON stored for `rule_key`, validating bounds.
    pub fn from_json(rule_key: &str, json: &serde_json::Value) -> Result<Self, String> {
        fn num(json: &serde_json::Value, field: &str) -> Result<f64, String> {
            json.get(field)
                .and_then(|v| v.as_f64())
                .ok_or_else(|| format!("missing or non-numeric field '{field}'"))
        }

        let params = match rule_key {
            "market_cap" => RuleParams::MarketCap {
                min: num(json, "min")?,
                max: num(json, "max")?,
            },
            "volume_ratio" => RuleParams::VolumeRatio {
                min: num(json, "min")?,
            },
            "price_change" => RuleParams::PriceChange {
                min_pct: num(json, "min_pct")?,
                max_pct: num(json, "max_pct")?,
            },
            "turnover_rate" => RuleParams::TurnoverRate {
                min_pct: num(json, "min_pct")?,
                max_pct: num(json, "max_pct")?,
            },
            "pe_ratio" => RuleParams::PeRatio {
                max: num(json, "max")?,
            },
            "pb_ratio" => RuleParams::PbRatio {
                max: num(json, "max")?,
            },
            "roe" => RuleParams::Roe {
                min_pct: num(json, "min_pct")?,
            },
            other => return Err(format!("unknown rule key: {other}")),
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            RuleParams::MarketCap { min, max } if min > max => {
                Err(format!("market_cap: min {min} > max {max}"))
            }
            RuleParams::MarketCap { min, .. } if *min < 0.0 => {
                Err("market_cap: min must be >= 0".into())
            }
            RuleParams::VolumeRatio { min } if *min < 0.0 => {
                Err("volume_ratio: min must be >= 0".into())
            }
            RuleParams::PriceChange { min_pct, max_pct } if min_pct > max_pct => {
                Err(format!("price_change: min {min_pct} > max {max_pct}"))
            }
            RuleParams::TurnoverRate { min_pct, max_pct } if min_pct > max_pct => {
                Err(format!("turnover_rate: min {min_pct} > max {max_pct}"))
            }
            RuleParams::PeRatio { max } if *max <= 0.0 => {
                Err("pe_ratio: max must be > 0".into())
            }
            RuleParams::PbRatio { max } if *max <= 0.0 => {
                Err("pb_ratio: max must be > 0".into())
            }
            _ => Ok(()),
        }
    }

    /// Flat JSON shape as stored in `rule_configs.params` (the shape
    /// [`RuleParams::from_json`] reads back).
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            RuleParams::MarketCap { min, max } => json!({"min": min, "max": max}),
            RuleParams::VolumeRatio { min } => json!({"min": min}),
            RuleParams::PriceChange { min_pct, max_pct } => {
                json!({"min_pct": min_pct, "max_pct": max_pct})
            }
            RuleParams::TurnoverRate { min_pct, max_pct } => {
                json!({"min_pct": min_pct, "max_pct": max_pct})
            }
            RuleParams::PeRatio { max } => json!({"max": max}),
            RuleParams::PbRatio { max } => json!({"max": max}),
            RuleParams::Roe { min_pct } => json!({"min_pct": min_pct}),
        }
    }

    /// Seed defaults for a rule key, used by the initial migration.
    pub fn default_for(rule_key: &str) -> Option<Self> {
        match rule_key {
            "market_cap" => Some(RuleParams::MarketCap { min: 50.0, max: 500.0 }),
            "volume_ratio" => Some(RuleParams::VolumeRatio { min: 1.5 }),
            "price_change" => Some(RuleParams::PriceChange { min_pct: -10.0, max_pct: 10.0 }),
            "turnover_rate" => Some(RuleParams::TurnoverRate { min_pct: 2.0, max_pct: 20.0 }),
            "pe_ratio" => Some(RuleParams::PeRatio { max: 60.0 }),
            "pb_ratio" => Some(RuleParams::PbRatio { max: 10.0 }),
            "roe" => Some(RuleParams::Roe { min_pct: 5.0 }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_valid_params() {
        let p = RuleParams::from_json("market_cap", &json!({"min": 50, "max": 500})).unwrap();
        assert_eq!(p, RuleParams::MarketCap { min: 50.0, max: 500.0 });
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let err = RuleParams::from_json("market_cap", &json!({"min": 500, "max": 50}));
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_unknown_key() {
        assert!(RuleParams::from_json("moon_phase", &json!({})).is_err());
    }

    #[test]
    fn test_rejects_missing_field() {
        assert!(RuleParams::from_json("volume_ratio", &json!({"minimum": 1.5})).is_err());
    }
}
