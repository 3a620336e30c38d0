//! Rule implementations for the deep-selection stage, one type per
//! persisted rule key.

pub mod fundamental;
pub mod technical;

use crate::domain::ports::rule::Rule;
use std::collections::HashMap;
use std::sync::Arc;

/// Every built-in rule, keyed for lookup against persisted configs.
pub fn registry() -> HashMap<&'static str, Arc<dyn Rule>> {
    let rules: Vec<Arc<dyn Rule>> = vec![
        Arc::new(technical::MarketCapRule),
        Arc::new(technical::VolumeRatioRule),
        Arc::new(technical::PriceChangeRule),
        Arc::new(technical::TurnoverRateRule),
        Arc::new(fundamental::PeRatioRule),
        Arc::new(fundamental::PbRatioRule),
        Arc::new(fundamental::RoeRule),
    ];
    rules.into_iter().map(|r| (r.key(), r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_seeded_keys() {
        let reg = registry();
        for key in [
            "market_cap",
            "volume_ratio",
            "price_change",
            "turnover_rate",
            "pe_ratio",
            "pb_ratio",
            "roe",
        ] {
            assert!(reg.contains_key(key), "missing rule {key}");
        }
    }
}
