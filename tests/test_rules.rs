//! Rule-engine tests: gating short-circuit by sort order, scoring-only
//! failures, and persisted rule configuration.

mod common;

use sectorpick::application::select::SelectUseCase;
use sectorpick::domain::entities::screened_stock::{ScreenedStock, StockSnapshot};
use sectorpick::domain::ports::pool_repository::PoolRepository;
use sectorpick::domain::ports::rule_config_repository::RuleConfigRepository;
use sectorpick::domain::values::day::Day;
use sectorpick::domain::values::decision::DecisionStatus;
use sectorpick::domain::values::rule_params::RuleParams;
use sectorpick::infrastructure::sqlite::open_in_memory;
use sectorpick::infrastructure::sqlite::pool_repo::SqlitePoolRepo;
use sectorpick::infrastructure::sqlite::rule_config_repo::SqliteRuleConfigRepo;
use std::sync::Arc;

const DAY: &str = "2026-01-20";

struct Fixture {
    pools: Arc<SqlitePoolRepo>,
    configs: Arc<SqliteRuleConfigRepo>,
    select: SelectUseCase,
}

fn fixture() -> Fixture {
    let conn = open_in_memory().unwrap();
    let pools = Arc::new(SqlitePoolRepo::new(conn.clone()));
    let configs = Arc::new(SqliteRuleConfigRepo::new(conn));
    let select = SelectUseCase::new(pools.clone(), configs.clone());
    Fixture {
        pools,
        configs,
        select,
    }
}

fn healthy_snapshot() -> StockSnapshot {
    StockSnapshot {
        price: Some(10.0),
        pct_change: Some(6.0),
        volume_ratio: Some(2.0),
        turnover_rate: Some(6.0),
        market_cap: Some(120.0),
        pe_ratio: Some(30.0),
        pb_ratio: Some(3.0),
        roe: Some(8.0),
    }
}

fn seed_stock(f: &Fixture, snapshot: StockSnapshot) -> ScreenedStock {
    let day: Day = DAY.parse().unwrap();
    let stock = ScreenedStock::new(
        day,
        "半导体".into(),
        "600111".into(),
        "测试股".into(),
        "topic-1".into(),
        snapshot,
        "".into(),
    );
    f.pools.replace_pool1(day, &[stock.clone()]).unwrap();
    stock
}

#[test]
fn test_all_rules_pass_selects() {
    let f = fixture();
    seed_stock(&f, healthy_snapshot());

    let day: Day = DAY.parse().unwrap();
    let outcome = f.select.execute(day).unwrap();
    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.selected, 1);

    let pool2 = f.pools.list_pool2(day).unwrap();
    assert_eq!(pool2[0].decision, DecisionStatus::Selected);
    assert!(pool2[0].fail_reason.is_none());
    // Four technical passes at 1.0 each, three fundamental passes.
    assert_eq!(pool2[0].technical_score, 4.0);
    assert_eq!(pool2[0].fundamental_score, 3.0);
    assert!((pool2[0].total_score - (0.6 * 4.0 + 0.4 * 3.0)).abs() < 1e-9);
}

#[test]
fn test_first_gating_failure_short_circuits() {
    let f = fixture();
    // market_cap (sort_order 1) fails; later rules must not run.
    let snapshot = StockSnapshot {
        market_cap: Some(9000.0),
        ..healthy_snapshot()
    };
    seed_stock(&f, snapshot);

    let day: Day = DAY.parse().unwrap();
    let outcome = f.select.execute(day).unwrap();
    assert_eq!(outcome.selected, 0);

    let pool2 = f.pools.list_pool2(day).unwrap();
    assert_eq!(pool2[0].decision, DecisionStatus::Rejected);
    let fail_reason = pool2[0].fail_reason.as_deref().unwrap();
    assert!(fail_reason.contains("市值"), "{fail_reason}");
    // Evaluation stopped at the first gating failure.
    let analysis = pool2[0].analysis.as_deref().unwrap();
    assert!(analysis.contains("market_cap"));
    assert!(!analysis.contains("volume_ratio"), "{analysis}");
}

#[test]
fn test_sort_order_decides_which_gate_fires() {
    let f = fixture();
    // Both market_cap and volume_ratio would fail; reordering puts
    // volume_ratio first.
    f.configs
        .update("market_cap", None, None, Some(10), None)
        .unwrap();
    let snapshot = StockSnapshot {
        market_cap: Some(9000.0),
        volume_ratio: Some(0.5),
        ..healthy_snapshot()
    };
    seed_stock(&f, snapshot);

    let day: Day = DAY.parse().unwrap();
    f.select.execute(day).unwrap();

    let pool2 = f.pools.list_pool2(day).unwrap();
    let fail_reason = pool2[0].fail_reason.as_deref().unwrap();
    assert!(fail_reason.contains("量比"), "{fail_reason}");
}

#[test]
fn test_scoring_only_failure_never_rejects() {
    let f = fixture();
    // ROE is seeded as scoring-only: failing it costs score, not selection.
    let snapshot = StockSnapshot {
        roe: Some(1.0),
        ..healthy_snapshot()
    };
    seed_stock(&f, snapshot);

    let day: Day = DAY.parse().unwrap();
    let outcome = f.select.execute(day).unwrap();
    assert_eq!(outcome.selected, 1);

    let pool2 = f.pools.list_pool2(day).unwrap();
    assert_eq!(pool2[0].decision, DecisionStatus::Selected);
    assert_eq!(pool2[0].fundamental_score, 2.0);
}

#[test]
fn test_missing_datum_is_neutral_half_score() {
    let f = fixture();
    let snapshot = StockSnapshot {
        volume_ratio: None,
        ..healthy_snapshot()
    };
    seed_stock(&f, snapshot);

    let day: Day = DAY.parse().unwrap();
    let outcome = f.select.execute(day).unwrap();
    // Missing data passes with half weight instead of disqualifying.
    assert_eq!(outcome.selected, 1);
    let pool2 = f.pools.list_pool2(day).unwrap();
    assert_eq!(pool2[0].technical_score, 3.5);
}

#[test]
fn test_disabled_rule_is_skipped() {
    let f = fixture();
    f.configs
        .update("market_cap", Some(false), None, None, None)
        .unwrap();
    let snapshot = StockSnapshot {
        market_cap: Some(9000.0),
        ..healthy_snapshot()
    };
    seed_stock(&f, snapshot);

    let day: Day = DAY.parse().unwrap();
    let outcome = f.select.execute(day).unwrap();
    assert_eq!(outcome.selected, 1);
}

#[test]
fn test_update_validates_params() {
    let f = fixture();
    // Inverted bounds are rejected before persisting.
    let bad = RuleParams::from_json("market_cap", &serde_json::json!({"min": 500, "max": 50}));
    assert!(bad.is_err());

    // A valid update round-trips through storage.
    let good = RuleParams::from_json("market_cap", &serde_json::json!({"min": 30, "max": 800}))
        .unwrap();
    f.configs
        .update("market_cap", None, None, None, Some(good.clone()))
        .unwrap();
    let configs = f.configs.list_enabled().unwrap();
    let market_cap = configs.iter().find(|c| c.rule_key == "market_cap").unwrap();
    assert_eq!(market_cap.params, good);

    // Unknown keys are rejected.
    assert!(f.configs.update("moon_phase", Some(true), None, None, None).is_err());
}
