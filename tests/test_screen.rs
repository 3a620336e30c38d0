//! Broad-screen tests: inclusive thresholds, snapshot exclusion, and
//! unmatched sectors.

mod common;

use common::{day, record, setup, StubLlm, StubMarket, StubSource};
use sectorpick::config::Thresholds;
use sectorpick::domain::values::stage::{Stage, StageStatus};
use std::sync::Arc;

const REPLY: &str = r#"{"sectors":[{"name":"半导体","articleIndexes":[1,2],"reason":""}]}"#;

fn source() -> Arc<StubSource> {
    let d = day("2026-01-20");
    let mut source = StubSource::default();
    source.articles.insert(
        "财经早餐".into(),
        vec![
            record("https://mp.example.com/a1", "芯片", "x", d),
            record("https://mp.example.com/a2", "半导体", "y", d),
        ],
    );
    Arc::new(source)
}

fn thresholds() -> Thresholds {
    Thresholds {
        min_mention: 1,
        ..Default::default()
    }
}

async fn run_through_screen(sp: &sectorpick::SectorPick, t: &Thresholds) {
    sp.add_account("财经早餐").unwrap();
    let d = day("2026-01-20");
    sp.run_stage(d, Stage::Ingest, false, t).await.unwrap();
    sp.run_stage(d, Stage::Topics, false, t).await.unwrap();
    sp.run_stage(d, Stage::Screen, false, t).await.unwrap();
}

#[tokio::test]
async fn test_thresholds_are_inclusive() {
    let mut market = StubMarket {
        industries: vec![StubMarket::board("半导体", "BK1")],
        ..Default::default()
    };
    market.constituents.insert(
        "BK1".into(),
        vec![
            // Exactly at min_change=5 and min_turnover=5: kept.
            StubMarket::quote("600111", "边界股", 5.0, 5.0),
            // Just below either threshold: dropped.
            StubMarket::quote("600222", "差一点", 4.99, 5.0),
            StubMarket::quote("600333", "也差一点", 5.0, 4.99),
        ],
    );
    for code in ["600111", "600222", "600333"] {
        market
            .snapshots
            .insert(code.into(), StubMarket::snapshot(120.0, 2.0, 8.0));
    }
    let sp = setup(StubLlm::with_responses(&[REPLY]), Arc::new(market), source());

    run_through_screen(&sp, &thresholds()).await;

    let pool1 = sp.list_pool1(day("2026-01-20")).unwrap();
    assert_eq!(pool1.len(), 1);
    assert_eq!(pool1[0].stock_code, "600111");
    assert_eq!(pool1[0].snapshot.pct_change, Some(5.0));
}

#[tokio::test]
async fn test_missing_snapshot_excludes_and_counts() {
    let mut market = StubMarket {
        industries: vec![StubMarket::board("半导体", "BK1")],
        ..Default::default()
    };
    market.constituents.insert(
        "BK1".into(),
        vec![
            StubMarket::quote("600111", "有快照", 6.0, 7.0),
            StubMarket::quote("600444", "无快照", 6.0, 7.0),
        ],
    );
    market
        .snapshots
        .insert("600111".into(), StubMarket::snapshot(120.0, 2.0, 8.0));
    let sp = setup(StubLlm::with_responses(&[REPLY]), Arc::new(market), source());

    sp.add_account("财经早餐").unwrap();
    let d = day("2026-01-20");
    let t = thresholds();
    sp.run_stage(d, Stage::Ingest, false, &t).await.unwrap();
    sp.run_stage(d, Stage::Topics, false, &t).await.unwrap();
    let result = sp.run_stage(d, Stage::Screen, false, &t).await.unwrap();

    // The symbol without live data is excluded, not fatal.
    assert_eq!(result.status, StageStatus::Done);
    assert!(result.message.contains("1 snapshot failures"), "{}", result.message);
    let pool1 = sp.list_pool1(d).unwrap();
    assert_eq!(pool1.len(), 1);
    assert_eq!(pool1[0].stock_code, "600111");
    assert_eq!(pool1[0].snapshot.market_cap, Some(120.0));
    assert_eq!(pool1[0].snapshot.volume_ratio, Some(2.0));
}

#[tokio::test]
async fn test_unmatched_sector_is_skipped_not_fatal() {
    // No boards at all: the sector cannot match, the stage still completes.
    let sp = setup(
        StubLlm::with_responses(&[REPLY]),
        Arc::new(StubMarket::default()),
        source(),
    );

    sp.add_account("财经早餐").unwrap();
    let d = day("2026-01-20");
    let t = thresholds();
    sp.run_stage(d, Stage::Ingest, false, &t).await.unwrap();
    sp.run_stage(d, Stage::Topics, false, &t).await.unwrap();
    let result = sp.run_stage(d, Stage::Screen, false, &t).await.unwrap();

    assert_eq!(result.status, StageStatus::Done);
    assert!(result.message.contains("1 skipped"), "{}", result.message);
    assert!(sp.list_pool1(d).unwrap().is_empty());
}
