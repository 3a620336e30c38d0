//! Topic-extraction tests: mention thresholds, the candidate-list
//! constraint, and schema-retry behavior.

mod common;

use common::{day, record, setup, StubLlm, StubMarket, StubSource};
use sectorpick::config::Thresholds;
use sectorpick::domain::error::DomainError;
use sectorpick::domain::values::stage::{Stage, StageStatus};
use std::sync::Arc;

fn source_four_articles() -> Arc<StubSource> {
    let d = day("2026-01-20");
    let mut source = StubSource::default();
    source.articles.insert(
        "财经早餐".into(),
        vec![
            record("https://mp.example.com/a1", "AI热潮", "大模型...", d),
            record("https://mp.example.com/a2", "AI算力紧缺", "GPU...", d),
            record("https://mp.example.com/a3", "AI应用落地", "办公...", d),
            record("https://mp.example.com/a4", "低空经济起飞", "eVTOL...", d),
        ],
    );
    Arc::new(source)
}

async fn ingest(sp: &sectorpick::SectorPick, t: &Thresholds) {
    sp.add_account("财经早餐").unwrap();
    sp.run_stage(day("2026-01-20"), Stage::Ingest, false, t)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_min_mention_filters_single_mention_sector() {
    // "人工智能" is referenced by three articles, "低空经济" by one; with
    // min_mention 2 only the former persists.
    let reply = r#"{"sectors":[
        {"name":"人工智能","articleIndexes":[1,2,3],"reason":"三篇提及"},
        {"name":"低空经济","articleIndexes":[4],"reason":"一篇提及"}
    ]}"#;
    let llm = StubLlm::with_responses(&[reply]);
    let sp = setup(llm, Arc::new(StubMarket::default()), source_four_articles());

    let t = Thresholds {
        min_mention: 2,
        ..Default::default()
    };
    ingest(&sp, &t).await;

    let d = day("2026-01-20");
    sp.run_stage(d, Stage::Topics, false, &t).await.unwrap();

    let topics = sp.list_topics(d).unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].sector, "人工智能");
    assert_eq!(topics[0].mention_count, 3);
    assert_eq!(topics[0].article_ids.len(), 3);
}

#[tokio::test]
async fn test_candidate_constraint_drops_unknown_sectors() {
    let reply = r#"{"sectors":[
        {"name":"半导体","articleIndexes":[1,2],"reason":""},
        {"name":"量子科技","articleIndexes":[1,2,3],"reason":""}
    ]}"#;
    let llm = StubLlm::with_responses(&[reply]);
    let market = Arc::new(StubMarket {
        industries: vec![StubMarket::board("半导体", "BK1")],
        ..Default::default()
    });
    let sp = setup(llm, market, source_four_articles());

    let t = Thresholds {
        min_mention: 2,
        ..Default::default()
    };
    ingest(&sp, &t).await;

    let d = day("2026-01-20");
    sp.run_stage(d, Stage::Topics, false, &t).await.unwrap();

    // "量子科技" is not an industry board name: dropped, never substituted.
    let topics = sp.list_topics(d).unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].sector, "半导体");
}

#[tokio::test]
async fn test_duplicate_indexes_count_distinct_articles() {
    let reply = r#"{"sectors":[
        {"name":"人工智能","articleIndexes":[1,1,2,99,0],"reason":""}
    ]}"#;
    let llm = StubLlm::with_responses(&[reply]);
    let sp = setup(llm, Arc::new(StubMarket::default()), source_four_articles());

    let t = Thresholds {
        min_mention: 1,
        ..Default::default()
    };
    ingest(&sp, &t).await;

    let d = day("2026-01-20");
    sp.run_stage(d, Stage::Topics, false, &t).await.unwrap();

    // Duplicates collapse and out-of-range indexes are ignored.
    let topics = sp.list_topics(d).unwrap();
    assert_eq!(topics[0].mention_count, 2);
}

#[tokio::test]
async fn test_fenced_json_is_tolerated() {
    let reply = "```json\n{\"sectors\":[{\"name\":\"人工智能\",\"articleIndexes\":[1,2],\"reason\":\"\"}]}\n```";
    let llm = StubLlm::with_responses(&[reply]);
    let sp = setup(llm.clone(), Arc::new(StubMarket::default()), source_four_articles());

    let t = Thresholds {
        min_mention: 1,
        ..Default::default()
    };
    ingest(&sp, &t).await;

    let d = day("2026-01-20");
    sp.run_stage(d, Stage::Topics, false, &t).await.unwrap();
    assert_eq!(sp.list_topics(d).unwrap().len(), 1);
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_schema_retry_then_success() {
    let good = r#"{"sectors":[{"name":"人工智能","articleIndexes":[1,2],"reason":""}]}"#;
    let llm = StubLlm::with_responses(&["这不是 JSON", good]);
    let sp = setup(llm.clone(), Arc::new(StubMarket::default()), source_four_articles());

    let t = Thresholds {
        min_mention: 1,
        ..Default::default()
    };
    ingest(&sp, &t).await;

    let d = day("2026-01-20");
    sp.run_stage(d, Stage::Topics, false, &t).await.unwrap();
    assert_eq!(llm.call_count(), 2);
    assert_eq!(sp.list_topics(d).unwrap().len(), 1);
}

#[tokio::test]
async fn test_persistently_malformed_output_fails_stage() {
    let llm = StubLlm::with_responses(&["永远不是 JSON"]);
    let sp = setup(llm.clone(), Arc::new(StubMarket::default()), source_four_articles());

    let t = Thresholds {
        min_mention: 1,
        ..Default::default()
    };
    ingest(&sp, &t).await;

    let d = day("2026-01-20");
    let err = sp.run_stage(d, Stage::Topics, false, &t).await.unwrap_err();
    assert!(matches!(err, DomainError::MalformedLlmOutput(_)));
    // First attempt plus two stricter re-asks.
    assert_eq!(llm.call_count(), 3);
    assert!(sp.list_topics(d).unwrap().is_empty());
    assert_eq!(sp.status(d).unwrap().topics.status, StageStatus::Failed);
}
