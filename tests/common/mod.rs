//! Shared test helpers: stub providers with call counters, plus a facade
//! builder on in-memory SQLite.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sectorpick::domain::entities::article::ArticleRecord;
use sectorpick::domain::entities::screened_stock::StockSnapshot;
use sectorpick::domain::error::DomainError;
use sectorpick::domain::ports::article_source::ArticleSource;
use sectorpick::domain::ports::llm_port::LlmProvider;
use sectorpick::domain::ports::market_data::{BoardRef, MarketData, StockQuote};
use sectorpick::domain::values::day::Day;
use sectorpick::SectorPick;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn day(s: &str) -> Day {
    s.parse().unwrap()
}

/// An article posted mid-morning on `d`.
pub fn record(url: &str, title: &str, digest: &str, d: Day) -> ArticleRecord {
    ArticleRecord {
        url: url.to_string(),
        title: title.to_string(),
        digest: digest.to_string(),
        post_time: post_time(d),
        is_deleted: false,
    }
}

pub fn post_time(d: Day) -> DateTime<Utc> {
    d.date()
        .and_hms_opt(10, 0, 0)
        .unwrap()
        .and_utc()
}

/// Canned-response LLM. Responses are consumed front-to-back; the last one
/// repeats once the queue runs dry.
#[derive(Default)]
pub struct StubLlm {
    responses: Mutex<VecDeque<String>>,
    pub calls: AtomicUsize,
}

impl StubLlm {
    pub fn with_responses(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmProvider for StubLlm {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut queue = self.responses.lock().unwrap();
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap())
        } else {
            queue
                .front()
                .cloned()
                .ok_or_else(|| DomainError::Network("stub llm has no responses".into()))
        }
    }
}

/// Quote gateway stub: boards, constituents and snapshots set up per test.
/// A code without a snapshot entry answers `Ok(None)`.
#[derive(Default)]
pub struct StubMarket {
    pub industries: Vec<BoardRef>,
    pub concepts: Vec<BoardRef>,
    pub constituents: HashMap<String, Vec<StockQuote>>,
    pub snapshots: HashMap<String, StockSnapshot>,
    pub constituent_calls: AtomicUsize,
    pub snapshot_calls: AtomicUsize,
}

impl StubMarket {
    pub fn board(name: &str, code: &str) -> BoardRef {
        BoardRef {
            name: name.to_string(),
            code: code.to_string(),
        }
    }

    pub fn quote(code: &str, name: &str, pct: f64, turnover: f64) -> StockQuote {
        StockQuote {
            code: code.to_string(),
            name: name.to_string(),
            price: Some(10.0),
            pct_change: Some(pct),
            open: Some(9.5),
            prev_close: Some(9.5),
            turnover_rate: Some(turnover),
            pe_ratio: Some(30.0),
            pb_ratio: Some(3.0),
        }
    }

    pub fn snapshot(market_cap: f64, volume_ratio: f64, roe: f64) -> StockSnapshot {
        StockSnapshot {
            price: Some(10.0),
            pct_change: Some(6.0),
            volume_ratio: Some(volume_ratio),
            turnover_rate: Some(6.0),
            market_cap: Some(market_cap),
            pe_ratio: Some(30.0),
            pb_ratio: Some(3.0),
            roe: Some(roe),
        }
    }
}

#[async_trait::async_trait]
impl MarketData for StubMarket {
    async fn industry_boards(&self) -> Result<Vec<BoardRef>, DomainError> {
        Ok(self.industries.clone())
    }

    async fn concept_boards(&self) -> Result<Vec<BoardRef>, DomainError> {
        Ok(self.concepts.clone())
    }

    async fn constituents(&self, board_code: &str) -> Result<Vec<StockQuote>, DomainError> {
        self.constituent_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.constituents.get(board_code).cloned().unwrap_or_default())
    }

    async fn snapshot(&self, stock_code: &str) -> Result<Option<StockSnapshot>, DomainError> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshots.get(stock_code).cloned())
    }
}

/// Article-source stub. `failing` accounts error as transient network
/// failures; fetch order is recorded for serial-batch assertions.
#[derive(Default)]
pub struct StubSource {
    pub articles: HashMap<String, Vec<ArticleRecord>>,
    pub failing: HashSet<String>,
    pub fetch_order: Mutex<Vec<String>>,
}

impl StubSource {
    pub fn fetched(&self) -> Vec<String> {
        self.fetch_order.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ArticleSource for StubSource {
    async fn fetch_articles(&self, account_name: &str) -> Result<Vec<ArticleRecord>, DomainError> {
        self.fetch_order.lock().unwrap().push(account_name.to_string());
        if self.failing.contains(account_name) {
            return Err(DomainError::Network(format!("stub failure for {account_name}")));
        }
        Ok(self.articles.get(account_name).cloned().unwrap_or_default())
    }
}

pub fn setup(
    llm: Arc<StubLlm>,
    market: Arc<StubMarket>,
    source: Arc<StubSource>,
) -> SectorPick {
    SectorPick::with_providers(":memory:", llm, market, source, 2).unwrap()
}
