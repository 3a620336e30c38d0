use crate::config::Thresholds;
use crate::domain::entities::screened_stock::{ScreenedStock, StockSnapshot};
use crate::domain::error::DomainError;
use crate::domain::ports::market_data::{BoardRef, MarketData};
use crate::domain::ports::pool_repository::PoolRepository;
use crate::domain::ports::topic_repository::TopicRepository;
use crate::domain::values::day::Day;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScreenOutcome {
    pub generated: usize,
    pub matched_sectors: usize,
    /// Sectors with no board match or whose constituent fetch failed.
    pub skipped_sectors: usize,
    /// Candidates excluded because their live snapshot could not be fetched.
    pub snapshot_failures: usize,
}

/// Common article sectors are broader than EastMoney concept names; this
/// short alias table routes them before the contains heuristics.
const SECTOR_ALIASES: &[(&str, &[&str])] = &[
    (
        "人工智能",
        &["AI应用", "AI算力", "AI服务器", "AI芯片", "AIGC概念", "ChatGPT概念"],
    ),
    ("黄金", &["黄金概念", "黄金"]),
    ("光伏", &["光伏概念", "光伏设备", "TOPCon电池", "HJT电池", "钙钛矿电池"]),
    ("芯片", &["芯片", "国产芯片", "先进封装", "存储芯片", "光刻机"]),
    ("军工", &["军工", "军民融合", "国防军工"]),
    ("机器人", &["机器人概念", "人形机器人", "工业母机"]),
    ("算力", &["AI算力", "算力租赁", "数据中心"]),
    ("新能源车", &["新能源汽车", "新能源车", "锂电池概念", "固态电池"]),
];

pub struct ScreenUseCase {
    topics: Arc<dyn TopicRepository>,
    pools: Arc<dyn PoolRepository>,
    market: Arc<dyn MarketData>,
}

impl ScreenUseCase {
    pub fn new(
        topics: Arc<dyn TopicRepository>,
        pools: Arc<dyn PoolRepository>,
        market: Arc<dyn MarketData>,
    ) -> Self {
        Self {
            topics,
            pools,
            market,
        }
    }

    pub async fn execute(
        &self,
        day: Day,
        t: &Thresholds,
        snapshot_concurrency: usize,
    ) -> Result<ScreenOutcome, DomainError> {
        let mut topics = self.topics.list_for_day(day)?;
        topics.truncate(t.max_sectors);
        if topics.is_empty() {
            self.pools.replace_pool1(day, &[])?;
            return Ok(ScreenOutcome::default());
        }

        // Board lists are fetched once per run; an empty list just means no
        // match for that kind.
        let concepts = self.market.concept_boards().await.unwrap_or_else(|e| {
            warn!(error = %e, "concept board list unavailable");
            Vec::new()
        });
        let industries = self.market.industry_boards().await.unwrap_or_else(|e| {
            warn!(error = %e, "industry board list unavailable");
            Vec::new()
        });

        let mut outcome = ScreenOutcome::default();
        let mut candidates: Vec<ScreenedStock> = Vec::new();
        for topic in &topics {
            let Some(board) = match_board(&topic.sector, &concepts, &industries) else {
                warn!(sector = %topic.sector, "no board match");
                outcome.skipped_sectors += 1;
                continue;
            };
            let quotes = match self.market.constituents(&board.code).await {
                Ok(quotes) => quotes,
                Err(e) => {
                    warn!(sector = %topic.sector, board = %board.code, error = %e, "constituent fetch failed");
                    outcome.skipped_sectors += 1;
                    continue;
                }
            };
            outcome.matched_sectors += 1;
            for quote in quotes {
                // Both filter fields must be present; inclusive thresholds.
                let (Some(pct), Some(turnover)) = (quote.pct_change, quote.turnover_rate) else {
                    continue;
                };
                if pct < t.min_change || turnover < t.min_turnover {
                    continue;
                }
                candidates.push(ScreenedStock::new(
                    day,
                    topic.sector.clone(),
                    quote.code,
                    quote.name,
                    topic.id.clone(),
                    StockSnapshot {
                        price: quote.price,
                        pct_change: Some(pct),
                        turnover_rate: Some(turnover),
                        pe_ratio: quote.pe_ratio,
                        pb_ratio: quote.pb_ratio,
                        ..Default::default()
                    },
                    format!("{} 涨{:.2}% 换手{:.2}%", topic.sector, pct, turnover),
                ));
            }
        }

        let (rows, snapshot_failures) = self
            .enrich_snapshots(candidates, snapshot_concurrency)
            .await;
        outcome.snapshot_failures = snapshot_failures;
        outcome.generated = rows.len();

        self.pools.replace_pool1(day, &rows)?;
        info!(
            day = %day,
            generated = outcome.generated,
            skipped = outcome.skipped_sectors,
            snapshot_failures,
            "broad pool built"
        );
        Ok(outcome)
    }

    /// Fill the snapshot-only fields (volume ratio, market cap, ROE) with
    /// bounded concurrency. A candidate whose snapshot cannot be fetched is
    /// excluded and counted; the stage never fails over one symbol.
    async fn enrich_snapshots(
        &self,
        candidates: Vec<ScreenedStock>,
        concurrency: usize,
    ) -> (Vec<ScreenedStock>, usize) {
        let mut rows = Vec::with_capacity(candidates.len());
        let mut failures = 0;
        let mut set: JoinSet<(ScreenedStock, Result<Option<StockSnapshot>, DomainError>)> =
            JoinSet::new();
        let mut pending = candidates.into_iter();

        loop {
            while set.len() < concurrency.max(1) {
                let Some(stock) = pending.next() else { break };
                let market = Arc::clone(&self.market);
                set.spawn(async move {
                    let snap = market.snapshot(&stock.stock_code).await;
                    (stock, snap)
                });
            }
            let Some(joined) = set.join_next().await else { break };
            let Ok((mut stock, result)) = joined else {
                failures += 1;
                continue;
            };
            match result {
                Ok(Some(snap)) => {
                    stock.snapshot = StockSnapshot {
                        price: snap.price.or(stock.snapshot.price),
                        pct_change: stock.snapshot.pct_change,
                        volume_ratio: snap.volume_ratio,
                        turnover_rate: stock.snapshot.turnover_rate,
                        market_cap: snap.market_cap,
                        pe_ratio: snap.pe_ratio.or(stock.snapshot.pe_ratio),
                        pb_ratio: snap.pb_ratio.or(stock.snapshot.pb_ratio),
                        roe: snap.roe,
                    };
                    rows.push(stock);
                }
                Ok(None) => {
                    warn!(code = %stock.stock_code, "no snapshot data, excluding");
                    failures += 1;
                }
                Err(e) => {
                    warn!(code = %stock.stock_code, error = %e, "snapshot fetch failed, excluding");
                    failures += 1;
                }
            }
        }
        (rows, failures)
    }
}

/// Sector-to-board resolution: exact concept name, then the alias table,
/// then contains heuristics over concepts, then the same over industry
/// boards. Shortest containing name wins; longest contained name wins.
fn match_board<'a>(
    sector: &str,
    concepts: &'a [BoardRef],
    industries: &'a [BoardRef],
) -> Option<&'a BoardRef> {
    let sector = sector.trim();
    if sector.is_empty() {
        return None;
    }
    if let Some(board) = match_in(sector, concepts) {
        return Some(board);
    }
    match_in(sector, industries)
}

fn match_in<'a>(sector: &str, boards: &'a [BoardRef]) -> Option<&'a BoardRef> {
    if let Some(board) = boards.iter().find(|b| b.name == sector) {
        return Some(board);
    }

    if let Some((_, aliases)) = SECTOR_ALIASES.iter().find(|(key, _)| *key == sector) {
        for alias in *aliases {
            if let Some(board) = boards.iter().find(|b| b.name == *alias) {
                return Some(board);
            }
        }
        for alias in *aliases {
            let mut containing: Vec<&BoardRef> =
                boards.iter().filter(|b| b.name.contains(alias)).collect();
            containing.sort_by_key(|b| (b.name.chars().count(), b.name.clone()));
            if let Some(board) = containing.first() {
                return Some(board);
            }
        }
    }

    let mut containing: Vec<&BoardRef> =
        boards.iter().filter(|b| b.name.contains(sector)).collect();
    if !containing.is_empty() {
        containing.sort_by_key(|b| (b.name.chars().count(), b.name.clone()));
        return containing.first().copied();
    }

    let mut contained: Vec<&BoardRef> =
        boards.iter().filter(|b| sector.contains(&b.name)).collect();
    contained.sort_by_key(|b| (usize::MAX - b.name.chars().count(), b.name.clone()));
    contained.first().copied()
}
