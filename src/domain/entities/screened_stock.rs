use crate::domain::values::day::Day;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live per-stock snapshot at screening time. Fields the upstream could not
/// provide stay `None`; rules treat missing data as neutral.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub price: Option<f64>,
    pub pct_change: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub turnover_rate: Option<f64>,
    /// Total market cap in 100M CNY (亿).
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub roe: Option<f64>,
}

/// Pool-1 candidate: a sector constituent that passed the broad screen.
/// Natural key `(day, sector, stock_code)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenedStock {
    pub id: String,
    pub day: Day,
    pub sector: String,
    pub stock_code: String,
    pub stock_name: String,
    pub topic_id: String,
    pub snapshot: StockSnapshot,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl ScreenedStock {
    pub fn new(
        day: Day,
        sector: String,
        stock_code: String,
        stock_name: String,
        topic_id: String,
        snapshot: StockSnapshot,
        reason: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            day,
            sector,
            stock_code,
            stock_name,
            topic_id,
            snapshot,
            reason,
            created_at: Utc::now(),
        }
    }
}
