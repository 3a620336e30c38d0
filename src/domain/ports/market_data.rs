use crate::domain::entities::screened_stock::StockSnapshot;
use crate::domain::error::DomainError;
use async_trait::async_trait;
use serde::Serialize;

/// A named sector/concept board on the exchange data provider.
#[derive(Debug, Clone, Serialize)]
pub struct BoardRef {
    pub name: String,
    pub code: String,
}

/// One constituent row as listed under a board, with the quote fields the
/// board listing already carries.
#[derive(Debug, Clone, Serialize)]
pub struct StockQuote {
    pub code: String,
    pub name: String,
    pub price: Option<f64>,
    pub pct_change: Option<f64>,
    pub open: Option<f64>,
    pub prev_close: Option<f64>,
    pub turnover_rate: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
}

#[async_trait]
pub trait MarketData: Send + Sync {
    /// Industry board list (used as the LLM's allowed-sector candidates).
    async fn industry_boards(&self) -> Result<Vec<BoardRef>, DomainError>;

    /// Concept board list.
    async fn concept_boards(&self) -> Result<Vec<BoardRef>, DomainError>;

    /// All constituents of a board, paginated upstream.
    async fn constituents(&self, board_code: &str) -> Result<Vec<StockQuote>, DomainError>;

    /// Per-stock live snapshot. `Ok(None)` means the upstream had no data
    /// for the symbol; callers treat that as a per-symbol fetch failure,
    /// never as a stage failure.
    async fn snapshot(&self, stock_code: &str) -> Result<Option<StockSnapshot>, DomainError>;
}
