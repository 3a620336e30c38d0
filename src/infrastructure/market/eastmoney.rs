use crate::domain::entities::screened_stock::StockSnapshot;
use crate::domain::error::DomainError;
use crate::domain::ports::market_data::{BoardRef, MarketData, StockQuote};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

// push2 proper sometimes redirects into empty replies; the delay host has
// been stable.
const CLIST_URL: &str = "https://push2delay.eastmoney.com/api/qt/clist/get";
const QUOTE_URL: &str = "https://push2.eastmoney.com/api/qt/stock/get";
const CLIST_UT: &str = "bd1d9ddb04089700cf9c27f6f7426281";
const QUOTE_UT: &str = "fa5fd1943c7b386f172d6893dbfba10b";
const PAGE_SIZE: usize = 200;
const MAX_PAGES: usize = 10;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

/// EastMoney quote gateway with per-call proxy fallback: when a proxy is
/// configured, each request tries the proxied client first and retries once
/// directly on failure. The fallback is per call, never a sticky switch.
pub struct EastMoneyGateway {
    direct: Client,
    proxied: Option<Client>,
}

impl EastMoneyGateway {
    pub fn new(proxy_url: Option<&str>) -> Result<Self, DomainError> {
        let direct = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .no_proxy()
            .build()
            .map_err(|e| DomainError::Network(e.to_string()))?;
        let proxied = match proxy_url {
            Some(url) if !url.trim().is_empty() => {
                let proxy = reqwest::Proxy::all(url)
                    .map_err(|e| DomainError::InvalidInput(format!("Bad proxy URL: {e}")))?;
                Some(
                    Client::builder()
                        .user_agent(USER_AGENT)
                        .timeout(REQUEST_TIMEOUT)
                        .proxy(proxy)
                        .build()
                        .map_err(|e| DomainError::Network(e.to_string()))?,
                )
            }
            _ => None,
        };
        Ok(Self { direct, proxied })
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, DomainError> {
        if let Some(proxied) = &self.proxied {
            match Self::get_json_with(proxied, url, query).await {
                Ok(v) => return Ok(v),
                Err(e) => debug!(error = %e, "proxied request failed, retrying direct"),
            }
        }
        Self::get_json_with(&self.direct, url, query).await
    }

    async fn get_json_with(
        client: &Client,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value, DomainError> {
        let resp = client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| DomainError::Network(format!("EastMoney: {e}")))?;
        if !resp.status().is_success() {
            return Err(DomainError::Network(format!(
                "EastMoney returned {}",
                resp.status()
            )));
        }
        resp.json()
            .await
            .map_err(|e| DomainError::Parse(format!("EastMoney response: {e}")))
    }

    /// One clist page. `fid` is the upstream sort key, kept stable so
    /// pagination does not shuffle.
    async fn clist_page(
        &self,
        fs: &str,
        fields: &str,
        fid: &str,
        page: usize,
    ) -> Result<Vec<Value>, DomainError> {
        let query = [
            ("pn", page.to_string()),
            ("pz", PAGE_SIZE.to_string()),
            ("po", "1".to_string()),
            ("np", "1".to_string()),
            ("ut", CLIST_UT.to_string()),
            ("fltt", "2".to_string()),
            ("invt", "2".to_string()),
            ("fid", fid.to_string()),
            ("fs", fs.to_string()),
            ("fields", fields.to_string()),
        ];
        let json = self.get_json(CLIST_URL, &query).await?;
        let diff = json
            .pointer("/data/diff")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        Ok(diff)
    }

    async fn board_list(&self, fs: &str) -> Result<Vec<BoardRef>, DomainError> {
        let mut boards = Vec::new();
        for page in 1..=MAX_PAGES {
            let diff = self.clist_page(fs, "f12,f14", "f12", page).await?;
            if diff.is_empty() {
                break;
            }
            let count = diff.len();
            for item in diff {
                let code = str_field(&item, "f12");
                let name = str_field(&item, "f14");
                if !code.is_empty() && !name.is_empty() {
                    boards.push(BoardRef { name, code });
                }
            }
            if count < PAGE_SIZE {
                break;
            }
        }
        Ok(boards)
    }

    fn secid(stock_code: &str) -> String {
        // Shanghai listings start with 6, everything else trades on Shenzhen
        // as far as this pipeline cares.
        if stock_code.starts_with('6') {
            format!("1.{stock_code}")
        } else {
            format!("0.{stock_code}")
        }
    }
}

/// Missing clist values arrive as the string "-"; treat those as absent.
fn num_field(item: &Value, key: &str) -> Option<f64> {
    item.get(key).and_then(|v| v.as_f64())
}

fn str_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Quote endpoint values are fixed-point integers scaled by 100.
fn scaled_field(item: &Value, key: &str) -> Option<f64> {
    item.get(key).and_then(|v| v.as_f64()).map(|n| n / 100.0)
}

#[async_trait::async_trait]
impl MarketData for EastMoneyGateway {
    async fn industry_boards(&self) -> Result<Vec<BoardRef>, DomainError> {
        self.board_list("m:90+t:2+f:!50").await
    }

    async fn concept_boards(&self) -> Result<Vec<BoardRef>, DomainError> {
        self.board_list("m:90+t:3+f:!50").await
    }

    async fn constituents(&self, board_code: &str) -> Result<Vec<StockQuote>, DomainError> {
        let fs = format!("b:{board_code}+f:!50");
        let mut quotes = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for page in 1..=MAX_PAGES {
            let diff = self
                .clist_page(&fs, "f12,f14,f2,f3,f17,f18,f8,f9,f23", "f3", page)
                .await?;
            if diff.is_empty() {
                break;
            }
            let count = diff.len();
            for item in diff {
                let code = str_field(&item, "f12");
                if code.is_empty() || !seen.insert(code.clone()) {
                    continue;
                }
                quotes.push(StockQuote {
                    name: str_field(&item, "f14"),
                    code,
                    price: num_field(&item, "f2"),
                    pct_change: num_field(&item, "f3"),
                    open: num_field(&item, "f17"),
                    prev_close: num_field(&item, "f18"),
                    turnover_rate: num_field(&item, "f8"),
                    pe_ratio: num_field(&item, "f9"),
                    pb_ratio: num_field(&item, "f23"),
                });
            }
            if count < PAGE_SIZE {
                break;
            }
        }
        Ok(quotes)
    }

    async fn snapshot(&self, stock_code: &str) -> Result<Option<StockSnapshot>, DomainError> {
        let query = [
            ("secid", Self::secid(stock_code)),
            ("ut", QUOTE_UT.to_string()),
            (
                "fields",
                "f43,f50,f57,f58,f116,f162,f167,f168,f170,f37".to_string(),
            ),
        ];
        let json = self.get_json(QUOTE_URL, &query).await?;
        let data = match json.get("data") {
            Some(d) if !d.is_null() => d.clone(),
            _ => return Ok(None),
        };
        Ok(Some(StockSnapshot {
            price: scaled_field(&data, "f43"),
            pct_change: scaled_field(&data, "f170"),
            volume_ratio: scaled_field(&data, "f50"),
            turnover_rate: scaled_field(&data, "f168"),
            // f116 is total market cap in CNY; pool rows carry 亿.
            market_cap: num_field(&data, "f116").map(|v| v / 1e8),
            pe_ratio: scaled_field(&data, "f162"),
            pb_ratio: scaled_field(&data, "f167"),
            roe: scaled_field(&data, "f37"),
        }))
    }
}
