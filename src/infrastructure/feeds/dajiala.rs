use crate::domain::entities::article::ArticleRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::article_source::ArticleSource;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_URL: &str = "https://www.dajiala.com/fbmain/monitor/v3/post_condition";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ATTEMPTS: u32 = 3;
const RETRY_SLEEP: Duration = Duration::from_secs(1);

/// Dajiala article listing client. One POST per account name; the upstream
/// returns the account's recent posts as structured records.
pub struct DajialaSource {
    client: Client,
    api_key: String,
    api_url: String,
}

#[derive(Serialize)]
struct ListRequest<'a> {
    biz: &'a str,
    url: &'a str,
    name: &'a str,
    key: &'a str,
    verifycode: &'a str,
}

#[derive(Deserialize)]
struct ListResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Vec<ListItem>,
}

#[derive(Deserialize)]
struct ListItem {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    digest: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    post_time: Option<i64>,
    #[serde(default)]
    is_deleted: Option<i64>,
}

impl DajialaSource {
    pub fn new(api_key: Option<String>, api_url: Option<String>) -> Result<Self, DomainError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DomainError::MissingConfig("DAJIALA_KEY is not set".into()))?;
        Ok(Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|e| DomainError::Network(e.to_string()))?,
            api_key,
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }

    /// Upstream codes that indicate throttling or flakiness worth one more try.
    fn is_transient_code(code: i64) -> bool {
        matches!(code, -1 | 111 | 112)
    }

    async fn fetch_once(&self, account_name: &str) -> Result<ListResponse, DomainError> {
        let resp = self
            .client
            .post(&self.api_url)
            .json(&ListRequest {
                biz: "",
                url: "",
                name: account_name,
                key: &self.api_key,
                verifycode: "",
            })
            .send()
            .await
            .map_err(|e| DomainError::Network(format!("Dajiala: {e}")))?;
        if !resp.status().is_success() {
            return Err(DomainError::Network(format!(
                "Dajiala returned {}",
                resp.status()
            )));
        }
        resp.json()
            .await
            .map_err(|e| DomainError::Parse(format!("Dajiala response: {e}")))
    }
}

#[async_trait::async_trait]
impl ArticleSource for DajialaSource {
    async fn fetch_articles(&self, account_name: &str) -> Result<Vec<ArticleRecord>, DomainError> {
        let mut last_err: Option<DomainError> = None;
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(RETRY_SLEEP * attempt).await;
            }
            match self.fetch_once(account_name).await {
                Ok(body) if body.code == 0 => {
                    let records = body
                        .data
                        .into_iter()
                        .filter_map(|item| {
                            let url = item.url.unwrap_or_default();
                            let title = item.title.unwrap_or_default();
                            if url.is_empty() || title.is_empty() {
                                return None;
                            }
                            let post_time = item
                                .post_time
                                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))?;
                            Some(ArticleRecord {
                                url,
                                title,
                                digest: item.digest.unwrap_or_default(),
                                post_time,
                                is_deleted: item.is_deleted.unwrap_or(0) != 0,
                            })
                        })
                        .collect();
                    return Ok(records);
                }
                Ok(body) if Self::is_transient_code(body.code) => {
                    debug!(account = account_name, code = body.code, "Dajiala transient code");
                    last_err = Some(DomainError::RateLimited(format!(
                        "Dajiala code {}: {}",
                        body.code,
                        body.msg.unwrap_or_default()
                    )));
                }
                Ok(body) => {
                    return Err(DomainError::Network(format!(
                        "Dajiala code {}: {}",
                        body.code,
                        body.msg.unwrap_or_default()
                    )));
                }
                Err(e @ DomainError::Network(_)) => {
                    debug!(account = account_name, error = %e, "Dajiala fetch failed");
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| DomainError::Network("Dajiala: no attempts made".into())))
    }
}
