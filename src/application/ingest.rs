use crate::domain::entities::article::ArticleSeed;
use crate::domain::error::DomainError;
use crate::domain::ports::account_repository::AccountRepository;
use crate::domain::ports::article_repository::ArticleRepository;
use crate::domain::ports::article_source::ArticleSource;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of fetching one account.
#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub account: String,
    /// New article rows created.
    pub stored: usize,
    /// Already-known articles whose last_seen_at was touched.
    pub refreshed: usize,
}

/// Result of an ingest pass over all enabled accounts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestOutcome {
    pub accounts: usize,
    pub stored: usize,
    pub refreshed: usize,
    pub fetch_failures: usize,
    pub first_error: Option<String>,
}

pub struct IngestUseCase {
    accounts: Arc<dyn AccountRepository>,
    articles: Arc<dyn ArticleRepository>,
    source: Arc<dyn ArticleSource>,
}

impl IngestUseCase {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        articles: Arc<dyn ArticleRepository>,
        source: Arc<dyn ArticleSource>,
    ) -> Self {
        Self {
            accounts,
            articles,
            source,
        }
    }

    /// Fetch one account's recent articles and upsert them. Config errors
    /// (missing provider key) and unknown accounts propagate; this is the
    /// building block both the ingest stage and catch-up reuse.
    pub async fn fetch_account(&self, name: &str) -> Result<FetchOutcome, DomainError> {
        let account = self
            .accounts
            .get_by_name(name)?
            .ok_or_else(|| DomainError::NotFound(format!("account {name}")))?;

        let records = self.source.fetch_articles(&account.name).await?;
        let mut stored = 0;
        let mut refreshed = 0;
        for record in records {
            let seed = ArticleSeed::new(
                account.id.clone(),
                record.url,
                record.title,
                record.digest,
                record.post_time,
            );
            let seed = ArticleSeed {
                is_deleted: record.is_deleted,
                ..seed
            };
            if self.articles.upsert(&seed)? {
                stored += 1;
            } else {
                refreshed += 1;
            }
        }
        self.accounts.touch_last_fetch(&account.id)?;
        info!(account = name, stored, refreshed, "account fetched");
        Ok(FetchOutcome {
            account: account.name,
            stored,
            refreshed,
        })
    }

    /// Ingest pass over all enabled accounts. Per-account failures are
    /// absorbed into the failure counter; only a missing provider key stops
    /// the pass, since every subsequent fetch would fail the same way.
    pub async fn execute(&self) -> Result<IngestOutcome, DomainError> {
        let accounts = self.accounts.list(true)?;
        let mut outcome = IngestOutcome {
            accounts: accounts.len(),
            ..Default::default()
        };
        for account in &accounts {
            match self.fetch_account(&account.name).await {
                Ok(fetched) => {
                    outcome.stored += fetched.stored;
                    outcome.refreshed += fetched.refreshed;
                }
                Err(e @ DomainError::MissingConfig(_)) => return Err(e),
                Err(e) => {
                    warn!(account = %account.name, error = %e, "account fetch failed");
                    outcome.fetch_failures += 1;
                    if outcome.first_error.is_none() {
                        outcome.first_error = Some(format!("{}: {e}", account.name));
                    }
                }
            }
        }
        Ok(outcome)
    }
}
