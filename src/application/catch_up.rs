use crate::application::ingest::IngestUseCase;
use crate::domain::error::DomainError;
use crate::domain::ports::account_repository::AccountRepository;
use crate::domain::values::day::Day;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct CatchUpOutcome {
    pub ok_count: usize,
    pub fail_count: usize,
    /// Detail of the first failure only; the rest are just counted.
    pub first_error: Option<String>,
}

/// Catch-up fetch for accounts that missed one or two daily runs. Strictly
/// serial with a fixed delay between attempts, to stay inside the article
/// provider's rate expectations.
pub struct CatchUpUseCase {
    accounts: Arc<dyn AccountRepository>,
    ingest: Arc<IngestUseCase>,
}

impl CatchUpUseCase {
    pub fn new(accounts: Arc<dyn AccountRepository>, ingest: Arc<IngestUseCase>) -> Self {
        Self { accounts, ingest }
    }

    pub async fn execute(&self, today: Day, delay: Duration) -> Result<CatchUpOutcome, DomainError> {
        let stale = self.accounts.stale_accounts(today)?;
        info!(count = stale.len(), "catch-up candidates");

        let mut outcome = CatchUpOutcome::default();
        for (i, account) in stale.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(delay).await;
            }
            match self.ingest.fetch_account(&account.name).await {
                Ok(_) => outcome.ok_count += 1,
                Err(e) => {
                    warn!(account = %account.name, error = %e, "catch-up fetch failed");
                    outcome.fail_count += 1;
                    if outcome.first_error.is_none() {
                        outcome.first_error = Some(format!("{}: {e}", account.name));
                    }
                }
            }
        }
        Ok(outcome)
    }
}
