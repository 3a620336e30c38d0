use crate::domain::entities::account::Account;
use crate::domain::error::DomainError;
use crate::domain::values::day::Day;

pub trait AccountRepository: Send + Sync {
    /// Insert, or update the existing row matched by name.
    fn upsert(&self, account: &Account) -> Result<Account, DomainError>;

    fn get_by_name(&self, name: &str) -> Result<Option<Account>, DomainError>;

    fn list(&self, enabled_only: bool) -> Result<Vec<Account>, DomainError>;

    /// Enabled accounts whose last successful fetch date is exactly 1 or 2
    /// days before `today`. Stragglers further behind are excluded; they
    /// require an explicit per-account fetch.
    fn stale_accounts(&self, today: Day) -> Result<Vec<Account>, DomainError>;

    fn touch_last_fetch(&self, account_id: &str) -> Result<(), DomainError>;

    fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), DomainError>;
}
