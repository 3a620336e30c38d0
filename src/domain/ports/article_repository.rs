use crate::domain::entities::article::ArticleSeed;
use crate::domain::error::DomainError;
use crate::domain::values::day::Day;

pub trait ArticleRepository: Send + Sync {
    /// Insert keyed by `(account_id, url_hash)`. On conflict the mutable
    /// columns are refreshed and `last_seen_at` is touched; `first_seen_at`
    /// and `id` are preserved. Returns true when a new row was created.
    fn upsert(&self, article: &ArticleSeed) -> Result<bool, DomainError>;

    /// Non-deleted articles posted on `day`, newest first (post_time desc,
    /// id desc — the deterministic order the topic stage truncates by).
    fn list_for_day(&self, day: Day, limit: usize) -> Result<Vec<ArticleSeed>, DomainError>;

    fn count_for_day(&self, day: Day) -> Result<usize, DomainError>;

    fn get_by_url(&self, account_id: &str, url: &str) -> Result<Option<ArticleSeed>, DomainError>;
}
