use crate::domain::entities::article::ArticleRecord;
use crate::domain::error::DomainError;
use async_trait::async_trait;

/// The scraping collaborator, reduced to its interface boundary: give it an
/// account name, get back structured list items. A missing provider key
/// surfaces as `MissingConfig`, distinct from transient network failures.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_articles(&self, account_name: &str) -> Result<Vec<ArticleRecord>, DomainError>;
}
