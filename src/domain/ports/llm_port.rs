use crate::domain::error::DomainError;
use async_trait::async_trait;

/// Raw completion access to the LLM. The provider returns untyped text;
/// all structure is imposed by the topic-extraction use case.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, DomainError>;
}
