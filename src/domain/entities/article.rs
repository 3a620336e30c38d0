use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One ingested article. Content-addressed by `(account_id, url_hash)`;
/// re-discovery of the same URL only touches `last_seen_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSeed {
    pub id: String,
    pub account_id: String,
    pub url: String,
    pub url_hash: String,
    pub title: String,
    pub digest: String,
    pub post_time: DateTime<Utc>,
    pub is_deleted: bool,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl ArticleSeed {
    pub fn new(
        account_id: String,
        url: String,
        title: String,
        digest: String,
        post_time: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        let url_hash = Self::hash_url(&url);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            account_id,
            url,
            url_hash,
            title,
            digest,
            post_time,
            is_deleted: false,
            first_seen_at: now,
            last_seen_at: now,
        }
    }

    pub fn hash_url(url: &str) -> String {
        hex::encode(Sha256::digest(url.as_bytes()))
    }
}

/// Raw list item as returned by the article-source collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub digest: String,
    pub post_time: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_hash_is_stable() {
        let a = ArticleSeed::hash_url("https://example.com/a");
        let b = ArticleSeed::hash_url("https://example.com/a");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
