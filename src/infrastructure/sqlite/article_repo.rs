use crate::domain::entities::article::ArticleSeed;
use crate::domain::error::DomainError;
use crate::domain::ports::article_repository::ArticleRepository;
use crate::domain::values::day::Day;
use crate::infrastructure::sqlite::SharedConn;
use chrono::{DateTime, Utc};
use rusqlite::params;

const SELECT_COLS: &str =
    "id, account_id, url, url_hash, title, digest, post_time, is_deleted, first_seen_at, last_seen_at";

pub struct SqliteArticleRepo {
    conn: SharedConn,
}

impl SqliteArticleRepo {
    pub fn new(conn: SharedConn) -> Self {
        Self { conn }
    }

    fn row_to_article(row: &rusqlite::Row) -> Result<ArticleSeed, rusqlite::Error> {
        let post_time: String = row.get(6)?;
        let is_deleted: i32 = row.get(7)?;
        let first_seen: String = row.get(8)?;
        let last_seen: String = row.get(9)?;
        Ok(ArticleSeed {
            id: row.get(0)?,
            account_id: row.get(1)?,
            url: row.get(2)?,
            url_hash: row.get(3)?,
            title: row.get(4)?,
            digest: row.get(5)?,
            post_time: parse_ts(&post_time),
            is_deleted: is_deleted != 0,
            first_seen_at: parse_ts(&first_seen),
            last_seen_at: parse_ts(&last_seen),
        })
    }
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl ArticleRepository for SqliteArticleRepo {
    fn upsert(&self, article: &ArticleSeed) -> Result<bool, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let existing: Option<String> = conn
            .query_row(
                "SELECT id FROM articles WHERE account_id = ?1 AND url_hash = ?2",
                params![article.account_id, article.url_hash],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(DomainError::Database(other.to_string())),
            })?;

        match existing {
            Some(id) => {
                // Re-discovery: refresh mutable columns, preserve identity
                // and first_seen_at.
                conn.execute(
                    "UPDATE articles SET title = ?1, digest = ?2, post_time = ?3,
                       is_deleted = ?4, last_seen_at = ?5
                     WHERE id = ?6",
                    params![
                        article.title,
                        article.digest,
                        article.post_time.to_rfc3339(),
                        article.is_deleted as i32,
                        Utc::now().to_rfc3339(),
                        id,
                    ],
                )
                .map_err(|e| DomainError::Database(format!("Failed to refresh article: {e}")))?;
                Ok(false)
            }
            None => {
                conn.execute(
                    "INSERT INTO articles
                       (id, account_id, url, url_hash, title, digest, post_time,
                        is_deleted, first_seen_at, last_seen_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        article.id,
                        article.account_id,
                        article.url,
                        article.url_hash,
                        article.title,
                        article.digest,
                        article.post_time.to_rfc3339(),
                        article.is_deleted as i32,
                        article.first_seen_at.to_rfc3339(),
                        article.last_seen_at.to_rfc3339(),
                    ],
                )
                .map_err(|e| DomainError::Database(format!("Failed to insert article: {e}")))?;
                Ok(true)
            }
        }
    }

    fn list_for_day(&self, day: Day, limit: usize) -> Result<Vec<ArticleSeed>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM articles
             WHERE is_deleted = 0 AND substr(post_time, 1, 10) = ?1
             ORDER BY post_time DESC, id DESC
             LIMIT ?2"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let articles = stmt
            .query_map(params![day.to_string(), limit as i64], Self::row_to_article)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(articles)
    }

    fn count_for_day(&self, day: Day) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM articles
                 WHERE is_deleted = 0 AND substr(post_time, 1, 10) = ?1",
                params![day.to_string()],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(count as usize)
    }

    fn get_by_url(&self, account_id: &str, url: &str) -> Result<Option<ArticleSeed>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!("SELECT {SELECT_COLS} FROM articles WHERE account_id = ?1 AND url_hash = ?2");
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(
                params![account_id, ArticleSeed::hash_url(url)],
                Self::row_to_article,
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }
}
