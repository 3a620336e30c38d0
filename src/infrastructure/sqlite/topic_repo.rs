use crate::domain::entities::topic::Topic;
use crate::domain::error::DomainError;
use crate::domain::ports::topic_repository::TopicRepository;
use crate::domain::values::day::Day;
use crate::infrastructure::sqlite::SharedConn;
use chrono::{DateTime, Utc};
use rusqlite::params;

pub struct SqliteTopicRepo {
    conn: SharedConn,
}

impl SqliteTopicRepo {
    pub fn new(conn: SharedConn) -> Self {
        Self { conn }
    }

    fn row_to_topic(row: &rusqlite::Row) -> Result<Topic, rusqlite::Error> {
        let day: String = row.get(1)?;
        let article_ids: String = row.get(4)?;
        let created: String = row.get(6)?;
        Ok(Topic {
            id: row.get(0)?,
            day: day.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
            sector: row.get(2)?,
            mention_count: row.get::<_, i64>(3)? as u32,
            article_ids: serde_json::from_str(&article_ids).unwrap_or_default(),
            reason: row.get(5)?,
            created_at: DateTime::parse_from_rfc3339(&created)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

impl TopicRepository for SqliteTopicRepo {
    fn replace_day(&self, day: Day, topics: &[Topic]) -> Result<(), DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        tx.execute("DELETE FROM topics WHERE day = ?1", params![day.to_string()])
            .map_err(|e| DomainError::Database(e.to_string()))?;
        for topic in topics {
            let article_ids = serde_json::to_string(&topic.article_ids)
                .map_err(|e| DomainError::Database(e.to_string()))?;
            tx.execute(
                "INSERT INTO topics (id, day, sector, mention_count, article_ids, reason, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    topic.id,
                    topic.day.to_string(),
                    topic.sector,
                    topic.mention_count as i64,
                    article_ids,
                    topic.reason,
                    topic.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to insert topic: {e}")))?;
        }
        tx.commit()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(())
    }

    fn list_for_day(&self, day: Day) -> Result<Vec<Topic>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT id, day, sector, mention_count, article_ids, reason, created_at
                 FROM topics WHERE day = ?1
                 ORDER BY mention_count DESC, sector ASC",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let topics = stmt
            .query_map(params![day.to_string()], Self::row_to_topic)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(topics)
    }

    fn count_for_day(&self, day: Day) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM topics WHERE day = ?1",
                params![day.to_string()],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(count as usize)
    }

    fn delete_day(&self, day: Day) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let deleted = conn
            .execute("DELETE FROM topics WHERE day = ?1", params![day.to_string()])
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(deleted)
    }
}
