use crate::domain::entities::scored_stock::ScoredStock;
use crate::domain::entities::screened_stock::{ScreenedStock, StockSnapshot};
use crate::domain::error::DomainError;
use crate::domain::ports::pool_repository::PoolRepository;
use crate::domain::values::day::Day;
use crate::infrastructure::sqlite::SharedConn;
use chrono::{DateTime, Utc};
use rusqlite::params;

const POOL1_COLS: &str = "id, day, sector, stock_code, stock_name, topic_id, \
     price, pct_change, volume_ratio, turnover_rate, market_cap, pe_ratio, pb_ratio, roe, \
     reason, created_at";

pub struct SqlitePoolRepo {
    conn: SharedConn,
}

impl SqlitePoolRepo {
    pub fn new(conn: SharedConn) -> Self {
        Self { conn }
    }

    fn row_to_screened(row: &rusqlite::Row) -> Result<ScreenedStock, rusqlite::Error> {
        let day: String = row.get(1)?;
        let created: String = row.get(15)?;
        Ok(ScreenedStock {
            id: row.get(0)?,
            day: day.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
            sector: row.get(2)?,
            stock_code: row.get(3)?,
            stock_name: row.get(4)?,
            topic_id: row.get(5)?,
            snapshot: StockSnapshot {
                price: row.get(6)?,
                pct_change: row.get(7)?,
                volume_ratio: row.get(8)?,
                turnover_rate: row.get(9)?,
                market_cap: row.get(10)?,
                pe_ratio: row.get(11)?,
                pb_ratio: row.get(12)?,
                roe: row.get(13)?,
            },
            reason: row.get(14)?,
            created_at: parse_ts(&created),
        })
    }

    fn row_to_scored(row: &rusqlite::Row) -> Result<ScoredStock, rusqlite::Error> {
        let decision: String = row.get(6)?;
        let created: String = row.get(8)?;
        Ok(ScoredStock {
            id: row.get(0)?,
            pool1_id: row.get(1)?,
            technical_score: row.get(2)?,
            fundamental_score: row.get(3)?,
            total_score: row.get(4)?,
            analysis: row.get(5)?,
            decision: decision.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
            fail_reason: row.get(7)?,
            created_at: parse_ts(&created),
        })
    }
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl PoolRepository for SqlitePoolRepo {
    fn replace_pool1(&self, day: Day, stocks: &[ScreenedStock]) -> Result<(), DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        // pool2 rows for the day go with their pool1 parents via cascade.
        tx.execute("DELETE FROM pool1 WHERE day = ?1", params![day.to_string()])
            .map_err(|e| DomainError::Database(e.to_string()))?;
        for stock in stocks {
            let s = &stock.snapshot;
            tx.execute(
                &format!("INSERT INTO pool1 ({POOL1_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"),
                params![
                    stock.id,
                    stock.day.to_string(),
                    stock.sector,
                    stock.stock_code,
                    stock.stock_name,
                    stock.topic_id,
                    s.price,
                    s.pct_change,
                    s.volume_ratio,
                    s.turnover_rate,
                    s.market_cap,
                    s.pe_ratio,
                    s.pb_ratio,
                    s.roe,
                    stock.reason,
                    stock.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to insert pool1 row: {e}")))?;
        }
        tx.commit()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(())
    }

    fn list_pool1(&self, day: Day) -> Result<Vec<ScreenedStock>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!(
            "SELECT {POOL1_COLS} FROM pool1 WHERE day = ?1
             ORDER BY sector ASC, stock_code ASC"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let stocks = stmt
            .query_map(params![day.to_string()], Self::row_to_screened)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(stocks)
    }

    fn count_pool1(&self, day: Day) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pool1 WHERE day = ?1",
                params![day.to_string()],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(count as usize)
    }

    fn replace_pool2(&self, day: Day, stocks: &[ScoredStock]) -> Result<(), DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        tx.execute(
            "DELETE FROM pool2 WHERE pool1_id IN (SELECT id FROM pool1 WHERE day = ?1)",
            params![day.to_string()],
        )
        .map_err(|e| DomainError::Database(e.to_string()))?;
        for stock in stocks {
            tx.execute(
                "INSERT INTO pool2
                   (id, pool1_id, technical_score, fundamental_score, total_score,
                    analysis, decision, fail_reason, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    stock.id,
                    stock.pool1_id,
                    stock.technical_score,
                    stock.fundamental_score,
                    stock.total_score,
                    stock.analysis,
                    stock.decision.to_string(),
                    stock.fail_reason,
                    stock.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to insert pool2 row: {e}")))?;
        }
        tx.commit()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(())
    }

    fn list_pool2(&self, day: Day) -> Result<Vec<ScoredStock>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT p2.id, p2.pool1_id, p2.technical_score, p2.fundamental_score,
                        p2.total_score, p2.analysis, p2.decision, p2.fail_reason, p2.created_at
                 FROM pool2 p2
                 JOIN pool1 p1 ON p1.id = p2.pool1_id
                 WHERE p1.day = ?1
                 ORDER BY p2.total_score DESC, p1.stock_code ASC",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let stocks = stmt
            .query_map(params![day.to_string()], Self::row_to_scored)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(stocks)
    }

    fn count_pool2(&self, day: Day) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pool2 p2
                 JOIN pool1 p1 ON p1.id = p2.pool1_id
                 WHERE p1.day = ?1",
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
            .execute("DELETE FROM pool1 WHERE day = ?1", params![day.to_string()])
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(deleted)
    }
}
