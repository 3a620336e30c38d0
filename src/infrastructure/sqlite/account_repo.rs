use crate::domain::entities::account::Account;
use crate::domain::error::DomainError;
use crate::domain::ports::account_repository::AccountRepository;
use crate::domain::values::day::Day;
use crate::infrastructure::sqlite::SharedConn;
use chrono::{DateTime, Duration, Utc};
use rusqlite::params;

const SELECT_COLS: &str = "id, name, enabled, last_fetch_at, created_at, updated_at";

pub struct SqliteAccountRepo {
    conn: SharedConn,
}

impl SqliteAccountRepo {
    pub fn new(conn: SharedConn) -> Self {
        Self { conn }
    }

    fn row_to_account(row: &rusqlite::Row) -> Result<Account, rusqlite::Error> {
        let enabled: i32 = row.get(2)?;
        let last_fetch: Option<String> = row.get(3)?;
        let created: String = row.get(4)?;
        let updated: String = row.get(5)?;
        Ok(Account {
            id: row.get(0)?,
            name: row.get(1)?,
            enabled: enabled != 0,
            last_fetch_at: last_fetch.and_then(|s| parse_ts(&s)),
            created_at: parse_ts(&created).unwrap_or_else(Utc::now),
            updated_at: parse_ts(&updated).unwrap_or_else(Utc::now),
        })
    }
}

fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

impl AccountRepository for SqliteAccountRepo {
    fn upsert(&self, account: &Account) -> Result<Account, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO accounts (id, name, enabled, last_fetch_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(name) DO UPDATE SET
               enabled = excluded.enabled,
               updated_at = excluded.updated_at",
            params![
                account.id,
                account.name,
                account.enabled as i32,
                account.last_fetch_at.map(|t| t.to_rfc3339()),
                account.created_at.to_rfc3339(),
                account.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to upsert account: {e}")))?;

        let mut stmt = conn
            .prepare(&format!("SELECT {SELECT_COLS} FROM accounts WHERE name = ?1"))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![account.name], Self::row_to_account)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        rows.next()
            .and_then(|r| r.ok())
            .ok_or_else(|| DomainError::Database("Upserted account not found".into()))
    }

    fn get_by_name(&self, name: &str) -> Result<Option<Account>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare(&format!("SELECT {SELECT_COLS} FROM accounts WHERE name = ?1"))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![name], Self::row_to_account)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }

    fn list(&self, enabled_only: bool) -> Result<Vec<Account>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = if enabled_only {
            format!("SELECT {SELECT_COLS} FROM accounts WHERE enabled = 1 ORDER BY name")
        } else {
            format!("SELECT {SELECT_COLS} FROM accounts ORDER BY name")
        };
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let accounts = stmt
            .query_map([], Self::row_to_account)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(accounts)
    }

    fn stale_accounts(&self, today: Day) -> Result<Vec<Account>, DomainError> {
        // Exactly 1 or 2 days behind. NULL (never fetched) and older
        // stragglers are excluded; those need an explicit fetch.
        let d1 = Day::new(today.date() - Duration::days(1)).to_string();
        let d2 = Day::new(today.date() - Duration::days(2)).to_string();
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM accounts
             WHERE enabled = 1 AND last_fetch_at IS NOT NULL
               AND substr(last_fetch_at, 1, 10) IN (?1, ?2)
             ORDER BY name"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let accounts = stmt
            .query_map(params![d1, d2], Self::row_to_account)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(accounts)
    }

    fn touch_last_fetch(&self, account_id: &str) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "UPDATE accounts SET last_fetch_at = ?1, updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), account_id],
        )
        .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(())
    }

    fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let changed = conn
            .execute(
                "UPDATE accounts SET enabled = ?1, updated_at = ?2 WHERE name = ?3",
                params![enabled as i32, Utc::now().to_rfc3339(), name],
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("account {name}")));
        }
        Ok(())
    }
}
