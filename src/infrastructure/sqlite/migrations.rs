use crate::domain::values::rule_params::RuleParams;
use rusqlite::{params, Connection};

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            enabled INTEGER NOT NULL DEFAULT 1,
            last_fetch_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS articles (
            id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL,
            url TEXT NOT NULL,
            url_hash TEXT NOT NULL,
            title TEXT NOT NULL,
            digest TEXT NOT NULL DEFAULT '',
            post_time TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            first_seen_at TEXT NOT NULL,
            last_seen_at TEXT NOT NULL,
            UNIQUE(account_id, url_hash)
        );

        CREATE TABLE IF NOT EXISTS topics (
            id TEXT PRIMARY KEY,
            day TEXT NOT NULL,
            sector TEXT NOT NULL,
            mention_count INTEGER NOT NULL DEFAULT 0,
            article_ids TEXT NOT NULL DEFAULT '[]',
            reason TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            UNIQUE(day, sector)
        );

        CREATE TABLE IF NOT EXISTS pool1 (
            id TEXT PRIMARY KEY,
            day TEXT NOT NULL,
            sector TEXT NOT NULL,
            stock_code TEXT NOT NULL,
            stock_name TEXT NOT NULL,
            topic_id TEXT NOT NULL,
            price REAL,
            pct_change REAL,
            volume_ratio REAL,
            turnover_rate REAL,
            market_cap REAL,
            pe_ratio REAL,
            pb_ratio REAL,
            roe REAL,
            reason TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            UNIQUE(day, sector, stock_code)
        );

        CREATE TABLE IF NOT EXISTS pool2 (
            id TEXT PRIMARY KEY,
            pool1_id TEXT NOT NULL UNIQUE REFERENCES pool1(id) ON DELETE CASCADE,
            technical_score REAL NOT NULL DEFAULT 0,
            fundamental_score REAL NOT NULL DEFAULT 0,
            total_score REAL NOT NULL DEFAULT 0,
            analysis TEXT,
            decision TEXT NOT NULL DEFAULT 'pending',
            fail_reason TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS pipeline_runs (
            day TEXT PRIMARY KEY,
            ingest_status TEXT NOT NULL DEFAULT 'not_started',
            ingest_message TEXT,
            topics_status TEXT NOT NULL DEFAULT 'not_started',
            topics_message TEXT,
            screen_status TEXT NOT NULL DEFAULT 'not_started',
            screen_message TEXT,
            select_status TEXT NOT NULL DEFAULT 'not_started',
            select_message TEXT,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS rule_configs (
            rule_key TEXT PRIMARY KEY,
            enabled INTEGER NOT NULL DEFAULT 1,
            gating INTEGER NOT NULL DEFAULT 0,
            sort_order INTEGER NOT NULL DEFAULT 0,
            params TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_articles_post_time ON articles(post_time);
        CREATE INDEX IF NOT EXISTS idx_topics_day ON topics(day);
        CREATE INDEX IF NOT EXISTS idx_pool1_day ON pool1(day);
        ",
    )
    .map_err(|e| format!("Migration failed: {e}"))?;

    seed_rule_configs(conn)
}

/// Default rule set: key, gating flag, sort order. Gating rules run first.
const DEFAULT_RULES: &[(&str, bool, i64)] = &[
    ("market_cap", true, 1),
    ("volume_ratio", true, 2),
    ("price_change", true, 3),
    ("turnover_rate", true, 4),
    ("pe_ratio", false, 5),
    ("pb_ratio", false, 6),
    ("roe", false, 7),
];

fn seed_rule_configs(conn: &Connection) -> Result<(), String> {
    for (key, gating, sort_order) in DEFAULT_RULES {
        let defaults = RuleParams::default_for(key)
            .ok_or_else(|| format!("No default params for rule {key}"))?;
        let json = defaults.to_json().to_string();
        conn.execute(
            "INSERT OR IGNORE INTO rule_configs (rule_key, enabled, gating, sort_order, params, updated_at)
             VALUES (?1, 1, ?2, ?3, ?4, datetime('now'))",
            params![key, *gating as i64, sort_order, json],
        )
        .map_err(|e| format!("Rule seed failed: {e}"))?;
    }
    Ok(())
}
