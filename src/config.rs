use std::time::Duration;

/// Runtime configuration, collected once from the environment in `main`
/// (after `dotenvy`). Provider keys stay optional here; the adapters that
/// need them fail with `MissingConfig` when constructed without one.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub deepseek_api_key: Option<String>,
    pub deepseek_model: Option<String>,
    pub deepseek_base_url: Option<String>,
    pub dajiala_key: Option<String>,
    pub dajiala_api_url: Option<String>,
    pub proxy_url: Option<String>,
    pub thresholds: Thresholds,
    pub catch_up_delay: Duration,
    pub snapshot_concurrency: usize,
}

/// Tunables for topic extraction and the broad screen. CLI flags override
/// these per invocation.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Newest articles handed to the LLM.
    pub max_articles: usize,
    /// Per-article character cap in the prompt.
    pub max_chars: usize,
    /// Minimum distinct-article mentions for a topic to persist.
    pub min_mention: u32,
    /// Minimum percent change for a constituent (inclusive).
    pub min_change: f64,
    /// Minimum turnover rate for a constituent (inclusive).
    pub min_turnover: f64,
    /// Topic cap per screening run, by mention count.
    pub max_sectors: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_articles: 30,
            max_chars: 2000,
            min_mention: 4,
            min_change: 5.0,
            min_turnover: 5.0,
            max_sectors: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        let defaults = Thresholds::default();
        Self {
            db_path: env("SECTORPICK_DB").unwrap_or_else(|| "./sectorpick.db".into()),
            deepseek_api_key: env("DEEPSEEK_API_KEY"),
            deepseek_model: env("DEEPSEEK_MODEL"),
            deepseek_base_url: env("DEEPSEEK_BASE_URL"),
            dajiala_key: env("DAJIALA_KEY"),
            dajiala_api_url: env("DAJIALA_API_URL"),
            proxy_url: env("SECTORPICK_PROXY"),
            thresholds: Thresholds {
                max_articles: parse_env("SECTORPICK_MAX_ARTICLES", defaults.max_articles),
                max_chars: parse_env("SECTORPICK_MAX_CHARS", defaults.max_chars),
                min_mention: parse_env("SECTORPICK_MIN_MENTION", defaults.min_mention),
                min_change: parse_env("SECTORPICK_MIN_CHANGE", defaults.min_change),
                min_turnover: parse_env("SECTORPICK_MIN_TURNOVER", defaults.min_turnover),
                max_sectors: parse_env("SECTORPICK_MAX_SECTORS", defaults.max_sectors),
            },
            catch_up_delay: Duration::from_millis(parse_env("SECTORPICK_CATCHUP_DELAY_MS", 2000)),
            snapshot_concurrency: parse_env("SECTORPICK_SNAPSHOT_CONCURRENCY", 4),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
