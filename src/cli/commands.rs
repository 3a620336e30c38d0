use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sectorpick", about = "Topic-driven daily A-share screening pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one account's recent articles now
    Fetch {
        /// Source account name
        #[arg(long)]
        account: String,
    },
    /// Serial catch-up fetch for accounts 1-2 days behind
    CatchUp {
        /// Delay between account fetches, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Run pipeline stages for a day
    Run {
        /// Stage: a|ingest, b|topics, c|screen, d|select, or all
        #[arg(long, default_value = "all")]
        stage: String,
        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Recompute even if the stage is already done
        #[arg(long)]
        force: bool,
        /// Cap on articles handed to the LLM
        #[arg(long)]
        max_articles: Option<usize>,
        /// Minimum distinct-article mentions per topic
        #[arg(long)]
        min_mention: Option<u32>,
        /// Minimum percent change for pool-1 candidates (inclusive)
        #[arg(long)]
        min_change: Option<f64>,
        /// Minimum turnover rate for pool-1 candidates (inclusive)
        #[arg(long)]
        min_turnover: Option<f64>,
        /// Topic cap per screening run
        #[arg(long)]
        max_sectors: Option<usize>,
    },
    /// Show a day's per-stage status
    Status {
        #[arg(long)]
        date: Option<String>,
    },
    /// List a day's stored articles
    Articles {
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// List a day's hot topics
    Topics {
        #[arg(long)]
        date: Option<String>,
    },
    /// List a day's broad pool (pool 1)
    Pool1 {
        #[arg(long)]
        date: Option<String>,
    },
    /// List a day's scored picks (pool 2)
    Pool2 {
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a day's derived output and reset its stage statuses
    Purge {
        #[arg(long)]
        date: Option<String>,
        /// What to delete: topics, picks, or all (default)
        #[arg(long)]
        only: Option<String>,
    },
    /// List rule configurations
    Rules,
    /// Update one rule's configuration
    RulesSet {
        /// Rule key (market_cap, volume_ratio, price_change, turnover_rate, pe_ratio, pb_ratio, roe)
        key: String,
        #[arg(long)]
        enabled: Option<bool>,
        #[arg(long)]
        gating: Option<bool>,
        #[arg(long)]
        sort_order: Option<i64>,
        /// Parameter JSON, e.g. '{"min": 50, "max": 500}'
        #[arg(long)]
        json: Option<String>,
    },
    /// Register (or re-enable) a source account
    AccountAdd { name: String },
    /// List source accounts
    Accounts {
        /// Include disabled accounts
        #[arg(long)]
        all: bool,
    },
    /// Disable a source account
    AccountDisable { name: String },
    /// Enable a source account
    AccountEnable { name: String },
}
