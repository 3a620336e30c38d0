pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::catch_up::{CatchUpOutcome, CatchUpUseCase};
use crate::application::extract_topics::ExtractTopicsUseCase;
use crate::application::ingest::{FetchOutcome, IngestUseCase};
use crate::application::pipeline::{PipelineOrchestrator, StageResult};
use crate::application::purge::{PurgeOutcome, PurgeTarget, PurgeUseCase};
use crate::application::screen::ScreenUseCase;
use crate::application::select::SelectUseCase;
use crate::config::{Config, Thresholds};
use crate::domain::entities::account::Account;
use crate::domain::entities::article::{ArticleRecord, ArticleSeed};
use crate::domain::entities::pipeline_run::PipelineRun;
use crate::domain::entities::scored_stock::ScoredStock;
use crate::domain::entities::screened_stock::ScreenedStock;
use crate::domain::entities::topic::Topic;
use crate::domain::error::DomainError;
use crate::domain::ports::account_repository::AccountRepository;
use crate::domain::ports::article_repository::ArticleRepository;
use crate::domain::ports::article_source::ArticleSource;
use crate::domain::ports::llm_port::LlmProvider;
use crate::domain::ports::market_data::MarketData;
use crate::domain::ports::pool_repository::PoolRepository;
use crate::domain::ports::rule_config_repository::{RuleConfig, RuleConfigRepository};
use crate::domain::ports::run_repository::RunRepository;
use crate::domain::ports::topic_repository::TopicRepository;
use crate::domain::values::day::Day;
use crate::domain::values::rule_params::RuleParams;
use crate::domain::values::stage::Stage;
use crate::infrastructure::feeds::dajiala::DajialaSource;
use crate::infrastructure::llm::deepseek::DeepSeekProvider;
use crate::infrastructure::market::eastmoney::EastMoneyGateway;
use crate::infrastructure::sqlite::account_repo::SqliteAccountRepo;
use crate::infrastructure::sqlite::article_repo::SqliteArticleRepo;
use crate::infrastructure::sqlite::pool_repo::SqlitePoolRepo;
use crate::infrastructure::sqlite::rule_config_repo::SqliteRuleConfigRepo;
use crate::infrastructure::sqlite::run_repo::SqliteRunRepo;
use crate::infrastructure::sqlite::topic_repo::SqliteTopicRepo;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Facade wiring repositories, providers and use cases. CLI and tests both
/// go through this.
pub struct SectorPick {
    accounts: Arc<dyn AccountRepository>,
    articles: Arc<dyn ArticleRepository>,
    topics: Arc<dyn TopicRepository>,
    pools: Arc<dyn PoolRepository>,
    rule_configs: Arc<dyn RuleConfigRepository>,
    ingest_uc: Arc<IngestUseCase>,
    catch_up_uc: CatchUpUseCase,
    purge_uc: PurgeUseCase,
    orchestrator: PipelineOrchestrator,
}

impl SectorPick {
    pub fn new(config: &Config) -> Result<Self, DomainError> {
        // Providers with absent keys are wired as stubs that fail with
        // MissingConfig at call time, so read-only commands still work on a
        // partially configured machine.
        let llm: Arc<dyn LlmProvider> = match DeepSeekProvider::new(
            config.deepseek_api_key.clone(),
            config.deepseek_model.clone(),
            config.deepseek_base_url.clone(),
        ) {
            Ok(provider) => Arc::new(provider),
            Err(DomainError::MissingConfig(msg)) => Arc::new(Unconfigured(msg)),
            Err(e) => return Err(e),
        };
        let source: Arc<dyn ArticleSource> =
            match DajialaSource::new(config.dajiala_key.clone(), config.dajiala_api_url.clone()) {
                Ok(source) => Arc::new(source),
                Err(DomainError::MissingConfig(msg)) => Arc::new(Unconfigured(msg)),
                Err(e) => return Err(e),
            };
        let market: Arc<dyn MarketData> =
            Arc::new(EastMoneyGateway::new(config.proxy_url.as_deref())?);

        Self::with_providers(
            &config.db_path,
            llm,
            market,
            source,
            config.snapshot_concurrency,
        )
    }

    pub fn with_providers(
        db_path: &str,
        llm: Arc<dyn LlmProvider>,
        market: Arc<dyn MarketData>,
        source: Arc<dyn ArticleSource>,
        snapshot_concurrency: usize,
    ) -> Result<Self, DomainError> {
        let conn = infrastructure::sqlite::open_database(Path::new(db_path))?;

        let accounts: Arc<dyn AccountRepository> = Arc::new(SqliteAccountRepo::new(conn.clone()));
        let articles: Arc<dyn ArticleRepository> = Arc::new(SqliteArticleRepo::new(conn.clone()));
        let topics: Arc<dyn TopicRepository> = Arc::new(SqliteTopicRepo::new(conn.clone()));
        let pools: Arc<dyn PoolRepository> = Arc::new(SqlitePoolRepo::new(conn.clone()));
        let runs: Arc<dyn RunRepository> = Arc::new(SqliteRunRepo::new(conn.clone()));
        let rule_configs: Arc<dyn RuleConfigRepository> =
            Arc::new(SqliteRuleConfigRepo::new(conn));

        let ingest_uc = Arc::new(IngestUseCase::new(
            accounts.clone(),
            articles.clone(),
            source,
        ));
        let topics_uc = Arc::new(ExtractTopicsUseCase::new(
            articles.clone(),
            topics.clone(),
            llm,
            market.clone(),
        ));
        let screen_uc = Arc::new(ScreenUseCase::new(topics.clone(), pools.clone(), market));
        let select_uc = Arc::new(SelectUseCase::new(pools.clone(), rule_configs.clone()));

        let orchestrator = PipelineOrchestrator::new(
            runs.clone(),
            articles.clone(),
            topics.clone(),
            pools.clone(),
            ingest_uc.clone(),
            topics_uc,
            screen_uc,
            select_uc,
            snapshot_concurrency,
        );
        let catch_up_uc = CatchUpUseCase::new(accounts.clone(), ingest_uc.clone());
        let purge_uc = PurgeUseCase::new(topics.clone(), pools.clone(), runs);

        Ok(Self {
            accounts,
            articles,
            topics,
            pools,
            rule_configs,
            ingest_uc,
            catch_up_uc,
            purge_uc,
            orchestrator,
        })
    }

    // Pipeline

    pub async fn run_stage(
        &self,
        day: Day,
        stage: Stage,
        force: bool,
        t: &Thresholds,
    ) -> Result<StageResult, DomainError> {
        self.orchestrator.run_stage(day, stage, force, t).await
    }

    pub async fn run_all(
        &self,
        day: Day,
        force: bool,
        t: &Thresholds,
    ) -> Result<Vec<StageResult>, DomainError> {
        self.orchestrator.run_all(day, force, t).await
    }

    pub fn status(&self, day: Day) -> Result<PipelineRun, DomainError> {
        self.orchestrator.status(day)
    }

    // Fetching

    pub async fn fetch_account(&self, name: &str) -> Result<FetchOutcome, DomainError> {
        self.ingest_uc.fetch_account(name).await
    }

    pub async fn catch_up(
        &self,
        today: Day,
        delay: Duration,
    ) -> Result<CatchUpOutcome, DomainError> {
        self.catch_up_uc.execute(today, delay).await
    }

    // Listing (read-only, no computation)

    pub fn list_articles(&self, day: Day, limit: usize) -> Result<Vec<ArticleSeed>, DomainError> {
        self.articles.list_for_day(day, limit)
    }

    pub fn list_topics(&self, day: Day) -> Result<Vec<Topic>, DomainError> {
        self.topics.list_for_day(day)
    }

    pub fn list_pool1(&self, day: Day) -> Result<Vec<ScreenedStock>, DomainError> {
        self.pools.list_pool1(day)
    }

    pub fn list_pool2(&self, day: Day) -> Result<Vec<ScoredStock>, DomainError> {
        self.pools.list_pool2(day)
    }

    // Maintenance

    pub fn purge(&self, day: Day, target: PurgeTarget) -> Result<PurgeOutcome, DomainError> {
        self.purge_uc.execute(day, target)
    }

    // Accounts

    pub fn add_account(&self, name: &str) -> Result<Account, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("account name is empty".into()));
        }
        self.accounts.upsert(&Account::new(name.to_string()))
    }

    pub fn list_accounts(&self, enabled_only: bool) -> Result<Vec<Account>, DomainError> {
        self.accounts.list(enabled_only)
    }

    pub fn set_account_enabled(&self, name: &str, enabled: bool) -> Result<(), DomainError> {
        self.accounts.set_enabled(name, enabled)
    }

    // Rule configuration

    pub fn list_rules(&self) -> Result<Vec<RuleConfig>, DomainError> {
        self.rule_configs.list_all()
    }

    pub fn update_rule(
        &self,
        rule_key: &str,
        enabled: Option<bool>,
        gating: Option<bool>,
        sort_order: Option<i64>,
        params_json: Option<&str>,
    ) -> Result<(), DomainError> {
        let params = params_json
            .map(|raw| {
                let value: serde_json::Value = serde_json::from_str(raw)
                    .map_err(|e| DomainError::InvalidInput(format!("params not JSON: {e}")))?;
                RuleParams::from_json(rule_key, &value).map_err(DomainError::InvalidInput)
            })
            .transpose()?;
        self.rule_configs
            .update(rule_key, enabled, gating, sort_order, params)
    }
}

/// Stand-in for a provider whose key is absent. Every call reports the
/// missing configuration instead of a confusing network error.
struct Unconfigured(String);

#[async_trait::async_trait]
impl LlmProvider for Unconfigured {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, DomainError> {
        Err(DomainError::MissingConfig(self.0.clone()))
    }
}

#[async_trait::async_trait]
impl ArticleSource for Unconfigured {
    async fn fetch_articles(&self, _account_name: &str) -> Result<Vec<ArticleRecord>, DomainError> {
        Err(DomainError::MissingConfig(self.0.clone()))
    }
}
