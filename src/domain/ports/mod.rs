pub mod account_repository;
pub mod article_repository;
pub mod article_source;
pub mod llm_port;
pub mod market_data;
pub mod pool_repository;
pub mod rule;
pub mod rule_config_repository;
pub mod run_repository;
pub mod topic_repository;
