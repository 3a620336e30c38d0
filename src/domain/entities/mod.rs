pub mod account;
pub mod article;
pub mod pipeline_run;
pub mod scored_stock;
pub mod screened_stock;
pub mod topic;
