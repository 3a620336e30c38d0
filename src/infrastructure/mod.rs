pub mod feeds;
pub mod llm;
pub mod market;
pub mod sqlite;
