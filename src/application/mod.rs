pub mod catch_up;
pub mod extract_topics;
pub mod ingest;
pub mod pipeline;
pub mod purge;
pub mod rules;
pub mod screen;
pub mod select;
