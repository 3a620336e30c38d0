pub mod day;
pub mod decision;
pub mod rule_params;
pub mod stage;
