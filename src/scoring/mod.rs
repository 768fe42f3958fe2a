pub mod aggregator;
pub mod results;
