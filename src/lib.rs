pub mod errors;
pub mod models;
pub mod motifs;
pub mod protein;
pub mod report;
pub mod scoring;

#[cfg(feature = "disorder")]
pub mod disorder;
#[cfg(feature = "tui")]
pub mod tui;
