//! Listing Insights - neighborhood price rankings from listings CSV exports
//!
//! Loads a listings table, narrows it to a borough, ranks neighborhoods by
//! median price above a minimum size, and summarizes prices and review
//! scores for the top groups.

pub mod cli;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use config::Config;
pub use pipeline::{run_analysis, run_file, AnalysisReport, PipelineError};
