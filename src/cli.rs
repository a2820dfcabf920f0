//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Values left unset fall back to the config file.

use crate::data::GroupKey;
use crate::report::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// listing-insights - rank neighborhoods by median listing price
///
/// Loads a listings CSV, optionally narrows it to one borough, ranks
/// neighborhoods by median price (ignoring small ones) and prints summary
/// statistics for the top groups.
///
/// Examples:
///   listing-insights listings.csv
///   listing-insights listings.csv --borough Manhattan --min-group-size 50 --top-n 5
///   listing-insights listings.csv --format json --output report.json
///   listing-insights --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Listings CSV file
    ///
    /// Can also be set as `input.path` in the config file.
    #[arg(value_name = "CSV", env = "LISTING_INSIGHTS_INPUT")]
    pub input: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .listing-insights.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only analyze listings in this borough (case-insensitive)
    #[arg(short, long, value_name = "NAME", conflicts_with = "all_boroughs")]
    pub borough: Option<String>,

    /// Ignore any borough set in the config file
    #[arg(long)]
    pub all_boroughs: bool,

    /// Field to group listings by
    #[arg(short, long, value_name = "FIELD")]
    pub group_by: Option<GroupKey>,

    /// Minimum listings a group needs to be ranked
    #[arg(short, long, value_name = "COUNT")]
    pub min_group_size: Option<usize>,

    /// Number of top groups to report
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub top_n: Option<usize>,

    /// Fail on any missing or non-finite price instead of dropping it
    #[arg(long, conflicts_with = "lenient")]
    pub strict: bool,

    /// Skip listings with missing or non-finite prices at aggregation time
    #[arg(long, conflicts_with = "strict")]
    pub lenient: bool,

    /// Skip the review score summaries
    #[arg(long)]
    pub no_reviews: bool,

    /// Width of price histogram bins
    #[arg(long, value_name = "WIDTH")]
    pub bin_width: Option<f64>,

    /// Output format (text, json, csv)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .listing-insights.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.min_group_size == Some(0) {
            return Err("Minimum group size must be at least 1".to_string());
        }

        if let Some(width) = self.bin_width {
            if !width.is_finite() || width <= 0.0 {
                return Err("Bin width must be a positive number".to_string());
            }
        }

        if let Some(ref input) = self.input {
            if input.is_dir() {
                return Err(format!("Input path is a directory: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
