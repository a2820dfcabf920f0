//! Configuration file handling.
//!
//! This module handles loading, validating and merging configuration from
//! `.listing-insights.toml` files.

use crate::cli::Args;
use crate::data::{ColumnMapping, GroupKey};
use crate::report::OutputFormat;
use crate::stats::MissingPolicy;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".listing-insights.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Input settings.
    #[serde(default)]
    pub input: InputConfig,

    /// CSV column names for each listing field.
    #[serde(default)]
    pub columns: ColumnMapping,

    /// Ranking settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Price cleaning and missing-value policy.
    #[serde(default)]
    pub price: PriceConfig,

    /// Review score analysis.
    #[serde(default)]
    pub reviews: ReviewsConfig,

    /// Per-borough price histograms.
    #[serde(default)]
    pub distribution: DistributionConfig,

    /// Report output.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Input file settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Listings CSV path.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Group ranking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Only analyze listings in this borough.
    #[serde(default)]
    pub borough: Option<String>,

    /// Categorical field to rank.
    #[serde(default)]
    pub group_by: GroupKey,

    /// Groups with fewer listings are left out of the ranking.
    #[serde(default = "default_min_group_size")]
    pub min_group_size: usize,

    /// Number of groups to keep.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            borough: None,
            group_by: GroupKey::default(),
            min_group_size: default_min_group_size(),
            top_n: default_top_n(),
        }
    }
}

fn default_min_group_size() -> usize {
    50
}

fn default_top_n() -> usize {
    5
}

/// Price handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceConfig {
    /// Drop listings with a missing or non-finite price before any analysis.
    #[serde(default = "default_true")]
    pub clean: bool,

    /// Policy for invalid prices reaching a reduction (only matters when `clean` is off).
    #[serde(default)]
    pub missing: MissingPolicy,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            clean: true,
            missing: MissingPolicy::Strict,
        }
    }
}

/// Review score analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Listings without a score are excluded from the review summaries by default.
    #[serde(default = "default_review_policy")]
    pub missing: MissingPolicy,
}

impl Default for ReviewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            missing: default_review_policy(),
        }
    }
}

fn default_review_policy() -> MissingPolicy {
    MissingPolicy::Drop
}

/// Histogram settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_bin_width")]
    pub bin_width: f64,

    /// Prices above this are counted as clipped instead of binned.
    #[serde(default)]
    pub max_value: Option<f64>,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bin_width: default_bin_width(),
            max_value: None,
        }
    }
}

fn default_bin_width() -> f64 {
    50.0
}

/// Report output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Write the report here instead of stdout.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_default_in(Path::new("."))
    }

    /// Look for the default config file inside `dir`.
    pub fn load_default_in(dir: &Path) -> Result<Option<Self>> {
        let default_path = dir.join(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(&default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when explicitly given.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref input) = args.input {
            self.input.path = Some(input.clone());
        }
        if let Some(ref borough) = args.borough {
            self.analysis.borough = Some(borough.clone());
        }
        if args.all_boroughs {
            self.analysis.borough = None;
        }
        if let Some(group_by) = args.group_by {
            self.analysis.group_by = group_by;
        }
        if let Some(min_group_size) = args.min_group_size {
            self.analysis.min_group_size = min_group_size;
        }
        if let Some(top_n) = args.top_n {
            self.analysis.top_n = top_n;
        }

        // --strict / --lenient turn off pre-cleaning so the policy decides
        if args.strict {
            self.price.clean = false;
            self.price.missing = MissingPolicy::Strict;
        } else if args.lenient {
            self.price.clean = false;
            self.price.missing = MissingPolicy::Drop;
        }

        if args.no_reviews {
            self.reviews.enabled = false;
        }
        if let Some(bin_width) = args.bin_width {
            self.distribution.bin_width = bin_width;
        }
        if let Some(format) = args.format {
            self.output.format = format;
        }
        if let Some(ref output) = args.output {
            self.output.path = Some(output.clone());
        }
    }

    /// Validate settings that cannot be expressed in the types.
    pub fn validate(&self) -> Result<()> {
        if self.analysis.min_group_size == 0 {
            bail!("min_group_size must be at least 1");
        }
        if !self.distribution.bin_width.is_finite() || self.distribution.bin_width <= 0.0 {
            bail!(
                "distribution bin_width must be positive, got {}",
                self.distribution.bin_width
            );
        }
        if let Some(max) = self.distribution.max_value {
            if !max.is_finite() {
                bail!("distribution max_value must be finite");
            }
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> Result<String> {
        let config = Config::default();
        toml::to_string_pretty(&config).context("Failed to serialize default config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.min_group_size, 50);
        assert_eq!(config.analysis.top_n, 5);
        assert_eq!(config.analysis.group_by, GroupKey::Neighborhood);
        assert!(config.price.clean);
        assert_eq!(config.price.missing, MissingPolicy::Strict);
        assert_eq!(config.reviews.missing, MissingPolicy::Drop);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[input]
path = "data/listings.csv"

[columns]
neighborhood = "neighbourhood_cleansed"
borough = "neighbourhood_group_cleansed"

[analysis]
borough = "Manhattan"
min_group_size = 25
top_n = 3

[reviews]
missing = "strict"

[distribution]
bin_width = 25.0
max_value = 1000.0

[output]
format = "json"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.path, Some(PathBuf::from("data/listings.csv")));
        assert_eq!(config.columns.neighborhood, "neighbourhood_cleansed");
        assert_eq!(config.columns.price, "price");
        assert_eq!(config.analysis.borough.as_deref(), Some("Manhattan"));
        assert_eq!(config.analysis.min_group_size, 25);
        assert_eq!(config.analysis.top_n, 3);
        assert_eq!(config.reviews.missing, MissingPolicy::Strict);
        assert!(config.reviews.enabled);
        assert_eq!(config.distribution.max_value, Some(1000.0));
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_default_toml_round_trips() {
        let content = Config::default_toml().unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_validate_rejects_zero_group_size() {
        let mut config = Config::default();
        config.analysis.min_group_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.distribution.bin_width = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_default_in_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_default_in(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_default_in_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[analysis]\nborough = \"Queens\"\n",
        )
        .unwrap();

        let config = Config::load_default_in(dir.path()).unwrap().unwrap();
        assert_eq!(config.analysis.borough.as_deref(), Some("Queens"));
    }

    #[test]
    fn test_broken_default_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[price]\nmissing = \"strcit\"\n",
        )
        .unwrap();

        let err = Config::load_default_in(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_merge_with_args() {
        let args = Args::parse_from([
            "listing-insights",
            "listings.csv",
            "--borough",
            "Brooklyn",
            "--top-n",
            "10",
            "--lenient",
            "--format",
            "csv",
        ]);

        let mut config = Config::default();
        config.analysis.min_group_size = 20;
        config.merge_with_args(&args);

        assert_eq!(config.input.path, Some(PathBuf::from("listings.csv")));
        assert_eq!(config.analysis.borough.as_deref(), Some("Brooklyn"));
        assert_eq!(config.analysis.top_n, 10);
        // Not given on the command line, keeps the file value
        assert_eq!(config.analysis.min_group_size, 20);
        assert!(!config.price.clean);
        assert_eq!(config.price.missing, MissingPolicy::Drop);
        assert_eq!(config.output.format, OutputFormat::Csv);
    }
}
