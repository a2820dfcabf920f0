//! Analysis Pipeline Module
//! Chains the stages of one run: price cleaning, borough filtering, median ranking and per-group summaries.

use crate::config::Config;
use crate::data::{
    Cleaned, DataLoader, DataProcessor, GroupKey, Listing, LoaderError, ValueField,
};
use crate::stats::{
    rank_groups_by_median, GroupSummary, HistogramBin, MissingPolicy, RankedGroup,
    StatsCalculator, StatsError,
};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// Row counts after each stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageCounts {
    pub loaded: usize,
    pub borough_filtered: usize,
    pub price_dropped: usize,
    pub analyzed: usize,
    pub in_top_groups: usize,
}

/// Price histogram for one borough.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoroughDistribution {
    pub borough: String,
    pub count: usize,
    /// Listings above the configured maximum, left out of the bins.
    pub clipped: usize,
    pub bins: Vec<HistogramBin>,
}

/// Review score summaries over the top groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewAnalysis {
    pub policy: MissingPolicy,
    /// Listings in the top groups without a usable score.
    pub missing: usize,
    pub summaries: Vec<GroupSummary>,
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub source: Option<String>,
    pub borough: Option<String>,
    pub group_by: GroupKey,
    pub min_group_size: usize,
    pub top_n: usize,
    pub rows: StageCounts,
    pub borough_overview: Vec<GroupSummary>,
    pub distributions: Vec<BoroughDistribution>,
    pub top_groups: Vec<RankedGroup>,
    pub price_summary: Vec<GroupSummary>,
    pub reviews: Option<ReviewAnalysis>,
}

/// Load `path` and run the analysis on it.
pub fn run_file(path: &Path, config: &Config) -> Result<AnalysisReport, PipelineError> {
    let loader = DataLoader::new(config.columns.clone());
    let listings = loader.load_listings(path)?;

    let mut report = run_analysis(&listings, config)?;
    report.source = Some(path.display().to_string());
    Ok(report)
}

/// Run every analysis stage over an already-loaded table.
pub fn run_analysis(listings: &[Listing], config: &Config) -> Result<AnalysisReport, StatsError> {
    let analysis = &config.analysis;
    let price = &config.price;
    let mut rows = StageCounts {
        loaded: listings.len(),
        ..Default::default()
    };

    // City-wide view before narrowing to one borough
    let priced_all = price_table(listings, price.clean).rows;
    let borough_overview = StatsCalculator::summarize_groups(
        &priced_all,
        GroupKey::Borough,
        ValueField::Price,
        None,
        price.missing,
    )?;
    let distributions = if config.distribution.enabled {
        borough_distributions(
            &priced_all,
            config.distribution.bin_width,
            config.distribution.max_value,
            price.missing,
        )?
    } else {
        Vec::new()
    };

    let borough_rows = match analysis.borough.as_deref() {
        Some(borough) => DataProcessor::filter_by_borough(listings, borough),
        None => listings.to_vec(),
    };
    rows.borough_filtered = borough_rows.len();
    if borough_rows.is_empty() {
        warn!("No listings match borough {:?}", analysis.borough);
    }

    let cleaned = price_table(&borough_rows, price.clean);
    rows.price_dropped = cleaned.dropped;
    rows.analyzed = cleaned.rows.len();
    let analyzed = cleaned.rows;
    info!(
        "Analyzing {} listings ({} dropped for missing price)",
        rows.analyzed, rows.price_dropped
    );

    let top_groups = rank_groups_by_median(
        &analyzed,
        analysis.group_by,
        ValueField::Price,
        analysis.min_group_size,
        analysis.top_n,
        price.missing,
    )?;
    if top_groups.is_empty() {
        warn!(
            "No {} has at least {} listings",
            analysis.group_by, analysis.min_group_size
        );
    }

    let names: Vec<String> = top_groups.iter().map(|g| g.group.clone()).collect();
    let top_rows = DataProcessor::restrict_to_groups(&analyzed, analysis.group_by, &names);
    rows.in_top_groups = top_rows.len();
    info!("Top {} groups: {:?}", names.len(), names);

    let price_summary = StatsCalculator::summarize_groups(
        &top_rows,
        analysis.group_by,
        ValueField::Price,
        Some(names.as_slice()),
        price.missing,
    )?;

    let reviews = if config.reviews.enabled {
        let policy = config.reviews.missing;
        let missing = top_rows
            .iter()
            .filter(|row| row.valid_value(ValueField::ReviewScoresRating).is_none())
            .count();
        debug!("{} listings in top groups have no review score", missing);

        let summaries = StatsCalculator::summarize_groups(
            &top_rows,
            analysis.group_by,
            ValueField::ReviewScoresRating,
            Some(names.as_slice()),
            policy,
        )?;
        Some(ReviewAnalysis {
            policy,
            missing,
            summaries,
        })
    } else {
        None
    };

    Ok(AnalysisReport {
        source: None,
        borough: analysis.borough.clone(),
        group_by: analysis.group_by,
        min_group_size: analysis.min_group_size,
        top_n: analysis.top_n,
        rows,
        borough_overview,
        distributions,
        top_groups,
        price_summary,
        reviews,
    })
}

fn price_table(rows: &[Listing], clean: bool) -> Cleaned {
    if clean {
        DataProcessor::clean_values(rows, ValueField::Price)
    } else {
        Cleaned {
            rows: rows.to_vec(),
            dropped: 0,
        }
    }
}

/// Per-borough price histograms, ordered by borough name.
fn borough_distributions(
    rows: &[Listing],
    bin_width: f64,
    max_value: Option<f64>,
    policy: MissingPolicy,
) -> Result<Vec<BoroughDistribution>, StatsError> {
    let grouped = StatsCalculator::group_values(rows, GroupKey::Borough, ValueField::Price, policy)?;

    let mut boroughs: Vec<&String> = grouped.keys().collect();
    boroughs.sort();

    boroughs
        .into_iter()
        .map(|borough| {
            let values = &grouped[borough];
            let (kept, clipped): (Vec<f64>, Vec<f64>) = values
                .iter()
                .partition(|v| max_value.map_or(true, |max| **v <= max));

            Ok(BoroughDistribution {
                borough: borough.clone(),
                count: values.len(),
                clipped: clipped.len(),
                bins: StatsCalculator::histogram(&kept, bin_width)?,
            })
        })
        .collect()
}
