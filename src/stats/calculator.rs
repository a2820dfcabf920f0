//! Statistics Calculator Module
//! Per-group descriptive statistics (quartiles, median, sample std) and histograms.

use crate::data::{GroupKey, Listing, ValueField};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("Invalid {field} on listing '{id}': value is missing or not finite")]
    InvalidInput { id: String, field: ValueField },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// What to do with a row whose value is null or non-finite when it reaches a reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Fail with `StatsError::InvalidInput`.
    #[default]
    Strict,
    /// Exclude the row before groups are sized.
    Drop,
}

/// Six-number summary (plus quartiles) for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std_dev: Option<f64>,
    pub q3: f64,
    pub iqr: f64,
    pub max: f64,
}

/// One histogram bin covering `[lower, upper)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Upper bound on the number of bins one histogram may span.
pub const MAX_HISTOGRAM_BINS: usize = 100_000;

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    ///
    /// Returns `None` for an empty slice. Quartiles and the median share the
    /// linear-interpolation convention of [`StatsCalculator::percentile`].
    pub fn compute_summary(values: &[f64]) -> Option<GroupSummary> {
        let n = values.len();
        if n == 0 {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = Self::percentile(&sorted, 25.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let std_dev = if n > 1 {
            Some(values.iter().std_dev())
        } else {
            None
        };

        Some(GroupSummary {
            group: String::new(),
            count: n,
            min: sorted[0],
            q1,
            median: Self::percentile(&sorted, 50.0),
            mean: values.iter().mean(),
            std_dev,
            q3,
            iqr: q3 - q1,
            max: sorted[n - 1],
        })
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Standard median: average of the two middle values for even counts.
    pub fn median(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self::percentile(&sorted, 50.0))
    }

    /// Partition valid values of `field` by `key`.
    ///
    /// Rows without a group value are skipped. Rows with a null or non-finite
    /// value are handled according to `policy`.
    pub fn group_values(
        rows: &[Listing],
        key: GroupKey,
        field: ValueField,
        policy: MissingPolicy,
    ) -> Result<HashMap<String, Vec<f64>>, StatsError> {
        let mut grouped: HashMap<String, Vec<f64>> = HashMap::new();

        for row in rows {
            let Some(group) = row.group(key) else {
                continue;
            };

            match (row.valid_value(field), policy) {
                (Some(v), _) => grouped.entry(group.to_string()).or_default().push(v),
                (None, MissingPolicy::Drop) => {}
                (None, MissingPolicy::Strict) => {
                    return Err(StatsError::InvalidInput {
                        id: row.id.clone(),
                        field,
                    })
                }
            }
        }

        Ok(grouped)
    }

    /// Summarize `field` for each group.
    ///
    /// With `groups`, output follows that order and skips groups with no valid
    /// rows. Without it, every group is summarized in ascending name order.
    pub fn summarize_groups(
        rows: &[Listing],
        key: GroupKey,
        field: ValueField,
        groups: Option<&[String]>,
        policy: MissingPolicy,
    ) -> Result<Vec<GroupSummary>, StatsError> {
        let grouped = Self::group_values(rows, key, field, policy)?;

        let order: Vec<String> = match groups {
            Some(groups) => groups.to_vec(),
            None => {
                let mut names: Vec<String> = grouped.keys().cloned().collect();
                names.sort();
                names
            }
        };

        // Use rayon for parallel computation
        let summaries = order
            .par_iter()
            .filter_map(|name| {
                let values = grouped.get(name)?;
                let mut summary = Self::compute_summary(values)?;
                summary.group = name.clone();
                Some(summary)
            })
            .collect();

        Ok(summaries)
    }

    /// Fixed-width histogram with the first bin aligned to a multiple of `bin_width`.
    ///
    /// Non-finite values are ignored. The bin holding the maximum is the last one.
    /// A range wider than `MAX_HISTOGRAM_BINS` bins is `InvalidParameter`.
    pub fn histogram(values: &[f64], bin_width: f64) -> Result<Vec<HistogramBin>, StatsError> {
        if !bin_width.is_finite() || bin_width <= 0.0 {
            return Err(StatsError::InvalidParameter(format!(
                "histogram bin width must be positive, got {}",
                bin_width
            )));
        }

        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Ok(Vec::new());
        }

        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let start = (min / bin_width).floor() * bin_width;
        let span = ((max - start) / bin_width).floor();
        if !span.is_finite() || span >= MAX_HISTOGRAM_BINS as f64 {
            return Err(StatsError::InvalidParameter(format!(
                "values from {} to {} need more than {} bins of width {}",
                min, max, MAX_HISTOGRAM_BINS, bin_width
            )));
        }
        let n_bins = (span as usize)
            .checked_add(1)
            .ok_or_else(|| StatsError::InvalidParameter("histogram bin count overflow".to_string()))?;

        let mut counts = vec![0usize; n_bins];
        for v in &finite {
            let idx = (((v - start) / bin_width).floor() as usize).min(n_bins - 1);
            counts[idx] += 1;
        }

        Ok(counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: start + i as f64 * bin_width,
                upper: start + (i + 1) as f64 * bin_width,
                count,
            })
            .collect())
    }
}
