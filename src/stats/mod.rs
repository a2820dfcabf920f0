//! Statistics module - Group summaries and median ranking

mod calculator;
mod ranking;

pub use calculator::{
    GroupSummary, HistogramBin, MissingPolicy, StatsCalculator, StatsError, MAX_HISTOGRAM_BINS,
};
pub use ranking::{rank_groups_by_median, top_n_groups_by_median, RankedGroup};
