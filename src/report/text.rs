//! Text report generation.
//!
//! Renders the analysis as plain-text tables for terminal reading.

use crate::pipeline::{AnalysisReport, BoroughDistribution};
use crate::stats::{GroupSummary, RankedGroup};

/// Width of the longest histogram bar.
const BAR_WIDTH: usize = 40;

/// Generate the complete text report.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str(&generate_header(report));
    output.push_str(&generate_ranking_section(report));

    output.push_str(&format!("Price by {} (top groups)\n", report.group_by));
    output.push_str(&summary_table(&report.price_summary));
    output.push('\n');

    if let Some(reviews) = &report.reviews {
        output.push_str(&format!(
            "Review scores by {} ({} listings without a score, policy: {:?})\n",
            report.group_by, reviews.missing, reviews.policy
        ));
        output.push_str(&summary_table(&reviews.summaries));
        output.push('\n');
    }

    if !report.borough_overview.is_empty() {
        output.push_str("Price by borough (all listings)\n");
        output.push_str(&summary_table(&report.borough_overview));
        output.push('\n');
    }

    for dist in &report.distributions {
        output.push_str(&generate_distribution(dist));
    }

    output
}

fn generate_header(report: &AnalysisReport) -> String {
    let mut section = String::new();
    let rows = &report.rows;

    section.push_str("Listing Insights\n================\n\n");
    if let Some(source) = &report.source {
        section.push_str(&format!("Source:           {}\n", source));
    }
    section.push_str(&format!(
        "Borough:          {}\n",
        report.borough.as_deref().unwrap_or("(all)")
    ));
    section.push_str(&format!("Rows loaded:      {}\n", rows.loaded));
    section.push_str(&format!("In borough:       {}\n", rows.borough_filtered));
    section.push_str(&format!(
        "Analyzed:         {} ({} without a usable price)\n",
        rows.analyzed, rows.price_dropped
    ));
    section.push_str(&format!("In top groups:    {}\n\n", rows.in_top_groups));

    section
}

fn generate_ranking_section(report: &AnalysisReport) -> String {
    let mut section = format!(
        "Top {} {} groups by median price (min {} listings)\n",
        report.top_n, report.group_by, report.min_group_size
    );

    if report.top_groups.is_empty() {
        section.push_str("  No group meets the minimum size.\n\n");
        return section;
    }

    let width = name_width(report.top_groups.iter().map(|g| g.group.as_str()));
    section.push_str(&format!(
        "  {:>4}  {:<width$}  {:>7}  {:>10}\n",
        "Rank", "Group", "Count", "Median"
    ));
    for RankedGroup {
        rank,
        group,
        count,
        median,
    } in &report.top_groups
    {
        section.push_str(&format!(
            "  {:>4}  {:<width$}  {:>7}  {:>10.2}\n",
            rank, group, count, median
        ));
    }
    section.push('\n');
    section
}

fn summary_table(summaries: &[GroupSummary]) -> String {
    if summaries.is_empty() {
        return "  (no data)\n".to_string();
    }

    let width = name_width(summaries.iter().map(|s| s.group.as_str()));
    let mut table = format!(
        "  {:<width$}  {:>6}  {:>9}  {:>9}  {:>9}  {:>9}  {:>9}  {:>9}  {:>9}\n",
        "Group", "N", "Min", "Mean", "Median", "Std", "IQR", "Max", "Q1-Q3"
    );

    for s in summaries {
        let std = s
            .std_dev
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string());
        table.push_str(&format!(
            "  {:<width$}  {:>6}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}  {:>9.2}  {:>9.2}  {:.1}-{:.1}\n",
            s.group, s.count, s.min, s.mean, s.median, std, s.iqr, s.max, s.q1, s.q3
        ));
    }
    table
}

fn generate_distribution(dist: &BoroughDistribution) -> String {
    let mut section = format!(
        "Price distribution: {} ({} listings",
        dist.borough, dist.count
    );
    if dist.clipped > 0 {
        section.push_str(&format!(", {} above range", dist.clipped));
    }
    section.push_str(")\n");

    let peak = dist.bins.iter().map(|b| b.count).max().unwrap_or(0);
    for bin in &dist.bins {
        let bar = if peak == 0 {
            0
        } else {
            (bin.count * BAR_WIDTH).div_ceil(peak)
        };
        section.push_str(&format!(
            "  {:>9.0} - {:<9.0} {:>6} {}\n",
            bin.lower,
            bin.upper,
            bin.count,
            "#".repeat(bar)
        ));
    }
    section.push('\n');
    section
}

fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(|n| n.chars().count()).max().unwrap_or(0).max(5)
}
