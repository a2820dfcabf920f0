//! Summary Table Module
//! Flattens the report's per-group summaries into one Polars DataFrame for CSV export.

use crate::pipeline::AnalysisReport;
use crate::stats::GroupSummary;
use polars::prelude::*;

/// Long-format rows: one per (metric, group).
#[derive(Default)]
struct SummaryRows {
    metrics: Vec<String>,
    groups: Vec<String>,
    ranks: Vec<Option<u32>>,
    counts: Vec<u64>,
    mins: Vec<f64>,
    q1s: Vec<f64>,
    medians: Vec<f64>,
    means: Vec<f64>,
    stds: Vec<Option<f64>>,
    q3s: Vec<f64>,
    iqrs: Vec<f64>,
    maxs: Vec<f64>,
}

impl SummaryRows {
    fn push(&mut self, metric: &str, rank: Option<u32>, s: &GroupSummary) {
        self.metrics.push(metric.to_string());
        self.groups.push(s.group.clone());
        self.ranks.push(rank);
        self.counts.push(s.count as u64);
        self.mins.push(s.min);
        self.q1s.push(s.q1);
        self.medians.push(s.median);
        self.means.push(s.mean);
        self.stds.push(s.std_dev);
        self.q3s.push(s.q3);
        self.iqrs.push(s.iqr);
        self.maxs.push(s.max);
    }
}

/// Build the summary table.
///
/// Output columns: [metric, group, rank, count, min, q1, median, mean, std_dev, q3, iqr, max]
pub fn summary_frame(report: &AnalysisReport) -> PolarsResult<DataFrame> {
    let rank_of = |group: &str| -> Option<u32> {
        report
            .top_groups
            .iter()
            .find(|g| g.group == group)
            .map(|g| g.rank as u32)
    };

    let mut rows = SummaryRows::default();
    for s in &report.price_summary {
        rows.push("price", rank_of(s.group.as_str()), s);
    }
    if let Some(reviews) = &report.reviews {
        for s in &reviews.summaries {
            rows.push("review_scores_rating", rank_of(s.group.as_str()), s);
        }
    }
    for s in &report.borough_overview {
        rows.push("borough_price", None, s);
    }

    DataFrame::new(vec![
        Column::new("metric".into(), rows.metrics),
        Column::new("group".into(), rows.groups),
        Column::new("rank".into(), rows.ranks),
        Column::new("count".into(), rows.counts),
        Column::new("min".into(), rows.mins),
        Column::new("q1".into(), rows.q1s),
        Column::new("median".into(), rows.medians),
        Column::new("mean".into(), rows.means),
        Column::new("std_dev".into(), rows.stds),
        Column::new("q3".into(), rows.q3s),
        Column::new("iqr".into(), rows.iqrs),
        Column::new("max".into(), rows.maxs),
    ])
}

/// Serialize a DataFrame as CSV text with a header row.
pub fn write_csv(df: &mut DataFrame) -> PolarsResult<String> {
    let mut buf: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buf).include_header(true).finish(df)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::Listing;
    use crate::pipeline::run_analysis;

    fn report() -> AnalysisReport {
        let listings: Vec<Listing> = [("A", 100.0, 4.0), ("A", 300.0, 5.0), ("B", 50.0, 3.0)]
            .iter()
            .enumerate()
            .map(|(i, (hood, price, rating))| Listing {
                id: i.to_string(),
                neighborhood: Some(hood.to_string()),
                borough: Some("Queens".to_string()),
                price: Some(*price),
                review_scores_rating: Some(*rating),
                ..Default::default()
            })
            .collect();

        let mut config = Config::default();
        config.analysis.min_group_size = 1;
        run_analysis(&listings, &config).unwrap()
    }

    #[test]
    fn test_summary_frame_shape() {
        let df = summary_frame(&report()).unwrap();
        // 2 price rows, 2 review rows, 1 borough row
        assert_eq!(df.height(), 5);
        assert_eq!(df.width(), 12);

        let ranks = df.column("rank").unwrap();
        assert!(ranks.get(4).unwrap().is_null());
    }

    #[test]
    fn test_write_csv_header_and_rows() {
        let mut df = summary_frame(&report()).unwrap();
        let csv = write_csv(&mut df).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "metric,group,rank,count,min,q1,median,mean,std_dev,q3,iqr,max"
        );
        assert_eq!(lines.len(), 6);
        assert!(lines[1].starts_with("price,A,1,2,"));
        assert!(lines[2].starts_with("price,B,2,1,"));
        assert!(lines[5].starts_with("borough_price,Queens,,3,"));
    }
}
