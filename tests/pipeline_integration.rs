//! Integration tests for the full CSV → ranking → report run.
//!
//! These tests verify:
//! 1. Loading a listings export with currency-formatted prices and gaps
//! 2. Borough filtering, price cleaning and the minimum-size threshold together
//! 3. Rendering the result in every output format
//! 4. Error kinds for missing files and broken schemas

use listing_insights::config::Config;
use listing_insights::data::LoaderError;
use listing_insights::report::{render, OutputFormat};
use listing_insights::stats::{MissingPolicy, StatsError};
use listing_insights::{run_file, PipelineError};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

// Small export in the shape of a real scrape: quoted currency prices, empty cells,
// an unusable price and a borough-less row.
const LISTINGS_CSV: &str = "\
id,listing_url,price,neighborhood,borough,accommodates,bathrooms,bedrooms,beds,review_scores_rating,number_of_reviews
101,https://example.com/rooms/101,\"$1,200.00\",Tribeca,Manhattan,6,2,3,3,4.95,41
102,https://example.com/rooms/102,$800.00,Tribeca,Manhattan,4,1,2,2,,0
103,https://example.com/rooms/103,$950.00,Tribeca,Manhattan,4,1,2,2,4.80,12
201,https://example.com/rooms/201,$150.00,Harlem,Manhattan,2,1,1,1,4.60,88
202,https://example.com/rooms/202,$120.00,Harlem,Manhattan,2,1,1,1,4.70,54
203,https://example.com/rooms/203,,Harlem,Manhattan,2,1,1,1,4.10,3
204,https://example.com/rooms/204,$130.00,Harlem,Manhattan,1,1,1,1,4.90,17
301,https://example.com/rooms/301,$400.00,Chelsea,Manhattan,3,1,1,2,4.85,22
302,https://example.com/rooms/302,$420.00,Chelsea,Manhattan,3,1,1,2,4.75,30
401,https://example.com/rooms/401,$95.00,Bushwick,Brooklyn,2,1,1,1,4.65,140
402,https://example.com/rooms/402,$105.00,Bushwick,Brooklyn,2,1,1,1,4.55,97
403,https://example.com/rooms/403,$99.00,Bushwick,Brooklyn,2,1,1,1,,0
501,https://example.com/rooms/501,$70.00,Unknown,,1,1,1,1,4.00,1
";

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn manhattan_config() -> Config {
    let mut config = Config::default();
    config.analysis.borough = Some("manhattan".to_string());
    config.analysis.min_group_size = 3;
    config.analysis.top_n = 5;
    config.distribution.bin_width = 100.0;
    config
}

#[test]
fn test_manhattan_ranking_end_to_end() {
    let file = write_csv(LISTINGS_CSV);
    let report = run_file(file.path(), &manhattan_config()).unwrap();

    assert_eq!(report.rows.loaded, 13);
    assert_eq!(report.rows.borough_filtered, 9);
    assert_eq!(report.rows.price_dropped, 1);
    assert_eq!(report.rows.analyzed, 8);

    // Chelsea has only 2 listings and is below the threshold
    let names: Vec<&str> = report.top_groups.iter().map(|g| g.group.as_str()).collect();
    assert_eq!(names, vec!["Tribeca", "Harlem"]);
    assert_eq!(report.top_groups[0].median, 950.0);
    assert_eq!(report.top_groups[1].median, 130.0);
    assert_eq!(report.top_groups[1].count, 3);

    let tribeca = &report.price_summary[0];
    assert_eq!(tribeca.min, 800.0);
    assert_eq!(tribeca.max, 1200.0);

    let reviews = report.reviews.as_ref().unwrap();
    assert_eq!(reviews.missing, 1);
    assert_eq!(reviews.summaries[0].count, 2);
    assert_eq!(reviews.summaries[1].count, 3);

    assert!(report.source.as_deref().is_some_and(|s| !s.is_empty()));
}

#[test]
fn test_top_n_limits_output() {
    let file = write_csv(LISTINGS_CSV);
    let mut config = Config::default();
    config.analysis.min_group_size = 1;
    config.analysis.top_n = 2;

    let report = run_file(file.path(), &config).unwrap();
    let names: Vec<&str> = report.top_groups.iter().map(|g| g.group.as_str()).collect();
    assert_eq!(names, vec!["Tribeca", "Chelsea"]);
}

#[test]
fn test_group_by_borough() {
    let file = write_csv(LISTINGS_CSV);
    let mut config = Config::default();
    config.analysis.group_by = listing_insights::data::GroupKey::Borough;
    config.analysis.min_group_size = 1;

    let report = run_file(file.path(), &config).unwrap();
    let names: Vec<&str> = report.top_groups.iter().map(|g| g.group.as_str()).collect();
    // The listing with no borough belongs to no group
    assert_eq!(names, vec!["Manhattan", "Brooklyn"]);
}

#[test]
fn test_strict_price_policy_rejects_missing_price() {
    let file = write_csv(LISTINGS_CSV);
    let mut config = manhattan_config();
    config.price.clean = false;
    config.price.missing = MissingPolicy::Strict;

    let err = run_file(file.path(), &config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Stats(StatsError::InvalidInput { .. })
    ));
}

#[test]
fn test_lenient_price_policy_matches_cleaning() {
    let file = write_csv(LISTINGS_CSV);
    let cleaned = run_file(file.path(), &manhattan_config()).unwrap();

    let mut config = manhattan_config();
    config.price.clean = false;
    config.price.missing = MissingPolicy::Drop;
    let lenient = run_file(file.path(), &config).unwrap();

    assert_eq!(lenient.top_groups, cleaned.top_groups);
    assert_eq!(lenient.price_summary, cleaned.price_summary);
}

#[test]
fn test_missing_input_file() {
    let err = run_file(Path::new("/no/such/listings.csv"), &Config::default()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Load(LoaderError::InputNotFound(_))
    ));
}

#[test]
fn test_missing_price_column() {
    let file = write_csv("id,neighborhood,borough\n1,Chelsea,Manhattan\n");
    let err = run_file(file.path(), &Config::default()).unwrap_err();
    match err {
        PipelineError::Load(LoaderError::SchemaMismatch { column, .. }) => {
            assert_eq!(column, "price")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_header_only_file_gives_empty_ranking() {
    let file = write_csv("id,price,neighborhood,borough\n");
    let report = run_file(file.path(), &Config::default()).unwrap();
    assert_eq!(report.rows.loaded, 0);
    assert!(report.top_groups.is_empty());
}

#[test]
fn test_render_all_formats() {
    let file = write_csv(LISTINGS_CSV);
    let report = run_file(file.path(), &manhattan_config()).unwrap();

    let text = render(&report, OutputFormat::Text).unwrap();
    assert!(text.contains("Tribeca"));

    let json = render(&report, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["top_groups"][0]["group"], "Tribeca");
    assert_eq!(value["group_by"], "neighborhood");
    assert_eq!(value["reviews"]["policy"], "drop");

    let csv = render(&report, OutputFormat::Csv).unwrap();
    assert!(csv.starts_with("metric,group,rank,count"));
    assert!(csv.contains("price,Tribeca,1,3,"));
}
