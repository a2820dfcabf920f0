//! CSV Data Loader Module
//! Loads a listings CSV with Polars and converts it into typed `Listing` rows.

use crate::data::Listing;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("Schema mismatch on column '{column}': {reason}")]
    SchemaMismatch { column: String, reason: String },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Names of the CSV columns backing each listing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub id: String,
    pub price: String,
    pub neighborhood: String,
    pub borough: String,
    pub accommodates: String,
    pub bathrooms: String,
    pub bedrooms: String,
    pub beds: String,
    pub review_scores_rating: String,
    pub number_of_reviews: String,
    pub listing_url: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            price: "price".to_string(),
            neighborhood: "neighborhood".to_string(),
            borough: "borough".to_string(),
            accommodates: "accommodates".to_string(),
            bathrooms: "bathrooms".to_string(),
            bedrooms: "bedrooms".to_string(),
            beds: "beds".to_string(),
            review_scores_rating: "review_scores_rating".to_string(),
            number_of_reviews: "number_of_reviews".to_string(),
            listing_url: "listing_url".to_string(),
        }
    }
}

/// Loads listings tables with Polars.
pub struct DataLoader {
    columns: ColumnMapping,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(ColumnMapping::default())
    }
}

impl DataLoader {
    pub fn new(columns: ColumnMapping) -> Self {
        Self { columns }
    }

    /// Read a CSV file into a DataFrame of text columns.
    ///
    /// No dtype is inferred, so every cell reaches the per-column parsing in
    /// `listings_from_frame` and a bad cell anywhere in the file is reported.
    pub fn load_csv(&self, file_path: &Path) -> Result<DataFrame, LoaderError> {
        if !file_path.is_file() {
            return Err(LoaderError::InputNotFound(file_path.to_path_buf()));
        }

        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;

        info!(
            "Loaded {} rows x {} columns from {}",
            df.height(),
            df.width(),
            file_path.display()
        );
        Ok(df)
    }

    /// Read a CSV file straight into listing rows.
    pub fn load_listings(&self, file_path: &Path) -> Result<Vec<Listing>, LoaderError> {
        let df = self.load_csv(file_path)?;
        self.listings_from_frame(&df)
    }

    /// Convert a DataFrame into listing rows.
    ///
    /// `id`, `price`, `neighborhood` and `borough` columns are required; the
    /// remaining attributes are left empty when their column is absent. A
    /// listing with an empty id is named by its 1-based row number.
    pub fn listings_from_frame(&self, df: &DataFrame) -> Result<Vec<Listing>, LoaderError> {
        let cols = &self.columns;

        let ids = text_values(required(df, &cols.id)?);
        let prices = numeric_values(required(df, &cols.price)?, &cols.price)?;
        let neighborhoods = text_values(required(df, &cols.neighborhood)?);
        let boroughs = text_values(required(df, &cols.borough)?);

        let accommodates = optional_numeric(df, &cols.accommodates)?;
        let bathrooms = optional_numeric(df, &cols.bathrooms)?;
        let bedrooms = optional_numeric(df, &cols.bedrooms)?;
        let beds = optional_numeric(df, &cols.beds)?;
        let ratings = optional_numeric(df, &cols.review_scores_rating)?;
        let reviews = optional_numeric(df, &cols.number_of_reviews)?;
        let urls = optional_text(df, &cols.listing_url);

        let listings: Vec<Listing> = (0..df.height())
            .map(|i| Listing {
                id: ids[i].clone().unwrap_or_else(|| format!("row {}", i + 1)),
                price: prices[i],
                neighborhood: neighborhoods[i].clone(),
                borough: boroughs[i].clone(),
                accommodates: at(&accommodates, i),
                bathrooms: at(&bathrooms, i),
                bedrooms: at(&bedrooms, i),
                beds: at(&beds, i),
                review_scores_rating: at(&ratings, i),
                number_of_reviews: at(&reviews, i),
                listing_url: urls.as_ref().and_then(|u| u[i].clone()),
            })
            .collect();

        debug!("Converted {} listings", listings.len());
        Ok(listings)
    }
}

fn required<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, LoaderError> {
    df.column(name).map_err(|_| LoaderError::SchemaMismatch {
        column: name.to_string(),
        reason: "column not found".to_string(),
    })
}

fn optional_numeric(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<f64>>>, LoaderError> {
    match df.column(name) {
        Ok(column) => numeric_values(column, name).map(Some),
        Err(_) => {
            debug!("Optional column '{}' not present", name);
            Ok(None)
        }
    }
}

fn optional_text(df: &DataFrame, name: &str) -> Option<Vec<Option<String>>> {
    df.column(name).ok().map(text_values)
}

fn at(values: &Option<Vec<Option<f64>>>, i: usize) -> Option<f64> {
    values.as_ref().and_then(|v| v[i])
}

/// Extract a column as trimmed text; empty cells become `None`.
fn text_values(column: &Column) -> Vec<Option<String>> {
    (0..column.len())
        .map(|i| {
            let val = column.get(i).ok()?;
            if val.is_null() {
                return None;
            }
            let text = val
                .get_str()
                .map(str::to_string)
                .unwrap_or_else(|| val.to_string());
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

/// Extract a column as floats. Text columns are parsed, allowing currency formatting.
fn numeric_values(column: &Column, name: &str) -> Result<Vec<Option<f64>>, LoaderError> {
    let dtype = column.dtype();

    if is_numeric(dtype) {
        let value_f64 = column.cast(&DataType::Float64)?;
        let value_ca = value_f64.f64()?;
        return Ok(value_ca.into_iter().collect());
    }

    match dtype {
        DataType::Null => Ok(vec![None; column.len()]),
        DataType::String => {
            let series = column.as_materialized_series();
            let value_ca = series.str()?;
            value_ca
                .into_iter()
                .map(|cell| match cell {
                    None => Ok(None),
                    Some(raw) => parse_numeric(raw).map_err(|_| LoaderError::SchemaMismatch {
                        column: name.to_string(),
                        reason: format!("expected a number, found '{}'", raw),
                    }),
                })
                .collect()
        }
        other => Err(LoaderError::SchemaMismatch {
            column: name.to_string(),
            reason: format!("expected a numeric column, found {}", other),
        }),
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Parse a numeric cell such as `"150"`, `"$1,250.00"` or `"NA"`.
pub fn parse_numeric(raw: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") || trimmed.eq_ignore_ascii_case("n/a")
    {
        return Ok(None);
    }

    let cleaned: String = trimmed
        .strip_prefix('$')
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.trim().parse::<f64>().map(Some)
}
