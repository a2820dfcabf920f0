//! Listing Module
//! Row type for one listing plus typed selectors for its categorical and numeric fields.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the listings table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub id: String,
    pub price: Option<f64>,
    pub neighborhood: Option<String>,
    pub borough: Option<String>,
    pub accommodates: Option<f64>,
    pub bathrooms: Option<f64>,
    pub bedrooms: Option<f64>,
    pub beds: Option<f64>,
    pub review_scores_rating: Option<f64>,
    pub number_of_reviews: Option<f64>,
    pub listing_url: Option<String>,
}

impl Listing {
    /// Get the categorical value used for grouping, if present.
    pub fn group(&self, key: GroupKey) -> Option<&str> {
        match key {
            GroupKey::Neighborhood => self.neighborhood.as_deref(),
            GroupKey::Borough => self.borough.as_deref(),
        }
    }

    /// Get a numeric attribute. May be null or non-finite.
    pub fn value(&self, field: ValueField) -> Option<f64> {
        match field {
            ValueField::Price => self.price,
            ValueField::ReviewScoresRating => self.review_scores_rating,
            ValueField::NumberOfReviews => self.number_of_reviews,
            ValueField::Accommodates => self.accommodates,
            ValueField::Bathrooms => self.bathrooms,
            ValueField::Bedrooms => self.bedrooms,
            ValueField::Beds => self.beds,
        }
    }

    /// Get a numeric attribute only when it is non-null and finite.
    pub fn valid_value(&self, field: ValueField) -> Option<f64> {
        self.value(field).filter(|v| v.is_finite())
    }
}

/// Categorical field a table can be grouped by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    #[default]
    Neighborhood,
    Borough,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Neighborhood => write!(f, "neighborhood"),
            GroupKey::Borough => write!(f, "borough"),
        }
    }
}

/// Numeric field a statistic is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueField {
    Price,
    ReviewScoresRating,
    NumberOfReviews,
    Accommodates,
    Bathrooms,
    Bedrooms,
    Beds,
}

impl fmt::Display for ValueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueField::Price => "price",
            ValueField::ReviewScoresRating => "review_scores_rating",
            ValueField::NumberOfReviews => "number_of_reviews",
            ValueField::Accommodates => "accommodates",
            ValueField::Bathrooms => "bathrooms",
            ValueField::Bedrooms => "bedrooms",
            ValueField::Beds => "beds",
        };
        write!(f, "{}", name)
    }
}
