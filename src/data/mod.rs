//! Data module - CSV loading and row selection

mod listing;
mod loader;
mod processor;

pub use listing::{GroupKey, Listing, ValueField};
pub use loader::{parse_numeric, ColumnMapping, DataLoader, LoaderError};
pub use processor::{Cleaned, DataProcessor};
