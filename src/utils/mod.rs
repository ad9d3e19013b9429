//! Utility modules for the risk pipeline
//!
//! Contains shared functionality used across loaders, filters and views:
//! - Normalization: title-casing, flag parsing, min-max scaling
//! - Column helpers: typed column extraction with header validation
//! - Stats: summaries and histograms over numeric columns

pub mod normalization;
pub mod column_helpers;
pub mod stats;

// Re-export commonly used functions
pub use normalization::{title_case, parse_flag, min_max_normalize, NORMALIZED_MAX};
pub use column_helpers::{find_column, require_column, column_as_f64, column_as_str, column_as_flag};
pub use stats::{summarize, histogram, mean_present, SummaryStats, HistogramBin};
