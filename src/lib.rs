//! County Risk Scorer
//!
//! Data pipeline behind the county climate-risk dashboard: loads wind,
//! drought and wildfire hazard tables plus community (census) and health
//! indicators, normalizes them to one schema, and derives the filtered and
//! ranked views shown to the user.
//!
//! Module layout:
//! - `schema` / `normalizer`: canonical column names and header normalization
//! - `data` / `cache`: fetching CSV sources, per-source failure isolation, caching
//! - `filters`: state and hazard-threshold filters
//! - `combined`: min-max normalized composite risk across hazards
//! - `views` / `findings` / `export`: dashboard views, narrative findings, CSV downloads

pub mod cache;
pub mod combined;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod filters;
pub mod findings;
pub mod normalizer;
pub mod records;
pub mod schema;
pub mod utils;
pub mod views;

// Re-export commonly used types
pub use cache::LoadCache;
pub use combined::{combine_hazards, CombinedOutcome, CombinedRanking};
pub use config::DashboardConfig;
pub use data::{CsvFetcher, DashboardData, HttpFetcher, StaticFetcher};
pub use error::{ConfigError, FetchError};
pub use filters::{filter_by_state, filter_hazard, StateSelection, ALL_STATES};
pub use findings::KeyFindings;
pub use normalizer::normalize_frame;
pub use records::{
    CensusRecord, CombinedRiskRecord, CommunityMetric, Hazard, HazardRecord, HazardTable,
    HealthMetric, HealthRecord,
};
pub use schema::{SourceKind, SourceSchema};
pub use views::{DashboardView, Selection};
