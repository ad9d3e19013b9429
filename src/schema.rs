//! Source schema descriptors
//!
//! Each upstream CSV has its own headers. A [`SourceSchema`] lists, for one
//! source type, which raw headers map onto which canonical columns, how each
//! column is coerced, and which columns must be present for a row to survive.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::records::{CommunityMetric, Hazard, HealthMetric, LOW_INCOME_COLUMN};

pub const COUNTY: &str = "County";
pub const STATE: &str = "State";
pub const LAT: &str = "Lat";
pub const LON: &str = "Lon";

/// Which upstream table a schema (or a cache entry) describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Hazard(Hazard),
    Census,
    Health,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Hazard(hazard) => write!(f, "{} hazard", hazard),
            SourceKind::Census => f.write_str("census"),
            SourceKind::Health => f.write_str("health"),
        }
    }
}

/// How a column's cells are coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// County/State join key: title-cased text
    Key,
    /// Parsed as f64, non-parseable cells become missing
    Numeric,
    /// "true"/"false" text coerced to a boolean
    Flag,
}

/// One canonical column and the raw headers it may arrive under
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: ColumnKind,
    /// Rows missing this column are dropped, and a source without the
    /// header fails to load
    pub required: bool,
}

impl ColumnSpec {
    const fn new(
        canonical: &'static str,
        aliases: &'static [&'static str],
        kind: ColumnKind,
        required: bool,
    ) -> Self {
        Self { canonical, aliases, kind, required }
    }

    /// Headers to try, raw aliases first, then the canonical name.
    /// Accepting the canonical name keeps normalization idempotent.
    pub fn lookup_names(&self) -> Vec<&'static str> {
        let mut names = self.aliases.to_vec();
        names.push(self.canonical);
        names
    }
}

/// Column rules for one source type
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSchema {
    pub kind: SourceKind,
    pub columns: Vec<ColumnSpec>,
}

impl SourceSchema {
    /// Hazard tables: `CF, SF, Latitude, Longitude, MEAN_low_income_percentage,
    /// midcent_median_10yr`, the last renamed to the hazard's risk column
    pub fn hazard(hazard: Hazard) -> Self {
        Self {
            kind: SourceKind::Hazard(hazard),
            columns: vec![
                ColumnSpec::new(COUNTY, &["CF"], ColumnKind::Key, true),
                ColumnSpec::new(STATE, &["SF"], ColumnKind::Key, true),
                ColumnSpec::new(LAT, &["Latitude"], ColumnKind::Numeric, true),
                ColumnSpec::new(LON, &["Longitude"], ColumnKind::Numeric, true),
                ColumnSpec::new(LOW_INCOME_COLUMN, &[], ColumnKind::Numeric, true),
                ColumnSpec::new(hazard.risk_column(), &["midcent_median_10yr"], ColumnKind::Numeric, true),
            ],
        }
    }

    /// Census communities table (`County Name`, `State/Territory`, indicators)
    pub fn census() -> Self {
        let mut columns = vec![
            ColumnSpec::new(COUNTY, &["County Name"], ColumnKind::Key, true),
            ColumnSpec::new(STATE, &["State/Territory"], ColumnKind::Key, true),
        ];
        columns.extend(CommunityMetric::ALL.into_iter().map(|metric| {
            let kind = match metric {
                CommunityMetric::Disadvantaged => ColumnKind::Flag,
                _ => ColumnKind::Numeric,
            };
            ColumnSpec::new(metric.column(), &[], kind, false)
        }));

        Self { kind: SourceKind::Census, columns }
    }

    /// Health outcomes table; low-income share is mandatory per row
    pub fn health() -> Self {
        let mut columns = vec![
            ColumnSpec::new(COUNTY, &["CF"], ColumnKind::Key, true),
            ColumnSpec::new(STATE, &["SF"], ColumnKind::Key, true),
            ColumnSpec::new(LOW_INCOME_COLUMN, &[], ColumnKind::Numeric, true),
        ];
        columns.extend(
            HealthMetric::ALL
                .into_iter()
                .map(|metric| ColumnSpec::new(metric.column(), &[], ColumnKind::Numeric, false)),
        );

        Self { kind: SourceKind::Health, columns }
    }

    pub fn for_kind(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Hazard(hazard) => Self::hazard(hazard),
            SourceKind::Census => Self::census(),
            SourceKind::Health => Self::health(),
        }
    }

    pub fn column(&self, canonical: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|spec| spec.canonical == canonical)
    }

    /// Canonical column names in output order
    pub fn canonical_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|spec| spec.canonical).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hazard_schema_renames_risk_column() {
        let schema = SourceSchema::hazard(Hazard::Drought);
        let risk = schema.column("Drought_Risk").unwrap();
        assert_eq!(risk.lookup_names(), vec!["midcent_median_10yr", "Drought_Risk"]);
        assert!(risk.required);
        assert_eq!(schema.canonical_names()[0], COUNTY);
    }

    #[test]
    fn test_census_schema_has_flag_column() {
        let schema = SourceSchema::census();
        let flag = schema.column("Identified as disadvantaged").unwrap();
        assert_eq!(flag.kind, ColumnKind::Flag);
        assert!(!flag.required);
        assert_eq!(schema.column(COUNTY).unwrap().aliases, &["County Name"]);
    }

    #[test]
    fn test_health_schema_requires_low_income() {
        let schema = SourceSchema::health();
        assert!(schema.column(LOW_INCOME_COLUMN).unwrap().required);
        assert!(!schema.column("Asthma_Rate____").unwrap().required);
    }
}
