//! Typed county records
//!
//! Every table in the pipeline is a `Vec` of one of these records, keyed by
//! County + State. Records are built once by the loaders and never mutated;
//! filters and the aggregator produce new vectors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display label for the low-income column shared by hazard and health tables
pub const LOW_INCOME_LABEL: &str = "Low-Income Population (%)";

/// Canonical column key for the low-income percentage
pub const LOW_INCOME_COLUMN: &str = "MEAN_low_income_percentage";

/// Anything keyed by County + State
pub trait CountyKeyed {
    fn county(&self) -> &str;
    fn state(&self) -> &str;

    /// Case-insensitive substring match on the county name
    fn county_matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        !needle.is_empty() && self.county().to_lowercase().contains(&needle)
    }
}

macro_rules! impl_county_keyed {
    ($($ty:ty),* $(,)?) => {
        $(impl CountyKeyed for $ty {
            fn county(&self) -> &str {
                &self.county
            }
            fn state(&self) -> &str {
                &self.state
            }
        })*
    };
}

impl_county_keyed!(HazardRecord, CensusRecord, HealthRecord, CombinedRiskRecord);

// ============================================================================
// Hazards
// ============================================================================

/// Climate hazard sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hazard {
    Wind,
    Drought,
    Wildfire,
}

impl Hazard {
    /// Merge order of the combined-risk aggregator
    pub const ALL: [Hazard; 3] = [Hazard::Wind, Hazard::Drought, Hazard::Wildfire];

    /// Position in [`Hazard::ALL`]
    pub fn index(self) -> usize {
        match self {
            Hazard::Wind => 0,
            Hazard::Drought => 1,
            Hazard::Wildfire => 2,
        }
    }

    /// Canonical risk column key
    pub fn risk_column(self) -> &'static str {
        match self {
            Hazard::Wind => "Wind_Risk",
            Hazard::Drought => "Drought_Risk",
            Hazard::Wildfire => "Wildfire_Risk",
        }
    }

    /// Human label for the hazard's risk column
    pub fn display_name(self) -> &'static str {
        match self {
            Hazard::Wind => "Wind Risk Score",
            Hazard::Drought => "Drought Risk Score",
            Hazard::Wildfire => "Wildfire Risk Score",
        }
    }

    /// Parse a selector label ("Wind Risk") or a column key ("Wind_Risk")
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| {
            label == h.risk_column() || label == h.to_string() || label == h.display_name()
        })
    }
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Hazard::Wind => "Wind Risk",
            Hazard::Drought => "Drought Risk",
            Hazard::Wildfire => "Wildfire Risk",
        };
        f.write_str(label)
    }
}

/// One county's exposure to a single hazard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HazardRecord {
    pub county: String,
    pub state: String,
    pub lat: f64,
    pub lon: f64,
    /// 10-year median mid-century projection, hazard-specific
    pub risk: f64,
    pub low_income_pct: Option<f64>,
}

impl HazardRecord {
    /// Map marker diameter: low-income share scaled onto 5..20
    pub fn marker_size(&self) -> f64 {
        self.low_income_pct.unwrap_or(0.0).clamp(0.0, 100.0) * 0.15 + 5.0
    }
}

/// All records of one hazard source
#[derive(Debug, Clone, PartialEq)]
pub struct HazardTable {
    pub hazard: Hazard,
    pub records: Vec<HazardRecord>,
}

impl HazardTable {
    pub fn new(hazard: Hazard, records: Vec<HazardRecord>) -> Self {
        Self { hazard, records }
    }

    pub fn empty(hazard: Hazard) -> Self {
        Self::new(hazard, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Census (community indicators)
// ============================================================================

/// Community indicators selectable in the community view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommunityMetric {
    Disadvantaged,
    EnergyBurden,
    Pm25,
    AdultAsthma,
    FireRiskShare,
    TotalPopulation,
}

impl CommunityMetric {
    pub const ALL: [CommunityMetric; 6] = [
        CommunityMetric::Disadvantaged,
        CommunityMetric::EnergyBurden,
        CommunityMetric::Pm25,
        CommunityMetric::AdultAsthma,
        CommunityMetric::FireRiskShare,
        CommunityMetric::TotalPopulation,
    ];

    /// Source column header in the census CSV
    pub fn column(self) -> &'static str {
        match self {
            CommunityMetric::Disadvantaged => "Identified as disadvantaged",
            CommunityMetric::EnergyBurden => "Energy burden",
            CommunityMetric::Pm25 => "PM2.5 in the air",
            CommunityMetric::AdultAsthma => {
                "Current asthma among adults aged greater than or equal to 18 years"
            }
            CommunityMetric::FireRiskShare => "Share of properties at risk of fire in 30 years",
            CommunityMetric::TotalPopulation => "Total population",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            CommunityMetric::Disadvantaged => "Disadvantaged Community",
            CommunityMetric::EnergyBurden => "Energy Burden (%)",
            CommunityMetric::Pm25 => "PM2.5 Air Pollution (µg/m³)",
            CommunityMetric::AdultAsthma => "Adult Asthma Rate (%)",
            CommunityMetric::FireRiskShare => "Properties at Fire Risk (%)",
            CommunityMetric::TotalPopulation => "Total Population",
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.column() == column)
    }
}

/// Socioeconomic indicators for one community
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CensusRecord {
    pub county: String,
    pub state: String,
    pub disadvantaged: Option<bool>,
    pub energy_burden: Option<f64>,
    pub pm25: Option<f64>,
    pub adult_asthma: Option<f64>,
    pub fire_risk_share: Option<f64>,
    pub total_population: Option<f64>,
}

impl CensusRecord {
    /// Numeric value of a metric; the disadvantaged flag reads as 1.0/0.0
    pub fn metric(&self, metric: CommunityMetric) -> Option<f64> {
        match metric {
            CommunityMetric::Disadvantaged => {
                self.disadvantaged.map(|flag| if flag { 1.0 } else { 0.0 })
            }
            CommunityMetric::EnergyBurden => self.energy_burden,
            CommunityMetric::Pm25 => self.pm25,
            CommunityMetric::AdultAsthma => self.adult_asthma,
            CommunityMetric::FireRiskShare => self.fire_risk_share,
            CommunityMetric::TotalPopulation => self.total_population,
        }
    }
}

// ============================================================================
// Health
// ============================================================================

/// Health outcomes selectable in the health view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthMetric {
    Asthma,
    Diabetes,
    HeartDisease,
    LifeExpectancy,
}

impl HealthMetric {
    pub const ALL: [HealthMetric; 4] = [
        HealthMetric::Asthma,
        HealthMetric::Diabetes,
        HealthMetric::HeartDisease,
        HealthMetric::LifeExpectancy,
    ];

    pub fn column(self) -> &'static str {
        match self {
            HealthMetric::Asthma => "Asthma_Rate____",
            HealthMetric::Diabetes => "Diabetes_Rate____",
            HealthMetric::HeartDisease => "Heart_Disease_Rate____",
            HealthMetric::LifeExpectancy => "Life_expectancy__years_",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            HealthMetric::Asthma => "Asthma Rate (%)",
            HealthMetric::Diabetes => "Diabetes Rate (%)",
            HealthMetric::HeartDisease => "Heart Disease Rate (%)",
            HealthMetric::LifeExpectancy => "Life Expectancy (Years)",
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.column() == column)
    }
}

/// Health outcomes and income for one county
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthRecord {
    pub county: String,
    pub state: String,
    pub low_income_pct: f64,
    pub asthma_rate: Option<f64>,
    pub diabetes_rate: Option<f64>,
    pub heart_disease_rate: Option<f64>,
    pub life_expectancy: Option<f64>,
}

impl HealthRecord {
    pub fn metric(&self, metric: HealthMetric) -> Option<f64> {
        match metric {
            HealthMetric::Asthma => self.asthma_rate,
            HealthMetric::Diabetes => self.diabetes_rate,
            HealthMetric::HeartDisease => self.heart_disease_rate,
            HealthMetric::LifeExpectancy => self.life_expectancy,
        }
    }
}

// ============================================================================
// Combined risk (derived)
// ============================================================================

/// Cross-hazard composite for one county, built on demand by the aggregator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRiskRecord {
    pub county: String,
    pub state: String,
    pub low_income_pct: Option<f64>,
    /// Normalized (0-100) risk per hazard, indexed by [`Hazard::index`]
    pub normalized: [Option<f64>; 3],
    pub combined_risk: f64,
}

impl CombinedRiskRecord {
    pub fn normalized_for(&self, hazard: Hazard) -> Option<f64> {
        self.normalized[hazard.index()]
    }

    /// Number of hazards that contributed to the composite
    pub fn hazard_count(&self) -> usize {
        self.normalized.iter().flatten().count()
    }
}

/// Display name for any metric column key known to the dashboard
pub fn metric_display_name(column: &str) -> Option<&'static str> {
    if column == LOW_INCOME_COLUMN {
        return Some(LOW_INCOME_LABEL);
    }
    Hazard::ALL
        .into_iter()
        .find(|h| h.risk_column() == column)
        .map(Hazard::display_name)
        .or_else(|| CommunityMetric::from_column(column).map(CommunityMetric::display_name))
        .or_else(|| HealthMetric::from_column(column).map(HealthMetric::display_name))
}
