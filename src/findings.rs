//! Key findings
//!
//! Two narrative sentences computed once from the full, unfiltered tables.
//! They do not follow the user's selection.

use serde::Serialize;

use crate::filters::{filter_hazard, sort_desc_by};
use crate::records::{HazardRecord, HazardTable, HealthRecord};
use crate::utils::mean_present;

/// Wildfire risk at or above this counts as elevated
pub const HIGH_WILDFIRE_THRESHOLD: f64 = 50.0;

/// How many top counties the findings look at
const FINDINGS_TOP: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyFindings {
    pub asthma: String,
    pub wildfire: String,
}

impl KeyFindings {
    pub fn compute(health: &[HealthRecord], wildfire: &HazardTable) -> Self {
        Self {
            asthma: asthma_finding(health),
            wildfire: wildfire_finding(wildfire),
        }
    }
}

/// Top two counties by asthma rate, with their low-income shares
pub fn asthma_finding(health: &[HealthRecord]) -> String {
    if health.is_empty() {
        return "No health data available.".to_string();
    }

    let mut ranked: Vec<(&HealthRecord, f64)> = health
        .iter()
        .filter_map(|r| r.asthma_rate.map(|rate| (r, rate)))
        .collect();
    sort_desc_by(&mut ranked, |(_, rate)| *rate);
    ranked.truncate(FINDINGS_TOP);

    let [(first, first_rate), (second, second_rate), ..] = ranked.as_slice() else {
        return "Insufficient data to identify top asthma counties across states.".to_string();
    };

    format!(
        "For example, {}, {} has an asthma rate of {:.1}% and a low-income population \
         percentage of {:.1}%, while {}, {} shows an asthma rate of {:.1}% with a low-income \
         percentage of {:.1}%. These counties rank among the top {} for asthma prevalence, \
         pointing to a link between economic disadvantage and respiratory health. Filter by \
         state and select 'Asthma Rate (%)' to explore these patterns.",
        first.county, first.state, first_rate, first.low_income_pct,
        second.county, second.state, second_rate, second.low_income_pct,
        FINDINGS_TOP,
    )
}

/// Highest wildfire-risk counties at or above the elevated threshold
pub fn wildfire_finding(wildfire: &HazardTable) -> String {
    let mut high: Vec<HazardRecord> = filter_hazard(&wildfire.records, HIGH_WILDFIRE_THRESHOLD);
    if high.is_empty() {
        return format!(
            "No wildfire data available with risk >= {:.0}.",
            HIGH_WILDFIRE_THRESHOLD
        );
    }

    sort_desc_by(&mut high, |r| r.risk);
    high.truncate(FINDINGS_TOP);

    let [first, second, ..] = high.as_slice() else {
        return "Insufficient data to identify high wildfire risk counties.".to_string();
    };

    let max_risk = first.risk;
    let low_income = mean_present(high.iter().map(|r| r.low_income_pct))
        .map(|pct| format!("{:.1}%", pct))
        .unwrap_or_else(|| "an unknown share".to_string());

    format!(
        "Counties like {}, {} and {}, {}, which have low-income populations around {}, \
         also face elevated wildfire risks, with scores reaching up to {:.1}. This suggests \
         a compounded vulnerability in these areas. Filter by state, choose 'Wildfire Risk' \
         and set the risk threshold to {:.0} to see similar results.",
        first.county, first.state, second.county, second.state,
        low_income, max_risk, HIGH_WILDFIRE_THRESHOLD,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Hazard;

    fn health(county: &str, asthma: Option<f64>, low_income: f64) -> HealthRecord {
        HealthRecord {
            county: county.to_string(),
            state: "Ohio".to_string(),
            low_income_pct: low_income,
            asthma_rate: asthma,
            diabetes_rate: None,
            heart_disease_rate: None,
            life_expectancy: None,
        }
    }

    fn fire(county: &str, risk: f64, low_income: Option<f64>) -> HazardRecord {
        HazardRecord {
            county: county.to_string(),
            state: "California".to_string(),
            lat: 0.0,
            lon: 0.0,
            risk,
            low_income_pct: low_income,
        }
    }

    #[test]
    fn test_asthma_finding_names_top_two() {
        let rows = vec![
            health("Lucas", Some(11.04), 30.0),
            health("Summit", None, 10.0),
            health("Cuyahoga", Some(12.36), 35.26),
            health("Wood", Some(9.0), 20.0),
        ];
        let text = asthma_finding(&rows);
        assert_eq!(
            text,
            "For example, Cuyahoga, Ohio has an asthma rate of 12.4% and a low-income population \
             percentage of 35.3%, while Lucas, Ohio shows an asthma rate of 11.0% with a low-income \
             percentage of 30.0%. These counties rank among the top 10 for asthma prevalence, \
             pointing to a link between economic disadvantage and respiratory health. Filter by \
             state and select 'Asthma Rate (%)' to explore these patterns."
        );
    }

    #[test]
    fn test_asthma_finding_fallbacks() {
        assert_eq!(asthma_finding(&[]), "No health data available.");
        let one = vec![health("Lucas", Some(11.0), 30.0), health("Wood", None, 20.0)];
        assert!(asthma_finding(&one).starts_with("Insufficient data"));
    }

    #[test]
    fn test_wildfire_finding() {
        let table = HazardTable::new(
            Hazard::Wildfire,
            vec![
                fire("Kern", 40.0, Some(99.0)),
                fire("Shasta", 72.5, Some(20.0)),
                fire("Butte", 88.0, Some(30.0)),
                fire("Lake", 50.0, None),
            ],
        );
        let text = wildfire_finding(&table);
        assert!(text.starts_with("Counties like Butte, California and Shasta, California"));
        // Mean over Butte and Shasta; Lake has no share and Kern is below 50
        assert!(text.contains("around 25.0%"));
        assert!(text.contains("up to 88.0"));
    }

    #[test]
    fn test_wildfire_finding_fallbacks() {
        let empty = HazardTable::empty(Hazard::Wildfire);
        assert_eq!(wildfire_finding(&empty), "No wildfire data available with risk >= 50.");

        let single = HazardTable::new(Hazard::Wildfire, vec![fire("Butte", 88.0, Some(30.0))]);
        assert!(wildfire_finding(&single).starts_with("Insufficient data"));
    }
}
