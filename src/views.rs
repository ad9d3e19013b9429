//! Per-interaction view computation
//!
//! One [`Selection`] in, every table the dashboard shows out. Nothing here
//! mutates the loaded data; each call rebuilds its outputs from scratch, the
//! same as a UI rerun triggered by a widget change.

use serde::Serialize;

use crate::combined::{combine_hazards, CombinedOutcome};
use crate::data::DashboardData;
use crate::filters::{filter_by_state, highlight_counties, sort_desc_by, state_options, StateSelection};
use crate::records::{
    CensusRecord, CommunityMetric, CountyKeyed, Hazard, HazardRecord, HazardTable, HealthMetric,
    HealthRecord,
};
use crate::utils::{histogram, HistogramBin};

/// Rows shown in per-hazard, combined and health rankings
pub const DEFAULT_TOP_N: usize = 10;

/// Bins in the low-income distribution
pub const LOW_INCOME_BINS: usize = 30;

/// Everything the user can pick in the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub state: StateSelection,
    pub hazards: Vec<Hazard>,
    /// Inclusive lower bound on hazard risk
    pub threshold: f64,
    pub community_metric: CommunityMetric,
    pub health_metric: HealthMetric,
    /// Rows in the community ranking
    pub top_n: usize,
    /// County-name substring to highlight
    pub highlight: Option<String>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            state: StateSelection::All,
            hazards: vec![Hazard::Wind],
            threshold: 5.0,
            community_metric: CommunityMetric::EnergyBurden,
            health_metric: HealthMetric::Asthma,
            top_n: DEFAULT_TOP_N,
            highlight: None,
        }
    }
}

/// One selected hazard: map rows, top counties, or a warning
#[derive(Debug, Clone, PartialEq)]
pub struct HazardView {
    pub hazard: Hazard,
    /// State- and threshold-filtered rows (map layer)
    pub filtered: HazardTable,
    pub top: Vec<HazardRecord>,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombinedView {
    pub outcome: CombinedOutcome,
    pub warning: Option<String>,
}

/// One row of the community ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityRow {
    pub county: String,
    pub state: String,
    pub value: f64,
    pub total_population: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommunityView {
    pub metric: CommunityMetric,
    pub rows: Vec<CommunityRow>,
    pub warning: Option<String>,
}

/// One row of the health ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthRow {
    pub county: String,
    pub state: String,
    pub value: f64,
    pub low_income_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthView {
    pub metric: HealthMetric,
    pub low_income_distribution: Vec<HistogramBin>,
    pub top: Vec<HealthRow>,
    pub warning: Option<String>,
}

/// County/State pairs matching the highlight substring
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Highlights {
    pub combined: Vec<(String, String)>,
    pub hazards: Vec<(Hazard, String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub hazard_title: String,
    pub hazards: Vec<HazardView>,
    pub combined: CombinedView,
    pub community: CommunityView,
    pub health: HealthView,
    pub highlights: Highlights,
    /// "All" plus every state present in the health table
    pub state_options: Vec<String>,
}

impl DashboardView {
    /// Compute every output for one selection
    pub fn compute(data: &DashboardData, selection: &Selection) -> Self {
        let hazards = selection
            .hazards
            .iter()
            .map(|&hazard| hazard_view(data.hazard(hazard), selection))
            .collect::<Vec<_>>();
        let combined = combined_view(data, selection);
        let community = community_view(&data.census, selection);
        let health = health_view(&data.health, selection);

        let highlights = match selection.highlight.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => Highlights {
                combined: pairs(&highlight_counties(combined.outcome.rows(), needle)),
                hazards: hazards
                    .iter()
                    .flat_map(|view| {
                        highlight_counties(&view.filtered.records, needle)
                            .into_iter()
                            .map(move |r| (view.hazard, r.county.clone(), r.state.clone()))
                    })
                    .collect(),
            },
            _ => Highlights::default(),
        };

        Self {
            hazard_title: format!("Hazard Exposure Across Counties ({})", selection.state.scope_label()),
            hazards,
            combined,
            community,
            health,
            highlights,
            state_options: state_options(data.health.as_slice()),
        }
    }
}

fn pairs<R: CountyKeyed>(rows: &[&R]) -> Vec<(String, String)> {
    rows.iter()
        .map(|r| (r.county().to_string(), r.state().to_string()))
        .collect()
}

/// State filter, threshold filter, then the top counties by risk
pub fn hazard_view(table: &HazardTable, selection: &Selection) -> HazardView {
    let filtered = table.for_state(&selection.state).above_threshold(selection.threshold);
    let top = filtered.top_by_risk(DEFAULT_TOP_N);

    let warning = if filtered.is_empty() {
        let message = format!(
            "No counties meet the risk threshold for {} in {}.",
            table.hazard.display_name(),
            selection.state.scope_phrase()
        );
        tracing::warn!("{}", message);
        Some(message)
    } else if top.is_empty() {
        Some(format!("No valid data to plot for {} after cleaning.", table.hazard.display_name()))
    } else {
        None
    };

    HazardView { hazard: table.hazard, filtered, top, warning }
}

/// Composite risk over all three hazards for the current state and threshold
pub fn combined_view(data: &DashboardData, selection: &Selection) -> CombinedView {
    let filtered: Vec<HazardTable> = Hazard::ALL
        .iter()
        .map(|&hazard| {
            data.hazard(hazard)
                .for_state(&selection.state)
                .above_threshold(selection.threshold)
        })
        .collect();
    let tables: Vec<&HazardTable> = filtered.iter().collect();

    let outcome = combine_hazards(&tables, DEFAULT_TOP_N);
    let warning = match &outcome {
        CombinedOutcome::NoData => {
            Some("No data available to compute combined risk across all hazards.".to_string())
        }
        ranked if ranked.is_empty() => {
            Some("No valid data to plot for combined risk after cleaning.".to_string())
        }
        _ => None,
    };

    CombinedView { outcome, warning }
}

/// Top communities by the chosen indicator
///
/// Rows without the indicator are skipped. For the disadvantaged flag only
/// flagged communities are listed, in their original order.
pub fn community_view(census: &[CensusRecord], selection: &Selection) -> CommunityView {
    let metric = selection.community_metric;
    let scoped = filter_by_state(census, &selection.state);

    let mut rows: Vec<CommunityRow> = scoped
        .iter()
        .filter(|r| metric != CommunityMetric::Disadvantaged || r.disadvantaged == Some(true))
        .filter_map(|r| {
            Some(CommunityRow {
                county: r.county.clone(),
                state: r.state.clone(),
                value: r.metric(metric)?,
                total_population: r.total_population,
            })
        })
        .collect();

    sort_desc_by(&mut rows, |row| row.value);
    rows.truncate(selection.top_n);

    let warning = rows.is_empty().then(|| {
        format!(
            "No data available for {} in {}.",
            metric.display_name(),
            selection.state.scope_phrase()
        )
    });

    CommunityView { metric, rows, warning }
}

/// Low-income distribution plus the top counties by the chosen health metric
pub fn health_view(health: &[HealthRecord], selection: &Selection) -> HealthView {
    let metric = selection.health_metric;
    let scoped = filter_by_state(health, &selection.state);

    if scoped.is_empty() {
        return HealthView {
            metric,
            low_income_distribution: Vec::new(),
            top: Vec::new(),
            warning: Some(format!("No health data available for {}.", selection.state.scope_phrase())),
        };
    }

    let low_income_distribution = histogram(scoped.iter().map(|r| Some(r.low_income_pct)), LOW_INCOME_BINS);

    let mut top: Vec<HealthRow> = scoped
        .iter()
        .filter_map(|r| {
            Some(HealthRow {
                county: r.county.clone(),
                state: r.state.clone(),
                value: r.metric(metric)?,
                low_income_pct: r.low_income_pct,
            })
        })
        .collect();
    sort_desc_by(&mut top, |row| row.value);
    top.truncate(DEFAULT_TOP_N);

    let warning = top.is_empty().then(|| {
        format!(
            "No data available for {} in {}.",
            metric.display_name(),
            selection.state.scope_phrase()
        )
    });

    HealthView { metric, low_income_distribution, top, warning }
}
