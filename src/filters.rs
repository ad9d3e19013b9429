//! Hazard and State filters
//!
//! Pure functions: inputs are borrowed, outputs are new tables. The state
//! filter returns a `Cow` so the "All" selection hands back the caller's
//! rows without copying them.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use crate::records::{CountyKeyed, HazardRecord, HazardTable};

/// Sentinel meaning "no state restriction"
pub const ALL_STATES: &str = "All";

/// State selector: every state, or one exact (title-cased) state name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateSelection {
    All,
    State(String),
}

impl StateSelection {
    /// `"All"` maps to [`StateSelection::All`]; anything else is a state name
    pub fn parse(raw: &str) -> Self {
        if raw == ALL_STATES {
            StateSelection::All
        } else {
            StateSelection::State(raw.to_string())
        }
    }

    /// Heading form: "All States" or the state name
    pub fn scope_label(&self) -> &str {
        match self {
            StateSelection::All => "All States",
            StateSelection::State(state) => state,
        }
    }

    /// Sentence form used in warnings: "the selected states" or the state name
    pub fn scope_phrase(&self) -> &str {
        match self {
            StateSelection::All => "the selected states",
            StateSelection::State(state) => state,
        }
    }
}

impl fmt::Display for StateSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateSelection::All => f.write_str(ALL_STATES),
            StateSelection::State(state) => f.write_str(state),
        }
    }
}

/// Restrict rows to the selected state
///
/// `All` returns the input slice itself (same rows, same order). Otherwise
/// State must match exactly; names were title-cased at load time.
pub fn filter_by_state<'a, R>(rows: &'a [R], selection: &StateSelection) -> Cow<'a, [R]>
where
    R: CountyKeyed + Clone,
{
    match selection {
        StateSelection::All => Cow::Borrowed(rows),
        StateSelection::State(state) => Cow::Owned(
            rows.iter()
                .filter(|row| row.state() == state.as_str())
                .cloned()
                .collect(),
        ),
    }
}

/// Rows whose risk is numeric and at or above `threshold` (inclusive)
pub fn filter_hazard(rows: &[HazardRecord], threshold: f64) -> Vec<HazardRecord> {
    rows.iter()
        .filter(|row| row.risk.is_finite() && row.risk >= threshold)
        .cloned()
        .collect()
}

impl HazardTable {
    /// State filter that keeps the table's hazard tag
    pub fn for_state(&self, selection: &StateSelection) -> HazardTable {
        HazardTable::new(self.hazard, filter_by_state(&self.records, selection).into_owned())
    }

    /// Threshold filter on this table's risk column
    pub fn above_threshold(&self, threshold: f64) -> HazardTable {
        HazardTable::new(self.hazard, filter_hazard(&self.records, threshold))
    }

    /// Highest-risk rows first, rows without a low-income share dropped
    pub fn top_by_risk(&self, n: usize) -> Vec<HazardRecord> {
        let mut rows: Vec<HazardRecord> = self
            .records
            .iter()
            .filter(|row| row.low_income_pct.is_some())
            .cloned()
            .collect();
        sort_desc_by(&mut rows, |row| row.risk);
        rows.truncate(n);
        rows
    }
}

/// Stable descending sort on a float key
pub fn sort_desc_by<T, K>(rows: &mut [T], key: K)
where
    K: Fn(&T) -> f64,
{
    rows.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
}

/// Rows whose county name contains `needle` (case-insensitive)
pub fn highlight_counties<'a, R: CountyKeyed>(rows: &'a [R], needle: &str) -> Vec<&'a R> {
    rows.iter().filter(|row| row.county_matches(needle)).collect()
}

/// "All" followed by the sorted distinct states present in `rows`
pub fn state_options<R: CountyKeyed>(rows: &[R]) -> Vec<String> {
    let mut states: Vec<String> = rows.iter().map(|row| row.state().to_string()).collect();
    states.sort();
    states.dedup();
    states.insert(0, ALL_STATES.to_string());
    states
}
