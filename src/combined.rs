//! Combined-Risk Aggregator
//!
//! Builds one composite score per county out of several hazard tables:
//!
//! 1. Min-max normalize each non-empty table's risk column into 0-100
//!    (a constant column normalizes to 100)
//! 2. Outer-merge the tables on County + State; a county keeps an empty slot
//!    for every hazard it is absent from
//! 3. Combined risk = mean of the slots that are present
//! 4. Drop counties without a combined score or a low-income share
//! 5. Stable sort, highest combined risk first, truncate to top N
//!
//! Low-income share is not part of the join key. Each county takes the first
//! value it sees in hazard order; later sources that disagree are counted
//! as conflicts and logged.

use rustc_hash::FxHashMap;

use crate::filters::sort_desc_by;
use crate::records::{CombinedRiskRecord, Hazard, HazardTable};
use crate::utils::{mean_present, min_max_normalize};

/// Low-income shares closer than this are considered the same value
const LOW_INCOME_TOLERANCE: f64 = 1e-6;

/// Ranked composite-risk table
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRanking {
    pub rows: Vec<CombinedRiskRecord>,
    /// Hazards that contributed at least one row
    pub hazards: Vec<Hazard>,
    /// Counties whose low-income share disagreed between hazard sources
    pub low_income_conflicts: usize,
}

/// Aggregator result: a ranking, or a signal that nothing could be scored
#[derive(Debug, Clone, PartialEq)]
pub enum CombinedOutcome {
    Ranked(CombinedRanking),
    /// No hazard table contributed any rows
    NoData,
}

impl CombinedOutcome {
    pub fn rows(&self) -> &[CombinedRiskRecord] {
        match self {
            CombinedOutcome::Ranked(ranking) => &ranking.rows,
            CombinedOutcome::NoData => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

struct MergeRow {
    county: String,
    state: String,
    low_income_pct: Option<f64>,
    normalized: [Option<f64>; 3],
}

/// Combine already filtered hazard tables into a ranked composite
///
/// Tables are merged in the order given; pass them in [`Hazard::ALL`] order
/// for the canonical low-income precedence. Ties in combined risk keep the
/// merge order (first appearance).
pub fn combine_hazards(tables: &[&HazardTable], top_n: usize) -> CombinedOutcome {
    let mut index: FxHashMap<(String, String), usize> = FxHashMap::default();
    let mut merged: Vec<MergeRow> = Vec::new();
    let mut contributing = Vec::new();
    let mut conflicts = 0usize;

    for table in tables.iter().filter(|t| !t.is_empty()) {
        let slot = table.hazard.index();
        let risks: Vec<f64> = table.records.iter().map(|r| r.risk).collect();
        let normalized = min_max_normalize(&risks);
        contributing.push(table.hazard);

        for (record, norm) in table.records.iter().zip(normalized) {
            let key = (record.county.clone(), record.state.clone());
            let row_idx = *index.entry(key).or_insert_with(|| {
                merged.push(MergeRow {
                    county: record.county.clone(),
                    state: record.state.clone(),
                    low_income_pct: None,
                    normalized: [None; 3],
                });
                merged.len() - 1
            });
            let row = &mut merged[row_idx];

            // Duplicate county within one hazard table: keep the higher score
            row.normalized[slot] = Some(row.normalized[slot].map_or(norm, |prev| prev.max(norm)));

            match (row.low_income_pct, record.low_income_pct) {
                (None, incoming) => row.low_income_pct = incoming,
                (Some(current), Some(incoming)) if (current - incoming).abs() > LOW_INCOME_TOLERANCE => {
                    conflicts += 1;
                    tracing::debug!(
                        "Low-income share for {}, {} differs across sources ({} vs {}), keeping {}",
                        row.county, row.state, current, incoming, current
                    );
                }
                _ => {}
            }
        }
    }

    if contributing.is_empty() {
        tracing::warn!("No data available to compute combined risk across all hazards");
        return CombinedOutcome::NoData;
    }

    let mut rows: Vec<CombinedRiskRecord> = merged
        .into_iter()
        .filter_map(|row| {
            let combined_risk = mean_present(row.normalized)?;
            let low_income_pct = row.low_income_pct?;
            Some(CombinedRiskRecord {
                county: row.county,
                state: row.state,
                low_income_pct: Some(low_income_pct),
                normalized: row.normalized,
                combined_risk,
            })
        })
        .collect();

    sort_desc_by(&mut rows, |row| row.combined_risk);
    rows.truncate(top_n);

    CombinedOutcome::Ranked(CombinedRanking {
        rows,
        hazards: contributing,
        low_income_conflicts: conflicts,
    })
}
