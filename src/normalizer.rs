//! Schema Normalizer
//!
//! Turns a raw upstream DataFrame into the canonical shape described by a
//! [`SourceSchema`], then into typed records:
//!
//! 1. Headers are trimmed and mapped onto canonical names
//! 2. County/State are title-cased so joins line up across sources
//! 3. Numeric columns are coerced; unparseable cells become null
//! 4. Flag columns ("true"/"false" text) become booleans
//! 5. Rows missing any required column are dropped
//!
//! The canonical frame only contains schema columns, in schema order.
//! Normalizing an already-normalized frame returns an identical frame.

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::records::{
    CensusRecord, CommunityMetric, Hazard, HazardRecord, HazardTable, HealthMetric, HealthRecord,
    LOW_INCOME_COLUMN,
};
use crate::schema::{ColumnKind, SourceSchema, COUNTY, LAT, LON, STATE};
use crate::utils::{column_as_f64, column_as_flag, column_as_str, find_column, require_column, title_case};

/// Normalize a raw frame into the canonical frame for `schema`
///
/// # Errors
/// Returns error if a required column is absent from the raw headers, or a
/// column cannot be cast. Optional columns that are absent become all-null.
pub fn normalize_frame(raw: &DataFrame, schema: &SourceSchema) -> Result<DataFrame> {
    let context = schema.kind.to_string();
    let height = raw.height();
    let mut keep = vec![true; height];
    let mut columns: Vec<Column> = Vec::with_capacity(schema.columns.len());

    for column_spec in &schema.columns {
        let names = column_spec.lookup_names();
        let source = if column_spec.required {
            Some(require_column(raw, &names, &context)?)
        } else {
            find_column(raw, &names)
        };

        let name: PlSmallStr = column_spec.canonical.into();
        let column = match (column_spec.kind, source) {
            (ColumnKind::Key, Some(source)) => {
                let values: Vec<Option<String>> = column_as_str(source, &context)?
                    .into_iter()
                    .map(|opt| opt.map(|s| title_case(&s)).filter(|s| !s.is_empty()))
                    .collect();
                if column_spec.required {
                    drop_missing(&mut keep, &values);
                }
                Column::new(name, values)
            }
            (ColumnKind::Numeric, Some(source)) => {
                let values = column_as_f64(source, &context)?;
                if column_spec.required {
                    drop_missing(&mut keep, &values);
                }
                Column::new(name, values)
            }
            (ColumnKind::Flag, Some(source)) => {
                let values = column_as_flag(source, &context)?;
                if column_spec.required {
                    drop_missing(&mut keep, &values);
                }
                Column::new(name, values)
            }
            (kind, None) => {
                tracing::warn!("{}: optional column '{}' not found, filling with nulls", context, column_spec.canonical);
                match kind {
                    ColumnKind::Key => Column::new(name, vec![None::<String>; height]),
                    ColumnKind::Numeric => Column::new(name, vec![None::<f64>; height]),
                    ColumnKind::Flag => Column::new(name, vec![None::<bool>; height]),
                }
            }
        };
        columns.push(column);
    }

    let frame = DataFrame::new(columns)
        .with_context(|| format!("{}: Failed to assemble canonical frame", context))?;

    let mask: BooleanChunked = keep.into_iter().collect();
    let cleaned = frame
        .filter(&mask)
        .with_context(|| format!("{}: Failed to drop incomplete rows", context))?;

    let dropped = height - cleaned.height();
    if dropped > 0 {
        tracing::debug!("{}: dropped {} of {} rows missing required values", context, dropped, height);
    }

    Ok(cleaned)
}

fn drop_missing<T>(keep: &mut [bool], values: &[Option<T>]) {
    for (flag, value) in keep.iter_mut().zip(values) {
        if value.is_none() {
            *flag = false;
        }
    }
}

// ============================================================================
// Canonical frame → typed records
// ============================================================================

fn keys(frame: &DataFrame, context: &str) -> Result<(Vec<Option<String>>, Vec<Option<String>>)> {
    let county = column_as_str(require_column(frame, &[COUNTY], context)?, context)?;
    let state = column_as_str(require_column(frame, &[STATE], context)?, context)?;
    Ok((county, state))
}

fn numeric(frame: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<f64>>> {
    column_as_f64(require_column(frame, &[name], context)?, context)
}

/// Normalize a raw hazard frame and build its table
pub fn hazard_table(raw: &DataFrame, hazard: Hazard) -> Result<HazardTable> {
    let frame = normalize_frame(raw, &SourceSchema::hazard(hazard))?;
    let context = format!("{} hazard", hazard);
    let (county, state) = keys(&frame, &context)?;
    let lat = numeric(&frame, LAT, &context)?;
    let lon = numeric(&frame, LON, &context)?;
    let risk = numeric(&frame, hazard.risk_column(), &context)?;
    let low_income = numeric(&frame, LOW_INCOME_COLUMN, &context)?;

    let records = (0..frame.height())
        .filter_map(|i| {
            Some(HazardRecord {
                county: county[i].clone()?,
                state: state[i].clone()?,
                lat: lat[i]?,
                lon: lon[i]?,
                risk: risk[i]?,
                low_income_pct: low_income[i],
            })
        })
        .collect();

    Ok(HazardTable::new(hazard, records))
}

/// Normalize a raw census frame into community records
pub fn census_records(raw: &DataFrame) -> Result<Vec<CensusRecord>> {
    let frame = normalize_frame(raw, &SourceSchema::census())?;
    let context = "census";
    let (county, state) = keys(&frame, context)?;
    let disadvantaged = column_as_flag(
        require_column(&frame, &[CommunityMetric::Disadvantaged.column()], context)?,
        context,
    )?;
    let energy_burden = numeric(&frame, CommunityMetric::EnergyBurden.column(), context)?;
    let pm25 = numeric(&frame, CommunityMetric::Pm25.column(), context)?;
    let adult_asthma = numeric(&frame, CommunityMetric::AdultAsthma.column(), context)?;
    let fire_risk_share = numeric(&frame, CommunityMetric::FireRiskShare.column(), context)?;
    let total_population = numeric(&frame, CommunityMetric::TotalPopulation.column(), context)?;

    Ok((0..frame.height())
        .filter_map(|i| {
            Some(CensusRecord {
                county: county[i].clone()?,
                state: state[i].clone()?,
                disadvantaged: disadvantaged[i],
                energy_burden: energy_burden[i],
                pm25: pm25[i],
                adult_asthma: adult_asthma[i],
                fire_risk_share: fire_risk_share[i],
                total_population: total_population[i],
            })
        })
        .collect())
}

/// Normalize a raw health frame into health records
pub fn health_records(raw: &DataFrame) -> Result<Vec<HealthRecord>> {
    let frame = normalize_frame(raw, &SourceSchema::health())?;
    let context = "health";
    let (county, state) = keys(&frame, context)?;
    let low_income = numeric(&frame, LOW_INCOME_COLUMN, context)?;
    let asthma = numeric(&frame, HealthMetric::Asthma.column(), context)?;
    let diabetes = numeric(&frame, HealthMetric::Diabetes.column(), context)?;
    let heart = numeric(&frame, HealthMetric::HeartDisease.column(), context)?;
    let life = numeric(&frame, HealthMetric::LifeExpectancy.column(), context)?;

    Ok((0..frame.height())
        .filter_map(|i| {
            Some(HealthRecord {
                county: county[i].clone()?,
                state: state[i].clone()?,
                low_income_pct: low_income[i]?,
                asthma_rate: asthma[i],
                diabetes_rate: diabetes[i],
                heart_disease_rate: heart[i],
                life_expectancy: life[i],
            })
        })
        .collect())
}
