//! CSV export of ranked tables (the dashboard's "download table" action)

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::records::{
    CombinedRiskRecord, CommunityMetric, Hazard, HazardRecord, HealthMetric, LOW_INCOME_COLUMN,
};
use crate::views::{CommunityRow, HealthRow};

/// Render a DataFrame as CSV text with a header row
pub fn frame_to_csv(frame: &mut DataFrame) -> Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(frame)
        .with_context(|| "Failed to write CSV")?;
    String::from_utf8(buf).with_context(|| "CSV output is not UTF-8")
}

fn text_column(name: &str, values: Vec<String>) -> Column {
    Column::new(name.into(), values)
}

fn float_column(name: &str, values: Vec<Option<f64>>) -> Column {
    Column::new(name.into(), values)
}

/// Top hazard rows: County, State, Lat, Lon, risk column, low-income share
pub fn hazard_frame(hazard: Hazard, rows: &[HazardRecord]) -> Result<DataFrame> {
    DataFrame::new(vec![
        text_column("County", rows.iter().map(|r| r.county.clone()).collect()),
        text_column("State", rows.iter().map(|r| r.state.clone()).collect()),
        float_column("Lat", rows.iter().map(|r| Some(r.lat)).collect()),
        float_column("Lon", rows.iter().map(|r| Some(r.lon)).collect()),
        float_column(hazard.risk_column(), rows.iter().map(|r| Some(r.risk)).collect()),
        float_column(LOW_INCOME_COLUMN, rows.iter().map(|r| r.low_income_pct).collect()),
    ])
    .with_context(|| format!("Failed to build {} export frame", hazard))
}

/// Combined ranking: keys, one normalized column per hazard, composite, income
pub fn combined_frame(rows: &[CombinedRiskRecord]) -> Result<DataFrame> {
    let mut columns = vec![
        text_column("County", rows.iter().map(|r| r.county.clone()).collect()),
        text_column("State", rows.iter().map(|r| r.state.clone()).collect()),
    ];
    for hazard in Hazard::ALL {
        let name = format!("Normalized_{}", hazard.risk_column());
        columns.push(float_column(&name, rows.iter().map(|r| r.normalized_for(hazard)).collect()));
    }
    columns.push(float_column("Combined_Risk", rows.iter().map(|r| Some(r.combined_risk)).collect()));
    columns.push(float_column(LOW_INCOME_COLUMN, rows.iter().map(|r| r.low_income_pct).collect()));

    DataFrame::new(columns).with_context(|| "Failed to build combined risk export frame")
}

pub fn community_frame(metric: CommunityMetric, rows: &[CommunityRow]) -> Result<DataFrame> {
    DataFrame::new(vec![
        text_column("County", rows.iter().map(|r| r.county.clone()).collect()),
        text_column("State", rows.iter().map(|r| r.state.clone()).collect()),
        float_column(metric.column(), rows.iter().map(|r| Some(r.value)).collect()),
        float_column(
            CommunityMetric::TotalPopulation.column(),
            rows.iter().map(|r| r.total_population).collect(),
        ),
    ])
    .with_context(|| "Failed to build community export frame")
}

pub fn health_frame(metric: HealthMetric, rows: &[HealthRow]) -> Result<DataFrame> {
    DataFrame::new(vec![
        text_column("County", rows.iter().map(|r| r.county.clone()).collect()),
        text_column("State", rows.iter().map(|r| r.state.clone()).collect()),
        float_column(metric.column(), rows.iter().map(|r| Some(r.value)).collect()),
        float_column(LOW_INCOME_COLUMN, rows.iter().map(|r| Some(r.low_income_pct)).collect()),
    ])
    .with_context(|| "Failed to build health export frame")
}

pub fn combined_csv(rows: &[CombinedRiskRecord]) -> Result<String> {
    frame_to_csv(&mut combined_frame(rows)?)
}

pub fn hazard_csv(hazard: Hazard, rows: &[HazardRecord]) -> Result<String> {
    frame_to_csv(&mut hazard_frame(hazard, rows)?)
}

pub fn community_csv(metric: CommunityMetric, rows: &[CommunityRow]) -> Result<String> {
    frame_to_csv(&mut community_frame(metric, rows)?)
}

pub fn health_csv(metric: HealthMetric, rows: &[HealthRow]) -> Result<String> {
    frame_to_csv(&mut health_frame(metric, rows)?)
}
