//! DataFrame column helpers with header validation
//!
//! Provides safe, explicit patterns for pulling typed columns out of raw
//! Polars DataFrames, so a renamed or missing upstream header surfaces as a
//! clear error instead of a silently empty table.

use anyhow::{anyhow, Context, Result};
use polars::prelude::*;

use super::normalization::{finite, parse_flag};

/// Find a column whose (whitespace-trimmed) header matches any of `names`
///
/// Names are tried in order, so the first alias wins when several exist.
pub fn find_column<'a>(df: &'a DataFrame, names: &[&str]) -> Option<&'a Column> {
    names.iter().find_map(|&wanted| {
        df.get_columns()
            .iter()
            .find(|column| column.name().trim() == wanted)
    })
}

/// Like [`find_column`] but fails with the available headers listed
///
/// # Example
/// ```rust,ignore
/// let county = require_column(&df, &["CF", "County"], "wind hazard")?;
/// ```
pub fn require_column<'a>(
    df: &'a DataFrame,
    names: &[&str],
    context: &str,
) -> Result<&'a Column> {
    find_column(df, names).ok_or_else(|| {
        let available: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        anyhow!(
            "{}: Missing expected column {:?}. Available columns: {:?}",
            context, names, available
        )
    })
}

/// Materialize a column as floats
///
/// Text cells are trimmed and parsed one by one. Non-parseable cells and
/// non-finite values become `None`.
pub fn column_as_f64(column: &Column, context: &str) -> Result<Vec<Option<f64>>> {
    if column.dtype() == &DataType::String {
        let values = column
            .str()
            .with_context(|| format!("{}: Column '{}' is not string type", context, column.name()))?
            .into_iter()
            .map(|opt| finite(opt.and_then(|s| s.trim().parse::<f64>().ok())))
            .collect();
        return Ok(values);
    }

    let casted = column
        .cast(&DataType::Float64)
        .with_context(|| format!("{}: Failed to cast '{}' to Float64", context, column.name()))?;

    let values = casted
        .f64()
        .with_context(|| format!("{}: Column '{}' is not numeric", context, column.name()))?
        .into_iter()
        .map(finite)
        .collect();

    Ok(values)
}

/// Materialize a column as owned strings
pub fn column_as_str(column: &Column, context: &str) -> Result<Vec<Option<String>>> {
    let casted = column
        .cast(&DataType::String)
        .with_context(|| format!("{}: Failed to cast '{}' to String", context, column.name()))?;

    let values = casted
        .str()
        .with_context(|| format!("{}: Column '{}' is not string type", context, column.name()))?
        .into_iter()
        .map(|opt| opt.map(|s| s.to_string()))
        .collect();

    Ok(values)
}

/// Materialize a string-encoded ("true"/"false") or boolean column as flags
pub fn column_as_flag(column: &Column, context: &str) -> Result<Vec<Option<bool>>> {
    Ok(column_as_str(column, context)?
        .into_iter()
        .map(|opt| opt.as_deref().and_then(parse_flag))
        .collect())
}
