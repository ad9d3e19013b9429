//! Normalization Utilities
//!
//! Value-level cleaning shared by the schema normalizer and the combined-risk
//! aggregator:
//! - Title-casing of county/state join keys
//! - Boolean coercion of string-encoded flags
//! - Min-max scaling of a risk column into 0-100

/// Upper bound of the min-max scale
pub const NORMALIZED_MAX: f64 = 100.0;

/// Title-case a name the way the upstream tables expect join keys to look.
///
/// Every alphabetic run starts upper-case and continues lower-case, so
/// `"st. LOUIS"` becomes `"St. Louis"` and `"o'brien"` becomes `"O'Brien"`.
/// Surrounding whitespace is trimmed. Applying it twice is the same as once.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_alpha = false;

    for ch in raw.trim().chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }

    out
}

/// Parse a string-encoded boolean flag.
///
/// Accepts `true`/`false` in any case (surrounding whitespace ignored).
/// Anything else is treated as missing.
pub fn parse_flag(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Keep only finite values; NaN and infinities count as missing
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Min-max scale values into [0, 100]
///
/// `100 * (v - min) / (max - min)`. When every value is identical (including
/// the single-value case) the range is zero and every output is 100.
/// Empty input yields empty output.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let Some((min, max)) = min_max(values) else {
        return Vec::new();
    };

    let range = max - min;
    if range == 0.0 {
        return vec![NORMALIZED_MAX; values.len()];
    }

    values
        .iter()
        .map(|v| NORMALIZED_MAX * (v - min) / range)
        .collect()
}

/// Minimum and maximum of a slice, `None` when empty
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let mut iter = values.iter().copied();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}
