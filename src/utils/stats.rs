//! Summary statistics over numeric columns (counts, extrema, histograms)

use serde::Serialize;

use super::normalization::min_max;

/// Count, extrema and mean of the present values of a column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// One equal-width histogram bin, `[lower, upper)` except the last which is closed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Summarize the present values; `None` when nothing is present
pub fn summarize<I>(values: I) -> Option<SummaryStats>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let present: Vec<f64> = values.into_iter().flatten().collect();
    let (min, max) = min_max(&present)?;
    let mean = present.iter().sum::<f64>() / present.len() as f64;

    Some(SummaryStats {
        count: present.len(),
        min,
        max,
        mean,
    })
}

/// Mean of the present values
pub fn mean_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    summarize(values).map(|stats| stats.mean)
}

/// Equal-width histogram over `[min, max]` of the present values
///
/// A constant column puts every value in a single bin of zero width.
pub fn histogram<I>(values: I, bins: usize) -> Vec<HistogramBin>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let present: Vec<f64> = values.into_iter().flatten().collect();
    let Some((min, max)) = min_max(&present) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    if max == min {
        return vec![HistogramBin { lower: min, upper: max, count: present.len() }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &present {
        // Max lands in the last bin
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_summarize_skips_missing() {
        let stats = summarize(vec![Some(10.0), None, Some(30.0), Some(20.0)]).unwrap();
        assert_eq!(stats.count, 3);
        assert_relative_eq!(stats.min, 10.0);
        assert_relative_eq!(stats.max, 30.0);
        assert_relative_eq!(stats.mean, 20.0);
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(vec![None, None]).is_none());
        assert!(mean_present(Vec::new()).is_none());
    }

    #[test]
    fn test_histogram_counts() {
        let values = vec![Some(0.0), Some(1.0), Some(2.0), Some(9.0), Some(10.0), None];
        let bins = histogram(values, 5);

        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
        assert_eq!(bins[0].count, 2); // 0 and 1
        assert_eq!(bins[4].count, 2); // 9 and 10 (max is closed)
        assert_relative_eq!(bins[4].upper, 10.0);
    }

    #[test]
    fn test_histogram_constant() {
        let bins = histogram(vec![Some(4.0), Some(4.0)], 30);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
    }
}
