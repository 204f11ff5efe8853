use serde::{Deserialize, Serialize};

// ── Percentile helper ─────────────────────────────────────────────────────────

/// Compute the `p`-th percentile of a **sorted** slice using linear
/// interpolation between the closest ranks.
///
/// Returns `None` for an empty slice.
pub fn percentile(sorted_data: &[f64], p: f64) -> Option<f64> {
    match sorted_data.len() {
        0 => None,
        1 => Some(sorted_data[0]),
        len => {
            let rank = (p / 100.0) * (len as f64 - 1.0);
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            Some(sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo]))
        }
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of unsorted values; even-length input averages the two middle
/// values.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile(&sorted, 50.0)
}

// ── Summary ───────────────────────────────────────────────────────────────────

/// Sum / mean / median / count over a group of amounts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub count: usize,
}

impl Summary {
    /// Summarise `values`, or `None` when there is nothing to summarise.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        Some(Self {
            sum: values.iter().sum(),
            mean: mean(values)?,
            median: median(values)?,
            count: values.len(),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_empty() {
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_percentile_single() {
        assert_eq!(percentile(&[42.0], 90.0), Some(42.0));
    }

    #[test]
    fn test_percentile_interpolates() {
        let data = [10.0, 20.0, 30.0, 40.0];
        // rank = 0.5 * 3 = 1.5 → halfway between 20 and 30.
        assert_eq!(percentile(&data, 50.0), Some(25.0));
        assert_eq!(percentile(&data, 0.0), Some(10.0));
        assert_eq!(percentile(&data, 100.0), Some(40.0));
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[0.0, 0.0, 100.0]), Some(100.0 / 3.0));
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_summary_from_values() {
        let s = Summary::from_values(&[100.0, 200.0, 600.0]).unwrap();
        assert_eq!(s.sum, 900.0);
        assert_eq!(s.mean, 300.0);
        assert_eq!(s.median, 200.0);
        assert_eq!(s.count, 3);
    }

    #[test]
    fn test_summary_empty_is_none() {
        assert!(Summary::from_values(&[]).is_none());
    }
}
