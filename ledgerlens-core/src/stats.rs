//! Small numeric helpers: rounding, percentage shares, and the
//! seven-number distribution summary used by the daily-trend section.

use serde::{Deserialize, Serialize};

/// Round to 2 decimal places (cents).
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Round to 1 decimal place (percentage display).
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Percentage share of `amount` within `total`, rounded to 1 decimal.
/// A zero (or negative) total yields 0 for every category instead of a
/// division by zero.
pub fn share(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        round1(amount / total * 100.0)
    } else {
        0.0
    }
}

/// Seven-number summary of one daily-amount series, every field rounded to
/// 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub max: f64,
    pub min: f64,
    pub variance: f64,
    pub std_dev: f64,
}

impl Distribution {
    /// Summarize a non-empty series. Mode ties resolve to the lowest tied
    /// value; variance is the sample variance (n-1 denominator), defined as
    /// 0 for a single-element series.
    pub fn from_series(series: &[f64]) -> Option<Distribution> {
        if series.is_empty() {
            return None;
        }

        let n = series.len() as f64;
        let mean = series.iter().sum::<f64>() / n;

        let mut sorted = series.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        // Count multiplicity on cent-resolution keys; scanning the sorted
        // series with a strict `>` keeps the lowest value on a tie.
        let mut mode = sorted[0];
        let mut best = 0usize;
        let mut i = 0;
        while i < sorted.len() {
            let key = (sorted[i] * 100.0).round() as i64;
            let mut j = i;
            while j < sorted.len() && (sorted[j] * 100.0).round() as i64 == key {
                j += 1;
            }
            if j - i > best {
                best = j - i;
                mode = sorted[i];
            }
            i = j;
        }

        let variance = if sorted.len() > 1 {
            series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };

        Some(Distribution {
            mean: round2(mean),
            median: round2(median),
            mode: round2(mode),
            max: round2(sorted[sorted.len() - 1]),
            min: round2(sorted[0]),
            variance: round2(variance),
            std_dev: round2(variance.sqrt()),
        })
    }

    /// Values in table order: 平均数 中位数 众数 最大值 最小值 方差 标准差.
    pub fn as_row(&self) -> [f64; 7] {
        [
            self.mean,
            self.median,
            self.mode,
            self.max,
            self.min,
            self.variance,
            self.std_dev,
        ]
    }
}
