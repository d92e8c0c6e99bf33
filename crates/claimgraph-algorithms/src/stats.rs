//! Summary statistics

/// Population summary of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation (divides by `count`, not `count - 1`)
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// Standard score of `value`, or `None` when the deviation is zero
    pub fn z_score(&self, value: f64) -> Option<f64> {
        if self.std_dev > 0.0 {
            Some((value - self.mean) / self.std_dev)
        } else {
            None
        }
    }
}

/// Mean, population standard deviation and range. Returns `None` for an empty sample.
pub fn population_summary(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    Some(Summary {
        count,
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
    })
}
