//! Hold-out quality metrics

use serde::{Deserialize, Serialize};

/// Root-mean-square error and coefficient of determination on the test split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Self {
        Self {
            rmse: rmse(actual, predicted),
            r2: r2_score(actual, predicted),
        }
    }
}

/// `sqrt(mean((y - y_hat)^2))`. Empty input scores 0.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return 0.0;
    }
    (sum_squared_error(actual, predicted) / actual.len() as f64).sqrt()
}

/// `1 - SS_res / SS_tot`.
///
/// Constant targets make `SS_tot` zero: a perfect fit scores 1, anything else 0.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res = sum_squared_error(actual, predicted);
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

fn sum_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    actual
        .iter()
        .zip(predicted)
        .map(|(y, y_hat)| (y - y_hat).powi(2))
        .sum()
}
