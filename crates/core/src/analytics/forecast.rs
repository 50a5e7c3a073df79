//! Ordinary least-squares trend projection.
//!
//! The series is treated as points `(x, y)` with `x = 0..n-1`. The first
//! projected value sits at `x = n`, the day after the last observation.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::round_to;
use super::series::DailySeries;

/// Fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Least-squares fit over `x = 0..values.len()`.
    ///
    /// Returns `None` for fewer than two points, where the slope is undefined.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n < 2 {
            return None;
        }

        let mean_x = (n - 1) as f64 / 2.0;
        let mean_y = values.iter().sum::<f64>() / n as f64;

        let (numerator, denominator) =
            values
                .iter()
                .enumerate()
                .fold((0.0, 0.0), |(num, den), (i, &y)| {
                    let dx = i as f64 - mean_x;
                    (dx.mul_add(y - mean_y, num), dx.mul_add(dx, den))
                });

        let slope = numerator / denominator;
        Some(Self {
            slope,
            intercept: slope.mul_add(-mean_x, mean_y),
        })
    }

    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope.mul_add(x, self.intercept)
    }
}

/// Project `horizon` values past the end of `counts`.
///
/// Values are clamped at zero and rounded to 2 decimals. An empty series
/// projects zeros; a single observation projects flat at that value.
///
/// ```
/// use foodbridge_core::analytics::linear_forecast;
///
/// assert_eq!(linear_forecast(&[0, 1, 2, 3, 4, 5, 6], 1), vec![7.0]);
/// assert_eq!(linear_forecast(&[5, 5, 5, 5], 3), vec![5.0, 5.0, 5.0]);
/// assert_eq!(linear_forecast(&[], 2), vec![0.0, 0.0]);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn linear_forecast(counts: &[usize], horizon: usize) -> Vec<f64> {
    let values: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
    let n = values.len();

    let fit = LinearFit::fit(&values);

    let project = |x: f64| -> f64 {
        match (values.as_slice(), fit) {
            ([], _) => 0.0,
            ([only], _) => *only,
            (_, Some(fit)) => fit.predict(x),
            (_, None) => 0.0,
        }
    };

    (0..horizon)
        .map(|k| round_to(project((n + k) as f64).max(0.0), 2))
        .collect()
}

/// Projected created/claimed counts for the days after `today`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Forecast {
    pub labels: Vec<String>,
    pub created: Vec<f64>,
    pub claimed: Vec<f64>,
}

/// Forecast both halves of a daily series `horizon` days past `today`.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn forecast_series(series: &DailySeries, today: NaiveDate, horizon: usize) -> Forecast {
    Forecast {
        labels: (1..=horizon)
            .map(|k| (today + Duration::days(k as i64)).to_string())
            .collect(),
        created: linear_forecast(&series.created, horizon),
        claimed: linear_forecast(&series.claimed, horizon),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_line_extends_by_one() {
        assert_eq!(linear_forecast(&[0, 1, 2, 3, 4, 5, 6], 1), vec![7.0]);
        assert_eq!(
            linear_forecast(&[0, 1, 2, 3, 4, 5, 6], 3),
            vec![7.0, 8.0, 9.0]
        );
    }

    #[test]
    fn test_flat_series_stays_flat() {
        for horizon in 1..=10 {
            let projected = linear_forecast(&[5, 5, 5, 5], horizon);
            assert_eq!(projected.len(), horizon);
            assert!(projected.iter().all(|&v| (v - 5.0).abs() < f64::EPSILON));
        }
    }

    #[test]
    fn test_falling_line_clamps_at_zero() {
        assert_eq!(linear_forecast(&[6, 4, 2], 3), vec![0.0, 0.0, 0.0]);
        assert_eq!(linear_forecast(&[6, 5, 4], 2), vec![3.0, 2.0]);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(linear_forecast(&[], 3), vec![0.0, 0.0, 0.0]);
        assert_eq!(linear_forecast(&[4], 2), vec![4.0, 4.0]);
        assert!(linear_forecast(&[1, 2], 0).is_empty());
    }

    #[test]
    fn test_projection_rounds_to_two_places() {
        // [0, 0, 1] fits y = x/2 - 1/6
        let projected = linear_forecast(&[0, 0, 1], 1);
        assert_eq!(projected, vec![1.33]);
    }

    #[test]
    fn test_fit_recovers_line() {
        let fit = LinearFit::fit(&[1.0, 3.0, 5.0, 7.0]).expect("fit");
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!(LinearFit::fit(&[1.0]).is_none());
    }

    #[test]
    fn test_forecast_labels_follow_today() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 30).expect("date");
        let series = DailySeries {
            labels: vec!["2025-12-29".into(), "2025-12-30".into()],
            created: vec![1, 2],
            claimed: vec![0, 0],
        };
        let forecast = forecast_series(&series, today, 3);
        assert_eq!(forecast.labels, ["2025-12-31", "2026-01-01", "2026-01-02"]);
        assert_eq!(forecast.created, vec![3.0, 4.0, 5.0]);
        assert_eq!(forecast.claimed, vec![0.0, 0.0, 0.0]);
    }
}
