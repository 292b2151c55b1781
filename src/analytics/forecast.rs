// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Days;
use serde::Serialize;
use tracing::debug;

use super::AnalyticsError;
use super::series::SalesSeries;
use crate::models::{SalesRecord, ValueField};

pub const DEFAULT_HORIZON: usize = 30;

#[derive(Debug, Clone, Serialize)]
pub struct ForecastResult {
    pub historical: SalesSeries,
    pub forecast: SalesSeries,
    /// Coefficient of determination on the historical points. Negative values
    /// are legitimate for fits worse than the mean.
    pub model_score: f64,
    pub slope: f64,
    pub intercept: f64,
}

/// Fit `value = intercept + slope * i` over the daily totals, where `i` is the
/// position of each observed date, and extend it `periods` days past the last
/// date.
pub fn forecast_sales(
    records: &[SalesRecord],
    value: ValueField,
    periods: usize,
) -> Result<ForecastResult, AnalyticsError> {
    let historical = SalesSeries::daily(records, value);
    let n = historical.len();
    if n < 2 {
        return Err(AnalyticsError::insufficient("forecast", "distinct dates", 2, n));
    }
    let Some(last) = historical.last_date() else {
        return Err(AnalyticsError::insufficient("forecast", "distinct dates", 2, 0));
    };

    let (intercept, slope) = fit_line(&historical.values)?;
    let model_score = r_squared(&historical.values, intercept, slope);

    let mut forecast = SalesSeries::default();
    for step in 1..=periods {
        let Some(date) = last.checked_add_days(Days::new(step as u64)) else {
            break;
        };
        forecast.dates.push(date);
        forecast.values.push(intercept + slope * (n - 1 + step) as f64);
    }

    debug!(points = n, slope, intercept, model_score, "linear trend fitted");
    Ok(ForecastResult {
        historical,
        forecast,
        model_score,
        slope,
        intercept,
    })
}

/// Ordinary least squares on the design matrix `[1, i]`.
#[cfg(feature = "linalg")]
fn fit_line(y: &[f64]) -> Result<(f64, f64), AnalyticsError> {
    use nalgebra::{DMatrix, DVector};

    let x = DMatrix::from_fn(y.len(), 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
    let b = DVector::from_column_slice(y);
    let beta = x
        .svd(true, true)
        .solve(&b, 1e-12)
        .map_err(|e| AnalyticsError::MissingDependency {
            component: "linear regression",
            reason: e.to_string(),
        })?;
    Ok((beta[0], beta[1]))
}

#[cfg(not(feature = "linalg"))]
fn fit_line(_y: &[f64]) -> Result<(f64, f64), AnalyticsError> {
    Err(AnalyticsError::MissingDependency {
        component: "linear regression",
        reason: "built without the `linalg` feature".to_string(),
    })
}

fn r_squared(y: &[f64], intercept: f64, slope: f64) -> f64 {
    let n = y.len() as f64;
    let mean = y.iter().sum::<f64>() / n;
    let ss_tot: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    let ss_res: f64 = y
        .iter()
        .enumerate()
        .map(|(i, v)| (v - (intercept + slope * i as f64)).powi(2))
        .sum();

    // Constant series: the score is 1 for an exact fit, 0 otherwise. The
    // tolerance only absorbs solver rounding in the fitted values.
    if ss_tot == 0.0 {
        let tolerance = y.iter().map(|v| v * v).sum::<f64>().max(1.0) * 1e-15;
        return if ss_res <= tolerance { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}
