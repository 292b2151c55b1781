// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::Serialize;
use tracing::debug;

use super::AnalyticsError;
use super::series::SalesSeries;
use crate::models::{SalesRecord, ValueField};

pub const DEFAULT_PERIOD: usize = 12;

/// Additive decomposition `original = trend + seasonal + residual`.
/// `trend` and `residual` are `None` within half a period of either end.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonalDecomposition {
    pub period: usize,
    pub original: SalesSeries,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
}

/// Decompose the daily totals of `value`.
pub fn seasonality(
    records: &[SalesRecord],
    value: ValueField,
    period: usize,
) -> Result<SeasonalDecomposition, AnalyticsError> {
    decompose(SalesSeries::daily(records, value), period)
}

/// Decompose an already aggregated series. It must sit on a gap-free daily grid.
pub fn decompose(series: SalesSeries, period: usize) -> Result<SeasonalDecomposition, AnalyticsError> {
    if period < 2 {
        return Err(AnalyticsError::insufficient("seasonality", "period length", 2, period));
    }
    let n = series.len();
    let needed = period.saturating_mul(2);
    if n < needed {
        return Err(AnalyticsError::insufficient("seasonality", "samples", needed, n));
    }
    if let Some((after, next)) = series.first_gap() {
        return Err(AnalyticsError::IrregularSeries { after, next });
    }

    let trend = centered_moving_average(&series.values, period);

    let mut phase_sum = vec![0.0; period];
    let mut phase_count = vec![0usize; period];
    for (i, t) in trend.iter().enumerate() {
        if let Some(t) = t {
            phase_sum[i % period] += series.values[i] - t;
            phase_count[i % period] += 1;
        }
    }
    let mut phase_mean: Vec<f64> = phase_sum
        .iter()
        .zip(&phase_count)
        .map(|(s, &c)| if c == 0 { 0.0 } else { s / c as f64 })
        .collect();
    let centre = phase_mean.iter().sum::<f64>() / period as f64;
    for m in &mut phase_mean {
        *m -= centre;
    }

    let seasonal: Vec<f64> = (0..n).map(|i| phase_mean[i % period]).collect();
    let residual = trend
        .iter()
        .zip(series.values.iter().zip(&seasonal))
        .map(|(t, (y, s))| t.map(|t| y - t - s))
        .collect();

    debug!(samples = n, period, "seasonal decomposition complete");
    Ok(SeasonalDecomposition {
        period,
        original: series,
        trend,
        seasonal,
        residual,
    })
}

/// Two-sided moving average of width `period`. Even widths use the 2xM
/// filter with half weights on both ends so the window stays centred.
fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let weights: Vec<f64> = if period % 2 == 0 {
        let mut w = vec![1.0; period + 1];
        w[0] = 0.5;
        w[period] = 0.5;
        w
    } else {
        vec![1.0; period]
    };
    let half = weights.len() / 2;
    let n = values.len();

    (0..n)
        .map(|i| {
            if i < half || i + half >= n {
                return None;
            }
            let window = &values[i - half..=i + half];
            let sum: f64 = window.iter().zip(&weights).map(|(v, w)| v * w).sum();
            Some(sum / period as f64)
        })
        .collect()
}
