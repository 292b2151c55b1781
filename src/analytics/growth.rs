// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::Serialize;

use super::AnalyticsError;
use super::series::{Frequency, SalesSeries};
use crate::models::{SalesRecord, ValueField};

#[derive(Debug, Clone, Serialize)]
pub struct GrowthReport {
    pub frequency: Frequency,
    pub period_values: SalesSeries,
    /// Percent change from the previous period; `None` at index 0 and
    /// wherever the previous period is zero.
    pub growth_rates: Vec<Option<f64>>,
    /// Percent change relative to the first period; all `None` when it is zero.
    pub cumulative_growth: Vec<Option<f64>>,
}

pub fn growth_rates(
    records: &[SalesRecord],
    value: ValueField,
    frequency: Frequency,
) -> Result<GrowthReport, AnalyticsError> {
    let period_values = SalesSeries::resample(records, value, frequency);
    if period_values.is_empty() {
        return Err(AnalyticsError::insufficient("growth rates", "records", 1, 0));
    }
    let v = &period_values.values;

    let growth = std::iter::once(None)
        .chain(v.windows(2).map(|w| percent_change(w[0], w[1])))
        .collect();
    let cumulative = v.iter().map(|&x| percent_change(v[0], x)).collect();

    Ok(GrowthReport {
        frequency,
        growth_rates: growth,
        cumulative_growth: cumulative,
        period_values,
    })
}

fn percent_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    let pct = (to - from) / from * 100.0;
    pct.is_finite().then_some(pct)
}
