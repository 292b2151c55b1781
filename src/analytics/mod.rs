// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Analytics over in-memory sales records.
//!
//! Every operation borrows the caller's records, computes a fresh result and
//! keeps nothing between calls.

pub mod error;
pub mod forecast;
pub mod growth;
pub mod rfm;
pub mod seasonality;
pub mod series;
pub mod summary;

pub use error::AnalyticsError;
pub use forecast::{ForecastResult, forecast_sales};
pub use growth::{GrowthReport, growth_rates};
pub use rfm::{RfmRow, RfmTable, customer_segmentation};
pub use seasonality::{SeasonalDecomposition, decompose, seasonality};
pub use series::{Frequency, SalesSeries};

use crate::models::{GroupField, SalesRecord, ValueField};

/// Read-only view over a record table exposing the four core analyses.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsEngine<'a> {
    records: &'a [SalesRecord],
}

impl<'a> AnalyticsEngine<'a> {
    pub fn new(records: &'a [SalesRecord]) -> Self {
        Self { records }
    }

    pub fn seasonality(
        &self,
        value: ValueField,
        period: usize,
    ) -> Result<SeasonalDecomposition, AnalyticsError> {
        seasonality(self.records, value, period)
    }

    pub fn growth_rates(
        &self,
        value: ValueField,
        frequency: Frequency,
    ) -> Result<GrowthReport, AnalyticsError> {
        growth_rates(self.records, value, frequency)
    }

    pub fn customer_segmentation(
        &self,
        customer: GroupField,
        value: ValueField,
    ) -> Result<RfmTable, AnalyticsError> {
        customer_segmentation(self.records, customer, value)
    }

    pub fn forecast_sales(
        &self,
        value: ValueField,
        periods: usize,
    ) -> Result<ForecastResult, AnalyticsError> {
        forecast_sales(self.records, value, periods)
    }
}
