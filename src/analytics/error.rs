// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    #[error("{operation} needs at least {needed} {unit}, got {found}")]
    InsufficientData {
        operation: &'static str,
        unit: &'static str,
        needed: usize,
        found: usize,
    },

    #[error("series is not on a complete daily grid: {after} is followed by {next}")]
    IrregularSeries { after: NaiveDate, next: NaiveDate },

    #[error("{component} is unavailable: {reason}")]
    MissingDependency {
        component: &'static str,
        reason: String,
    },

    #[error("unknown field '{0}'")]
    UnknownField(String),
}

impl AnalyticsError {
    pub(crate) fn insufficient(
        operation: &'static str,
        unit: &'static str,
        needed: usize,
        found: usize,
    ) -> Self {
        AnalyticsError::InsufficientData {
            operation,
            unit,
            needed,
            found,
        }
    }
}
