// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::models::{SalesRecord, ValueField};

/// Date-indexed totals, strictly ascending with no duplicate dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl SalesSeries {
    /// Sum `value` per calendar date. Dates without records are absent.
    pub fn daily(records: &[SalesRecord], value: ValueField) -> Self {
        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for r in records {
            *by_date.entry(r.date).or_insert(0.0) += value.extract(r);
        }
        let (dates, values) = by_date.into_iter().unzip();
        SalesSeries { dates, values }
    }

    /// Sum `value` into contiguous `freq` buckets labelled by their first day.
    /// Buckets between the first and last record that saw no sales hold zero.
    pub fn resample(records: &[SalesRecord], value: ValueField, freq: Frequency) -> Self {
        let mut by_bucket: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for r in records {
            *by_bucket.entry(freq.bucket_start(r.date)).or_insert(0.0) += value.extract(r);
        }
        let (Some(first), Some(last)) = (
            by_bucket.keys().next().copied(),
            by_bucket.keys().next_back().copied(),
        ) else {
            return SalesSeries::default();
        };

        let mut out = SalesSeries::default();
        let mut cur = Some(first);
        while let Some(start) = cur.filter(|d| *d <= last) {
            out.dates.push(start);
            out.values.push(by_bucket.get(&start).copied().unwrap_or(0.0));
            cur = freq.next_bucket(start);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// First pair of consecutive dates that are not one day apart.
    pub fn first_gap(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.dates
            .windows(2)
            .find(|w| w[0].succ_opt() != Some(w[1]))
            .map(|w| (w[0], w[1]))
    }

    /// Copy of the series with every missing day between the first and last
    /// date inserted as zero.
    pub fn zero_filled(&self) -> Self {
        let (Some(first), Some(last)) = (self.dates.first(), self.dates.last()) else {
            return self.clone();
        };
        let known: BTreeMap<NaiveDate, f64> = self
            .dates
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .collect();
        let mut out = SalesSeries::default();
        for d in first.iter_days().take_while(|d| d <= last) {
            out.dates.push(d);
            out.values.push(known.get(&d).copied().unwrap_or(0.0));
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    /// ISO weeks, Monday first.
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn bucket_start(self, d: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => d,
            Frequency::Weekly => d - Days::new(u64::from(d.weekday().num_days_from_monday())),
            Frequency::Monthly => d.with_day(1).unwrap_or(d),
            Frequency::Quarterly => {
                let month = (d.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(d.year(), month, 1).unwrap_or(d)
            }
            Frequency::Yearly => NaiveDate::from_ymd_opt(d.year(), 1, 1).unwrap_or(d),
        }
    }

    pub fn next_bucket(self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Frequency::Daily => start.checked_add_days(Days::new(1)),
            Frequency::Weekly => start.checked_add_days(Days::new(7)),
            Frequency::Monthly => start.checked_add_months(Months::new(1)),
            Frequency::Quarterly => start.checked_add_months(Months::new(3)),
            Frequency::Yearly => start.checked_add_months(Months::new(12)),
        }
    }

    /// Human label for a bucket starting on `start`.
    pub fn label(self, start: NaiveDate) -> String {
        match self {
            Frequency::Daily | Frequency::Weekly => start.format("%Y-%m-%d").to_string(),
            Frequency::Monthly => start.format("%Y-%m").to_string(),
            Frequency::Quarterly => format!("{}-Q{}", start.year(), start.month0() / 3 + 1),
            Frequency::Yearly => start.year().to_string(),
        }
    }
}

impl FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "day" | "daily" => Ok(Frequency::Daily),
            "w" | "week" | "weekly" => Ok(Frequency::Weekly),
            "m" | "month" | "monthly" => Ok(Frequency::Monthly),
            "q" | "quarter" | "quarterly" => Ok(Frequency::Quarterly),
            "y" | "year" | "yearly" => Ok(Frequency::Yearly),
            other => Err(anyhow::anyhow!(
                "Invalid frequency '{}', expected daily|weekly|monthly|quarterly|yearly",
                other
            )),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        };
        f.write_str(s)
    }
}
