// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use super::series::SalesSeries;
use crate::models::{GroupField, SalesRecord};

#[derive(Debug, Clone, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveSummary {
    pub total_sales: Decimal,
    pub avg_sale: Decimal,
    pub median_sale: Decimal,
    pub max_sale: Decimal,
    pub min_sale: Decimal,
    pub total_transactions: usize,
    pub unique_customers: usize,
    pub unique_products: usize,
    pub date_range: Option<DateRange>,
}

pub fn executive_summary(records: &[SalesRecord]) -> ExecutiveSummary {
    let mut totals: Vec<Decimal> = records.iter().map(|r| r.total_sales).collect();
    totals.sort();
    let total: Decimal = totals.iter().copied().sum();
    let count = totals.len();

    let (avg, median) = if count == 0 {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (totals[mid - 1] + totals[mid]) / Decimal::TWO
        } else {
            totals[mid]
        };
        (total / Decimal::from(count), median)
    };

    let date_range = match (
        records.iter().map(|r| r.date).min(),
        records.iter().map(|r| r.date).max(),
    ) {
        (Some(start), Some(end)) => Some(DateRange {
            start,
            end,
            days: (end - start).num_days(),
        }),
        _ => None,
    };

    ExecutiveSummary {
        total_sales: total,
        avg_sale: avg,
        median_sale: median,
        max_sale: totals.last().copied().unwrap_or_default(),
        min_sale: totals.first().copied().unwrap_or_default(),
        total_transactions: count,
        unique_customers: distinct(records, GroupField::CustomerId),
        unique_products: distinct(records, GroupField::Product),
        date_range,
    }
}

fn distinct(records: &[SalesRecord], field: GroupField) -> usize {
    records
        .iter()
        .map(|r| field.extract(r))
        .collect::<HashSet<_>>()
        .len()
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionPerformance {
    pub key: String,
    pub total: Decimal,
    pub mean: Decimal,
    pub count: usize,
    pub unique_customers: usize,
}

/// Per-group totals sorted by total sales, highest first.
pub fn performance_by(records: &[SalesRecord], by: GroupField, top: usize) -> Vec<DimensionPerformance> {
    let mut groups: BTreeMap<&str, (Decimal, usize, HashSet<&str>)> = BTreeMap::new();
    for r in records {
        let e = groups
            .entry(by.extract(r))
            .or_insert_with(|| (Decimal::ZERO, 0, HashSet::new()));
        e.0 += r.total_sales;
        e.1 += 1;
        e.2.insert(&r.customer_id);
    }
    let mut out: Vec<DimensionPerformance> = groups
        .into_iter()
        .map(|(k, (total, count, customers))| DimensionPerformance {
            key: k.to_string(),
            total,
            mean: (total / Decimal::from(count)).round_dp(2),
            count,
            unique_customers: customers.len(),
        })
        .collect();
    out.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
    out.truncate(top);
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct MovingAverage {
    pub window: usize,
    pub values: Vec<f64>,
}

/// Trailing rolling means; early points average whatever is available.
pub fn moving_averages(series: &SalesSeries, windows: &[usize]) -> Vec<MovingAverage> {
    windows
        .iter()
        .filter(|&&w| w > 0)
        .map(|&window| {
            let mut sum = 0.0;
            let values = series
                .values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    sum += v;
                    if i >= window {
                        sum -= series.values[i - window];
                    }
                    sum / (i + 1).min(window) as f64
                })
                .collect();
            MovingAverage { window, values }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlierMethod {
    Iqr,
    ZScore,
}

impl FromStr for OutlierMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iqr" => Ok(OutlierMethod::Iqr),
            "zscore" | "z-score" | "z" => Ok(OutlierMethod::ZScore),
            other => Err(anyhow::anyhow!("Unknown outlier method '{}' (use iqr|zscore)", other)),
        }
    }
}

impl OutlierMethod {
    /// Fence multiplier used when the caller gives none.
    pub fn default_threshold(self) -> f64 {
        match self {
            OutlierMethod::Iqr => 1.5,
            OutlierMethod::ZScore => 3.0,
        }
    }
}

/// Indices of values that fall outside the method's fence.
pub fn detect_outliers(values: &[f64], method: OutlierMethod, threshold: f64) -> Vec<usize> {
    if values.len() < 2 {
        return Vec::new();
    }
    let keep = |pred: &dyn Fn(f64) -> bool| -> Vec<usize> {
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| pred(**v))
            .map(|(i, _)| i)
            .collect()
    };
    match method {
        OutlierMethod::Iqr => {
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            let q = |p: f64| {
                let h = (sorted.len() - 1) as f64 * p;
                let lo = h.floor() as usize;
                sorted[lo] + (h - lo as f64) * (sorted[h.ceil() as usize] - sorted[lo])
            };
            let (q1, q3) = (q(0.25), q(0.75));
            let iqr = q3 - q1;
            let (lower, upper) = (q1 - threshold * iqr, q3 + threshold * iqr);
            keep(&|v: f64| v < lower || v > upper)
        }
        OutlierMethod::ZScore => {
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let sd = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
            if sd == 0.0 {
                return Vec::new();
            }
            keep(&|v: f64| ((v - mean) / sd).abs() > threshold)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::series::tests::record;

    #[test]
    fn summary_over_small_set() {
        let recs = vec![
            record("2024-01-01", "A", 10.0),
            record("2024-01-05", "B", 30.0),
            record("2024-01-03", "A", 20.0),
            record("2024-01-02", "C", 40.0),
        ];
        let s = executive_summary(&recs);
        assert_eq!(s.total_sales, Decimal::from(100));
        assert_eq!(s.avg_sale, Decimal::from(25));
        assert_eq!(s.median_sale, Decimal::from(25));
        assert_eq!(s.max_sale, Decimal::from(40));
        assert_eq!(s.min_sale, Decimal::from(10));
        assert_eq!(s.unique_customers, 3);
        assert_eq!(s.unique_products, 1);
        assert_eq!(s.date_range.unwrap().days, 4);
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let s = executive_summary(&[]);
        assert_eq!(s.total_transactions, 0);
        assert_eq!(s.total_sales, Decimal::ZERO);
        assert!(s.date_range.is_none());
    }

    #[test]
    fn performance_sorted_and_truncated() {
        let mut recs = vec![
            record("2024-01-01", "A", 10.0),
            record("2024-01-01", "B", 50.0),
            record("2024-01-02", "C", 5.0),
        ];
        recs[1].region = "South".into();
        recs[2].region = "East".into();
        let p = performance_by(&recs, GroupField::Region, 2);
        assert_eq!(p.len(), 2);
        assert_eq!(p[0].key, "South");
        assert_eq!(p[1].key, "North");
        assert_eq!(p[1].unique_customers, 1);
    }

    #[test]
    fn moving_average_uses_partial_windows() {
        let s = SalesSeries {
            dates: Vec::new(),
            values: vec![2.0, 4.0, 6.0, 8.0],
        };
        let ma = moving_averages(&s, &[2, 0]);
        assert_eq!(ma.len(), 1);
        assert_eq!(ma[0].values, vec![2.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn outliers_by_both_methods() {
        let values = [10.0, 11.0, 9.0, 10.5, 9.5, 10.0, 95.0];
        assert_eq!(detect_outliers(&values, OutlierMethod::Iqr, 1.5), vec![6]);
        assert_eq!(detect_outliers(&values, OutlierMethod::ZScore, 2.0), vec![6]);
        assert!(detect_outliers(&[3.0; 5], OutlierMethod::ZScore, 1.0).is_empty());
        assert_eq!("z-score".parse::<OutlierMethod>().unwrap(), OutlierMethod::ZScore);
        assert!("mad".parse::<OutlierMethod>().is_err());
    }
}
