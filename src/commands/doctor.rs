// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::SalesSeries;
use crate::analytics::summary::{OutlierMethod, detect_outliers};
use crate::db;
use crate::models::{SalesRecord, ValueField};
use crate::utils::pretty_table;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

fn issue(kind: &'static str, detail: String) -> Issue {
    Issue { kind, detail }
}

pub fn check(records: &[SalesRecord], today: NaiveDate) -> Vec<Issue> {
    let mut issues = Vec::new();
    if records.is_empty() {
        issues.push(issue("empty_dataset", "no sales records stored".into()));
        return issues;
    }

    // 1) Sign of totals
    let negative = records.iter().filter(|r| r.total_sales < Decimal::ZERO).count();
    if negative > 0 {
        issues.push(issue("negative_sales", format!("{} rows", negative)));
    }
    let zero = records.iter().filter(|r| r.total_sales.is_zero()).count();
    if zero > 0 {
        issues.push(issue("zero_sales", format!("{} rows", zero)));
    }

    // 2) Exact duplicates
    let mut seen: HashMap<&SalesRecord, usize> = HashMap::new();
    for r in records {
        *seen.entry(r).or_default() += 1;
    }
    let dupes: usize = seen.values().filter(|&&n| n > 1).map(|n| n - 1).sum();
    if dupes > 0 {
        issues.push(issue("duplicate_rows", format!("{} rows", dupes)));
    }

    // 3) Dates after today
    let future: Vec<&SalesRecord> = records.iter().filter(|r| r.date > today).collect();
    if let Some(latest) = future.iter().map(|r| r.date).max() {
        issues.push(issue(
            "future_dates",
            format!("{} rows, latest {}", future.len(), latest),
        ));
    }

    // 4) Discount fraction range
    let bad_discount = records
        .iter()
        .filter(|r| r.discount.is_some_and(|d| d < Decimal::ZERO || d > Decimal::ONE))
        .count();
    if bad_discount > 0 {
        issues.push(issue("discount_out_of_range", format!("{} rows", bad_discount)));
    }

    // 5) Totals outside the 1.5 IQR fence
    let totals: Vec<f64> = records
        .iter()
        .map(|r| ValueField::TotalSales.extract(r))
        .collect();
    let method = OutlierMethod::Iqr;
    let outliers = detect_outliers(&totals, method, method.default_threshold());
    if let Some(&worst) = outliers.iter().max_by(|&&a, &&b| {
        totals[a]
            .abs()
            .partial_cmp(&totals[b].abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    }) {
        issues.push(issue(
            "outlier_sales",
            format!(
                "{} rows, largest {} on {}; see `analyze outliers`",
                outliers.len(),
                records[worst].total_sales,
                records[worst].date
            ),
        ));
    }

    // 6) Missing days block seasonal decomposition
    let series = SalesSeries::daily(records, ValueField::TotalSales);
    if let Some((after, next)) = series.first_gap() {
        let missing = series.zero_filled().len() - series.len();
        issues.push(issue(
            "date_gaps",
            format!(
                "{} missing days, first after {} (next {}); use --fill-gaps",
                missing, after, next
            ),
        ));
    }
    issues
}

pub fn handle(conn: &Connection) -> Result<()> {
    let records = db::load_records(conn)?;
    let today = chrono::Local::now().date_naive();
    let issues = check(&records, today);

    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
