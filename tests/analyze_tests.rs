// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{base_conn, daily_sales, sale, seeded_conn};
use rusqlite::Connection;
use salescope::analytics::AnalyticsError;
use salescope::{cli, commands::analyze};

fn run_analyze(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut full = vec!["salescope", "analyze"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    if let Some(("analyze", analyze_m)) = matches.subcommand() {
        analyze::handle(conn, analyze_m)
    } else {
        panic!("no analyze subcommand");
    }
}

#[test]
fn analyses_run_over_a_complete_daily_series() {
    let conn = seeded_conn(&daily_sales("2024-01-01", 90, 12));
    run_analyze(&conn, &["seasonality", "--period", "7", "--json"]).unwrap();
    run_analyze(&conn, &["growth", "--freq", "weekly", "--jsonl"]).unwrap();
    run_analyze(&conn, &["rfm", "--limit", "5"]).unwrap();
    run_analyze(&conn, &["moving-average", "--windows", "3,7"]).unwrap();
    #[cfg(feature = "linalg")]
    run_analyze(&conn, &["forecast", "--periods", "14", "--json"]).unwrap();
}

#[test]
fn gaps_fail_seasonality_unless_filled() {
    let mut records = daily_sales("2024-01-01", 40, 6);
    records.retain(|r| r.date.to_string() != "2024-01-20");
    let conn = seeded_conn(&records);

    let err = run_analyze(&conn, &["seasonality", "--period", "7"]).unwrap_err();
    let irregular = err
        .chain()
        .any(|e| matches!(e.downcast_ref::<AnalyticsError>(), Some(AnalyticsError::IrregularSeries { .. })));
    assert!(irregular, "{:#}", err);

    run_analyze(&conn, &["seasonality", "--period", "7", "--fill-gaps"]).unwrap();
}

#[test]
fn unknown_value_field_is_rejected() {
    let conn = seeded_conn(&daily_sales("2024-01-01", 30, 6));
    let err = run_analyze(&conn, &["growth", "--value", "profit"]).unwrap_err();
    assert_eq!(
        err.downcast_ref::<AnalyticsError>(),
        Some(&AnalyticsError::UnknownField("profit".into()))
    );
}

#[test]
fn rfm_with_too_few_customers_fails() {
    let conn = seeded_conn(&[
        sale("2024-01-01", "Mouse", "A", "10"),
        sale("2024-01-02", "Mouse", "B", "20"),
        sale("2024-01-03", "Mouse", "C", "30"),
    ]);
    let err = run_analyze(&conn, &["rfm"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalyticsError>(),
        Some(AnalyticsError::InsufficientData { .. })
    ));
}

#[test]
fn all_continues_past_failing_analyses() {
    // Too short for seasonality and too few customers for RFM
    let conn = seeded_conn(&[
        sale("2024-01-01", "Mouse", "A", "10"),
        sale("2024-01-02", "Mouse", "B", "20"),
        sale("2024-02-03", "Mouse", "A", "30"),
    ]);
    run_analyze(&conn, &["all"]).unwrap();
    run_analyze(&conn, &["all", "--json"]).unwrap();
}

#[test]
fn outliers_accept_both_methods() {
    let mut records = daily_sales("2024-01-01", 30, 6);
    records[12].total_sales = "25000.00".parse().unwrap();
    let conn = seeded_conn(&records);
    run_analyze(&conn, &["outliers"]).unwrap();
    run_analyze(&conn, &["outliers", "--method", "zscore", "--threshold", "2.5", "--json"]).unwrap();

    let err = run_analyze(&conn, &["outliers", "--method", "mad"]).unwrap_err();
    assert!(err.to_string().contains("Unknown outlier method 'mad'"));
}

#[test]
fn all_fills_gaps_on_request() {
    let mut records = daily_sales("2024-01-01", 40, 6);
    records.retain(|r| r.date.to_string() != "2024-01-20");
    let conn = seeded_conn(&records);
    run_analyze(&conn, &["all", "--fill-gaps"]).unwrap();
    run_analyze(&conn, &["all", "--fill-gaps", "--jsonl"]).unwrap();
}

#[test]
fn empty_store_is_an_error() {
    let conn = base_conn();
    let err = run_analyze(&conn, &["growth"]).unwrap_err();
    assert!(err.to_string().contains("No sales records stored"));
}
