// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{base_conn, daily_sales, sale, seeded_conn};
use salescope::{cli, commands::exporter, ingest};
use serde_json::json;
use tempfile::tempdir;

fn run_export(conn: &rusqlite::Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut full = vec!["salescope", "export"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_sales_writes_pretty_json() {
    let conn = seeded_conn(&[sale("2025-01-02", "Mouse", "CUST_1001", "12.34")]);
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(&conn, &["sales", "--format", "json", "--out", &out_str]).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "date": "2025-01-02",
                "product": "Mouse",
                "region": "Europe",
                "sales_rep": "Rep_001",
                "customer_id": "CUST_1001",
                "quantity": 1,
                "unit_price": "12.34",
                "total_sales": "12.34",
                "discount": null
            }
        ])
    );
}

#[test]
fn exported_sales_csv_reimports_unchanged() {
    let records = daily_sales("2024-01-01", 20, 4);
    let conn = seeded_conn(&records);
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("sales.csv");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(&conn, &["sales", "--format", "csv", "--out", &out_str]).unwrap();
    assert_eq!(ingest::read_sales_csv(&out_path).unwrap(), records);
}

#[test]
fn export_rfm_scores_every_customer() {
    let conn = seeded_conn(&daily_sales("2024-01-01", 60, 8));
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("rfm.json");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(&conn, &["rfm", "--format", "json", "--out", &out_str]).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    let rows = parsed["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 8);
    for row in rows {
        assert_eq!(row["rfm_score"].as_str().unwrap().len(), 3);
    }
}

#[test]
fn export_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    let err = run_export(&conn, &["sales", "--format", "xml", "--out", &out_str]).unwrap_err();
    assert!(err.to_string().contains("Unknown format"));
    assert!(!out_path.exists());
}
