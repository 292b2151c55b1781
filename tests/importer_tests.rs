// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use salescope::{cli, commands::importer, db};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file.flush().unwrap();
    file
}

fn run_import(conn: &mut Connection, path: &str, replace: bool) -> anyhow::Result<()> {
    let mut args = vec!["salescope", "import", "sales", "--path", path];
    if replace {
        args.push("--replace");
    }
    let matches = cli::build_cli().get_matches_from(args);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(conn, import_m)
    } else {
        panic!("no import subcommand");
    }
}

fn count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM sales", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn importer_trims_cli_path_argument() {
    let mut conn = base_conn();
    let file = csv_file("date,product,total_sales\n2024-02-03,Mouse,25.00\n");
    let padded = format!("  {}  ", file.path().to_str().unwrap());
    run_import(&mut conn, &padded, false).unwrap();
    assert_eq!(count(&conn), 1);
}

#[test]
fn importer_maps_alias_headers_and_cleans_values() {
    let mut conn = base_conn();
    let file = csv_file(
        "Order Date;Item;Sales Rep;Client;Territory;Revenue\n\
         03/15/2024;Laptop;Rep_004;CUST_2001;Europe;\"$1,299.50\"\n\
         2024-03-16T09:30:00;Mouse;;CUST_2002;Asia;€19\n",
    );
    run_import(&mut conn, file.path().to_str().unwrap(), false).unwrap();

    let records = db::load_records(&conn).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].date.to_string(), "2024-03-15");
    assert_eq!(records[0].product, "Laptop");
    assert_eq!(records[0].sales_rep, "Rep_004");
    assert_eq!(records[0].region, "Europe");
    assert_eq!(records[0].total_sales, "1299.50".parse::<Decimal>().unwrap());
    assert_eq!(records[1].date.to_string(), "2024-03-16");
    assert_eq!(records[1].sales_rep, "Unknown");
    assert_eq!(records[1].total_sales, Decimal::from(19));
}

#[test]
fn importer_rolls_back_on_invalid_amount() {
    let mut conn = base_conn();
    let file = csv_file(
        "date,product,total_sales\n2024-01-01,Mouse,10\n2024-01-02,Mouse,abc\n",
    );
    let err = run_import(&mut conn, file.path().to_str().unwrap(), false).unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("Invalid amount 'abc'"), "{msg}");
    assert_eq!(count(&conn), 0);
}

#[test]
fn importer_rejects_invalid_date() {
    let mut conn = base_conn();
    let file = csv_file("date,product,total_sales\n2024-02-30,Mouse,10\n");
    let err = run_import(&mut conn, file.path().to_str().unwrap(), false).unwrap_err();
    assert!(format!("{:#}", err).contains("2024-02-30"));
    assert_eq!(count(&conn), 0);
}

#[test]
fn importer_reports_missing_columns() {
    let mut conn = base_conn();
    let file = csv_file("when,what\n2024-01-01,Mouse\n");
    let err = run_import(&mut conn, file.path().to_str().unwrap(), false).unwrap_err();
    assert!(err.to_string().contains("Missing required columns"));
}

#[test]
fn replace_clears_previous_records() {
    let mut conn = base_conn();
    let first = csv_file("date,product,total_sales\n2024-01-01,A,1\n2024-01-02,B,2\n");
    let second = csv_file("date|product|total_sales\n2024-02-01|C|3\n");
    run_import(&mut conn, first.path().to_str().unwrap(), false).unwrap();
    run_import(&mut conn, second.path().to_str().unwrap(), false).unwrap();
    assert_eq!(count(&conn), 3);

    run_import(&mut conn, second.path().to_str().unwrap(), true).unwrap();
    assert_eq!(count(&conn), 1);
    assert_eq!(db::load_records(&conn).unwrap()[0].product, "C");
}
