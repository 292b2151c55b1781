// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::models::SalesRecord;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Salescope", "salescope"));

pub const DB_ENV: &str = "SALESCOPE_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("salescope.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    debug!(path = %path.display(), "opening database");
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS sales(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        product TEXT NOT NULL,
        region TEXT NOT NULL,
        sales_rep TEXT NOT NULL,
        customer_id TEXT NOT NULL,
        quantity INTEGER NOT NULL DEFAULT 0,
        unit_price TEXT NOT NULL DEFAULT '0',
        total_sales TEXT NOT NULL,
        discount TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_sales_date ON sales(date);
    CREATE INDEX IF NOT EXISTS idx_sales_customer ON sales(customer_id);
    "#,
    )?;
    Ok(())
}

pub fn insert_records(conn: &Connection, records: &[SalesRecord]) -> Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO sales(date, product, region, sales_rep, customer_id, quantity, unit_price, total_sales, discount)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
    )?;
    for r in records {
        stmt.execute(params![
            r.date.to_string(),
            r.product,
            r.region,
            r.sales_rep,
            r.customer_id,
            r.quantity,
            r.unit_price.to_string(),
            r.total_sales.to_string(),
            r.discount.map(|d| d.to_string()),
        ])?;
    }
    Ok(records.len())
}

pub fn clear_records(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM sales", [])?)
}

/// All stored records in date order.
pub fn load_records(conn: &Connection) -> Result<Vec<SalesRecord>> {
    let mut stmt = conn.prepare(
        "SELECT date, product, region, sales_rep, customer_id, quantity, unit_price, total_sales, discount
         FROM sales ORDER BY date, id",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let date: String = r.get(0)?;
        let unit_price: String = r.get(6)?;
        let total: String = r.get(7)?;
        let discount: Option<String> = r.get(8)?;
        out.push(SalesRecord {
            date: chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("Corrupt date '{}' in store", date))?,
            product: r.get(1)?,
            region: r.get(2)?,
            sales_rep: r.get(3)?,
            customer_id: r.get(4)?,
            quantity: r.get(5)?,
            unit_price: stored_decimal(&unit_price)?,
            total_sales: stored_decimal(&total)?,
            discount: discount.as_deref().map(stored_decimal).transpose()?,
        });
    }
    Ok(out)
}

fn stored_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Corrupt amount '{}' in store", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn records_survive_a_store_round_trip() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let rec = SalesRecord {
            date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            product: "Tablet".into(),
            region: "Europe".into(),
            sales_rep: "Rep_007".into(),
            customer_id: "CUST_1234".into(),
            quantity: 3,
            unit_price: "199.99".parse().unwrap(),
            total_sales: "539.97".parse().unwrap(),
            discount: Some("0.1".parse().unwrap()),
        };
        insert_records(&conn, std::slice::from_ref(&rec)).unwrap();
        assert_eq!(load_records(&conn).unwrap(), vec![rec]);
        assert_eq!(clear_records(&conn).unwrap(), 1);
        assert!(load_records(&conn).unwrap().is_empty());
    }
}
