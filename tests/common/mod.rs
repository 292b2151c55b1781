// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use salescope::db;
use salescope::models::SalesRecord;

pub fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

pub fn sale(date: &str, product: &str, customer: &str, total: &str) -> SalesRecord {
    SalesRecord {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        product: product.into(),
        region: "Europe".into(),
        sales_rep: "Rep_001".into(),
        customer_id: customer.into(),
        quantity: 1,
        unit_price: total.parse::<Decimal>().unwrap(),
        total_sales: total.parse::<Decimal>().unwrap(),
        discount: None,
    }
}

/// One sale per day for `days` days, cycling over `customers` customers with
/// rising totals.
pub fn daily_sales(start: &str, days: u64, customers: usize) -> Vec<SalesRecord> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    (0..days)
        .map(|i| {
            let d = start + Days::new(i);
            let customer = format!("CUST_{}", 1000 + (i as usize % customers));
            let total = format!("{}.00", 100 + i * 3 + (i % 7) * 5);
            sale(&d.to_string(), "Laptop", &customer, &total)
        })
        .collect()
}

pub fn seeded_conn(records: &[SalesRecord]) -> Connection {
    let conn = base_conn();
    db::insert_records(&conn, records).unwrap();
    conn
}
