// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::analytics::customer_segmentation;
use crate::commands::require_records;
use crate::db;
use crate::models::{GroupField, SalesRecord, ValueField};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

impl Format {
    fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            other => bail!("Unknown format: {} (use csv|json)", other),
        }
    }
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("sales", sub)) => export_sales(conn, sub),
        Some(("rfm", sub)) => export_rfm(conn, sub),
        _ => Ok(()),
    }
}

fn target(sub: &clap::ArgMatches) -> Result<(Format, &str)> {
    let fmt = Format::parse(sub.get_one::<String>("format").map_or("csv", |s| s.as_str()))?;
    let out = sub.get_one::<String>("out").context("--out is required")?;
    Ok((fmt, out.as_str()))
}

fn export_sales(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (fmt, out) = target(sub)?;
    let records = db::load_records(conn)?;
    match fmt {
        Format::Csv => write_sales_csv(&records, out)?,
        Format::Json => write_json(&records, out)?,
    }
    info!(rows = records.len(), out, "exported sales");
    println!("Exported {} sales records to {}", records.len(), out);
    Ok(())
}

fn export_rfm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (fmt, out) = target(sub)?;
    let records = require_records(conn)?;
    let table = customer_segmentation(&records, GroupField::CustomerId, ValueField::TotalSales)?;
    match fmt {
        Format::Csv => write_csv(&table.rows, out)?,
        Format::Json => write_json(&table, out)?,
    }
    info!(rows = table.len(), out, "exported RFM table");
    println!("Exported RFM scores for {} customers to {}", table.len(), out);
    Ok(())
}

/// Header row matches the import aliases, so the file re-imports as is.
pub fn write_sales_csv(records: &[SalesRecord], out: impl AsRef<Path>) -> Result<()> {
    write_csv(records, out)
}

fn write_csv<T: Serialize>(rows: &[T], out: impl AsRef<Path>) -> Result<()> {
    let out = out.as_ref();
    let mut wtr = csv::Writer::from_path(out)
        .with_context(|| format!("Create {}", out.display()))?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(v: &T, out: impl AsRef<Path>) -> Result<()> {
    let out = out.as_ref();
    std::fs::write(out, serde_json::to_string_pretty(v)?)
        .with_context(|| format!("Write {}", out.display()))
}
