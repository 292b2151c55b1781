// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use crate::commands::exporter::write_sales_csv;
use crate::db;
use crate::sample::{SampleConfig, generate};
use crate::utils::parse_date;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    let mut cfg = SampleConfig::default();
    if let Some(n) = m.get_one::<usize>("records") {
        cfg.records = *n;
    }
    if let Some(seed) = m.get_one::<u64>("seed") {
        cfg.seed = *seed;
    }
    if let Some(s) = m.get_one::<String>("start") {
        cfg.start = parse_date(s)?;
    }
    if let Some(s) = m.get_one::<String>("end") {
        cfg.end = parse_date(s)?;
    }

    let records = generate(&cfg)?;
    let tx = conn.transaction()?;
    let inserted = db::insert_records(&tx, &records)?;
    tx.commit()?;
    info!(inserted, seed = cfg.seed, "sample data stored");

    if let Some(out) = m.get_one::<String>("out") {
        write_sales_csv(&records, out)?;
        println!("Wrote sample CSV to {}", out);
    }
    println!(
        "Generated {} sample records ({} to {}, seed {})",
        inserted, cfg.start, cfg.end, cfg.seed
    );
    Ok(())
}
