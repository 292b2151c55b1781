// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use crate::{db, ingest};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("sales", sub)) => import_sales(conn, sub),
        _ => Ok(()),
    }
}

fn import_sales(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub
        .get_one::<String>("path")
        .context("--path is required")?
        .trim();
    let replace = sub.get_flag("replace");
    let records = ingest::read_sales_csv(path)?;

    // Parse everything before touching the store so a bad row writes nothing
    let tx = conn.transaction()?;
    if replace {
        let removed = db::clear_records(&tx)?;
        info!(removed, "cleared stored sales");
    }
    let inserted = db::insert_records(&tx, &records)?;
    tx.commit()?;

    info!(inserted, path, "import complete");
    println!("Imported {} sales records from {}", inserted, path);
    Ok(())
}
