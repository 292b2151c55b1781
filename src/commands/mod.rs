// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod analyze;
pub mod config;
pub mod doctor;
pub mod exporter;
pub mod importer;
pub mod reports;
pub mod sample;

use anyhow::Result;
use rusqlite::Connection;

use crate::db;
use crate::models::SalesRecord;

/// Stored records, or an error telling the user how to get some.
pub(crate) fn require_records(conn: &Connection) -> Result<Vec<SalesRecord>> {
    let records = db::load_records(conn)?;
    if records.is_empty() {
        anyhow::bail!("No sales records stored; run `salescope import sales` or `salescope sample` first");
    }
    Ok(records)
}
