// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::utils::{SETTINGS, get_setting, maybe_print_json, pretty_table, set_setting};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let keys: Vec<&str> = match sub.get_one::<String>("key") {
                Some(k) => vec![k.as_str()],
                None => SETTINGS.iter().map(|(k, _)| *k).collect(),
            };
            let mut data = Vec::with_capacity(keys.len());
            for key in keys {
                data.push(vec![key.to_string(), get_setting(conn, key)?]);
            }
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                println!("{}", pretty_table(&["Key", "Value"], data));
            }
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").context("--key is required")?;
            let value = sub
                .get_one::<String>("value")
                .context("--value is required")?;
            set_setting(conn, key, value)?;
            println!("Set {} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
