// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use tracing::info;

use crate::analytics::summary::{executive_summary, performance_by};
use crate::commands::require_records;
use crate::models::{GroupField, SalesRecord};
use crate::utils::{currency_symbol, fmt_money, get_setting, maybe_print_json, pretty_table};

const HTML_TOP: usize = 5;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("performance", sub)) => performance(conn, sub)?,
        Some(("html", sub)) => html(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let records = require_records(conn)?;
    let s = executive_summary(&records);
    if maybe_print_json(json_flag, jsonl_flag, &s)? {
        return Ok(());
    }
    let sym = currency_symbol(conn)?;
    let range = s
        .date_range
        .as_ref()
        .map(|r| format!("{} to {} ({} days)", r.start, r.end, r.days))
        .unwrap_or_default();
    let rows = vec![
        vec!["Total sales".into(), fmt_money(&s.total_sales, &sym)],
        vec!["Average sale".into(), fmt_money(&s.avg_sale, &sym)],
        vec!["Median sale".into(), fmt_money(&s.median_sale, &sym)],
        vec!["Largest sale".into(), fmt_money(&s.max_sale, &sym)],
        vec!["Smallest sale".into(), fmt_money(&s.min_sale, &sym)],
        vec!["Transactions".into(), s.total_transactions.to_string()],
        vec!["Unique customers".into(), s.unique_customers.to_string()],
        vec!["Unique products".into(), s.unique_products.to_string()],
        vec!["Date range".into(), range],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}

fn performance(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let by: GroupField = sub
        .get_one::<String>("by")
        .map_or("product", |s| s.as_str())
        .parse()?;
    let top = *sub.get_one::<usize>("top").unwrap_or(&10);
    let records = require_records(conn)?;
    let perf = performance_by(&records, by, top);
    if maybe_print_json(json_flag, jsonl_flag, &perf)? {
        return Ok(());
    }
    let sym = currency_symbol(conn)?;
    let rows = perf
        .into_iter()
        .map(|p| {
            vec![
                p.key,
                fmt_money(&p.total, &sym),
                fmt_money(&p.mean, &sym),
                p.count.to_string(),
                p.unique_customers.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&[by.name(), "Total", "Average", "Count", "Customers"], rows)
    );
    Ok(())
}

fn html(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let out = sub.get_one::<String>("out").context("--out is required")?;
    let records = require_records(conn)?;
    let page = render_html(
        &records,
        &HtmlMeta {
            title: get_setting(conn, "report_title")?,
            author: get_setting(conn, "report_author")?,
            currency: currency_symbol(conn)?,
            generated: chrono::Local::now().naive_local(),
        },
    );
    std::fs::write(out, page).with_context(|| format!("Write {}", out))?;
    info!(out = out.as_str(), "wrote HTML report");
    println!("Report written to {}", out);
    Ok(())
}

pub struct HtmlMeta {
    pub title: String,
    pub author: String,
    pub currency: String,
    pub generated: NaiveDateTime,
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Self-contained HTML page: executive summary plus top products, regions
/// and reps by total sales.
pub fn render_html(records: &[SalesRecord], meta: &HtmlMeta) -> String {
    let s = executive_summary(records);
    let sym = meta.currency.as_str();
    let range = s
        .date_range
        .as_ref()
        .map(|r| format!("{} to {}", r.start, r.end))
        .unwrap_or_default();

    let mut page = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: Arial, sans-serif; margin: 40px; }}
h1 {{ color: #333; }}
h2 {{ color: #666; }}
.summary {{ background-color: #f5f5f5; padding: 20px; margin: 20px 0; }}
.metric {{ display: inline-block; margin: 10px 20px; }}
table {{ border-collapse: collapse; width: 100%; margin: 20px 0; }}
th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}
th {{ background-color: #f2f2f2; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p>Prepared by {author}. Generated on {generated}</p>
<div class="summary">
<h2>Executive Summary</h2>
<div class="metric"><strong>Total Sales:</strong> {total}</div>
<div class="metric"><strong>Average Sale:</strong> {avg}</div>
<div class="metric"><strong>Total Transactions:</strong> {count}</div>
<div class="metric"><strong>Date Range:</strong> {range}</div>
</div>
"#,
        title = escape(&meta.title),
        author = escape(&meta.author),
        generated = meta.generated.format("%Y-%m-%d %H:%M:%S"),
        total = escape(&fmt_money(&s.total_sales, sym)),
        avg = escape(&fmt_money(&s.avg_sale, sym)),
        count = s.total_transactions,
        range = range,
    );

    for (heading, label, field) in [
        ("Top Products by Sales", "Product", GroupField::Product),
        ("Top Regions by Sales", "Region", GroupField::Region),
        ("Top Sales Representatives", "Sales Rep", GroupField::SalesRep),
    ] {
        page.push_str(&format!(
            "<h2>{}</h2>\n<table>\n<tr><th>{}</th><th>Total Sales</th></tr>\n",
            heading, label
        ));
        for p in performance_by(records, field, HTML_TOP) {
            page.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                escape(&p.key),
                escape(&fmt_money(&p.total, sym))
            ));
        }
        page.push_str("</table>\n");
    }
    page.push_str("</body>\n</html>\n");
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_in_values_is_escaped() {
        assert_eq!(escape("<b>R&D</b>"), "&lt;b&gt;R&amp;D&lt;/b&gt;");
        assert_eq!(escape("O'Neil \"Co\""), "O&#39;Neil &quot;Co&quot;");
    }
}
