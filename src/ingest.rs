// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! CSV ingestion: delimiter sniffing, header normalisation and mapping onto
//! [`SalesRecord`] fields, and lenient value cleaning.

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::path::Path;
use tracing::{debug, info};

use crate::models::SalesRecord;

const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%Y/%m/%d"];
const UNKNOWN: &str = "Unknown";

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("static regex"));
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));
static MONEY_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[$,€£¥()\s]").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Date,
    Product,
    Region,
    SalesRep,
    CustomerId,
    Quantity,
    UnitPrice,
    TotalSales,
    Discount,
}

// Resolution order matters: `sales_rep` must claim its column before the
// `sales` keyword of `total_sales` can.
const FIELDS: [(Field, &[&str], &[&str]); 9] = [
    (Field::Date, &["date", "order_date", "invoice_date", "transaction_date"], &["date", "time"]),
    (Field::SalesRep, &["sales_rep", "salesrep", "rep", "salesperson"], &["rep", "seller", "salesperson"]),
    (Field::CustomerId, &["customer_id", "customerid", "customer", "client_id"], &["customer", "client"]),
    (Field::Product, &["product", "product_name", "item"], &["product", "item"]),
    (Field::Region, &["region", "territory"], &["region", "territory"]),
    (Field::Quantity, &["quantity", "qty", "units"], &["quantity", "qty"]),
    (Field::UnitPrice, &["unit_price", "unitprice", "price"], &["price"]),
    (Field::Discount, &["discount"], &["discount"]),
    (Field::TotalSales, &["total_sales", "sales", "revenue", "amount", "total"], &["sales", "revenue", "amount", "total", "value"]),
];

/// `" Unit Price ($) "` -> `"unit_price"`.
pub fn normalize_header(h: &str) -> String {
    let cleaned = NON_WORD.replace_all(h.trim(), "");
    SPACES
        .replace_all(cleaned.trim(), "_")
        .to_lowercase()
}

/// Column index of every recognised field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub product: usize,
    pub region: Option<usize>,
    pub sales_rep: Option<usize>,
    pub customer_id: Option<usize>,
    pub quantity: Option<usize>,
    pub unit_price: Option<usize>,
    pub total_sales: Option<usize>,
    pub discount: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut claimed = vec![false; normalized.len()];
        let mut found: Vec<(Field, usize)> = Vec::new();

        for (field, exact, _) in FIELDS.iter() {
            if let Some(i) = (0..normalized.len())
                .find(|&i| !claimed[i] && exact.contains(&normalized[i].as_str()))
            {
                claimed[i] = true;
                found.push((*field, i));
            }
        }
        for (field, _, keywords) in FIELDS.iter() {
            if found.iter().any(|(f, _)| f == field) {
                continue;
            }
            if let Some(i) = (0..normalized.len())
                .find(|&i| !claimed[i] && keywords.iter().any(|k| normalized[i].contains(k)))
            {
                claimed[i] = true;
                found.push((*field, i));
            }
        }

        let col = |f: Field| found.iter().find(|(x, _)| *x == f).map(|(_, i)| *i);
        let mut missing = Vec::new();
        if col(Field::Date).is_none() {
            missing.push("date");
        }
        if col(Field::Product).is_none() {
            missing.push("product");
        }
        if col(Field::TotalSales).is_none()
            && (col(Field::Quantity).is_none() || col(Field::UnitPrice).is_none())
        {
            missing.push("total_sales (or quantity and unit_price)");
        }
        if !missing.is_empty() {
            bail!(
                "Missing required columns: {} (found: {})",
                missing.join(", "),
                normalized.join(", ")
            );
        }

        let map = ColumnMap {
            date: col(Field::Date).unwrap_or_default(),
            product: col(Field::Product).unwrap_or_default(),
            region: col(Field::Region),
            sales_rep: col(Field::SalesRep),
            customer_id: col(Field::CustomerId),
            quantity: col(Field::Quantity),
            unit_price: col(Field::UnitPrice),
            total_sales: col(Field::TotalSales),
            discount: col(Field::Discount),
        };
        debug!(?map, "resolved CSV columns");
        Ok(map)
    }
}

/// Pick the first delimiter that splits the header into more than one column.
pub fn sniff_delimiter(header_line: &str) -> Option<u8> {
    DELIMITERS.into_iter().find(|d| {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(*d)
            .from_reader(header_line.as_bytes());
        rdr.records()
            .next()
            .and_then(|r| r.ok())
            .is_some_and(|r| r.len() > 1)
    })
}

pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let cleaned = MONEY_NOISE.replace_all(raw, "");
    cleaned
        .parse::<Decimal>()
        .map_err(|_| anyhow!("Invalid amount '{}'", raw.trim()))
}

pub fn parse_flexible_date(raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            // timestamps such as 2024-03-01T10:15:00 or 2024-03-01 10:15
            s.get(..10)
                .and_then(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").ok())
        })
        .ok_or_else(|| anyhow!("Invalid date '{}'", s))
}

pub fn read_sales_csv(path: impl AsRef<Path>) -> Result<Vec<SalesRecord>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Open CSV {}", path.display()))?;
    let records = parse_sales_csv(&text)?;
    info!(rows = records.len(), path = %path.display(), "parsed sales CSV");
    Ok(records)
}

pub fn parse_sales_csv(text: &str) -> Result<Vec<SalesRecord>> {
    let text = text.trim_start_matches('\u{feff}');
    let header_line = text.lines().next().unwrap_or_default();
    let delimiter = sniff_delimiter(header_line)
        .ok_or_else(|| anyhow!("Could not detect a delimiter (tried , ; tab |)"))?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let map = ColumnMap::resolve(&headers)?;

    let mut out = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let rec = result?;
        if rec.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let row = idx + 2; // header is line 1
        out.push(build_record(&rec, &map).with_context(|| format!("CSV row {}", row))?);
    }
    Ok(out)
}

fn build_record(rec: &csv::StringRecord, map: &ColumnMap) -> Result<SalesRecord> {
    let text = |i: Option<usize>| -> String {
        i.and_then(|i| rec.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    };
    let number = |i: Option<usize>| -> Result<Option<Decimal>> {
        match i.and_then(|i| rec.get(i)).map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_amount(raw).map(Some),
            None => Ok(None),
        }
    };

    let date_raw = rec.get(map.date).unwrap_or_default();
    let date = parse_flexible_date(date_raw)
        .with_context(|| format!("Invalid sale date '{}'", date_raw.trim()))?;
    let product = text(Some(map.product));

    let quantity = match number(map.quantity)? {
        Some(q) if q.is_sign_negative() && !q.is_zero() => {
            bail!("Invalid quantity '{}' for {}", q, product)
        }
        Some(q) => q
            .round()
            .to_u32()
            .ok_or_else(|| anyhow!("Invalid quantity '{}' for {}", q, product))?,
        None => 1,
    };
    let discount = number(map.discount)?;
    let unit_price = number(map.unit_price)?;
    let total_sales = match number(map.total_sales)? {
        Some(t) => t,
        None => {
            let price = unit_price
                .ok_or_else(|| anyhow!("Invalid amount: no total or unit price for {}", product))?;
            let gross = Decimal::from(quantity) * price;
            (gross * (Decimal::ONE - discount.unwrap_or_default())).round_dp(2)
        }
    };
    let unit_price = match unit_price {
        Some(p) => p,
        None if quantity > 0 => (total_sales / Decimal::from(quantity)).round_dp(2),
        None => Decimal::ZERO,
    };

    Ok(SalesRecord {
        date,
        product,
        region: text(map.region),
        sales_rep: text(map.sales_rep),
        customer_id: text(map.customer_id),
        quantity,
        unit_price,
        total_sales,
        discount,
    })
}
