// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::analytics::forecast::DEFAULT_HORIZON;
use crate::analytics::seasonality::DEFAULT_PERIOD;
use crate::analytics::summary::{OutlierMethod, detect_outliers, moving_averages};
use crate::analytics::{
    AnalyticsEngine, AnalyticsError, ForecastResult, Frequency, GrowthReport, RfmRow, RfmTable, SalesSeries,
    SeasonalDecomposition, decompose,
};
use crate::commands::require_records;
use crate::models::{GroupField, SalesRecord, ValueField};
use crate::utils::{fmt_opt, maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("seasonality", sub)) => seasonality(conn, sub)?,
        Some(("growth", sub)) => growth(conn, sub)?,
        Some(("rfm", sub)) => rfm(conn, sub)?,
        Some(("forecast", sub)) => forecast(conn, sub)?,
        Some(("moving-average", sub)) => moving_average(conn, sub)?,
        Some(("outliers", sub)) => outliers(conn, sub)?,
        Some(("all", sub)) => all(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn value_field(sub: &clap::ArgMatches) -> Result<ValueField> {
    let raw = sub
        .get_one::<String>("value")
        .map_or("total_sales", |s| s.as_str());
    Ok(raw.parse::<ValueField>()?)
}

fn flags(sub: &clap::ArgMatches) -> (bool, bool) {
    (sub.get_flag("json"), sub.get_flag("jsonl"))
}

#[derive(Serialize)]
struct DecompositionRow {
    date: NaiveDate,
    observed: f64,
    trend: Option<f64>,
    seasonal: f64,
    residual: Option<f64>,
}

fn decomposition_rows(d: &SeasonalDecomposition) -> Vec<DecompositionRow> {
    d.original
        .dates
        .iter()
        .enumerate()
        .map(|(i, date)| DecompositionRow {
            date: *date,
            observed: d.original.values[i],
            trend: d.trend[i],
            seasonal: d.seasonal[i],
            residual: d.residual[i],
        })
        .collect()
}

fn print_decomposition(d: &SeasonalDecomposition) {
    let rows = decomposition_rows(d)
        .into_iter()
        .map(|r| {
            vec![
                r.date.to_string(),
                format!("{:.2}", r.observed),
                fmt_opt(r.trend, 2),
                format!("{:.2}", r.seasonal),
                fmt_opt(r.residual, 2),
            ]
        })
        .collect();
    println!("Seasonal decomposition (period {})", d.period);
    println!(
        "{}",
        pretty_table(&["Date", "Observed", "Trend", "Seasonal", "Residual"], rows)
    );
}

/// Decomposition of the daily series, optionally zero-filling missing days.
fn seasonal_components(
    records: &[SalesRecord],
    value: ValueField,
    period: usize,
    fill_gaps: bool,
) -> Result<SeasonalDecomposition, AnalyticsError> {
    if fill_gaps {
        decompose(SalesSeries::daily(records, value).zero_filled(), period)
    } else {
        AnalyticsEngine::new(records).seasonality(value, period)
    }
}

fn seasonality(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = flags(sub);
    let value = value_field(sub)?;
    let period = *sub.get_one::<usize>("period").unwrap_or(&DEFAULT_PERIOD);
    let records = require_records(conn)?;

    let result = seasonal_components(&records, value, period, sub.get_flag("fill-gaps"))
        .with_context(|| format!("Seasonality of {}", value))?;

    if !maybe_print_json(json_flag, jsonl_flag, &decomposition_rows(&result))? {
        print_decomposition(&result);
    }
    Ok(())
}

#[derive(Serialize)]
struct GrowthRow {
    period: String,
    value: f64,
    growth_pct: Option<f64>,
    cumulative_pct: Option<f64>,
}

fn growth_rows(g: &GrowthReport) -> Vec<GrowthRow> {
    g.period_values
        .dates
        .iter()
        .enumerate()
        .map(|(i, d)| GrowthRow {
            period: g.frequency.label(*d),
            value: g.period_values.values[i],
            growth_pct: g.growth_rates[i],
            cumulative_pct: g.cumulative_growth[i],
        })
        .collect()
}

fn print_growth(g: &GrowthReport) {
    let rows = growth_rows(g)
        .into_iter()
        .map(|r| {
            vec![
                r.period,
                format!("{:.2}", r.value),
                fmt_opt(r.growth_pct, 2),
                fmt_opt(r.cumulative_pct, 2),
            ]
        })
        .collect();
    println!("Growth ({})", g.frequency);
    println!(
        "{}",
        pretty_table(&["Period", "Value", "Growth %", "Cumulative %"], rows)
    );
}

fn growth(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = flags(sub);
    let value = value_field(sub)?;
    let freq: Frequency = sub
        .get_one::<String>("freq")
        .map_or("monthly", |s| s.as_str())
        .parse()?;
    let records = require_records(conn)?;
    let report = AnalyticsEngine::new(&records).growth_rates(value, freq)?;
    if !maybe_print_json(json_flag, jsonl_flag, &growth_rows(&report))? {
        print_growth(&report);
    }
    Ok(())
}

fn print_rfm(rows: &[&RfmRow]) {
    let data = rows
        .iter()
        .map(|r| {
            vec![
                r.customer_id.clone(),
                r.recency.to_string(),
                r.frequency.to_string(),
                format!("{:.2}", r.monetary),
                r.rfm_score.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Customer", "Recency (days)", "Frequency", "Monetary", "RFM"],
            data
        )
    );
}

fn rfm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = flags(sub);
    let value = value_field(sub)?;
    let customer: GroupField = sub
        .get_one::<String>("customer")
        .map_or("customer_id", |s| s.as_str())
        .parse()?;
    let records = require_records(conn)?;
    let table = AnalyticsEngine::new(&records).customer_segmentation(customer, value)?;

    let mut rows = table.ranked();
    if let Some(limit) = sub.get_one::<usize>("limit") {
        rows.truncate(*limit);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        println!(
            "RFM segmentation of {} customers (reference date {})",
            table.len(),
            table.reference_date
        );
        print_rfm(&rows);
    }
    Ok(())
}

fn print_forecast(f: &ForecastResult) {
    let rows = f
        .forecast
        .dates
        .iter()
        .zip(&f.forecast.values)
        .map(|(d, v)| vec![d.to_string(), format!("{:.2}", v)])
        .collect();
    println!(
        "Linear trend: {:.4} per day, intercept {:.2}, R² {:.4}",
        f.slope, f.intercept, f.model_score
    );
    println!("{}", pretty_table(&["Date", "Forecast"], rows));
}

fn forecast(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = flags(sub);
    let value = value_field(sub)?;
    let periods = *sub.get_one::<usize>("periods").unwrap_or(&DEFAULT_HORIZON);
    let records = require_records(conn)?;
    let result = AnalyticsEngine::new(&records).forecast_sales(value, periods)?;
    if !maybe_print_json(json_flag, jsonl_flag, &result)? {
        print_forecast(&result);
    }
    Ok(())
}

fn moving_average(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = flags(sub);
    let value = value_field(sub)?;
    let windows: Vec<usize> = sub
        .get_many::<usize>("windows")
        .map(|w| w.copied().collect())
        .unwrap_or_else(|| vec![7, 30, 90]);
    let records = require_records(conn)?;
    let series = SalesSeries::daily(&records, value);
    let averages = moving_averages(&series, &windows);

    let mut data = Vec::with_capacity(series.len());
    for (i, d) in series.dates.iter().enumerate() {
        let mut row = Map::new();
        row.insert("date".into(), json!(d));
        row.insert(value.name().into(), json!(series.values[i]));
        for ma in &averages {
            row.insert(format!("ma_{}", ma.window), json!(ma.values[i]));
        }
        data.push(Value::Object(row));
    }
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }

    let mut headers = vec!["Date".to_string(), value.name().to_string()];
    headers.extend(averages.iter().map(|ma| format!("MA {}", ma.window)));
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    let rows = series
        .dates
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let mut row = vec![d.to_string(), format!("{:.2}", series.values[i])];
            row.extend(averages.iter().map(|ma| format!("{:.2}", ma.values[i])));
            row
        })
        .collect();
    println!("{}", pretty_table(&header_refs, rows));
    Ok(())
}

#[derive(Serialize)]
struct OutlierRow {
    date: NaiveDate,
    customer_id: String,
    product: String,
    value: f64,
}

fn outliers(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = flags(sub);
    let value = value_field(sub)?;
    let method: OutlierMethod = sub
        .get_one::<String>("method")
        .map_or("iqr", |s| s.as_str())
        .parse()?;
    let threshold = sub
        .get_one::<f64>("threshold")
        .copied()
        .unwrap_or_else(|| method.default_threshold());
    let records = require_records(conn)?;

    let values: Vec<f64> = records.iter().map(|r| value.extract(r)).collect();
    let rows: Vec<OutlierRow> = detect_outliers(&values, method, threshold)
        .into_iter()
        .map(|i| OutlierRow {
            date: records[i].date,
            customer_id: records[i].customer_id.clone(),
            product: records[i].product.clone(),
            value: values[i],
        })
        .collect();
    if maybe_print_json(json_flag, jsonl_flag, &rows)? {
        return Ok(());
    }
    println!(
        "{} outliers in {} of {} sales (threshold {})",
        rows.len(),
        value,
        records.len(),
        threshold
    );
    let data = rows
        .into_iter()
        .map(|r| {
            vec![
                r.date.to_string(),
                r.customer_id,
                r.product,
                format!("{:.2}", r.value),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Customer", "Product", value.name()], data)
    );
    Ok(())
}

/// Runs the four core analyses with defaults. A failing analysis is
/// reported and the rest still run.
fn all(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = flags(sub);
    let records = require_records(conn)?;
    let engine = AnalyticsEngine::new(&records);
    let value = ValueField::TotalSales;

    let seasonal = seasonal_components(&records, value, DEFAULT_PERIOD, sub.get_flag("fill-gaps"));
    let growth = engine.growth_rates(value, Frequency::Monthly);
    let segments = engine.customer_segmentation(GroupField::CustomerId, value);
    let forecast = engine.forecast_sales(value, DEFAULT_HORIZON);

    if json_flag || jsonl_flag {
        let mut out = Map::new();
        out.insert("seasonality".into(), section(&seasonal)?);
        out.insert("growth".into(), section(&growth)?);
        out.insert("rfm".into(), section(&segments)?);
        out.insert("forecast".into(), section(&forecast)?);
        maybe_print_json(json_flag, jsonl_flag, &Value::Object(out))?;
        return Ok(());
    }

    match &seasonal {
        Ok(d) => print_decomposition(d),
        Err(e) => skipped("seasonality", e),
    }
    match &growth {
        Ok(g) => print_growth(g),
        Err(e) => skipped("growth", e),
    }
    match &segments {
        Ok(t) => print_segment_overview(t),
        Err(e) => skipped("rfm", e),
    }
    match &forecast {
        Ok(f) => print_forecast(f),
        Err(e) => skipped("forecast", e),
    }
    Ok(())
}

fn section<T: Serialize, E: std::fmt::Display>(r: &Result<T, E>) -> Result<Value> {
    Ok(match r {
        Ok(v) => serde_json::to_value(v)?,
        Err(e) => {
            warn!(error = %e, "analysis skipped");
            json!({ "error": e.to_string() })
        }
    })
}

fn skipped(name: &str, e: &dyn std::fmt::Display) {
    warn!(analysis = name, error = %e, "analysis skipped");
    println!("{}: skipped ({})", name, e);
}

fn print_segment_overview(t: &RfmTable) {
    println!(
        "RFM segmentation of {} customers (reference date {}), top 10:",
        t.len(),
        t.reference_date
    );
    let ranked = t.ranked();
    print_rfm(&ranked[..ranked.len().min(10)]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::series::tests::record;
    use chrono::Days;

    fn every_other_day(days: u64) -> Vec<SalesRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..days)
            .step_by(2)
            .map(|i| record(&(start + Days::new(i)).to_string(), "A", 10.0 + i as f64))
            .collect()
    }

    #[test]
    fn sparse_days_need_gap_filling() {
        let recs = every_other_day(60);
        let err = seasonal_components(&recs, ValueField::TotalSales, DEFAULT_PERIOD, false)
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::IrregularSeries { .. }));

        let dec = seasonal_components(&recs, ValueField::TotalSales, DEFAULT_PERIOD, true).unwrap();
        assert_eq!(dec.original.len(), 59);
        assert_eq!(dec.original.values[1], 0.0);
    }
}
