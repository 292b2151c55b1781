// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Recency / frequency / monetary scoring.
//!
//! Each metric is cut into quintiles computed across all customers. Recency is
//! scored inversely (most recent buyers get 5); frequency and monetary are
//! scored directly. Frequency is binned on its rank so that ties never collapse
//! two quintile edges into one.

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

use super::AnalyticsError;
use crate::models::{GroupField, SalesRecord, ValueField};

pub const QUINTILES: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct RfmRow {
    pub customer_id: String,
    pub recency: i64,
    pub frequency: usize,
    pub monetary: f64,
    pub r_score: u8,
    pub f_score: u8,
    pub m_score: u8,
    pub rfm_score: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RfmTable {
    /// Latest date in the dataset; recency is measured from here.
    pub reference_date: NaiveDate,
    /// One row per customer, ordered by customer identifier.
    pub rows: Vec<RfmRow>,
}

impl RfmTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows ordered by combined score, best customers first.
    pub fn ranked(&self) -> Vec<&RfmRow> {
        let mut rows: Vec<&RfmRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| {
            b.rfm_score
                .cmp(&a.rfm_score)
                .then_with(|| b.monetary.partial_cmp(&a.monetary).unwrap_or(Ordering::Equal))
        });
        rows
    }
}

pub fn customer_segmentation(
    records: &[SalesRecord],
    customer: GroupField,
    value: ValueField,
) -> Result<RfmTable, AnalyticsError> {
    let Some(reference_date) = records.iter().map(|r| r.date).max() else {
        return Err(AnalyticsError::insufficient(
            "customer segmentation",
            "customers",
            QUINTILES,
            0,
        ));
    };

    // customer -> (last purchase, count, total)
    let mut agg: BTreeMap<&str, (NaiveDate, usize, f64)> = BTreeMap::new();
    for r in records {
        let e = agg
            .entry(customer.extract(r))
            .or_insert((r.date, 0, 0.0));
        e.0 = e.0.max(r.date);
        e.1 += 1;
        e.2 += value.extract(r);
    }
    if agg.len() < QUINTILES {
        return Err(AnalyticsError::insufficient(
            "customer segmentation",
            "customers",
            QUINTILES,
            agg.len(),
        ));
    }

    let recency: Vec<f64> = agg
        .values()
        .map(|(last, _, _)| (reference_date - *last).num_days() as f64)
        .collect();
    let frequency: Vec<f64> = agg.values().map(|(_, n, _)| *n as f64).collect();
    let monetary: Vec<f64> = agg.values().map(|(_, _, m)| *m).collect();

    let r_bins = quintile_bins(&recency, "recency quintile edges")?;
    let f_bins = quintile_bins(&first_rank(&frequency), "frequency quintile edges")?;
    let m_bins = quintile_bins(&monetary, "monetary quintile edges")?;

    let rows = agg
        .into_iter()
        .enumerate()
        .map(|(i, (id, (_, n, m)))| {
            let r_score = (QUINTILES - r_bins[i]) as u8;
            let f_score = (f_bins[i] + 1) as u8;
            let m_score = (m_bins[i] + 1) as u8;
            RfmRow {
                customer_id: id.to_string(),
                recency: recency[i] as i64,
                frequency: n,
                monetary: m,
                r_score,
                f_score,
                m_score,
                rfm_score: format!("{}{}{}", r_score, f_score, m_score),
            }
        })
        .collect::<Vec<_>>();

    debug!(customers = rows.len(), %reference_date, "rfm segmentation complete");
    Ok(RfmTable {
        reference_date,
        rows,
    })
}

/// Ranks 1..=n, ties resolved by position.
fn first_rank(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    let mut ranks = vec![0.0; values.len()];
    for (rank, idx) in order.into_iter().enumerate() {
        ranks[idx] = (rank + 1) as f64;
    }
    ranks
}

/// Linear-interpolated quantile of pre-sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Zero-based quintile index of every value. Bins are right-closed with the
/// lowest edge included.
fn quintile_bins(values: &[f64], what: &'static str) -> Result<Vec<usize>, AnalyticsError> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let edges: Vec<f64> = (0..=QUINTILES)
        .map(|k| quantile(&sorted, k as f64 / QUINTILES as f64))
        .collect();

    let distinct = 1 + edges.windows(2).filter(|w| w[1] > w[0]).count();
    if distinct <= QUINTILES {
        return Err(AnalyticsError::insufficient(
            "customer segmentation",
            what,
            QUINTILES + 1,
            distinct,
        ));
    }

    Ok(values
        .iter()
        .map(|&x| {
            (0..QUINTILES)
                .find(|&k| x <= edges[k + 1])
                .unwrap_or(QUINTILES - 1)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::series::tests::record;

    fn scores(t: &RfmTable, id: &str) -> (u8, u8, u8) {
        let row = t.rows.iter().find(|r| r.customer_id == id).unwrap();
        (row.r_score, row.f_score, row.m_score)
    }

    #[test]
    fn recent_customers_get_top_recency_score() {
        // Dataset ends 2024-06-30. Three customers bought within the last five
        // days, seven last bought 60+ days earlier.
        let mut recs = vec![
            record("2024-06-30", "C01", 100.0),
            record("2024-06-27", "C02", 200.0),
            record("2024-06-27", "C03", 300.0),
        ];
        for (i, days_ago) in [60, 62, 64, 66, 68, 70, 72].iter().enumerate() {
            let d = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap() - chrono::Days::new(*days_ago);
            recs.push(record(&d.to_string(), &format!("C{:02}", i + 4), 400.0 + 100.0 * i as f64));
        }
        let t = customer_segmentation(&recs, GroupField::CustomerId, ValueField::TotalSales).unwrap();
        assert_eq!(t.len(), 10);
        for id in ["C01", "C02", "C03"] {
            assert_eq!(scores(&t, id).0, 5, "{id}");
        }
        for row in t.rows.iter().filter(|r| r.recency >= 60) {
            assert!(row.r_score < 5);
        }
    }

    #[test]
    fn every_score_is_used_and_monotonic() {
        let mut recs = Vec::new();
        for c in 0..10u32 {
            for k in 0..=c {
                let date = format!("2024-01-{:02}", 1 + c + k);
                recs.push(record(&date, &format!("K{}", c), 10.0 * f64::from(c + 1)));
            }
        }
        let t = customer_segmentation(&recs, GroupField::CustomerId, ValueField::TotalSales).unwrap();
        let pickers: [fn(&RfmRow) -> u8; 3] = [|r| r.r_score, |r| r.f_score, |r| r.m_score];
        for pick in pickers {
            let mut seen: Vec<u8> = t.rows.iter().map(pick).collect();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        }
        for a in &t.rows {
            for b in &t.rows {
                if a.recency < b.recency {
                    assert!(a.r_score >= b.r_score);
                }
                if a.frequency < b.frequency {
                    assert!(a.f_score <= b.f_score);
                }
                if a.monetary < b.monetary {
                    assert!(a.m_score <= b.m_score);
                }
            }
        }
        let top = t.ranked()[0];
        assert_eq!(top.rfm_score, format!("{}{}{}", top.r_score, top.f_score, top.m_score));
    }

    #[test]
    fn frequency_ties_are_split_by_row_order() {
        let recs: Vec<_> = (0..5)
            .map(|i| record(&format!("2024-02-0{}", i + 1), &format!("T{}", i), 10.0 * (i + 1) as f64))
            .collect();
        let t = customer_segmentation(&recs, GroupField::CustomerId, ValueField::TotalSales).unwrap();
        let f: Vec<u8> = t.rows.iter().map(|r| r.f_score).collect();
        assert_eq!(f, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn fewer_than_five_customers_is_insufficient() {
        let recs: Vec<_> = (0..4)
            .map(|i| record("2024-02-01", &format!("X{}", i), 1.0))
            .collect();
        let err = customer_segmentation(&recs, GroupField::CustomerId, ValueField::TotalSales)
            .unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::InsufficientData { needed: 5, found: 4, .. }
        ));
    }

    #[test]
    fn low_cardinality_metric_is_insufficient() {
        // Every customer bought on the same day: recency edges all collapse to 0.
        let recs: Vec<_> = (0..8)
            .map(|i| record("2024-02-01", &format!("Y{}", i), 5.0 * (i + 1) as f64))
            .collect();
        let err = customer_segmentation(&recs, GroupField::CustomerId, ValueField::TotalSales)
            .unwrap_err();
        assert!(err.to_string().contains("recency quintile edges"));
    }
}
