// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::analytics::AnalyticsError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub product: String,
    pub region: String,
    pub sales_rep: String,
    pub customer_id: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_sales: Decimal,
    pub discount: Option<Decimal>, // fraction in [0,1]
}

/// Numeric column a computation aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueField {
    #[default]
    TotalSales,
    Quantity,
    UnitPrice,
    Discount,
}

impl ValueField {
    pub fn extract(self, r: &SalesRecord) -> f64 {
        match self {
            ValueField::TotalSales => r.total_sales.to_f64().unwrap_or(0.0),
            ValueField::Quantity => f64::from(r.quantity),
            ValueField::UnitPrice => r.unit_price.to_f64().unwrap_or(0.0),
            ValueField::Discount => r.discount.and_then(|d| d.to_f64()).unwrap_or(0.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueField::TotalSales => "total_sales",
            ValueField::Quantity => "quantity",
            ValueField::UnitPrice => "unit_price",
            ValueField::Discount => "discount",
        }
    }
}

/// Categorical column records can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
    #[default]
    CustomerId,
    Product,
    Region,
    SalesRep,
}

impl GroupField {
    pub fn extract(self, r: &SalesRecord) -> &str {
        match self {
            GroupField::CustomerId => &r.customer_id,
            GroupField::Product => &r.product,
            GroupField::Region => &r.region,
            GroupField::SalesRep => &r.sales_rep,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GroupField::CustomerId => "customer_id",
            GroupField::Product => "product",
            GroupField::Region => "region",
            GroupField::SalesRep => "sales_rep",
        }
    }
}

fn field_key(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for ValueField {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match field_key(s).as_str() {
            "totalsales" | "sales" | "total" => Ok(ValueField::TotalSales),
            "quantity" | "qty" => Ok(ValueField::Quantity),
            "unitprice" | "price" => Ok(ValueField::UnitPrice),
            "discount" => Ok(ValueField::Discount),
            _ => Err(AnalyticsError::UnknownField(s.trim().to_string())),
        }
    }
}

impl FromStr for GroupField {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match field_key(s).as_str() {
            "customerid" | "customer" => Ok(GroupField::CustomerId),
            "product" => Ok(GroupField::Product),
            "region" => Ok(GroupField::Region),
            "salesrep" | "rep" => Ok(GroupField::SalesRep),
            _ => Err(AnalyticsError::UnknownField(s.trim().to_string())),
        }
    }
}

impl fmt::Display for ValueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for GroupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
