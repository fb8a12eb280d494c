// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived values. Everything here is a pure function of the collections it
//! is given; nothing is cached.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::models::{Activity, Crop, Expense, NamedValue};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overview {
    pub total_crops: usize,
    pub total_activities: usize,
    pub total_expenses: usize,
    pub total_area: f64,
    pub total_expense_amount: Decimal,
    pub cost_per_area: Decimal,
}

pub fn overview(crops: &[Crop], activities: &[Activity], expenses: &[Expense]) -> Overview {
    let total_area = total_area(crops);
    let total_expense_amount = total_amount(expenses);
    Overview {
        total_crops: crops.len(),
        total_activities: activities.len(),
        total_expenses: expenses.len(),
        total_area,
        total_expense_amount,
        cost_per_area: cost_per_area(total_expense_amount, total_area),
    }
}

pub fn total_area(crops: &[Crop]) -> f64 {
    crops.iter().map(|c| c.area).sum()
}

pub fn total_amount(expenses: &[Expense]) -> Decimal {
    expenses.iter().map(Expense::amount_or_zero).sum()
}

/// Zero when there is no area to spread the cost over.
pub fn cost_per_area(total: Decimal, area: f64) -> Decimal {
    if area <= 0.0 {
        return Decimal::ZERO;
    }
    match Decimal::try_from(area) {
        Ok(a) if !a.is_zero() => (total / a).round_dp(2),
        _ => Decimal::ZERO,
    }
}

pub fn active_crops(crops: &[Crop], today: NaiveDate) -> usize {
    crops.iter().filter(|c| c.is_active(today)).count()
}

/// Sum of amounts for expenses dated in `month` (`YYYY-MM`).
pub fn month_total(expenses: &[Expense], month: &str) -> Decimal {
    expenses
        .iter()
        .filter(|e| {
            e.expense_date
                .is_some_and(|d| d.format("%Y-%m").to_string() == month)
        })
        .map(Expense::amount_or_zero)
        .sum()
}

/// Totals per known category, skipping categories with nothing spent.
pub fn category_totals(expenses: &[Expense], categories: &[&str]) -> Vec<(String, Decimal)> {
    categories
        .iter()
        .map(|cat| {
            let total: Decimal = expenses
                .iter()
                .filter(|e| e.category == *cat)
                .map(Expense::amount_or_zero)
                .sum();
            (cat.to_string(), total)
        })
        .filter(|(_, total)| *total > Decimal::ZERO)
        .collect()
}

/// Amount per category over whatever categories appear, largest first.
pub fn sum_by_category(expenses: &[Expense]) -> Vec<NamedValue> {
    let mut agg: BTreeMap<String, Decimal> = BTreeMap::new();
    for e in expenses {
        *agg.entry(e.category.clone()).or_insert(Decimal::ZERO) += e.amount_or_zero();
    }
    crate::api::to_named_values(
        agg.into_iter()
            .map(|(k, v)| (k, v.to_f64().unwrap_or(0.0)))
            .collect(),
    )
}

pub fn count_by_crop(activities: &[Activity]) -> Vec<NamedValue> {
    count_by(activities, |a| a.crop_name().map(str::to_string))
}

pub fn count_by_type(activities: &[Activity]) -> Vec<NamedValue> {
    count_by(activities, |a| Some(a.r#type.clone()).filter(|t| !t.is_empty()))
}

fn count_by(activities: &[Activity], key: impl Fn(&Activity) -> Option<String>) -> Vec<NamedValue> {
    let mut agg: BTreeMap<String, f64> = BTreeMap::new();
    for a in activities {
        if let Some(k) = key(a) {
            *agg.entry(k).or_insert(0.0) += 1.0;
        }
    }
    crate::api::to_named_values(agg)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub expenses: Decimal,
    pub crops: usize,
}

/// Twelve points for `year`: money spent in each month, and how many crops
/// were planted or harvested in it.
pub fn monthly_series(crops: &[Crop], expenses: &[Expense], year: i32) -> Vec<MonthlyPoint> {
    let in_month = |d: Option<NaiveDate>, m: u32| d.is_some_and(|d| d.year() == year && d.month() == m);
    (1..=12u32)
        .map(|m| MonthlyPoint {
            month: MONTH_LABELS[(m - 1) as usize].to_string(),
            expenses: expenses
                .iter()
                .filter(|e| in_month(e.expense_date, m))
                .map(Expense::amount_or_zero)
                .sum(),
            crops: crops
                .iter()
                .filter(|c| in_month(c.planting_date, m) || in_month(c.harvest_date, m))
                .count(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub budget: Decimal,
    pub spent: Decimal,
    pub exceeded: bool,
}

/// Alert only when a budget is set and the month's spend is above it.
pub fn budget_exceeded(budget: Decimal, monthly_total: Decimal) -> bool {
    budget > Decimal::ZERO && monthly_total > budget
}

pub fn budget_status(budget: Decimal, monthly_total: Decimal) -> BudgetStatus {
    BudgetStatus {
        budget,
        spent: monthly_total,
        exceeded: budget_exceeded(budget, monthly_total),
    }
}

/// Distinct non-empty values in first-seen order.
pub fn distinct<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !v.is_empty() && !out.iter().any(|o| o == v) {
            out.push(v.to_string());
        }
    }
    out
}
