// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client-side filters over already-fetched collections.

use chrono::{Days, Months, NaiveDate};
use serde::Serialize;

use crate::models::{Activity, Expense};

/// Convenience presets for the date bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    Week,
    #[default]
    Month,
    Year,
    Custom,
}

impl std::str::FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(DateRange::Week),
            "month" => Ok(DateRange::Month),
            "year" => Ok(DateRange::Year),
            "custom" => Ok(DateRange::Custom),
            other => Err(format!(
                "Unknown date range '{}' (use week|month|year|custom)",
                other
            )),
        }
    }
}

impl DateRange {
    /// `(start, end)` counted back from `today`; `None` for `Custom`, which
    /// leaves whatever bounds are already set.
    pub fn bounds(self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let start = match self {
            DateRange::Week => today.checked_sub_days(Days::new(7)),
            DateRange::Month => today.checked_sub_months(Months::new(1)),
            DateRange::Year => today.checked_sub_months(Months::new(12)),
            DateRange::Custom => return None,
        }?;
        Some((start, today))
    }
}

fn within(date: Option<NaiveDate>, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }
    let Some(d) = date else {
        return false;
    };
    start.is_none_or(|s| d >= s) && end.is_none_or(|e| d <= e)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpenseFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub category: Option<String>,
}

impl ExpenseFilter {
    pub fn matches(&self, e: &Expense) -> bool {
        within(e.expense_date, self.start, self.end)
            && self.category.as_deref().is_none_or(|c| e.category == c)
    }

    /// Matching items, in their original order.
    pub fn apply(&self, items: &[Expense]) -> Vec<Expense> {
        items.iter().filter(|e| self.matches(e)).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.category.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub crop: Option<String>,
    pub kind: Option<String>,
}

impl ActivityFilter {
    pub fn matches(&self, a: &Activity) -> bool {
        within(a.date, self.start, self.end)
            && self.crop.as_deref().is_none_or(|c| a.crop_name() == Some(c))
            && self.kind.as_deref().is_none_or(|t| a.r#type == t)
    }

    pub fn apply(&self, items: &[Activity]) -> Vec<Activity> {
        items.iter().filter(|a| self.matches(a)).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.crop.is_none() && self.kind.is_none()
    }
}

/// Empty selections mean "no constraint".
pub fn selection(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
