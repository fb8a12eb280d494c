// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The dashboard owns the fetched collections, the active filters and every
//! value derived from them. State is only ever replaced wholesale: a load
//! swaps in a complete [`Snapshot`], a filter change swaps in freshly
//! computed filtered views.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{self, BudgetStatus, MonthlyPoint, Overview};
use crate::api::{Activities, ApiClient, Crops, Expenses};
use crate::error::ApiError;
use crate::filter::{ActivityFilter, DateRange, ExpenseFilter};
use crate::models::{Activity, Crop, Expense, NamedValue};

pub const UPCOMING_DAYS: u32 = 7;

/// Shared flag telling an in-flight load its result is no longer wanted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Everything one dashboard load brings back.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub crops: Vec<Crop>,
    pub activities: Vec<Activity>,
    pub expenses: Vec<Expense>,
    pub expense_by_category: Vec<NamedValue>,
    pub activities_by_crop: Vec<NamedValue>,
    pub activities_by_type: Vec<NamedValue>,
    pub upcoming: Vec<Activity>,
    pub monthly_expense_total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Applied,
    /// The token was cancelled while the requests were in flight.
    Discarded,
}

/// Aggregates over the filtered views.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilteredTotals {
    pub expense_count: usize,
    pub expense_amount: Decimal,
    pub by_category: Vec<NamedValue>,
    pub activity_count: usize,
    pub by_crop: Vec<NamedValue>,
    pub by_type: Vec<NamedValue>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    year: i32,
    budget: Decimal,
    range: DateRange,
    expense_filter: ExpenseFilter,
    activity_filter: ActivityFilter,
    data: Snapshot,
    overview: Overview,
    filtered_expenses: Vec<Expense>,
    filtered_activities: Vec<Activity>,
    filtered_totals: FilteredTotals,
    stale: bool,
}

/// Swallow a failed fetch into `fallback`, unless the session is gone.
fn or_fallback<T>(what: &str, res: Result<T, ApiError>, fallback: T) -> Result<T, ApiError> {
    match res {
        Ok(v) => Ok(v),
        Err(ApiError::SessionExpired) => Err(ApiError::SessionExpired),
        Err(e) => {
            warn!("Error fetching {}: {}", what, e);
            Ok(fallback)
        }
    }
}

impl Dashboard {
    /// Starts on the `month` preset, with nothing loaded yet.
    pub fn new(year: i32, budget: Decimal, today: NaiveDate) -> Self {
        let mut d = Dashboard {
            year,
            budget,
            range: DateRange::Custom,
            expense_filter: ExpenseFilter::default(),
            activity_filter: ActivityFilter::default(),
            data: Snapshot::default(),
            overview: Overview::default(),
            filtered_expenses: Vec::new(),
            filtered_activities: Vec::new(),
            filtered_totals: FilteredTotals::default(),
            stale: true,
        };
        d.set_range(DateRange::Month, today);
        d
    }

    /// Fetch everything in parallel and apply the result. Individual failures
    /// fall back to empty data; only an expired session aborts the load.
    pub fn load(
        &mut self,
        api: &ApiClient,
        today: NaiveDate,
        cancel: &CancelToken,
    ) -> Result<LoadStatus, ApiError> {
        let snapshot = fetch_snapshot(api, today)?;
        if cancel.is_cancelled() {
            debug!("dashboard load cancelled, discarding results");
            return Ok(LoadStatus::Discarded);
        }
        self.apply(snapshot);
        Ok(LoadStatus::Applied)
    }

    /// Replace all loaded data and recompute everything derived from it.
    pub fn apply(&mut self, snapshot: Snapshot) {
        info!(
            crops = snapshot.crops.len(),
            activities = snapshot.activities.len(),
            expenses = snapshot.expenses.len(),
            "dashboard data loaded"
        );
        self.overview = aggregate::overview(
            &snapshot.crops,
            &snapshot.activities,
            &snapshot.expenses,
        );
        self.data = snapshot;
        self.stale = false;
        self.refilter();
    }

    /// Enter a preset. Non-custom presets overwrite both filters' bounds;
    /// `Custom` keeps them.
    pub fn set_range(&mut self, range: DateRange, today: NaiveDate) {
        self.range = range;
        if let Some((start, end)) = range.bounds(today) {
            self.expense_filter.start = Some(start);
            self.expense_filter.end = Some(end);
            self.activity_filter.start = Some(start);
            self.activity_filter.end = Some(end);
        }
        self.refilter();
    }

    pub fn set_expense_filter(&mut self, filter: ExpenseFilter) {
        self.expense_filter = filter;
        self.refilter();
    }

    pub fn set_activity_filter(&mut self, filter: ActivityFilter) {
        self.activity_filter = filter;
        self.refilter();
    }

    pub fn clear_filters(&mut self) {
        self.range = DateRange::Custom;
        self.expense_filter = ExpenseFilter::default();
        self.activity_filter = ActivityFilter::default();
        self.refilter();
    }

    /// Changing the year or the budget means the data must be fetched again.
    pub fn set_year(&mut self, year: i32) {
        if year != self.year {
            self.year = year;
            self.stale = true;
        }
    }

    pub fn set_budget(&mut self, budget: Decimal) {
        if budget != self.budget {
            self.budget = budget;
            self.stale = true;
        }
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn refresh_if_stale(
        &mut self,
        api: &ApiClient,
        today: NaiveDate,
        cancel: &CancelToken,
    ) -> Result<LoadStatus, ApiError> {
        if !self.stale {
            return Ok(LoadStatus::Applied);
        }
        self.load(api, today, cancel)
    }

    fn refilter(&mut self) {
        self.filtered_expenses = self.expense_filter.apply(&self.data.expenses);
        self.filtered_activities = self.activity_filter.apply(&self.data.activities);
        self.filtered_totals = FilteredTotals {
            expense_count: self.filtered_expenses.len(),
            expense_amount: aggregate::total_amount(&self.filtered_expenses),
            by_category: aggregate::sum_by_category(&self.filtered_expenses),
            activity_count: self.filtered_activities.len(),
            by_crop: aggregate::count_by_crop(&self.filtered_activities),
            by_type: aggregate::count_by_type(&self.filtered_activities),
        };
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn budget(&self) -> Decimal {
        self.budget
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn expense_filter(&self) -> &ExpenseFilter {
        &self.expense_filter
    }

    pub fn activity_filter(&self) -> &ActivityFilter {
        &self.activity_filter
    }

    pub fn data(&self) -> &Snapshot {
        &self.data
    }

    pub fn overview(&self) -> &Overview {
        &self.overview
    }

    pub fn filtered_expenses(&self) -> &[Expense] {
        &self.filtered_expenses
    }

    pub fn filtered_activities(&self) -> &[Activity] {
        &self.filtered_activities
    }

    pub fn filtered_totals(&self) -> &FilteredTotals {
        &self.filtered_totals
    }

    pub fn monthly_series(&self) -> Vec<MonthlyPoint> {
        aggregate::monthly_series(&self.data.crops, &self.data.expenses, self.year)
    }

    pub fn budget_status(&self) -> BudgetStatus {
        aggregate::budget_status(self.budget, self.data.monthly_expense_total)
    }

    pub fn category_options(&self) -> Vec<String> {
        aggregate::distinct(self.data.expenses.iter().map(|e| e.category.as_str()))
    }

    pub fn crop_options(&self) -> Vec<String> {
        aggregate::distinct(self.data.activities.iter().filter_map(|a| a.crop_name()))
    }

    pub fn type_options(&self) -> Vec<String> {
        aggregate::distinct(self.data.activities.iter().map(|a| a.r#type.as_str()))
    }
}

/// Issue every dashboard request concurrently and join on all of them.
pub fn fetch_snapshot(api: &ApiClient, today: NaiveDate) -> Result<Snapshot, ApiError> {
    let (month_start, next_month) = crate::utils::month_bounds(today);
    let (crops, activities, expenses, by_cat, by_crop, by_type, upcoming, month_total) =
        thread::scope(|s| {
            let crops = s.spawn(|| api.list::<Crops>());
            let activities = s.spawn(|| api.list::<Activities>());
            let expenses = s.spawn(|| api.list::<Expenses>());
            let by_cat = s.spawn(|| api.expenses_by_category());
            let by_crop = s.spawn(|| api.activities_by_crop());
            let by_type = s.spawn(|| api.activities_by_type());
            let upcoming = s.spawn(|| api.upcoming_activities(UPCOMING_DAYS));
            let month_total = s.spawn(|| api.expense_total_between(month_start, next_month));
            (
                join(crops),
                join(activities),
                join(expenses),
                join(by_cat),
                join(by_crop),
                join(by_type),
                join(upcoming),
                join(month_total),
            )
        });

    // Check every result before bailing so each failure is logged once.
    let crops = or_fallback("crops", crops, Vec::new());
    let activities = or_fallback("activities", activities, Vec::new());
    let expenses = or_fallback("expenses", expenses, Vec::new());
    let by_cat = or_fallback("expense categories", by_cat, Vec::new());
    let by_crop = or_fallback("activity crops", by_crop, Vec::new());
    let by_type = or_fallback("activity types", by_type, Vec::new());
    let upcoming = or_fallback("upcoming activities", upcoming, Vec::new());
    let month_total = or_fallback("monthly expense total", month_total, Decimal::ZERO);

    Ok(Snapshot {
        crops: crops?,
        activities: activities?,
        expenses: expenses?,
        expense_by_category: by_cat?,
        activities_by_crop: by_crop?,
        activities_by_type: by_type?,
        upcoming: upcoming?,
        monthly_expense_total: month_total?,
    })
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, Result<T, ApiError>>) -> Result<T, ApiError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(ApiError::Malformed("request worker panicked".into())))
}
