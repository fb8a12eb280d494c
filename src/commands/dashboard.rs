// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde_json::json;

use super::{App, filters_from};
use crate::dashboard::{CancelToken, Dashboard, LoadStatus};
use crate::models::{NamedValue, today};
use crate::utils::{fmt_money, maybe_print_json, opt_date, pretty_table};

/// Build a dashboard for the filter flags in `m` and load it.
pub fn load(app: &App, m: &clap::ArgMatches, year: i32, today: NaiveDate) -> Result<Dashboard> {
    let mut dash = Dashboard::new(year, app.store.monthly_budget()?, today);
    let (range, expense, activity) = filters_from(m, today)?;
    dash.set_range(range, today);
    dash.set_expense_filter(expense);
    dash.set_activity_filter(activity);
    if dash.load(&app.api, today, &CancelToken::new())? == LoadStatus::Discarded {
        anyhow::bail!("Dashboard load was cancelled");
    }
    Ok(dash)
}

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    let today = today();
    let year = m.get_one::<i32>("year").copied().unwrap_or(today.year());
    let dash = load(app, m, year, today)?;
    let ccy = app.store.settings()?.currency;

    let json_view = json!({
        "year": dash.year(),
        "range": dash.range(),
        "overview": dash.overview(),
        "filtered": dash.filtered_totals(),
        "budget": dash.budget_status(),
        "monthly": dash.monthly_series(),
        "expenseByCategory": dash.data().expense_by_category,
        "activitiesByCrop": dash.data().activities_by_crop,
        "activitiesByType": dash.data().activities_by_type,
        "upcoming": dash.data().upcoming,
    });
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &json_view)? {
        return Ok(());
    }

    let ov = dash.overview();
    println!(
        "{}",
        pretty_table(
            &["Crops", "Activities", "Expenses", "Total area", "Total spent", "Cost / acre"],
            vec![vec![
                ov.total_crops.to_string(),
                ov.total_activities.to_string(),
                ov.total_expenses.to_string(),
                format!("{:.2}", ov.total_area),
                fmt_money(&ov.total_expense_amount, &ccy),
                fmt_money(&ov.cost_per_area, &ccy),
            ]],
        )
    );

    let status = dash.budget_status();
    if status.exceeded {
        println!(
            "⚠ Budget Alert: You've exceeded your monthly budget of {}! Current spending: {}",
            fmt_money(&status.budget, &ccy),
            fmt_money(&status.spent, &ccy)
        );
    } else if status.budget > Decimal::ZERO {
        println!(
            "Budget: {} of {} spent this month",
            fmt_money(&status.spent, &ccy),
            fmt_money(&status.budget, &ccy)
        );
    }

    let ft = dash.filtered_totals();
    println!(
        "\nFiltered ({:?}): {} expenses totalling {}, {} activities",
        dash.range(),
        ft.expense_count,
        fmt_money(&ft.expense_amount, &ccy),
        ft.activity_count
    );
    print_breakdown("Category", &ft.by_category);
    print_breakdown("Crop", &ft.by_crop);
    print_breakdown("Type", &ft.by_type);

    let monthly: Vec<Vec<String>> = dash
        .monthly_series()
        .into_iter()
        .map(|p| vec![p.month, fmt_money(&p.expenses, &ccy), p.crops.to_string()])
        .collect();
    println!("\n{} by month", dash.year());
    println!("{}", pretty_table(&["Month", "Expenses", "Crops"], monthly));

    let upcoming = &dash.data().upcoming;
    if !upcoming.is_empty() {
        println!("\nUpcoming activities");
        println!(
            "{}",
            pretty_table(
                &["Date", "Type", "Crop"],
                upcoming
                    .iter()
                    .map(|a| {
                        vec![
                            opt_date(a.date),
                            a.r#type.clone(),
                            a.crop_name().unwrap_or("-").to_string(),
                        ]
                    })
                    .collect(),
            )
        );
    }
    Ok(())
}

fn print_breakdown(label: &str, values: &[NamedValue]) {
    if values.is_empty() {
        return;
    }
    let rows = values
        .iter()
        .map(|v| vec![v.name.clone(), v.value.to_string()])
        .collect();
    println!("{}", pretty_table(&[label, "Value"], rows));
}
