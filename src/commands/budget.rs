// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rust_decimal::Decimal;

use super::App;
use crate::aggregate::budget_status;
use crate::models::today;
use crate::utils::{fmt_money, maybe_print_json, month_bounds, parse_decimal, pretty_table};

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(app, sub)?,
        Some(("show", sub)) => show(app, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    if amount < Decimal::ZERO {
        bail!("Budget cannot be negative");
    }
    app.store.set_monthly_budget(amount)?;
    let ccy = app.store.settings()?.currency;
    if amount.is_zero() {
        println!("Monthly budget cleared");
    } else {
        println!("Monthly budget set to {}", fmt_money(&amount, &ccy));
    }
    Ok(())
}

fn show(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let budget = app.store.monthly_budget()?;
    let (start, next) = month_bounds(today());
    let spent = app.api.expense_total_between(start, next)?;
    let status = budget_status(budget, spent);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &status)? {
        return Ok(());
    }
    let ccy = app.store.settings()?.currency;
    println!(
        "{}",
        pretty_table(
            &["Month", "Budget", "Spent", "Status"],
            vec![vec![
                start.format("%Y-%m").to_string(),
                fmt_money(&status.budget, &ccy),
                fmt_money(&status.spent, &ccy),
                if status.exceeded {
                    "EXCEEDED".to_string()
                } else if status.budget.is_zero() {
                    "no budget".to_string()
                } else {
                    "ok".to_string()
                },
            ]],
        )
    );
    Ok(())
}
