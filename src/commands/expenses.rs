// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use chrono::Datelike;

use super::{App, delete_record, submit_form};
use crate::aggregate::{category_totals, month_total, total_amount};
use crate::api::Expenses;
use crate::models::{EXPENSE_CATEGORIES, Expense, today};
use crate::screens::{EntityScreen, ExpenseForm};
use crate::utils::{fmt_money, maybe_print_json, opt_date, parse_month, pretty_table};

const FIELDS: &[(&str, &str)] = &[
    ("title", "expenseTitle"),
    ("amount", "amount"),
    ("category", "category"),
    ("date", "expenseDate"),
    ("description", "description"),
];

const HEADERS: [&str; 6] = ["ID", "Title", "Amount", "Category", "Date", "Description"];

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(app, sub)?,
        Some(("show", sub)) => show(app, sub)?,
        Some(("add", sub)) => {
            println!("{}", submit_form::<ExpenseForm>(app, sub, FIELDS, None)?)
        }
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            println!("{}", submit_form::<ExpenseForm>(app, sub, FIELDS, Some(id))?);
        }
        Some(("rm", sub)) => delete_record::<ExpenseForm>(app, sub)?,
        _ => {}
    }
    Ok(())
}

fn row(e: &Expense, ccy: &str) -> Vec<String> {
    vec![
        e.id.map(|i| i.to_string()).unwrap_or_default(),
        e.expense_title.clone(),
        fmt_money(&e.amount_or_zero(), ccy),
        e.category.clone(),
        opt_date(e.expense_date),
        e.description.clone().unwrap_or_default(),
    ]
}

fn list(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let ccy = app.store.settings()?.currency;
    let mut screen = EntityScreen::<ExpenseForm>::new();
    screen.load(&app.api)?;
    if let Some(err) = screen.error() {
        bail!("{}", err);
    }
    let month = match sub.get_one::<String>("month") {
        Some(m) => Some(parse_month(m)?),
        None => None,
    };
    let expenses: Vec<Expense> = screen
        .items()
        .iter()
        .filter(|e| {
            month.as_deref().is_none_or(|m| {
                e.expense_date
                    .is_some_and(|d| d.format("%Y-%m").to_string() == m)
            })
        })
        .cloned()
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &expenses)? {
        return Ok(());
    }
    println!(
        "{}",
        pretty_table(&HEADERS, expenses.iter().map(|e| row(e, &ccy)).collect())
    );

    let t = today();
    let this_month = format!("{:04}-{:02}", t.year(), t.month());
    println!(
        "Total: {}  |  This month: {}",
        fmt_money(&total_amount(&expenses), &ccy),
        fmt_money(&month_total(screen.items(), &this_month), &ccy)
    );
    let by_cat: Vec<Vec<String>> = category_totals(&expenses, &EXPENSE_CATEGORIES)
        .into_iter()
        .map(|(c, v)| vec![c, fmt_money(&v, &ccy)])
        .collect();
    if !by_cat.is_empty() {
        println!("{}", pretty_table(&["Category", "Spent"], by_cat));
    }
    Ok(())
}

fn show(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let expense = app.api.get::<Expenses>(id)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &expense)? {
        return Ok(());
    }
    let ccy = app.store.settings()?.currency;
    println!("{}", pretty_table(&HEADERS, vec![row(&expense, &ccy)]));
    Ok(())
}
