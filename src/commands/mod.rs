// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod activities;
pub mod auth;
pub mod budget;
pub mod crops;
pub mod dashboard;
pub mod expenses;
pub mod exporter;
pub mod settings;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Result, bail};

use crate::api::ApiClient;
use crate::config::Config;
use crate::db::LocalStore;
use crate::filter::{ActivityFilter, DateRange, ExpenseFilter, selection};
use crate::screens::{EntityScreen, FormModel, ScreenState};
use crate::session::{Navigator, TerminalNavigator};
use crate::utils::parse_date;

/// Everything a command handler needs.
pub struct App {
    pub config: Config,
    pub store: Arc<LocalStore>,
    pub api: ApiClient,
}

impl App {
    pub fn new(config: Config, store: Arc<LocalStore>) -> Result<Self> {
        Self::with_navigator(config, store, Arc::new(TerminalNavigator))
    }

    pub fn with_navigator(
        config: Config,
        store: Arc<LocalStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let api = ApiClient::new(&config.api_url, store.clone(), navigator)?;
        Ok(App { config, store, api })
    }
}

/// Asks on stdin; anything but y/yes is a no.
pub fn prompt_yes_no(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Copy each `(flag, field)` pair that was given on the command line into
/// the open form.
pub(crate) fn fill_form<F: FormModel>(
    screen: &mut EntityScreen<F>,
    sub: &clap::ArgMatches,
    fields: &[(&str, &str)],
) -> Result<()> {
    for (flag, field) in fields {
        if let Some(raw) = sub.get_one::<String>(flag) {
            screen.edit_field(field, raw)?;
        }
    }
    Ok(())
}

/// Drive the add/edit flow of a screen from command-line flags. Returns the
/// notice on success.
pub(crate) fn submit_form<F: FormModel>(
    app: &App,
    sub: &clap::ArgMatches,
    fields: &[(&str, &str)],
    target: Option<i64>,
) -> Result<String> {
    let mut screen = EntityScreen::<F>::new();
    match target {
        Some(id) => {
            screen.load(&app.api)?;
            if let Some(err) = screen.error() {
                bail!("{}", err);
            }
            if !screen.begin_edit(id) {
                bail!("No record with id {}", id);
            }
        }
        None => screen.begin_add(),
    }
    fill_form(&mut screen, sub, fields)?;
    screen.submit(&app.api)?;
    if let ScreenState::Editing {
        error: Some(err), ..
    } = screen.state()
    {
        bail!("{}", err);
    }
    Ok(screen.notice().unwrap_or("Saved").to_string())
}

/// Delete after confirmation (or `--yes`).
pub(crate) fn delete_record<F: FormModel>(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let assume_yes = sub.get_flag("yes");
    let mut screen = EntityScreen::<F>::new();
    let confirm = |prompt: &str| assume_yes || prompt_yes_no(prompt);
    if screen.delete(&app.api, id, &confirm)? {
        println!("{}", screen.notice().unwrap_or("Deleted"));
    } else if let Some(err) = screen.error() {
        bail!("{}", err);
    } else {
        println!("Cancelled");
    }
    Ok(())
}

/// Filters from the shared `--range/--start/--end/--category/--crop/--type`
/// flags. Explicit dates switch the range to custom.
pub(crate) fn filters_from(
    sub: &clap::ArgMatches,
    today: chrono::NaiveDate,
) -> Result<(DateRange, ExpenseFilter, ActivityFilter)> {
    let start = sub.get_one::<String>("start").map(|s| parse_date(s)).transpose()?;
    let end = sub.get_one::<String>("end").map(|s| parse_date(s)).transpose()?;
    let range = if start.is_some() || end.is_some() {
        DateRange::Custom
    } else {
        sub.get_one::<String>("range")
            .map(|s| s.parse::<DateRange>())
            .transpose()
            .map_err(anyhow::Error::msg)?
            .unwrap_or_default()
    };
    let (start, end) = match range.bounds(today) {
        Some((s, e)) => (Some(s), Some(e)),
        None => (start, end),
    };
    let expense = ExpenseFilter {
        start,
        end,
        category: selection(sub.get_one::<String>("category")),
    };
    let activity = ActivityFilter {
        start,
        end,
        crop: selection(sub.get_one::<String>("crop")),
        kind: selection(sub.get_one::<String>("type")),
    };
    Ok((range, expense, activity))
}
