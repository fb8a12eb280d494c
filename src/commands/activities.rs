// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use super::{App, delete_record, submit_form};
use crate::api::Activities;
use crate::models::Activity;
use crate::screens::{ActivityForm, EntityScreen};
use crate::utils::{maybe_print_json, opt_date, pretty_table};

const FIELDS: &[(&str, &str)] = &[
    ("type", "type"),
    ("date", "date"),
    ("crop-id", "cropId"),
    ("description", "description"),
];

const HEADERS: [&str; 5] = ["ID", "Type", "Date", "Crop", "Description"];

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(app, sub)?,
        Some(("show", sub)) => show(app, sub)?,
        Some(("upcoming", sub)) => upcoming(app, sub)?,
        Some(("add", sub)) => {
            println!("{}", submit_form::<ActivityForm>(app, sub, FIELDS, None)?)
        }
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            println!("{}", submit_form::<ActivityForm>(app, sub, FIELDS, Some(id))?);
        }
        Some(("rm", sub)) => delete_record::<ActivityForm>(app, sub)?,
        _ => {}
    }
    Ok(())
}

fn row(a: &Activity) -> Vec<String> {
    vec![
        a.id.map(|i| i.to_string()).unwrap_or_default(),
        a.r#type.clone(),
        opt_date(a.date),
        a.crop_name().unwrap_or("-").to_string(),
        a.description.clone(),
    ]
}

fn print(activities: &[Activity], sub: &clap::ArgMatches) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &activities)? {
        return Ok(());
    }
    println!(
        "{}",
        pretty_table(&HEADERS, activities.iter().map(row).collect())
    );
    Ok(())
}

fn list(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let mut screen = EntityScreen::<ActivityForm>::new();
    screen.load(&app.api)?;
    if let Some(err) = screen.error() {
        bail!("{}", err);
    }
    print(screen.items(), sub)?;
    if !sub.get_flag("json") && !sub.get_flag("jsonl") {
        println!("{} activities", screen.items().len());
    }
    Ok(())
}

fn show(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let activity = app.api.get::<Activities>(id)?;
    print(std::slice::from_ref(&activity), sub)
}

fn upcoming(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let days = *sub.get_one::<u32>("days").unwrap();
    let items = app.api.upcoming_activities(days)?;
    if items.is_empty() && !sub.get_flag("json") && !sub.get_flag("jsonl") {
        println!("No activities in the next {} days", days);
        return Ok(());
    }
    print(&items, sub)
}
