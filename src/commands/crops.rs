// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use super::{App, delete_record, submit_form};
use crate::aggregate::{active_crops, total_area};
use crate::api::Crops;
use crate::models::{Crop, today};
use crate::screens::{CropForm, EntityScreen};
use crate::utils::{maybe_print_json, opt_date, pretty_table};

const FIELDS: &[(&str, &str)] = &[
    ("name", "name"),
    ("variety", "variety"),
    ("area", "area"),
    ("planting-date", "plantingDate"),
    ("harvest-date", "harvestDate"),
    ("notes", "notes"),
];

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(app, sub)?,
        Some(("show", sub)) => show(app, sub)?,
        Some(("add", sub)) => println!("{}", submit_form::<CropForm>(app, sub, FIELDS, None)?),
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            println!("{}", submit_form::<CropForm>(app, sub, FIELDS, Some(id))?);
        }
        Some(("rm", sub)) => delete_record::<CropForm>(app, sub)?,
        _ => {}
    }
    Ok(())
}

fn row(c: &Crop) -> Vec<String> {
    vec![
        c.id.map(|i| i.to_string()).unwrap_or_default(),
        c.name.clone(),
        c.variety.clone(),
        format!("{:.2}", c.area),
        opt_date(c.planting_date),
        opt_date(c.harvest_date),
        c.notes.clone().unwrap_or_default(),
    ]
}

const HEADERS: [&str; 7] = [
    "ID", "Name", "Variety", "Area", "Planted", "Harvest", "Notes",
];

fn list(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let mut screen = EntityScreen::<CropForm>::new();
    screen.load(&app.api)?;
    if let Some(err) = screen.error() {
        bail!("{}", err);
    }
    let crops = screen.items();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &crops)? {
        return Ok(());
    }
    println!(
        "{}",
        pretty_table(&HEADERS, crops.iter().map(row).collect())
    );
    println!(
        "{} crops, {} active, {:.2} acres total",
        crops.len(),
        active_crops(crops, today()),
        total_area(crops)
    );
    Ok(())
}

fn show(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let crop = app.api.get::<Crops>(id)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &crop)? {
        return Ok(());
    }
    println!("{}", pretty_table(&HEADERS, vec![row(&crop)]));
    Ok(())
}
