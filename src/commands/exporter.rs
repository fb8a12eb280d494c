// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Datelike;

use super::App;
use crate::export::{self, ExportFormat, ExportKind, ExportOutcome};
use crate::models::today;

/// Export what the dashboard would show for the same filter flags.
pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    let kind: ExportKind = m
        .get_one::<String>("kind")
        .unwrap()
        .parse()
        .map_err(anyhow::Error::msg)?;
    let format: ExportFormat = m
        .get_one::<String>("format")
        .unwrap()
        .parse()
        .map_err(anyhow::Error::msg)?;
    let out = Path::new(m.get_one::<String>("out").unwrap());

    let today = today();
    let dash = super::dashboard::load(app, m, today.year(), today)?;
    let outcome = export::export(
        kind,
        format,
        dash.filtered_expenses(),
        dash.filtered_activities(),
        out,
        today,
    )
    .with_context(|| format!("Failed to export {}", kind.filename()))?;

    match outcome {
        ExportOutcome::Written(path) => println!("Exported to {}", path.display()),
        ExportOutcome::NoData => println!("No data to export"),
    }
    Ok(())
}
