// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use super::App;
use crate::settings::AppSettings;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let settings = app.store.settings()?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &settings)? {
                return Ok(());
            }
            let rows = settings
                .entries()?
                .into_iter()
                .map(|(k, v)| vec![k, v])
                .collect();
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = sub.get_one::<String>("value").unwrap();
            let mut settings = app.store.settings()?;
            settings.set(key, value)?;
            app.store.save_settings(&settings)?;
            println!("Settings saved successfully!");
        }
        Some(("reset", _)) => {
            app.store.save_settings(&AppSettings::default())?;
            println!("Settings reset to defaults");
        }
        _ => {}
    }
    Ok(())
}
