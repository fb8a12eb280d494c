// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use farmbook::commands::{self, App};
use farmbook::config::{Config, LOG_ENV};
use farmbook::db::LocalStore;
use farmbook::error::ApiError;
use farmbook::session::{self, Navigator, Route, TerminalNavigator};
use farmbook::cli;

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let config = Config::from_env()?;
    let store = Arc::new(LocalStore::open(&config.db_path()?)?);
    let app = App::new(config, store)?;

    // Everything except signing in needs a stored session.
    if let Some((name, _)) = matches.subcommand() {
        if !matches!(name, "login" | "register" | "logout")
            && session::guard(app.store.as_ref()) == Route::RedirectToLogin
        {
            TerminalNavigator.redirect_to_login();
            return Err(ApiError::SessionExpired.into());
        }
    }

    match matches.subcommand() {
        Some(("login", sub)) => commands::auth::login(&app, sub)?,
        Some(("register", sub)) => commands::auth::register(&app, sub)?,
        Some(("logout", sub)) => commands::auth::logout(&app, sub)?,
        Some(("crop", sub)) => commands::crops::handle(&app, sub)?,
        Some(("activity", sub)) => commands::activities::handle(&app, sub)?,
        Some(("expense", sub)) => commands::expenses::handle(&app, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(&app, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&app, sub)?,
        Some(("budget", sub)) => commands::budget::handle(&app, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&app, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        // The navigator has already told the user to log in again.
        Err(e) if e.downcast_ref::<ApiError>().is_some_and(ApiError::is_session_expired) => {
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
