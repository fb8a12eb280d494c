// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use super::App;
use crate::models::{RegisterRequest, UserRole};
use crate::session::SessionStore;

pub fn login(app: &App, m: &clap::ArgMatches) -> Result<()> {
    let username = m.get_one::<String>("username").unwrap();
    let password = m.get_one::<String>("password").unwrap();
    let resp = app
        .api
        .login(username, password)
        .context("Login failed")?;
    println!("Logged in as {}", resp.username);
    Ok(())
}

pub fn register(app: &App, m: &clap::ArgMatches) -> Result<()> {
    let role = m
        .get_one::<String>("role")
        .map(|r| r.parse::<UserRole>())
        .transpose()
        .map_err(anyhow::Error::msg)?;
    let request = RegisterRequest {
        username: m.get_one::<String>("username").unwrap().clone(),
        email: m.get_one::<String>("email").unwrap().clone(),
        password: m.get_one::<String>("password").unwrap().clone(),
        role,
    };
    let msg = app
        .api
        .register(&request)
        .context("Registration failed")?;
    println!("{}", msg);
    println!("You can now run `farmbook login`.");
    Ok(())
}

pub fn logout(app: &App, m: &clap::ArgMatches) -> Result<()> {
    if m.get_flag("clear-settings") {
        app.store.clear_all()?;
        println!("Logged out; preferences reset");
    } else {
        app.store.clear()?;
        println!("Logged out");
    }
    Ok(())
}
