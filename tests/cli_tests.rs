// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod support;

use std::sync::Arc;

use farmbook::cli;
use farmbook::commands::{App, auth, exporter};
use farmbook::config::Config;
use farmbook::db::LocalStore;
use farmbook::export::decode_delimited;
use farmbook::session::SessionStore;
use support::{CountingNavigator, TestServer, stub, user};
use tempfile::tempdir;

fn app_for(server: &TestServer, data_dir: &std::path::Path) -> App {
    let config = Config {
        api_url: server.url(),
        data_dir: data_dir.to_path_buf(),
    };
    let store = Arc::new(LocalStore::open(&config.db_path().unwrap()).unwrap());
    store.save("tok", &user()).unwrap();
    App::with_navigator(config, store, Arc::new(CountingNavigator::default())).unwrap()
}

#[test]
fn dashboard_flags_parse() {
    let m = cli::build_cli()
        .try_get_matches_from([
            "farmbook",
            "dashboard",
            "--year",
            "2024",
            "--range",
            "week",
            "--crop",
            "Wheat",
            "--json",
        ])
        .unwrap();
    let (name, sub) = m.subcommand().unwrap();
    assert_eq!(name, "dashboard");
    assert_eq!(sub.get_one::<i32>("year"), Some(&2024));
    assert_eq!(sub.get_one::<String>("crop").map(String::as_str), Some("Wheat"));
    assert!(sub.get_flag("json"));
}

#[test]
fn add_requires_the_mandatory_fields() {
    let res = cli::build_cli().try_get_matches_from(["farmbook", "crop", "add", "--name", "Wheat"]);
    assert!(res.is_err());
    let res = cli::build_cli().try_get_matches_from([
        "farmbook", "expense", "edit", "4", "--amount", "20",
    ]);
    assert!(res.is_ok());
}

#[test]
fn export_writes_the_filtered_expenses() {
    let server = TestServer::start(vec![stub(
        "GET",
        "expenses",
        200,
        r#"[
          {"id":1,"expenseTitle":"Diesel","amount":50,"category":"Fuel","expenseDate":"2025-03-01"},
          {"id":2,"expenseTitle":"Urea","amount":800,"category":"Fertilizers","expenseDate":"2025-03-02"}
        ]"#,
    )]);
    let data = tempdir().unwrap();
    let out = tempdir().unwrap();
    let app = app_for(&server, data.path());
    let out_str = out.path().to_string_lossy().to_string();

    let matches = cli::build_cli().get_matches_from([
        "farmbook",
        "export",
        "expenses",
        "--format",
        "csv",
        "--out",
        &out_str,
        "--range",
        "custom",
        "--category",
        "Fuel",
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&app, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let text = std::fs::read_to_string(out.path().join("expenses.csv")).unwrap();
    let rows = decode_delimited(&text).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][1], "Diesel");
    assert_eq!(rows[1][2], "50.00");
}

#[test]
fn export_rejects_unknown_format() {
    let server = TestServer::start(Vec::new());
    let data = tempdir().unwrap();
    let out = tempdir().unwrap();
    let app = app_for(&server, data.path());
    let out_str = out.path().to_string_lossy().to_string();

    let matches = cli::build_cli().get_matches_from([
        "farmbook", "export", "all", "--format", "xml", "--out", &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        assert!(exporter::handle(&app, export_m).is_err());
    } else {
        panic!("no export subcommand");
    }
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    assert!(server.requests().is_empty());
}

#[test]
fn logout_forgets_the_session() {
    let server = TestServer::start(Vec::new());
    let data = tempdir().unwrap();
    let app = app_for(&server, data.path());

    let matches = cli::build_cli().get_matches_from(["farmbook", "logout"]);
    if let Some(("logout", sub)) = matches.subcommand() {
        auth::logout(&app, sub).unwrap();
    } else {
        panic!("no logout subcommand");
    }
    assert_eq!(app.store.token(), None);
}
