// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod support;

use farmbook::screens::{ActivityForm, CropForm, EntityScreen, ExpenseForm, ScreenState};
use support::{harness, stub};

const CROPS: &str = r#"[
  {"id":1,"name":"Wheat","variety":"HD-2967","area":2.5,"plantingDate":"2025-01-10","harvestDate":null,"notes":null},
  {"id":2,"name":"Rice","variety":"Basmati","area":1.5,"plantingDate":"2024-07-01","harvestDate":"2024-11-20","notes":"east field"}
]"#;

#[test]
fn load_fills_items_and_goes_idle() {
    let h = harness(vec![stub("GET", "crops", 200, CROPS)], Some("tok"));
    let mut screen = EntityScreen::<CropForm>::new();
    assert_eq!(screen.state(), &ScreenState::Loading);
    screen.load(&h.api).unwrap();
    assert_eq!(screen.state(), &ScreenState::Idle);
    assert_eq!(screen.items().len(), 2);
    assert_eq!(screen.error(), None);
}

#[test]
fn failed_load_shows_empty_list_with_message() {
    let h = harness(vec![stub("GET", "expenses", 500, "")], Some("tok"));
    let mut screen = EntityScreen::<ExpenseForm>::new();
    screen.load(&h.api).unwrap();
    assert!(screen.items().is_empty());
    assert_eq!(screen.error(), Some("Failed to fetch expenses"));
}

#[test]
fn submit_is_gated_on_required_fields() {
    let mut screen = EntityScreen::<ExpenseForm>::new();
    screen.begin_add();
    assert!(!screen.can_submit());
    screen.edit_field("expenseTitle", "Diesel").unwrap();
    screen.edit_field("amount", "not a number").unwrap();
    screen.edit_field("category", "Fuel").unwrap();
    screen.edit_field("expenseDate", "2025-03-02").unwrap();
    assert!(screen.can_submit());
    match screen.state() {
        ScreenState::Editing { form, .. } => assert!(form.amount.is_zero()),
        other => panic!("unexpected state {other:?}"),
    }
}

#[test]
fn successful_add_refetches_and_notifies() {
    let h = harness(
        vec![
            stub(
                "POST",
                "activities",
                200,
                r#"{"id":5,"type":"Weeding","description":"","date":"2025-03-03","crop":{"id":1,"name":"Wheat"}}"#,
            ),
            stub(
                "GET",
                "activities",
                200,
                r#"[{"id":5,"type":"Weeding","description":"","date":"2025-03-03","crop":{"id":1,"name":"Wheat"}}]"#,
            ),
        ],
        Some("tok"),
    );
    let mut screen = EntityScreen::<ActivityForm>::new();
    screen.begin_add();
    screen.edit_field("type", "Weeding").unwrap();
    screen.edit_field("date", "2025-03-03").unwrap();
    screen.edit_field("cropId", "1").unwrap();
    screen.submit(&h.api).unwrap();

    assert_eq!(screen.state(), &ScreenState::Idle);
    assert_eq!(screen.items().len(), 1);
    assert_eq!(screen.notice(), Some("Activity added successfully!"));

    let sent: serde_json::Value =
        serde_json::from_str(&h.server.requests_to("activities")[0].body).unwrap();
    assert_eq!(sent["cropId"], 1);
    assert_eq!(sent["crop"]["id"], 1);
}

#[test]
fn failed_submit_keeps_the_form_open() {
    let h = harness(
        vec![
            stub("GET", "crops", 200, CROPS),
            stub("PUT", "crops/1", 400, r#"{"message":"Area must be positive"}"#),
        ],
        Some("tok"),
    );
    let mut screen = EntityScreen::<CropForm>::new();
    screen.load(&h.api).unwrap();
    assert!(screen.begin_edit(1));
    screen.edit_field("area", "-1").unwrap();
    screen.submit(&h.api).unwrap();
    match screen.state() {
        ScreenState::Editing {
            target,
            form,
            error,
        } => {
            assert_eq!(*target, Some(1));
            assert_eq!(form.name, "Wheat");
            assert_eq!(error.as_deref(), Some("Area must be positive"));
        }
        other => panic!("unexpected state {other:?}"),
    }
}

#[test]
fn begin_edit_of_unknown_id_is_refused() {
    let h = harness(vec![stub("GET", "crops", 200, CROPS)], Some("tok"));
    let mut screen = EntityScreen::<CropForm>::new();
    screen.load(&h.api).unwrap();
    assert!(!screen.begin_edit(99));
    assert_eq!(screen.state(), &ScreenState::Idle);
}

#[test]
fn declined_delete_sends_nothing() {
    let h = harness(vec![stub("DELETE", "crops/1", 204, "")], Some("tok"));
    let mut screen = EntityScreen::<CropForm>::new();
    let deleted = screen.delete(&h.api, 1, &|_: &str| false).unwrap();
    assert!(!deleted);
    assert!(h.server.requests().is_empty());
}

#[test]
fn confirmed_delete_refetches() {
    let h = harness(
        vec![
            stub("DELETE", "crops/2", 204, ""),
            stub("GET", "crops", 200, "[]"),
        ],
        Some("tok"),
    );
    let mut screen = EntityScreen::<CropForm>::new();
    let deleted = screen.delete(&h.api, 2, &|_: &str| true).unwrap();
    assert!(deleted);
    assert_eq!(screen.notice(), Some("Crop deleted successfully!"));
    assert_eq!(h.server.requests_to("crops").len(), 1);
}

#[test]
fn expired_session_during_submit_escalates() {
    let h = harness(vec![stub("POST", "crops", 401, "")], Some("tok"));
    let mut screen = EntityScreen::<CropForm>::new();
    screen.begin_add();
    screen.edit_field("name", "Maize").unwrap();
    screen.edit_field("variety", "Hybrid").unwrap();
    screen.edit_field("area", "3").unwrap();
    screen.edit_field("plantingDate", "2025-02-01").unwrap();
    assert!(screen.submit(&h.api).unwrap_err().is_session_expired());
    assert_eq!(h.navigator.count(), 1);
}
