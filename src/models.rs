// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const ACTIVITY_TYPES: [&str; 10] = [
    "Planting",
    "Fertilizing",
    "Irrigation",
    "Pest Control",
    "Harvesting",
    "Equipment Maintenance",
    "Soil Testing",
    "Weeding",
    "Pruning",
    "Other",
];

pub const EXPENSE_CATEGORIES: [&str; 10] = [
    "Seeds & Plants",
    "Fertilizers",
    "Pesticides",
    "Equipment",
    "Labor",
    "Fuel",
    "Utilities",
    "Insurance",
    "Maintenance",
    "Other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Farmer,
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(UserRole::Admin),
            "FARMER" => Ok(UserRole::Farmer),
            other => Err(format!("Unknown role '{}' (use ADMIN|FARMER)", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: Option<UserRole>,
}

/// What we keep locally about the logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub email: String,
    pub role: Option<UserRole>,
}

impl From<&AuthResponse> for UserInfo {
    fn from(r: &AuthResponse) -> Self {
        UserInfo {
            username: r.username.clone(),
            email: r.email.clone(),
            role: r.role,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub variety: String,
    #[serde(default)]
    pub area: f64,
    pub planting_date: Option<NaiveDate>,
    pub harvest_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Crop {
    /// A crop stays active until its harvest date has passed.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.harvest_date.is_none_or(|h| h > today)
    }
}

/// The crop as embedded inside an activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CropRef {
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Option<i64>,
    #[serde(default)]
    pub r#type: String,
    #[serde(default)]
    pub description: String,
    pub date: Option<NaiveDate>,
    pub crop: Option<CropRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Activity {
    pub fn crop_name(&self) -> Option<&str> {
        self.crop
            .as_ref()
            .map(|c| c.name.as_str())
            .filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Option<i64>,
    #[serde(default)]
    pub expense_title: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub category: String,
    pub description: Option<String>,
    pub expense_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Expense {
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropDraft {
    pub name: String,
    pub variety: String,
    pub area: f64,
    pub planting_date: NaiveDate,
    pub harvest_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropId {
    pub id: i64,
}

/// Sent with both `cropId` and a `crop` stub so the backend can bind either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDraft {
    pub r#type: String,
    pub description: String,
    pub date: NaiveDate,
    pub crop_id: i64,
    pub crop: CropId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    pub expense_title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
}

/// One slice of a report breakdown (category -> sum, crop -> count, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
