// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client-side preferences. Never synced to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub notifications: bool,
    pub auto_save: bool,
    pub dark_mode: bool,
    pub language: String,
    pub currency: String,
    pub date_format: String,
    pub timezone: String,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub data_backup: bool,
    pub analytics_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            notifications: true,
            auto_save: true,
            dark_mode: false,
            language: "en".into(),
            currency: "INR".into(),
            date_format: "DD/MM/YYYY".into(),
            timezone: "Asia/Kolkata".into(),
            email_notifications: false,
            sms_notifications: false,
            data_backup: true,
            analytics_enabled: true,
        }
    }
}

impl AppSettings {
    /// Set one preference by its stored (camelCase) key. Booleans accept
    /// true/false, yes/no, on/off and 1/0.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<()> {
        let mut doc = serde_json::to_value(&*self)?;
        let map = doc
            .as_object_mut()
            .ok_or_else(|| anyhow!("settings are not an object"))?;
        let slot = map
            .get_mut(key)
            .ok_or_else(|| anyhow!("Unknown setting '{}'", key))?;
        *slot = match slot {
            Value::Bool(_) => Value::Bool(parse_flag(raw)?),
            _ => Value::String(raw.trim().to_string()),
        };
        *self = serde_json::from_value(doc)?;
        Ok(())
    }

    /// `(key, value)` pairs sorted by key, for display.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let doc = serde_json::to_value(self)?;
        let map = doc
            .as_object()
            .ok_or_else(|| anyhow!("settings are not an object"))?;
        Ok(map
            .iter()
            .map(|(k, v)| {
                let shown = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), shown)
            })
            .collect())
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(anyhow!("Expected a boolean, got '{}'", other)),
    }
}
