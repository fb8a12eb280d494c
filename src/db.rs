// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::path::Path;
use tracing::debug;

use crate::models::UserInfo;
use crate::session::SessionStore;
use crate::settings::AppSettings;

pub const KEY_TOKEN: &str = "token";
pub const KEY_USER_INFO: &str = "userInfo";
pub const KEY_MONTHLY_BUDGET: &str = "monthlyBudget";
pub const KEY_SETTINGS: &str = "farmAppSettings";

/// Client-side key/value storage: credentials, budget and preferences.
pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn =
            Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(LocalStore {
            conn: Mutex::new(conn),
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let v: Option<String> = self
            .conn
            .lock()
            .query_row(
                "SELECT value FROM settings WHERE key=?1",
                params![key],
                |r| r.get(0),
            )
            .optional()?;
        Ok(v)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.lock().execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .lock()
            .execute("DELETE FROM settings WHERE key=?1", params![key])?;
        Ok(())
    }

    /// Zero when unset or unreadable; zero means "no budget".
    pub fn monthly_budget(&self) -> Result<Decimal> {
        Ok(self
            .get(KEY_MONTHLY_BUDGET)?
            .and_then(|s| s.trim().parse::<Decimal>().ok())
            .unwrap_or(Decimal::ZERO))
    }

    pub fn set_monthly_budget(&self, amount: Decimal) -> Result<()> {
        self.set(KEY_MONTHLY_BUDGET, &amount.to_string())
    }

    pub fn settings(&self) -> Result<AppSettings> {
        match self.get(KEY_SETTINGS)? {
            Some(raw) => serde_json::from_str(&raw).context("Stored settings are not valid JSON"),
            None => Ok(AppSettings::default()),
        }
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        self.set(KEY_SETTINGS, &serde_json::to_string(settings)?)
    }

    /// "Logout & clear data": credentials and preferences go, the budget stays.
    pub fn clear_all(&self) -> Result<()> {
        self.clear()?;
        self.remove(KEY_SETTINGS)
    }
}

impl SessionStore for LocalStore {
    fn token(&self) -> Option<String> {
        match self.get(KEY_TOKEN) {
            Ok(t) => t,
            Err(e) => {
                debug!("token lookup failed: {e:#}");
                None
            }
        }
    }

    fn user(&self) -> Option<UserInfo> {
        self.get(KEY_USER_INFO)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    fn save(&self, token: &str, user: &UserInfo) -> Result<()> {
        self.set(KEY_TOKEN, token)?;
        self.set(KEY_USER_INFO, &serde_json::to_string(user)?)
    }

    fn clear(&self) -> Result<()> {
        self.remove(KEY_TOKEN)?;
        self.remove(KEY_USER_INFO)
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    "#,
    )?;
    Ok(())
}
