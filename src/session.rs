// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Who is logged in, and what happens when that stops being true.
//!
//! The API client never reads ambient state: it is handed a [`SessionStore`]
//! to read the token from at call time, and a [`Navigator`] to send the user
//! back to login when the backend rejects that token.

use anyhow::Result;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::models::UserInfo;

pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn user(&self) -> Option<UserInfo>;
    fn save(&self, token: &str, user: &UserInfo) -> Result<()>;
    /// Forget the token and user info. Other local data is kept.
    fn clear(&self) -> Result<()>;
}

/// Where the user is sent when their credential is rejected.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Prints the login hint on stderr; the running command is then abandoned.
#[derive(Debug, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect_to_login(&self) {
        eprintln!("Session expired. Please run `farmbook login` to sign in again.");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Render(String),
    RedirectToLogin,
}

/// Gate for commands that need a logged-in user. Only presence of a token is
/// checked; an expired one surfaces on the first API call.
pub fn guard(store: &dyn SessionStore) -> Route {
    match store.token().filter(|t| !t.is_empty()) {
        Some(token) => {
            debug!("session guard: token present");
            Route::Render(token)
        }
        None => {
            debug!("session guard: no token, redirecting to login");
            Route::RedirectToLogin
        }
    }
}

/// Apply the forced-logout side effect. Failing to clear storage is logged,
/// never returned: the redirect must happen regardless.
pub fn expire(store: &dyn SessionStore, navigator: &dyn Navigator) {
    if let Err(e) = store.clear() {
        warn!("Failed to clear stored credentials: {e:#}");
    }
    navigator.redirect_to_login();
}

/// Session kept in memory only.
#[derive(Debug, Default)]
pub struct MemorySession {
    inner: Mutex<(Option<String>, Option<UserInfo>)>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        MemorySession {
            inner: Mutex::new((Some(token.to_string()), None)),
        }
    }
}

impl SessionStore for MemorySession {
    fn token(&self) -> Option<String> {
        self.inner.lock().0.clone()
    }

    fn user(&self) -> Option<UserInfo> {
        self.inner.lock().1.clone()
    }

    fn save(&self, token: &str, user: &UserInfo) -> Result<()> {
        *self.inner.lock() = (Some(token.to_string()), Some(user.clone()));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock() = (None, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_redirects_without_token() {
        let s = MemorySession::new();
        assert_eq!(guard(&s), Route::RedirectToLogin);
        let s = MemorySession::with_token("");
        assert_eq!(guard(&s), Route::RedirectToLogin);
    }

    #[test]
    fn guard_renders_with_any_token() {
        let s = MemorySession::with_token("not-even-a-jwt");
        assert_eq!(guard(&s), Route::Render("not-even-a-jwt".into()));
    }
}
