// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use reqwest::StatusCode;
use reqwest::blocking::{RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::models::{
    Activity, ActivityDraft, AuthResponse, Crop, CropDraft, Expense, ExpenseDraft, LoginRequest,
    NamedValue, RegisterRequest, UserInfo,
};
use crate::session::{self, Navigator, SessionStore};

/// A backend collection exposed under `/<PATH>` and `/<PATH>/{id}`.
pub trait Resource {
    const PATH: &'static str;
    const LABEL: &'static str;
    type Item: DeserializeOwned + Serialize + Clone + Send;
    type Draft: Serialize;

    fn id_of(item: &Self::Item) -> Option<i64>;
}

pub struct Crops;
pub struct Activities;
pub struct Expenses;

impl Resource for Crops {
    const PATH: &'static str = "crops";
    const LABEL: &'static str = "Crop";
    type Item = Crop;
    type Draft = CropDraft;

    fn id_of(item: &Crop) -> Option<i64> {
        item.id
    }
}

impl Resource for Activities {
    const PATH: &'static str = "activities";
    const LABEL: &'static str = "Activity";
    type Item = Activity;
    type Draft = ActivityDraft;

    fn id_of(item: &Activity) -> Option<i64> {
        item.id
    }
}

impl Resource for Expenses {
    const PATH: &'static str = "expenses";
    const LABEL: &'static str = "Expense";
    type Item = Expense;
    type Draft = ExpenseDraft;

    fn id_of(item: &Expense) -> Option<i64> {
        item.id
    }
}

/// Blocking client for the farm backend.
///
/// Every request carries the bearer token read from the session store at
/// call time. A 401/403 on any authenticated call clears the session and
/// redirects to login before [`ApiError::SessionExpired`] is returned.
/// Concurrent rejections of the same token redirect only once.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    /// Serialises forced logouts across clones.
    expiry: Arc<Mutex<()>>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> anyhow::Result<Self> {
        Ok(ApiClient {
            http: crate::utils::http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            navigator,
            expiry: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        self.dispatch(req, true)
    }

    fn dispatch(&self, req: RequestBuilder, escalate_auth: bool) -> Result<Response, ApiError> {
        let token = self.session.token();
        debug!(
            token = if token.is_some() { "present" } else { "missing" },
            "sending request"
        );
        let req = match &token {
            Some(t) => req.bearer_auth(t),
            None => req,
        };
        let resp = req.send()?;
        let status = resp.status();
        if escalate_auth && (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN)
        {
            self.expire_once(token, status);
            return Err(ApiError::SessionExpired);
        }
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            debug!(%status, "request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }
        Ok(resp)
    }

    /// Log out only while the rejected token is still the stored one. A
    /// request sent without a token, or whose token a concurrent request
    /// already cleared, never redirects.
    fn expire_once(&self, sent: Option<String>, status: StatusCode) {
        let _guard = self.expiry.lock();
        if sent.is_none() || self.session.token() != sent {
            debug!(%status, "session already cleared");
            return;
        }
        warn!(%status, "credential rejected, logging out");
        session::expire(self.session.as_ref(), self.navigator.as_ref());
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let req = self.http.get(self.url(path)).query(query);
        Ok(self.send(req)?.json::<T>()?)
    }

    // ---- auth ----

    /// Bad credentials come back as a plain error here, not as a session
    /// expiry: there is no session to expire yet.
    pub fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let req = self.http.post(self.url("auth/login")).json(&body);
        let resp: AuthResponse = self.dispatch(req, false)?.json()?;
        if let Err(e) = self.session.save(&resp.token, &UserInfo::from(&resp)) {
            warn!("Failed to persist session: {e:#}");
        }
        Ok(resp)
    }

    pub fn register(&self, request: &RegisterRequest) -> Result<String, ApiError> {
        let req = self.http.post(self.url("auth/register")).json(request);
        let body = self.dispatch(req, false)?.text()?;
        Ok(server_message(&body).unwrap_or_else(|| "User registered".to_string()))
    }

    // ---- resources ----

    pub fn list<R: Resource>(&self) -> Result<Vec<R::Item>, ApiError> {
        self.get_json(R::PATH, &[])
    }

    pub fn get<R: Resource>(&self, id: i64) -> Result<R::Item, ApiError> {
        self.get_json(&format!("{}/{}", R::PATH, id), &[])
    }

    pub fn create<R: Resource>(&self, draft: &R::Draft) -> Result<R::Item, ApiError> {
        let req = self.http.post(self.url(R::PATH)).json(draft);
        Ok(self.send(req)?.json()?)
    }

    pub fn update<R: Resource>(&self, id: i64, draft: &R::Draft) -> Result<R::Item, ApiError> {
        let req = self
            .http
            .put(self.url(&format!("{}/{}", R::PATH, id)))
            .json(draft);
        Ok(self.send(req)?.json()?)
    }

    pub fn delete<R: Resource>(&self, id: i64) -> Result<(), ApiError> {
        let req = self.http.delete(self.url(&format!("{}/{}", R::PATH, id)));
        self.send(req)?;
        Ok(())
    }

    // ---- reports ----

    pub fn upcoming_activities(&self, days: u32) -> Result<Vec<Activity>, ApiError> {
        self.get_json("activities/upcoming", &[("days", days.to_string())])
    }

    pub fn expenses_by_category(&self) -> Result<Vec<NamedValue>, ApiError> {
        self.breakdown("expenses/report/category")
    }

    pub fn activities_by_crop(&self) -> Result<Vec<NamedValue>, ApiError> {
        self.breakdown("activities/report/crop")
    }

    pub fn activities_by_type(&self) -> Result<Vec<NamedValue>, ApiError> {
        self.breakdown("activities/report/type")
    }

    pub fn expense_total_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Decimal, ApiError> {
        let total: Option<f64> = self.get_json(
            "expenses/report/date-range",
            &[("start", start.to_string()), ("end", end.to_string())],
        )?;
        let total = total.unwrap_or(0.0);
        Decimal::try_from(total)
            .map_err(|_| ApiError::Malformed(format!("expense total '{}' is not a number", total)))
    }

    fn breakdown(&self, path: &str) -> Result<Vec<NamedValue>, ApiError> {
        let raw: BTreeMap<String, f64> = self.get_json(path, &[])?;
        Ok(to_named_values(raw))
    }
}

/// Largest first; ties broken by name so output is stable.
pub fn to_named_values(raw: BTreeMap<String, f64>) -> Vec<NamedValue> {
    let mut items: Vec<NamedValue> = raw
        .into_iter()
        .map(|(name, value)| NamedValue { name, value })
        .collect();
    items.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    items
}

/// Pull a human message out of an error or acknowledgement body.
fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
        Ok(serde_json::Value::String(s)) => Some(s),
        _ => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_prefers_message_field() {
        assert_eq!(
            server_message(r#"{"message":"User registered"}"#).as_deref(),
            Some("User registered")
        );
        assert_eq!(
            server_message(r#"{"error":"Bad Request","status":400}"#).as_deref(),
            Some("Bad Request")
        );
        assert_eq!(server_message("plain text").as_deref(), Some("plain text"));
        assert_eq!(server_message("  "), None);
        assert_eq!(server_message(r#"{"status":500}"#), None);
    }

    #[test]
    fn breakdown_sorted_by_value_then_name() {
        let mut raw = BTreeMap::new();
        raw.insert("Fuel".to_string(), 10.0);
        raw.insert("Labor".to_string(), 40.0);
        raw.insert("Equipment".to_string(), 10.0);
        let names: Vec<String> = to_named_values(raw).into_iter().map(|n| n.name).collect();
        assert_eq!(names, ["Labor", "Equipment", "Fuel"]);
    }
}
