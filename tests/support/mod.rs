// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::IntoResponse;
use farmbook::api::ApiClient;
use farmbook::db::LocalStore;
use farmbook::models::UserInfo;
use farmbook::session::{Navigator, SessionStore};
use tokio::net::TcpListener;

/// Canned reply for `METHOD /api/<path>`.
#[derive(Clone)]
pub struct Stub {
    pub method: &'static str,
    pub path: &'static str,
    pub status: u16,
    pub body: String,
}

pub fn stub(method: &'static str, path: &'static str, status: u16, body: &str) -> Stub {
    Stub {
        method,
        path,
        status,
        body: body.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// Shared state for the stub handler.
struct StubState {
    stubs: Vec<Stub>,
    requests: Mutex<Vec<Recorded>>,
}

/// axum backend on a random local port, served from its own runtime
/// thread. Unknown routes get a 404.
pub struct TestServer {
    addr: String,
    state: Arc<StubState>,
}

impl TestServer {
    pub fn start(stubs: Vec<Stub>) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let state = Arc::new(StubState {
            stubs,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(reply).with_state(state.clone());
        thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });
        TestServer { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

async fn reply(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let path = uri.path().trim_start_matches("/api/").to_string();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().unwrap_or_default().to_string(),
        authorization,
        body,
    });

    let (status, body) = state
        .stubs
        .iter()
        .find(|s| s.method == method.as_str() && s.path == path)
        .map(|s| (s.status, s.body.clone()))
        .unwrap_or((404, r#"{"message":"not found"}"#.to_string()));
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}

/// Counts redirects instead of printing.
#[derive(Debug, Default)]
pub struct CountingNavigator(AtomicUsize);

impl CountingNavigator {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Navigator for CountingNavigator {
    fn redirect_to_login(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn user() -> UserInfo {
    UserInfo {
        username: "ravi".into(),
        email: "ravi@example.com".into(),
        role: None,
    }
}

pub struct Harness {
    pub server: TestServer,
    pub store: Arc<LocalStore>,
    pub navigator: Arc<CountingNavigator>,
    pub api: ApiClient,
}

/// Server + in-memory store, logged in with `token` when given.
pub fn harness(stubs: Vec<Stub>, token: Option<&str>) -> Harness {
    let server = TestServer::start(stubs);
    let store = Arc::new(LocalStore::in_memory().unwrap());
    if let Some(t) = token {
        store.save(t, &user()).unwrap();
    }
    let navigator = Arc::new(CountingNavigator::default());
    let api = ApiClient::new(&server.url(), store.clone(), navigator.clone()).unwrap();
    Harness {
        server,
        store,
        navigator,
        api,
    }
}
