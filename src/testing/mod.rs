// otactl/src/testing/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Test helpers: an in-process stub of the diagnostics backend and a shared
//! output buffer standing in for the terminal.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::client::ApiClient;
use crate::display::Panel;

/// Writer collecting everything written to it.
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
    pub content_type: Option<String>,
}

#[derive(Clone)]
struct StubState {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    overrides: Arc<HashMap<String, (StatusCode, String)>>,
    ota_state: Arc<Mutex<Value>>,
}

pub(crate) struct StubBackend {
    pub base_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    ota_state: Arc<Mutex<Value>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl StubBackend {
    pub(crate) async fn spawn() -> StubBackend {
        Self::spawn_with(HashMap::new()).await
    }

    /// Spawns a stub answering `path` with a fixed status and raw body.
    pub(crate) async fn spawn_with(overrides: HashMap<String, (StatusCode, String)>) -> StubBackend {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let ota_state = Arc::new(Mutex::new(json!("IDLE")));
        let state = StubState {
            calls: calls.clone(),
            overrides: Arc::new(overrides),
            ota_state: ota_state.clone(),
        };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });

        StubBackend {
            base_url: format!("http://{addr}"),
            calls,
            ota_state,
            shutdown: Some(shutdown_tx),
        }
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls except the log refreshes that follow every request.
    pub(crate) fn requests(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.path != "/api/logs")
            .collect()
    }

    pub(crate) fn count(&self, path: &str) -> usize {
        self.calls().iter().filter(|c| c.path == path).count()
    }

    pub(crate) fn set_ota_state(&self, state: Value) {
        *self.ota_state.lock().unwrap() = state;
    }

    pub(crate) fn client(&self, out: SharedBuffer) -> ApiClient {
        ApiClient::new(
            &self.base_url,
            Duration::from_secs(5),
            Arc::new(Mutex::new(Panel::new(Box::new(out)))),
        )
        .unwrap()
    }

    pub(crate) fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn handle(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: axum::http::HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let call = RecordedCall {
        method: method.to_string(),
        path: path.clone(),
        body: serde_json::from_slice(&body).ok(),
        content_type: headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    state.calls.lock().unwrap().push(call);

    if let Some((status, body)) = state.overrides.get(&path) {
        return (*status, body.clone()).into_response();
    }

    match path.as_str() {
        "/api/logs" => {
            let logs: Vec<String> = state
                .calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.path != "/api/logs")
                .map(|c| format!("{} {}", c.method, c.path))
                .collect();
            Json(json!({ "logs": logs })).into_response()
        }
        "/api/ota_status" => {
            let ota_state = state.ota_state.lock().unwrap().clone();
            Json(json!({ "state": ota_state })).into_response()
        }
        _ => Json(json!({ "status": "ok", "path": path })).into_response(),
    }
}
