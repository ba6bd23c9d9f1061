// otactl/src/client/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! HTTP client for the diagnostics backend.
//!
//! [`ApiClient::call`] is the single request path used by every command: it
//! sends the request, renders the JSON answer into the [`Panel`] and then
//! refreshes the log table. Failures come back as typed errors; nothing is
//! retried.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use otactl_types::payload::LogsResponse;
use otactl_types::{Endpoint, Method};

use crate::display::Panel;
use crate::error::{OtactlError, Result as OtactlResult};

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    panel: Arc<Mutex<Panel>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, panel: Arc<Mutex<Panel>>) -> OtactlResult<Self> {
        let base_url = normalize_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OtactlError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { base_url, http, panel })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Sends one request, renders the response and refreshes the log table.
    pub async fn call(&self, endpoint: Endpoint, body: Option<Value>) -> OtactlResult<Value> {
        let response = self.send(&endpoint, body.as_ref()).await?;
        self.with_panel(|panel| panel.render_response(&endpoint, &response))?;
        self.refresh_logs_after(&endpoint).await;
        Ok(response)
    }

    /// Like [`ApiClient::call`], but renders the response on a single line.
    pub async fn call_compact(&self, endpoint: Endpoint, body: Option<Value>) -> OtactlResult<Value> {
        let response = self.send(&endpoint, body.as_ref()).await?;
        self.with_panel(|panel| panel.render_response_compact(&endpoint, &response))?;
        self.refresh_logs_after(&endpoint).await;
        Ok(response)
    }

    /// Fetches `/api/logs` and replaces the rendered log table.
    pub async fn refresh_logs(&self) -> OtactlResult<Vec<Value>> {
        let response = self.send(&Endpoint::Logs, None).await?;
        let logs: LogsResponse = serde_json::from_value(response)?;
        self.with_panel(|panel| panel.render_logs(&logs.logs))?;
        Ok(logs.logs)
    }

    pub fn notice(&self, message: &str) -> OtactlResult<()> {
        self.with_panel(|panel| panel.render_notice(message))
    }

    pub fn label(&self, label: &str) -> OtactlResult<()> {
        self.with_panel(|panel| panel.render_label(label))
    }

    pub fn block(&self, title: &str, body: &str) -> OtactlResult<()> {
        self.with_panel(|panel| panel.block(title, body))
    }

    async fn refresh_logs_after(&self, endpoint: &Endpoint) {
        if let Err(e) = self.refresh_logs().await {
            tracing::warn!(after = %endpoint, "Log refresh failed: {}", e);
        }
    }

    fn with_panel<F>(&self, render: F) -> OtactlResult<()>
    where
        F: FnOnce(&mut Panel) -> io::Result<()>,
    {
        let mut panel = self
            .panel
            .lock()
            .map_err(|_| OtactlError::Internal("display panel lock poisoned".into()))?;
        render(&mut panel).map_err(OtactlError::from)
    }

    async fn send(&self, endpoint: &Endpoint, body: Option<&Value>) -> OtactlResult<Value> {
        let url = self.url(endpoint);
        let path = endpoint.path();

        let mut request = match endpoint.method() {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        }
        .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(method = %endpoint.method(), path, "Sending request");

        let response = request.send().await.map_err(|e| {
            tracing::error!(path, "Request failed: {}", e);
            OtactlError::Request {
                path: path.to_string(),
                message: e.to_string(),
            }
        })?;

        decode_json_response(path, response).await
    }
}

fn normalize_base_url(base_url: &str) -> OtactlResult<String> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(OtactlError::Config("api.base_url is empty".into()));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Parses the body as JSON whatever the status; the backend reports ECU-level
/// failures inside JSON bodies that must still reach the operator.
async fn decode_json_response(path: &str, response: reqwest::Response) -> OtactlResult<Value> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(|e| OtactlError::Read {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    let value = serde_json::from_slice::<Value>(&bytes).map_err(|e| {
        tracing::error!(path, status = status.as_u16(), "Response is not JSON: {}", e);
        OtactlError::Decode {
            path: path.to_string(),
            status: status.as_u16(),
            message: e.to_string(),
        }
    })?;

    if !status.is_success() {
        tracing::warn!(path, status = status.as_u16(), "Backend answered with an error status");
    }
    Ok(value)
}
