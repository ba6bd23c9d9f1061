// otactl/src/poller/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! OTA status polling.
//!
//! A single query updates the status label once. The recurring poll runs as
//! one background task; at most one such task exists per poller, and once
//! [`OtaStatusPoller::stop`] returns that task has finished and issues no
//! further requests.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use otactl_types::payload::{EcuRequest, OtaStatusResponse};
use otactl_types::Endpoint;

use crate::client::ApiClient;
use crate::error::{OtactlError, Result as OtactlResult};

/// Status label text while no state is shown.
pub const LABEL: &str = "Ota State";

struct PollTask {
    shutdown_tx: Option<broadcast::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

pub struct OtaStatusPoller {
    client: Arc<ApiClient>,
    ecu_id: String,
    interval: Duration,
    label_tx: Arc<watch::Sender<String>>,
    task: Option<PollTask>,
}

impl OtaStatusPoller {
    pub fn new(client: Arc<ApiClient>, ecu_id: impl Into<String>, interval: Duration) -> Self {
        let (label_tx, _) = watch::channel(LABEL.to_string());
        Self {
            client,
            ecu_id: ecu_id.into(),
            interval,
            label_tx: Arc::new(label_tx),
            task: None,
        }
    }

    /// Receiver following the status label.
    pub fn label(&self) -> watch::Receiver<String> {
        self.label_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Queries the state once. Does not touch the recurring poll.
    pub async fn poll_once(&self) -> OtactlResult<String> {
        poll(&self.client, &self.ecu_id, &self.label_tx).await
    }

    /// Starts the recurring poll; the first query goes out after one interval.
    pub fn start(&mut self) -> OtactlResult<()> {
        if self.task.is_some() {
            return Err(OtactlError::PollerAlreadyRunning);
        }

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
        let client = self.client.clone();
        let ecu_id = self.ecu_id.clone();
        let label_tx = self.label_tx.clone();
        let period = self.interval;

        let join_handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    result = poll(&client, &ecu_id, &label_tx) => {
                        if let Err(e) = result {
                            tracing::warn!(ecu_id = %ecu_id, "OTA status poll failed: {}", e);
                        }
                    }
                }
            }
            tracing::debug!("OTA status poll loop exited");
        });

        tracing::info!(ecu_id = %self.ecu_id, interval_ms = period.as_millis() as u64, "OTA status polling started");
        self.task = Some(PollTask {
            shutdown_tx: Some(shutdown_tx),
            join_handle: Some(join_handle),
        });
        Ok(())
    }

    /// Stops the recurring poll, waits for its task and resets the label.
    pub async fn stop(&mut self) -> OtactlResult<()> {
        let mut task = self.task.take().ok_or(OtactlError::PollerNotRunning)?;

        if let Some(tx) = task.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = task.join_handle.take() {
            handle.await?;
        }

        self.label_tx.send_replace(LABEL.to_string());
        tracing::info!("OTA status polling stopped");
        Ok(())
    }

    /// Starts when idle, stops when running. Returns whether polling is now on.
    pub async fn toggle(&mut self) -> OtactlResult<bool> {
        if self.is_running() {
            self.stop().await?;
        } else {
            self.start()?;
        }
        Ok(self.is_running())
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::debug!("Sending shutdown signal to OTA status poll on drop");
        }
    }
}

async fn poll(
    client: &ApiClient,
    ecu_id: &str,
    label_tx: &watch::Sender<String>,
) -> OtactlResult<String> {
    let body = serde_json::to_value(EcuRequest {
        ecu_id: ecu_id.to_string(),
    })?;
    let response = client.call(Endpoint::OtaStatus, Some(body)).await?;
    let status: OtaStatusResponse = serde_json::from_value(response)?;

    let state = status.state_text();
    label_tx.send_replace(format!("{}: {}", LABEL, state));
    Ok(state)
}
