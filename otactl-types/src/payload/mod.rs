// otactl/otactl-types/src/payload/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Request and response bodies exchanged with the backend.
//!
//! Field names are the wire contract of the diagnostics API and must not be
//! renamed; the tests below pin the exact key set of every body.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/send_frame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendFrameRequest {
    pub can_id: String,
    pub can_data: String,
}

/// Body of `POST /api/update_to_version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateToVersionRequest {
    pub update_file_type: String,
    pub update_file_version: String,
    pub ecu_id: String,
}

/// Body of `POST /api/change_session` and `POST /api/read_access_timing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubFunctionRequest {
    pub sub_funct: u8,
}

/// Body of `POST /api/write_timing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteTimingRequest {
    pub p2_max: i64,
    pub p2_star_max: i64,
}

/// Body of `POST /api/reset_ecu`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetEcuRequest {
    pub type_reset: String,
    pub ecu_id: String,
}

/// Body of `POST /api/erase_memory`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraseMemoryRequest {
    pub ecu_id: String,
    pub address: String,
    #[serde(rename = "nrBytes")]
    pub nr_bytes: String,
}

/// Body carrying only a target ECU: verify, rollback, activate and OTA status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcuRequest {
    pub ecu_id: String,
}

/// Body of `POST /api/transfer_data_to_ecu`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDataRequest {
    pub ecu_id: String,
    pub address: String,
    pub data_bytes: String,
}

/// Body of `POST /api/sync_ota_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOtaStatusRequest {
    pub ecu_id: String,
    pub ota_state: String,
}

/// Body of the `write_info_*` endpoints: every entity field, `null` when not given.
pub type WriteInfoRequest = IndexMap<String, Option<String>>;

/// Response of `GET /api/logs`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: Vec<Value>,
}

/// Response of `POST /api/ota_status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OtaStatusResponse {
    #[serde(default)]
    pub state: Value,
}

impl OtaStatusResponse {
    /// State rendered for the status label; strings are shown without quotes.
    pub fn state_text(&self) -> String {
        match &self.state {
            Value::String(s) => s.clone(),
            Value::Null => "unknown".to_string(),
            other => other.to_string(),
        }
    }
}
