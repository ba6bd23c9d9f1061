// otactl/otactl-types/src/dispatch/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Validation and routing of submitted routine / OTA action forms.
//!
//! Submitting a form is two steps:
//!
//! 1. [`collect`] checks every input against the rule table and copies the
//!    ones that pass into an ordered payload. Each input is judged on its own:
//!    a rejected input is left out and reported, the rest are still collected.
//! 2. [`route`] maps the template to its endpoint and reshapes the generic
//!    input ids into the field names that endpoint expects. A required field
//!    that was left out makes the whole submission fail, so a partial request
//!    is never produced.

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

use crate::endpoint::Endpoint;
use crate::payload::{
    EcuRequest, EraseMemoryRequest, SyncOtaStatusRequest, TransferDataRequest,
    UpdateToVersionRequest,
};
use crate::template::{field, Template};

/// ECU ids a form may address.
pub const VALID_ECU_IDS: [u64; 5] = [0x10, 0x11, 0x12, 0x13, 0x14];

/// Lowest address the erase routine may start at.
pub const MIN_ERASE_ADDRESS: u64 = 0x0800;

/// Inputs exempt from the `0x` hexadecimal format check.
const TEXTUAL_FIELDS: [&str; 2] = [field::FILE_TYPE, field::SOFTWARE_VERSION];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("'{0}' is not a 0x-prefixed hexadecimal value")]
    NotHex(String),

    #[error("ECU {0} is not one of 0x10, 0x11, 0x12, 0x13, 0x14")]
    EcuNotAllowed(String),

    #[error("software version '{0}' must be <1-16>.<0-15>")]
    SoftwareVersion(String),

    #[error("address {0} is below 0x0800")]
    AddressTooLow(String),

    #[error("size {0} must be greater than zero")]
    ZeroSize(String),
}

/// An input left out of the payload, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRejection {
    pub id: String,
    pub error: FieldError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldRule {
    EcuId,
    SoftwareVersion,
    MinAddress(u64),
    NonZero,
    Unconstrained,
}

/// Additional checks applied after the format check, keyed by input id.
const RULES: &[(&str, FieldRule)] = &[
    (field::RECEIVER_ECU, FieldRule::EcuId),
    (field::TARGET_ECU, FieldRule::EcuId),
    (field::SOFTWARE_VERSION, FieldRule::SoftwareVersion),
    (field::ADDRESS_ERASE, FieldRule::MinAddress(MIN_ERASE_ADDRESS)),
    (field::SIZE, FieldRule::NonZero),
    (field::ADDRESS_UPDATE, FieldRule::Unconstrained),
    (field::ADDRESS_TRANSFER, FieldRule::Unconstrained),
    (field::DATA, FieldRule::Unconstrained),
    (field::FILE_TYPE, FieldRule::Unconstrained),
    (field::OTA_STATE, FieldRule::Unconstrained),
];

fn rule_for(id: &str) -> FieldRule {
    RULES
        .iter()
        .find(|(rule_id, _)| *rule_id == id)
        .map(|(_, rule)| *rule)
        .unwrap_or(FieldRule::Unconstrained)
}

fn hex_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0x[0-9A-Fa-f]+$").unwrap())
}

fn software_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[1-9]|1[0-6])\.(?:[0-9]|1[0-5])$").unwrap())
}

/// Parses a `0x`-prefixed hexadecimal value. `None` when the format is wrong
/// or the value does not fit in 64 bits.
pub fn parse_hex(value: &str) -> Option<u64> {
    if !hex_regex().is_match(value) {
        return None;
    }
    u64::from_str_radix(&value[2..], 16).ok()
}

/// Checks one input against the format check and its rule.
///
/// The format check is the pattern alone, so values of any length pass it.
/// Rules that compare numbers treat a value too wide for 64 bits as larger
/// than any bound.
pub fn validate_field(id: &str, value: &str) -> Result<(), FieldError> {
    if !TEXTUAL_FIELDS.contains(&id) && !hex_regex().is_match(value) {
        return Err(FieldError::NotHex(value.to_string()));
    }

    match rule_for(id) {
        FieldRule::EcuId => match parse_hex(value) {
            Some(n) if VALID_ECU_IDS.contains(&n) => Ok(()),
            _ => Err(FieldError::EcuNotAllowed(value.to_string())),
        },
        FieldRule::SoftwareVersion if !software_version_regex().is_match(value) => {
            Err(FieldError::SoftwareVersion(value.to_string()))
        }
        FieldRule::MinAddress(min) => match parse_hex(value) {
            Some(n) if n < min => Err(FieldError::AddressTooLow(value.to_string())),
            _ => Ok(()),
        },
        FieldRule::NonZero if value[2..].bytes().all(|b| b == b'0') => {
            Err(FieldError::ZeroSize(value.to_string()))
        }
        _ => Ok(()),
    }
}

/// Result of validating a submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    /// Inputs that passed, keyed by input id, in form order.
    pub payload: IndexMap<String, String>,
    pub rejected: Vec<FieldRejection>,
}

impl Submission {
    pub fn is_valid(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Validates every `(id, value)` input in order.
pub fn collect<I, K, V>(inputs: I) -> Submission
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut submission = Submission::default();
    for (id, value) in inputs {
        let (id, value) = (id.as_ref(), value.as_ref());
        match validate_field(id, value) {
            Ok(()) => {
                submission.payload.insert(id.to_string(), value.to_string());
            }
            Err(error) => submission.rejected.push(FieldRejection {
                id: id.to_string(),
                error,
            }),
        }
    }
    submission
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("{0} has no backend endpoint wired")]
    Unsupported(Template),

    #[error("{template} requires a valid '{field}' value")]
    MissingField {
        template: Template,
        field: &'static str,
    },

    #[error("failed to encode request body: {0}")]
    Encode(String),
}

/// Endpoint and reshaped body for a submitted template.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchTarget {
    pub endpoint: Endpoint,
    pub body: Value,
}

fn require(
    template: Template,
    payload: &IndexMap<String, String>,
    field: &'static str,
) -> Result<String, DispatchError> {
    payload
        .get(field)
        .cloned()
        .ok_or(DispatchError::MissingField { template, field })
}

fn target<T: Serialize>(endpoint: Endpoint, body: T) -> Result<DispatchTarget, DispatchError> {
    let body = serde_json::to_value(body).map_err(|e| DispatchError::Encode(e.to_string()))?;
    Ok(DispatchTarget { endpoint, body })
}

/// Whether the template has a backend endpoint.
pub fn is_supported(template: Template) -> bool {
    !matches!(
        template,
        Template::InitialiseOtaRoutine | Template::WriteToFileRoutine
    )
}

/// Maps a template and its collected payload to the backend request.
pub fn route(
    template: Template,
    payload: &IndexMap<String, String>,
) -> Result<DispatchTarget, DispatchError> {
    let get = |field| require(template, payload, field);

    match template {
        Template::EraseDataRoutine => target(
            Endpoint::EraseMemory,
            EraseMemoryRequest {
                ecu_id: get(field::RECEIVER_ECU)?,
                address: get(field::ADDRESS_ERASE)?,
                nr_bytes: get(field::SIZE)?,
            },
        ),
        Template::VerifyDataRoutine => target(
            Endpoint::VerifySoftware,
            EcuRequest { ecu_id: get(field::RECEIVER_ECU)? },
        ),
        Template::RollbackRoutine => target(
            Endpoint::RollbackSoftware,
            EcuRequest { ecu_id: get(field::RECEIVER_ECU)? },
        ),
        Template::ActivateRoutine => target(
            Endpoint::ActivateSoftware,
            EcuRequest { ecu_id: get(field::RECEIVER_ECU)? },
        ),
        Template::UpdateSoftwareAction => target(
            Endpoint::UpdateToVersion,
            UpdateToVersionRequest {
                update_file_type: get(field::FILE_TYPE)?,
                update_file_version: get(field::SOFTWARE_VERSION)?,
                ecu_id: get(field::TARGET_ECU)?,
            },
        ),
        Template::TransferDataAction => target(
            Endpoint::TransferDataToEcu,
            TransferDataRequest {
                ecu_id: get(field::TARGET_ECU)?,
                address: get(field::ADDRESS_TRANSFER)?,
                data_bytes: get(field::DATA)?,
            },
        ),
        Template::SyncOtaStatus => target(
            Endpoint::SyncOtaStatus,
            SyncOtaStatusRequest {
                ecu_id: get(field::TARGET_ECU)?,
                ota_state: get(field::OTA_STATE)?,
            },
        ),
        Template::InitialiseOtaRoutine | Template::WriteToFileRoutine => {
            Err(DispatchError::Unsupported(template))
        }
    }
}
