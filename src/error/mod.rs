// otactl/src/error/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Centralized error handling for otactl.
//!
//! Uses `thiserror` to define structured errors and `anyhow` at the `main` boundary.
//! Internal modules return `Result<T, OtactlError>`; operator-facing notices
//! (cancelled prompts, rejected input) are variants too, so the caller decides
//! how to show them.

use std::path::PathBuf;
use thiserror::Error;
use tokio::task::JoinError;

use otactl_types::{DispatchError, ValidationError};

/// The root error type for all otactl failures.
#[derive(Error, Debug)]
pub enum OtactlError {
    /// General-purpose error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Failed to determine the user's home directory.
    #[error("Home directory not found")]
    HomeDirNotFound,

    /// I/O error (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// IO error with associated path for better diagnostics
    #[error("I/O error at {path:?}: {source}")]
    IoWithPath {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Configuration loading or parsing error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The operator cancelled a prompt; nothing was sent.
    #[error("Operation cancelled.")]
    Cancelled,

    /// A value was neither supplied nor promptable; nothing was sent.
    #[error("No value given for {0} and prompting is disabled.")]
    MissingInput(&'static str),

    /// Operator input was rejected; nothing was sent.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A dynamic form could not be turned into a request; nothing was sent.
    #[error("{0}")]
    Dispatch(#[from] DispatchError),

    /// The form has no input with this id.
    #[error("Form has no input '{0}'")]
    UnknownInput(String),

    /// The input is displayed but cannot be changed.
    #[error("Input '{0}' is read-only")]
    ReadOnlyInput(String),

    /// Submit was requested while no template form is shown.
    #[error("No form with a submit control is active")]
    NoActiveForm,

    /// The request could not be delivered (connect failure, timeout, ...).
    #[error("Request to {path} failed: {message}")]
    Request { path: String, message: String },

    /// The response body could not be read.
    #[error("Reading response from {path} failed: {message}")]
    Read { path: String, message: String },

    /// The response body is not JSON.
    #[error("Response from {path} (HTTP {status}) is not valid JSON: {message}")]
    Decode {
        path: String,
        status: u16,
        message: String,
    },

    /// The OTA status poller is already running.
    #[error("OTA status polling is already running")]
    PollerAlreadyRunning,

    /// The OTA status poller is not running.
    #[error("OTA status polling is not running")]
    PollerNotRunning,

    /// Task join error.
    #[error("Task join error: {0}")]
    Join(#[from] JoinError),
}

impl OtactlError {
    /// Creates an `IoWithPath` error from a path and an I/O error.
    pub fn io_with_path<E: Into<std::io::Error>>(path: PathBuf, source: E) -> Self {
        Self::IoWithPath {
            source: source.into(),
            path,
        }
    }

    /// `true` for errors raised before any request left the client.
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            OtactlError::Cancelled
                | OtactlError::MissingInput(_)
                | OtactlError::Validation(_)
                | OtactlError::Dispatch(_)
                | OtactlError::UnknownInput(_)
                | OtactlError::ReadOnlyInput(_)
                | OtactlError::NoActiveForm
        )
    }
}

/// Convenient alias for `Result<T, OtactlError>`.
pub type Result<T> = std::result::Result<T, OtactlError>;
