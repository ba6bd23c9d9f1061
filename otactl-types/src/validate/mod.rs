// otactl/otactl-types/src/validate/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Input validation rules for the static diagnostic commands.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Rejection of operator input. The message is shown to the operator as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} cannot be empty.")]
    Empty(&'static str),

    #[error("Invalid file type '{0}'. Please enter letters only.")]
    FileType(String),

    #[error("Invalid version '{0}'. Please enter numbers and dots only.")]
    Version(String),

    #[error("Invalid ECU id '{0}'. Please enter numbers only.")]
    EcuId(String),

    #[error("Invalid reset type '{0}'. Please enter \"soft\" or \"hard\".")]
    ResetType(String),

    #[error("Invalid ECU ID '{0}'. Please enter \"10\" or \"11\".")]
    ResetEcuId(String),

    #[error("Invalid session sub-function '{0}'. Please enter 1, 2 or 3.")]
    SessionSubFunction(String),

    #[error("Invalid timing sub-function '{0}'. Please enter 1 or 3.")]
    TimingSubFunction(String),

    #[error("Invalid {field} '{value}'. Please enter numeric values.")]
    TimingValue { field: &'static str, value: String },

    #[error("Unknown entity '{0}'. Expected battery, engine, doors or hvac.")]
    UnknownEntity(String),

    #[error("Unknown field '{field}' for {entity} info.")]
    UnknownEntityField { entity: String, field: String },

    #[error("Unknown template '{0}'.")]
    UnknownTemplate(String),
}

fn file_type_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z]+$").unwrap())
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9.]+$").unwrap())
}

fn digits_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+$").unwrap())
}

/// Update file type: letters only.
pub fn check_file_type(value: &str) -> Result<(), ValidationError> {
    if file_type_regex().is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::FileType(value.to_string()))
    }
}

/// Update version: digits and dots only.
pub fn check_version(value: &str) -> Result<(), ValidationError> {
    if version_regex().is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::Version(value.to_string()))
    }
}

/// ECU id of the legacy update command: digits only.
pub fn check_update_ecu_id(value: &str) -> Result<(), ValidationError> {
    if digits_regex().is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::EcuId(value.to_string()))
    }
}

/// ECU ids accepted by the reset command (compared as strings).
pub const RESET_ECU_IDS: [&str; 2] = ["10", "11"];

pub fn check_reset_ecu_id(value: &str) -> Result<(), ValidationError> {
    if RESET_ECU_IDS.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::ResetEcuId(value.to_string()))
    }
}

pub fn check_not_empty(label: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::Empty(label))
    } else {
        Ok(())
    }
}

/// Parses a decimal integer, ignoring surrounding whitespace.
pub fn parse_timing_value(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::TimingValue {
            field,
            value: value.to_string(),
        })
}

fn parse_code(value: &str) -> Option<u8> {
    value.trim().parse::<u8>().ok()
}

/// ECU reset flavour. Matched exactly, case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetType {
    Soft,
    Hard,
}

impl ResetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetType::Soft => "soft",
            ResetType::Hard => "hard",
        }
    }
}

impl fmt::Display for ResetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResetType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soft" => Ok(ResetType::Soft),
            "hard" => Ok(ResetType::Hard),
            other => Err(ValidationError::ResetType(other.to_string())),
        }
    }
}

/// Diagnostic session selected by the session control sub-function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    Default = 1,
    Programming = 2,
    Extended = 3,
}

impl SessionType {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(SessionType::Default),
            2 => Some(SessionType::Programming),
            3 => Some(SessionType::Extended),
            _ => None,
        }
    }
}

impl FromStr for SessionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_code(s)
            .and_then(SessionType::from_code)
            .ok_or_else(|| ValidationError::SessionSubFunction(s.to_string()))
    }
}

/// Access timing parameter read variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingSubFunction {
    /// Read `P2_MAX_TIME_DEFAULT` and `P2_STAR_MAX_TIME_DEFAULT`.
    ReadDefaults = 1,
    /// Read the currently active `p2_max_time` and `p2_star_max_time`.
    ReadCurrent = 3,
}

impl TimingSubFunction {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(TimingSubFunction::ReadDefaults),
            3 => Some(TimingSubFunction::ReadCurrent),
            _ => None,
        }
    }
}

impl FromStr for TimingSubFunction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_code(s)
            .and_then(TimingSubFunction::from_code)
            .ok_or_else(|| ValidationError::TimingSubFunction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_letters_only() {
        assert!(check_file_type("zip").is_ok());
        assert!(check_file_type("TAR").is_ok());
        assert!(check_file_type("zip2").is_err());
        assert!(check_file_type("").is_err());
        assert!(check_file_type("tar.gz").is_err());
    }

    #[test]
    fn test_version_digits_and_dots() {
        assert!(check_version("1.2.3").is_ok());
        assert!(check_version("10").is_ok());
        assert!(check_version("1.a").is_err());
        assert!(check_version("").is_err());
    }

    #[test]
    fn test_update_ecu_id_digits_only() {
        assert!(check_update_ecu_id("16").is_ok());
        assert!(check_update_ecu_id("1.6").is_err());
        assert!(check_update_ecu_id("0x10").is_err());
    }

    #[test]
    fn test_reset_inputs_are_exact() {
        assert_eq!("soft".parse::<ResetType>().unwrap(), ResetType::Soft);
        assert!("Soft".parse::<ResetType>().is_err());
        assert!(" hard".parse::<ResetType>().is_err());
        assert!(check_reset_ecu_id("10").is_ok());
        assert!(check_reset_ecu_id("11").is_ok());
        assert!(check_reset_ecu_id("12").is_err());
        assert!(check_reset_ecu_id("0x10").is_err());
    }

    #[test]
    fn test_session_codes() {
        assert_eq!("2".parse::<SessionType>().unwrap(), SessionType::Programming);
        assert_eq!("3".parse::<SessionType>().unwrap().code(), 3);
        assert!("0".parse::<SessionType>().is_err());
        assert!("4".parse::<SessionType>().is_err());
        assert!("x".parse::<SessionType>().is_err());
    }

    #[test]
    fn test_timing_codes() {
        assert_eq!("1".parse::<TimingSubFunction>().unwrap(), TimingSubFunction::ReadDefaults);
        assert_eq!("3".parse::<TimingSubFunction>().unwrap(), TimingSubFunction::ReadCurrent);
        assert!("2".parse::<TimingSubFunction>().is_err());
    }

    #[test]
    fn test_timing_values_must_be_integers() {
        assert_eq!(parse_timing_value("P2 max", " 50 ").unwrap(), 50);
        assert!(matches!(
            parse_timing_value("P2 max", "fast"),
            Err(ValidationError::TimingValue { field: "P2 max", .. })
        ));
        assert!(parse_timing_value("P2 max", "5.5").is_err());
    }
}
