// otactl/otactl-types/src/endpoint/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Catalogue of the backend `/api/*` endpoints consumed by otactl.

use std::fmt;
use std::str::FromStr;

use crate::validate::ValidationError;

/// HTTP method used by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of an entity write request, with the question asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityField {
    pub key: &'static str,
    pub prompt: &'static str,
}

const fn field(key: &'static str, prompt: &'static str) -> EntityField {
    EntityField { key, prompt }
}

const BATTERY_FIELDS: &[EntityField] = &[
    field("battery_level", "Enter Battery Energy Level:"),
    field("voltage", "Enter Battery Voltage:"),
    field("battery_state_of_charge", "Enter Battery State of Charge:"),
    field("percentage", "Enter Battery Percentage:"),
];

const ENGINE_FIELDS: &[EntityField] = &[
    field("engine_rpm", "Enter Engine RPM:"),
    field("coolant_temperature", "Enter Coolant Temperature:"),
    field("throttle_position", "Enter Throttle Position:"),
    field("vehicle_speed", "Enter Vehicle Speed:"),
    field("engine_load", "Enter Engine Load:"),
    field("fuel_level", "Enter Fuel Level:"),
    field("oil_temperature", "Enter Oil Temperature:"),
    field("fuel_pressure", "Enter Fuel Pressure:"),
    field("intake_air_temperature", "Enter Intake Air Temperature:"),
];

const DOORS_FIELDS: &[EntityField] = &[
    field("door", "Enter Door Status (0: closed, 1: open):"),
    field("passenger", "Enter Passenger Door Status (0: closed, 1: open):"),
    field("passenger_lock", "Enter Passenger Lock Status (0: locked, 1: unlocked):"),
    field("driver", "Enter Driver Door Status (0: closed, 1: open):"),
    field("ajar", "Enter Ajar Warning Status (0: no warning, 1: warning):"),
];

const HVAC_FIELDS: &[EntityField] = &[
    field("mass_air_flow", "Enter Mass Air Flow:"),
    field("ambient_air_temperature", "Enter Ambient Air Temperature:"),
    field("cabin_temperature", "Enter Cabin Temperature:"),
    field("cabin_temperature_driver_set", "Enter Cabin Temperature Driver Set:"),
    field("fan_speed", "Enter Fan Speed:"),
    field("hvac_modes", "Enter HVAC Modes:"),
];

/// Vehicle subsystem exposing read/write info endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Battery,
    Engine,
    Doors,
    Hvac,
}

impl Entity {
    pub const ALL: [Entity; 4] = [Entity::Battery, Entity::Engine, Entity::Doors, Entity::Hvac];

    pub fn name(&self) -> &'static str {
        match self {
            Entity::Battery => "battery",
            Entity::Engine => "engine",
            Entity::Doors => "doors",
            Entity::Hvac => "hvac",
        }
    }

    /// Ordered fields sent by the matching `write_info_*` endpoint.
    pub fn write_fields(&self) -> &'static [EntityField] {
        match self {
            Entity::Battery => BATTERY_FIELDS,
            Entity::Engine => ENGINE_FIELDS,
            Entity::Doors => DOORS_FIELDS,
            Entity::Hvac => HVAC_FIELDS,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Entity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Entity::ALL
            .into_iter()
            .find(|entity| entity.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownEntity(s.to_string()))
    }
}

/// A backend endpoint: a fixed path plus the method it is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Logs,
    SendFrame,
    RequestIds,
    UpdateToVersion,
    ReadInfo(Entity),
    WriteInfo(Entity),
    DriveUpdateData,
    ChangeSession,
    Authenticate,
    ReadDtcInfo,
    ClearDtcInfo,
    TesterPresent,
    GetIdentifiers,
    ReadAccessTiming,
    WriteTiming,
    ResetEcu,
    EraseMemory,
    VerifySoftware,
    RollbackSoftware,
    ActivateSoftware,
    TransferDataToEcu,
    SyncOtaStatus,
    OtaStatus,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Logs => "/api/logs",
            Endpoint::SendFrame => "/api/send_frame",
            Endpoint::RequestIds => "/api/request_ids",
            Endpoint::UpdateToVersion => "/api/update_to_version",
            Endpoint::ReadInfo(Entity::Battery) => "/api/read_info_battery",
            Endpoint::ReadInfo(Entity::Engine) => "/api/read_info_engine",
            Endpoint::ReadInfo(Entity::Doors) => "/api/read_info_doors",
            Endpoint::ReadInfo(Entity::Hvac) => "/api/read_info_hvac",
            Endpoint::WriteInfo(Entity::Battery) => "/api/write_info_battery",
            Endpoint::WriteInfo(Entity::Engine) => "/api/write_info_engine",
            Endpoint::WriteInfo(Entity::Doors) => "/api/write_info_doors",
            Endpoint::WriteInfo(Entity::Hvac) => "/api/write_info_hvac",
            Endpoint::DriveUpdateData => "/api/drive_update_data",
            Endpoint::ChangeSession => "/api/change_session",
            Endpoint::Authenticate => "/api/authenticate",
            Endpoint::ReadDtcInfo => "/api/read_dtc_info",
            Endpoint::ClearDtcInfo => "/api/clear_dtc_info",
            Endpoint::TesterPresent => "/api/tester_present",
            Endpoint::GetIdentifiers => "/api/get_identifiers",
            Endpoint::ReadAccessTiming => "/api/read_access_timing",
            Endpoint::WriteTiming => "/api/write_timing",
            Endpoint::ResetEcu => "/api/reset_ecu",
            Endpoint::EraseMemory => "/api/erase_memory",
            Endpoint::VerifySoftware => "/api/verify_software",
            Endpoint::RollbackSoftware => "/api/rollback_software",
            Endpoint::ActivateSoftware => "/api/activate_software",
            Endpoint::TransferDataToEcu => "/api/transfer_data_to_ecu",
            Endpoint::SyncOtaStatus => "/api/sync_ota_status",
            Endpoint::OtaStatus => "/api/ota_status",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::Logs
            | Endpoint::RequestIds
            | Endpoint::ReadInfo(_)
            | Endpoint::DriveUpdateData
            | Endpoint::Authenticate
            | Endpoint::ReadDtcInfo
            | Endpoint::ClearDtcInfo
            | Endpoint::TesterPresent
            | Endpoint::GetIdentifiers => Method::Get,
            _ => Method::Post,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_endpoints_follow_naming() {
        for entity in Entity::ALL {
            assert_eq!(
                Endpoint::ReadInfo(entity).path(),
                format!("/api/read_info_{}", entity.name())
            );
            assert_eq!(
                Endpoint::WriteInfo(entity).path(),
                format!("/api/write_info_{}", entity.name())
            );
            assert_eq!(Endpoint::ReadInfo(entity).method(), Method::Get);
            assert_eq!(Endpoint::WriteInfo(entity).method(), Method::Post);
        }
    }

    #[test]
    fn test_methods_match_backend_contract() {
        assert_eq!(Endpoint::Logs.method(), Method::Get);
        assert_eq!(Endpoint::DriveUpdateData.method(), Method::Get);
        assert_eq!(Endpoint::GetIdentifiers.method(), Method::Get);
        assert_eq!(Endpoint::ChangeSession.method(), Method::Post);
        assert_eq!(Endpoint::ReadAccessTiming.method(), Method::Post);
        assert_eq!(Endpoint::OtaStatus.method(), Method::Post);
        assert_eq!(Endpoint::OtaStatus.to_string(), "POST /api/ota_status");
    }

    #[test]
    fn test_entity_from_str() {
        assert_eq!("HVAC".parse::<Entity>().unwrap(), Entity::Hvac);
        assert_eq!(" doors ".parse::<Entity>().unwrap(), Entity::Doors);
        assert!(matches!(
            "wheels".parse::<Entity>(),
            Err(ValidationError::UnknownEntity(name)) if name == "wheels"
        ));
    }

    #[test]
    fn test_write_fields_are_unique() {
        for entity in Entity::ALL {
            let fields = entity.write_fields();
            let mut keys: Vec<_> = fields.iter().map(|f| f.key).collect();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), fields.len(), "duplicate field for {}", entity);
        }
    }
}
