// otactl/otactl-types/src/command/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Typed request builders for the fixed diagnostic commands.
//!
//! Every constructor validates all of its inputs at once and either returns a
//! command that is ready to send or the first [`ValidationError`]. A command
//! value therefore never carries input that the backend contract forbids.

use serde_json::Value;

use crate::endpoint::{Endpoint, Entity};
use crate::payload::{
    ResetEcuRequest, SendFrameRequest, SubFunctionRequest, UpdateToVersionRequest,
    WriteInfoRequest, WriteTimingRequest,
};
use crate::validate::{self, ResetType, SessionType, TimingSubFunction, ValidationError};

/// A fully validated static command.
#[derive(Debug, Clone, PartialEq)]
pub enum StaticCommand {
    SendFrame(SendFrameRequest),
    RequestIds,
    UpdateToVersion(UpdateToVersionRequest),
    ReadInfo(Entity),
    WriteInfo {
        entity: Entity,
        values: WriteInfoRequest,
    },
    DriveUpdateData,
    ChangeSession(SessionType),
    Authenticate,
    ReadDtcInfo,
    ClearDtcInfo,
    TesterPresent,
    GetIdentifiers,
    ReadTiming(TimingSubFunction),
    WriteTiming(WriteTimingRequest),
    ResetEcu(ResetEcuRequest),
}

impl StaticCommand {
    pub fn send_frame(can_id: &str, can_data: &str) -> Result<Self, ValidationError> {
        validate::check_not_empty("CAN ID", can_id)?;
        validate::check_not_empty("CAN Data", can_data)?;
        Ok(StaticCommand::SendFrame(SendFrameRequest {
            can_id: can_id.to_string(),
            can_data: can_data.to_string(),
        }))
    }

    pub fn update_to_version(
        file_type: &str,
        version: &str,
        ecu_id: &str,
    ) -> Result<Self, ValidationError> {
        validate::check_file_type(file_type)?;
        validate::check_version(version)?;
        validate::check_update_ecu_id(ecu_id)?;
        Ok(StaticCommand::UpdateToVersion(UpdateToVersionRequest {
            update_file_type: file_type.to_string(),
            update_file_version: version.to_string(),
            ecu_id: ecu_id.to_string(),
        }))
    }

    /// Builds an entity write. Every entity field is sent in its fixed order;
    /// fields that are absent or empty are sent as `null`.
    pub fn write_info<I, K, V>(entity: Entity, values: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Option<String>>,
    {
        let fields = entity.write_fields();
        let mut body: WriteInfoRequest = fields.iter().map(|f| (f.key.to_string(), None)).collect();

        for (key, value) in values {
            let key = key.as_ref();
            let slot = body
                .get_mut(key)
                .ok_or_else(|| ValidationError::UnknownEntityField {
                    entity: entity.name().to_string(),
                    field: key.to_string(),
                })?;
            *slot = value.into().filter(|v| !v.is_empty());
        }

        Ok(StaticCommand::WriteInfo { entity, values: body })
    }

    pub fn change_session(sub_function: &str) -> Result<Self, ValidationError> {
        Ok(StaticCommand::ChangeSession(sub_function.parse()?))
    }

    pub fn read_timing(sub_function: &str) -> Result<Self, ValidationError> {
        Ok(StaticCommand::ReadTiming(sub_function.parse()?))
    }

    pub fn write_timing(p2_max: &str, p2_star_max: &str) -> Result<Self, ValidationError> {
        let p2_max = validate::parse_timing_value("P2 Max Time", p2_max)?;
        let p2_star_max = validate::parse_timing_value("P2 Star Max Time", p2_star_max)?;
        Ok(StaticCommand::WriteTiming(WriteTimingRequest { p2_max, p2_star_max }))
    }

    pub fn reset_ecu(type_reset: &str, ecu_id: &str) -> Result<Self, ValidationError> {
        let type_reset: ResetType = type_reset.parse()?;
        validate::check_reset_ecu_id(ecu_id)?;
        Ok(StaticCommand::ResetEcu(ResetEcuRequest {
            type_reset: type_reset.as_str().to_string(),
            ecu_id: ecu_id.to_string(),
        }))
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            StaticCommand::SendFrame(_) => Endpoint::SendFrame,
            StaticCommand::RequestIds => Endpoint::RequestIds,
            StaticCommand::UpdateToVersion(_) => Endpoint::UpdateToVersion,
            StaticCommand::ReadInfo(entity) => Endpoint::ReadInfo(*entity),
            StaticCommand::WriteInfo { entity, .. } => Endpoint::WriteInfo(*entity),
            StaticCommand::DriveUpdateData => Endpoint::DriveUpdateData,
            StaticCommand::ChangeSession(_) => Endpoint::ChangeSession,
            StaticCommand::Authenticate => Endpoint::Authenticate,
            StaticCommand::ReadDtcInfo => Endpoint::ReadDtcInfo,
            StaticCommand::ClearDtcInfo => Endpoint::ClearDtcInfo,
            StaticCommand::TesterPresent => Endpoint::TesterPresent,
            StaticCommand::GetIdentifiers => Endpoint::GetIdentifiers,
            StaticCommand::ReadTiming(_) => Endpoint::ReadAccessTiming,
            StaticCommand::WriteTiming(_) => Endpoint::WriteTiming,
            StaticCommand::ResetEcu(_) => Endpoint::ResetEcu,
        }
    }

    /// JSON body for the request, `None` for body-less GET commands.
    pub fn body(&self) -> Result<Option<Value>, serde_json::Error> {
        let body = match self {
            StaticCommand::SendFrame(req) => serde_json::to_value(req)?,
            StaticCommand::UpdateToVersion(req) => serde_json::to_value(req)?,
            StaticCommand::WriteInfo { values, .. } => serde_json::to_value(values)?,
            StaticCommand::ChangeSession(session) => serde_json::to_value(SubFunctionRequest {
                sub_funct: session.code(),
            })?,
            StaticCommand::ReadTiming(sub) => serde_json::to_value(SubFunctionRequest {
                sub_funct: sub.code(),
            })?,
            StaticCommand::WriteTiming(req) => serde_json::to_value(req)?,
            StaticCommand::ResetEcu(req) => serde_json::to_value(req)?,
            StaticCommand::RequestIds
            | StaticCommand::ReadInfo(_)
            | StaticCommand::DriveUpdateData
            | StaticCommand::Authenticate
            | StaticCommand::ReadDtcInfo
            | StaticCommand::ClearDtcInfo
            | StaticCommand::TesterPresent
            | StaticCommand::GetIdentifiers => return Ok(None),
        };
        Ok(Some(body))
    }
}
