// otactl/otactl-types/src/template/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Static templates backing the routine control and OTA action forms.

use std::fmt;
use std::str::FromStr;

use crate::validate::ValidationError;

/// Input ids used by the templates and the dispatcher rule table.
pub mod field {
    pub const RECEIVER_ECU: &str = "receiver-ecu";
    pub const TARGET_ECU: &str = "target-ecu";
    pub const ADDRESS_ERASE: &str = "address-erase";
    pub const ADDRESS_UPDATE: &str = "address-update";
    pub const ADDRESS_TRANSFER: &str = "address-transfer";
    pub const SIZE: &str = "size";
    pub const SOFTWARE_NUMBER: &str = "software-number";
    pub const SOFTWARE_VERSION: &str = "software-version";
    pub const FILE_TYPE: &str = "file-type";
    pub const DATA: &str = "data";
    pub const OTA_STATE: &str = "ota-state";
}

/// One input of a generated form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub label: &'static str,
    pub id: &'static str,
    pub default: &'static str,
    /// Read-only inputs are displayed and submitted with their default.
    pub editable: bool,
}

const fn input(label: &'static str, id: &'static str, default: &'static str) -> FieldDescriptor {
    FieldDescriptor { label, id, default, editable: true }
}

const fn fixed(label: &'static str, id: &'static str, default: &'static str) -> FieldDescriptor {
    FieldDescriptor { label, id, default, editable: false }
}

const RECEIVER: FieldDescriptor = input("Receiver", field::RECEIVER_ECU, "0x10");
const TARGET: FieldDescriptor = input("Target", field::TARGET_ECU, "0x11");

const ERASE_DATA: &[FieldDescriptor] = &[
    RECEIVER,
    input("Address", field::ADDRESS_ERASE, "0x0800"),
    input("Nr of bytes", field::SIZE, "0x05"),
];
const INITIALISE_OTA: &[FieldDescriptor] =
    &[TARGET, input("Sw Version", field::SOFTWARE_NUMBER, "1.0")];
const RECEIVER_ONLY: &[FieldDescriptor] = &[RECEIVER];
const UPDATE_SOFTWARE: &[FieldDescriptor] = &[
    TARGET,
    input("Address", field::ADDRESS_UPDATE, "0x0800"),
    input("Sw Version", field::SOFTWARE_VERSION, "1.0"),
    fixed("File type", field::FILE_TYPE, "zip"),
];
const TRANSFER_DATA: &[FieldDescriptor] = &[
    TARGET,
    input("Address", field::ADDRESS_TRANSFER, "0x0800"),
    input("Data bytes", field::DATA, "0xae25f9"),
];
const SYNC_OTA_STATUS: &[FieldDescriptor] = &[TARGET, input("Ota State", field::OTA_STATE, "0x00")];

/// Which form a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateCategory {
    Routine,
    OtaAction,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Routine => "routine",
            TemplateCategory::OtaAction => "ota-action",
        }
    }

    /// Caption of the submit control appended to a non-empty form.
    pub fn submit_label(&self) -> &'static str {
        match self {
            TemplateCategory::Routine => "Request routine",
            TemplateCategory::OtaAction => "Request action",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    EraseDataRoutine,
    InitialiseOtaRoutine,
    VerifyDataRoutine,
    WriteToFileRoutine,
    RollbackRoutine,
    ActivateRoutine,
    UpdateSoftwareAction,
    TransferDataAction,
    SyncOtaStatus,
}

impl Template {
    pub const ALL: [Template; 9] = [
        Template::EraseDataRoutine,
        Template::InitialiseOtaRoutine,
        Template::VerifyDataRoutine,
        Template::WriteToFileRoutine,
        Template::RollbackRoutine,
        Template::ActivateRoutine,
        Template::UpdateSoftwareAction,
        Template::TransferDataAction,
        Template::SyncOtaStatus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Template::EraseDataRoutine => "EraseDataRoutine",
            Template::InitialiseOtaRoutine => "InitialiseOTARoutine",
            Template::VerifyDataRoutine => "VerifyDataRoutine",
            Template::WriteToFileRoutine => "WriteToFileRoutine",
            Template::RollbackRoutine => "RollbackRoutine",
            Template::ActivateRoutine => "ActivateRoutine",
            Template::UpdateSoftwareAction => "UpdateSoftwareAction",
            Template::TransferDataAction => "TransferDataAction",
            Template::SyncOtaStatus => "SyncOtaStatus",
        }
    }

    pub fn category(&self) -> TemplateCategory {
        match self {
            Template::UpdateSoftwareAction
            | Template::TransferDataAction
            | Template::SyncOtaStatus => TemplateCategory::OtaAction,
            _ => TemplateCategory::Routine,
        }
    }

    pub fn fields(&self) -> &'static [FieldDescriptor] {
        match self {
            Template::EraseDataRoutine => ERASE_DATA,
            Template::InitialiseOtaRoutine => INITIALISE_OTA,
            Template::VerifyDataRoutine
            | Template::WriteToFileRoutine
            | Template::RollbackRoutine
            | Template::ActivateRoutine => RECEIVER_ONLY,
            Template::UpdateSoftwareAction => UPDATE_SOFTWARE,
            Template::TransferDataAction => TRANSFER_DATA,
            Template::SyncOtaStatus => SYNC_OTA_STATUS,
        }
    }

    pub fn of_category(category: TemplateCategory) -> impl Iterator<Item = Template> {
        Template::ALL.into_iter().filter(move |t| t.category() == category)
    }

    /// Looks a template up by name within one category, as a dropdown would.
    pub fn lookup(category: TemplateCategory, name: &str) -> Option<Template> {
        Template::of_category(category).find(|t| t.name() == name)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| ValidationError::UnknownTemplate(s.to_string()))
    }
}
