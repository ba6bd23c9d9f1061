// otactl/src/commands/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Static diagnostic commands.
//!
//! Values come from command-line arguments first; anything missing is asked
//! through a [`Prompter`]. The gathered values are validated as a unit by the
//! [`StaticCommand`] constructors before a single byte goes on the wire.

use std::io::{self, BufRead, Write};

use clap::Subcommand;
use serde_json::Value;

use otactl_types::validate::{self, ValidationError};
use otactl_types::{Entity, StaticCommand};

use crate::client::ApiClient;
use crate::error::{OtactlError, Result as OtactlResult};

/// Source of operator answers for values not given on the command line.
pub trait Prompter {
    /// Asks one question. `None` means the operator cancelled.
    fn ask(&mut self, label: &str) -> Option<String>;

    /// Shows a notice (rejected input, cancellation).
    fn notify(&mut self, message: &str);

    fn is_interactive(&self) -> bool {
        true
    }
}

/// Prompts on stderr and reads answers from stdin. End of input cancels.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, label: &str) -> Option<String> {
        let mut stderr = io::stderr();
        let _ = write!(stderr, "{} ", label);
        let _ = stderr.flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::warn!("Reading operator input failed: {}", e);
                None
            }
        }
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Non-interactive source: every missing value is an error.
pub struct NoPrompt;

impl Prompter for NoPrompt {
    fn ask(&mut self, _label: &str) -> Option<String> {
        None
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum StaticArgs {
    /// Send a raw CAN frame
    SendFrame {
        #[arg(long)]
        can_id: Option<String>,
        #[arg(long)]
        can_data: Option<String>,
    },
    /// Request the identifiers known to the backend
    RequestIds,
    /// Update an ECU to a software version
    UpdateToVersion {
        /// Update file type (letters only)
        #[arg(long)]
        file_type: Option<String>,
        /// Software version (digits and dots)
        #[arg(long)]
        version: Option<String>,
        /// ECU id (digits only)
        #[arg(long)]
        ecu_id: Option<String>,
    },
    /// Read battery, engine, doors or hvac data
    ReadInfo { entity: Entity },
    /// Write battery, engine, doors or hvac data; unset fields are prompted or sent as null
    WriteInfo {
        entity: Entity,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Fetch the drive update data listing
    DriveUpdateData,
    /// Change the diagnostic session (1 default, 2 programming, 3 extended)
    ChangeSession { sub_function: Option<String> },
    Authenticate,
    ReadDtcInfo,
    ClearDtcInfo,
    TesterPresent,
    GetIdentifiers,
    /// Read P2 timings (1 defaults, 3 current)
    ReadTiming { sub_function: Option<String> },
    /// Write P2 timings
    WriteTiming {
        #[arg(long, allow_hyphen_values = true)]
        p2_max: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        p2_star_max: Option<String>,
    },
    /// Reset an ECU
    ResetEcu {
        /// soft or hard
        #[arg(long = "type")]
        type_reset: Option<String>,
        /// 10 or 11
        #[arg(long)]
        ecu_id: Option<String>,
    },
}

/// `FIELD=VALUE` command-line assignment.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Gathers, validates and sends one static command.
pub async fn run(
    client: &ApiClient,
    prompter: &mut dyn Prompter,
    args: StaticArgs,
) -> OtactlResult<Value> {
    let command = build(prompter, args)?;
    execute(client, &command).await
}

pub async fn execute(client: &ApiClient, command: &StaticCommand) -> OtactlResult<Value> {
    let endpoint = command.endpoint();
    let body = command.body()?;
    tracing::info!(%endpoint, "Sending static command");

    match command {
        StaticCommand::DriveUpdateData => client.call_compact(endpoint, body).await,
        _ => client.call(endpoint, body).await,
    }
}

/// Turns arguments plus answers into a validated command. Never touches the network.
pub fn build(prompter: &mut dyn Prompter, args: StaticArgs) -> OtactlResult<StaticCommand> {
    let command = match args {
        StaticArgs::SendFrame { can_id, can_data } => {
            let can_id = gather(prompter, can_id, "CAN ID", "Enter CAN ID:")?;
            let can_data = gather(prompter, can_data, "CAN Data", "Enter CAN Data:")?;
            StaticCommand::send_frame(&can_id, &can_data)?
        }
        StaticArgs::RequestIds => StaticCommand::RequestIds,
        StaticArgs::UpdateToVersion { file_type, version, ecu_id } => {
            let file_type = gather_valid(
                prompter,
                file_type,
                "file type",
                "Enter file type (letters only):",
                validate::check_file_type,
            )?;
            let version = gather_valid(
                prompter,
                version,
                "software version",
                "Enter software version (numbers and dots only):",
                validate::check_version,
            )?;
            let ecu_id = gather_valid(
                prompter,
                ecu_id,
                "ECU id",
                "Enter ECU id (numbers only):",
                validate::check_update_ecu_id,
            )?;
            StaticCommand::update_to_version(&file_type, &version, &ecu_id)?
        }
        StaticArgs::ReadInfo { entity } => StaticCommand::ReadInfo(entity),
        StaticArgs::WriteInfo { entity, set } => build_write_info(prompter, entity, set)?,
        StaticArgs::DriveUpdateData => StaticCommand::DriveUpdateData,
        StaticArgs::ChangeSession { sub_function } => {
            let sub_function = gather(
                prompter,
                sub_function,
                "session sub-function",
                "Enter sub-function code (1 for default session, 2 for programming session, 3 for extended session):",
            )?;
            StaticCommand::change_session(&sub_function)?
        }
        StaticArgs::Authenticate => StaticCommand::Authenticate,
        StaticArgs::ReadDtcInfo => StaticCommand::ReadDtcInfo,
        StaticArgs::ClearDtcInfo => StaticCommand::ClearDtcInfo,
        StaticArgs::TesterPresent => StaticCommand::TesterPresent,
        StaticArgs::GetIdentifiers => StaticCommand::GetIdentifiers,
        StaticArgs::ReadTiming { sub_function } => {
            let sub_function = gather(
                prompter,
                sub_function,
                "timing sub-function",
                "Enter sub-function code (1 - read default P2 timings, 3 - read current P2 timings):",
            )?;
            StaticCommand::read_timing(&sub_function)?
        }
        StaticArgs::WriteTiming { p2_max, p2_star_max } => {
            let p2_max = gather(prompter, p2_max, "P2 Max Time", "Enter value for P2 Max Time:")?;
            let p2_star_max = gather(
                prompter,
                p2_star_max,
                "P2 Star Max Time",
                "Enter value for P2 Star Max Time:",
            )?;
            StaticCommand::write_timing(&p2_max, &p2_star_max)?
        }
        StaticArgs::ResetEcu { type_reset, ecu_id } => {
            let type_reset =
                gather(prompter, type_reset, "reset type", "Enter type of reset (soft or hard):")?;
            let ecu_id = gather(prompter, ecu_id, "ECU ID", "Enter ECU ID (10 or 11):")?;
            StaticCommand::reset_ecu(&type_reset, &ecu_id)?
        }
    };
    Ok(command)
}

fn build_write_info(
    prompter: &mut dyn Prompter,
    entity: Entity,
    set: Vec<(String, String)>,
) -> OtactlResult<StaticCommand> {
    let fields = entity.write_fields();
    if let Some((key, _)) = set.iter().find(|(key, _)| !fields.iter().any(|f| f.key == key.as_str())) {
        return Err(ValidationError::UnknownEntityField {
            entity: entity.name().to_string(),
            field: key.clone(),
        }
        .into());
    }

    let mut values: Vec<(String, Option<String>)> = Vec::with_capacity(fields.len());
    for field in fields {
        let supplied = set
            .iter()
            .rev()
            .find(|(key, _)| key.as_str() == field.key)
            .map(|(_, value)| value.clone());
        let value = match supplied {
            Some(value) => Some(value),
            None if prompter.is_interactive() => prompter.ask(field.prompt),
            None => None,
        };
        values.push((field.key.to_string(), value));
    }

    Ok(StaticCommand::write_info(entity, values)?)
}

/// Supplied value, else one prompt. Cancellation aborts the command.
fn gather(
    prompter: &mut dyn Prompter,
    supplied: Option<String>,
    name: &'static str,
    question: &str,
) -> OtactlResult<String> {
    if let Some(value) = supplied {
        return Ok(value);
    }
    if !prompter.is_interactive() {
        return Err(OtactlError::MissingInput(name));
    }
    prompter.ask(question).ok_or_else(|| cancelled(prompter))
}

/// Like [`gather`], but re-asks until `check` accepts the value.
fn gather_valid(
    prompter: &mut dyn Prompter,
    supplied: Option<String>,
    name: &'static str,
    question: &str,
    check: fn(&str) -> Result<(), ValidationError>,
) -> OtactlResult<String> {
    let mut candidate = supplied;
    loop {
        let value = match candidate.take() {
            Some(value) => value,
            None => gather(prompter, None, name, question)?,
        };
        match check(&value) {
            Ok(()) => return Ok(value),
            Err(e) if prompter.is_interactive() => prompter.notify(&e.to_string()),
            Err(e) => return Err(e.into()),
        }
    }
}

fn cancelled(prompter: &mut dyn Prompter) -> OtactlError {
    let err = OtactlError::Cancelled;
    prompter.notify(&err.to_string());
    err
}
