// otactl/tests/integration_tests.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use serde_json::{json, Value};

use otactl_types::dispatch::{collect, route};
use otactl_types::{
    DispatchError, Endpoint, Entity, Method, StaticCommand, Template, TemplateCategory,
};

/// Submits a template with its defaults, overridden by `overrides`.
fn submit(template: Template, overrides: &[(&str, &str)]) -> Result<(Endpoint, Value), DispatchError> {
    let inputs = template.fields().iter().map(|field| {
        let value = overrides
            .iter()
            .find(|(id, _)| *id == field.id)
            .map(|(_, value)| *value)
            .unwrap_or(field.default);
        (field.id, value)
    });
    let submission = collect(inputs);
    let target = route(template, &submission.payload)?;
    Ok((target.endpoint, target.body))
}

fn sorted_keys(value: &Value) -> Vec<&str> {
    let mut keys: Vec<&str> = value
        .as_object()
        .expect("object body")
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort();
    keys
}

#[test]
fn test_every_wired_template_submits_its_defaults() {
    let expected = [
        (Template::EraseDataRoutine, "/api/erase_memory", vec!["address", "ecu_id", "nrBytes"]),
        (Template::VerifyDataRoutine, "/api/verify_software", vec!["ecu_id"]),
        (Template::RollbackRoutine, "/api/rollback_software", vec!["ecu_id"]),
        (Template::ActivateRoutine, "/api/activate_software", vec!["ecu_id"]),
        (
            Template::UpdateSoftwareAction,
            "/api/update_to_version",
            vec!["ecu_id", "update_file_type", "update_file_version"],
        ),
        (
            Template::TransferDataAction,
            "/api/transfer_data_to_ecu",
            vec!["address", "data_bytes", "ecu_id"],
        ),
        (Template::SyncOtaStatus, "/api/sync_ota_status", vec!["ecu_id", "ota_state"]),
    ];

    for (template, path, keys) in expected {
        let (endpoint, body) = submit(template, &[]).unwrap();
        assert_eq!(endpoint.path(), path, "{template}");
        assert_eq!(endpoint.method(), Method::Post);
        assert_eq!(sorted_keys(&body), keys, "{template}");
    }
}

#[test]
fn test_erase_routine_example() {
    let (endpoint, body) = submit(
        Template::EraseDataRoutine,
        &[("receiver-ecu", "0x10"), ("address-erase", "0x0800"), ("size", "0x05")],
    )
    .unwrap();

    assert_eq!(endpoint, Endpoint::EraseMemory);
    assert_eq!(body, json!({"ecu_id": "0x10", "address": "0x0800", "nrBytes": "0x05"}));
}

#[test]
fn test_rejected_inputs_never_reach_a_request() {
    let low_address = submit(Template::EraseDataRoutine, &[("address-erase", "0x07FF")]);
    assert!(matches!(
        low_address,
        Err(DispatchError::MissingField { field: "address-erase", .. })
    ));

    let bad_target = submit(Template::SyncOtaStatus, &[("target-ecu", "0x99")]);
    assert!(matches!(
        bad_target,
        Err(DispatchError::MissingField { field: "target-ecu", .. })
    ));
}

#[test]
fn test_unwired_templates_are_unsupported() {
    for template in [Template::InitialiseOtaRoutine, Template::WriteToFileRoutine] {
        assert_eq!(submit(template, &[]), Err(DispatchError::Unsupported(template)));
    }
}

#[test]
fn test_template_lookup_per_category() {
    let routines: Vec<_> = Template::of_category(TemplateCategory::Routine)
        .map(|t| t.name())
        .collect();
    assert!(routines.contains(&"InitialiseOTARoutine"));
    assert_eq!(
        Template::lookup(TemplateCategory::OtaAction, "SyncOtaStatus"),
        Some(Template::SyncOtaStatus)
    );
    assert_eq!(Template::lookup(TemplateCategory::OtaAction, "RollbackRoutine"), None);
}

#[test]
fn test_static_command_wire_contract() {
    let cases = [
        (
            StaticCommand::send_frame("0x7DF", "02 10 01").unwrap(),
            "/api/send_frame",
            Some(json!({"can_id": "0x7DF", "can_data": "02 10 01"})),
        ),
        (
            StaticCommand::update_to_version("zip", "1.0.2", "16").unwrap(),
            "/api/update_to_version",
            Some(json!({"update_file_type": "zip", "update_file_version": "1.0.2", "ecu_id": "16"})),
        ),
        (
            StaticCommand::change_session("1").unwrap(),
            "/api/change_session",
            Some(json!({"sub_funct": 1})),
        ),
        (
            StaticCommand::read_timing("3").unwrap(),
            "/api/read_access_timing",
            Some(json!({"sub_funct": 3})),
        ),
        (
            StaticCommand::write_timing("50", "5000").unwrap(),
            "/api/write_timing",
            Some(json!({"p2_max": 50, "p2_star_max": 5000})),
        ),
        (
            StaticCommand::reset_ecu("soft", "10").unwrap(),
            "/api/reset_ecu",
            Some(json!({"type_reset": "soft", "ecu_id": "10"})),
        ),
        (StaticCommand::ReadInfo(Entity::Doors), "/api/read_info_doors", None),
        (StaticCommand::DriveUpdateData, "/api/drive_update_data", None),
    ];

    for (command, path, body) in cases {
        assert_eq!(command.endpoint().path(), path);
        assert_eq!(command.body().unwrap(), body, "{path}");
    }
}

#[test]
fn test_write_info_sends_every_field() {
    let command = StaticCommand::write_info(
        Entity::Hvac,
        [("fan_speed", Some("3".to_string())), ("hvac_modes", None)],
    )
    .unwrap();

    assert_eq!(command.endpoint().path(), "/api/write_info_hvac");
    assert_eq!(
        command.body().unwrap(),
        Some(json!({
            "mass_air_flow": null,
            "ambient_air_temperature": null,
            "cabin_temperature": null,
            "cabin_temperature_driver_set": null,
            "fan_speed": "3",
            "hvac_modes": null
        }))
    );
}

#[test]
fn test_invalid_static_input_builds_nothing() {
    assert!(StaticCommand::update_to_version("zip", "1.0", "0x10").is_err());
    assert!(StaticCommand::change_session("4").is_err());
    assert!(StaticCommand::read_timing("2").is_err());
    assert!(StaticCommand::write_timing("12ms", "5").is_err());
    assert!(StaticCommand::reset_ecu("soft", "12").is_err());
    assert!(StaticCommand::send_frame("", "00").is_err());
}
