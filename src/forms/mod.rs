// otactl/src/forms/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Routine control and OTA action forms built from templates.

use clap::Args;
use serde_json::Value;

use otactl_types::dispatch;
use otactl_types::{DispatchError, Template, TemplateCategory, ValidationError};

use crate::client::ApiClient;
use crate::commands::parse_assignment;
use crate::error::{OtactlError, Result as OtactlResult};

/// Template selection plus input overrides.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct FormArgs {
    /// Template name, e.g. EraseDataRoutine
    pub template: String,
    /// Override an input value
    #[arg(long = "set", value_name = "ID=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub id: &'static str,
    pub label: &'static str,
    pub value: String,
    pub disabled: bool,
}

/// Submit control, tagged with what it dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    pub label: &'static str,
    pub template: Template,
    pub category: TemplateCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    inputs: Vec<FormInput>,
    submit: Option<SubmitControl>,
}

impl Form {
    /// Builds the form for `name` within `category`. Unknown names give an
    /// empty form without a submit control.
    pub fn build(category: TemplateCategory, name: &str) -> Form {
        match Template::lookup(category, name) {
            Some(template) => Form::for_template(template),
            None => {
                tracing::debug!(%category, name, "No template, empty form");
                Form::default()
            }
        }
    }

    /// Builds the form and applies the overrides. Unknown templates are an error.
    pub fn from_args(category: TemplateCategory, args: &FormArgs) -> OtactlResult<Form> {
        let mut form = Form::build(category, &args.template);
        if form.is_empty() {
            return Err(ValidationError::UnknownTemplate(args.template.clone()).into());
        }
        for (id, value) in &args.set {
            form.set(id, value)?;
        }
        Ok(form)
    }

    pub fn for_template(template: Template) -> Form {
        let inputs: Vec<FormInput> = template
            .fields()
            .iter()
            .map(|field| FormInput {
                id: field.id,
                label: field.label,
                value: field.default.to_string(),
                disabled: !field.editable,
            })
            .collect();

        let submit = (!inputs.is_empty()).then(|| SubmitControl {
            label: template.category().submit_label(),
            template,
            category: template.category(),
        });

        Form { inputs, submit }
    }

    pub fn inputs(&self) -> &[FormInput] {
        &self.inputs
    }

    pub fn submit_control(&self) -> Option<&SubmitControl> {
        self.submit.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Overwrites the value of an editable input.
    pub fn set(&mut self, id: &str, value: &str) -> OtactlResult<()> {
        let input = self
            .inputs
            .iter_mut()
            .find(|input| input.id == id)
            .ok_or_else(|| OtactlError::UnknownInput(id.to_string()))?;
        if input.disabled {
            return Err(OtactlError::ReadOnlyInput(id.to_string()));
        }
        input.value = value.to_string();
        Ok(())
    }

    pub fn render(&self) -> String {
        let Some(submit) = &self.submit else {
            return "(empty form)".to_string();
        };
        let mut lines = vec![format!("{} [{}]", submit.template, submit.category)];
        for input in &self.inputs {
            let marker = if input.disabled { " (read-only)" } else { "" };
            lines.push(format!(
                "  {:<12} {:<18} = {}{}",
                input.label, input.id, input.value, marker
            ));
        }
        lines.push(format!("  <{}>", submit.label));
        lines.join("\n")
    }

    /// Validates every input, reports the rejected ones and sends the request
    /// the template routes to. Nothing is sent when routing fails.
    pub async fn submit(&self, client: &ApiClient) -> OtactlResult<Value> {
        let submit = self.submit.ok_or(OtactlError::NoActiveForm)?;
        if !dispatch::is_supported(submit.template) {
            return Err(DispatchError::Unsupported(submit.template).into());
        }

        let submission =
            dispatch::collect(self.inputs.iter().map(|input| (input.id, input.value.as_str())));
        for rejection in &submission.rejected {
            tracing::warn!(
                template = %submit.template,
                field = %rejection.id,
                "Input rejected: {}",
                rejection.error
            );
            client.notice(&format!("Input '{}' rejected: {}", rejection.id, rejection.error))?;
        }

        let target = dispatch::route(submit.template, &submission.payload)?;
        tracing::info!(template = %submit.template, endpoint = %target.endpoint, "Submitting form");
        client.call(target.endpoint, Some(target.body)).await
    }
}
