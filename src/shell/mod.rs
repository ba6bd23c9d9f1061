// otactl/src/shell/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Interactive console.
//!
//! Keeps one client, one active form and one OTA status poller for the whole
//! session. Lines are handled strictly one after another.

use std::io::{self, BufRead};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use otactl_types::TemplateCategory;

use crate::client::ApiClient;
use crate::commands::{self, parse_assignment, Prompter, StaticArgs};
use crate::error::{OtactlError, Result as OtactlResult};
use crate::forms::{Form, FormArgs};
use crate::poller::OtaStatusPoller;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "otactl>", disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    #[command(flatten)]
    Static(StaticArgs),
    /// Refresh the log table
    Logs,
    /// Open a routine control form
    Routine(FormArgs),
    /// Open an OTA action form
    OtaAction(FormArgs),
    /// Show the open form
    Form,
    /// Change inputs of the open form
    Set {
        #[arg(value_name = "ID=VALUE", value_parser = parse_assignment, required = true)]
        assignments: Vec<(String, String)>,
    },
    /// Send the open form
    Submit,
    /// Query the OTA state once, or toggle recurring polling
    OtaStatus {
        #[arg(long)]
        toggle: bool,
    },
    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell<P: Prompter> {
    client: Arc<ApiClient>,
    poller: OtaStatusPoller,
    form: Form,
    prompter: P,
}

impl<P: Prompter> Shell<P> {
    pub fn new(client: Arc<ApiClient>, poller: OtaStatusPoller, prompter: P) -> Self {
        Self {
            client,
            poller,
            form: Form::default(),
            prompter,
        }
    }

    /// Reads lines from stdin until `exit` or end of input.
    pub async fn run(mut self) -> OtactlResult<()> {
        let mut label_rx = self.poller.label();
        let label_client = self.client.clone();
        let label_task = tokio::spawn(async move {
            while label_rx.changed().await.is_ok() {
                let label = label_rx.borrow_and_update().clone();
                if let Err(e) = label_client.label(&label) {
                    tracing::warn!("Rendering status label failed: {}", e);
                }
            }
        });

        self.client.notice("otactl shell. Type 'help' for commands, 'exit' to leave.")?;
        loop {
            let Some(line) = read_line().await? else {
                break;
            };
            match self.execute_line(&line).await {
                Ok(Flow::Exit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => self.report(&e)?,
            }
        }

        if self.poller.is_running() {
            self.poller.stop().await?;
        }
        label_task.abort();
        Ok(())
    }

    /// Parses and executes one line.
    pub async fn execute_line(&mut self, line: &str) -> OtactlResult<Flow> {
        let words = split_line(line).map_err(OtactlError::Config)?;
        if words.is_empty() {
            return Ok(Flow::Continue);
        }

        let command = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                // Help and usage errors are rendered by clap itself.
                self.client.block("Usage", e.render().to_string().trim_end())?;
                return Ok(Flow::Continue);
            }
        };
        tracing::debug!(?command, "Shell command");

        match command {
            ShellCommand::Static(args) => {
                commands::run(&self.client, &mut self.prompter, args).await?;
            }
            ShellCommand::Logs => {
                self.client.refresh_logs().await?;
            }
            ShellCommand::Routine(args) => self.open_form(TemplateCategory::Routine, &args)?,
            ShellCommand::OtaAction(args) => self.open_form(TemplateCategory::OtaAction, &args)?,
            ShellCommand::Form => self.client.block("Form", &self.form.render())?,
            ShellCommand::Set { assignments } => {
                for (id, value) in &assignments {
                    self.form.set(id, value)?;
                }
                self.client.block("Form", &self.form.render())?;
            }
            ShellCommand::Submit => {
                self.form.submit(&self.client).await?;
            }
            ShellCommand::OtaStatus { toggle: false } => {
                self.poller.poll_once().await?;
            }
            ShellCommand::OtaStatus { toggle: true } => {
                let running = self.poller.toggle().await?;
                let state = if running { "started" } else { "stopped" };
                self.client.notice(&format!("OTA status polling {}", state))?;
            }
            ShellCommand::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    /// Selecting a template always replaces the open form, even with an empty one.
    fn open_form(&mut self, category: TemplateCategory, args: &FormArgs) -> OtactlResult<()> {
        self.form = Form::default();
        self.form = Form::from_args(category, args)?;
        self.client.block("Form", &self.form.render())
    }

    fn report(&mut self, error: &OtactlError) -> OtactlResult<()> {
        if error.is_notice() {
            tracing::info!("Command not sent: {}", error);
        } else {
            tracing::error!("Command failed: {}", error);
        }
        self.client.notice(&error.to_string())
    }
}

async fn read_line() -> OtactlResult<Option<String>> {
    let line = tokio::task::spawn_blocking(|| {
        eprint!("otactl> ");
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map(|n| (n, line))
    })
    .await??;

    match line {
        (0, _) => Ok(None),
        (_, line) => Ok(Some(line.trim_end_matches(['\r', '\n']).to_string())),
    }
}

/// Splits a shell line on whitespace, honouring single and double quotes.
fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {} quote", q));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::ScriptedPrompter;
    use crate::testing::{SharedBuffer, StubBackend};
    use serde_json::json;
    use std::time::Duration;

    fn shell(stub: &StubBackend, out: SharedBuffer) -> Shell<ScriptedPrompter> {
        let client = Arc::new(stub.client(out));
        let poller = OtaStatusPoller::new(client.clone(), "0x10", Duration::from_millis(1000));
        Shell::new(client, poller, ScriptedPrompter::default())
    }

    #[test]
    fn test_split_line_honours_quotes() {
        assert_eq!(
            split_line(r#"send-frame --can-id 0x123 --can-data "01 02 03""#).unwrap(),
            vec!["send-frame", "--can-id", "0x123", "--can-data", "01 02 03"]
        );
        assert_eq!(split_line("  ").unwrap(), Vec::<String>::new());
        assert_eq!(split_line("set data=''").unwrap(), vec!["set", "data="]);
        assert!(split_line("set 'data=0x1").is_err());
    }

    #[test]
    fn test_shell_line_parses_static_commands() {
        let parsed = ShellLine::try_parse_from(["reset-ecu", "--type", "soft", "--ecu-id", "10"]).unwrap();
        assert_eq!(
            parsed.command,
            ShellCommand::Static(StaticArgs::ResetEcu {
                type_reset: Some("soft".into()),
                ecu_id: Some("10".into()),
            })
        );
        let parsed = ShellLine::try_parse_from(["ota-status", "--toggle"]).unwrap();
        assert_eq!(parsed.command, ShellCommand::OtaStatus { toggle: true });
    }

    #[tokio::test]
    async fn test_form_workflow() {
        let stub = StubBackend::spawn().await;
        let out = SharedBuffer::default();
        let mut shell = shell(&stub, out.clone());

        shell.execute_line("routine EraseDataRoutine").await.unwrap();
        shell.execute_line("set size=0x10 receiver-ecu=0x12").await.unwrap();
        shell.execute_line("submit").await.unwrap();

        assert_eq!(
            stub.requests()[0].body,
            Some(json!({"ecu_id": "0x12", "address": "0x0800", "nrBytes": "0x10"}))
        );
        assert!(out.contents().contains("EraseDataRoutine [routine]"));
        stub.stop();
    }

    #[tokio::test]
    async fn test_unknown_template_clears_form() {
        let stub = StubBackend::spawn().await;
        let mut shell = shell(&stub, SharedBuffer::default());

        shell.execute_line("ota-action SyncOtaStatus").await.unwrap();
        assert!(shell.execute_line("ota-action EraseDataRoutine").await.is_err());

        let err = shell.execute_line("submit").await.unwrap_err();
        assert!(matches!(err, OtactlError::NoActiveForm));
        assert!(stub.calls().is_empty());
        stub.stop();
    }

    #[tokio::test]
    async fn test_ota_status_toggle_and_exit() {
        let stub = StubBackend::spawn().await;
        let mut shell = shell(&stub, SharedBuffer::default());

        shell.execute_line("ota-status --toggle").await.unwrap();
        assert!(shell.poller.is_running());
        shell.execute_line("ota-status --toggle").await.unwrap();
        assert!(!shell.poller.is_running());

        shell.execute_line("ota-status").await.unwrap();
        assert_eq!(stub.count("/api/ota_status"), 1);

        assert_eq!(shell.execute_line("quit").await.unwrap(), Flow::Exit);
        stub.stop();
    }

    #[tokio::test]
    async fn test_usage_errors_are_shown_not_raised() {
        let stub = StubBackend::spawn().await;
        let out = SharedBuffer::default();
        let mut shell = shell(&stub, out.clone());

        assert_eq!(shell.execute_line("bogus").await.unwrap(), Flow::Continue);
        assert_eq!(shell.execute_line("help").await.unwrap(), Flow::Continue);
        assert!(out.contents().contains("== Usage =="));
        assert!(stub.calls().is_empty());
        stub.stop();
    }
}
