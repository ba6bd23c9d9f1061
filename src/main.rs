// otactl/src/main.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use otactl_types::{Template, TemplateCategory};

mod client;
mod commands;
mod config;
mod display;
mod error;
mod forms;
mod log;
mod poller;
mod shell;
#[cfg(test)]
mod testing;

use client::ApiClient;
use commands::{NoPrompt, Prompter, StaticArgs, StdinPrompter};
use config::{ConfigLoadWarning, OtactlConfig};
use display::Panel;
use error::Result as OtactlResult;
use forms::{Form, FormArgs};
use poller::OtaStatusPoller;
use shell::Shell;

/// otactl: console for the vehicle diagnostics and OTA backend
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base directory for configuration and logs [default: $OTACTL_HOME or ~/.otactl]
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Backend base URL, overrides api.base_url
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Never prompt; missing values are errors
    #[arg(long, global = true)]
    no_prompt: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Static(StaticArgs),
    /// Show the backend log table
    Logs,
    /// Show the inputs of a routine or OTA action template
    Form { template: Template },
    /// Submit a routine control form
    Routine(FormArgs),
    /// Submit an OTA action form
    OtaAction(FormArgs),
    /// Query the OTA state of the configured ECU
    OtaStatus {
        /// Keep polling until Ctrl+C
        #[arg(long)]
        watch: bool,
    },
    /// Interactive console
    Shell,
}

async fn handle_command(
    command: Commands,
    client: Arc<ApiClient>,
    config: &OtactlConfig,
    no_prompt: bool,
) -> OtactlResult<()> {
    let poller = || {
        OtaStatusPoller::new(client.clone(), config.ota.status_ecu_id.clone(), config.poll_interval())
    };

    match command {
        Commands::Static(args) => {
            let mut prompter: Box<dyn Prompter> = if no_prompt {
                Box::new(NoPrompt)
            } else {
                Box::new(StdinPrompter)
            };
            commands::run(&client, prompter.as_mut(), args).await?;
        }
        Commands::Logs => {
            client.refresh_logs().await?;
        }
        Commands::Form { template } => {
            client.block("Form", &Form::for_template(template).render())?;
        }
        Commands::Routine(args) => {
            Form::from_args(TemplateCategory::Routine, &args)?
                .submit(&client)
                .await?;
        }
        Commands::OtaAction(args) => {
            Form::from_args(TemplateCategory::OtaAction, &args)?
                .submit(&client)
                .await?;
        }
        Commands::OtaStatus { watch: false } => {
            let poller = poller();
            poller.poll_once().await?;
            let label = poller.label().borrow().clone();
            client.label(&label)?;
        }
        Commands::OtaStatus { watch: true } => {
            let mut poller = poller();
            let mut label_rx = poller.label();
            poller.start()?;
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    changed = label_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let label = label_rx.borrow_and_update().clone();
                        client.label(&label)?;
                    }
                }
            }
            tracing::info!("Received Ctrl+C, stopping OTA status polling");
            poller.stop().await?;
        }
        Commands::Shell => {
            let poller = poller();
            if no_prompt {
                Shell::new(client.clone(), poller, NoPrompt).run().await?;
            } else {
                Shell::new(client.clone(), poller, StdinPrompter).run().await?;
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration; warnings wait for the logger
    let cli = Cli::parse();
    let (mut config, warnings) = config::load(cli.base_dir.clone()).await?;
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }

    // 2. Initialize logging
    let _log_guard = log::init(&config)?;
    tracing::info!("Starting otactl (v{})", env!("CARGO_PKG_VERSION"));
    tracing::debug!(base_dir = %config.base_dir.display(), "Configuration loaded");
    for warning in &warnings {
        match warning {
            ConfigLoadWarning::Internal(_) => tracing::info!("{}", warning),
            _ => tracing::warn!("{}", warning),
        }
    }

    // 3. Backend client shared by every command
    let panel = Arc::new(Mutex::new(Panel::stdout()));
    let client = Arc::new(ApiClient::new(
        &config.api.base_url,
        config.request_timeout(),
        panel,
    )?);
    tracing::debug!(base_url = client.base_url(), "Initialize API client");

    let result = handle_command(cli.command, client, &config, cli.no_prompt).await;
    if let Err(e) = &result {
        if e.is_notice() {
            tracing::info!("Command not sent: {}", e);
        } else {
            tracing::error!("Command failed: {}", e);
        }
    }

    tracing::info!("Shutting down");
    drop(_log_guard);

    Ok(result?)
}
