// otactl/src/log/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

use crate::config::OtactlConfig;
use crate::error::{OtactlError, Result as OtactlResult};

pub const LOG_FILE_NAME: &str = "otactl.log";

/// Loads `tracing.cfg` and initializes the global tracing subscriber.
///
/// The returned guard flushes the file writer on drop and must live as long
/// as the process logs.
pub fn init(config: &OtactlConfig) -> OtactlResult<Option<WorkerGuard>> {
    let mut file_guard: Option<WorkerGuard> = None;

    let tracing_cfg_path = config.config_dir.join("tracing.cfg");
    let tracing_cfg = load_tracing_config(&tracing_cfg_path)?;

    let env_filter = EnvFilter::try_new(tracing_cfg.directives())
        .map_err(|e| OtactlError::Config(format!("invalid log filter: {}", e)))?;

    let mut layers = Vec::new();

    if tracing_cfg.file {
        fs::create_dir_all(&config.log_dir)
            .map_err(|e| OtactlError::io_with_path(config.log_dir.clone(), e))?;

        let file_appender = tracing_appender::rolling::never(&config.log_dir, LOG_FILE_NAME);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = if tracing_cfg.structured {
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false)
                .boxed()
        } else {
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .boxed()
        };
        layers.push(file_layer);
        file_guard = Some(guard);
    }

    if tracing_cfg.stderr {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .boxed();
        layers.push(console_layer);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| OtactlError::Internal(format!("failed to init tracing: {}", e)))?;

    Ok(file_guard)
}

fn load_tracing_config(path: &Path) -> OtactlResult<TracingConfig> {
    if !path.exists() {
        return Ok(TracingConfig::default());
    }

    let contents =
        fs::read_to_string(path).map_err(|e| OtactlError::io_with_path(path.to_path_buf(), e))?;
    toml::from_str(&contents).map_err(|e| OtactlError::Config(format!("tracing.cfg: {}", e)))
}

/// Helper: deserialize LevelFilter from string (e.g., "info", "debug")
fn deserialize_level_filter<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<LevelFilter>().map_err(serde::de::Error::custom)
}

fn deserialize_module_levels<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, LevelFilter>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: HashMap<String, String> = Deserialize::deserialize(deserializer)?;
    map.into_iter()
        .map(|(target, level)| {
            level
                .parse::<LevelFilter>()
                .map(|level| (target, level))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

#[derive(Deserialize, Debug, Clone)]
pub struct TracingConfig {
    #[serde(default = "default_log_level", deserialize_with = "deserialize_level_filter")]
    pub default_level: LevelFilter,

    #[serde(default)]
    pub structured: bool,

    /// Off by default; stderr is shared with operator prompts.
    #[serde(default)]
    pub stderr: bool,

    #[serde(default = "default_file")]
    pub file: bool,

    #[serde(default, deserialize_with = "deserialize_module_levels")]
    pub modules: HashMap<String, LevelFilter>,
}

fn default_log_level() -> LevelFilter {
    LevelFilter::INFO
}
fn default_file() -> bool {
    true
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: default_log_level(),
            structured: false,
            stderr: false,
            file: default_file(),
            modules: HashMap::new(),
        }
    }
}

impl TracingConfig {
    /// `EnvFilter` directives: both crates at the default level, then per-module overrides.
    fn directives(&self) -> String {
        let mut directives = vec![
            format!("otactl={}", self.default_level),
            format!("otactl_types={}", self.default_level),
        ];
        let mut modules: Vec<_> = self.modules.iter().collect();
        modules.sort_by(|a, b| a.0.cmp(b.0));
        for (target, level) in modules {
            directives.push(format!("{}={}", target, level));
        }
        directives.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_tracing_cfg_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = load_tracing_config(&temp_dir.path().join("tracing.cfg")).unwrap();
        assert_eq!(cfg.default_level, LevelFilter::INFO);
        assert!(cfg.file);
        assert!(!cfg.stderr);
        assert!(!cfg.structured);
    }

    #[test]
    fn test_tracing_cfg_is_parsed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracing.cfg");
        std::fs::write(
            &path,
            "default_level = \"debug\"\nstderr = true\n[modules]\n\"otactl::poller\" = \"trace\"\n",
        )
        .unwrap();

        let cfg = load_tracing_config(&path).unwrap();
        assert_eq!(cfg.default_level, LevelFilter::DEBUG);
        assert!(cfg.stderr);
        assert_eq!(
            cfg.directives(),
            "otactl=debug,otactl_types=debug,otactl::poller=trace"
        );
    }

    #[test]
    fn test_invalid_level_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracing.cfg");
        std::fs::write(&path, "default_level = \"loud\"\n").unwrap();

        assert!(matches!(load_tracing_config(&path), Err(OtactlError::Config(_))));
    }
}
