// otactl/src/config/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::error::{OtactlError, Result as OtactlResult};

const DEFAULT_CONFIG_CONTENT: &str = include_str!("default_config.toml");
const TEMPLATE_CONFIG_CONTENT: &str = include_str!("template_config.toml");

/// Environment variable overriding the base directory.
pub const BASE_DIR_ENV: &str = "OTACTL_HOME";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OtaConfig {
    pub status_ecu_id: String,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct LogSection {
    dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
struct FileConfig {
    api: ApiConfig,
    ota: OtaConfig,
    log: LogSection,
}

#[derive(Debug, Clone)]
pub struct OtactlConfig {
    pub base_dir: PathBuf,
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
    pub api: ApiConfig,
    pub ota: OtaConfig,
}

impl OtactlConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.ota.poll_interval_ms)
    }
}

/// Non-fatal findings collected while loading the configuration.
///
/// Loading happens before logging is initialized, so warnings are buffered
/// and emitted by the caller once the subscriber is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLoadWarning {
    /// General-purpose notice (e.g. a file was created).
    Internal(String),

    /// The key does not exist in the built-in defaults.
    UnknownKey { key: String, file: PathBuf },

    /// The value type differs from the built-in default.
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
        file: PathBuf,
    },
}

impl fmt::Display for ConfigLoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLoadWarning::Internal(msg) => write!(f, "{}", msg),
            ConfigLoadWarning::UnknownKey { key, file } => {
                write!(f, "Key '{}' in {:?} ignored due to missing in default config", key, file)
            }
            ConfigLoadWarning::TypeMismatch { key, expected, found, file } => write!(
                f,
                "Key '{}' in {:?} ignored: expected {}, found {}",
                key, file, expected, found
            ),
        }
    }
}

/// Picks the base directory: explicit path, then `$OTACTL_HOME`, then `~/.otactl`.
pub fn resolve_base_dir(explicit: Option<PathBuf>) -> OtactlResult<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(BASE_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().ok_or(OtactlError::HomeDirNotFound)?;
    Ok(home.join(".otactl"))
}

pub async fn load(
    base_dir: Option<PathBuf>,
) -> OtactlResult<(OtactlConfig, Vec<ConfigLoadWarning>)> {
    let base_dir = resolve_base_dir(base_dir)?;
    load_from_dir(&base_dir).await
}

/// Loads `<base_dir>/config/otactl.toml` merged over the built-in defaults.
pub async fn load_from_dir(
    base_dir: &Path,
) -> OtactlResult<(OtactlConfig, Vec<ConfigLoadWarning>)> {
    let config_dir = base_dir.join("config");
    let (main_config_path, mut warnings) = ensure_config_template(&config_dir).await?;

    let defaults: toml::Table = toml::from_str(DEFAULT_CONFIG_CONTENT)
        .map_err(|e| OtactlError::Config(format!("built-in defaults: {}", e)))?;

    let contents = fs::read_to_string(&main_config_path)
        .await
        .map_err(|e| OtactlError::io_with_path(main_config_path.clone(), e))?;
    let user: toml::Table = toml::from_str(&contents)
        .map_err(|e| OtactlError::Config(format!("{}: {}", main_config_path.display(), e)))?;

    let merged = merge_config(defaults, user, &main_config_path, &mut warnings);
    let file: FileConfig = toml::Value::Table(merged)
        .try_into()
        .map_err(|e| OtactlError::Config(format!("{}: {}", main_config_path.display(), e)))?;

    if file.ota.poll_interval_ms == 0 {
        return Err(OtactlError::Config("ota.poll_interval_ms must be greater than zero".into()));
    }
    if file.api.timeout_ms == 0 {
        return Err(OtactlError::Config("api.timeout_ms must be greater than zero".into()));
    }

    Ok((
        OtactlConfig {
            base_dir: base_dir.to_path_buf(),
            log_dir: base_dir.join(&file.log.dir),
            config_dir,
            api: file.api,
            ota: file.ota,
        },
        warnings,
    ))
}

async fn ensure_config_template(
    config_dir: &Path,
) -> OtactlResult<(PathBuf, Vec<ConfigLoadWarning>)> {
    let main_config_path = config_dir.join("otactl.toml");
    let template_path = config_dir.join("otactl.template.toml");

    let mut warnings = vec![];

    fs::create_dir_all(config_dir)
        .await
        .map_err(|e| OtactlError::io_with_path(config_dir.to_path_buf(), e))?;

    if !template_path.exists() {
        fs::write(&template_path, TEMPLATE_CONFIG_CONTENT)
            .await
            .map_err(|e| OtactlError::io_with_path(template_path.clone(), e))?;
        warnings.push(ConfigLoadWarning::Internal(format!(
            "Created default config template at {:?}",
            template_path
        )));
    }

    if !main_config_path.exists() {
        fs::copy(&template_path, &main_config_path)
            .await
            .map_err(|e| OtactlError::io_with_path(main_config_path.clone(), e))?;
        warnings.push(ConfigLoadWarning::Internal(format!(
            "Created default config at {:?}",
            main_config_path
        )));
    }

    Ok((main_config_path, warnings))
}

/// Overlays `user` onto `defaults`. Only keys present in the defaults with a
/// value of the same type are taken; everything else becomes a warning.
fn merge_config(
    mut defaults: toml::Table,
    user: toml::Table,
    file: &Path,
    warnings: &mut Vec<ConfigLoadWarning>,
) -> toml::Table {
    merge_into(&mut defaults, user, "", file, warnings);
    defaults
}

fn merge_into(
    target: &mut toml::Table,
    source: toml::Table,
    prefix: &str,
    file: &Path,
    warnings: &mut Vec<ConfigLoadWarning>,
) {
    for (key, value) in source {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match (target.get_mut(&key), value) {
            (None, _) => warnings.push(ConfigLoadWarning::UnknownKey {
                key: full_key,
                file: file.to_path_buf(),
            }),
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                merge_into(existing, nested, &full_key, file, warnings);
            }
            (Some(existing), value) if existing.same_type(&value) => {
                *existing = value;
            }
            (Some(existing), value) => warnings.push(ConfigLoadWarning::TypeMismatch {
                key: full_key,
                expected: existing.type_str(),
                found: value.type_str(),
                file: file.to_path_buf(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table(s: &str) -> toml::Table {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_merge_config_overrides_known_keys() {
        let defaults = table(DEFAULT_CONFIG_CONTENT);
        let user = table("[api]\nbase_url = \"http://bench:8080\"\n");
        let mut warnings = vec![];

        let merged = merge_config(defaults, user, Path::new("otactl.toml"), &mut warnings);

        assert!(warnings.is_empty());
        assert_eq!(merged["api"]["base_url"].as_str(), Some("http://bench:8080"));
        assert_eq!(merged["api"]["timeout_ms"].as_integer(), Some(5000));
        assert_eq!(merged["ota"]["status_ecu_id"].as_str(), Some("0x10"));
    }

    #[test]
    fn test_merge_config_ignores_unknown_keys() {
        let defaults = table(DEFAULT_CONFIG_CONTENT);
        let user = table("[api]\nretries = 3\n[metrics]\nenabled = true\n");
        let mut warnings = vec![];

        let merged = merge_config(defaults, user, Path::new("otactl.toml"), &mut warnings);

        assert!(merged["api"].get("retries").is_none());
        assert!(merged.get("metrics").is_none());
        let keys: Vec<_> = warnings
            .iter()
            .map(|w| match w {
                ConfigLoadWarning::UnknownKey { key, .. } => key.as_str(),
                other => panic!("unexpected warning {:?}", other),
            })
            .collect();
        assert_eq!(keys, vec!["api.retries", "metrics"]);
    }

    #[test]
    fn test_merge_config_rejects_type_mismatch() {
        let defaults = table(DEFAULT_CONFIG_CONTENT);
        let user = table("[ota]\npoll_interval_ms = \"fast\"\n");
        let mut warnings = vec![];

        let merged = merge_config(defaults, user, Path::new("otactl.toml"), &mut warnings);

        assert_eq!(merged["ota"]["poll_interval_ms"].as_integer(), Some(1000));
        assert!(matches!(
            &warnings[..],
            [ConfigLoadWarning::TypeMismatch { key, expected: "integer", found: "string", .. }]
                if key == "ota.poll_interval_ms"
        ));
    }

    #[tokio::test]
    async fn test_load_creates_template_and_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();

        let (config, warnings) = load_from_dir(temp_dir.path()).await.unwrap();

        assert!(temp_dir.path().join("config/otactl.toml").exists());
        assert!(temp_dir.path().join("config/otactl.template.toml").exists());
        assert_eq!(warnings.len(), 2);
        assert_eq!(config.api.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.ota.status_ecu_id, "0x10");
        assert_eq!(config.log_dir, temp_dir.path().join("logs"));
    }

    #[tokio::test]
    async fn test_load_reads_user_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().join("config");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("otactl.toml"),
            "[ota]\nstatus_ecu_id = \"0x11\"\npoll_interval_ms = 250\n",
        )
        .unwrap();

        let (config, _) = load_from_dir(temp_dir.path()).await.unwrap();

        assert_eq!(config.ota.status_ecu_id, "0x11");
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_load_rejects_zero_interval() {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().join("config");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("otactl.toml"), "[ota]\npoll_interval_ms = 0\n").unwrap();

        let result = load_from_dir(temp_dir.path()).await;
        assert!(matches!(result, Err(OtactlError::Config(_))));
    }

    #[test]
    fn test_explicit_base_dir_wins() {
        let dir = resolve_base_dir(Some(PathBuf::from("/opt/otactl"))).unwrap();
        assert_eq!(dir, PathBuf::from("/opt/otactl"));
    }
}
