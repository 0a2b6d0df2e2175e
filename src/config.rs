/*============================================================
  Synavera Project: Syn-WP
  Module: synwp_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load Syn-WP configuration from TOML, apply environment
    overrides, and expose resolved WP-CLI, mail, and log
    settings.

  Security / Safety Notes:
    Reads operator-owned files only; values are passed to
    child processes as discrete arguments, never via a shell.

  Dependencies:
    serde and toml for parsing, dirs for default locations.

  Operational Scope:
    Consumed by the entry point before any WP-CLI invocation.

  Revision History:
    2025-11-12 COD  Introduced layered configuration.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit precedence: file < environment < CLI
    - Missing file is not an error; malformed file is
============================================================*/

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, UpdateCheckError};

pub const ENV_CONFIG: &str = "SYNWP_CONFIG";
pub const ENV_WP_BIN: &str = "SYNWP_WP_BIN";
pub const ENV_WP_PATH: &str = "SYNWP_WP_PATH";
pub const ENV_SENDMAIL: &str = "SYNWP_SENDMAIL";

/// Resolved configuration for a Syn-WP session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SynwpConfig {
    pub wp: WpConfig,
    pub mail: MailConfig,
    pub log: LogConfig,
}

/// How WP-CLI is located and which global parameters it receives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WpConfig {
    pub binary: String,
    pub path: Option<PathBuf>,
    pub url: Option<String>,
    pub allow_root: bool,
}

impl Default for WpConfig {
    fn default() -> Self {
        Self {
            binary: "wp".to_string(),
            path: None,
            url: None,
            allow_root: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub sendmail: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sendmail: "sendmail".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Write a session log file even when `--log` is not given.
    pub persist: bool,
    pub dir: Option<PathBuf>,
}

impl SynwpConfig {
    /// Load configuration from an explicit path, `SYNWP_CONFIG`, or the default location.
    ///
    /// An explicit path that does not exist is an error; the default location is optional.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::read(&path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::read(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            UpdateCheckError::Config(format!(
                "Failed to read configuration {}: {err}",
                path.display()
            ))
        })?;
        Self::parse(&raw).map_err(|err| match err {
            UpdateCheckError::Config(msg) => {
                UpdateCheckError::Config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|err| UpdateCheckError::Config(err.to_string()))
    }

    fn apply_env_overrides(&mut self) {
        if let Some(bin) = non_empty_env(ENV_WP_BIN) {
            self.wp.binary = bin;
        }
        if let Some(path) = non_empty_env(ENV_WP_PATH) {
            self.wp.path = Some(PathBuf::from(path));
        }
        if let Some(sendmail) = non_empty_env(ENV_SENDMAIL) {
            self.mail.sendmail = sendmail;
        }
    }

    /// Directory receiving session logs.
    pub fn log_dir(&self) -> PathBuf {
        self.log.dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("synwp")
                .join("logs")
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("synwp").join("config.toml"))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SynwpConfig::parse("").expect("parse");
        assert_eq!(config.wp.binary, "wp");
        assert_eq!(config.mail.sendmail, "sendmail");
        assert!(!config.wp.allow_root);
        assert!(!config.log.persist);
    }

    #[test]
    fn sections_override_defaults() {
        let config = SynwpConfig::parse(
            r#"
            [wp]
            binary = "/usr/local/bin/wp"
            path = "/srv/www/blog"
            allow_root = true

            [mail]
            sendmail = "/usr/sbin/sendmail"

            [log]
            persist = true
            dir = "/var/log/synwp"
            "#,
        )
        .expect("parse");
        assert_eq!(config.wp.binary, "/usr/local/bin/wp");
        assert_eq!(config.wp.path, Some(PathBuf::from("/srv/www/blog")));
        assert!(config.wp.allow_root);
        assert_eq!(config.wp.url, None);
        assert_eq!(config.mail.sendmail, "/usr/sbin/sendmail");
        assert_eq!(config.log_dir(), PathBuf::from("/var/log/synwp"));
    }

    #[test]
    fn malformed_document_is_config_error() {
        let err = SynwpConfig::parse("[wp\nbinary = ").unwrap_err();
        assert!(matches!(err, UpdateCheckError::Config(_)));
    }

    #[test]
    fn explicit_missing_file_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent.toml");
        let err = SynwpConfig::load_from_optional_path(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
