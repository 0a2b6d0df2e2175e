/*============================================================
  Synavera Project: Syn-WP
  Module: synwp_core::wpcli
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Interface with WP-CLI to query pending core, plugin, and
    theme updates and to read site options.

  Security / Safety Notes:
    Executes the configured `wp` binary with user privileges;
    `--allow-root` is only passed when explicitly configured.
    Arguments are passed discretely, never through a shell.

  Dependencies:
    tokio::process for command execution.

  Operational Scope:
    Supplies the report runner with typed update records and
    the mail dispatcher with site addresses.

  Revision History:
    2025-11-12 COD  Crafted WP-CLI integration layer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic command invocation with explicit checks
    - Structured parsing with clear failure modes
    - Reusable helpers for external command diagnostics
============================================================*/

use std::io;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::WpConfig;
use crate::error::{Result, UpdateCheckError};
use crate::updates::{parse_core_updates, parse_package_updates, CoreUpdateInfo, PackageUpdateInfo};

pub const CORE_CHECK: &[&str] = &["core", "check-update"];
pub const PLUGIN_CHECK: &[&str] = &["plugin", "update", "--all", "--dry-run"];
pub const THEME_CHECK: &[&str] = &["theme", "update", "--all", "--dry-run"];

/// Executes named WP-CLI subcommands against the installation under inspection.
#[allow(async_fn_in_trait)]
pub trait SelfInvoke {
    /// Run a subcommand with `--format=json` and return its stdout.
    async fn launch_json(&self, args: &[&str]) -> Result<String>;
}

/// WP-CLI backed by a real `wp` binary.
#[derive(Debug, Clone)]
pub struct WpCli {
    binary: String,
    globals: Vec<String>,
}

impl WpCli {
    pub fn new(config: &WpConfig) -> Self {
        let mut globals = Vec::new();
        if let Some(path) = &config.path {
            globals.push(format!("--path={}", path.display()));
        }
        if let Some(url) = &config.url {
            globals.push(format!("--url={url}"));
        }
        if config.allow_root {
            globals.push("--allow-root".to_string());
        }
        // Keeps stdout free of `Success:` chatter so it stays valid JSON.
        globals.push("--quiet".to_string());
        Self {
            binary: config.binary.clone(),
            globals,
        }
    }

    fn describe(&self, args: &[&str]) -> String {
        let mut parts = vec![self.binary.as_str()];
        parts.extend_from_slice(args);
        parts.join(" ")
    }
}

impl SelfInvoke for WpCli {
    async fn launch_json(&self, args: &[&str]) -> Result<String> {
        let command = self.describe(args);
        let output = Command::new(&self.binary)
            .args(&self.globals)
            .args(args)
            .arg("--format=json")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|err| map_spawn_error(err, &self.binary))?;

        if !output.status.success() {
            return Err(UpdateCheckError::SubqueryFailure {
                command,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|err| UpdateCheckError::SubqueryOutput {
            command,
            detail: format!("invalid UTF-8: {err}"),
        })
    }
}

/// Pending core releases, in WP-CLI order.
pub async fn core_updates<I: SelfInvoke>(wp: &I) -> Result<Vec<CoreUpdateInfo>> {
    let stdout = wp.launch_json(CORE_CHECK).await?;
    parse_core_updates(&CORE_CHECK.join(" "), &stdout)
}

/// Plugins with a newer version available, in WP-CLI order.
pub async fn plugin_updates<I: SelfInvoke>(wp: &I) -> Result<Vec<PackageUpdateInfo>> {
    let stdout = wp.launch_json(PLUGIN_CHECK).await?;
    parse_package_updates(&PLUGIN_CHECK.join(" "), &stdout)
}

/// Themes with a newer version available, in WP-CLI order.
pub async fn theme_updates<I: SelfInvoke>(wp: &I) -> Result<Vec<PackageUpdateInfo>> {
    let stdout = wp.launch_json(THEME_CHECK).await?;
    parse_package_updates(&THEME_CHECK.join(" "), &stdout)
}

/// Read a string-valued site option via `wp option get`.
pub async fn site_option<I: SelfInvoke>(wp: &I, name: &str) -> Result<String> {
    let args = ["option", "get", name];
    let stdout = wp.launch_json(&args).await?;
    serde_json::from_str::<String>(stdout.trim()).map_err(|err| UpdateCheckError::SubqueryOutput {
        command: args.join(" "),
        detail: err.to_string(),
    })
}

/// The public URL of the installation (`home`).
pub async fn home_url<I: SelfInvoke>(wp: &I) -> Result<String> {
    site_option(wp, "home").await
}

/// The WordPress address (`siteurl`).
pub async fn site_url<I: SelfInvoke>(wp: &I) -> Result<String> {
    site_option(wp, "siteurl").await
}

pub async fn admin_email<I: SelfInvoke>(wp: &I) -> Result<String> {
    site_option(wp, "admin_email").await
}

fn map_spawn_error(err: io::Error, command: &str) -> UpdateCheckError {
    if err.kind() == io::ErrorKind::NotFound {
        UpdateCheckError::CommandMissing {
            command: command.into(),
        }
    } else {
        UpdateCheckError::Runtime(format!("Failed to spawn {command}: {err}"))
    }
}
