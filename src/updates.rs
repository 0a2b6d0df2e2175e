/*============================================================
  Synavera Project: Syn-WP
  Module: synwp_core::updates
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Typed records describing pending WordPress core, plugin,
    and theme updates, decoded from WP-CLI JSON output.

  Security / Safety Notes:
    Pure data container and parser; no I/O performed here.

  Dependencies:
    serde and serde_json for the parse boundary.

  Operational Scope:
    Produced by the subquery layer and consumed by report
    assembly for the lifetime of one run.

  Revision History:
    2025-11-12 COD  Introduced typed update records.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
    - Malformed input rejected at the boundary
============================================================*/

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Result, UpdateCheckError};

/// Severity of a pending core release as reported by `wp core check-update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    Major,
    Minor,
}

impl UpdateType {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateType::Major => "major",
            UpdateType::Minor => "minor",
        }
    }
}

/// A core release newer than the installed one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoreUpdateInfo {
    pub update_type: UpdateType,
    pub version: String,
}

/// A plugin or theme with a newer version available.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageUpdateInfo {
    pub name: String,
    #[serde(rename = "version")]
    pub current_version: String,
    #[serde(rename = "update_version")]
    pub available_version: String,
}

/// Decode the output of `wp core check-update --format=json`.
pub fn parse_core_updates(command: &str, stdout: &str) -> Result<Vec<CoreUpdateInfo>> {
    parse_records(command, stdout)
}

/// Decode the output of `wp plugin|theme update --all --dry-run --format=json`.
pub fn parse_package_updates(command: &str, stdout: &str) -> Result<Vec<PackageUpdateInfo>> {
    parse_records(command, stdout)
}

// Blank output counts as an empty list; WP-CLI emits nothing for some empty results.
fn parse_records<T: DeserializeOwned>(command: &str, stdout: &str) -> Result<Vec<T>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Vec<T>>(trimmed).map_err(|err| UpdateCheckError::SubqueryOutput {
        command: command.to_string(),
        detail: err.to_string(),
    })
}
