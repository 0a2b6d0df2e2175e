/*============================================================
  Synavera Project: Syn-WP
  Module: synwp_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Syn-WP error types to provide consistent
    diagnostics and exit semantics for the update-check run.

  Security / Safety Notes:
    Error contexts carry command lines and stderr excerpts from
    WP-CLI and the mail transport; no credentials are attached.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate failures and consolidate
    exit codes for the binary entry point.

  Revision History:
    2025-11-12 COD  Carved error taxonomy for the update check.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Syn-WP operations.
pub type Result<T> = std::result::Result<T, UpdateCheckError>;

/// Enumerates high-level error domains surfaced by Syn-WP.
#[derive(Debug, Error)]
pub enum UpdateCheckError {
    #[error("Required command `{command}` not found in PATH")]
    CommandMissing { command: String },
    #[error("Subquery `{command}` failed with status {status}: {stderr}")]
    SubqueryFailure {
        command: String,
        status: i32,
        stderr: String,
    },
    #[error("Subquery `{command}` returned unusable output: {detail}")]
    SubqueryOutput { command: String, detail: String },
    #[error("Mail transport: {0}")]
    MailTransport(String),
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Runtime: {0}")]
    Runtime(String),
}

impl UpdateCheckError {
    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    fn code(&self) -> u8 {
        match self {
            UpdateCheckError::CommandMissing { .. } => 10,
            UpdateCheckError::SubqueryFailure { .. } => 11,
            UpdateCheckError::SubqueryOutput { .. } => 12,
            UpdateCheckError::MailTransport(_) => 13,
            UpdateCheckError::Config(_) => 20,
            UpdateCheckError::Filesystem(_) => 40,
            UpdateCheckError::Runtime(_) => 50,
        }
    }

    /// True for failures raised while talking to WP-CLI.
    pub fn is_subquery(&self) -> bool {
        matches!(
            self,
            UpdateCheckError::SubqueryFailure { .. } | UpdateCheckError::SubqueryOutput { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subquery_errors_have_distinct_codes() {
        let failure = UpdateCheckError::SubqueryFailure {
            command: "wp core check-update".into(),
            status: 1,
            stderr: "Error: This does not seem to be a WordPress installation.".into(),
        };
        let output = UpdateCheckError::SubqueryOutput {
            command: "wp plugin update".into(),
            detail: "expected value at line 1 column 1".into(),
        };
        assert_eq!(failure.code(), 11);
        assert_eq!(output.code(), 12);
        assert!(failure.is_subquery());
        assert!(output.is_subquery());
        assert!(!UpdateCheckError::MailTransport("boom".into()).is_subquery());
    }

    #[test]
    fn failure_message_names_the_command() {
        let err = UpdateCheckError::SubqueryFailure {
            command: "wp theme update --all --dry-run".into(),
            status: 255,
            stderr: "fatal".into(),
        };
        assert_eq!(
            err.to_string(),
            "Subquery `wp theme update --all --dry-run` failed with status 255: fatal"
        );
    }
}
