/*============================================================
  Synavera Project: Syn-WP
  Module: synwp_core::mailer
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Resolve the report recipient and sender host, then hand the
    report to the mail transport.

  Security / Safety Notes:
    Header values are stripped of CR/LF before they reach the
    transport so report metadata cannot inject headers.

  Dependencies:
    tokio::process and tokio::io for the sendmail transport.

  Operational Scope:
    Invoked by the report runner when `--email` is present and
    a report is due.

  Revision History:
    2025-11-12 COD  Authored email dispatcher and sendmail transport.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Single delivery attempt, failures surface unchanged
    - Deterministic message layout
============================================================*/

use std::io;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{Result, UpdateCheckError};
use crate::wpcli::{self, SelfInvoke};

/// A plain-text message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub headers: Vec<String>,
}

impl MailMessage {
    /// Render as an RFC 822 message suitable for `sendmail -t`.
    pub fn to_rfc822(&self) -> String {
        let mut text = String::new();
        text.push_str(&format!("To: {}\n", header_value(&self.to)));
        text.push_str(&format!("Subject: {}\n", header_value(&self.subject)));
        for header in &self.headers {
            text.push_str(&header_value(header));
            text.push('\n');
        }
        text.push_str("MIME-Version: 1.0\n");
        text.push_str("Content-Type: text/plain; charset=UTF-8\n");
        text.push('\n');
        text.push_str(&self.body);
        if !self.body.ends_with('\n') {
            text.push('\n');
        }
        text
    }
}

fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Delivers a message; success and failure semantics belong to the implementation.
#[allow(async_fn_in_trait)]
pub trait MailTransport {
    async fn deliver(&self, message: &MailMessage) -> Result<()>;
}

/// Transport that pipes the message into a local `sendmail -t -i`.
#[derive(Debug, Clone)]
pub struct SendmailTransport {
    command: String,
}

impl SendmailTransport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl MailTransport for SendmailTransport {
    async fn deliver(&self, message: &MailMessage) -> Result<()> {
        let mut child = Command::new(&self.command)
            .arg("-t")
            .arg("-i")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| map_spawn_error(err, &self.command))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(message.to_rfc822().as_bytes())
                .await
                .map_err(|err| {
                    UpdateCheckError::MailTransport(format!(
                        "Failed to write message to {}: {err}",
                        self.command
                    ))
                })?;
        }

        let output = child.wait_with_output().await.map_err(|err| {
            UpdateCheckError::MailTransport(format!("{} did not complete: {err}", self.command))
        })?;

        if !output.status.success() {
            return Err(UpdateCheckError::MailTransport(format!(
                "{} exited with status {}: {}",
                self.command,
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

fn map_spawn_error(err: io::Error, command: &str) -> UpdateCheckError {
    if err.kind() == io::ErrorKind::NotFound {
        UpdateCheckError::CommandMissing {
            command: command.into(),
        }
    } else {
        UpdateCheckError::MailTransport(format!("Failed to spawn {command}: {err}"))
    }
}

/// Resolves addresses from site configuration and sends the report.
pub struct EmailDispatcher<'a, I, T> {
    wp: &'a I,
    transport: &'a T,
}

impl<'a, I: SelfInvoke, T: MailTransport> EmailDispatcher<'a, I, T> {
    pub fn new(wp: &'a I, transport: &'a T) -> Self {
        Self { wp, transport }
    }

    /// Send `report_text` to `email_address`, or to the admin address when empty.
    ///
    /// Returns the address the report was delivered to.
    pub async fn send(&self, report_text: &str, email_address: &str) -> Result<String> {
        let recipient = if email_address.trim().is_empty() {
            wpcli::admin_email(self.wp).await?
        } else {
            email_address.trim().to_string()
        };

        let site_url = wpcli::site_url(self.wp).await?;
        let host = sending_host(&site_url)?;
        let home = wpcli::home_url(self.wp).await?;

        let message = MailMessage {
            to: recipient.clone(),
            subject: format!("Updates are available for {home}"),
            body: report_text.to_string(),
            headers: vec![format!("From: updates@{host}")],
        };
        self.transport.deliver(&message).await?;
        Ok(recipient)
    }
}

/// Host component of `site_url`, minus a literal leading `www.`.
pub fn sending_host(site_url: &str) -> Result<String> {
    let rest = site_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(site_url);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = match host_port.strip_prefix('[') {
        Some(bracketed) => bracketed.split(']').next().unwrap_or_default(),
        None => host_port.split(':').next().unwrap_or_default(),
    };

    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        return Err(UpdateCheckError::Config(format!(
            "Cannot derive a sender host from site URL `{site_url}`"
        )));
    }
    Ok(host.to_string())
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::RefCell;

    use super::*;

    /// Records messages instead of sending them.
    #[derive(Default)]
    pub struct RecordingTransport {
        pub sent: RefCell<Vec<MailMessage>>,
        pub fail_with: Option<String>,
    }

    impl MailTransport for RecordingTransport {
        async fn deliver(&self, message: &MailMessage) -> Result<()> {
            if let Some(reason) = &self.fail_with {
                return Err(UpdateCheckError::MailTransport(reason.clone()));
            }
            self.sent.borrow_mut().push(message.clone());
            Ok(())
        }
    }
}
