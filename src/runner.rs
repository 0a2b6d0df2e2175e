/*============================================================
  Synavera Project: Syn-WP
  Module: synwp_core::runner
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Orchestrate the core, plugin, and theme subqueries, build
    the report, and choose between printing and emailing it.

  Security / Safety Notes:
    A failed subquery aborts the run before anything is
    printed or sent; no partial report leaves the process.

  Dependencies:
    chrono for the report timestamp.

  Operational Scope:
    Backs `synwp update-check run`; one linear pass per call.

  Revision History:
    2025-11-12 COD  Authored update-check runner.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Fresh context per run, no process-wide state
    - Exactly one terminal action per invocation
============================================================*/

use chrono::Local;

use crate::error::Result;
use crate::logger::OutputSink;
use crate::mailer::{EmailDispatcher, MailTransport};
use crate::report::{Category, ReportContext};
use crate::wpcli::{self, SelfInvoke};

/// Options accepted by `update-check run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// `None` prints; `Some("")` mails the admin address; otherwise mails the given address.
    pub email: Option<String>,
    /// Mail the report even when nothing is pending.
    pub report_current: bool,
    /// Suppress the delivery confirmation.
    pub quiet: bool,
}

/// The single terminal action a run took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Printed,
    Emailed { recipient: String },
    Skipped,
}

pub struct ReportRunner<'a, I, T, S> {
    wp: &'a I,
    transport: &'a T,
    sink: &'a S,
    fixed_timestamp: Option<String>,
}

impl<'a, I, T, S> ReportRunner<'a, I, T, S>
where
    I: SelfInvoke,
    T: MailTransport,
    S: OutputSink,
{
    pub fn new(wp: &'a I, transport: &'a T, sink: &'a S) -> Self {
        Self {
            wp,
            transport,
            sink,
            fixed_timestamp: None,
        }
    }

    /// Pin the "Generated" line, for reproducible output.
    #[cfg(test)]
    pub fn with_timestamp(mut self, stamp: impl Into<String>) -> Self {
        self.fixed_timestamp = Some(stamp.into());
        self
    }

    fn timestamp(&self) -> String {
        self.fixed_timestamp
            .clone()
            .unwrap_or_else(|| Local::now().to_rfc2822())
    }

    pub async fn run(&self, options: &RunOptions) -> Result<RunOutcome> {
        let mut ctx = ReportContext::new();

        let site = wpcli::home_url(self.wp).await?;
        ctx.header(&site, &self.timestamp());

        for category in Category::ALL {
            match category {
                Category::Core => {
                    let records = wpcli::core_updates(self.wp).await?;
                    ctx.core_section(&records);
                }
                Category::Plugins => {
                    let records = wpcli::plugin_updates(self.wp).await?;
                    ctx.package_section(category, &records);
                }
                Category::Themes => {
                    let records = wpcli::theme_updates(self.wp).await?;
                    ctx.package_section(category, &records);
                }
            }
        }

        let updates_found = ctx.updates_found();
        let text = ctx.report().render();

        let Some(address) = options.email.as_deref() else {
            self.sink.line(&text);
            return Ok(RunOutcome::Printed);
        };

        if !updates_found && !options.report_current {
            self.sink.diagnostic("Everything up to date, no email has been sent.");
            return Ok(RunOutcome::Skipped);
        }

        let recipient = EmailDispatcher::new(self.wp, self.transport)
            .send(&text, address)
            .await?;
        if !options.quiet {
            self.sink.success(&format!("Report has been sent to {recipient}"));
        }
        Ok(RunOutcome::Emailed { recipient })
    }
}
