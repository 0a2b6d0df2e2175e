/*============================================================
  Synavera Project: Syn-WP
  Module: synwp_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for Syn-WP. Checks WordPress core, plugins,
    and themes for pending updates through WP-CLI and prints
    or emails the resulting report.

  Security / Safety Notes:
    Operates within user privileges. Executes wp and sendmail
    binaries only; no network access of its own.

  Dependencies:
    clap for CLI parsing, tokio for process execution, chrono
    for session stamps.

  Operational Scope:
    Invoked by operators or cron as `synwp update-check run`.

  Revision History:
    2025-11-12 COD  Authored Syn-WP update-check runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI, environment, and file
============================================================*/

mod config;
mod error;
mod logger;
mod mailer;
mod report;
mod runner;
mod updates;
mod wpcli;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Args, Parser, Subcommand};

use config::SynwpConfig;
use error::Result;
use logger::Logger;
use mailer::SendmailTransport;
use runner::{ReportRunner, RunOptions, RunOutcome};
use wpcli::WpCli;

/// Command-line arguments for Syn-WP.
#[derive(Debug, Parser)]
#[command(
    name = "synwp",
    version,
    author = "Synavera Systems",
    about = "WordPress update reports for operators and cron"
)]
struct Cli {
    /// Override configuration file path.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH", global = true)]
    log: Option<PathBuf>,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    verbose: bool,
    /// WP-CLI binary to invoke.
    #[arg(long, value_name = "PATH", global = true)]
    wp_bin: Option<String>,
    /// WordPress installation directory passed to WP-CLI.
    #[arg(long, value_name = "DIR", global = true)]
    path: Option<PathBuf>,
    /// Site URL passed to WP-CLI (multisite).
    #[arg(long, value_name = "URL", global = true)]
    url: Option<String>,
    /// Allow WP-CLI to run as root.
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    allow_root: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check WordPress core, themes, and plugins for available updates.
    #[command(name = "update-check", subcommand)]
    UpdateCheck(UpdateCheckCommand),
}

#[derive(Debug, Subcommand)]
enum UpdateCheckCommand {
    /// Build the report and print or email it.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Email the report instead of printing it; without a value, use the site admin address.
    #[arg(
        long,
        value_name = "ADDRESS",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = ""
    )]
    email: Option<String>,
    /// Send an email report even if there are no pending updates.
    #[arg(long, action = ArgAction::SetTrue)]
    report_current: bool,
    /// Do not confirm a successful email delivery.
    #[arg(long, action = ArgAction::SetTrue)]
    quiet: bool,
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        Self {
            email: args.email,
            report_current: args.report_current,
            quiet: args.quiet,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = SynwpConfig::load_from_optional_path(cli.config.as_deref())?;
    if let Some(bin) = cli.wp_bin.clone() {
        config.wp.binary = bin;
    }
    if let Some(path) = cli.path.clone() {
        config.wp.path = Some(path);
    }
    if let Some(url) = cli.url.clone() {
        config.wp.url = Some(url);
    }
    config.wp.allow_root |= cli.allow_root;

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli.log.clone().or_else(|| {
        config
            .log
            .persist
            .then(|| config.log_dir().join(format!("update_check_{session_stamp}.log")))
    });
    let logger = Logger::new(log_path, cli.verbose)?;
    logger.info("INIT", "Syn-WP update check starting.");

    let Command::UpdateCheck(UpdateCheckCommand::Run(args)) = cli.command;
    let options = RunOptions::from(args);
    if options.email.is_none() && options.quiet {
        logger.debug("QUIET", "--quiet only affects email confirmations; printing report");
    }

    let wp = WpCli::new(&config.wp);
    let transport = SendmailTransport::new(config.mail.sendmail.clone());
    let runner = ReportRunner::new(&wp, &transport, &logger);

    let outcome = match runner.run(&options).await {
        Ok(outcome) => outcome,
        Err(err) => {
            let code = if err.is_subquery() { "SUBQUERY" } else { "ABORT" };
            logger.error(code, err.to_string());
            if let Err(seal_err) = logger.finalize() {
                eprintln!("Warning: {seal_err}");
            }
            return Err(err);
        }
    };

    match &outcome {
        RunOutcome::Printed => logger.info("COMPLETE", "Report printed."),
        RunOutcome::Emailed { recipient } => {
            logger.info("COMPLETE", format!("Report emailed to {recipient}."))
        }
        RunOutcome::Skipped => logger.info("COMPLETE", "Nothing pending; email skipped."),
    }
    logger.finalize()?;

    Ok(ExitCode::SUCCESS)
}
