mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::sync::oneshot;
use tracing::info;

use version_gate::check::{self, CheckOutcome, CheckResult};
use version_gate::config::{CheckerConfig, log_path};

use crate::logging::{LogOptions, init_logging};

/// Exit code reported when the check is interrupted with Ctrl-C
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(name = "version-gate")]
#[command(version, about = "Check an installed version against an update policy document")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Write logs to the data directory instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Decide whether the current version needs an update
    Check(CheckArgs),
}

#[derive(Args)]
struct CheckArgs {
    /// Installed version, e.g. 1.2.0
    #[arg(long)]
    current: String,

    /// JSON config file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// URL of the policy document
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,

    /// Local policy document
    #[arg(long)]
    file: Option<PathBuf>,

    /// Basic auth username
    #[arg(long, requires = "password")]
    username: Option<String>,

    /// Basic auth password
    #[arg(long, requires = "username")]
    password: Option<String>,

    /// Network timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Top-level section of the document to read, e.g. android
    #[arg(long)]
    section: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl CheckArgs {
    fn resolve_config(&self) -> anyhow::Result<CheckerConfig> {
        let mut config = match &self.config {
            Some(path) => CheckerConfig::from_file(path)?,
            None => CheckerConfig::default(),
        };

        if let Some(url) = &self.url {
            config.source.url = Some(url.clone());
            config.source.file = None;
        }
        if let Some(file) = &self.file {
            config.source.file = Some(file.clone());
            config.source.url = None;
        }
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            config.source.username = Some(username.clone());
            config.source.password = Some(password.clone());
        }
        if let Some(timeout) = self.timeout {
            config.source.timeout_secs = timeout;
        }
        if let Some(section) = &self.section {
            config.document.section = Some(section.clone());
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let _guard = init_logging(&LogOptions {
        json: cli.log_json,
        file: cli.log_file.then(log_path),
    })?;

    match cli.command {
        Command::Check(args) => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(run_check_command(args)),
    }
}

async fn run_check_command(args: CheckArgs) -> anyhow::Result<ExitCode> {
    let config = args.resolve_config()?;
    let loader = config.build_loader()?;
    let parser = Arc::new(config.build_parser());

    let (tx, mut rx) = oneshot::channel();
    let handle = check::start(&args.current, loader, parser, move |outcome| {
        let _ = tx.send(outcome);
    });

    let finished = tokio::select! {
        outcome = &mut rx => Some(outcome),
        _ = tokio::signal::ctrl_c() => None,
    };
    let outcome = match finished {
        Some(outcome) => outcome,
        None => {
            info!("Interrupted, cancelling update check");
            handle.cancel();
            rx.await
        }
    }
    .context("Update check ended without reporting an outcome")?;

    match outcome {
        CheckOutcome::Success(result) => {
            print_result(&result, args.json)?;
            Ok(ExitCode::SUCCESS)
        }
        CheckOutcome::Failed(error) => Err(error.into()),
        CheckOutcome::Cancelled => {
            eprintln!("Update check cancelled");
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
    }
}

fn print_result(result: &CheckResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("status: {}", result.status());
    println!("update version: {}", result.update_version());
    if let Some(notification_type) = result.try_notification_type() {
        println!("notification: {notification_type}");
    }
    for (key, value) in result.metadata() {
        println!("meta.{key}: {value}");
    }
    Ok(())
}
