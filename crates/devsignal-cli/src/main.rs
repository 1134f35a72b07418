// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Devsignal command-line front end.
//
// Runs one named security check against the current platform and prints the
// JSON result on stdout. Failures go to stderr with a non-zero exit status.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use devsignal_collector::{Operation, SignalCollector};
use devsignal_core::config::CollectorConfig;
use devsignal_core::error::{DevsignalError, Result};
use devsignal_core::human_errors::humanize_error;

#[derive(Parser, Debug)]
#[command(name = "devsignal", version, about = "Device security signal collector")]
struct Cli {
    #[arg(long, global = true, help = "Collector configuration (JSON)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Pretty-print JSON output")]
    pretty: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available security checks.
    List,
    /// Run one security check by name, e.g. `getSecurityInfo`.
    Run { operation: String },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::List => {
            for op in Operation::ALL {
                println!("{op}");
            }
            ExitCode::SUCCESS
        }
        Command::Run { operation } => {
            let collector = match build_collector(cli.config) {
                Ok(collector) => collector,
                Err(e) => {
                    let human = humanize_error(&e);
                    tracing::error!(error = %e, "collector setup failed");
                    eprintln!("{}\n{}", human.message, human.suggestion);
                    return ExitCode::FAILURE;
                }
            };
            tracing::debug!(platform = collector.platform_name(), %operation, "running check");

            match collector.execute(&operation) {
                Ok(value) => match render(&value, cli.pretty) {
                    Ok(text) => {
                        println!("{text}");
                        ExitCode::SUCCESS
                    }
                    Err(e) => {
                        eprintln!("{}", humanize_error(&e).message);
                        ExitCode::FAILURE
                    }
                },
                Err(failure) => {
                    eprintln!("{failure}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn build_collector(config: Option<PathBuf>) -> Result<SignalCollector> {
    let config = match config {
        Some(path) => CollectorConfig::load(path)?,
        None => CollectorConfig::default(),
    };
    let platform = devsignal_bridge::platform()?;
    Ok(SignalCollector::new(platform, config))
}

fn render(value: &serde_json::Value, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.map_err(DevsignalError::from)
}
