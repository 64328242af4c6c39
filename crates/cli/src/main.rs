//! claimwatch CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse arguments** with `clap`.
//! 2. **Wire observability**: `tracing-subscriber` with a text or JSON layer
//!    and an optional OpenTelemetry OTLP exporter. All `tracing` spans and
//!    structured events emitted by every crate in the workspace flow through
//!    this layer.
//! 3. **Resolve settings** from file, environment and flags, validated once.
//! 4. **Construct infrastructure**: the reqwest `HttpGateway` (both the
//!    orchestration gateway and the object store), the credential provider
//!    and the tokio scheduler, injected into a `ClaimClient`.
//! 5. **Dispatch** to the `submit`, `watch` or `fetch` command.
//!
//! Exit codes: 0 success, 1 error, 2 poll budget exhausted, 130 interrupted.
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod config;
mod output;
mod telemetry;

use cli::{Command, RootArgs};
use config::ClientSettings;
use telemetry::Telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let args = RootArgs::parse();

    let telemetry = match Telemetry::init(args.global.log_format) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let code = match run(args).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    };

    telemetry.shutdown();
    code
}

async fn run(args: RootArgs) -> Result<ExitCode> {
    let settings = ClientSettings::resolve(&args.global, |name| std::env::var(name).ok())?;
    let client = commands::build_client(&settings)?;

    match &args.command {
        Command::Submit(submit) => commands::submit(&client, submit).await,
        Command::Watch(watch) => commands::watch(&client, watch).await,
        Command::Fetch(fetch) => commands::fetch(&client, fetch).await,
    }
}
