//! Command handlers.
use anyhow::{anyhow, Context, Result};
use claims::{ClaimRecord, CredentialProvider, Document, JobId, MediaType, PollPhase, PollState};
use gateway::{EnvTokenProvider, HttpGateway, StaticTokenProvider};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use workflow::{ClaimClient, PollHandle, TokioScheduler};

use crate::cli::{FetchArgs, SubmitArgs, WatchArgs};
use crate::config::ClientSettings;
use crate::output::{progress_line, render_summary};

/// Poll budget exhausted; the claim may still finish later.
pub const EXIT_TIMED_OUT: u8 = 2;
/// Interrupted with Ctrl-C.
pub const EXIT_CANCELLED: u8 = 130;

/// Builds the client from resolved settings.
pub fn build_client(settings: &ClientSettings) -> Result<ClaimClient> {
    let gateway = Arc::new(HttpGateway::new(&settings.gateway_config()?)?);
    let credentials: Arc<dyn CredentialProvider> = match &settings.token {
        Some(token) => Arc::new(StaticTokenProvider::new(token.clone())),
        None => Arc::new(EnvTokenProvider::default()),
    };
    Ok(ClaimClient::new(
        credentials,
        gateway.clone(),
        gateway,
        Arc::new(TokioScheduler),
    )
    .with_upload_policy(settings.upload.clone())
    .with_poll_config(settings.poll.clone()))
}

fn job_id(raw: &str) -> Result<JobId> {
    JobId::new(raw).ok_or_else(|| anyhow!("job id must not be empty"))
}

fn print_update(state: PollState) {
    eprintln!("{}", progress_line(&state));
}

pub async fn submit(client: &ClaimClient, args: &SubmitArgs) -> Result<ExitCode> {
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("read {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} is not a file", args.file.display()))?;
    let document = match &args.content_type {
        Some(content_type) => Document::new(file_name, MediaType::parse(content_type), bytes),
        None => Document::from_file_name(file_name, bytes),
    };

    if args.no_watch {
        let job_id = client.upload(&document).await?;
        println!("{job_id}");
        return Ok(ExitCode::SUCCESS);
    }

    let submission = client.submit(&document, print_update).await?;
    info!(job_id = %submission.job_id, "Document uploaded");
    println!("{}", submission.job_id);
    finish(submission.handle).await
}

pub async fn watch(client: &ClaimClient, args: &WatchArgs) -> Result<ExitCode> {
    let job_id = job_id(&args.job_id)?;
    let handle = client.watch(job_id, print_update, client.poll_config().clone());
    finish(handle).await
}

pub async fn fetch(client: &ClaimClient, args: &FetchArgs) -> Result<ExitCode> {
    let job_id = job_id(&args.job_id)?;
    let record = client.fetch(&job_id).await?;
    if args.summary {
        print!("{}", render_summary(&record));
    } else {
        print_record(&record)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Waits for the watch to end, cancelling it on Ctrl-C, and reports the outcome.
async fn finish(handle: PollHandle) -> Result<ExitCode> {
    let cancel = handle.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
    let state = handle.join().await;
    interrupt.abort();

    match state.phase() {
        PollPhase::Completed => {
            let record = state
                .into_outcome()
                .context("completed watch produced no record")?;
            print_record(&record)?;
            Ok(ExitCode::SUCCESS)
        }
        PollPhase::TimedOut => {
            let job_id = state.job_id().clone();
            if let Err(err) = state.into_outcome() {
                warn!(%job_id, error = %err, "Stopped polling");
                eprintln!("{err}");
            }
            eprintln!("Processing may still finish; check later with: claimwatch fetch '{job_id}'");
            Ok(ExitCode::from(EXIT_TIMED_OUT))
        }
        PollPhase::Scheduled | PollPhase::Polling | PollPhase::Cancelled => {
            eprintln!("Stopped watching {}", state.job_id());
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
    }
}

fn print_record(record: &ClaimRecord) -> Result<()> {
    let text = serde_json::to_string_pretty(record).context("serialize claim record")?;
    println!("{text}");
    Ok(())
}
