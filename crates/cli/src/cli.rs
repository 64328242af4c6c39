//! Command-line argument parsing.
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "claimwatch",
    version,
    about = "Submit claim documents and follow their processing status",
    after_help = "Examples:\n  claimwatch --api-url https://api.example/prod submit claim.pdf\n  claimwatch watch 'user-1/20240101_120000_claim.pdf'\n  claimwatch fetch 'user-1/20240101_120000_claim.pdf' --summary",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings shared by every command. Flags win over environment and file.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// JSON settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Orchestration API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Session token sent in the Authorization header (default: $CLAIMWATCH_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Log output format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate and upload a claim document, then follow its processing
    Submit(SubmitArgs),
    /// Follow the processing status of an uploaded claim
    Watch(WatchArgs),
    /// Fetch and decode the current claim record once
    Fetch(FetchArgs),
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Document to upload (pdf, jpg, jpeg, png)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Content type; inferred from the file extension when omitted
    #[arg(long, value_name = "TYPE")]
    pub content_type: Option<String>,

    /// Print the job id and exit without polling
    #[arg(long)]
    pub no_watch: bool,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Job identifier returned by `submit`
    #[arg(value_name = "JOB_ID")]
    pub job_id: String,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Job identifier returned by `submit`
    #[arg(value_name = "JOB_ID")]
    pub job_id: String,

    /// Print a human-readable risk summary instead of the record JSON
    #[arg(long)]
    pub summary: bool,
}
