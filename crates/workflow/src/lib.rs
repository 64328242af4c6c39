//! Claim submission orchestration.
//!
//! This crate sequences calls between the domain rules in [`claims`] and the
//! infrastructure ports (credentials, orchestration gateway, object storage,
//! scheduler). It contains no transport code of its own.
//!
//! | Component | Role |
//! |-----------|------|
//! | [`UploadSession`] | validate → request write credential → write; yields the job id |
//! | [`StatusPoller`] | per-job bounded poll loop with cancellation |
//! | [`ClaimClient`] | composition root for callers: `submit`, `watch`, `fetch` |
//!
//! ## Concurrency
//!
//! Every watch runs as its own tokio task and suspends only on the injected
//! [`claims::Scheduler`] and on network I/O. Watches share no mutable state.

pub mod client;
pub mod poller;
pub mod scheduler;
pub mod upload;

pub use client::{ClaimClient, RecordFetcher, Submission};
pub use poller::{CancelToken, PollHandle, StatusPoller};
pub use scheduler::TokioScheduler;
pub use upload::UploadSession;
