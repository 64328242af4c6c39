//! Bounded status polling with cooperative cancellation.
//!
//! Each watched job runs its own loop with its own [`PollState`]; loops share
//! nothing mutable. Within one loop, iterations are strictly sequential: the
//! next sleep starts only after the previous fetch result has been applied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use claims::{JobId, PollConfig, PollPhase, PollState, Scheduler, StatusSource};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Shared cancel flag for one poll loop.
///
/// Checked before every scheduled resumption and again after every fetch, so
/// an in-flight request is never aborted but its result is discarded once
/// cancellation has happened.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation and wakes a loop that is currently sleeping.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Completes once [`CancelToken::cancel`] has been called.
    pub async fn cancelled(&self) {
        loop {
            // Registered before the flag check so a concurrent cancel() cannot be missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// A running watch started by [`StatusPoller::watch`].
///
/// Dropping the handle detaches the loop; it keeps running to completion.
#[derive(Debug)]
pub struct PollHandle {
    job_id: JobId,
    cancel: CancelToken,
    task: JoinHandle<PollState>,
}

impl PollHandle {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Stops the watch. No update is delivered after this returns, except one
    /// already being delivered concurrently on another thread.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A clone of the loop's cancel token, for cancelling from elsewhere.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the loop to end and returns its final state.
    pub async fn join(self) -> PollState {
        match self.task.await {
            Ok(state) => state,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => {
                // The runtime dropped the task before it finished.
                let mut state = PollState::scheduled(self.job_id);
                state.cancel();
                state
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Watches jobs until they reach a terminal status or exhaust their budget.
///
/// A "not found" response means the backend has not materialised the record
/// yet; it and every other fetch error are retried like a non-terminal status,
/// each consuming one attempt. Only exhaustion ends the watch unsuccessfully.
#[derive(Clone)]
pub struct StatusPoller {
    source: Arc<dyn StatusSource>,
    scheduler: Arc<dyn Scheduler>,
}

impl StatusPoller {
    pub fn new(source: Arc<dyn StatusSource>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self { source, scheduler }
    }

    /// Starts watching `job_id` on the current tokio runtime.
    ///
    /// `on_update` receives a snapshot after every attempt: the first marks the
    /// move from `Scheduled` to `Polling`, the last carries the terminal phase.
    /// A cancelled watch delivers nothing further.
    pub fn watch<F>(&self, job_id: JobId, on_update: F, config: PollConfig) -> PollHandle
    where
        F: Fn(PollState) + Send + Sync + 'static,
    {
        let cancel = CancelToken::new();
        let poller = self.clone();
        let token = cancel.clone();
        let loop_job_id = job_id.clone();
        let task = tokio::spawn(async move {
            poller
                .run(loop_job_id, &on_update, &config, &token)
                .await
        });
        PollHandle {
            job_id,
            cancel,
            task,
        }
    }

    /// Drives the poll loop for `job_id` inline and returns the final state.
    #[instrument(
        name = "watch",
        skip_all,
        fields(job_id = %job_id, max_attempts = config.max_attempts)
    )]
    pub async fn run<F>(
        &self,
        job_id: JobId,
        on_update: &F,
        config: &PollConfig,
        cancel: &CancelToken,
    ) -> PollState
    where
        F: Fn(PollState) + Send + Sync,
    {
        let mut state = PollState::scheduled(job_id);
        let mut delay = config.initial_delay();

        loop {
            if !self.pause(delay, cancel).await {
                return cancelled(state);
            }

            let result = self.source.fetch_status(state.job_id()).await;
            if cancel.is_cancelled() {
                debug!("discarding fetch result after cancellation");
                return cancelled(state);
            }

            let phase = state.observe(result, config);
            match state.last_error() {
                Some(err) if err.is_not_found() => {
                    debug!(attempt = state.attempt(), "claim not materialised yet")
                }
                Some(err) => {
                    warn!(attempt = state.attempt(), error = %err, "status fetch failed; will retry within budget")
                }
                None => debug!(
                    attempt = state.attempt(),
                    status = state.status().unwrap_or_default(),
                    "status observed"
                ),
            }

            if cancel.is_cancelled() {
                return cancelled(state);
            }
            on_update(state.clone());

            match phase {
                PollPhase::Completed => {
                    info!(attempts = state.attempt(), status = state.status().unwrap_or_default(), "claim processing complete");
                    return state;
                }
                PollPhase::TimedOut => {
                    warn!(attempts = state.attempt(), status = state.status().unwrap_or_default(), "attempt budget exhausted before completion");
                    return state;
                }
                PollPhase::Scheduled | PollPhase::Polling | PollPhase::Cancelled => {}
            }
            delay = config.interval();
        }
    }

    /// Sleeps for `delay` unless cancelled first. Returns `false` on cancellation.
    async fn pause(&self, delay: Duration, cancel: &CancelToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }
        tokio::select! {
            _ = self.scheduler.sleep(delay) => !cancel.is_cancelled(),
            _ = cancel.cancelled() => false,
        }
    }
}

fn cancelled(mut state: PollState) -> PollState {
    state.cancel();
    info!(attempts = state.attempt(), "watch cancelled");
    state
}
