//! Poll configuration and the per-job poll state machine.
//!
//! ```text
//!  Scheduled ──first attempt──▶ Polling ──┬──▶ Completed
//!      │                          │  ▲    ├──▶ TimedOut
//!      │                          └──┘    └──▶ Cancelled
//!      └──────────────────────────────────────▶ Cancelled
//! ```
//!
//! [`PollState`] owns the transition rules; the `workflow` crate's poller
//! supplies fetch results and timing. Every attempt, successful or not,
//! consumes one unit of [`PollConfig::max_attempts`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::record::status;
use crate::{ClaimError, ClaimRecord, JobId, Timestamp};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing and budget for watching one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollConfig {
    /// Delay before the first fetch, giving the backend time to create the record.
    pub initial_delay_ms: u64,
    /// Delay between consecutive fetches.
    pub interval_ms: u64,
    /// Total number of fetches allowed, including the first.
    pub max_attempts: u32,
    /// Status values after which no further change is expected.
    pub terminal_statuses: Vec<String>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 5_000,
            interval_ms: 3_000,
            max_attempts: 40,
            terminal_statuses: vec![status::SCORING_COMPLETE.to_string()],
        }
    }
}

impl PollConfig {
    /// Creates a config with the default terminal statuses.
    pub fn from_millis(initial_delay_ms: u64, interval_ms: u64, max_attempts: u32) -> Self {
        Self {
            initial_delay_ms,
            interval_ms,
            max_attempts,
            ..Self::default()
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Returns `true` when `record` signals that processing has finished:
    /// either the explicit completion flag is set or its status is terminal.
    pub fn is_terminal(&self, record: &ClaimRecord) -> bool {
        record.processing_complete()
            || record
                .status()
                .is_some_and(|s| self.terminal_statuses.iter().any(|t| t == s))
    }

    pub fn validate(&self) -> Result<(), ClaimError> {
        if self.max_attempts == 0 {
            return Err(ClaimError::Configuration {
                message: "poll maxAttempts must be at least 1".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollPhase {
    /// Waiting for the initial delay; no fetch made yet.
    Scheduled,
    /// At least one fetch made; more remain in the budget.
    Polling,
    /// A terminal record was observed.
    Completed,
    /// The attempt budget ran out.
    TimedOut,
    /// The caller stopped watching.
    Cancelled,
}

impl PollPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PollPhase::Completed | PollPhase::TimedOut | PollPhase::Cancelled
        )
    }
}

impl std::fmt::Display for PollPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PollPhase::Scheduled => "scheduled",
            PollPhase::Polling => "polling",
            PollPhase::Completed => "completed",
            PollPhase::TimedOut => "timed_out",
            PollPhase::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Progress of one job's watch.
///
/// Mutated only by the poll loop running that job; observers receive clones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollState {
    job_id: JobId,
    phase: PollPhase,
    attempt: u32,
    status: Option<String>,
    terminal: bool,
    last_error: Option<ClaimError>,
    record: Option<ClaimRecord>,
    observed_at: Timestamp,
}

impl PollState {
    /// Creates the initial state for `job_id`.
    pub fn scheduled(job_id: JobId) -> Self {
        Self {
            job_id,
            phase: PollPhase::Scheduled,
            attempt: 0,
            status: None,
            terminal: false,
            last_error: None,
            record: None,
            observed_at: Timestamp::now(),
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    /// Number of fetches made so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Last status value observed, kept across failed attempts.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Error from the most recent attempt; cleared by a successful fetch.
    pub fn last_error(&self) -> Option<&ClaimError> {
        self.last_error.as_ref()
    }

    /// Most recent successfully fetched record.
    pub fn record(&self) -> Option<&ClaimRecord> {
        self.record.as_ref()
    }

    pub fn observed_at(&self) -> Timestamp {
        self.observed_at
    }

    /// Applies the result of one fetch attempt and returns the new phase.
    ///
    /// Has no effect once the state is terminal.
    pub fn observe(
        &mut self,
        result: Result<ClaimRecord, ClaimError>,
        config: &PollConfig,
    ) -> PollPhase {
        if self.terminal {
            return self.phase;
        }
        self.attempt += 1;
        self.observed_at = Timestamp::now();

        let completed = match result {
            Ok(record) => {
                if let Some(status) = record.status() {
                    self.status = Some(status.to_string());
                }
                self.last_error = None;
                let done = config.is_terminal(&record);
                self.record = Some(record);
                done
            }
            Err(err) => {
                self.last_error = Some(err);
                false
            }
        };

        let next = if completed {
            PollPhase::Completed
        } else if self.attempt >= config.max_attempts {
            PollPhase::TimedOut
        } else {
            PollPhase::Polling
        };
        self.set_phase(next);
        next
    }

    /// Moves the state to [`PollPhase::Cancelled`] unless already terminal.
    pub fn cancel(&mut self) {
        if !self.terminal {
            self.observed_at = Timestamp::now();
            self.set_phase(PollPhase::Cancelled);
        }
    }

    /// Converts a final state into the caller-facing outcome.
    ///
    /// A non-terminal state is reported as [`ClaimError::Cancelled`]: the
    /// watch ended without a verdict.
    pub fn into_outcome(self) -> Result<ClaimRecord, ClaimError> {
        match self.phase {
            PollPhase::Completed => Ok(self.record.unwrap_or_default()),
            PollPhase::TimedOut => Err(ClaimError::PollTimedOut {
                job_id: self.job_id,
                attempts: self.attempt,
                last_status: self.status,
                last_error: self.last_error.map(|e| e.to_string()),
            }),
            PollPhase::Scheduled | PollPhase::Polling | PollPhase::Cancelled => {
                Err(ClaimError::Cancelled {
                    job_id: self.job_id,
                })
            }
        }
    }

    fn set_phase(&mut self, phase: PollPhase) {
        self.phase = phase;
        self.terminal = phase.is_terminal();
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
