//! Error taxonomy and retry-policy types for claim submission.
//!
//! [`ClaimError`] is the single error type crossing every port. Infrastructure
//! crates map their transport failures into it so the orchestration layer can
//! make retry and reporting decisions without seeing HTTP details.
//!
//! Three views are derived from every error:
//!
//! - [`ClaimError::kind`]: the stable [`ErrorKind`] discriminant.
//! - [`ClaimError::category`]: what the caller should tell a user
//!   ("fix your file", "try later", "still processing").
//! - [`ClaimError::retry_policy`]: whether the *caller* may re-invoke the
//!   operation. Nothing in this workspace retries credential requests or
//!   uploads automatically; only the status poller retries, and only within its
//!   attempt budget.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::JobId;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means retry
        /// immediately or apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried unchanged; the input or the session
    /// has to be fixed first.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Error kinds and categories
// ---------------------------------------------------------------------------

/// Stable discriminant for a [`ClaimError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    PayloadTooLarge,
    UnsupportedMediaType,
    EmptyDocument,
    NotAuthenticated,
    CredentialRequestFailed,
    UploadFailed,
    /// The job record does not exist (yet). Internal to the poller while its
    /// attempt budget remains.
    NotFoundTransient,
    FetchFailed,
    PollTimedOut,
    Cancelled,
    DecodeMalformed,
    Configuration,
}

/// How a failure should be presented to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The document or the request is invalid; fix it and retry immediately.
    InvalidInput,
    /// The session is missing or expired; sign in again.
    Unauthenticated,
    /// A remote service failed; retry later.
    ServiceUnavailable,
    /// Processing has not finished within the watch budget. The job may still
    /// complete out-of-band; offer a manual refresh.
    ProcessingDelayed,
    /// The caller stopped watching.
    Cancelled,
    /// The service returned data this client cannot interpret.
    Internal,
}

// ---------------------------------------------------------------------------
// Claim errors
// ---------------------------------------------------------------------------

/// Errors produced while submitting a claim document, watching its job, or
/// fetching and decoding its result.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ClaimError {
    /// The document exceeds the configured upload size limit.
    ///
    /// Produced by upload validation before any network call.
    #[error("Document is {size} bytes; the limit is {limit} bytes")]
    PayloadTooLarge {
        /// Size of the rejected document in bytes.
        size: u64,
        /// Configured maximum in bytes.
        limit: u64,
    },

    /// The document's content type is not in the accepted set.
    #[error("Unsupported media type '{media_type}'")]
    UnsupportedMediaType {
        /// The declared or inferred content type.
        media_type: String,
    },

    /// The document has no content.
    #[error("Document '{file_name}' is empty")]
    EmptyDocument {
        /// Name of the rejected document.
        file_name: String,
    },

    /// No valid session exists to authorise orchestration requests.
    #[error("Not authenticated: {reason}")]
    NotAuthenticated {
        /// Why no token could be supplied or why the boundary rejected it.
        reason: String,
    },

    /// The orchestration boundary did not issue an upload credential.
    #[error("Upload credential request failed: {reason}")]
    CredentialRequestFailed {
        /// Description of the failure.
        reason: String,
        /// HTTP status, when the boundary answered at all.
        status: Option<u16>,
    },

    /// The direct write to storage failed.
    #[error("Upload failed: {reason}")]
    UploadFailed {
        /// Description of the failure.
        reason: String,
        /// HTTP status, when storage answered at all.
        status: Option<u16>,
    },

    /// The job record has not been materialised by the backend yet.
    #[error("Claim '{job_id}' not found")]
    NotFound {
        /// The job that was looked up.
        job_id: JobId,
    },

    /// Fetching a job record failed for a reason other than "not found".
    #[error("Fetching claim failed: {reason}")]
    FetchFailed {
        /// Description of the failure.
        reason: String,
        /// HTTP status, when the boundary answered at all.
        status: Option<u16>,
    },

    /// The poll attempt budget ran out before the job reached a terminal status.
    #[error("Claim '{job_id}' still processing after {attempts} attempts (last status: {})", last_status.as_deref().unwrap_or("unknown"))]
    PollTimedOut {
        /// The job being watched.
        job_id: JobId,
        /// Number of fetch attempts made.
        attempts: u32,
        /// Last status value observed, if any fetch succeeded.
        last_status: Option<String>,
        /// Display form of the last fetch error, if the last attempt failed.
        last_error: Option<String>,
    },

    /// The caller cancelled the watch before the job reached a terminal status.
    #[error("Watch for claim '{job_id}' was cancelled")]
    Cancelled {
        /// The job that was being watched.
        job_id: JobId,
    },

    /// A tagged value carried a tag/payload combination the decoder cannot
    /// interpret.
    #[error("Malformed typed value at '{path}': {reason}")]
    DecodeMalformed {
        /// Location of the offending value, `/`-separated from the document root.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Client configuration is invalid.
    ///
    /// Produced at load time; the client never starts with an invalid config.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl ClaimError {
    /// Returns the stable discriminant for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClaimError::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            ClaimError::UnsupportedMediaType { .. } => ErrorKind::UnsupportedMediaType,
            ClaimError::EmptyDocument { .. } => ErrorKind::EmptyDocument,
            ClaimError::NotAuthenticated { .. } => ErrorKind::NotAuthenticated,
            ClaimError::CredentialRequestFailed { .. } => ErrorKind::CredentialRequestFailed,
            ClaimError::UploadFailed { .. } => ErrorKind::UploadFailed,
            ClaimError::NotFound { .. } => ErrorKind::NotFoundTransient,
            ClaimError::FetchFailed { .. } => ErrorKind::FetchFailed,
            ClaimError::PollTimedOut { .. } => ErrorKind::PollTimedOut,
            ClaimError::Cancelled { .. } => ErrorKind::Cancelled,
            ClaimError::DecodeMalformed { .. } => ErrorKind::DecodeMalformed,
            ClaimError::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Returns how this failure should be presented to a user.
    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            ErrorKind::PayloadTooLarge
            | ErrorKind::UnsupportedMediaType
            | ErrorKind::EmptyDocument
            | ErrorKind::Configuration => ErrorCategory::InvalidInput,
            ErrorKind::NotAuthenticated => ErrorCategory::Unauthenticated,
            ErrorKind::CredentialRequestFailed
            | ErrorKind::UploadFailed
            | ErrorKind::FetchFailed => ErrorCategory::ServiceUnavailable,
            ErrorKind::NotFoundTransient | ErrorKind::PollTimedOut => {
                ErrorCategory::ProcessingDelayed
            }
            ErrorKind::Cancelled => ErrorCategory::Cancelled,
            ErrorKind::DecodeMalformed => ErrorCategory::Internal,
        }
    }

    /// Returns whether a caller may retry the failed operation.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self.category() {
            ErrorCategory::ServiceUnavailable | ErrorCategory::ProcessingDelayed => {
                RetryPolicy::Retryable { after: None }
            }
            ErrorCategory::InvalidInput
            | ErrorCategory::Unauthenticated
            | ErrorCategory::Cancelled
            | ErrorCategory::Internal => RetryPolicy::NonRetryable,
        }
    }

    /// Returns `true` when the job record simply does not exist yet.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFoundTransient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_invalid_input_and_not_retryable() {
        let err = ClaimError::PayloadTooLarge { size: 11, limit: 10 };
        assert_eq!(err.kind(), ErrorKind::PayloadTooLarge);
        assert_eq!(err.category(), ErrorCategory::InvalidInput);
        assert_eq!(err.retry_policy(), RetryPolicy::NonRetryable);
    }

    #[test]
    fn service_errors_are_retryable_by_the_caller() {
        let err = ClaimError::UploadFailed {
            reason: "503".into(),
            status: Some(503),
        };
        assert_eq!(err.category(), ErrorCategory::ServiceUnavailable);
        assert_eq!(err.retry_policy(), RetryPolicy::Retryable { after: None });
    }

    #[test]
    fn not_found_maps_to_transient_kind() {
        let err = ClaimError::NotFound {
            job_id: JobId::new("a/b.pdf").unwrap(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.category(), ErrorCategory::ProcessingDelayed);
    }

    #[test]
    fn timed_out_message_names_last_status() {
        let err = ClaimError::PollTimedOut {
            job_id: JobId::new("j").unwrap(),
            attempts: 2,
            last_status: Some("PROCESSING".into()),
            last_error: None,
        };
        assert_eq!(
            err.to_string(),
            "Claim 'j' still processing after 2 attempts (last status: PROCESSING)"
        );
        assert_eq!(err.category(), ErrorCategory::ProcessingDelayed);
    }

    #[test]
    fn malformed_decode_is_internal() {
        let err = ClaimError::DecodeMalformed {
            path: "/a".into(),
            reason: "x".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.retry_policy(), RetryPolicy::NonRetryable);
    }
}
