//! Port traits implemented by infrastructure crates.
//!
//! The orchestration layer depends only on these traits, held as
//! `Arc<dyn Trait>`. Production implementations live in the `gateway` crate
//! (HTTP) and the `workflow` crate (tokio timers); tests supply fakes.

use std::time::Duration;

use async_trait::async_trait;

use crate::{AuthToken, ClaimError, ClaimRecord, Document, JobId, UploadTicket};

/// Supplies the session credential for orchestration requests.
///
/// Passed explicitly to every component that needs it; there is no global
/// session.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns a currently valid token, or [`ClaimError::NotAuthenticated`]
    /// when no session exists.
    async fn auth_token(&self) -> Result<AuthToken, ClaimError>;
}

/// The orchestration boundary: issues upload credentials and serves job
/// documents.
///
/// Implementations own all path and query encoding. Callers pass raw,
/// unencoded values.
#[async_trait]
pub trait OrchestrationGateway: Send + Sync {
    /// Requests a single-use write credential for a document named `file_name`.
    ///
    /// Failures are [`ClaimError::CredentialRequestFailed`] or
    /// [`ClaimError::NotAuthenticated`].
    async fn request_upload_ticket(
        &self,
        file_name: &str,
        token: &AuthToken,
    ) -> Result<UploadTicket, ClaimError>;

    /// Fetches the raw (possibly tagged) document for `job_id`.
    ///
    /// A document that does not exist yet is [`ClaimError::NotFound`].
    async fn fetch_claim_document(
        &self,
        job_id: &JobId,
        token: &AuthToken,
    ) -> Result<serde_json::Value, ClaimError>;
}

/// Direct writes to object storage using a pre-authorised ticket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `document` to the ticket's destination with the document's
    /// content type, consuming the ticket and returning its item key.
    /// Failures are [`ClaimError::UploadFailed`].
    async fn put_object(&self, ticket: UploadTicket, document: &Document)
        -> Result<JobId, ClaimError>;
}

/// What the status poller queries on every attempt.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetches and decodes the current record for `job_id`.
    async fn fetch_status(&self, job_id: &JobId) -> Result<ClaimRecord, ClaimError>;
}

/// Suspends the current task. Injected so tests can control time.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
