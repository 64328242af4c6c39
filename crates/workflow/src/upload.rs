//! The three-step upload pipeline: validate, request a write credential, write.

use std::sync::Arc;

use claims::{
    ClaimError, CredentialProvider, Document, JobId, ObjectStore, OrchestrationGateway,
    SubmissionId, UploadPolicy,
};
use tracing::{debug, info, instrument, warn};

/// Hands one document to object storage and yields its job identifier.
///
/// Holds no per-upload state: the [`claims::UploadTicket`] lives only for the
/// duration of [`UploadSession::submit`]. Neither network step is retried; the
/// ticket is single-use and may already be partially consumed when a write
/// fails.
#[derive(Clone)]
pub struct UploadSession {
    credentials: Arc<dyn CredentialProvider>,
    gateway: Arc<dyn OrchestrationGateway>,
    store: Arc<dyn ObjectStore>,
    policy: UploadPolicy,
}

impl UploadSession {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        gateway: Arc<dyn OrchestrationGateway>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            credentials,
            gateway,
            store,
            policy: UploadPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Checks `document` against the upload policy without touching the network.
    pub fn validate(&self, document: &Document) -> Result<(), ClaimError> {
        self.policy.validate(document)
    }

    /// Uploads `document` and returns the identifier it will be processed under.
    ///
    /// Polling is not started here; see `ClaimClient::submit`.
    #[instrument(
        name = "upload",
        skip_all,
        fields(
            submission_id = %SubmissionId::new_random(),
            file_name = document.file_name(),
            size = document.len(),
            media_type = %document.media_type(),
        )
    )]
    pub async fn submit(&self, document: &Document) -> Result<JobId, ClaimError> {
        if let Err(err) = self.validate(document) {
            warn!(error = %err, "document rejected by upload policy");
            return Err(err);
        }

        let token = self.credentials.auth_token().await?;

        let ticket = self
            .gateway
            .request_upload_ticket(document.file_name(), &token)
            .await
            .map_err(as_credential_failure)?;
        debug!(item_key = %ticket.item_key(), expires_in = ?ticket.expires_in(), "upload credential issued");

        let job_id = self
            .store
            .put_object(ticket, document)
            .await
            .map_err(as_upload_failure)?;
        info!(job_id = %job_id, "document uploaded");
        Ok(job_id)
    }
}

fn as_credential_failure(err: ClaimError) -> ClaimError {
    match err {
        ClaimError::NotAuthenticated { .. } | ClaimError::CredentialRequestFailed { .. } => err,
        other => ClaimError::CredentialRequestFailed {
            reason: other.to_string(),
            status: None,
        },
    }
}

fn as_upload_failure(err: ClaimError) -> ClaimError {
    match err {
        ClaimError::UploadFailed { .. } => err,
        other => ClaimError::UploadFailed {
            reason: other.to_string(),
            status: None,
        },
    }
}
