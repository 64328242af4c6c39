//! Composition of upload, polling, and result fetching.

use std::sync::Arc;

use async_trait::async_trait;
use claims::{
    decode_document, ClaimError, ClaimRecord, CredentialProvider, Document, JobId, ObjectStore,
    OrchestrationGateway, PollConfig, PollState, Scheduler, StatusSource, UploadPolicy,
};
use tracing::{debug, info, instrument};

use crate::poller::{PollHandle, StatusPoller};
use crate::upload::UploadSession;

/// Fetches a job's raw document and decodes it into a [`ClaimRecord`].
///
/// The production [`StatusSource`] for the poller.
#[derive(Clone)]
pub struct RecordFetcher {
    credentials: Arc<dyn CredentialProvider>,
    gateway: Arc<dyn OrchestrationGateway>,
}

impl RecordFetcher {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        gateway: Arc<dyn OrchestrationGateway>,
    ) -> Self {
        Self {
            credentials,
            gateway,
        }
    }

    #[instrument(name = "fetch_claim", skip_all, fields(job_id = %job_id))]
    pub async fn fetch(&self, job_id: &JobId) -> Result<ClaimRecord, ClaimError> {
        let token = self.credentials.auth_token().await?;
        // The raw identifier goes to the gateway; it owns path encoding.
        let document = self.gateway.fetch_claim_document(job_id, &token).await?;
        let record = decode_document(&document)?;
        debug!(status = record.status().unwrap_or_default(), fields = record.len(), "claim decoded");
        Ok(record)
    }
}

#[async_trait]
impl StatusSource for RecordFetcher {
    async fn fetch_status(&self, job_id: &JobId) -> Result<ClaimRecord, ClaimError> {
        self.fetch(job_id).await
    }
}

/// A completed upload whose job is being watched.
#[derive(Debug)]
pub struct Submission {
    pub job_id: JobId,
    pub handle: PollHandle,
}

/// Entry point for callers: submit documents, watch jobs, fetch results.
///
/// Holds wiring only. It is the one place a poll loop is started
/// automatically after an upload.
#[derive(Clone)]
pub struct ClaimClient {
    uploads: UploadSession,
    fetcher: RecordFetcher,
    poller: StatusPoller,
    poll_config: PollConfig,
}

impl ClaimClient {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        gateway: Arc<dyn OrchestrationGateway>,
        store: Arc<dyn ObjectStore>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let fetcher = RecordFetcher::new(credentials.clone(), gateway.clone());
        let poller = StatusPoller::new(Arc::new(fetcher.clone()), scheduler);
        Self {
            uploads: UploadSession::new(credentials, gateway, store),
            fetcher,
            poller,
            poll_config: PollConfig::default(),
        }
    }

    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.uploads = self.uploads.with_policy(policy);
        self
    }

    /// Sets the config used for watches started by [`ClaimClient::submit`].
    pub fn with_poll_config(mut self, config: PollConfig) -> Self {
        self.poll_config = config;
        self
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll_config
    }

    pub fn upload_policy(&self) -> &UploadPolicy {
        self.uploads.policy()
    }

    /// Uploads `document`, then starts watching its job with the client's
    /// poll config, forwarding every update to `on_update`.
    pub async fn submit<F>(&self, document: &Document, on_update: F) -> Result<Submission, ClaimError>
    where
        F: Fn(PollState) + Send + Sync + 'static,
    {
        let job_id = self.uploads.submit(document).await?;
        info!(job_id = %job_id, "watching submitted claim");
        let handle = self
            .poller
            .watch(job_id.clone(), on_update, self.poll_config.clone());
        Ok(Submission { job_id, handle })
    }

    /// Uploads `document` without watching the resulting job.
    pub async fn upload(&self, document: &Document) -> Result<JobId, ClaimError> {
        self.uploads.submit(document).await
    }

    /// Fetches and decodes the current record for `job_id` once.
    pub async fn fetch(&self, job_id: &JobId) -> Result<ClaimRecord, ClaimError> {
        self.fetcher.fetch(job_id).await
    }

    /// Watches an existing job.
    pub fn watch<F>(&self, job_id: JobId, on_update: F, config: PollConfig) -> PollHandle
    where
        F: Fn(PollState) + Send + Sync + 'static,
    {
        self.poller.watch(job_id, on_update, config)
    }
}

#[async_trait]
impl StatusSource for ClaimClient {
    async fn fetch_status(&self, job_id: &JobId) -> Result<ClaimRecord, ClaimError> {
        self.fetch(job_id).await
    }
}
