//! reqwest-backed implementation of [`OrchestrationGateway`] and [`ObjectStore`].

use std::time::Duration;

use async_trait::async_trait;
use claims::{
    AuthToken, ClaimError, Document, JobId, ObjectStore, OrchestrationGateway, UploadTicket,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::endpoints::Endpoints;
use crate::errors::{from_status, from_transport, Exchange, GatewayError};

/// Default per-request timeout for API calls and storage writes.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`HttpGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpGatewayConfig {
    /// API base URL, e.g. `https://abc123.execute-api.us-east-1.amazonaws.com/prod`.
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl HttpGatewayConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: concat!("claimwatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Body of `GET /upload-url`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketResponse {
    upload_url: String,
    file_key: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl TicketResponse {
    fn into_ticket(self) -> Result<UploadTicket, ClaimError> {
        let item_key = JobId::new(self.file_key).ok_or_else(|| {
            ClaimError::CredentialRequestFailed {
                reason: "response carried an empty fileKey".into(),
                status: None,
            }
        })?;
        if self.upload_url.trim().is_empty() {
            return Err(ClaimError::CredentialRequestFailed {
                reason: "response carried an empty uploadUrl".into(),
                status: None,
            });
        }
        Ok(UploadTicket::new(
            self.upload_url,
            item_key,
            self.expires_in.map(Duration::from_secs),
        ))
    }
}

/// HTTP adapter for the orchestration API and presigned storage writes.
///
/// One instance is cheap to clone and shares its connection pool.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    endpoints: Endpoints,
}

impl HttpGateway {
    pub fn new(config: &HttpGatewayConfig) -> Result<Self, GatewayError> {
        let endpoints = Endpoints::new(&config.api_base_url)?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn check(exchange: Exchange<'_>, response: Response) -> Result<Response, ClaimError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(from_status(exchange, status, &body))
    }
}

#[async_trait]
impl OrchestrationGateway for HttpGateway {
    #[instrument(skip_all, fields(file_name = %file_name))]
    async fn request_upload_ticket(
        &self,
        file_name: &str,
        token: &AuthToken,
    ) -> Result<UploadTicket, ClaimError> {
        let exchange = Exchange::Ticket;
        let url = self.endpoints.upload_ticket(file_name);
        debug!(path = url.path(), "Requesting upload ticket");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, token.expose())
            .send()
            .await
            .map_err(|err| from_transport(exchange, &err))?;
        let response = Self::check(exchange, response).await?;
        let body: TicketResponse = response
            .json()
            .await
            .map_err(|err| from_transport(exchange, &err))?;
        body.into_ticket()
    }

    #[instrument(skip_all, fields(job_id = %job_id))]
    async fn fetch_claim_document(
        &self,
        job_id: &JobId,
        token: &AuthToken,
    ) -> Result<Value, ClaimError> {
        let exchange = Exchange::Fetch(job_id);
        let url = self.endpoints.claim(job_id);
        debug!(path = url.path(), "Fetching claim document");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, token.expose())
            .send()
            .await
            .map_err(|err| from_transport(exchange, &err))?;
        let response = Self::check(exchange, response).await?;
        response
            .json::<Value>()
            .await
            .map_err(|err| from_transport(exchange, &err))
    }
}

#[async_trait]
impl ObjectStore for HttpGateway {
    #[instrument(skip_all, fields(item_key = %ticket.item_key(), size = document.len()))]
    async fn put_object(&self, ticket: UploadTicket, document: &Document) -> Result<JobId, ClaimError> {
        let exchange = Exchange::Write;
        // The presigned URL is already signed and encoded; it is sent as issued.
        let response = self
            .client
            .put(ticket.write_url())
            .header(CONTENT_TYPE, document.media_type().as_str())
            .body(document.bytes().to_vec())
            .send()
            .await
            .map_err(|err| from_transport(exchange, &err))?;
        Self::check(exchange, response).await?;
        debug!("Storage write accepted");
        Ok(ticket.into_item_key())
    }
}
