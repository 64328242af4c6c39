//! Hand-written fakes for the claims port traits.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use claims::{
    AuthToken, ClaimError, ClaimRecord, CredentialProvider, Document, JobId, ObjectStore,
    OrchestrationGateway, PollState, Scheduler, StatusSource, UploadTicket,
};
use serde_json::{json, Value};

pub fn job(id: &str) -> JobId {
    JobId::new(id).expect("non-empty job id")
}

pub fn record(value: Value) -> ClaimRecord {
    ClaimRecord::from_value(value).expect("object")
}

pub fn status(status: &str) -> Result<ClaimRecord, ClaimError> {
    Ok(record(json!({ "status": status })))
}

pub fn completed() -> Result<ClaimRecord, ClaimError> {
    Ok(record(json!({
        "status": "SCORING_COMPLETE",
        "processing_complete": true
    })))
}

pub fn not_found(id: &str) -> Result<ClaimRecord, ClaimError> {
    Err(ClaimError::NotFound { job_id: job(id) })
}

/// Collects every update delivered by a poll loop.
#[derive(Clone, Default)]
pub struct Updates(Arc<Mutex<Vec<PollState>>>);

impl Updates {
    pub fn sink(&self) -> impl Fn(PollState) + Send + Sync + 'static {
        let inner = self.0.clone();
        move |state| inner.lock().unwrap().push(state)
    }

    pub fn all(&self) -> Vec<PollState> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

// ---------------------------------------------------------------------------

pub struct StaticCredentials {
    token: Option<AuthToken>,
    pub calls: AtomicUsize,
}

impl StaticCredentials {
    pub fn signed_in() -> Arc<Self> {
        Arc::new(Self {
            token: AuthToken::new("test-token"),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self {
            token: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn auth_token(&self) -> Result<AuthToken, ClaimError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.token.clone().ok_or_else(|| ClaimError::NotAuthenticated {
            reason: "no session".into(),
        })
    }
}

// ---------------------------------------------------------------------------

pub struct FakeGateway {
    ticket: Result<UploadTicket, ClaimError>,
    documents: Mutex<VecDeque<Result<Value, ClaimError>>>,
    pub ticket_requests: Mutex<Vec<String>>,
    pub fetched: Mutex<Vec<JobId>>,
}

impl FakeGateway {
    pub fn issuing(item_key: &str) -> Self {
        Self::with_ticket(Ok(UploadTicket::new(
            "https://storage.example/upload?sig=abc",
            job(item_key),
            Some(Duration::from_secs(300)),
        )))
    }

    pub fn with_ticket(ticket: Result<UploadTicket, ClaimError>) -> Self {
        Self {
            ticket,
            documents: Mutex::new(VecDeque::new()),
            ticket_requests: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn serving(self, documents: Vec<Result<Value, ClaimError>>) -> Self {
        *self.documents.lock().unwrap() = documents.into();
        self
    }

    pub fn ticket_requests(&self) -> Vec<String> {
        self.ticket_requests.lock().unwrap().clone()
    }

    pub fn fetched(&self) -> Vec<JobId> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrchestrationGateway for FakeGateway {
    async fn request_upload_ticket(
        &self,
        file_name: &str,
        _token: &AuthToken,
    ) -> Result<UploadTicket, ClaimError> {
        self.ticket_requests
            .lock()
            .unwrap()
            .push(file_name.to_string());
        self.ticket.clone()
    }

    async fn fetch_claim_document(
        &self,
        job_id: &JobId,
        _token: &AuthToken,
    ) -> Result<Value, ClaimError> {
        self.fetched.lock().unwrap().push(job_id.clone());
        self.documents
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ClaimError::NotFound {
                    job_id: job_id.clone(),
                })
            })
    }
}

// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Write {
    pub url: String,
    pub content_type: String,
    pub len: usize,
}

pub struct FakeStore {
    result: Result<(), ClaimError>,
    pub writes: Mutex<Vec<Write>>,
}

impl FakeStore {
    pub fn accepting() -> Self {
        Self::with_result(Ok(()))
    }

    pub fn with_result(result: Result<(), ClaimError>) -> Self {
        Self {
            result,
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn put_object(&self, ticket: UploadTicket, document: &Document) -> Result<JobId, ClaimError> {
        self.writes.lock().unwrap().push(Write {
            url: ticket.write_url().to_string(),
            content_type: document.media_type().to_string(),
            len: document.bytes().len(),
        });
        self.result.clone().map(|()| ticket.into_item_key())
    }
}

// ---------------------------------------------------------------------------

/// Returns scripted results in order, then `fallback` forever.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<ClaimRecord, ClaimError>>>,
    fallback: Result<ClaimRecord, ClaimError>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(
        script: Vec<Result<ClaimRecord, ClaimError>>,
        fallback: Result<ClaimRecord, ClaimError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn always(result: Result<ClaimRecord, ClaimError>) -> Arc<Self> {
        Self::new(Vec::new(), result)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch_status(&self, _job_id: &JobId) -> Result<ClaimRecord, ClaimError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

// ---------------------------------------------------------------------------

/// Records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingScheduler {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingScheduler {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Scheduler for RecordingScheduler {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}
