//! Claim submission domain.
//!
//! This crate contains every domain concept shared by the claim client:
//! identifiers, upload policy, the typed-value decoder, decoded claim records,
//! the per-job poll state machine, the error taxonomy, and the port traits
//! infrastructure crates implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; `gateway` supplies HTTP, `workflow` supplies
//! timers and orchestration.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | `JobId`, `SubmissionId` |
//! | [`types`] | `Document`, `MediaType`, `UploadPolicy`, `UploadTicket`, `AuthToken`, `Timestamp` |
//! | [`decoder`] | Typed-value decoding into plain JSON |
//! | [`record`] | `ClaimRecord` and its risk / medical views |
//! | [`poll`] | `PollConfig`, `PollPhase`, `PollState` |
//! | [`errors`] | `ClaimError`, `ErrorKind`, `ErrorCategory`, `RetryPolicy` |
//! | [`ports`] | `CredentialProvider`, `OrchestrationGateway`, `ObjectStore`, `StatusSource`, `Scheduler` |

pub mod decoder;
pub mod errors;
pub mod identifiers;
pub mod poll;
pub mod ports;
pub mod record;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use decoder::{decode, decode_document, is_tagged_wrapper};
pub use errors::{ClaimError, ErrorCategory, ErrorKind, RetryPolicy};
pub use identifiers::{JobId, SubmissionId};
pub use poll::{PollConfig, PollPhase, PollState};
pub use ports::{CredentialProvider, ObjectStore, OrchestrationGateway, Scheduler, StatusSource};
pub use record::{
    ClaimRecord, MedicalEntities, Patient, Provider, RecommendedAction, RiskAnalysis, RiskFactor,
    RiskLevel, RiskStatistics,
};
pub use types::{
    AuthToken, Document, MediaType, Timestamp, UploadPolicy, UploadTicket,
    DEFAULT_MAX_UPLOAD_BYTES,
};
