//! Claim orchestration API and object storage adapter.
//!
//! Implements the [`claims::OrchestrationGateway`], [`claims::ObjectStore`]
//! and [`claims::CredentialProvider`] ports over HTTP with `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, URL construction, status-code mapping
//! and response parsing live here. The `workflow` crate sees only the port
//! traits.
//!
//! ## Wire contract
//!
//! | Operation | Request | Success body |
//! |---|---|---|
//! | upload ticket | `GET {base}/upload-url?filename=<name>` | `{"uploadUrl", "fileKey", "expiresIn"}` |
//! | claim document | `GET {base}/claim/<job id>` | tagged or plain claim document |
//! | storage write | `PUT <uploadUrl>` with `Content-Type` | any 2xx |
//!
//! API requests carry the session token verbatim in `Authorization`. The
//! storage write is authorised by the presigned URL alone.
//!
//! Job identifiers are encoded into the path exactly once, by [`Endpoints`].

mod credentials;
mod endpoints;
mod errors;
mod http;

pub use credentials::{EnvTokenProvider, StaticTokenProvider, TOKEN_ENV_VAR};
pub use endpoints::Endpoints;
pub use errors::GatewayError;
pub use http::{HttpGateway, HttpGatewayConfig, DEFAULT_REQUEST_TIMEOUT};
