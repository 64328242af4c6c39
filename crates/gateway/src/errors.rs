//! Gateway construction errors and HTTP status → [`ClaimError`] mapping.

use claims::{ClaimError, JobId};
use reqwest::StatusCode;
use thiserror::Error;

/// Problems building a gateway. Converted to [`ClaimError::Configuration`]
/// at the boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl From<GatewayError> for ClaimError {
    fn from(err: GatewayError) -> Self {
        ClaimError::Configuration {
            message: err.to_string(),
        }
    }
}

/// Longest response body excerpt carried into an error message.
const BODY_EXCERPT_CHARS: usize = 200;

/// Which exchange a failed response belongs to. Selects the error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Exchange<'a> {
    Ticket,
    Fetch(&'a JobId),
    Write,
}

pub(crate) fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    let mut out: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
    if trimmed.chars().count() > BODY_EXCERPT_CHARS {
        out.push('…');
    }
    out
}

/// Maps a non-success HTTP response to the error for `exchange`.
pub(crate) fn from_status(exchange: Exchange<'_>, status: StatusCode, body: &str) -> ClaimError {
    let body = excerpt(body);
    let reason = if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {body}")
    };

    match (exchange, status) {
        // Presigned writes carry their own signature; a 403 there is an
        // expired or mismatched ticket, not a missing session.
        (Exchange::Write, _) => ClaimError::UploadFailed {
            reason,
            status: Some(status.as_u16()),
        },
        (_, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
            ClaimError::NotAuthenticated { reason }
        }
        (Exchange::Fetch(job_id), StatusCode::NOT_FOUND) => ClaimError::NotFound {
            job_id: job_id.clone(),
        },
        (Exchange::Fetch(_), _) => ClaimError::FetchFailed {
            reason,
            status: Some(status.as_u16()),
        },
        (Exchange::Ticket, _) => ClaimError::CredentialRequestFailed {
            reason,
            status: Some(status.as_u16()),
        },
    }
}

/// Maps a transport failure (no HTTP status available) for `exchange`.
pub(crate) fn from_transport(exchange: Exchange<'_>, err: &reqwest::Error) -> ClaimError {
    let reason = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_decode() {
        format!("unreadable response body: {err}")
    } else {
        err.to_string()
    };
    let status = err.status().map(|s| s.as_u16());
    match exchange {
        Exchange::Ticket => ClaimError::CredentialRequestFailed { reason, status },
        Exchange::Fetch(_) => ClaimError::FetchFailed { reason, status },
        Exchange::Write => ClaimError::UploadFailed { reason, status },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::ErrorCategory;

    fn job() -> JobId {
        JobId::new("u/claim.pdf").unwrap()
    }

    #[test]
    fn not_found_on_fetch_is_transient_not_found() {
        let job = job();
        let err = from_status(
            Exchange::Fetch(&job),
            StatusCode::NOT_FOUND,
            r#"{"error":"Claim not found"}"#,
        );
        assert_eq!(err, ClaimError::NotFound { job_id: job });
        assert!(err.is_not_found());
    }

    #[test]
    fn auth_failures_map_to_not_authenticated() {
        let job = job();
        for exchange in [Exchange::Ticket, Exchange::Fetch(&job)] {
            let err = from_status(exchange, StatusCode::UNAUTHORIZED, "");
            assert_eq!(err.category(), ErrorCategory::Unauthenticated);
        }
    }

    #[test]
    fn forbidden_presigned_write_is_upload_failure() {
        let err = from_status(Exchange::Write, StatusCode::FORBIDDEN, "<Error>expired</Error>");
        assert_eq!(
            err,
            ClaimError::UploadFailed {
                reason: "HTTP 403 Forbidden: <Error>expired</Error>".into(),
                status: Some(403),
            }
        );
    }

    #[test]
    fn server_errors_keep_status_code() {
        let job = job();
        assert_eq!(
            from_status(Exchange::Ticket, StatusCode::INTERNAL_SERVER_ERROR, ""),
            ClaimError::CredentialRequestFailed {
                reason: "HTTP 500 Internal Server Error".into(),
                status: Some(500),
            }
        );
        assert!(matches!(
            from_status(Exchange::Fetch(&job), StatusCode::BAD_GATEWAY, ""),
            ClaimError::FetchFailed {
                status: Some(502),
                ..
            }
        ));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(1_000);
        let out = excerpt(&body);
        assert_eq!(out.chars().count(), BODY_EXCERPT_CHARS + 1);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn gateway_error_becomes_configuration_error() {
        let err: ClaimError = GatewayError::InvalidBaseUrl {
            url: "x".into(),
            reason: "bad".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::InvalidInput);
    }
}
