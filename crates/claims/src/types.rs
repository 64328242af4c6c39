//! Shared value types for claim submission.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values with invariants (accepted media types, size limits, attempt budgets)
//! and participate in domain decisions.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ClaimError, JobId};

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// A bearer credential for the orchestration boundary.
///
/// The `Debug` implementation never prints the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Creates a token, returning `None` for an empty value.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.trim().is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Returns the raw token for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Content type of a submitted document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaType {
    Pdf,
    Jpeg,
    Png,
    /// Any other content type, stored verbatim (lower-cased).
    Other(String),
}

impl MediaType {
    /// Returns the MIME string sent as the `Content-Type` of the storage write.
    pub fn as_str(&self) -> &str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Other(s) => s,
        }
    }

    /// Parses a MIME string, ignoring case and any `;` parameters.
    pub fn parse(value: &str) -> Self {
        let essence = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" => MediaType::Pdf,
            "image/jpeg" | "image/jpg" => MediaType::Jpeg,
            "image/png" => MediaType::Png,
            _ => MediaType::Other(essence),
        }
    }

    /// Infers the media type from a file name extension.
    ///
    /// Unknown extensions yield `application/octet-stream`, which upload
    /// validation then rejects.
    pub fn from_file_name(file_name: &str) -> Self {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => MediaType::Pdf,
            "jpg" | "jpeg" => MediaType::Jpeg,
            "png" => MediaType::Png,
            _ => MediaType::Other("application/octet-stream".to_string()),
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for MediaType {
    fn from(value: String) -> Self {
        MediaType::parse(&value)
    }
}

impl From<MediaType> for String {
    fn from(value: MediaType) -> Self {
        value.as_str().to_string()
    }
}

/// A binary document to submit for processing.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    file_name: String,
    media_type: MediaType,
    bytes: Vec<u8>,
}

impl Document {
    /// Creates a document with an explicitly declared media type.
    pub fn new(file_name: impl Into<String>, media_type: MediaType, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type,
            bytes,
        }
    }

    /// Creates a document whose media type is inferred from its file name.
    pub fn from_file_name(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let media_type = MediaType::from_file_name(&file_name);
        Self::new(file_name, media_type, bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the document in bytes.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Upload policy and tickets
// ---------------------------------------------------------------------------

/// Default upload size limit: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Client-side admission rules applied before any network call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadPolicy {
    /// Largest accepted document, in bytes.
    pub max_bytes: u64,
    /// Accepted content types.
    pub accepted: Vec<MediaType>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            accepted: vec![MediaType::Pdf, MediaType::Jpeg, MediaType::Png],
        }
    }
}

impl UploadPolicy {
    /// Checks `document` against the policy.
    ///
    /// Order: empty, size, then media type.
    pub fn validate(&self, document: &Document) -> Result<(), ClaimError> {
        if document.is_empty() {
            return Err(ClaimError::EmptyDocument {
                file_name: document.file_name().to_string(),
            });
        }
        if document.len() > self.max_bytes {
            return Err(ClaimError::PayloadTooLarge {
                size: document.len(),
                limit: self.max_bytes,
            });
        }
        if !self.accepted.contains(document.media_type()) {
            return Err(ClaimError::UnsupportedMediaType {
                media_type: document.media_type().to_string(),
            });
        }
        Ok(())
    }

    /// Validates the policy itself.
    pub fn check(&self) -> Result<(), ClaimError> {
        if self.max_bytes == 0 {
            return Err(ClaimError::Configuration {
                message: "upload maxBytes must be greater than zero".into(),
            });
        }
        if self.accepted.is_empty() {
            return Err(ClaimError::Configuration {
                message: "upload accepted media types must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// A short-lived, single-use credential for one direct storage write.
///
/// Owned by the upload session that requested it and consumed by the write.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadTicket {
    write_url: String,
    item_key: JobId,
    expires_in: Option<Duration>,
}

impl UploadTicket {
    pub fn new(write_url: impl Into<String>, item_key: JobId, expires_in: Option<Duration>) -> Self {
        Self {
            write_url: write_url.into(),
            item_key,
            expires_in,
        }
    }

    /// The pre-authorised destination URL. Used verbatim; never re-encoded.
    pub fn write_url(&self) -> &str {
        &self.write_url
    }

    /// The identifier the uploaded item will be known by.
    pub fn item_key(&self) -> &JobId {
        &self.item_key
    }

    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_in
    }

    /// Consumes the ticket, yielding the item key.
    pub fn into_item_key(self) -> JobId {
        self.item_key
    }
}

impl std::fmt::Debug for UploadTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The write URL embeds a signature; keep it out of logs.
        f.debug_struct("UploadTicket")
            .field("item_key", &self.item_key)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
