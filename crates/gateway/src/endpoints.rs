//! URL construction for the orchestration boundary.
//!
//! This is the only code in the workspace that encodes caller-supplied values
//! into URLs. Values are appended with [`reqwest::Url::path_segments_mut`] and
//! [`reqwest::Url::query_pairs_mut`], which percent-encode them exactly once;
//! callers always pass raw, unencoded strings.

use claims::JobId;
use reqwest::Url;

use crate::errors::GatewayError;

const UPLOAD_URL_SEGMENT: &str = "upload-url";
const CLAIM_SEGMENT: &str = "claim";

/// Endpoint builder rooted at the API base URL (e.g. `https://api.example/prod`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Validates `base` as an `http`/`https` URL that can carry path segments.
    pub fn new(base: &str) -> Result<Self, GatewayError> {
        let url = Url::parse(base.trim()).map_err(|err| GatewayError::InvalidBaseUrl {
            url: base.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidBaseUrl {
                url: base.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if url.cannot_be_a_base() || url.query().is_some() || url.fragment().is_some() {
            return Err(GatewayError::InvalidBaseUrl {
                url: base.to_string(),
                reason: "base URL must be a plain path without query or fragment".into(),
            });
        }
        Ok(Self { base: url })
    }

    /// `GET {base}/upload-url?filename=<file_name>`
    pub fn upload_ticket(&self, file_name: &str) -> Url {
        let mut url = self.with_segments(&[UPLOAD_URL_SEGMENT]);
        url.query_pairs_mut().append_pair("filename", file_name);
        url
    }

    /// `GET {base}/claim/{job_id}` with `job_id` as a single encoded segment,
    /// so `/` inside the identifier becomes `%2F`.
    pub fn claim(&self, job_id: &JobId) -> Url {
        self.with_segments(&[CLAIM_SEGMENT, job_id.as_str()])
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejected cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::new("https://api.example.com/prod").unwrap()
    }

    fn percent_decode(s: &str) -> String {
        let bytes = s.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' && i + 2 < bytes.len() {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap();
                out.push(u8::from_str_radix(hex, 16).unwrap());
                i += 3;
            } else {
                out.push(bytes[i]);
                i += 1;
            }
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn claim_id_with_slash_is_encoded_exactly_once() {
        let url = endpoints().claim(&JobId::new("2024/claim-01.pdf").unwrap());
        assert_eq!(url.path(), "/prod/claim/2024%2Fclaim-01.pdf");

        let segment = url.path_segments().unwrap().last().unwrap().to_string();
        assert_eq!(percent_decode(&segment), "2024/claim-01.pdf");
    }

    #[test]
    fn id_ending_in_an_escaped_byte_round_trips() {
        let url = endpoints().claim(&JobId::new("2024/").unwrap());
        let segment = url.path_segments().unwrap().last().unwrap().to_string();
        assert_eq!(segment, "2024%2F");
        assert_eq!(percent_decode(&segment), "2024/");
    }

    #[test]
    fn already_escaped_looking_ids_are_treated_as_raw() {
        // A literal '%' is data, not an escape: it must round-trip unchanged.
        let url = endpoints().claim(&JobId::new("a%2Fb").unwrap());
        let segment = url.path_segments().unwrap().last().unwrap().to_string();
        assert_eq!(segment, "a%252Fb");
        assert_eq!(percent_decode(&segment), "a%2Fb");
    }

    #[test]
    fn spaces_and_unicode_are_encoded() {
        let url = endpoints().claim(&JobId::new("u 1/café.pdf").unwrap());
        assert_eq!(url.path(), "/prod/claim/u%201%2Fcaf%C3%A9.pdf");
    }

    #[test]
    fn trailing_slash_on_base_does_not_double() {
        let endpoints = Endpoints::new("https://api.example.com/prod/").unwrap();
        let url = endpoints.claim(&JobId::new("x").unwrap());
        assert_eq!(url.as_str(), "https://api.example.com/prod/claim/x");
    }

    #[test]
    fn upload_ticket_encodes_filename_query() {
        let url = endpoints().upload_ticket("claim 01&2.pdf");
        assert_eq!(url.path(), "/prod/upload-url");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![("filename".to_string(), "claim 01&2.pdf".to_string())]
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        for base in ["not a url", "ftp://x/y", "mailto:a@b", "https://x/p?q=1"] {
            assert!(Endpoints::new(base).is_err(), "{base} accepted");
        }
    }
}
