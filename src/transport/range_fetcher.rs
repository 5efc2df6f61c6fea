//! C1 — RangeFetcher: issues byte-range HTTP requests and classifies the
//! response (§4.1).

use std::sync::Arc;

use bytes::Bytes;

use crate::error::{RemoteZipError, Result};

use super::client::HttpClient;

/// Issues a byte-range HTTP request for `[start, end]` (inclusive) against a
/// fixed archive URL, and classifies the response per §4.1:
///
/// - `206 Partial Content` → the payload.
/// - `200 OK` → fatal [`RemoteZipError::RangeUnsupported`] — the server
///   ignored the Range header and would have sent the whole archive.
/// - anything else → [`RemoteZipError::HttpStatus`].
///
/// Stateless and safe to invoke concurrently: each call is an independent
/// request against a shared, `Send + Sync` HTTP client.
pub struct RangeFetcher {
    client: Arc<dyn HttpClient>,
    url: String,
    authorization: Option<String>,
}

impl RangeFetcher {
    pub fn new(client: Arc<dyn HttpClient>, url: String, authorization: Option<String>) -> Self {
        Self {
            client,
            url,
            authorization,
        }
    }

    /// Fetch the inclusive byte range `[start, end]`. Requires `start <= end`.
    pub async fn fetch(&self, start: u64, end: u64) -> Result<Bytes> {
        debug_assert!(start <= end, "range start must not exceed end");
        let expected_len = (end - start + 1) as usize;

        let span = tracing::debug_span!("range_fetch", start, end, expected_len);
        let _enter = span.enter();

        let response = self
            .client
            .get_range(&self.url, Some((start, end)), self.authorization.as_deref())
            .await?;

        match response.status {
            206 => {
                if response.body.len() != expected_len {
                    return Err(RemoteZipError::ShortRead {
                        offset: start,
                        expected: expected_len,
                        actual: response.body.len(),
                    });
                }
                tracing::debug!(bytes = response.body.len(), "range fetched");
                Ok(response.body)
            }
            200 => Err(RemoteZipError::RangeUnsupported),
            other => Err(RemoteZipError::HttpStatus(other)),
        }
    }
}
