//! C2 — SizeProbe: determines total archive length via a metadata-only
//! request (§4.2).

use std::sync::Arc;

use crate::error::{RemoteZipError, Result};

use super::client::HttpClient;

/// Issues a metadata-only request and extracts `Content-Length`, which is
/// the sole source of truth for `archiveSize` throughout the rest of the
/// pipeline.
pub struct SizeProbe {
    client: Arc<dyn HttpClient>,
    url: String,
    authorization: Option<String>,
}

impl SizeProbe {
    pub fn new(client: Arc<dyn HttpClient>, url: String, authorization: Option<String>) -> Self {
        Self {
            client,
            url,
            authorization,
        }
    }

    /// Determine the archive's total size in bytes.
    pub async fn probe(&self) -> Result<u64> {
        let response = self
            .client
            .head(&self.url, self.authorization.as_deref())
            .await?;

        if response.status != 200 {
            return Err(RemoteZipError::HttpStatus(response.status));
        }

        let raw = response
            .content_length
            .ok_or(RemoteZipError::MissingContentLength)?;
        let size: u64 = raw
            .parse()
            .map_err(|_| RemoteZipError::MalformedContentLength(raw))?;

        tracing::debug!(archive_size = size, "probed archive size");
        Ok(size)
    }
}
