//! The default HTTP collaborator: a thin, retrying wrapper around
//! [`reqwest::Client`].
//!
//! A small trait sits in front of it so `Builder::with_http_client` (§4.7)
//! can substitute a test double without touching any parsing code.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use crate::error::{RemoteZipError, Result};

/// Default client-level request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries on transient connect/timeout errors.
const DEFAULT_MAX_RETRIES: u32 = 10;

/// The raw response produced by an HTTP collaborator: enough for
/// [`RangeFetcher`](super::RangeFetcher) and
/// [`SizeProbe`](super::SizeProbe) to classify and act on, and nothing more.
pub struct HttpResponse {
    pub status: u16,
    /// The raw `Content-Length` header value, unparsed. Left as a string so
    /// callers can distinguish "header missing" from "header present but not
    /// a valid integer" ([`RemoteZipError::MissingContentLength`] vs.
    /// [`RemoteZipError::MalformedContentLength`]).
    pub content_length: Option<String>,
    pub body: Bytes,
}

/// The external HTTP collaborator contract (§6).
///
/// Implementations must honor `Range: bytes=S-E` by returning `206` with a
/// body of exactly `E - S + 1` bytes, and must honor metadata-only requests
/// by returning `Content-Length`. TLS trust, connection pooling, HTTP
/// version selection and proxying are this trait's implementor's concern,
/// not the rest of this crate's.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET against `url`, optionally with a `Range: bytes=start-end`
    /// header and an `Authorization` header.
    async fn get_range(
        &self,
        url: &str,
        range: Option<(u64, u64)>,
        authorization: Option<&str>,
    ) -> Result<HttpResponse>;

    /// Perform a metadata-only (`HEAD`) request against `url`.
    async fn head(&self, url: &str, authorization: Option<&str>) -> Result<HttpResponse>;
}

/// Default [`HttpClient`] backed by [`reqwest::Client`].
pub struct ReqwestClient {
    client: Client,
    max_retries: u32,
}

impl ReqwestClient {
    /// Build a client with the crate's default timeout and retry budget.
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_MAX_RETRIES, None)
    }

    /// Build a client with an explicit timeout, retry budget, and optional
    /// user agent string.
    pub fn with_config(
        timeout: Duration,
        max_retries: u32,
        user_agent: Option<&str>,
    ) -> Result<Self> {
        let mut builder = Client::builder().timeout(timeout);
        if let Some(ua) = user_agent {
            builder = builder.user_agent(ua.to_owned());
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            max_retries,
        })
    }

    async fn send_with_retries(
        &self,
        url: &str,
        range: Option<(u64, u64)>,
        authorization: Option<&str>,
    ) -> Result<HttpResponse> {
        let mut retry_count = 0u32;
        loop {
            let mut request = self.client.get(url);
            if let Some((start, end)) = range {
                request = request.header("Range", format!("bytes={start}-{end}"));
            }
            if let Some(auth) = authorization {
                request = request.header("Authorization", auth);
            }

            match request.send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let content_length = resp
                        .headers()
                        .get("content-length")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);

                    // A range-incapable server answers a Range GET with a
                    // full 200 OK body. Bail before buffering it: the whole
                    // point of ranged access is to never hold the archive in
                    // memory, and RangeFetcher rejects this status anyway.
                    if range.is_some() && status == 200 {
                        return Ok(HttpResponse {
                            status,
                            content_length,
                            body: Bytes::new(),
                        });
                    }

                    let body = resp.bytes().await?;
                    return Ok(HttpResponse {
                        status,
                        content_length,
                        body,
                    });
                }
                Err(e) if (e.is_timeout() || e.is_connect()) && retry_count < self.max_retries => {
                    retry_count += 1;
                    tracing::warn!(
                        attempt = retry_count,
                        max_retries = self.max_retries,
                        error = %e,
                        "transient network error, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(RemoteZipError::Transport(e)),
            }
        }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        // Safe to unwrap: building a plain reqwest client with a timeout
        // only fails on invalid TLS backend configuration, which we don't
        // customize here.
        Self::new().expect("failed to construct default HTTP client")
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get_range(
        &self,
        url: &str,
        range: Option<(u64, u64)>,
        authorization: Option<&str>,
    ) -> Result<HttpResponse> {
        self.send_with_retries(url, range, authorization).await
    }

    async fn head(&self, url: &str, authorization: Option<&str>) -> Result<HttpResponse> {
        let mut request = self.client.head(url);
        if let Some(auth) = authorization {
            request = request.header("Authorization", auth);
        }
        let resp = request.send().await?;
        let status = resp.status().as_u16();
        let content_length = resp
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        Ok(HttpResponse {
            status,
            content_length,
            body: Bytes::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    async fn serve_full_ignoring_range() -> impl IntoResponse {
        vec![0u8; 1 << 20]
    }

    #[tokio::test]
    async fn range_request_answered_with_200_does_not_buffer_the_body() {
        let app = Router::new().route("/archive.zip", get(serve_full_ignoring_range));
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = ReqwestClient::new().unwrap();
        let response = client
            .get_range(&format!("http://{addr}/archive.zip"), Some((0, 99)), None)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert!(response.body.is_empty());
    }
}
