//! C7 — Browser façade: composes C1-C6, owning the builder/initialization
//! protocol and the closed-state flag (§4.7).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::{RemoteZipError, Result};
use crate::transport::{HttpClient, RangeFetcher, ReqwestClient, SizeProbe, basic_auth_header};
use crate::zip::{CentralDirectoryParser, Entry, Index, MemberBody, MemberExtractor, TrailerLocator};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_RETRIES: u32 = 10;

/// Configures and constructs a [`Browser`] (§4.7, §6).
///
/// ```no_run
/// # async fn example() -> remotezip::Result<()> {
/// use remotezip::Builder;
///
/// let browser = Builder::new("https://example.com/archive.zip")
///     .with_basic_auth("alice", "hunter2")
///     .build()
///     .await?;
///
/// for name in browser.list().await? {
///     println!("{name}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct Builder {
    url: String,
    username: Option<String>,
    password: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    user_agent: Option<String>,
    max_retries: u32,
}

impl Builder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            http_client: None,
            user_agent: None,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Configure HTTP Basic authentication. Both username and password must
    /// be supplied for the credential to take effect (§6).
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Replace the default [`ReqwestClient`] with a custom HTTP collaborator
    /// (e.g. a test double, or a client with custom proxy/TLS settings).
    pub fn with_http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the `User-Agent` header used by the default client. Ignored when
    /// [`Builder::with_http_client`] is used.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the retry budget for transient connect/timeout errors used by
    /// the default client. Ignored when [`Builder::with_http_client`] is
    /// used. Defaults to 10.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn authorization(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => Some(basic_auth_header(u, p)),
            _ => None,
        }
    }

    /// Run the initialization pipeline (§2): SizeProbe → TrailerLocator →
    /// CentralDirectoryParser → Index, producing a ready [`Browser`].
    pub async fn build(self) -> Result<Browser> {
        let authorization = self.authorization();
        let client = match self.http_client {
            Some(client) => client,
            None => Arc::new(ReqwestClient::with_config(
                DEFAULT_TIMEOUT,
                self.max_retries,
                self.user_agent.as_deref(),
            )?),
        };

        let size_probe = SizeProbe::new(client.clone(), self.url.clone(), authorization.clone());
        let archive_size = size_probe.probe().await?;
        tracing::info!(url = %self.url, archive_size, "probed archive");

        let fetcher = RangeFetcher::new(client.clone(), self.url.clone(), authorization.clone());

        let location = TrailerLocator::new(&fetcher, archive_size).locate().await?;
        tracing::debug!(
            cd_offset = location.offset,
            cd_size = location.size,
            total_entries = location.total_entries,
            "located Central Directory"
        );

        let entries = CentralDirectoryParser::new(&fetcher).parse(&location).await?;
        let index = Index::build(entries);
        tracing::info!(member_count = index.len(), "built member index");

        Ok(Browser {
            archive_url: self.url,
            client,
            authorization,
            archive_size,
            index: Arc::new(index),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// A browser over a single remote ZIP archive (§3, §4.7).
///
/// Constructed via [`Builder::build`]. The underlying [`Index`] is built
/// once during construction and never mutated; `list`/`get` calls against an
/// open `Browser` are safe to run concurrently without any locking on the
/// index.
pub struct Browser {
    archive_url: String,
    client: Arc<dyn HttpClient>,
    authorization: Option<String>,
    archive_size: u64,
    index: Arc<Index>,
    closed: Arc<AtomicBool>,
}

impl Browser {
    /// Total size of the remote archive, in bytes. Always available, even
    /// after [`Browser::close`] — it is a plain value, not an I/O operation.
    pub fn size(&self) -> u64 {
        self.archive_size
    }

    /// List all member names, in Central Directory order. Completes
    /// immediately from the pre-built index; issues no I/O.
    pub async fn list(&self) -> Result<Vec<String>> {
        self.check_open()?;
        Ok(self.index.list().to_vec())
    }

    /// Look up a member's metadata without fetching or decompressing its
    /// payload.
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.index.find(name)
    }

    /// All members' metadata, in Central Directory order. Like `list`, this
    /// is a pure read of the pre-built index and issues no I/O.
    pub async fn entries(&self) -> Result<Vec<Entry>> {
        self.check_open()?;
        Ok(self
            .index
            .list()
            .iter()
            .filter_map(|name| self.index.find(name).cloned())
            .collect())
    }

    /// Extract a member's payload. Returns `Ok(None)` when the name is not
    /// in the archive, or names a directory entry (§4.6). Issues one Local
    /// Header re-read and one payload fetch.
    pub async fn get(&self, name: &str) -> Result<Option<MemberBody>> {
        self.check_open()?;
        let Some(entry) = self.index.find(name) else {
            return Ok(None);
        };
        if entry.is_directory {
            return Ok(None);
        }

        let fetcher = self.fetcher();
        let body = MemberExtractor::new(&fetcher).extract(entry).await?;
        Ok(Some(body))
    }

    /// Like [`Browser::get`], but fully materializes the payload and
    /// verifies it against the Central Directory's recorded CRC-32 before
    /// returning it (§4.6, §9 Open Question: CRC verification is opt-in).
    pub async fn get_verified(&self, name: &str) -> Result<Option<Vec<u8>>> {
        self.check_open()?;
        let Some(entry) = self.index.find(name) else {
            return Ok(None);
        };
        if entry.is_directory {
            return Ok(None);
        }

        let fetcher = self.fetcher();
        let body = MemberExtractor::new(&fetcher).extract(entry).await?;
        let bytes = body.into_vec()?;

        let mut crc = flate2::Crc::new();
        crc.update(&bytes);
        let actual = crc.sum();
        if actual != entry.crc32 {
            return Err(RemoteZipError::ChecksumMismatch {
                expected: entry.crc32,
                actual,
            });
        }

        Ok(Some(bytes))
    }

    /// Latch the browser closed. Idempotent; a racing `close()` during an
    /// in-flight `get` lets that extraction complete, but any `get`/`list`
    /// call that *observes* `closed == true` at entry will reject with
    /// [`RemoteZipError::BrowserClosed`] (§5).
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn fetcher(&self) -> RangeFetcher {
        RangeFetcher::new(
            self.client.clone(),
            self.archive_url.clone(),
            self.authorization.clone(),
        )
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(RemoteZipError::BrowserClosed)
        } else {
            Ok(())
        }
    }
}
