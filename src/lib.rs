//! # remotezip
//!
//! Browse and extract members of a remote ZIP archive over HTTP Range
//! requests, without ever downloading the whole file.
//!
//! ## Features
//!
//! - Locate the End Of Central Directory record (and, for archives over
//!   4 GiB, the ZIP64 chain) with a handful of small suffix reads.
//! - Parse the Central Directory into a name-indexed [`Index`](zip::Index),
//!   resolving ZIP64 extra fields along the way.
//! - Extract a single member with exactly one Local Header re-read and one
//!   payload fetch — never the rest of the archive.
//! - STORED and DEFLATE compression, HTTP Basic auth, and a pluggable
//!   [`HttpClient`] for testing or custom transport configuration.
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> remotezip::Result<()> {
//! use remotezip::Builder;
//!
//! let browser = Builder::new("https://example.com/archive.zip").build().await?;
//!
//! for name in browser.list().await? {
//!     if let Some(body) = browser.get(&name).await? {
//!         println!("{name}: {} bytes", body.len_hint());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod browser;
mod error;
mod transport;
mod zip;

pub use browser::{Browser, Builder};
pub use error::{RemoteZipError, Result};
pub use transport::{HttpClient, HttpResponse, ReqwestClient};
pub use zip::{CompressionMethod, Entry, MemberBody};
