//! Error types for the remote ZIP browser.
//!
//! Every fallible operation in this crate returns [`RemoteZipError`]. Unlike
//! a CLI's `anyhow`-based error handling, a library's callers need to match
//! on *what kind* of failure occurred (was the server range-incapable? did
//! the archive fail to parse? is the member's compression method
//! unsupported?), so each failure mode gets its own variant rather than an
//! opaque error chain.

use thiserror::Error;

/// Errors that can occur while locating the ZIP trailer, parsing the
/// Central Directory, or extracting a member.
#[derive(Error, Debug)]
pub enum RemoteZipError {
    /// The server responded `200 OK` to a Range request instead of `206
    /// Partial Content`. Fatal: continuing would require buffering the
    /// entire archive in memory, defeating the point of range-based access.
    #[error("server does not support range requests (returned 200 OK to a Range request)")]
    RangeUnsupported,

    /// Any non-success, non-`200`/`206` status from an HTTP request.
    #[error("unexpected HTTP status: {0}")]
    HttpStatus(u16),

    /// A `HEAD`/size-probe request did not carry a `Content-Length` header.
    #[error("server did not return a Content-Length header")]
    MissingContentLength,

    /// The `Content-Length` header was present but not a valid integer.
    #[error("Content-Length header was not a valid integer: {0:?}")]
    MalformedContentLength(String),

    /// The backwards EOCD scan exceeded the maximum comment size (64 KiB)
    /// without finding a valid signature.
    #[error("End Of Central Directory record not found within 64 KiB of archive tail")]
    EocdNotFound,

    /// EOCD or ZIP64 EOCD fields failed the archive-geometry invariants
    /// (offsets/sizes must stay within the archive bounds).
    #[error("trailer geometry is inconsistent with the archive size")]
    InvalidTrailer,

    /// The ZIP64 End Of Central Directory Locator had a bad signature or
    /// was truncated.
    #[error("invalid ZIP64 End Of Central Directory Locator")]
    InvalidZip64Locator,

    /// The ZIP64 End Of Central Directory record had a bad signature or was
    /// truncated.
    #[error("invalid ZIP64 End Of Central Directory record")]
    InvalidZip64Eocd,

    /// The Local File Header re-read during extraction had a bad signature.
    #[error("invalid Local File Header at offset {0}")]
    InvalidLocalHeader(u64),

    /// Operation attempted after [`Browser::close`](crate::Browser::close).
    #[error("browser has been closed")]
    BrowserClosed,

    /// The DEFLATE stream could not be decoded.
    #[error("failed to decompress member: {0}")]
    DecompressionFailed(std::io::Error),

    /// A trailer, Central Directory, or Local File Header record ended
    /// before a declared field could be fully read (e.g. a name or extra
    /// field length that overruns the fetched blob).
    #[error("truncated record: {0}")]
    RecordTruncated(#[from] std::io::Error),

    /// The member's Central Directory compression method is neither STORED
    /// (0) nor DEFLATE (8). Treating an unknown method as STORED would hand
    /// the caller raw compressed bytes with no indication anything is
    /// amiss, so this fails explicitly instead.
    #[error("unsupported compression method: {0}")]
    UnsupportedCompressionMethod(u16),

    /// Returned by `get_verified` when the decompressed bytes do not match
    /// the CRC-32 recorded in the Central Directory.
    #[error("CRC-32 mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// A transport-level failure (DNS, connection reset, TLS, timeout) below
    /// the level of a classifiable HTTP status.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The archive is truncated: a read expected more bytes than the server
    /// returned for a given range.
    #[error("short read: expected {expected} bytes at offset {offset}, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, RemoteZipError>;
