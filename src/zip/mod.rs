//! ZIP trailer discovery and member extraction (§2-§4).
//!
//! The module is organized leaf-first, mirroring the component table in
//! §2 of the design:
//!
//! - [`structures`]: on-disk ZIP format records (EOCD, ZIP64 EOCD, entries).
//! - [`trailer`]: C3, locating the EOCD and following the ZIP64 chain.
//! - [`central_directory`]: C4, parsing Central Directory records.
//! - [`index`]: C5, the immutable name → Entry map.
//! - [`extractor`]: C6, Local Header re-read, range computation, decompression.
//!
//! None of these suspend except through the [`crate::transport::RangeFetcher`]
//! they're handed; there is exactly one HTTP request per fetch.

mod central_directory;
mod extractor;
mod index;
mod structures;
mod trailer;

pub use central_directory::CentralDirectoryParser;
pub use extractor::{MemberBody, MemberExtractor};
pub use index::Index;
pub use structures::{CompressionMethod, Entry};
pub use trailer::{CentralDirectoryLocation, TrailerLocator};
