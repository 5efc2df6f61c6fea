//! C6 — MemberExtractor: re-reads the Local File Header, computes the
//! payload range, and produces a lazy decompressed byte sequence (§4.6).

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use bytes::Bytes;
use flate2::read::DeflateDecoder;

use crate::error::{RemoteZipError, Result};
use crate::transport::RangeFetcher;

use super::structures::{CompressionMethod, Entry, LFH_SIGNATURE, LFH_SIZE};

/// The sentinel value ZIP uses in 32-bit size/offset fields to mean "see the
/// ZIP64 extra field" or, in a Local File Header, "see the data descriptor".
const SENTINEL_32: u32 = 0xFFFF_FFFF;

/// A member's payload, fetched but not necessarily decompressed yet.
///
/// For `Stored` members the fetched bytes already are the result. For
/// `Deflate` members, decompression is deferred to [`MemberBody::into_vec`]
/// or [`MemberBody::reader`] — satisfying the "lazy decompressed byte
/// sequence" contract (§4.6, §9) without forcing every caller to pay the
/// DEFLATE cost up front, e.g. a caller that only wants to check `len_hint`.
pub enum MemberBody {
    Stored(Bytes),
    Deflate { compressed: Bytes, uncompressed_size: u64 },
}

impl MemberBody {
    /// The expected length of the fully decompressed payload.
    pub fn len_hint(&self) -> u64 {
        match self {
            MemberBody::Stored(bytes) => bytes.len() as u64,
            MemberBody::Deflate {
                uncompressed_size, ..
            } => *uncompressed_size,
        }
    }

    /// A `Read` over the decompressed bytes, decompressing on the fly for
    /// `Deflate` members.
    pub fn reader(&self) -> Box<dyn Read + '_> {
        match self {
            MemberBody::Stored(bytes) => Box::new(&bytes[..]),
            MemberBody::Deflate { compressed, .. } => {
                Box::new(DeflateDecoder::new(&compressed[..]))
            }
        }
    }

    /// Materialize the full decompressed payload into memory.
    pub fn into_vec(self) -> Result<Vec<u8>> {
        match self {
            MemberBody::Stored(bytes) => Ok(bytes.to_vec()),
            MemberBody::Deflate {
                compressed,
                uncompressed_size,
            } => {
                let mut decoder = DeflateDecoder::new(&compressed[..]);
                let mut out = Vec::with_capacity(uncompressed_size as usize);
                decoder
                    .read_to_end(&mut out)
                    .map_err(RemoteZipError::DecompressionFailed)?;
                Ok(out)
            }
        }
    }
}

/// Fields read back from the Local File Header (§4.6 step 1).
struct LocalFileHeader {
    compressed_size: u32,
    uncompressed_size: u32,
    file_name_length: u16,
    extra_field_length: u16,
}

impl LocalFileHeader {
    fn parse(buf: &[u8], offset: u64) -> Result<Self> {
        if buf.len() < LFH_SIZE || buf[0..4] != LFH_SIGNATURE {
            return Err(RemoteZipError::InvalidLocalHeader(offset));
        }
        let mut cursor = std::io::Cursor::new(&buf[4..]);
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let _flags = cursor.read_u16::<LittleEndian>()?;
        let _method = cursor.read_u16::<LittleEndian>()?;
        let _mod_time = cursor.read_u16::<LittleEndian>()?;
        let _mod_date = cursor.read_u16::<LittleEndian>()?;
        let _crc32 = cursor.read_u32::<LittleEndian>()?;
        let compressed_size = cursor.read_u32::<LittleEndian>()?;
        let uncompressed_size = cursor.read_u32::<LittleEndian>()?;
        let file_name_length = cursor.read_u16::<LittleEndian>()?;
        let extra_field_length = cursor.read_u16::<LittleEndian>()?;
        Ok(Self {
            compressed_size,
            uncompressed_size,
            file_name_length,
            extra_field_length,
        })
    }
}

/// Extracts a single member, given its Central Directory [`Entry`].
pub struct MemberExtractor<'a> {
    fetcher: &'a RangeFetcher,
}

impl<'a> MemberExtractor<'a> {
    pub fn new(fetcher: &'a RangeFetcher) -> Self {
        Self { fetcher }
    }

    /// Extract `entry`'s payload. Directory entries are rejected by the
    /// caller before this is invoked (§4.6); this method assumes a non-
    /// directory entry.
    pub async fn extract(&self, entry: &Entry) -> Result<MemberBody> {
        let lfh_buf = self
            .fetcher
            .fetch(
                entry.local_header_offset,
                entry.local_header_offset + LFH_SIZE as u64 - 1,
            )
            .await?;
        let lfh = LocalFileHeader::parse(&lfh_buf, entry.local_header_offset)?;

        // The Local Header's own sizes are trusted unless they carry the
        // ZIP64 sentinel or are zero (the streaming/data-descriptor case,
        // §4.6 step 2, §9 Open Question — zero-byte members hit this same
        // branch and are handled identically, by design).
        let compressed_size = if lfh.compressed_size == SENTINEL_32
            || lfh.uncompressed_size == SENTINEL_32
            || lfh.compressed_size == 0
            || lfh.uncompressed_size == 0
        {
            entry.compressed_size
        } else {
            lfh.compressed_size as u64
        };

        let payload_start = entry.local_header_offset
            + LFH_SIZE as u64
            + lfh.file_name_length as u64
            + lfh.extra_field_length as u64;

        let payload = if compressed_size == 0 {
            Bytes::new()
        } else {
            let payload_end = payload_start + compressed_size - 1;
            self.fetcher.fetch(payload_start, payload_end).await?
        };

        match entry.compression_method {
            CompressionMethod::Stored => Ok(MemberBody::Stored(payload)),
            CompressionMethod::Deflate => Ok(MemberBody::Deflate {
                compressed: payload,
                uncompressed_size: entry.uncompressed_size,
            }),
            CompressionMethod::Unknown(method) => {
                Err(RemoteZipError::UnsupportedCompressionMethod(method))
            }
        }
    }
}
