//! C4 — CentralDirectoryParser: reads the Central Directory blob into an
//! ordered collection of [`Entry`] records, resolving ZIP64 extra fields
//! (§4.4).

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use crate::error::Result;
use crate::transport::RangeFetcher;

use super::structures::{CDFH_FIXED_SIZE, CDFH_SIGNATURE, CompressionMethod, Entry};
use super::trailer::CentralDirectoryLocation;

/// ZIP64 extended-information extra-field header id (§4.4).
const ZIP64_EXTRA_HEADER_ID: u16 = 0x0001;

/// Fetches the Central Directory as a single byte blob and parses it into
/// an ordered list of [`Entry`] records.
pub struct CentralDirectoryParser<'a> {
    fetcher: &'a RangeFetcher,
}

impl<'a> CentralDirectoryParser<'a> {
    pub fn new(fetcher: &'a RangeFetcher) -> Self {
        Self { fetcher }
    }

    /// Read and parse the whole Central Directory in a single range request.
    pub async fn parse(&self, location: &CentralDirectoryLocation) -> Result<Vec<Entry>> {
        if location.size == 0 {
            return Ok(Vec::new());
        }

        let cd_data = self
            .fetcher
            .fetch(location.offset, location.offset + location.size - 1)
            .await?;

        let mut cursor = Cursor::new(cd_data.as_ref());
        let mut entries = Vec::with_capacity(location.total_entries as usize);

        // A signature mismatch ends iteration rather than erroring: trailing
        // padding after the last valid record is tolerated (§4.4).
        while (cursor.position() as usize) + 4 <= cd_data.len() {
            match Self::parse_one(&mut cursor) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => break,
                Err(e) => return Err(e),
            }
        }

        Ok(entries)
    }

    /// Parse a single Central Directory File Header from the cursor.
    /// Returns `Ok(None)` on signature mismatch (end of directory).
    fn parse_one(cursor: &mut Cursor<&[u8]>) -> Result<Option<Entry>> {
        let start = cursor.position();
        let mut sig = [0u8; 4];
        cursor.read_exact(&mut sig)?;
        if sig != CDFH_SIGNATURE {
            cursor.set_position(start);
            return Ok(None);
        }

        let _version_made_by = cursor.read_u16::<LittleEndian>()?;
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let _flags = cursor.read_u16::<LittleEndian>()?;
        let compression_method = cursor.read_u16::<LittleEndian>()?;
        let last_mod_time = cursor.read_u16::<LittleEndian>()?;
        let last_mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let file_name_length = cursor.read_u16::<LittleEndian>()?;
        let extra_field_length = cursor.read_u16::<LittleEndian>()?;
        let file_comment_length = cursor.read_u16::<LittleEndian>()?;
        let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
        let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
        let external_attrs = cursor.read_u32::<LittleEndian>()?;
        let mut local_header_offset = cursor.read_u32::<LittleEndian>()? as u64;

        debug_assert_eq!(cursor.position() - start, CDFH_FIXED_SIZE as u64);

        let mut name_bytes = vec![0u8; file_name_length as usize];
        cursor.read_exact(&mut name_bytes)?;
        let name = String::from_utf8_lossy(&name_bytes).into_owned();

        let is_directory = name.ends_with('/') || (external_attrs & 0x10) != 0;

        Self::resolve_zip64(
            cursor,
            extra_field_length,
            &mut uncompressed_size,
            &mut compressed_size,
            &mut local_header_offset,
        )?;

        // Skip the file comment; this implementation does not expose it.
        let mut comment = vec![0u8; file_comment_length as usize];
        cursor.read_exact(&mut comment)?;

        Ok(Some(Entry {
            name,
            local_header_offset,
            compressed_size,
            uncompressed_size,
            compression_method: CompressionMethod::from_u16(compression_method),
            crc32,
            is_directory,
            file_name_length,
            extra_field_length,
            last_mod_time,
            last_mod_date,
        }))
    }

    /// Walk the extra-field TLV blob looking for the ZIP64 extended
    /// information record (header id `0x0001`), replacing sentinel
    /// (`0xFFFFFFFF`) fields in order: uncompressed size, compressed size,
    /// local header offset — each consuming 8 bytes only if the
    /// corresponding field held the sentinel (§4.4).
    fn resolve_zip64(
        cursor: &mut Cursor<&[u8]>,
        extra_field_length: u16,
        uncompressed_size: &mut u64,
        compressed_size: &mut u64,
        local_header_offset: &mut u64,
    ) -> Result<()> {
        let extra_start = cursor.position();
        let extra_end = extra_start + extra_field_length as u64;

        while cursor.position() + 4 <= extra_end {
            let header_id = cursor.read_u16::<LittleEndian>()?;
            let data_size = cursor.read_u16::<LittleEndian>()?;
            let data_end = (cursor.position() + data_size as u64).min(extra_end);

            if header_id == ZIP64_EXTRA_HEADER_ID {
                if *uncompressed_size == 0xFFFF_FFFF && cursor.position() + 8 <= data_end {
                    *uncompressed_size = cursor.read_u64::<LittleEndian>()?;
                }
                if *compressed_size == 0xFFFF_FFFF && cursor.position() + 8 <= data_end {
                    *compressed_size = cursor.read_u64::<LittleEndian>()?;
                }
                if *local_header_offset == 0xFFFF_FFFF && cursor.position() + 8 <= data_end {
                    *local_header_offset = cursor.read_u64::<LittleEndian>()?;
                }
            }
            cursor.set_position(data_end);
        }

        cursor.set_position(extra_end);
        Ok(())
    }
}
