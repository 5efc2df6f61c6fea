//! C3 — TrailerLocator: finds the EOCD and, when present, follows the ZIP64
//! locator chain (§4.3).

use crate::error::{RemoteZipError, Result};
use crate::transport::RangeFetcher;

use super::structures::{EndOfCentralDirectory, Zip64Eocd, Zip64EocdLocator};

/// Initial suffix-window size used for the backwards EOCD scan.
const INITIAL_WINDOW: u64 = 1024;
/// Maximum ZIP comment size is 65535 bytes (a `u16` length field), so the
/// widest possible EOCD-containing suffix is the fixed record plus a
/// maximal comment.
const MAX_WINDOW: u64 = EndOfCentralDirectory::SIZE as u64 + 65535;

/// The resolved Central Directory location, after following the ZIP64 chain
/// if needed.
pub struct CentralDirectoryLocation {
    pub offset: u64,
    pub size: u64,
    pub total_entries: u64,
}

/// Locates the End Of Central Directory record by scanning a growing suffix
/// window of the archive backwards, then follows the ZIP64 locator chain
/// when the regular EOCD carries sentinel values.
pub struct TrailerLocator<'a> {
    fetcher: &'a RangeFetcher,
    archive_size: u64,
}

impl<'a> TrailerLocator<'a> {
    pub fn new(fetcher: &'a RangeFetcher, archive_size: u64) -> Self {
        Self {
            fetcher,
            archive_size,
        }
    }

    /// Run the full trailer discovery pipeline: find the EOCD, follow the
    /// ZIP64 chain if needed, and validate the resulting Central Directory
    /// geometry against the archive size.
    pub async fn locate(&self) -> Result<CentralDirectoryLocation> {
        let (eocd, eocd_offset) = self.find_eocd().await?;

        let location = if eocd.is_zip64() {
            let eocd64 = self.read_zip64_eocd(eocd_offset).await?;
            CentralDirectoryLocation {
                offset: eocd64.cd_offset,
                size: eocd64.cd_size,
                total_entries: eocd64.total_entries,
            }
        } else {
            CentralDirectoryLocation {
                offset: eocd.cd_offset as u64,
                size: eocd.cd_size as u64,
                total_entries: eocd.total_entries as u64,
            }
        };

        self.validate_geometry(&location)?;
        Ok(location)
    }

    fn validate_geometry(&self, location: &CentralDirectoryLocation) -> Result<()> {
        let in_bounds = location.offset < self.archive_size
            && location.size <= self.archive_size
            && location
                .offset
                .checked_add(location.size)
                .is_some_and(|end| end <= self.archive_size);
        if in_bounds {
            Ok(())
        } else {
            Err(RemoteZipError::InvalidTrailer)
        }
    }

    /// Scan a growing suffix window of the archive backwards for the EOCD
    /// signature (§4.3).
    async fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        let mut window = INITIAL_WINDOW.min(self.archive_size);

        loop {
            let window_start = self.archive_size - window;
            let buf = self
                .fetcher
                .fetch(window_start, self.archive_size - 1)
                .await?;

            if let Some(found) = Self::scan_window(&buf) {
                let (offset_in_buf, eocd) = found;
                return Ok((eocd, window_start + offset_in_buf as u64));
            }

            if window >= self.archive_size || window >= MAX_WINDOW {
                return Err(RemoteZipError::EocdNotFound);
            }
            window = (window * 2).min(self.archive_size);
        }
    }

    /// Scan a single buffer backwards for a signature whose declared comment
    /// length reaches exactly to the end of the buffer — the only structural
    /// property that distinguishes the true EOCD from a signature-looking
    /// byte pattern an attacker (or an unlucky comment) placed earlier.
    fn scan_window(buf: &[u8]) -> Option<(usize, EndOfCentralDirectory)> {
        if buf.len() < EndOfCentralDirectory::SIZE {
            return None;
        }

        for i in (0..=buf.len() - 4).rev() {
            if buf[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
                continue;
            }
            if i + EndOfCentralDirectory::SIZE > buf.len() {
                // Signature matched too close to the end to hold a full
                // record; not acceptable even after widening the window,
                // since widening only grows the window from the front.
                continue;
            }
            let comment_len =
                u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;
            if i + EndOfCentralDirectory::SIZE + comment_len != buf.len() {
                // Comment length doesn't reach exactly to the end of the
                // buffer: this is not the real EOCD, keep scanning earlier
                // in the buffer for the structurally correct one.
                continue;
            }
            if let Ok(eocd) = EndOfCentralDirectory::from_bytes(&buf[i..i + EndOfCentralDirectory::SIZE]) {
                return Some((i, eocd));
            }
        }
        None
    }

    /// Follow the ZIP64 EOCD Locator (immediately preceding the regular
    /// EOCD) to the ZIP64 EOCD record itself (§4.3 steps 1-2).
    async fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<Zip64Eocd> {
        if eocd_offset < Zip64EocdLocator::SIZE as u64 {
            return Err(RemoteZipError::InvalidZip64Locator);
        }
        let locator_offset = eocd_offset - Zip64EocdLocator::SIZE as u64;
        let locator_buf = self
            .fetcher
            .fetch(locator_offset, eocd_offset - 1)
            .await?;
        let locator = Zip64EocdLocator::from_bytes(&locator_buf)?;

        if locator.eocd64_offset >= self.archive_size {
            return Err(RemoteZipError::InvalidZip64Eocd);
        }
        let eocd64_end =
            (locator.eocd64_offset + Zip64Eocd::MIN_SIZE as u64 - 1).min(self.archive_size - 1);
        let eocd64_buf = self
            .fetcher
            .fetch(locator.eocd64_offset, eocd64_end)
            .await?;

        Zip64Eocd::from_bytes(&eocd64_buf)
    }
}
