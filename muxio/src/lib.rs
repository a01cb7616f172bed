// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod errors;
pub mod mux;
pub mod stats;
pub mod status;

// Backend modules
#[cfg(feature = "mem")]
mod mem;

#[cfg(feature = "std")]
mod std;

#[cfg(feature = "std")]
mod stream;

// Prelude re-exports (central entrypoint)
pub mod prelude {
    pub use super::BlockDevice;
    pub use super::BlockDeviceExt;
    pub use super::errors::*;
    pub use super::mux::{DiskMux, DriveHandle, DRIVE_COUNT};
    pub use super::stats::*;
    pub use super::status::DiskStatus;

    #[cfg(feature = "mem")]
    pub use super::mem::MemDisk;

    #[cfg(feature = "std")]
    pub use super::std::StdDisk;

    #[cfg(feature = "std")]
    pub use super::stream::DiskStream;
}

use errors::*;
use status::DiskStatus;

// Constants

/// Sector size every shipped driver uses.
pub const DEFAULT_SECTOR_SIZE: usize = 512;

/// Largest sector size a driver may report.
/// Bounds the stack bounce buffers used by the byte-level helpers.
pub const MAX_SECTOR_SIZE: usize = 4096;

// Traits

/// Sector-addressed block device.
///
/// One implementation per physical medium (SD over SPI or SDIO, USB mass
/// storage, SDRAM). `buf.len()` passed to `read_sectors`/`write_sectors` must be
/// a whole number of sectors.
pub trait BlockDevice {
    /// Bytes per sector.
    fn sector_size(&self) -> usize {
        DEFAULT_SECTOR_SIZE
    }

    /// Number of addressable sectors.
    fn sector_count(&self) -> u64;

    /// Brings the medium up and returns the resulting status.
    fn initialize(&mut self) -> DiskResult<DiskStatus>;

    /// Current status. Empty means ready.
    fn status(&self) -> DiskStatus;

    /// Reads `buf.len() / sector_size()` sectors starting at `lba`.
    fn read_sectors(&mut self, lba: u64, buf: &mut [u8]) -> DiskResult;

    /// Writes `buf.len() / sector_size()` sectors starting at `lba`.
    fn write_sectors(&mut self, lba: u64, buf: &[u8]) -> DiskResult;

    /// Completes any pending write (may be a no-op).
    fn flush(&mut self) -> DiskResult;
}

impl<T: BlockDevice + ?Sized> BlockDevice for &mut T {
    #[inline]
    fn sector_size(&self) -> usize {
        (**self).sector_size()
    }

    #[inline]
    fn sector_count(&self) -> u64 {
        (**self).sector_count()
    }

    #[inline]
    fn initialize(&mut self) -> DiskResult<DiskStatus> {
        (**self).initialize()
    }

    #[inline]
    fn status(&self) -> DiskStatus {
        (**self).status()
    }

    #[inline]
    fn read_sectors(&mut self, lba: u64, buf: &mut [u8]) -> DiskResult {
        (**self).read_sectors(lba, buf)
    }

    #[inline]
    fn write_sectors(&mut self, lba: u64, buf: &[u8]) -> DiskResult {
        (**self).write_sectors(lba, buf)
    }

    #[inline]
    fn flush(&mut self) -> DiskResult {
        (**self).flush()
    }
}

/// Extension helpers for BlockDevice.
///
/// - single sector reads/writes
/// - sector range validation shared by drivers
/// - capacity in bytes
pub trait BlockDeviceExt: BlockDevice {
    /// Reads exactly one sector into the front of `buf`.
    #[inline]
    fn read_sector(&mut self, lba: u64, buf: &mut [u8]) -> DiskResult {
        let ss = self.sector_size();
        if buf.len() < ss {
            return Err(DiskError::Invalid("read_sector: buffer smaller than a sector"));
        }
        self.read_sectors(lba, &mut buf[..ss])
    }

    /// Writes exactly one sector from the front of `buf`.
    #[inline]
    fn write_sector(&mut self, lba: u64, buf: &[u8]) -> DiskResult {
        let ss = self.sector_size();
        if buf.len() < ss {
            return Err(DiskError::Invalid("write_sector: buffer smaller than a sector"));
        }
        self.write_sectors(lba, &buf[..ss])
    }

    /// Total size in bytes (with overflow-check).
    #[inline]
    fn capacity_bytes(&self) -> DiskResult<u64> {
        self.sector_count()
            .checked_mul(self.sector_size() as u64)
            .ok_or(DiskError::Other("capacity overflow"))
    }

    /// Checks that `len` bytes form whole sectors and that the run starting at
    /// `lba` fits the device. Returns the number of sectors.
    #[inline]
    fn check_range(&self, lba: u64, len: usize) -> DiskResult<u64> {
        let ss = self.sector_size();
        if ss == 0 || !len.is_multiple_of(ss) {
            return Err(DiskError::Invalid("length is not a multiple of the sector size"));
        }
        let count = (len / ss) as u64;
        let end = lba.checked_add(count).ok_or(DiskError::OutOfBounds)?;
        if end > self.sector_count() {
            return Err(DiskError::OutOfBounds);
        }
        Ok(count)
    }
}

impl<T: BlockDevice + ?Sized> BlockDeviceExt for T {}
