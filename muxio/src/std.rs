// SPDX-License-Identifier: MIT

use log::debug;
use std::io::{Error, ErrorKind, Read, Seek, SeekFrom, Write};

use crate::{BlockDevice, BlockDeviceExt, DEFAULT_SECTOR_SIZE, DiskError, DiskResult, DiskStatus};

/// Disk image backed by any `Read + Write + Seek` stream.
///
/// Stands in for SD and USB media on a host: the image file is the card.
#[derive(Debug)]
pub struct StdDisk<'a, T: Read + Write + Seek> {
    io: &'a mut T,
    sector_size: usize,
    sector_count: u64,
    read_only: bool,
    initialized: bool,
}

impl<'a, T: Read + Write + Seek> StdDisk<'a, T> {
    /// Sector count is taken from the current stream length.
    #[inline]
    pub fn new(io: &'a mut T) -> DiskResult<Self> {
        Self::with_sector_size(io, DEFAULT_SECTOR_SIZE)
    }

    pub fn with_sector_size(io: &'a mut T, sector_size: usize) -> DiskResult<Self> {
        if sector_size == 0 {
            return Err(DiskError::Invalid("sector size must be non-zero"));
        }
        let len = io.seek(SeekFrom::End(0))?;
        Ok(Self {
            io,
            sector_size,
            sector_count: len / sector_size as u64,
            read_only: false,
            initialized: false,
        })
    }

    /// Reports `PROTECT` and rejects writes, like a card with its lock tab set.
    #[inline]
    pub fn read_only(mut self, yes: bool) -> Self {
        self.read_only = yes;
        self
    }

    #[inline]
    fn seek_to(&mut self, lba: u64) -> DiskResult {
        let off = lba
            .checked_mul(self.sector_size as u64)
            .ok_or(DiskError::OutOfBounds)?;
        self.io.seek(SeekFrom::Start(off))?;
        Ok(())
    }
}

impl<'a, T: Read + Write + Seek> BlockDevice for StdDisk<'a, T> {
    #[inline]
    fn sector_size(&self) -> usize {
        self.sector_size
    }

    #[inline]
    fn sector_count(&self) -> u64 {
        self.sector_count
    }

    fn initialize(&mut self) -> DiskResult<DiskStatus> {
        self.initialized = true;
        Ok(self.status())
    }

    fn status(&self) -> DiskStatus {
        let mut status = DiskStatus::empty();
        if !self.initialized {
            status |= DiskStatus::NOINIT;
        }
        if self.read_only {
            status |= DiskStatus::PROTECT;
        }
        status
    }

    fn read_sectors(&mut self, lba: u64, buf: &mut [u8]) -> DiskResult {
        self.check_range(lba, buf.len())?;
        self.seek_to(lba)?;
        self.io.read_exact(buf)?;
        Ok(())
    }

    fn write_sectors(&mut self, lba: u64, buf: &[u8]) -> DiskResult {
        if self.read_only {
            return Err(DiskError::WriteProtected);
        }
        self.check_range(lba, buf.len())?;
        self.seek_to(lba)?;
        self.io.write_all(buf)?;
        Ok(())
    }

    fn flush(&mut self) -> DiskResult {
        self.io.flush()?;
        Ok(())
    }
}

impl From<Error> for DiskError {
    #[cold]
    #[inline(never)]
    fn from(e: Error) -> Self {
        match e.kind() {
            ErrorKind::UnexpectedEof => DiskError::OutOfBounds,
            ErrorKind::PermissionDenied => DiskError::WriteProtected,
            ErrorKind::Unsupported => DiskError::Unsupported,
            ErrorKind::NotFound => DiskError::NoDisk,
            _ => {
                debug!("image io error: {e}");
                DiskError::Other("io error")
            }
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod test {
    use super::*;
    use crate::prelude::*;
    use tempfile::tempfile;

    #[test]
    fn test_rw() {
        let mut file = tempfile().unwrap();
        file.set_len(4096).unwrap();
        let mut disk = StdDisk::new(&mut file).unwrap();
        assert_eq!(disk.sector_count(), 8);

        disk.write_sector(3, &[0x5Au8; 512]).unwrap();

        let mut output = [0u8; 512];
        disk.read_sector(3, &mut output).unwrap();
        assert_eq!(output, [0x5Au8; 512]);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut file = tempfile().unwrap();
        file.set_len(1024).unwrap();
        let mut disk = StdDisk::new(&mut file).unwrap();

        let mut out = [0u8; 512];
        assert_eq!(disk.read_sectors(2, &mut out), Err(DiskError::OutOfBounds));
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let mut file = tempfile().unwrap();
        file.set_len(1024).unwrap();
        let mut disk = StdDisk::new(&mut file).unwrap().read_only(true);
        disk.initialize().unwrap();

        assert!(disk.status().contains(DiskStatus::PROTECT));
        assert_eq!(
            disk.write_sectors(0, &[0u8; 512]),
            Err(DiskError::WriteProtected)
        );
    }

    #[test]
    fn test_io_error_mapping() {
        let other = Error::new(ErrorKind::Interrupted, "flaky cable");
        assert_eq!(DiskError::from(other), DiskError::Other("io error"));
        assert_eq!(
            DiskError::from(Error::from(ErrorKind::PermissionDenied)),
            DiskError::WriteProtected
        );
    }

    #[test]
    fn test_cursor_backend() {
        let mut cursor = std::io::Cursor::new(vec![0u8; 2048]);
        let mut disk = StdDisk::with_sector_size(&mut cursor, 1024).unwrap();
        assert_eq!(disk.sector_count(), 2);

        disk.write_sectors(1, &[7u8; 1024]).unwrap();
        assert_eq!(cursor.get_ref()[1024], 7);
    }
}
