// SPDX-License-Identifier: MIT

use crate::{BlockDevice, BlockDeviceExt, DEFAULT_SECTOR_SIZE, DiskResult, DiskStatus};

/// RAM disk over a borrowed byte slice.
///
/// Backs the SDRAM volume: contents are volatile, so the volume must be
/// formatted after every power-up before it can be mounted.
#[derive(Debug)]
pub struct MemDisk<'a> {
    buffer: &'a mut [u8],
    sector_size: usize,
    initialized: bool,
}

impl<'a> MemDisk<'a> {
    #[inline]
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self::with_sector_size(buffer, DEFAULT_SECTOR_SIZE)
    }

    /// Trailing bytes that do not form a whole sector are not addressable.
    #[inline]
    pub fn with_sector_size(buffer: &'a mut [u8], sector_size: usize) -> Self {
        Self {
            buffer,
            sector_size,
            initialized: false,
        }
    }

    #[inline]
    fn byte_range(&self, lba: u64, len: usize) -> DiskResult<core::ops::Range<usize>> {
        self.check_range(lba, len)?;
        let start = lba as usize * self.sector_size;
        Ok(start..start + len)
    }
}

impl<'a> BlockDevice for MemDisk<'a> {
    #[inline]
    fn sector_size(&self) -> usize {
        self.sector_size
    }

    #[inline]
    fn sector_count(&self) -> u64 {
        if self.sector_size == 0 {
            return 0;
        }
        (self.buffer.len() / self.sector_size) as u64
    }

    #[inline]
    fn initialize(&mut self) -> DiskResult<DiskStatus> {
        self.initialized = true;
        Ok(self.status())
    }

    #[inline]
    fn status(&self) -> DiskStatus {
        if self.initialized {
            DiskStatus::empty()
        } else {
            DiskStatus::NOINIT
        }
    }

    #[inline(always)]
    fn read_sectors(&mut self, lba: u64, buf: &mut [u8]) -> DiskResult {
        let range = self.byte_range(lba, buf.len())?;
        buf.copy_from_slice(&self.buffer[range]);
        Ok(())
    }

    #[inline(always)]
    fn write_sectors(&mut self, lba: u64, buf: &[u8]) -> DiskResult {
        let range = self.byte_range(lba, buf.len())?;
        self.buffer[range].copy_from_slice(buf);
        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> DiskResult {
        Ok(())
    }
}

#[cfg(all(test, feature = "std"))]
mod test {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_rw() {
        let mut buf = [0u8; 2048];
        let mut disk = MemDisk::new(&mut buf);
        assert_eq!(disk.sector_count(), 4);

        let input = [0xA5u8; 512];
        disk.write_sector(2, &input).unwrap();

        let mut output = [0u8; 512];
        disk.read_sector(2, &mut output).unwrap();
        assert_eq!(input, output);
        assert_eq!(&buf[1024..1536], &[0xA5u8; 512][..]);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut buf = [0u8; 1024];
        let mut disk = MemDisk::new(&mut buf);
        let mut out = [0u8; 1024];

        assert_eq!(disk.read_sectors(1, &mut out), Err(DiskError::OutOfBounds));
        assert_eq!(
            disk.read_sectors(u64::MAX, &mut out[..512]),
            Err(DiskError::OutOfBounds)
        );
    }

    #[test]
    fn test_partial_sector_rejected() {
        let mut buf = [0u8; 1024];
        let mut disk = MemDisk::new(&mut buf);
        assert!(matches!(
            disk.write_sectors(0, &[0u8; 100]),
            Err(DiskError::Invalid(_))
        ));
    }

    #[test]
    fn test_initialize_clears_noinit() {
        let mut buf = [0u8; 512];
        let mut disk = MemDisk::new(&mut buf);
        assert_eq!(disk.status(), DiskStatus::NOINIT);
        assert_eq!(disk.initialize().unwrap(), DiskStatus::empty());
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut buf = [0u8; 1000];
        let disk = MemDisk::new(&mut buf);
        assert_eq!(disk.sector_count(), 1);
        assert_eq!(disk.capacity_bytes().unwrap(), 512);
    }
}
