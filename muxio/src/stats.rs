// SPDX-License-Identifier: MIT

use crate::{BlockDevice, DiskResult, DiskStatus};

/// Simple counters, no_std friendly.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct IoStats {
    pub reads: u64,
    pub read_bytes: u64,
    pub writes: u64,
    pub write_bytes: u64,
    pub flushes: u64,
    pub initializations: u64,

    // Useful sizes to diagnose granularity
    pub max_read: u64,
    pub max_write: u64,
}

impl IoStats {
    #[inline]
    pub fn reset(&mut self) {
        *self = IoStats::default();
    }

    #[inline]
    pub fn total_bytes(&self) -> u64 {
        self.read_bytes + self.write_bytes
    }
}

/// Transparent instrumentation wrapper.
pub struct IOCounter<'a, D: BlockDevice + ?Sized> {
    inner: &'a mut D,
    pub stats: IoStats,
}

impl<'a, D: BlockDevice + ?Sized> IOCounter<'a, D> {
    #[inline]
    pub fn new(inner: &'a mut D) -> Self {
        Self {
            inner,
            stats: IoStats::default(),
        }
    }

    #[inline]
    pub fn snapshot(&self) -> IoStats {
        self.stats
    }

    #[inline]
    pub fn into_inner(self) -> &'a mut D {
        self.inner
    }
}

impl<'a, D: BlockDevice + ?Sized> BlockDevice for IOCounter<'a, D> {
    #[inline]
    fn sector_size(&self) -> usize {
        self.inner.sector_size()
    }

    #[inline]
    fn sector_count(&self) -> u64 {
        self.inner.sector_count()
    }

    #[inline]
    fn initialize(&mut self) -> DiskResult<DiskStatus> {
        self.stats.initializations += 1;
        self.inner.initialize()
    }

    #[inline]
    fn status(&self) -> DiskStatus {
        self.inner.status()
    }

    #[inline]
    fn read_sectors(&mut self, lba: u64, buf: &mut [u8]) -> DiskResult {
        self.stats.reads += 1;
        self.stats.read_bytes += buf.len() as u64;
        self.stats.max_read = self.stats.max_read.max(buf.len() as u64);

        self.inner.read_sectors(lba, buf)
    }

    #[inline]
    fn write_sectors(&mut self, lba: u64, buf: &[u8]) -> DiskResult {
        self.stats.writes += 1;
        self.stats.write_bytes += buf.len() as u64;
        self.stats.max_write = self.stats.max_write.max(buf.len() as u64);

        self.inner.write_sectors(lba, buf)
    }

    #[inline]
    fn flush(&mut self) -> DiskResult {
        self.stats.flushes += 1;
        self.inner.flush()
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_counts_and_reset() {
        let mut buf = [0u8; 2048];
        let mut disk = MemDisk::new(&mut buf);
        let mut io = IOCounter::new(&mut disk);

        io.write_sectors(0, &[1u8; 1024]).unwrap();
        let mut out = [0u8; 512];
        io.read_sector(1, &mut out).unwrap();
        io.flush().unwrap();

        let stats = io.snapshot();
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.reads, 1);
        assert_eq!(stats.total_bytes(), 1536);
        assert_eq!(stats.max_write, 1024);
        assert_eq!(stats.flushes, 1);

        io.stats.reset();
        assert_eq!(io.snapshot(), IoStats::default());
    }
}
