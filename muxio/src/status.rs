// SPDX-License-Identifier: MIT

use bitflags::bitflags;

bitflags! {
    /// Drive status bits, as reported by `disk_status`-style driver calls.
    ///
    /// An empty set means the drive is initialized, has a medium and accepts writes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DiskStatus: u8 {
        /// Drive not initialized.
        const NOINIT  = 0x01;
        /// No medium in the drive.
        const NODISK  = 0x02;
        /// Medium is write protected.
        const PROTECT = 0x04;
    }
}

impl DiskStatus {
    #[inline]
    pub fn is_ready(&self) -> bool {
        !self.intersects(DiskStatus::NOINIT | DiskStatus::NODISK)
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.is_ready() && !self.contains(DiskStatus::PROTECT)
    }
}
