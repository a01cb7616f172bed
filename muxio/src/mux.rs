// SPDX-License-Identifier: MIT

//! Drive multiplexer.
//!
//! Routes every sector request to the driver attached at a drive index, the
//! way a `diskio` layer dispatches on `pdrv`. Which volume owns which index is
//! decided one level up; this layer only enforces presence, readiness and
//! write protection.

use log::trace;

use crate::{BlockDevice, DiskError, DiskResult, DiskStatus};

/// Number of drive slots (SD, USB, SDRAM, SPI flash).
pub const DRIVE_COUNT: usize = 4;

pub struct DiskMux<'d> {
    drives: [Option<&'d mut dyn BlockDevice>; DRIVE_COUNT],
}

impl<'d> Default for DiskMux<'d> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d> DiskMux<'d> {
    pub const fn new() -> Self {
        Self {
            drives: [None, None, None, None],
        }
    }

    /// Attaches `device` at `drive`, returning the driver it replaces.
    pub fn attach(
        &mut self,
        drive: u8,
        device: &'d mut dyn BlockDevice,
    ) -> DiskResult<Option<&'d mut dyn BlockDevice>> {
        let slot = self.slot_mut(drive)?;
        trace!("mux: attach drive {drive}");
        Ok(slot.replace(device))
    }

    pub fn detach(&mut self, drive: u8) -> Option<&'d mut dyn BlockDevice> {
        trace!("mux: detach drive {drive}");
        self.drives.get_mut(drive as usize).and_then(Option::take)
    }

    #[inline]
    pub fn is_attached(&self, drive: u8) -> bool {
        matches!(self.drives.get(drive as usize), Some(Some(_)))
    }

    pub fn initialize(&mut self, drive: u8) -> DiskResult<DiskStatus> {
        let dev = self.device_mut(drive)?;
        let status = dev.initialize()?;
        trace!("mux: initialize drive {drive} -> {status:?}");
        Ok(status)
    }

    /// Status of `drive`; unattached drives report `NOINIT | NODISK`.
    pub fn status(&self, drive: u8) -> DiskStatus {
        match self.drives.get(drive as usize) {
            Some(Some(dev)) => dev.status(),
            _ => DiskStatus::NOINIT | DiskStatus::NODISK,
        }
    }

    pub fn read(&mut self, drive: u8, lba: u64, buf: &mut [u8]) -> DiskResult {
        let dev = self.ready_device(drive)?;
        trace!("mux: read drive {drive} lba {lba} len {}", buf.len());
        dev.read_sectors(lba, buf)
    }

    pub fn write(&mut self, drive: u8, lba: u64, buf: &[u8]) -> DiskResult {
        let dev = self.ready_device(drive)?;
        if dev.status().contains(DiskStatus::PROTECT) {
            return Err(DiskError::WriteProtected);
        }
        trace!("mux: write drive {drive} lba {lba} len {}", buf.len());
        dev.write_sectors(lba, buf)
    }

    pub fn sync(&mut self, drive: u8) -> DiskResult {
        self.ready_device(drive)?.flush()
    }

    pub fn sector_count(&self, drive: u8) -> DiskResult<u64> {
        Ok(self.device(drive)?.sector_count())
    }

    pub fn sector_size(&self, drive: u8) -> DiskResult<usize> {
        Ok(self.device(drive)?.sector_size())
    }

    /// Borrows `drive` as a standalone block device routed through the mux.
    pub fn drive(&mut self, drive: u8) -> DriveHandle<'_, 'd> {
        DriveHandle { mux: self, drive }
    }

    fn slot_mut(&mut self, drive: u8) -> DiskResult<&mut Option<&'d mut dyn BlockDevice>> {
        self.drives
            .get_mut(drive as usize)
            .ok_or(DiskError::Invalid("drive index out of range"))
    }

    fn device(&self, drive: u8) -> DiskResult<&(dyn BlockDevice + 'd)> {
        match self.drives.get(drive as usize) {
            Some(Some(dev)) => Ok(&**dev),
            Some(None) => Err(DiskError::NotReady),
            None => Err(DiskError::Invalid("drive index out of range")),
        }
    }

    fn device_mut(&mut self, drive: u8) -> DiskResult<&mut (dyn BlockDevice + 'd)> {
        match self.slot_mut(drive)? {
            Some(dev) => Ok(&mut **dev),
            None => Err(DiskError::NotReady),
        }
    }

    fn ready_device(&mut self, drive: u8) -> DiskResult<&mut (dyn BlockDevice + 'd)> {
        let dev = self.device_mut(drive)?;
        let status = dev.status();
        if status.contains(DiskStatus::NODISK) {
            return Err(DiskError::NoDisk);
        }
        if status.contains(DiskStatus::NOINIT) {
            return Err(DiskError::NotReady);
        }
        Ok(dev)
    }
}

/// One drive of a [`DiskMux`], seen as a [`BlockDevice`].
///
/// Every call goes through the mux checks, so a filesystem engine mounted on
/// a handle sees the same readiness and write-protect rules as direct calls.
pub struct DriveHandle<'m, 'd> {
    mux: &'m mut DiskMux<'d>,
    drive: u8,
}

impl DriveHandle<'_, '_> {
    #[inline]
    pub fn index(&self) -> u8 {
        self.drive
    }
}

impl BlockDevice for DriveHandle<'_, '_> {
    fn sector_size(&self) -> usize {
        self.mux
            .sector_size(self.drive)
            .unwrap_or(crate::DEFAULT_SECTOR_SIZE)
    }

    fn sector_count(&self) -> u64 {
        self.mux.sector_count(self.drive).unwrap_or(0)
    }

    fn initialize(&mut self) -> DiskResult<DiskStatus> {
        self.mux.initialize(self.drive)
    }

    fn status(&self) -> DiskStatus {
        self.mux.status(self.drive)
    }

    fn read_sectors(&mut self, lba: u64, buf: &mut [u8]) -> DiskResult {
        self.mux.read(self.drive, lba, buf)
    }

    fn write_sectors(&mut self, lba: u64, buf: &[u8]) -> DiskResult {
        self.mux.write(self.drive, lba, buf)
    }

    fn flush(&mut self) -> DiskResult {
        self.mux.sync(self.drive)
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_routes_by_drive() {
        let mut a = vec![0u8; 1024];
        let mut b = vec![0u8; 1024];
        let mut disk_a = MemDisk::new(&mut a);
        let mut disk_b = MemDisk::new(&mut b);

        let mut mux = DiskMux::new();
        mux.attach(0, &mut disk_a).unwrap();
        mux.attach(2, &mut disk_b).unwrap();
        mux.initialize(0).unwrap();
        mux.initialize(2).unwrap();

        mux.write(2, 1, &[0xEEu8; 512]).unwrap();
        mux.write(0, 0, &[0x11u8; 512]).unwrap();
        drop(mux);

        assert_eq!(a[0], 0x11);
        assert_eq!(a[512], 0);
        assert_eq!(b[0], 0);
        assert_eq!(b[512], 0xEE);
    }

    #[test]
    fn test_unattached_drive() {
        let mut mux = DiskMux::new();
        let mut out = [0u8; 512];

        assert_eq!(mux.status(3), DiskStatus::NOINIT | DiskStatus::NODISK);
        assert_eq!(mux.read(3, 0, &mut out), Err(DiskError::NotReady));
        assert_eq!(mux.initialize(1), Err(DiskError::NotReady));
        assert!(matches!(mux.read(9, 0, &mut out), Err(DiskError::Invalid(_))));
    }

    #[test]
    fn test_requires_initialize() {
        let mut buf = vec![0u8; 512];
        let mut disk = MemDisk::new(&mut buf);
        let mut mux = DiskMux::new();
        mux.attach(2, &mut disk).unwrap();

        let mut out = [0u8; 512];
        assert_eq!(mux.read(2, 0, &mut out), Err(DiskError::NotReady));
        mux.initialize(2).unwrap();
        assert!(mux.read(2, 0, &mut out).is_ok());
    }

    #[test]
    fn test_write_protect_enforced() {
        let mut file = tempfile::tempfile().unwrap();
        file.set_len(1024).unwrap();
        let mut disk = StdDisk::new(&mut file).unwrap().read_only(true);

        let mut mux = DiskMux::new();
        mux.attach(0, &mut disk).unwrap();
        mux.initialize(0).unwrap();

        assert_eq!(mux.write(0, 0, &[0u8; 512]), Err(DiskError::WriteProtected));
        let mut out = [0u8; 512];
        assert!(mux.read(0, 0, &mut out).is_ok());
    }

    #[test]
    fn test_drive_handle_routes() {
        let mut buf = vec![0u8; 2048];
        let mut disk = MemDisk::new(&mut buf);
        let mut mux = DiskMux::new();
        mux.attach(2, &mut disk).unwrap();

        let mut handle = mux.drive(2);
        assert_eq!(handle.sector_count(), 4);
        assert_eq!(handle.status(), DiskStatus::NOINIT);
        handle.initialize().unwrap();
        handle.write_sector(3, &[0x5Au8; 512]).unwrap();

        let mut empty = mux.drive(1);
        assert_eq!(empty.sector_count(), 0);
        let mut out = [0u8; 512];
        assert_eq!(empty.read_sector(0, &mut out), Err(DiskError::NotReady));
        drop(mux);

        assert_eq!(buf[3 * 512], 0x5A);
    }

    #[test]
    fn test_detach() {
        let mut buf = vec![0u8; 512];
        let mut disk = MemDisk::new(&mut buf);
        let mut mux = DiskMux::new();
        mux.attach(1, &mut disk).unwrap();
        assert!(mux.is_attached(1));
        assert!(mux.detach(1).is_some());
        assert!(!mux.is_attached(1));
        assert_eq!(mux.sector_count(1), Err(DiskError::NotReady));
    }
}
