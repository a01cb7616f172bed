// SPDX-License-Identifier: MIT

//! Volume-aware disk multiplexer.
//!
//! Wraps [`DiskMux`] so drivers are attached by volume token and only for
//! enabled backends. SPI flash is reserved: it can be enabled but has no
//! driver, so it stays `NOINIT | NODISK`.

use log::debug;
use muxio::prelude::{BlockDevice, DiskError, DiskMux, DiskStatus, DriveHandle};

use crate::core::errors::{MuxError, MuxResult};
use crate::core::volume::{Volume, VolumeRegistry};

pub struct VolumeMux<'c, 'd> {
    registry: VolumeRegistry<'c>,
    disks: DiskMux<'d>,
}

impl<'c, 'd> VolumeMux<'c, 'd> {
    pub fn new(registry: VolumeRegistry<'c>) -> Self {
        Self {
            registry,
            disks: DiskMux::new(),
        }
    }

    #[inline]
    pub fn registry(&self) -> &VolumeRegistry<'c> {
        &self.registry
    }

    /// Attaches the driver for the volume named by `token`.
    pub fn attach(&mut self, token: &str, device: &'d mut dyn BlockDevice) -> MuxResult {
        let volume = self.registry.resolve_prefix(token)?;
        if volume == Volume::SpiFlash {
            return Err(MuxError::Disk(DiskError::Unsupported));
        }
        self.disks.attach(volume.drive().get(), device)?;
        debug!("backends: {volume} attached on drive {}", volume.drive());
        Ok(())
    }

    pub fn detach(&mut self, token: &str) -> MuxResult<bool> {
        let volume = self.registry.resolve_prefix(token)?;
        Ok(self.disks.detach(volume.drive().get()).is_some())
    }

    pub fn initialize(&mut self, token: &str) -> MuxResult<DiskStatus> {
        let volume = self.registry.resolve_prefix(token)?;
        let status = self.disks.initialize(volume.drive().get())?;
        debug!("backends: {volume} initialized, status {status:?}");
        Ok(status)
    }

    pub fn status(&self, token: &str) -> MuxResult<DiskStatus> {
        let volume = self.registry.resolve_prefix(token)?;
        Ok(self.disks.status(volume.drive().get()))
    }

    /// Block device view of one volume, for handing to the engine.
    pub fn device(&mut self, token: &str) -> MuxResult<DriveHandle<'_, 'd>> {
        let volume = self.registry.resolve_prefix(token)?;
        Ok(self.disks.drive(volume.drive().get()))
    }

    /// Status of every enabled volume, in drive order.
    pub fn statuses(&self) -> impl Iterator<Item = (Volume, DiskStatus)> + '_ {
        self.registry
            .config()
            .enabled_volumes()
            .map(|v| (v, self.disks.status(v.drive().get())))
    }

    #[inline]
    pub fn disks(&mut self) -> &mut DiskMux<'d> {
        &mut self.disks
    }
}
