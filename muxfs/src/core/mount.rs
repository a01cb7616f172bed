// SPDX-License-Identifier: MIT

//! Mounted volumes, one slot per drive index.

use log::debug;
use muxio::mux::DRIVE_COUNT;

use crate::core::errors::{MuxResult, VolumeError, VolumeResult};
use crate::core::size::{DriveSize, FsVolume};
use crate::core::volume::{Volume, VolumeRegistry};

pub struct MountTable<'c, V> {
    registry: VolumeRegistry<'c>,
    slots: [Option<V>; DRIVE_COUNT],
}

impl<'c, V> MountTable<'c, V> {
    pub fn new(registry: VolumeRegistry<'c>) -> Self {
        Self {
            registry,
            slots: [const { None }; DRIVE_COUNT],
        }
    }

    #[inline]
    pub fn registry(&self) -> &VolumeRegistry<'c> {
        &self.registry
    }

    /// Mounts `volume` under `token` (`"USB"`, `"1"` or `"USB:"`).
    pub fn mount(&mut self, token: &str, volume: V) -> VolumeResult<&mut V> {
        let target = self.registry.resolve_prefix(token)?;
        let slot = &mut self.slots[target.drive().as_usize()];
        if slot.is_some() {
            return Err(VolumeError::AlreadyMounted(target));
        }
        debug!("mount: {target} on drive {}", target.drive());
        Ok(slot.insert(volume))
    }

    /// Removes and returns the engine volume mounted under `token`.
    pub fn unmount(&mut self, token: &str) -> VolumeResult<V> {
        let target = self.registry.resolve_prefix(token)?;
        let volume = self.slots[target.drive().as_usize()]
            .take()
            .ok_or(VolumeError::NotMounted(target))?;
        debug!("unmount: {target}");
        Ok(volume)
    }

    pub fn is_mounted(&self, volume: Volume) -> bool {
        self.slots[volume.drive().as_usize()].is_some()
    }

    pub fn get(&self, token: &str) -> VolumeResult<&V> {
        let target = self.registry.resolve_prefix(token)?;
        self.slots[target.drive().as_usize()]
            .as_ref()
            .ok_or(VolumeError::NotMounted(target))
    }

    pub fn get_mut(&mut self, token: &str) -> VolumeResult<&mut V> {
        let target = self.registry.resolve_prefix(token)?;
        self.slots[target.drive().as_usize()]
            .as_mut()
            .ok_or(VolumeError::NotMounted(target))
    }

    /// Mounted volumes in drive order.
    pub fn mounted(&self) -> impl Iterator<Item = (Volume, &V)> + '_ {
        Volume::ALL
            .iter()
            .filter_map(|v| self.slots[v.drive().as_usize()].as_ref().map(|m| (*v, m)))
    }
}

impl<'c, V: FsVolume> MountTable<'c, V> {
    /// Total and free bytes of the volume mounted under `token`.
    ///
    /// Engine errors come back unchanged in `MuxError::Fs`.
    pub fn drive_size(&self, token: &str) -> MuxResult<DriveSize, V::Error> {
        let volume = self.get(token)?;
        let geometry = volume.geometry().map_err(crate::core::errors::MuxError::Fs)?;
        Ok(geometry.drive_size())
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::core::config::BackendConfig;
    use crate::core::errors::MuxError;
    use crate::core::size::ClusterGeometry;

    #[derive(Debug)]
    struct FakeVolume {
        geometry: Option<ClusterGeometry>,
    }

    impl FsVolume for FakeVolume {
        type Error = &'static str;

        fn geometry(&self) -> Result<ClusterGeometry, Self::Error> {
            self.geometry.ok_or("io failure")
        }
    }

    fn healthy() -> FakeVolume {
        FakeVolume {
            geometry: Some(ClusterGeometry {
                total_clusters: 100,
                free_clusters: 40,
                sectors_per_cluster: 4,
                bytes_per_sector: 512,
            }),
        }
    }

    #[test]
    fn test_mount_and_size() {
        let config = BackendConfig::builder().sdram(true).build().unwrap();
        let mut table = MountTable::new(VolumeRegistry::new(&config));

        table.mount("SDRAM", healthy()).unwrap();
        let size = table.drive_size("2").unwrap();
        assert_eq!(size.total(), 100 * 2048);
        assert_eq!(size.free(), 40 * 2048);
        assert!(size.free() <= size.total());

        assert_eq!(table.drive_size("SDRAM:").unwrap(), size);
    }

    #[test]
    fn test_not_mounted() {
        let config = BackendConfig::default();
        let table: MountTable<'_, FakeVolume> = MountTable::new(VolumeRegistry::new(&config));
        assert_eq!(
            table.drive_size("SD"),
            Err(MuxError::Volume(VolumeError::NotMounted(Volume::Sd)))
        );
        assert_eq!(
            table.drive_size("USB"),
            Err(MuxError::Volume(VolumeError::BackendDisabled(Volume::Usb)))
        );
    }

    #[test]
    fn test_double_mount_and_unmount() {
        let config = BackendConfig::default();
        let mut table = MountTable::new(VolumeRegistry::new(&config));

        table.mount("SD", healthy()).unwrap();
        assert!(matches!(
            table.mount("0", healthy()),
            Err(VolumeError::AlreadyMounted(Volume::Sd))
        ));
        assert!(table.is_mounted(Volume::Sd));
        assert_eq!(table.mounted().count(), 1);

        table.unmount("SD").unwrap();
        assert!(matches!(
            table.unmount("SD"),
            Err(VolumeError::NotMounted(Volume::Sd))
        ));
    }

    #[test]
    fn test_engine_error_passthrough() {
        let config = BackendConfig::default();
        let mut table = MountTable::new(VolumeRegistry::new(&config));
        table.mount("SD", FakeVolume { geometry: None }).unwrap();
        assert_eq!(table.drive_size("SD"), Err(MuxError::Fs("io failure")));
    }
}
