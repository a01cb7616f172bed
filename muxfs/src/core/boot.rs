// SPDX-License-Identifier: MIT

//! FAT boot sector (BIOS parameter block).
//!
//! Only the prefix common to FAT12/16/32 is decoded: enough to turn cluster
//! counts into bytes.

use muxio::{BlockDevice, BlockDeviceExt, MAX_SECTOR_SIZE};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::core::errors::{BootSectorError, BootSectorResult};
use crate::ensure;

/// Bytes 510..512 of a valid boot sector.
pub const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];

/// Bytes the boot sector occupies regardless of the logical sector size.
pub const BOOT_SECTOR_LEN: usize = 512;

#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug)]
#[repr(C, packed)]
pub struct BiosParameterBlock {
    pub jump_boot: [u8; 3],
    pub oem_name: [u8; 8],
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub num_fats: u8,
    pub root_entry_count: u16,
    pub total_sectors_16: u16,
    pub media: u8,
    pub fat_size_16: u16,
    pub sectors_per_track: u16,
    pub num_heads: u16,
    pub hidden_sectors: u32,
    pub total_sectors_32: u32,
}

/// Validated geometry from a boot sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootSector {
    bytes_per_sector: u16,
    sectors_per_cluster: u8,
    total_sectors: u32,
}

impl BootSector {
    /// Decodes the first [`BOOT_SECTOR_LEN`] bytes of a volume.
    pub fn parse(sector: &[u8]) -> BootSectorResult<Self> {
        ensure!(
            sector.len() >= BOOT_SECTOR_LEN,
            BootSectorError::Other("boot sector shorter than 512 bytes")
        );
        ensure!(
            sector[510..512] == BOOT_SIGNATURE,
            BootSectorError::BadSignature
        );

        let bpb = BiosParameterBlock::read_from_bytes(
            &sector[..core::mem::size_of::<BiosParameterBlock>()],
        )
        .map_err(|_| BootSectorError::Other("truncated parameter block"))?;

        let bytes_per_sector = u16::from_le(bpb.bytes_per_sector);
        ensure!(
            bytes_per_sector.is_power_of_two() && (512..=4096).contains(&bytes_per_sector),
            BootSectorError::BadSectorSize(bytes_per_sector)
        );

        let sectors_per_cluster = bpb.sectors_per_cluster;
        ensure!(
            sectors_per_cluster.is_power_of_two(),
            BootSectorError::BadClusterSize(sectors_per_cluster)
        );

        let total_16 = u16::from_le(bpb.total_sectors_16);
        let total_sectors = if total_16 != 0 {
            total_16 as u32
        } else {
            u32::from_le(bpb.total_sectors_32)
        };

        Ok(Self {
            bytes_per_sector,
            sectors_per_cluster,
            total_sectors,
        })
    }

    /// Reads and decodes sector 0 of `disk`.
    pub fn read<D: BlockDevice + ?Sized>(disk: &mut D) -> BootSectorResult<Self> {
        let mut buf = [0u8; MAX_SECTOR_SIZE];
        disk.read_sector(0, &mut buf)?;
        Self::parse(&buf)
    }

    #[inline]
    pub fn bytes_per_sector(&self) -> u16 {
        self.bytes_per_sector
    }

    #[inline]
    pub fn sectors_per_cluster(&self) -> u8 {
        self.sectors_per_cluster
    }

    #[inline]
    pub fn total_sectors(&self) -> u32 {
        self.total_sectors
    }

    #[inline]
    pub fn cluster_bytes(&self) -> u32 {
        self.bytes_per_sector as u32 * self.sectors_per_cluster as u32
    }
}
