// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core Modules
pub mod core;
pub mod fs;

// Reusable types and traits
pub use core::traits::*;

pub use core::backends::VolumeMux;
pub use core::boot::BootSector;
pub use core::card::{CardSensor, NoPin, SdCard};
pub use core::config::{BackendConfig, BackendConfigBuilder, SdTransport};
pub use core::mount::MountTable;
pub use core::size::{ClusterGeometry, DriveSize};
pub use core::truncate::{
    TRUNCATE_BUFFER_SIZE, truncate_head, truncate_head_buffered, truncate_head_with_buffer,
};
#[cfg(feature = "alloc")]
pub use core::truncate::truncate_head_sized;
pub use core::utils::time_utils::{fat_timestamp, now_fat_timestamp};
pub use core::volume::{DriveIndex, Volume, VolumeRegistry};

// Engine adapters
#[cfg(feature = "fatfs")]
/// `fatfs` engine adapters.
///
/// See [`fat::FatVolume`].
pub mod fat {
    pub use super::fs::fatfs::*;
}
