// SPDX-License-Identifier: MIT

//! Volume registry.
//!
//! Maps volume tokens (`"SD"`, `"USB"`, `"SDRAM"`, `"SPIFLASH"` and the
//! numeric `"0"`..`"3"`) onto drive indices. The table is fixed at build time;
//! whether a resolved volume may be used depends on the [`BackendConfig`] the
//! registry was built from.

use crate::core::config::BackendConfig;
use crate::core::errors::{VolumeError, VolumeResult};

/// Separator between a volume token and the path inside the volume.
pub const VOLUME_SEPARATOR: char = ':';

/// Drive index handed to the filesystem engine and the disk multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DriveIndex(u8);

impl DriveIndex {
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<DriveIndex> for u8 {
    #[inline]
    fn from(d: DriveIndex) -> Self {
        d.0
    }
}

impl core::fmt::Display for DriveIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

crate::define_volumes! {
    Sd       => "SD",       0, "SD card",
    Usb      => "USB",      1, "USB mass storage",
    Sdram    => "SDRAM",    2, "SDRAM RAM disk",
    SpiFlash => "SPIFLASH", 3, "SPI flash",
}

/// Resolves volume tokens against one backend configuration.
#[derive(Debug, Clone, Copy)]
pub struct VolumeRegistry<'c> {
    config: &'c BackendConfig,
}

impl<'c> VolumeRegistry<'c> {
    #[inline]
    pub const fn new(config: &'c BackendConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &'c BackendConfig {
        self.config
    }

    /// Resolves `token` to its drive index.
    ///
    /// Fails with `UnknownVolumeToken` when the token is not in the table and
    /// with `BackendDisabled` when its backend is not enabled.
    #[inline]
    pub fn resolve(&self, token: &str) -> VolumeResult<DriveIndex> {
        self.resolve_volume(token).map(|v| v.drive())
    }

    pub fn resolve_volume(&self, token: &str) -> VolumeResult<Volume> {
        let volume = Volume::from_token(token).ok_or(VolumeError::UnknownVolumeToken)?;
        if !self.config.is_enabled(volume) {
            return Err(VolumeError::BackendDisabled(volume));
        }
        Ok(volume)
    }

    /// Like [`resolve_volume`](Self::resolve_volume), also accepting the
    /// `"USB:"` spelling.
    #[inline]
    pub fn resolve_prefix(&self, token: &str) -> VolumeResult<Volume> {
        self.resolve_volume(token.strip_suffix(VOLUME_SEPARATOR).unwrap_or(token))
    }

    /// Splits `"USB:dir/file.txt"` into the resolved volume and `"dir/file.txt"`.
    ///
    /// A path without a volume prefix belongs to drive 0.
    pub fn resolve_path<'p>(&self, path: &'p str) -> VolumeResult<(Volume, &'p str)> {
        match path.split_once(VOLUME_SEPARATOR) {
            Some((token, rest)) => Ok((self.resolve_volume(token)?, rest)),
            None => {
                let volume = Volume::Sd;
                if !self.config.is_enabled(volume) {
                    return Err(VolumeError::BackendDisabled(volume));
                }
                Ok((volume, path))
            }
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::core::config::SdTransport;

    fn all_enabled() -> BackendConfig {
        BackendConfig::builder()
            .sd(Some(SdTransport::SDIO_4BIT))
            .usb(true)
            .sdram(true)
            .spiflash(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_named_and_numeric_tokens_agree() {
        let config = all_enabled();
        let registry = VolumeRegistry::new(&config);

        for (name, num, drive) in [
            ("SD", "0", 0u8),
            ("USB", "1", 1),
            ("SDRAM", "2", 2),
            ("SPIFLASH", "3", 3),
        ] {
            assert_eq!(registry.resolve(name).unwrap().get(), drive);
            assert_eq!(registry.resolve(num).unwrap().get(), drive);
        }
    }

    #[test]
    fn test_resolve_is_stable() {
        let config = all_enabled();
        let registry = VolumeRegistry::new(&config);
        for &volume in Volume::ALL {
            let first = registry.resolve(volume.token());
            for _ in 0..3 {
                assert_eq!(registry.resolve(volume.token()), first);
            }
        }
    }

    #[test]
    fn test_unknown_tokens() {
        let config = all_enabled();
        let registry = VolumeRegistry::new(&config);
        for token in ["", "sd", "Usb", "4", "SD:", " SD", "SDCARD", "00"] {
            assert_eq!(
                registry.resolve(token),
                Err(VolumeError::UnknownVolumeToken),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_usb_disabled() {
        let config = BackendConfig::default();
        let registry = VolumeRegistry::new(&config);
        assert_eq!(
            registry.resolve("USB"),
            Err(VolumeError::BackendDisabled(Volume::Usb))
        );
        assert_eq!(
            registry.resolve("1"),
            Err(VolumeError::BackendDisabled(Volume::Usb))
        );

        let config = BackendConfig::builder().usb(true).build().unwrap();
        let registry = VolumeRegistry::new(&config);
        assert_eq!(registry.resolve("USB"), Ok(DRIVE_USB));
        assert_eq!(DRIVE_USB.get(), 1);
    }

    #[test]
    fn test_sdram_numeric_equivalence() {
        let config = BackendConfig::builder().sdram(true).build().unwrap();
        let registry = VolumeRegistry::new(&config);
        assert_eq!(registry.resolve("2"), registry.resolve("SDRAM"));
        assert_eq!(registry.resolve("SDRAM").unwrap().get(), 2);
    }

    #[test]
    fn test_resolve_path() {
        let config = all_enabled();
        let registry = VolumeRegistry::new(&config);

        assert_eq!(
            registry.resolve_path("USB:my_file.txt"),
            Ok((Volume::Usb, "my_file.txt"))
        );
        assert_eq!(
            registry.resolve_path("2:logs/a.txt"),
            Ok((Volume::Sdram, "logs/a.txt"))
        );
        assert_eq!(registry.resolve_path("plain.txt"), Ok((Volume::Sd, "plain.txt")));
        assert_eq!(
            registry.resolve_path("NOPE:x"),
            Err(VolumeError::UnknownVolumeToken)
        );
    }

    #[test]
    fn test_resolve_prefix() {
        let config = all_enabled();
        let registry = VolumeRegistry::new(&config);
        assert_eq!(registry.resolve_prefix("USB:"), Ok(Volume::Usb));
        assert_eq!(registry.resolve_prefix("USB"), Ok(Volume::Usb));
    }

    #[test]
    fn test_volume_table() {
        assert_eq!(VOLUME_TOKEN_SPIFLASH, "SPIFLASH");
        assert_eq!(DRIVE_SPIFLASH.get(), 3);
        assert_eq!(Volume::from_drive(DRIVE_SDRAM), Some(Volume::Sdram));
        assert_eq!(Volume::ALL.len(), 4);
        for (i, v) in Volume::ALL.iter().enumerate() {
            assert_eq!(v.drive().as_usize(), i);
        }
    }
}
