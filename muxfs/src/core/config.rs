// SPDX-License-Identifier: MIT

//! Backend enablement set.
//!
//! Built once at startup and passed by reference to everything that needs to
//! know which media exist. At most one SD transport can be selected since the
//! transport is a single `Option<SdTransport>`.

use crate::core::errors::{ConfigError, ConfigResult};
use crate::core::volume::Volume;
use crate::ensure;

/// Default scratch buffer capacity for head truncation.
pub const DEFAULT_TRUNCATE_BUFFER_SIZE: usize = 256;

/// How the SD card is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdTransport {
    Spi,
    Sdio { wide_bus: bool },
}

impl SdTransport {
    /// SDIO with the 4-bit data bus.
    pub const SDIO_4BIT: SdTransport = SdTransport::Sdio { wide_bus: true };
    pub const SDIO_1BIT: SdTransport = SdTransport::Sdio { wide_bus: false };

    pub const fn name(&self) -> &'static str {
        match self {
            SdTransport::Spi => "spi",
            SdTransport::Sdio { wide_bus: true } => "sdio",
            SdTransport::Sdio { wide_bus: false } => "sdio-1bit",
        }
    }
}

impl core::fmt::Display for SdTransport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    sd: Option<SdTransport>,
    usb: bool,
    sdram: bool,
    spiflash: bool,
    card_detect: bool,
    write_protect: bool,
    truncate_buffer_size: usize,
}

impl Default for BackendConfig {
    /// SD over 4-bit SDIO only, no detect pins, 256 byte scratch buffer.
    fn default() -> Self {
        Self {
            sd: Some(SdTransport::SDIO_4BIT),
            usb: false,
            sdram: false,
            spiflash: false,
            card_detect: false,
            write_protect: false,
            truncate_buffer_size: DEFAULT_TRUNCATE_BUFFER_SIZE,
        }
    }
}

impl BackendConfig {
    #[inline]
    pub fn builder() -> BackendConfigBuilder {
        BackendConfigBuilder::default()
    }

    pub fn validate(&self) -> ConfigResult {
        ensure!(
            self.truncate_buffer_size > 0,
            ConfigError::InvalidConfiguration("truncate buffer size must be non-zero")
        );
        Ok(())
    }

    #[inline]
    pub fn sd_transport(&self) -> Option<SdTransport> {
        self.sd
    }

    #[inline]
    pub fn has_card_detect(&self) -> bool {
        self.card_detect
    }

    #[inline]
    pub fn has_write_protect(&self) -> bool {
        self.write_protect
    }

    #[inline]
    pub fn truncate_buffer_size(&self) -> usize {
        self.truncate_buffer_size
    }

    pub fn is_enabled(&self, volume: Volume) -> bool {
        match volume {
            Volume::Sd => self.sd.is_some(),
            Volume::Usb => self.usb,
            Volume::Sdram => self.sdram,
            Volume::SpiFlash => self.spiflash,
        }
    }

    /// Enabled volumes in drive order.
    pub fn enabled_volumes(&self) -> impl Iterator<Item = Volume> + '_ {
        Volume::ALL.iter().copied().filter(|v| self.is_enabled(*v))
    }
}

#[derive(Debug, Clone)]
pub struct BackendConfigBuilder {
    config: BackendConfig,
}

impl Default for BackendConfigBuilder {
    fn default() -> Self {
        Self {
            config: BackendConfig::default(),
        }
    }
}

impl BackendConfigBuilder {
    /// `None` turns the SD backend off.
    pub fn sd(mut self, transport: Option<SdTransport>) -> Self {
        self.config.sd = transport;
        self
    }

    pub fn usb(mut self, enabled: bool) -> Self {
        self.config.usb = enabled;
        self
    }

    pub fn sdram(mut self, enabled: bool) -> Self {
        self.config.sdram = enabled;
        self
    }

    pub fn spiflash(mut self, enabled: bool) -> Self {
        self.config.spiflash = enabled;
        self
    }

    pub fn card_detect(mut self, enabled: bool) -> Self {
        self.config.card_detect = enabled;
        self
    }

    pub fn write_protect(mut self, enabled: bool) -> Self {
        self.config.write_protect = enabled;
        self
    }

    pub fn truncate_buffer_size(mut self, size: usize) -> Self {
        self.config.truncate_buffer_size = size;
        self
    }

    pub fn build(self) -> ConfigResult<BackendConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(feature = "serde")]
mod toml_config {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, Copy, Deserialize)]
    enum SdSetting {
        #[serde(rename = "off")]
        Off,
        #[serde(rename = "spi")]
        Spi,
        #[serde(rename = "sdio")]
        Sdio,
        #[serde(rename = "sdio-1bit")]
        Sdio1Bit,
    }

    impl From<SdSetting> for Option<SdTransport> {
        fn from(s: SdSetting) -> Self {
            match s {
                SdSetting::Off => None,
                SdSetting::Spi => Some(SdTransport::Spi),
                SdSetting::Sdio => Some(SdTransport::SDIO_4BIT),
                SdSetting::Sdio1Bit => Some(SdTransport::SDIO_1BIT),
            }
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(default)]
    struct RawBackends {
        sd: SdSetting,
        usb: bool,
        sdram: bool,
        spiflash: bool,
    }

    impl Default for RawBackends {
        fn default() -> Self {
            Self {
                sd: SdSetting::Sdio,
                usb: false,
                sdram: false,
                spiflash: false,
            }
        }
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct RawPins {
        card_detect: bool,
        write_protect: bool,
    }

    #[derive(Debug, Deserialize)]
    #[serde(default)]
    struct RawConfig {
        truncate_buffer_size: usize,
        backends: RawBackends,
        pins: RawPins,
    }

    impl Default for RawConfig {
        fn default() -> Self {
            Self {
                truncate_buffer_size: DEFAULT_TRUNCATE_BUFFER_SIZE,
                backends: RawBackends::default(),
                pins: RawPins::default(),
            }
        }
    }

    impl BackendConfig {
        /// Parses a TOML document. Tables other than `[backends]` and
        /// `[pins]` are ignored so the same file can carry tool settings.
        pub fn from_toml_str(doc: &str) -> ConfigResult<Self> {
            let raw: RawConfig = toml::from_str(doc).map_err(|e| {
                log::debug!("config: {e}");
                ConfigError::Parse
            })?;

            BackendConfig::builder()
                .sd(raw.backends.sd.into())
                .usb(raw.backends.usb)
                .sdram(raw.backends.sdram)
                .spiflash(raw.backends.spiflash)
                .card_detect(raw.pins.card_detect)
                .write_protect(raw.pins.write_protect)
                .truncate_buffer_size(raw.truncate_buffer_size)
                .build()
        }
    }
}
