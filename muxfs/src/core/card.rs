// SPDX-License-Identifier: MIT

//! SD card presence and write-protect sensing.
//!
//! Both pins are optional and fixed at construction. Card detect is active
//! low; write protect reads high when the slider is locked. No debouncing is
//! done here.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin};
use muxio::prelude::{BlockDevice, DiskError, DiskResult, DiskStatus};

/// Placeholder for a pin that is not wired.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

#[derive(Debug)]
pub struct CardSensor<CD = NoPin, WP = NoPin> {
    detect: Option<CD>,
    protect: Option<WP>,
}

impl CardSensor<NoPin, NoPin> {
    /// Sensor with neither pin wired.
    pub const fn disabled() -> Self {
        Self {
            detect: None,
            protect: None,
        }
    }
}

impl<CD: InputPin, WP: InputPin> CardSensor<CD, WP> {
    pub const fn new(detect: Option<CD>, protect: Option<WP>) -> Self {
        Self { detect, protect }
    }

    #[inline]
    pub fn has_card_detect(&self) -> bool {
        self.detect.is_some()
    }

    #[inline]
    pub fn has_write_protect(&self) -> bool {
        self.protect.is_some()
    }

    /// Pin level read, with the pin error kept.
    ///
    /// `Ok(false)` when card detect is not wired.
    pub fn try_is_card_present(&mut self) -> Result<bool, CD::Error> {
        match self.detect.as_mut() {
            Some(pin) => pin.is_low(),
            None => Ok(false),
        }
    }

    /// True when the detect pin reads low. False when the pin is not wired
    /// or cannot be read.
    #[inline]
    pub fn is_card_present(&mut self) -> bool {
        self.try_is_card_present().unwrap_or(false)
    }

    /// True when the write-protect pin reads high. False when the pin is
    /// not wired or cannot be read.
    pub fn is_write_protected(&mut self) -> bool {
        match self.protect.as_mut() {
            Some(pin) => pin.is_high().unwrap_or(false),
            None => false,
        }
    }

    pub fn release(self) -> (Option<CD>, Option<WP>) {
        (self.detect, self.protect)
    }
}

/// SD card driver with its slot pins.
///
/// Without a detect pin the card is assumed present. Pin state is sampled on
/// `initialize`, on every read or write, and on [`refresh`](Self::refresh);
/// `status` reports the last sample.
pub struct SdCard<D, CD = NoPin, WP = NoPin> {
    disk: D,
    sensor: CardSensor<CD, WP>,
    present: bool,
    protected: bool,
}

impl<D: BlockDevice, CD: InputPin, WP: InputPin> SdCard<D, CD, WP> {
    pub fn new(disk: D, sensor: CardSensor<CD, WP>) -> Self {
        let mut card = Self {
            disk,
            sensor,
            present: true,
            protected: false,
        };
        card.refresh();
        card
    }

    /// Samples the slot pins.
    pub fn refresh(&mut self) {
        self.present = !self.sensor.has_card_detect() || self.sensor.is_card_present();
        self.protected = self.sensor.is_write_protected();
    }

    #[inline]
    pub fn sensor_mut(&mut self) -> &mut CardSensor<CD, WP> {
        &mut self.sensor
    }

    #[inline]
    pub fn inner(&self) -> &D {
        &self.disk
    }

    pub fn into_parts(self) -> (D, CardSensor<CD, WP>) {
        (self.disk, self.sensor)
    }

    fn check_present(&mut self) -> DiskResult {
        self.refresh();
        if !self.present {
            return Err(DiskError::NoDisk);
        }
        Ok(())
    }
}

impl<D: BlockDevice, CD: InputPin, WP: InputPin> BlockDevice for SdCard<D, CD, WP> {
    #[inline]
    fn sector_size(&self) -> usize {
        self.disk.sector_size()
    }

    #[inline]
    fn sector_count(&self) -> u64 {
        self.disk.sector_count()
    }

    fn initialize(&mut self) -> DiskResult<DiskStatus> {
        self.refresh();
        if self.present {
            self.disk.initialize()?;
        }
        Ok(self.status())
    }

    fn status(&self) -> DiskStatus {
        if !self.present {
            return DiskStatus::NOINIT | DiskStatus::NODISK;
        }
        let mut status = self.disk.status();
        status.set(DiskStatus::PROTECT, self.protected);
        status
    }

    fn read_sectors(&mut self, lba: u64, buf: &mut [u8]) -> DiskResult {
        self.check_present()?;
        self.disk.read_sectors(lba, buf)
    }

    fn write_sectors(&mut self, lba: u64, buf: &[u8]) -> DiskResult {
        self.check_present()?;
        if self.protected {
            return Err(DiskError::WriteProtected);
        }
        self.disk.write_sectors(lba, buf)
    }

    fn flush(&mut self) -> DiskResult {
        self.disk.flush()
    }
}
