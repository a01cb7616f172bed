// SPDX-License-Identifier: MIT

use core::fmt;

/// Result type for block device operations.
pub type DiskResult<T = ()> = core::result::Result<T, DiskError>;

/// Error type for block device operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskError {
    /// Drive not initialized, not attached, or has no driver.
    NotReady,
    /// No medium in the drive.
    NoDisk,
    /// Medium is write protected.
    WriteProtected,
    /// Sector range outside the medium.
    OutOfBounds,
    Unsupported,
    Invalid(&'static str),
    Other(&'static str),
}

impl DiskError {
    pub fn msg(&self) -> &'static str {
        match self {
            DiskError::NotReady => "Drive not ready",
            DiskError::NoDisk => "No medium in drive",
            DiskError::WriteProtected => "Medium is write protected",
            DiskError::OutOfBounds => "Out of bounds",
            DiskError::Unsupported => "Unsupported operation",
            DiskError::Invalid(msg) => msg,
            DiskError::Other(msg) => msg,
        }
    }
}

impl From<&'static str> for DiskError {
    #[inline]
    fn from(msg: &'static str) -> Self {
        DiskError::Other(msg)
    }
}

impl fmt::Display for DiskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DiskError {}
