// SPDX-License-Identifier: MIT

use core::convert::Infallible;
use core::fmt;

pub use muxio::errors::*;

use crate::core::volume::Volume;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeError {
    /// Token is not one of the known volume names or drive numbers.
    UnknownVolumeToken,
    /// Token is known but its backend is not enabled.
    BackendDisabled(Volume),
    NotMounted(Volume),
    AlreadyMounted(Volume),
    Other(&'static str),
}

impl VolumeError {
    pub fn msg(&self) -> &'static str {
        match self {
            VolumeError::UnknownVolumeToken => "Unknown volume token",
            VolumeError::BackendDisabled(_) => "Backend disabled",
            VolumeError::NotMounted(_) => "Volume not mounted",
            VolumeError::AlreadyMounted(_) => "Volume already mounted",
            VolumeError::Other(msg) => msg,
        }
    }

    pub fn volume(&self) -> Option<Volume> {
        match self {
            VolumeError::BackendDisabled(v)
            | VolumeError::NotMounted(v)
            | VolumeError::AlreadyMounted(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for VolumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        if let Some(volume) = self.volume() {
            write!(f, " (volume: {volume})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    InvalidConfiguration(&'static str),
    #[cfg(feature = "serde")]
    Parse,
    Other(&'static str),
}

impl ConfigError {
    pub fn msg(&self) -> &'static str {
        match self {
            ConfigError::InvalidConfiguration(msg) => msg,
            #[cfg(feature = "serde")]
            ConfigError::Parse => "Malformed configuration document",
            ConfigError::Other(msg) => msg,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootSectorError {
    IO(DiskError),
    BadSignature,
    BadSectorSize(u16),
    BadClusterSize(u8),
    Other(&'static str),
}

impl BootSectorError {
    pub fn msg(&self) -> &'static str {
        match self {
            BootSectorError::IO(_) => "IO error",
            BootSectorError::BadSignature => "Missing boot sector signature",
            BootSectorError::BadSectorSize(_) => "Invalid bytes per sector",
            BootSectorError::BadClusterSize(_) => "Invalid sectors per cluster",
            BootSectorError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<DiskError> {
        match self {
            BootSectorError::IO(e) => Some(*e),
            _ => None,
        }
    }
}

impl fmt::Display for BootSectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        match self {
            BootSectorError::BadSectorSize(v) => write!(f, " ({v})")?,
            BootSectorError::BadClusterSize(v) => write!(f, " ({v})")?,
            _ => {}
        }
        if let Some(src) = self.source() {
            write!(f, "\n  caused by: {}", src.msg())?;
        }
        Ok(())
    }
}

impl From<DiskError> for BootSectorError {
    #[inline]
    fn from(e: DiskError) -> Self {
        BootSectorError::IO(e)
    }
}

/// Top-level error.
///
/// `E` is the filesystem engine's own error type, carried unchanged in `Fs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuxError<E = Infallible> {
    Volume(VolumeError),
    Config(ConfigError),
    Disk(DiskError),
    BootSector(BootSectorError),
    /// File ended before the surviving region was copied.
    UnexpectedEof,
    /// Engine accepted fewer bytes than asked (volume full).
    ShortWrite,
    Fs(E),
}

impl<E> MuxError<E> {
    pub fn msg(&self) -> &'static str {
        match self {
            MuxError::Volume(e) => e.msg(),
            MuxError::Config(e) => e.msg(),
            MuxError::Disk(e) => e.msg(),
            MuxError::BootSector(e) => e.msg(),
            MuxError::UnexpectedEof => "Unexpected end of file",
            MuxError::ShortWrite => "Short write",
            MuxError::Fs(_) => "Filesystem error",
        }
    }

    /// Re-types an error that carries no engine error.
    pub fn map_fs<F>(self, f: impl FnOnce(E) -> F) -> MuxError<F> {
        match self {
            MuxError::Volume(e) => MuxError::Volume(e),
            MuxError::Config(e) => MuxError::Config(e),
            MuxError::Disk(e) => MuxError::Disk(e),
            MuxError::BootSector(e) => MuxError::BootSector(e),
            MuxError::UnexpectedEof => MuxError::UnexpectedEof,
            MuxError::ShortWrite => MuxError::ShortWrite,
            MuxError::Fs(e) => MuxError::Fs(f(e)),
        }
    }
}

impl MuxError<Infallible> {
    /// Widens an engine-free error to any engine error type.
    pub fn widen<E>(self) -> MuxError<E> {
        self.map_fs(|never| match never {})
    }
}

impl<E: fmt::Display> fmt::Display for MuxError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MuxError::Volume(e) => write!(f, "{e}"),
            MuxError::Config(e) => write!(f, "{e}"),
            MuxError::BootSector(e) => write!(f, "{e}"),
            MuxError::Disk(e) => write!(f, "{}\n  caused by: {}", self.msg(), e.msg()),
            MuxError::Fs(e) => write!(f, "{}\n  caused by: {e}", self.msg()),
            _ => write!(f, "{}", self.msg()),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug + fmt::Display> std::error::Error for MuxError<E> {}

#[cfg(feature = "std")]
impl std::error::Error for VolumeError {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for BootSectorError {}

// === type *Result ===

pub type MuxResult<T = (), E = Infallible> = Result<T, MuxError<E>>;
pub type VolumeResult<T = ()> = Result<T, VolumeError>;
pub type ConfigResult<T = ()> = Result<T, ConfigError>;
pub type BootSectorResult<T = ()> = Result<T, BootSectorError>;

crate::mux_error_wiring! {
    top => MuxError {
        VolumeError     : Volume,
        ConfigError     : Config,
        DiskError       : Disk,
        BootSectorError : BootSector,
    },
    str_into => [
        VolumeError,
        ConfigError,
        BootSectorError,
    ],
}
