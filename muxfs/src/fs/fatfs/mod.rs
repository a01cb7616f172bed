// SPDX-License-Identifier: MIT

//! `fatfs` engine adapters.
//!
//! - [`FatVolume`]: a mounted `fatfs` filesystem plus the geometry read from its
//!   boot sector, usable in a [`MountTable`](crate::core::mount::MountTable)
//! - `FsFile` for `fatfs::File`, so files can be head truncated in place
//! - [`format_volume`] and [`stamp_modified`] helpers

use std::io::{self, Read, Seek, SeekFrom, Write};

use ::fatfs::{Date, DateTime, Dir, File, FileSystem, FormatVolumeOptions, FsOptions, ReadWriteSeek, Time};

use crate::core::boot::{BOOT_SECTOR_LEN, BootSector};
use crate::core::errors::{MuxError, MuxResult};
use crate::core::size::{ClusterGeometry, FsVolume};
use crate::core::truncate::FsFile;
use crate::core::utils::time_utils::split_fat_timestamp;

pub type FatResult<T = ()> = MuxResult<T, io::Error>;

/// Writes a fresh FAT filesystem (type chosen from the size) over `disk`.
pub fn format_volume<T: ReadWriteSeek>(disk: &mut T) -> io::Result<()> {
    disk.seek(SeekFrom::Start(0))?;
    ::fatfs::format_volume(&mut *disk, FormatVolumeOptions::new())
}

/// Sets the modification time of `file` from a packed FAT timestamp.
pub fn stamp_modified<T: ReadWriteSeek>(file: &mut File<'_, T>, ts: u32) {
    let (year, month, day, hour, min, sec) = split_fat_timestamp(ts);
    file.set_modified(DateTime {
        date: Date {
            year: year as u16,
            month: month as u16,
            day: day as u16,
        },
        time: Time {
            hour: hour as u16,
            min: min as u16,
            sec: sec as u16,
            millis: 0,
        },
    });
}

pub struct FatVolume<T: ReadWriteSeek> {
    fs: FileSystem<T>,
    boot: BootSector,
}

impl<T: ReadWriteSeek> FatVolume<T> {
    /// Mounts the FAT filesystem found on `disk`.
    ///
    /// The boot sector is checked first so a blank or foreign medium fails
    /// with a `BootSector` error rather than an engine error.
    pub fn mount(mut disk: T) -> FatResult<Self> {
        let mut sector = [0u8; BOOT_SECTOR_LEN];
        disk.seek(SeekFrom::Start(0)).map_err(MuxError::Fs)?;
        disk.read_exact(&mut sector).map_err(MuxError::Fs)?;
        let boot = BootSector::parse(&sector)?;

        disk.seek(SeekFrom::Start(0)).map_err(MuxError::Fs)?;
        let fs = FileSystem::new(disk, FsOptions::new()).map_err(MuxError::Fs)?;
        Ok(Self { fs, boot })
    }

    #[inline]
    pub fn boot_sector(&self) -> &BootSector {
        &self.boot
    }

    #[inline]
    pub fn fs(&self) -> &FileSystem<T> {
        &self.fs
    }

    #[inline]
    pub fn root_dir(&self) -> Dir<'_, T> {
        self.fs.root_dir()
    }

    pub fn open_file(&self, path: &str) -> io::Result<File<'_, T>> {
        self.fs.root_dir().open_file(path)
    }

    pub fn create_file(&self, path: &str) -> io::Result<File<'_, T>> {
        self.fs.root_dir().create_file(path)
    }

    /// Flushes engine state and releases the filesystem.
    pub fn unmount(self) -> io::Result<()> {
        self.fs.unmount()
    }
}

impl<T: ReadWriteSeek> FsVolume for FatVolume<T> {
    type Error = io::Error;

    fn geometry(&self) -> io::Result<ClusterGeometry> {
        let stats = self.fs.stats()?;
        Ok(ClusterGeometry {
            total_clusters: stats.total_clusters(),
            free_clusters: stats.free_clusters(),
            sectors_per_cluster: self.boot.sectors_per_cluster() as u32,
            bytes_per_sector: self.boot.bytes_per_sector() as u32,
        })
    }
}

impl<T: ReadWriteSeek> FsFile for File<'_, T> {
    type Error = io::Error;

    #[inline]
    fn size(&mut self) -> io::Result<u64> {
        self.seek(SeekFrom::End(0))
    }

    #[inline]
    fn seek_to(&mut self, pos: u64) -> io::Result<()> {
        self.seek(SeekFrom::Start(pos)).map(|_| ())
    }

    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(self, buf)
    }

    /// `fatfs` truncates at the current position.
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        self.seek(SeekFrom::Start(len))?;
        self.truncate()
    }
}
