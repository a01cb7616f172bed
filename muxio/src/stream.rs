// SPDX-License-Identifier: MIT

//! Byte-addressed view of a block device.
//!
//! Filesystem engines such as `fatfs` want a `Read + Write + Seek` stream, while
//! drivers only move whole sectors. `DiskStream` bridges the two with a single
//! sector-sized bounce buffer and read-modify-write for partial sectors.

use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};

use crate::{BlockDevice, BlockDeviceExt, DiskError};

#[derive(Debug)]
pub struct DiskStream<D: BlockDevice> {
    disk: D,
    pos: u64,
    capacity: u64,
    bounce: Vec<u8>,
}

impl<D: BlockDevice> DiskStream<D> {
    pub fn new(disk: D) -> io::Result<Self> {
        let capacity = disk.capacity_bytes().map_err(to_io)?;
        let bounce = vec![0u8; disk.sector_size()];
        Ok(Self {
            disk,
            pos: 0,
            capacity,
            bounce,
        })
    }

    #[inline]
    pub fn get_ref(&self) -> &D {
        &self.disk
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut D {
        &mut self.disk
    }

    #[inline]
    pub fn into_inner(self) -> D {
        self.disk
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    #[inline]
    fn sector_size(&self) -> u64 {
        self.bounce.len() as u64
    }
}

impl<D: BlockDevice> Read for DiskStream<D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.pos >= self.capacity {
            return Ok(0);
        }
        let ss = self.sector_size();
        let lba = self.pos / ss;
        let within = (self.pos % ss) as usize;
        let left = (self.capacity - self.pos).min(buf.len() as u64) as usize;

        let n = if within == 0 && left >= ss as usize {
            // Whole sectors straight into the caller's buffer.
            let whole = left - left % ss as usize;
            self.disk
                .read_sectors(lba, &mut buf[..whole])
                .map_err(to_io)?;
            whole
        } else {
            self.disk
                .read_sectors(lba, &mut self.bounce)
                .map_err(to_io)?;
            let n = left.min(ss as usize - within);
            buf[..n].copy_from_slice(&self.bounce[within..within + n]);
            n
        };

        self.pos += n as u64;
        Ok(n)
    }
}

impl<D: BlockDevice> Write for DiskStream<D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() || self.pos >= self.capacity {
            return Ok(0);
        }
        let ss = self.sector_size();
        let lba = self.pos / ss;
        let within = (self.pos % ss) as usize;
        let left = (self.capacity - self.pos).min(buf.len() as u64) as usize;

        let n = if within == 0 && left >= ss as usize {
            let whole = left - left % ss as usize;
            self.disk
                .write_sectors(lba, &buf[..whole])
                .map_err(to_io)?;
            whole
        } else {
            // Partial sector: read-modify-write through the bounce buffer.
            self.disk
                .read_sectors(lba, &mut self.bounce)
                .map_err(to_io)?;
            let n = left.min(ss as usize - within);
            self.bounce[within..within + n].copy_from_slice(&buf[..n]);
            self.disk
                .write_sectors(lba, &self.bounce)
                .map_err(to_io)?;
            n
        };

        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.disk.flush().map_err(to_io)
    }
}

impl<D: BlockDevice> Seek for DiskStream<D> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(off) => Some(off),
            SeekFrom::End(delta) => self.capacity.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        match target {
            Some(off) => {
                self.pos = off;
                Ok(off)
            }
            None => Err(io::Error::new(
                ErrorKind::InvalidInput,
                "seek to a negative or overflowing position",
            )),
        }
    }
}

fn to_io(e: DiskError) -> io::Error {
    let kind = match e {
        DiskError::OutOfBounds => ErrorKind::UnexpectedEof,
        DiskError::WriteProtected => ErrorKind::PermissionDenied,
        DiskError::Unsupported => ErrorKind::Unsupported,
        DiskError::NoDisk => ErrorKind::NotFound,
        DiskError::Invalid(_) => ErrorKind::InvalidInput,
        DiskError::NotReady | DiskError::Other(_) => ErrorKind::Other,
    };
    io::Error::new(kind, e)
}
