// SPDX-License-Identifier: MIT

//! Head truncation.
//!
//! Block filesystems only shorten files from the end. Removing the first
//! `index` bytes is done by shifting the surviving region `[index, size)` down
//! to offset 0 in forward passes through one scratch buffer, then cutting the
//! tail. Each pass writes strictly behind the position the next pass reads
//! from, so a single buffer is enough.
//!
//! The operation is not atomic: an error in the middle of the loop leaves the
//! file partially shifted. The file position after the call is unspecified.

use core::cmp::min;

use crate::core::errors::{ConfigError, MuxError, MuxResult};
use crate::ensure;

/// Scratch capacity used by [`truncate_head`].
pub const TRUNCATE_BUFFER_SIZE: usize = 256;

/// The file primitives head truncation needs from the engine.
pub trait FsFile {
    type Error;

    /// Current length in bytes.
    fn size(&mut self) -> Result<u64, Self::Error>;

    /// Moves the position to `pos` bytes from the start.
    fn seek_to(&mut self, pos: u64) -> Result<(), Self::Error>;

    /// Reads up to `buf.len()` bytes at the current position.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Writes up to `buf.len()` bytes at the current position.
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;

    /// Sets the length, dropping everything past `len`.
    fn set_len(&mut self, len: u64) -> Result<(), Self::Error>;
}

impl<F: FsFile + ?Sized> FsFile for &mut F {
    type Error = F::Error;

    #[inline]
    fn size(&mut self) -> Result<u64, Self::Error> {
        (**self).size()
    }

    #[inline]
    fn seek_to(&mut self, pos: u64) -> Result<(), Self::Error> {
        (**self).seek_to(pos)
    }

    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }

    #[inline]
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        (**self).write(buf)
    }

    #[inline]
    fn set_len(&mut self, len: u64) -> Result<(), Self::Error> {
        (**self).set_len(len)
    }
}

/// Removes the first `index` bytes of `file` using a
/// [`TRUNCATE_BUFFER_SIZE`] stack buffer.
///
/// `index >= size` empties the file; the file itself is kept.
#[inline]
pub fn truncate_head<F: FsFile>(file: &mut F, index: u64) -> MuxResult<(), F::Error> {
    truncate_head_buffered::<F, TRUNCATE_BUFFER_SIZE>(file, index)
}

/// [`truncate_head`] with an `N` byte stack buffer.
#[inline]
pub fn truncate_head_buffered<F: FsFile, const N: usize>(
    file: &mut F,
    index: u64,
) -> MuxResult<(), F::Error> {
    let mut scratch = [0u8; N];
    truncate_head_with_buffer(file, index, &mut scratch)
}

/// [`truncate_head`] with a heap buffer of `capacity` bytes, typically
/// [`BackendConfig::truncate_buffer_size`](crate::core::config::BackendConfig::truncate_buffer_size).
#[cfg(feature = "alloc")]
pub fn truncate_head_sized<F: FsFile>(
    file: &mut F,
    index: u64,
    capacity: usize,
) -> MuxResult<(), F::Error> {
    let mut scratch = alloc::vec![0u8; capacity];
    truncate_head_with_buffer(file, index, &mut scratch)
}

/// Removes the first `index` bytes of `file`, shuttling data through
/// `scratch`.
///
/// Reads and writes exactly `size - index` bytes each. Partial reads and
/// writes are continued; a write that accepts nothing fails with
/// [`MuxError::ShortWrite`]. Engine errors abort the copy and come back
/// unchanged in [`MuxError::Fs`].
pub fn truncate_head_with_buffer<F: FsFile>(
    file: &mut F,
    index: u64,
    scratch: &mut [u8],
) -> MuxResult<(), F::Error> {
    ensure!(
        !scratch.is_empty(),
        ConfigError::InvalidConfiguration("truncate scratch buffer is empty")
    );

    let size = file.size().map_err(MuxError::Fs)?;
    if index >= size {
        file.seek_to(0).map_err(MuxError::Fs)?;
        return file.set_len(0).map_err(MuxError::Fs);
    }

    let new_size = size - index;
    let capacity = scratch.len() as u64;
    let mut moved = 0u64;

    while moved < new_size {
        let want = min(capacity, new_size - moved) as usize;

        file.seek_to(index + moved).map_err(MuxError::Fs)?;
        let got = file.read(&mut scratch[..want]).map_err(MuxError::Fs)?;
        if got == 0 {
            return Err(MuxError::UnexpectedEof);
        }

        // Engines stop short at cluster boundaries. Zero bytes means full.
        file.seek_to(moved).map_err(MuxError::Fs)?;
        let mut put = 0;
        while put < got {
            let n = file.write(&scratch[put..got]).map_err(MuxError::Fs)?;
            if n == 0 {
                return Err(MuxError::ShortWrite);
            }
            put += n;
        }

        moved += got as u64;
    }

    file.set_len(new_size).map_err(MuxError::Fs)
}

#[cfg(feature = "std")]
mod std_file {
    use std::fs::File;
    use std::io::{self, Read, Seek, SeekFrom, Write};

    use super::FsFile;

    impl FsFile for File {
        type Error = io::Error;

        #[inline]
        fn size(&mut self) -> io::Result<u64> {
            Ok(self.metadata()?.len())
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

        #[inline]
        fn set_len(&mut self, len: u64) -> io::Result<()> {
            File::set_len(self, len)
        }
    }
}
