// SPDX-License-Identifier: MIT

#[cfg(feature = "fatfs")]
pub mod fatfs;
