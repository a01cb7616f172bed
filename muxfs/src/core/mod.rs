// SPDX-License-Identifier: MIT

// === Sub-modules ===
pub mod backends;
pub mod boot;
pub mod card;
pub mod config;
pub mod errors;
pub mod macros;
pub mod mount;
pub mod size;
pub mod truncate;
pub mod utils;
pub mod volume;

// === Core Traits ===
pub mod traits {
    pub use super::size::FsVolume;
    pub use super::truncate::FsFile;
}

// === Error types ===
pub use errors::*;

// === Utilities ===
pub use utils::time_utils::*;
