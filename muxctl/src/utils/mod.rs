// SPDX-License-Identifier: MIT
pub mod log;
pub mod string;

pub use self::log::{LogLevel, init as init_logger};
pub use string::*;
