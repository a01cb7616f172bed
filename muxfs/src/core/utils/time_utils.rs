// SPDX-License-Identifier: MIT

//! FAT timestamps.
//!
//! The engine stamps files with a packed 32-bit date-time:
//! bits 31..25 year since 1980, 24..21 month, 20..16 day,
//! 15..11 hour, 10..5 minute, 4..0 seconds / 2.
//!
//! - In `std` mode, [`now_fat_timestamp`] uses the system clock.
//! - In `no_std`, there is no clock and it returns 1980-01-01 00:00:00.

use time::OffsetDateTime;

/// First year a FAT timestamp can represent.
pub const FAT_EPOCH_YEAR: i32 = 1980;

/// Last year a FAT timestamp can represent.
pub const FAT_MAX_YEAR: i32 = FAT_EPOCH_YEAR + 127;

/// 1980-01-01 00:00:00.
pub const FAT_EPOCH_TIMESTAMP: u32 = (1 << 21) | (1 << 16);

/// Packs `dt` into a FAT timestamp.
///
/// Dates before 1980 clamp to the FAT epoch, dates after 2107 to the last
/// representable second.
pub fn fat_timestamp(dt: OffsetDateTime) -> u32 {
    let year = dt.year();
    if year < FAT_EPOCH_YEAR {
        return FAT_EPOCH_TIMESTAMP;
    }
    if year > FAT_MAX_YEAR {
        return (127 << 25) | (12 << 21) | (31 << 16) | (23 << 11) | (59 << 5) | 29;
    }

    ((year - FAT_EPOCH_YEAR) as u32) << 25
        | (u8::from(dt.month()) as u32) << 21
        | (dt.day() as u32) << 16
        | (dt.hour() as u32) << 11
        | (dt.minute() as u32) << 5
        | (dt.second() as u32) / 2
}

/// Current time as a FAT timestamp.
pub fn now_fat_timestamp() -> u32 {
    #[cfg(feature = "std")]
    {
        fat_timestamp(OffsetDateTime::now_utc())
    }

    #[cfg(not(feature = "std"))]
    {
        FAT_EPOCH_TIMESTAMP
    }
}

/// Splits a FAT timestamp into `(year, month, day, hour, minute, second)`.
pub fn split_fat_timestamp(ts: u32) -> (i32, u8, u8, u8, u8, u8) {
    (
        FAT_EPOCH_YEAR + (ts >> 25) as i32,
        ((ts >> 21) & 0x0F) as u8,
        ((ts >> 16) & 0x1F) as u8,
        ((ts >> 11) & 0x1F) as u8,
        ((ts >> 5) & 0x3F) as u8,
        ((ts & 0x1F) * 2) as u8,
    )
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use time::{Date, Month, PrimitiveDateTime, Time};

    fn at(year: i32, month: Month, day: u8, h: u8, m: u8, s: u8) -> OffsetDateTime {
        PrimitiveDateTime::new(
            Date::from_calendar_date(year, month, day).unwrap(),
            Time::from_hms(h, m, s).unwrap(),
        )
        .assume_utc()
    }

    #[test]
    fn test_pack_known_date() {
        let ts = fat_timestamp(at(2024, Month::March, 15, 13, 45, 31));
        assert_eq!(split_fat_timestamp(ts), (2024, 3, 15, 13, 45, 30));
    }

    #[test]
    fn test_epoch_and_clamping() {
        assert_eq!(fat_timestamp(at(1980, Month::January, 1, 0, 0, 0)), FAT_EPOCH_TIMESTAMP);
        assert_eq!(fat_timestamp(at(1970, Month::June, 1, 12, 0, 0)), FAT_EPOCH_TIMESTAMP);
        assert_eq!(
            split_fat_timestamp(fat_timestamp(at(2200, Month::May, 5, 5, 5, 5))),
            (2107, 12, 31, 23, 59, 58)
        );
    }

    #[test]
    fn test_now_is_after_epoch() {
        let (year, month, ..) = split_fat_timestamp(now_fat_timestamp());
        assert!(year >= 2024);
        assert!((1..=12).contains(&month));
    }
}
