use std::convert::TryFrom;

use super::{OptionCode, PcapNGOption};
use crate::frame::{Timestamp, MICROS_PER_SEC};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Compute the timestamp resolution, in units per second
///
/// If the most significant bit of `if_tsresol` is clear, the resolution is `10^if_tsresol`,
/// otherwise it is `2^(if_tsresol & 0x7f)`.
/// Return the resolution, or `None` if the resolution is invalid (for ex. greater than `2^64`)
pub fn build_ts_resolution(ts_resol: u8) -> Option<u64> {
    let exponent = ts_resol & 0x7f;
    if ts_resol & 0x80 == 0 {
        // 10^19 is the largest power of 10 to fit in a u64
        if exponent > 19 {
            return None;
        }
        Some(10u64.pow(u32::from(exponent)))
    } else {
        if exponent > 63 {
            return None;
        }
        Some(1u64 << exponent)
    }
}

/// Given the raw 64-bit timestamp of a packet block, return a [`Timestamp`]
///
/// `resolution` is in units per second and must not be 0. Fractions are kept in the
/// interface resolution when it fits in 32 bits, and converted to nanoseconds otherwise.
pub fn build_ts(ts_high: u32, ts_low: u32, ts_offset: i64, resolution: u64) -> Timestamp {
    let resolution = resolution.max(1);
    let ts: u64 = (u64::from(ts_high) << 32) | u64::from(ts_low);
    let secs = ts_offset.saturating_add(i64::try_from(ts / resolution).unwrap_or(i64::MAX));
    let rem = ts % resolution;
    match u32::try_from(resolution) {
        Ok(_) => Timestamp {
            secs,
            fraction: rem as u32,
            units_per_sec: resolution,
        },
        Err(_) => Timestamp {
            secs,
            fraction: (u128::from(rem) * u128::from(NANOS_PER_SEC) / u128::from(resolution))
                as u32,
            units_per_sec: NANOS_PER_SEC,
        },
    }
}

/// Extract `if_tsresol` (default 6) and `if_tsoffset` (default 0) from interface options
pub(crate) fn if_extract_tsoffset_and_tsresol<F>(options: &[PcapNGOption], read_i64: F) -> (u8, i64)
where
    F: Fn([u8; 8]) -> i64,
{
    let mut if_tsresol: u8 = 6;
    let mut if_tsoffset: i64 = 0;
    for opt in options {
        match opt.code {
            OptionCode::IfTsresol => {
                if let Some(&b) = opt.value.first() {
                    if_tsresol = b;
                }
            }
            OptionCode::IfTsoffset => {
                if let Some(Ok(b)) = opt.value.get(..8).map(<[u8; 8]>::try_from) {
                    if_tsoffset = read_i64(b);
                }
            }
            _ => (),
        }
    }
    (if_tsresol, if_tsoffset)
}

/// Resolution to use when `if_tsresol` is invalid
pub(crate) const DEFAULT_TS_RESOLUTION: u64 = MICROS_PER_SEC;
