//! Byte-order helpers
//!
//! PCAP files declare their byte order once, in the global header. PCAPNG declares it once per
//! section, so the same buffer can mix both. Block interpreters are generic over
//! [`PcapEndianness`] and are instantiated for [`PcapBE`] and [`PcapLE`]; the runtime choice is
//! carried by [`Endianness`].

use std::convert::TryFrom;

use nom::error::ParseError;
use nom::number::streaming::{be_i64, be_u16, be_u32, le_i64, le_u16, le_u32};
use nom::IResult;

/// Byte order of a PCAP file or PCAPNG section
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

impl Endianness {
    /// Read a `u16` at `offset`, or `None` if `i` is too short
    pub fn read_u16(self, i: &[u8], offset: usize) -> Option<u16> {
        let b = <[u8; 2]>::try_from(i.get(offset..offset.checked_add(2)?)?).ok()?;
        Some(match self {
            Endianness::Big => u16::from_be_bytes(b),
            Endianness::Little => u16::from_le_bytes(b),
        })
    }

    /// Read a `u32` at `offset`, or `None` if `i` is too short
    pub fn read_u32(self, i: &[u8], offset: usize) -> Option<u32> {
        let b = <[u8; 4]>::try_from(i.get(offset..offset.checked_add(4)?)?).ok()?;
        Some(match self {
            Endianness::Big => u32::from_be_bytes(b),
            Endianness::Little => u32::from_le_bytes(b),
        })
    }
}

pub(crate) struct PcapBE;
pub(crate) struct PcapLE;

pub(crate) trait PcapEndianness {
    const ENDIANNESS: Endianness;

    fn parse_u16<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u16, E>;
    fn parse_u32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u32, E>;
    fn parse_i64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i64, E>;

    fn i64_from_bytes(i: [u8; 8]) -> i64;
}

impl PcapEndianness for PcapBE {
    const ENDIANNESS: Endianness = Endianness::Big;

    #[inline]
    fn parse_u16<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u16, E> {
        be_u16(i)
    }

    #[inline]
    fn parse_u32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u32, E> {
        be_u32(i)
    }

    #[inline]
    fn parse_i64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i64, E> {
        be_i64(i)
    }

    #[inline]
    fn i64_from_bytes(i: [u8; 8]) -> i64 {
        i64::from_be_bytes(i)
    }
}

impl PcapEndianness for PcapLE {
    const ENDIANNESS: Endianness = Endianness::Little;

    #[inline]
    fn parse_u16<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u16, E> {
        le_u16(i)
    }

    #[inline]
    fn parse_u32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u32, E> {
        le_u32(i)
    }

    #[inline]
    fn parse_i64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i64, E> {
        le_i64(i)
    }

    #[inline]
    fn i64_from_bytes(i: [u8; 8]) -> i64 {
        i64::from_le_bytes(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_at_offset() {
        let b = [0x00, 0x01, 0x02, 0x03, 0x04];
        assert_eq!(Endianness::Big.read_u32(&b, 1), Some(0x0102_0304));
        assert_eq!(Endianness::Little.read_u32(&b, 1), Some(0x0403_0201));
        assert_eq!(Endianness::Big.read_u16(&b, 3), Some(0x0304));
        assert_eq!(Endianness::Big.read_u32(&b, 2), None);
        assert_eq!(Endianness::Little.read_u16(&b, usize::MAX), None);
    }
}
