use nom::bytes::streaming::take;
use nom::{Err, IResult};
use rusticata_macros::align32;

use crate::endianness::PcapEndianness;
use crate::error::PcapError;
use crate::frame::Timestamp;

use super::*;

/// An Enhanced Packet Block (EPB) is the standard container for storing
/// the packets coming from the network.
///
/// `data` holds the `caplen` captured bytes, without padding.
#[derive(Debug)]
pub struct EnhancedPacketBlock<'a> {
    pub if_id: u32,
    pub ts_high: u32,
    pub ts_low: u32,
    /// Captured packet length
    pub caplen: u32,
    /// Original packet length
    pub origlen: u32,
    pub data: &'a [u8],
    pub options: Vec<PcapNGOption<'a>>,
}

impl<'a> EnhancedPacketBlock<'a> {
    /// Decode the packet timestamp
    ///
    /// To decode the timestamp, the resolution and offset are required.
    /// These values are stored as options in the [`InterfaceDescriptionBlock`]
    /// matching the interface ID.
    #[inline]
    pub fn decode_ts(&self, ts_offset: i64, resolution: u64) -> Timestamp {
        build_ts(self.ts_high, self.ts_low, ts_offset, resolution)
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En, EnhancedPacketBlock<'a>>
    for EnhancedPacketBlock<'a>
{
    const BODY_SZ: usize = 20;

    fn inner_parse(
        _block_type: u32,
        i: &'a [u8],
    ) -> IResult<&'a [u8], EnhancedPacketBlock<'a>, PcapError> {
        let (i, if_id) = En::parse_u32(i)?;
        let (i, ts_high) = En::parse_u32(i)?;
        let (i, ts_low) = En::parse_u32(i)?;
        let (i, caplen) = En::parse_u32(i)?;
        let (i, origlen) = En::parse_u32(i)?;
        if caplen as usize > i.len() {
            return Err(Err::Error(PcapError::CapturedLengthOverflow {
                captured_len: caplen,
                available: i.len(),
            }));
        }
        // tolerate a missing padding at the end of the body
        let padded_len = align32!(caplen as usize).min(i.len());
        let (i, data) = take(padded_len)(i)?;
        let (i, options) = parse_options::<En>(i)?;
        let block = EnhancedPacketBlock {
            if_id,
            ts_high,
            ts_low,
            caplen,
            origlen,
            data: &data[..caplen as usize],
            options,
        };
        Ok((i, block))
    }
}
