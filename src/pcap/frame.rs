use nom::bytes::streaming::take;
use nom::IResult;

use crate::endianness::{PcapBE, PcapEndianness, PcapLE};
use crate::frame::{Frame, Timestamp};
use crate::linktype::Linktype;
use crate::PcapError;

/// Size of a record header
pub const PCAP_RECORD_HDR_SZ: usize = 16;

/// Container for network data in legacy Pcap files
#[derive(Debug)]
pub struct LegacyPcapBlock<'a> {
    pub ts_sec: u32,
    pub ts_usec: u32,
    pub caplen: u32,
    pub origlen: u32,
    pub data: &'a [u8],
}

impl<'a> LegacyPcapBlock<'a> {
    /// Convert to a [`Frame`], given the link type from the file header
    pub fn into_frame(self, link_type: Linktype) -> Frame<'a> {
        Frame {
            timestamp: Timestamp::from_micros(self.ts_sec, self.ts_usec),
            original_length: self.origlen,
            captured_length: self.caplen,
            interface: None,
            link_type,
            data: self.data,
        }
    }
}

pub(crate) fn parse_pcap_frame_generic<En: PcapEndianness>(
    i: &[u8],
) -> IResult<&[u8], LegacyPcapBlock<'_>, PcapError> {
    let (i, ts_sec) = En::parse_u32(i)?;
    let (i, ts_usec) = En::parse_u32(i)?;
    let (i, caplen) = En::parse_u32(i)?;
    let (i, origlen) = En::parse_u32(i)?;
    let (i, data) = take(caplen as usize)(i)?;
    let block = LegacyPcapBlock {
        ts_sec,
        ts_usec,
        caplen,
        origlen,
        data,
    };
    Ok((i, block))
}

/// Read a PCAP record header and data (little-endian)
///
/// Each PCAP record starts with a small header, and is followed by packet data.
/// The packet data format depends on the LinkType.
pub fn parse_pcap_frame(i: &[u8]) -> IResult<&[u8], LegacyPcapBlock<'_>, PcapError> {
    parse_pcap_frame_generic::<PcapLE>(i)
}

/// Read a PCAP record header and data (big-endian)
pub fn parse_pcap_frame_be(i: &[u8]) -> IResult<&[u8], LegacyPcapBlock<'_>, PcapError> {
    parse_pcap_frame_generic::<PcapBE>(i)
}
