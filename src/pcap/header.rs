use nom::number::streaming::be_u32;
use nom::{IResult, Needed};

use crate::endianness::{Endianness, PcapBE, PcapEndianness, PcapLE};
use crate::linktype::Linktype;
use crate::PcapError;

/// Magic number of a big-endian file, as read from its first four bytes
pub const PCAP_MAGIC_BE: u32 = 0xa1b2_c3d4;
/// Magic number of a little-endian file, as read from its first four bytes
pub const PCAP_MAGIC_LE: u32 = 0xd4c3_b2a1;

/// PCAP global header
#[derive(Clone, Debug)]
pub struct PcapHeader {
    /// File format and byte ordering, as read in file order. `0xa1b2c3d4` for big-endian
    /// files, `0xd4c3b2a1` for little-endian files.
    pub magic_number: u32,
    /// Version major number (currently 2)
    pub version_major: u16,
    /// Version minor number (currently 4)
    pub version_minor: u16,
    /// The correction time in seconds between GMT (UTC) and the local timezone of the following packet header timestamps
    pub thiszone: i32,
    /// In theory, the accuracy of time stamps in the capture; in practice, all tools set it to 0
    pub sigfigs: u32,
    /// max len of captured packets, in octets
    pub snaplen: u32,
    /// Data link type
    pub network: Linktype,
}

impl PcapHeader {
    pub const fn size(&self) -> usize {
        24
    }

    pub fn endianness(&self) -> Endianness {
        if self.magic_number == PCAP_MAGIC_BE {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    pub fn is_bigendian(&self) -> bool {
        self.endianness() == Endianness::Big
    }
}

fn parse_header_fields<En: PcapEndianness>(
    magic_number: u32,
    i: &[u8],
) -> IResult<&[u8], PcapHeader, PcapError> {
    let (i, version_major) = En::parse_u16(i)?;
    let (i, version_minor) = En::parse_u16(i)?;
    let (i, thiszone) = En::parse_u32(i)?;
    let (i, sigfigs) = En::parse_u32(i)?;
    let (i, snaplen) = En::parse_u32(i)?;
    let (i, network) = En::parse_u32(i)?;
    let header = PcapHeader {
        magic_number,
        version_major,
        version_minor,
        thiszone: thiszone as i32,
        sigfigs,
        snaplen,
        network: Linktype(network as i32),
    };
    Ok((i, header))
}

/// Read the PCAP global header
///
/// The magic number selects the byte order of the rest of the file. Any value other than
/// [`PCAP_MAGIC_BE`] or [`PCAP_MAGIC_LE`] is rejected.
pub fn parse_pcap_header(i: &[u8]) -> IResult<&[u8], PcapHeader, PcapError> {
    if i.len() < 24 {
        return Err(nom::Err::Incomplete(Needed::new(24 - i.len())));
    }
    let (i, magic_number) = be_u32(i)?;
    match magic_number {
        PCAP_MAGIC_BE => parse_header_fields::<PcapBE>(magic_number, i),
        PCAP_MAGIC_LE => parse_header_fields::<PcapLE>(magic_number, i),
        _ => Err(nom::Err::Error(PcapError::HeaderNotRecognized {
            magic: magic_number,
        })),
    }
}
