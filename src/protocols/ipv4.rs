//! IPv4 (RFC 791)

use std::net::Ipv4Addr;

use nom::bytes::streaming::take;
use nom::number::streaming::{be_u16, be_u32, be_u8};
use nom::IResult;

use crate::decode::{DecodeContext, Decoded, Decoder, ProtocolId};
use crate::error::PcapError;
use crate::utils::{complete, require};

const IPV4_MIN_HEADER_SZ: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version: u8,
    /// Header length, in 32-bit words
    pub ihl: u8,
    pub dscp: u8,
    pub ecn: u8,
    pub total_length: u16,
    pub identification: u16,
    /// Reserved, DF and MF bits
    pub flags: u8,
    /// Fragment offset, in 8-byte units
    pub fragment_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    /// True if the header checksum is correct; it is reported, never enforced
    pub checksum_valid: bool,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub options: Vec<u8>,
}

impl Ipv4Header {
    pub fn header_length(&self) -> usize {
        usize::from(self.ihl) * 4
    }

    pub fn more_fragments(&self) -> bool {
        self.flags & 0b001 != 0
    }

    /// True for every fragment but the first one
    pub fn is_fragment_tail(&self) -> bool {
        self.fragment_offset != 0
    }
}

/// One's complement sum of the 16-bit words of `i`; a valid header sums to `0xffff`
fn ones_complement_sum(i: &[u8]) -> u16 {
    let mut sum: u32 = i
        .chunks(2)
        .map(|c| u32::from(c[0]) << 8 | u32::from(*c.get(1).unwrap_or(&0)))
        .sum();
    while sum > 0xffff {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    sum as u16
}

fn parse_ipv4_header(i: &[u8]) -> IResult<&[u8], Ipv4Header, PcapError> {
    let start = i;
    let (i, version_ihl) = be_u8(i)?;
    let (i, tos) = be_u8(i)?;
    let (i, total_length) = be_u16(i)?;
    let (i, identification) = be_u16(i)?;
    let (i, flags_fragment) = be_u16(i)?;
    let (i, ttl) = be_u8(i)?;
    let (i, protocol) = be_u8(i)?;
    let (i, checksum) = be_u16(i)?;
    let (i, source) = be_u32(i)?;
    let (i, destination) = be_u32(i)?;
    let ihl = version_ihl & 0x0f;
    let options_len = (usize::from(ihl) * 4).saturating_sub(IPV4_MIN_HEADER_SZ);
    let (i, options) = take(options_len)(i)?;
    let header_len = start.len() - i.len();
    let header = Ipv4Header {
        version: version_ihl >> 4,
        ihl,
        dscp: tos >> 2,
        ecn: tos & 0b11,
        total_length,
        identification,
        flags: (flags_fragment >> 13) as u8,
        fragment_offset: flags_fragment & 0x1fff,
        ttl,
        protocol,
        checksum,
        checksum_valid: ones_complement_sum(&start[..header_len]) == 0xffff,
        source: Ipv4Addr::from(source),
        destination: Ipv4Addr::from(destination),
        options: options.to_vec(),
    };
    Ok((i, header))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Ipv4Decoder;

impl Decoder for Ipv4Decoder {
    type Data = Ipv4Header;

    fn protocol_name(&self) -> &'static str {
        "IPv4"
    }

    fn decode(
        &self,
        buffer: &[u8],
        _ctx: &DecodeContext,
    ) -> Result<Option<Decoded<Ipv4Header>>, PcapError> {
        require("ipv4 header", buffer, IPV4_MIN_HEADER_SZ)?;
        if buffer[0] >> 4 != 4 {
            return Ok(None);
        }
        let ihl = buffer[0] & 0x0f;
        if usize::from(ihl) * 4 < IPV4_MIN_HEADER_SZ {
            return Err(PcapError::InvalidField {
                protocol: "IPv4",
                field: "ihl",
                reason: format!("{} words is below the 5-word minimum", ihl),
            });
        }
        let (_, header) = complete("ipv4 header", buffer, parse_ipv4_header)?;
        Ok(Some(Decoded::new(header.header_length(), header)))
    }

    /// Non-first fragments carry no transport header: decoding stops there
    fn next_protocol(&self, header: &Ipv4Header) -> Option<ProtocolId> {
        if header.is_fragment_tail() {
            None
        } else {
            Some(ProtocolId::IpProtocol(header.protocol))
        }
    }
}
