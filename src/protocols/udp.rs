//! UDP (RFC 768)

use nom::number::streaming::be_u16;
use nom::IResult;

use crate::decode::{DecodeContext, Decoded, Decoder, ProtocolId};
use crate::error::PcapError;
use crate::utils::complete;

pub const IPPROTO_UDP: u8 = 17;

const UDP_HEADER_SZ: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UdpHeader {
    pub source_port: u16,
    pub destination_port: u16,
    /// Length of header and data, as declared
    pub length: u16,
    pub checksum: u16,
}

pub fn parse_udp_header(i: &[u8]) -> IResult<&[u8], UdpHeader, PcapError> {
    let (i, source_port) = be_u16(i)?;
    let (i, destination_port) = be_u16(i)?;
    let (i, length) = be_u16(i)?;
    let (i, checksum) = be_u16(i)?;
    let header = UdpHeader {
        source_port,
        destination_port,
        length,
        checksum,
    };
    Ok((i, header))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UdpDecoder;

impl Decoder for UdpDecoder {
    type Data = UdpHeader;

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }

    fn decode(
        &self,
        buffer: &[u8],
        _ctx: &DecodeContext,
    ) -> Result<Option<Decoded<UdpHeader>>, PcapError> {
        let (_, header) = complete("udp header", buffer, parse_udp_header)?;
        Ok(Some(Decoded::new(UDP_HEADER_SZ, header)))
    }

    /// The lowest port is usually the well-known service port
    fn next_protocol(&self, header: &UdpHeader) -> Option<ProtocolId> {
        Some(ProtocolId::UdpPort(
            header.source_port.min(header.destination_port),
        ))
    }
}
