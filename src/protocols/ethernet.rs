//! Ethernet II

use std::borrow::Cow;

use nom::bytes::streaming::take;
use nom::number::streaming::be_u16;
use nom::IResult;

use crate::decode::{DecodeContext, Decoded, Decoder, ProtocolId};
use crate::error::PcapError;
use crate::utils::complete;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;
pub const ETHERTYPE_VLAN: u16 = 0x8100;
pub const ETHERTYPE_IPV6: u16 = 0x86dd;
pub const ETHERTYPE_QINQ: u16 = 0x88a8;

/// Values up to this one are IEEE 802.3 lengths, not EtherTypes
const MAX_8023_LENGTH: u16 = 1500;

/// Identifier of the payload of an IEEE 802.3 frame
pub const LLC: &str = "llc";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EthernetHeader {
    pub destination: [u8; 6],
    pub source: [u8; 6],
    /// Tag control information of the 802.1Q / 802.1ad tags, outermost first
    pub vlan_tags: Vec<u16>,
    /// EtherType of the payload, or 802.3 length
    pub ether_type: u16,
}

impl EthernetHeader {
    /// Length of the header on the wire, tags included
    pub fn header_length(&self) -> usize {
        14 + 4 * self.vlan_tags.len()
    }
}

fn mac(i: &[u8]) -> IResult<&[u8], [u8; 6], PcapError> {
    let (i, b) = take(6usize)(i)?;
    let mut mac = [0u8; 6];
    mac.copy_from_slice(b);
    Ok((i, mac))
}

pub fn parse_ethernet_header(i: &[u8]) -> IResult<&[u8], EthernetHeader, PcapError> {
    let (i, destination) = mac(i)?;
    let (i, source) = mac(i)?;
    let (mut i, mut ether_type) = be_u16(i)?;
    let mut vlan_tags = Vec::new();
    while ether_type == ETHERTYPE_VLAN || ether_type == ETHERTYPE_QINQ {
        let (rem, tci) = be_u16(i)?;
        let (rem, next) = be_u16(rem)?;
        vlan_tags.push(tci);
        ether_type = next;
        i = rem;
    }
    let header = EthernetHeader {
        destination,
        source,
        vlan_tags,
        ether_type,
    };
    Ok((i, header))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EthernetDecoder;

impl Decoder for EthernetDecoder {
    type Data = EthernetHeader;

    fn protocol_name(&self) -> &'static str {
        "Ethernet"
    }

    fn decode(
        &self,
        buffer: &[u8],
        _ctx: &DecodeContext,
    ) -> Result<Option<Decoded<EthernetHeader>>, PcapError> {
        let (_, header) = complete("ethernet header", buffer, parse_ethernet_header)?;
        Ok(Some(Decoded::new(header.header_length(), header)))
    }

    fn next_protocol(&self, header: &EthernetHeader) -> Option<ProtocolId> {
        if header.ether_type <= MAX_8023_LENGTH {
            Some(ProtocolId::Named(Cow::Borrowed(LLC)))
        } else {
            Some(ProtocolId::EtherType(header.ether_type))
        }
    }
}
