use std::convert::TryFrom;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use nom::bytes::streaming::{tag, take};
use nom::combinator::map;
use nom::multi::many_till;
use nom::IResult;
use rusticata_macros::{align32, newtype_enum};

use crate::endianness::PcapEndianness;
use crate::error::PcapError;

use super::*;

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct NameRecordType(pub u16);

newtype_enum! {
    impl debug NameRecordType {
        End = 0,
        Ipv4 = 1,
        Ipv6 = 2
    }
}

/// A name resolution record; `record_value` is stored without padding
#[derive(Debug)]
pub struct NameRecord<'a> {
    pub record_type: NameRecordType,
    pub record_value: &'a [u8],
}

/// An address with the names it resolves to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameEntry {
    pub address: IpAddr,
    pub names: Vec<String>,
}

impl<'a> NameRecord<'a> {
    /// Decode an IPv4 or IPv6 record: an address followed by NUL-terminated names
    ///
    /// Returns `None` for other record types, or if the value is too short for the address.
    pub fn entry(&self) -> Option<NameEntry> {
        let (address, names) = match self.record_type {
            NameRecordType::Ipv4 => {
                let b = <[u8; 4]>::try_from(self.record_value.get(..4)?).ok()?;
                (IpAddr::V4(Ipv4Addr::from(b)), &self.record_value[4..])
            }
            NameRecordType::Ipv6 => {
                let b = <[u8; 16]>::try_from(self.record_value.get(..16)?).ok()?;
                (IpAddr::V6(Ipv6Addr::from(b)), &self.record_value[16..])
            }
            _ => return None,
        };
        let names = names
            .split(|&b| b == 0)
            .filter(|s| !s.is_empty())
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect();
        Some(NameEntry { address, names })
    }
}

#[derive(Debug)]
pub struct NameResolutionBlock<'a> {
    /// Records, without the terminating end record
    pub nr: Vec<NameRecord<'a>>,
    pub options: Vec<PcapNGOption<'a>>,
}

impl<'a> NameResolutionBlock<'a> {
    pub fn entries(&self) -> impl Iterator<Item = NameEntry> + '_ {
        self.nr.iter().filter_map(NameRecord::entry)
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En, NameResolutionBlock<'a>>
    for NameResolutionBlock<'a>
{
    const BODY_SZ: usize = 4;

    fn inner_parse(
        _block_type: u32,
        i: &'a [u8],
    ) -> IResult<&'a [u8], NameResolutionBlock<'a>, PcapError> {
        let (i, nr) = parse_name_record_list::<En>(i)?;
        let (i, options) = parse_options::<En>(i)?;
        let block = NameResolutionBlock { nr, options };
        Ok((i, block))
    }
}

fn parse_name_record<'a, En: PcapEndianness>(
    i: &'a [u8],
) -> IResult<&'a [u8], NameRecord<'a>, PcapError> {
    let (i, record_type) = En::parse_u16(i)?;
    let (i, record_len) = En::parse_u16(i)?;
    let aligned_len = align32!(usize::from(record_len));
    let (i, record_value) = take(aligned_len)(i)?;
    let name_record = NameRecord {
        record_type: NameRecordType(record_type),
        record_value: &record_value[..usize::from(record_len)],
    };
    Ok((i, name_record))
}

fn parse_name_record_list<'a, En: PcapEndianness>(
    i: &'a [u8],
) -> IResult<&'a [u8], Vec<NameRecord<'a>>, PcapError> {
    map(
        many_till(parse_name_record::<En>, tag(b"\x00\x00\x00\x00")),
        |(v, _)| v,
    )(i)
}
