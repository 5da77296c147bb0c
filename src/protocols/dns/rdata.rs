//! Resource record data

use std::convert::TryFrom;
use std::net::{Ipv4Addr, Ipv6Addr};

use nom::number::streaming::{be_u16, be_u32};

use super::name::read_name;
use super::RecordType;
use crate::error::PcapError;
use crate::utils::complete;

/// Decoded RDATA
///
/// Types without a dedicated variant, and RDATA that could not be decoded, are kept as `Raw`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    NS(String),
    CNAME(String),
    PTR(String),
    MX {
        preference: u16,
        exchange: String,
    },
    SOA {
        mname: String,
        rname: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    /// Character strings, without their length bytes
    TXT(Vec<Vec<u8>>),
    SRV {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },
    Raw(Vec<u8>),
}

/// RDATA being decoded: the whole message (for compression pointers) and the RDATA bounds
struct RDataReader<'a> {
    msg: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> RDataReader<'a> {
    fn rest(&self) -> &'a [u8] {
        self.msg.get(self.pos..self.end).unwrap_or(&[])
    }

    fn take_rest(&mut self) -> &'a [u8] {
        let rest = self.rest();
        self.pos = self.end;
        rest
    }

    fn name(&mut self) -> Result<String, PcapError> {
        let (name, consumed) = read_name(&self.msg[..self.end], self.pos)?;
        self.pos += consumed;
        Ok(name)
    }

    fn u16(&mut self) -> Result<u16, PcapError> {
        let (_, v) = complete("rdata", self.rest(), be_u16)?;
        self.pos += 2;
        Ok(v)
    }

    fn u32(&mut self) -> Result<u32, PcapError> {
        let (_, v) = complete("rdata", self.rest(), be_u32)?;
        self.pos += 4;
        Ok(v)
    }
}

impl RData {
    /// Decode the `rdlength` bytes at `offset` in the message `msg`
    ///
    /// Never fails: unknown types, or RDATA too short for its fields, give [`RData::Raw`].
    /// Names are bounded by the RDATA, but can point to any earlier part of the message.
    pub fn parse(msg: &[u8], offset: usize, rdlength: usize, rtype: RecordType) -> RData {
        let raw = msg.get(offset..offset + rdlength).unwrap_or(&[]);
        match parse_typed(msg, offset, offset + rdlength, rtype) {
            Ok(Some(rdata)) => rdata,
            _ => RData::Raw(raw.to_vec()),
        }
    }

    /// Name contained in the record, for the types that hold one
    pub fn name(&self) -> Option<&str> {
        match self {
            RData::NS(n) | RData::CNAME(n) | RData::PTR(n) => Some(n),
            RData::MX { exchange, .. } => Some(exchange),
            RData::SRV { target, .. } => Some(target),
            _ => None,
        }
    }
}

fn parse_typed(
    msg: &[u8],
    offset: usize,
    end: usize,
    rtype: RecordType,
) -> Result<Option<RData>, PcapError> {
    if end > msg.len() {
        return Ok(None);
    }
    let mut r = RDataReader {
        msg,
        pos: offset,
        end,
    };
    let rdata = match rtype {
        RecordType::A => match <[u8; 4]>::try_from(r.take_rest()) {
            Ok(b) => RData::A(Ipv4Addr::from(b)),
            Err(_) => return Ok(None),
        },
        RecordType::AAAA => match <[u8; 16]>::try_from(r.take_rest()) {
            Ok(b) => RData::AAAA(Ipv6Addr::from(b)),
            Err(_) => return Ok(None),
        },
        RecordType::NS => RData::NS(r.name()?),
        RecordType::CNAME => RData::CNAME(r.name()?),
        RecordType::PTR => RData::PTR(r.name()?),
        RecordType::MX => {
            let preference = r.u16()?;
            let exchange = r.name()?;
            RData::MX {
                preference,
                exchange,
            }
        }
        RecordType::SOA => {
            let mname = r.name()?;
            let rname = r.name()?;
            RData::SOA {
                mname,
                rname,
                serial: r.u32()?,
                refresh: r.u32()?,
                retry: r.u32()?,
                expire: r.u32()?,
                minimum: r.u32()?,
            }
        }
        RecordType::TXT => {
            let mut strings = Vec::new();
            let mut rest = r.take_rest();
            while let Some((&len, tail)) = rest.split_first() {
                let s = match tail.get(..usize::from(len)) {
                    Some(s) => s,
                    None => return Ok(None),
                };
                strings.push(s.to_vec());
                rest = &tail[usize::from(len)..];
            }
            RData::TXT(strings)
        }
        RecordType::SRV => {
            let priority = r.u16()?;
            let weight = r.u16()?;
            let port = r.u16()?;
            let target = r.name()?;
            RData::SRV {
                priority,
                weight,
                port,
                target,
            }
        }
        _ => return Ok(None),
    };
    // bytes left after the last field
    if r.pos != r.end {
        return Ok(None);
    }
    Ok(Some(rdata))
}
