//! DNS (RFC 1035)
//!
//! [`DnsMessage::parse`] decodes a complete message: header, then the question, answer,
//! authority and additional sections, in that order. Names are decompressed with a bounded
//! number of pointer jumps, see [`read_name`].
//!
//! Errors in the header, a name, or a record header are fatal for the message. RDATA is more
//! lenient: a record whose RDATA cannot be decoded keeps it as [`RData::Raw`], and the rest of
//! the message is still decoded.

use nom::number::streaming::{be_u16, be_u32};
use nom::sequence::tuple;
use rusticata_macros::newtype_enum;

use crate::decode::{DecodeContext, Decoded, Decoder, ProtocolId};
use crate::error::PcapError;
use crate::utils::complete;

mod name;
mod rdata;

pub use name::*;
pub use rdata::*;

pub const DNS_PORT: u16 = 53;
pub const MDNS_PORT: u16 = 5353;

/// Size of the fixed message header
pub const DNS_HEADER_SZ: usize = 12;

#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct RecordType(pub u16);

newtype_enum! {
impl debug RecordType {
    A = 1,
    NS = 2,
    CNAME = 5,
    SOA = 6,
    PTR = 12,
    MX = 15,
    TXT = 16,
    AAAA = 28,
    SRV = 33,
    OPT = 41,
    ANY = 255,
}
}

#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct DnsClass(pub u16);

newtype_enum! {
impl debug DnsClass {
    IN = 1,
    CS = 2,
    CH = 3,
    HS = 4,
    ANY = 255,
}
}

/// The 16 flag bits of the header
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DnsFlags {
    /// Response (true) or query
    pub qr: bool,
    pub opcode: u8,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    /// Reserved bits
    pub z: u8,
    pub rcode: u8,
}

impl DnsFlags {
    pub fn from_bits(bits: u16) -> DnsFlags {
        DnsFlags {
            qr: bits & 0x8000 != 0,
            opcode: ((bits >> 11) & 0x0f) as u8,
            aa: bits & 0x0400 != 0,
            tc: bits & 0x0200 != 0,
            rd: bits & 0x0100 != 0,
            ra: bits & 0x0080 != 0,
            z: ((bits >> 4) & 0x07) as u8,
            rcode: (bits & 0x0f) as u8,
        }
    }

    pub fn bits(&self) -> u16 {
        (u16::from(self.qr) << 15)
            | (u16::from(self.opcode & 0x0f) << 11)
            | (u16::from(self.aa) << 10)
            | (u16::from(self.tc) << 9)
            | (u16::from(self.rd) << 8)
            | (u16::from(self.ra) << 7)
            | (u16::from(self.z & 0x07) << 4)
            | u16::from(self.rcode & 0x0f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub qtype: RecordType,
    pub qclass: DnsClass,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: String,
    pub rtype: RecordType,
    pub class: DnsClass,
    pub ttl: u32,
    pub rdata_length: u16,
    pub rdata: RData,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnsMessage {
    pub transaction_id: u16,
    pub flags: DnsFlags,
    pub qd_count: u16,
    pub an_count: u16,
    pub ns_count: u16,
    pub ar_count: u16,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub additionals: Vec<ResourceRecord>,
}

impl DnsMessage {
    /// Decode the message at the start of `msg`
    ///
    /// Returns the message and its length; bytes after the last record are not part of it.
    pub fn parse(msg: &[u8]) -> Result<(DnsMessage, usize), PcapError> {
        let (_, (transaction_id, flags, qd_count, an_count, ns_count, ar_count)) = complete(
            "dns header",
            msg,
            tuple((be_u16, be_u16, be_u16, be_u16, be_u16, be_u16)),
        )?;
        let mut offset = DNS_HEADER_SZ;
        let mut questions = Vec::with_capacity(usize::from(qd_count).min(16));
        for idx in 0..qd_count {
            let (question, next) = parse_question(msg, offset)
                .map_err(|e| e.with_context(|| format!("questions[{}]", idx)))?;
            questions.push(question);
            offset = next;
        }
        let (answers, offset) = parse_records(msg, offset, an_count, "answers")?;
        let (authorities, offset) = parse_records(msg, offset, ns_count, "authorities")?;
        let (additionals, offset) = parse_records(msg, offset, ar_count, "additionals")?;
        let message = DnsMessage {
            transaction_id,
            flags: DnsFlags::from_bits(flags),
            qd_count,
            an_count,
            ns_count,
            ar_count,
            questions,
            answers,
            authorities,
            additionals,
        };
        Ok((message, offset))
    }

    /// All resource records, in message order
    pub fn records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.answers
            .iter()
            .chain(self.authorities.iter())
            .chain(self.additionals.iter())
    }
}

fn tail(msg: &[u8], offset: usize) -> &[u8] {
    msg.get(offset..).unwrap_or(&[])
}

fn parse_question(msg: &[u8], offset: usize) -> Result<(Question, usize), PcapError> {
    let (name, consumed) = read_name(msg, offset)?;
    let offset = offset + consumed;
    let (_, (qtype, qclass)) = complete(
        "question type and class",
        tail(msg, offset),
        tuple((be_u16, be_u16)),
    )?;
    let question = Question {
        name,
        qtype: RecordType(qtype),
        qclass: DnsClass(qclass),
    };
    Ok((question, offset + 4))
}

fn parse_record(msg: &[u8], offset: usize) -> Result<(ResourceRecord, usize), PcapError> {
    let (name, consumed) = read_name(msg, offset)?;
    let offset = offset + consumed;
    let (_, (rtype, class, ttl, rdata_length)) = complete(
        "record header",
        tail(msg, offset),
        tuple((be_u16, be_u16, be_u32, be_u16)),
    )?;
    let rdata_offset = offset + 10;
    let rdlen = usize::from(rdata_length);
    let available = tail(msg, rdata_offset).len();
    if available < rdlen {
        return Err(PcapError::Truncated {
            context: "record data".to_owned(),
            available,
            missing: rdlen - available,
        });
    }
    let rtype = RecordType(rtype);
    let record = ResourceRecord {
        name,
        rtype,
        class: DnsClass(class),
        ttl,
        rdata_length,
        rdata: RData::parse(msg, rdata_offset, rdlen, rtype),
    };
    Ok((record, rdata_offset + rdlen))
}

fn parse_records(
    msg: &[u8],
    mut offset: usize,
    count: u16,
    section: &str,
) -> Result<(Vec<ResourceRecord>, usize), PcapError> {
    let mut records = Vec::with_capacity(usize::from(count).min(16));
    for idx in 0..count {
        let (record, next) = parse_record(msg, offset)
            .map_err(|e| e.with_context(|| format!("{}[{}]", section, idx)))?;
        records.push(record);
        offset = next;
    }
    Ok((records, offset))
}

/// Decoder for DNS messages over UDP
///
/// The message is the header of the layer; trailing bytes, if any, are its payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct DnsDecoder;

impl Decoder for DnsDecoder {
    type Data = DnsMessage;

    fn protocol_name(&self) -> &'static str {
        "DNS"
    }

    fn decode(
        &self,
        buffer: &[u8],
        _ctx: &DecodeContext,
    ) -> Result<Option<Decoded<DnsMessage>>, PcapError> {
        let (message, length) = DnsMessage::parse(buffer)?;
        Ok(Some(Decoded::new(length, message)))
    }

    fn next_protocol(&self, _message: &DnsMessage) -> Option<ProtocolId> {
        None
    }
}
