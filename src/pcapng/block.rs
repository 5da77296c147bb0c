use crate::endianness::{Endianness, PcapBE, PcapEndianness, PcapLE};
use crate::error::PcapError;
use crate::utils::{complete, require};

use super::*;

/// Size of the generic block envelope (type, leading and trailing lengths)
pub const BLOCK_ENVELOPE_SZ: usize = 12;

/// A block, as delimited by the generic framer
///
/// `body` excludes the 8-byte header and the trailing length. `bytes_read` is the total length
/// of the block, and the distance to the next one.
#[derive(Debug, Clone, Copy)]
pub struct RawBlock<'a> {
    pub block_type: u32,
    /// Byte order the lengths were read with (for a section header, the one found in its body)
    pub endianness: Endianness,
    pub total_length: u32,
    pub body: &'a [u8],
    pub bytes_read: usize,
}

/// Byte order of a section, from the byte-order magic of its section header block
///
/// `i` must start with the block (the magic is at offset 8).
pub fn section_endianness(i: &[u8]) -> Result<Endianness, PcapError> {
    require("section header byte-order magic", i, 12)?;
    match Endianness::Big.read_u32(i, 8) {
        Some(BOM_MAGIC) => Ok(Endianness::Big),
        Some(m) if m.swap_bytes() == BOM_MAGIC => Ok(Endianness::Little),
        Some(magic) => Err(PcapError::HeaderNotRecognized { magic }),
        None => Err(PcapError::HeaderNotRecognized { magic: 0 }),
    }
}

/// Delimit the block starting at `offset` in `i`
///
/// Lengths are read with `endianness`, except for section header blocks, which carry their own
/// byte-order magic. The trailing length must repeat the leading one.
pub fn read_block(
    i: &[u8],
    offset: usize,
    endianness: Endianness,
) -> Result<RawBlock<'_>, PcapError> {
    let data = i.get(offset..).unwrap_or(&[]);
    require("pcapng block header", data, 8)?;
    let block_type = endianness
        .read_u32(data, 0)
        .ok_or(PcapError::Nom(nom::error::ErrorKind::Eof))?;
    let endianness = if block_type == SHB_MAGIC {
        section_endianness(data)?
    } else {
        endianness
    };
    let total_length = endianness
        .read_u32(data, 4)
        .ok_or(PcapError::Nom(nom::error::ErrorKind::Eof))?;
    if (total_length as usize) < BLOCK_ENVELOPE_SZ {
        return Err(PcapError::BlockTooShort {
            offset,
            length: total_length,
        });
    }
    if total_length % 4 != 0 {
        return Err(PcapError::Misaligned {
            offset,
            length: total_length,
        });
    }
    let len = total_length as usize;
    require("pcapng block", data, len)?;
    let trailing = endianness
        .read_u32(data, len - 4)
        .ok_or(PcapError::Nom(nom::error::ErrorKind::Eof))?;
    if trailing != total_length {
        return Err(PcapError::BlockLengthMismatch {
            leading: total_length,
            leading_offset: offset + 4,
            trailing,
            trailing_offset: offset + len - 4,
        });
    }
    Ok(RawBlock {
        block_type,
        endianness,
        total_length,
        body: &data[8..len - 4],
        bytes_read: len,
    })
}

/// A block from a PcapNG file
#[derive(Debug)]
pub enum Block<'a> {
    SectionHeader(SectionHeaderBlock<'a>),
    InterfaceDescription(InterfaceDescriptionBlock<'a>),
    EnhancedPacket(EnhancedPacketBlock<'a>),
    SimplePacket(SimplePacketBlock<'a>),
    NameResolution(NameResolutionBlock<'a>),
    Unknown(UnknownBlock<'a>),
}

/// A block with a type this crate does not interpret
#[derive(Debug)]
pub struct UnknownBlock<'a> {
    pub block_type: u32,
    pub data: &'a [u8],
}

impl<'a> RawBlock<'a> {
    /// Interpret the body according to the block type
    pub fn interpret(&self) -> Result<Block<'a>, PcapError> {
        match self.endianness {
            Endianness::Big => interpret_block::<PcapBE>(self),
            Endianness::Little => interpret_block::<PcapLE>(self),
        }
    }
}

fn interpret_block<'a, En: PcapEndianness>(raw: &RawBlock<'a>) -> Result<Block<'a>, PcapError> {
    match raw.block_type {
        SHB_MAGIC => {
            ng_block_parser::<SectionHeaderBlock, En, _>("section header block", raw)
                .map(Block::SectionHeader)
        }
        IDB_MAGIC => {
            ng_block_parser::<InterfaceDescriptionBlock, En, _>("interface description block", raw)
                .map(Block::InterfaceDescription)
        }
        EPB_MAGIC => ng_block_parser::<EnhancedPacketBlock, En, _>("enhanced packet block", raw)
            .map(Block::EnhancedPacket),
        SPB_MAGIC => ng_block_parser::<SimplePacketBlock, En, _>("simple packet block", raw)
            .map(Block::SimplePacket),
        NRB_MAGIC => ng_block_parser::<NameResolutionBlock, En, _>("name resolution block", raw)
            .map(Block::NameResolution),
        block_type => Ok(Block::Unknown(UnknownBlock {
            block_type,
            data: raw.body,
        })),
    }
}

pub(crate) trait PcapNGBlockParser<'a, En: PcapEndianness, O: 'a> {
    /// Minimum body size, in bytes
    const BODY_SZ: usize;

    // caller function must have checked the block type and the body length
    fn inner_parse(block_type: u32, body: &'a [u8]) -> nom::IResult<&'a [u8], O, PcapError>;
}

/// Interpret the body of `raw` with the parser of block `P`
pub(crate) fn ng_block_parser<'a, P, En, O>(
    context: &str,
    raw: &RawBlock<'a>,
) -> Result<O, PcapError>
where
    P: PcapNGBlockParser<'a, En, O>,
    En: PcapEndianness,
    O: 'a,
{
    require(context, raw.body, P::BODY_SZ)?;
    complete(context, raw.body, |i| P::inner_parse(raw.block_type, i)).map(|(_, o)| o)
}
