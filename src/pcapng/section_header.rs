use nom::IResult;

use crate::endianness::{Endianness, PcapEndianness};
use crate::error::PcapError;

use super::*;

/// The Section Header Block (SHB) identifies the
/// beginning of a section of the capture capture file.
///
/// The
/// Section Header Block does not contain data but it rather identifies a
/// list of blocks (interfaces, packets) that are logically correlated.
#[derive(Debug)]
pub struct SectionHeaderBlock<'a> {
    /// Byte order of the section, given by the byte-order magic
    pub endianness: Endianness,
    pub major_version: u16,
    pub minor_version: u16,
    /// Length of the section in bytes, or -1 if not specified
    pub section_len: i64,
    pub options: Vec<PcapNGOption<'a>>,
}

impl<'a> SectionHeaderBlock<'a> {
    /// Return the `shb_userappl` option value (the writing application), if present and valid
    /// UTF-8
    pub fn shb_userappl(&self) -> Option<&str> {
        options_get_as_str(&self.options, OptionCode::ShbUserAppl)
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En, SectionHeaderBlock<'a>>
    for SectionHeaderBlock<'a>
{
    const BODY_SZ: usize = 16;

    fn inner_parse(
        _block_type: u32,
        i: &'a [u8],
    ) -> IResult<&'a [u8], SectionHeaderBlock<'a>, PcapError> {
        // the byte-order magic has already been checked by the framer
        let (i, _bom) = En::parse_u32(i)?;
        let (i, major_version) = En::parse_u16(i)?;
        let (i, minor_version) = En::parse_u16(i)?;
        let (i, section_len) = En::parse_i64(i)?;
        let (i, options) = parse_options::<En>(i)?;
        let block = SectionHeaderBlock {
            endianness: En::ENDIANNESS,
            major_version,
            minor_version,
            section_len,
            options,
        };
        Ok((i, block))
    }
}
