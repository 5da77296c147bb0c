use nom::IResult;

use crate::endianness::PcapEndianness;
use crate::error::PcapError;
use crate::frame::InterfaceInfo;
use crate::linktype::Linktype;

use super::*;

/// An Interface Description Block (IDB) is the container for information
/// describing an interface on which packet data is captured.
#[derive(Debug)]
pub struct InterfaceDescriptionBlock<'a> {
    pub linktype: Linktype,
    pub reserved: u16,
    pub snaplen: u32,
    pub options: Vec<PcapNGOption<'a>>,
    pub if_tsresol: u8,
    pub if_tsoffset: i64,
}

impl<'a> InterfaceDescriptionBlock<'a> {
    /// Decode the interface time resolution, in units per second
    ///
    /// Return the resolution, or `None` if the resolution is invalid (for ex. greater than `2^64`)
    #[inline]
    pub fn ts_resolution(&self) -> Option<u64> {
        build_ts_resolution(self.if_tsresol)
    }

    /// Return the interface timestamp offset
    #[inline]
    pub fn ts_offset(&self) -> i64 {
        self.if_tsoffset
    }

    /// Return the `if_name` option value, if present
    ///
    /// If the option is present multiple times, the first value is returned.
    pub fn if_name(&self) -> Option<&str> {
        options_get_as_str(&self.options, OptionCode::IfName)
    }

    /// Build the interface description registered in a section
    ///
    /// An invalid `if_tsresol` falls back to microseconds.
    pub fn to_interface_info(&self, interface_id: u32) -> InterfaceInfo {
        InterfaceInfo {
            interface_id,
            link_type: self.linktype,
            snap_len: self.snaplen,
            ts_resolution: self.ts_resolution().unwrap_or(DEFAULT_TS_RESOLUTION),
            ts_offset: self.if_tsoffset,
            name: self.if_name().map(str::to_owned),
        }
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En, InterfaceDescriptionBlock<'a>>
    for InterfaceDescriptionBlock<'a>
{
    const BODY_SZ: usize = 8;

    fn inner_parse(
        _block_type: u32,
        i: &'a [u8],
    ) -> IResult<&'a [u8], InterfaceDescriptionBlock<'a>, PcapError> {
        let (i, linktype) = En::parse_u16(i)?;
        let (i, reserved) = En::parse_u16(i)?;
        let (i, snaplen) = En::parse_u32(i)?;
        let (i, options) = parse_options::<En>(i)?;
        let (if_tsresol, if_tsoffset) =
            if_extract_tsoffset_and_tsresol(&options, En::i64_from_bytes);
        let block = InterfaceDescriptionBlock {
            linktype: Linktype::from(linktype),
            reserved,
            snaplen,
            options,
            if_tsresol,
            if_tsoffset,
        };
        Ok((i, block))
    }
}
