use nom::IResult;

use crate::endianness::PcapEndianness;
use crate::error::PcapError;

use super::*;

/// The Simple Packet Block (SPB) is a lightweight container for storing
/// the packets coming from the network.
///
/// This struct is a thin abstraction layer, and stores the raw block data.
/// For ex the `data` field is stored with the padding: the captured length
/// depends on the snap length of interface 0, see [`SimplePacketBlock::packet_data`].
#[derive(Debug)]
pub struct SimplePacketBlock<'a> {
    /// Original packet length
    pub origlen: u32,
    pub data: &'a [u8],
}

impl<'a> SimplePacketBlock<'a> {
    /// Captured bytes, given the snap length of interface 0 (0 meaning unlimited)
    pub fn packet_data(&self, snaplen: u32) -> &'a [u8] {
        let mut caplen = self.origlen as usize;
        if snaplen != 0 {
            caplen = caplen.min(snaplen as usize);
        }
        &self.data[..caplen.min(self.data.len())]
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En, SimplePacketBlock<'a>>
    for SimplePacketBlock<'a>
{
    const BODY_SZ: usize = 4;

    fn inner_parse(
        _block_type: u32,
        i: &'a [u8],
    ) -> IResult<&'a [u8], SimplePacketBlock<'a>, PcapError> {
        let (data, origlen) = En::parse_u32(i)?;
        let block = SimplePacketBlock { origlen, data };
        Ok((&[], block))
    }
}
