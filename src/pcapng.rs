//! PCAPNG file format
//!
//! See <https://github.com/pcapng/pcapng> for details.
//!
//! A capture file is organized in blocks. Blocks are organized in sections, each section
//! starting with a Section Header Block (SHB), and followed by blocks (interface description,
//! packets, name resolution, etc.).
//! A file is usually composed of one section, but can contain multiple sections. When a SHB is
//! encountered, this means a new section starts (and all information about previous section has to
//! be flushed, like interfaces).
//!
//! Parsing is done in two steps. [`read_block`] is the generic framer: it only checks the block
//! envelope (type, leading and trailing lengths) and returns a [`RawBlock`]. Then
//! [`RawBlock::interpret`] parses the body according to the block type. The
//! [`PcapNGReader`] iterator drives both steps and tracks the current [`Section`].
//!
//! ## Endianness
//!
//! The endianness of a block is indicated by the Section Header Block that started the section
//! containing this block. Since a file can contain several sections, a single file can contain
//! both endianness variants.

mod block;
mod enhanced_packet;
mod interface_description;
mod name_resolution;
mod option;
mod reader;
mod section;
mod section_header;
mod simple_packet;
mod time;

pub use block::*;
pub use enhanced_packet::*;
pub use interface_description::*;
pub use name_resolution::*;
pub use option::*;
pub use reader::*;
pub use section::*;
pub use section_header::*;
pub use simple_packet::*;
pub use time::*;

/// Section Header Block magic
pub const SHB_MAGIC: u32 = 0x0A0D_0D0A;
/// Interface Description Block magic
pub const IDB_MAGIC: u32 = 0x0000_0001;
/// Simple Packet Block magic
pub const SPB_MAGIC: u32 = 0x0000_0003;
/// Name Resolution Block magic
pub const NRB_MAGIC: u32 = 0x0000_0004;
/// Enhanced Packet Block magic
pub const EPB_MAGIC: u32 = 0x0000_0006;

/// Byte Order magic
pub const BOM_MAGIC: u32 = 0x1A2B_3C4D;

#[cfg(test)]
pub(crate) mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    use super::*;
    use crate::endianness::Endianness;
    use crate::logging::tests::CaptureLog;
    use crate::logging::Logger;
    use crate::{Linktype, PcapError};

    /// Build a block with the given body, padding the body to 4 bytes
    pub(crate) fn block(en: Endianness, block_type: u32, body: &[u8]) -> Vec<u8> {
        let padded = (body.len() + 3) & !3;
        let total = (padded + 12) as u32;
        let mut v = Vec::with_capacity(total as usize);
        let w32 = |v: &mut Vec<u8>, x: u32| match en {
            Endianness::Big => v.extend_from_slice(&x.to_be_bytes()),
            Endianness::Little => v.extend_from_slice(&x.to_le_bytes()),
        };
        w32(&mut v, block_type);
        w32(&mut v, total);
        v.extend_from_slice(body);
        v.resize(8 + padded, 0);
        w32(&mut v, total);
        v
    }

    pub(crate) fn shb_le() -> Vec<u8> {
        block(
            Endianness::Little,
            SHB_MAGIC,
            &[
                0x4d, 0x3c, 0x2b, 0x1a, 1, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
            ],
        )
    }

    /// Little-endian IDB with the given linktype, snaplen 0 and `if_tsresol` = 9 (nanoseconds)
    pub(crate) fn idb_le(linktype: u16, name: &str) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&linktype.to_le_bytes());
        body.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
        // if_name
        body.extend_from_slice(&2u16.to_le_bytes());
        body.extend_from_slice(&(name.len() as u16).to_le_bytes());
        body.extend_from_slice(name.as_bytes());
        body.resize((body.len() + 3) & !3, 0);
        // if_tsresol
        body.extend_from_slice(&[9, 0, 1, 0, 9, 0, 0, 0]);
        // opt_endofopt
        body.extend_from_slice(&[0, 0, 0, 0]);
        block(Endianness::Little, IDB_MAGIC, &body)
    }

    pub(crate) fn epb_le(if_id: u32, ts: u64, data: &[u8], origlen: u32) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&if_id.to_le_bytes());
        body.extend_from_slice(&((ts >> 32) as u32).to_le_bytes());
        body.extend_from_slice(&(ts as u32).to_le_bytes());
        body.extend_from_slice(&(data.len() as u32).to_le_bytes());
        body.extend_from_slice(&origlen.to_le_bytes());
        body.extend_from_slice(data);
        block(Endianness::Little, EPB_MAGIC, &body)
    }

    fn capture_reader(buf: &[u8]) -> (PcapNGReader<'_>, Arc<CaptureLog>) {
        let sink = Arc::new(CaptureLog::default());
        let reader = PcapNGReader::from_slice(buf)
            .expect("reader")
            .with_logger(Logger::from_arc(sink.clone()));
        (reader, sink)
    }

    #[test]
    fn read_packets_with_interface() {
        let mut buf = shb_le();
        buf.extend(idb_le(1, "eth0"));
        buf.extend(epb_le(0, 1_500_000_000_250, &[1, 2, 3, 4, 5], 5));
        let (reader, sink) = capture_reader(&buf);
        let frames: Vec<_> = reader.collect();
        assert_eq!(frames.len(), 1);
        let f = &frames[0];
        assert_eq!(f.data, &[1, 2, 3, 4, 5]);
        assert_eq!(f.link_type, Linktype::ETHERNET);
        assert_eq!(f.timestamp.secs, 1500);
        assert_eq!(f.timestamp.fraction, 250);
        assert_eq!(f.timestamp.units_per_sec, 1_000_000_000);
        let iface = f.interface.as_ref().expect("interface");
        assert_eq!(iface.name.as_deref(), Some("eth0"));
        assert!(sink.messages().iter().all(|(l, _)| *l > log::Level::Warn));
    }

    #[test]
    fn unknown_interface_and_unknown_block_are_skipped() {
        let mut buf = shb_le();
        buf.extend(idb_le(101, "lo"));
        buf.extend(block(Endianness::Little, 0x0bad, &[1, 2, 3, 4]));
        buf.extend(epb_le(3, 0, &[9], 1));
        buf.extend(epb_le(0, 0, &[7], 1));
        let (reader, sink) = capture_reader(&buf);
        let frames: Vec<_> = reader.collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, &[7]);
        assert_eq!(frames[0].link_type, Linktype::RAW);
        let msgs = sink.messages();
        assert!(msgs
            .iter()
            .any(|(l, m)| *l == log::Level::Warn && m.contains("unknown interface id 3")));
        assert!(msgs
            .iter()
            .any(|(l, m)| *l == log::Level::Debug && m.contains("0x00000bad")));
    }

    #[test]
    fn resync_after_bad_block() {
        let mut buf = shb_le();
        buf.extend(idb_le(1, "eth0"));
        // leading length 16, trailing length 12
        let mut bad = epb_le(0, 0, &[], 0)[..16].to_vec();
        bad[4] = 16;
        bad[12..16].copy_from_slice(&12u32.to_le_bytes());
        buf.extend(&bad);
        buf.extend(epb_le(0, 0, &[0xaa, 0xbb], 2));
        let (mut reader, sink) = capture_reader(&buf);
        let frame = reader.next().expect("frame after resync");
        assert_eq!(frame.data, &[0xaa, 0xbb]);
        assert!(reader.next().is_none());
        let msgs = sink.messages();
        assert!(msgs.iter().any(|(_, m)| m.contains("leading length 16")));
    }

    #[test]
    fn invalid_block_body_is_skipped() {
        let mut buf = shb_le();
        buf.extend(idb_le(1, "eth0"));
        // EPB whose captured length overflows the block
        let mut epb = epb_le(0, 0, &[1, 2, 3, 4], 4);
        epb[20..24].copy_from_slice(&100u32.to_le_bytes());
        buf.extend(epb);
        buf.extend(epb_le(0, 0, &[5], 1));
        let (reader, sink) = capture_reader(&buf);
        let frames: Vec<_> = reader.collect();
        assert_eq!(frames.len(), 1);
        assert!(sink
            .messages()
            .iter()
            .any(|(_, m)| m.contains("captured length 100")));
    }

    #[test]
    fn new_section_resets_interfaces() {
        let mut buf = shb_le();
        buf.extend(idb_le(1, "eth0"));
        buf.extend(shb_le());
        buf.extend(epb_le(0, 0, &[1], 1));
        let (mut reader, _) = capture_reader(&buf);
        assert!(reader.next().is_none());
        assert!(reader.section().interfaces.is_empty());
    }

    #[test]
    fn section_writer_is_logged() {
        let mut body = vec![0x4d, 0x3c, 0x2b, 0x1a, 1, 0, 0, 0];
        body.extend_from_slice(&[0xff; 8]);
        // shb_userappl "dumpcap", then opt_endofopt
        body.extend_from_slice(&[4, 0, 7, 0]);
        body.extend_from_slice(b"dumpcap\0");
        body.extend_from_slice(&[0, 0, 0, 0]);
        let mut buf = block(Endianness::Little, SHB_MAGIC, &body);
        buf.extend(shb_le());
        let (reader, sink) = capture_reader(&buf);
        assert_eq!(reader.count(), 0);
        let msgs: Vec<_> = sink
            .messages()
            .into_iter()
            .filter(|(_, m)| m.contains("pcapng: section 1.0"))
            .collect();
        assert_eq!(msgs.len(), 2);
        assert!(msgs[0].1.ends_with("at offset 0, written by dumpcap"));
        assert!(msgs[1].1.ends_with("written by unknown application"));
    }

    #[test]
    fn unreadable_section_header_resets_interfaces() {
        let mut buf = shb_le();
        buf.extend(idb_le(1, "eth0"));
        // section header with a 12-byte body, too short for its fixed fields
        buf.extend(block(
            Endianness::Little,
            SHB_MAGIC,
            &[0x4d, 0x3c, 0x2b, 0x1a, 1, 0, 0, 0, 0xff, 0xff, 0xff, 0xff],
        ));
        buf.extend(epb_le(0, 0, &[1], 1));
        let (mut reader, sink) = capture_reader(&buf);
        assert!(reader.next().is_none());
        assert!(reader.section().interfaces.is_empty());
        assert_eq!(reader.section().endianness, Endianness::Little);
        let msgs = sink.messages();
        assert!(msgs
            .iter()
            .any(|(l, m)| *l == log::Level::Warn && m.contains("block type 0x0a0d0d0a")));
        assert!(msgs.iter().any(|(_, m)| m.contains("unknown interface id 0")));
    }

    #[test]
    fn simple_packet_uses_interface_zero() {
        let mut buf = shb_le();
        buf.extend(idb_le(1, "eth0"));
        buf.extend(block(
            Endianness::Little,
            SPB_MAGIC,
            &[3, 0, 0, 0, 0xde, 0xad, 0xbe],
        ));
        let (reader, _) = capture_reader(&buf);
        let frames: Vec<_> = reader.collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, &[0xde, 0xad, 0xbe]);
        assert_eq!(frames[0].original_length, 3);
    }

    #[test]
    fn name_records_are_kept_in_section() {
        let mut buf = shb_le();
        buf.extend(block(
            Endianness::Little,
            NRB_MAGIC,
            &[1, 0, 7, 0, 10, 0, 0, 1, b'n', b's', 0, 0, 0, 0, 0, 0],
        ));
        let (mut reader, _) = capture_reader(&buf);
        assert!(reader.next().is_none());
        let names = &reader.section().name_records;
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].address, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(names[0].names, vec!["ns".to_owned()]);
    }

    #[test]
    fn reader_rejects_bad_header() {
        let buf = epb_le(0, 0, &[1], 1);
        assert!(matches!(
            PcapNGReader::from_slice(&buf),
            Err(PcapError::HeaderNotRecognized { magic: 0x0600_0000 })
        ));
        let mut shb = shb_le();
        shb[8] = 0;
        assert!(matches!(
            PcapNGReader::from_slice(&shb),
            Err(PcapError::HeaderNotRecognized { .. })
        ));
        assert!(matches!(
            PcapNGReader::from_slice(&shb[..10]),
            Err(PcapError::Truncated { .. })
        ));
    }

    #[test]
    fn big_endian_section() {
        let mut body = vec![0x1a, 0x2b, 0x3c, 0x4d, 0, 1, 0, 0];
        body.extend_from_slice(&[0xff; 8]);
        let mut buf = block(Endianness::Big, SHB_MAGIC, &body);
        buf.extend(block(
            Endianness::Big,
            IDB_MAGIC,
            &[0, 1, 0, 0, 0, 0, 0, 0],
        ));
        let mut epb = vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 2];
        epb.extend_from_slice(&[0xca, 0xfe]);
        buf.extend(block(Endianness::Big, EPB_MAGIC, &epb));
        let (mut reader, _) = capture_reader(&buf);
        let frame = reader.next().expect("frame");
        assert_eq!(frame.data, &[0xca, 0xfe]);
        assert_eq!(frame.timestamp.fraction, 2);
        assert_eq!(reader.section().endianness, Endianness::Big);
    }
}
