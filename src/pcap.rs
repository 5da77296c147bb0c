//! PCAP file format
//!
//! See <https://wiki.wireshark.org/Development/LibpcapFileFormat> for details.
//!
//! A PCAP file is a 24-byte global header followed by a flat sequence of records, each made of a
//! 16-byte header and `incl_len` bytes of packet data. The magic number at the start of the
//! global header gives the byte order of every following integer.
//!
//! The simplest way to read a file is [`PcapReader`](crate::PcapReader), an iterator over
//! [`Frame`](crate::Frame)s. The parsing functions
//! [`parse_pcap_header`] and [`parse_pcap_frame`] / [`parse_pcap_frame_be`] are also exported
//! for callers driving the parsing themselves.

mod frame;
mod header;
mod reader;

pub use frame::*;
pub use header::*;
pub use reader::*;

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use crate::logging::tests::CaptureLog;
    use crate::logging::Logger;
    use crate::pcap::{parse_pcap_frame, parse_pcap_frame_be, parse_pcap_header, PcapReader};
    use crate::{Linktype, PcapError};
    use hex_literal::hex;

    // big-endian header, version 2.4, snaplen 65535, ethernet
    pub(crate) const PCAP_HDR_BE: &[u8] = &hex!(
        "
A1 B2 C3 D4 00 02 00 04 00 00 00 00 00 00 00 00
00 00 FF FF 00 00 00 01"
    );

    // little-endian header, snaplen 262144, ethernet
    pub(crate) const PCAP_HDR_LE: &[u8] = &hex!(
        "
D4 C3 B2 A1 02 00 04 00 00 00 00 00 00 00 00 00
00 00 04 00 01 00 00 00"
    );

    // little-endian record: ts 1515933236.562913, 4 bytes captured, 60 on the wire
    pub(crate) const RECORD_LE: &[u8] = &hex!(
        "
34 4E 5B 5A E1 96 08 00 04 00 00 00 3C 00 00 00
DE AD BE EF"
    );

    #[test]
    fn test_parse_pcap_header_be() {
        let (rem, hdr) = parse_pcap_header(PCAP_HDR_BE).expect("header parsing failed");
        assert!(rem.is_empty());
        assert!(hdr.is_bigendian());
        assert_eq!(hdr.version_major, 2);
        assert_eq!(hdr.version_minor, 4);
        assert_eq!(hdr.snaplen, 65535);
        assert_eq!(hdr.network, Linktype::ETHERNET);
    }

    #[test]
    fn test_parse_pcap_header_le() {
        let (rem, hdr) = parse_pcap_header(PCAP_HDR_LE).expect("header parsing failed");
        assert!(rem.is_empty());
        assert!(!hdr.is_bigendian());
        assert_eq!(hdr.magic_number, 0xd4c3_b2a1);
        assert_eq!(hdr.snaplen, 262_144);
        assert_eq!(hdr.network, Linktype(1));
    }

    #[test]
    fn test_parse_pcap_header_bad_magic() {
        let mut hdr = PCAP_HDR_LE.to_vec();
        hdr[0] = 0x4d; // nanosecond variant, not supported
        match parse_pcap_header(&hdr) {
            Err(nom::Err::Error(PcapError::HeaderNotRecognized { magic })) => {
                assert_eq!(magic, 0x4dc3_b2a1)
            }
            r => panic!("unexpected result {:?}", r.map(|(_, h)| h)),
        }
    }

    #[test]
    fn test_parse_pcap_frame() {
        let (rem, pkt) = parse_pcap_frame(RECORD_LE).expect("packet parsing failed");
        assert!(rem.is_empty());
        assert_eq!(pkt.origlen, 60);
        assert_eq!(pkt.caplen, 4);
        assert_eq!(pkt.ts_usec, 562_913);
        assert_eq!(pkt.ts_sec, 1_515_933_236);
        assert_eq!(pkt.data, &hex!("DE AD BE EF"));
    }

    #[test]
    fn test_parse_pcap_frame_be() {
        let rec = hex!("00 00 00 01 00 00 00 02 00 00 00 01 00 00 00 01 AA");
        let (rem, pkt) = parse_pcap_frame_be(&rec).expect("packet parsing failed");
        assert!(rem.is_empty());
        assert_eq!((pkt.ts_sec, pkt.ts_usec), (1, 2));
        assert_eq!(pkt.data, &[0xaa]);
    }

    #[test]
    fn test_reader_rejects_short_header() {
        match PcapReader::from_slice(&PCAP_HDR_BE[..20]) {
            Err(PcapError::Truncated { missing, .. }) => assert_eq!(missing, 4),
            _ => panic!("expected a truncation error"),
        }
    }

    #[test]
    fn test_reader_frames_and_empty_record() {
        let mut buf = PCAP_HDR_LE.to_vec();
        buf.extend_from_slice(RECORD_LE);
        // incl_len == 0 is a legal, empty packet
        buf.extend_from_slice(&hex!("01 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00"));
        let reader = PcapReader::from_slice(&buf).expect("reader");
        let frames: Vec<_> = reader.collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].data, &hex!("DE AD BE EF"));
        assert_eq!(frames[0].link_type, Linktype::ETHERNET);
        assert!(frames[0].is_truncated());
        assert_eq!(frames[0].timestamp.fraction, 562_913);
        assert!(frames[1].data.is_empty());
        assert_eq!(frames[1].timestamp.secs, 1);
    }

    #[test]
    fn test_reader_truncated_tail_is_logged() {
        let sink = Arc::new(CaptureLog::default());
        let mut buf = PCAP_HDR_LE.to_vec();
        buf.extend_from_slice(RECORD_LE);
        buf.extend_from_slice(&[0u8; 7]);
        let reader = PcapReader::from_slice(&buf)
            .expect("reader")
            .with_logger(Logger::from_arc(sink.clone()));
        assert_eq!(reader.count(), 1);
        let msgs = sink.messages();
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].1.contains("truncated tail of 7 byte(s)"));
    }

    #[test]
    fn test_reader_resync_after_bad_record() {
        let mut buf = PCAP_HDR_LE.to_vec();
        // record claiming 255 bytes of data, but only 16 follow: parsing fails
        buf.extend_from_slice(&hex!("00 00 00 00 00 00 00 00 FF 00 00 00 FF 00 00 00"));
        // the reader skips the 16-byte header and finds a valid record
        buf.extend_from_slice(RECORD_LE);
        let sink = Arc::new(CaptureLog::default());
        let mut reader = PcapReader::from_slice(&buf)
            .expect("reader")
            .with_logger(Logger::from_arc(sink.clone()));
        let frame = reader.next().expect("resynchronized frame");
        assert_eq!(frame.original_length, 60);
        assert!(reader.next().is_none());
        assert_eq!(reader.position(), buf.len());
        assert!(sink.messages()[0].1.contains("bad record at offset 24"));
    }
}
