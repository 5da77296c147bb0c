//! Capture format detection

use crate::endianness::Endianness;
use crate::error::PcapError;
use crate::frame::Frame;
use crate::logging::Logger;
use crate::pcap::{LegacyPcapReader, PCAP_MAGIC_BE, PCAP_MAGIC_LE};
use crate::pcapng::{PcapNGReader, SHB_MAGIC};
use crate::utils::require;

/// Container format of a capture buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureFormat {
    Pcap,
    PcapNG,
}

/// Reader over a buffer in either container format
///
/// The format is chosen from the first four bytes (read as big-endian): one of the two pcap magic
/// numbers, or the pcapng section header block type.
///
/// ```rust
/// use pcap_dissector::{CaptureFormat, CaptureReader};
///
/// # let buffer = [0xd4, 0xc3, 0xb2, 0xa1, 2, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 4, 0, 1, 0, 0, 0];
/// let reader = CaptureReader::from_slice(&buffer).expect("unknown format");
/// assert_eq!(reader.format(), CaptureFormat::Pcap);
/// assert_eq!(reader.count(), 0);
/// ```
pub enum CaptureReader<'a> {
    Pcap(LegacyPcapReader<'a>),
    PcapNG(PcapNGReader<'a>),
}

impl<'a> CaptureReader<'a> {
    pub fn from_slice(i: &'a [u8]) -> Result<CaptureReader<'a>, PcapError> {
        require("capture magic", i, 4)?;
        let magic = Endianness::Big.read_u32(i, 0).unwrap_or_default();
        match magic {
            PCAP_MAGIC_BE | PCAP_MAGIC_LE => LegacyPcapReader::from_slice(i).map(CaptureReader::Pcap),
            SHB_MAGIC => PcapNGReader::from_slice(i).map(CaptureReader::PcapNG),
            _ => Err(PcapError::HeaderNotRecognized { magic }),
        }
    }

    pub fn format(&self) -> CaptureFormat {
        match self {
            CaptureReader::Pcap(_) => CaptureFormat::Pcap,
            CaptureReader::PcapNG(_) => CaptureFormat::PcapNG,
        }
    }

    pub fn with_logger(self, logger: Logger) -> Self {
        match self {
            CaptureReader::Pcap(r) => CaptureReader::Pcap(r.with_logger(logger)),
            CaptureReader::PcapNG(r) => CaptureReader::PcapNG(r.with_logger(logger)),
        }
    }

    /// Number of bytes skipped after a record or block that could not be parsed
    pub fn with_resync_skip(self, skip: usize) -> Self {
        match self {
            CaptureReader::Pcap(r) => CaptureReader::Pcap(r.with_resync_skip(skip)),
            CaptureReader::PcapNG(r) => CaptureReader::PcapNG(r.with_resync_skip(skip)),
        }
    }
}

impl<'a> Iterator for CaptureReader<'a> {
    type Item = Frame<'a>;

    fn next(&mut self) -> Option<Frame<'a>> {
        match self {
            CaptureReader::Pcap(r) => r.next(),
            CaptureReader::PcapNG(r) => r.next(),
        }
    }
}
