use nom::IResult;

use crate::error::PcapError;
use crate::frame::Frame;
use crate::logging::Logger;
use crate::pcap::{
    parse_pcap_frame, parse_pcap_frame_be, parse_pcap_header, LegacyPcapBlock, PcapHeader,
    PCAP_RECORD_HDR_SZ,
};
use crate::utils::complete;

/// Default number of bytes skipped after a record that could not be parsed
pub const DEFAULT_PCAP_RESYNC_SKIP: usize = 16;

type LegacyParseFn = fn(&[u8]) -> IResult<&[u8], LegacyPcapBlock<'_>, PcapError>;

/// Iterator over the frames of a legacy pcap buffer
///
/// The global header is parsed by [`PcapReader::from_slice`], which is the only place where an
/// error is returned. Iteration then yields one [`Frame`] per record and ends at the end of the
/// buffer.
///
/// Record-level problems never stop iteration:
///
/// - fewer than 16 bytes left (but more than 0) is a truncated tail: it is logged and
///   iteration ends;
/// - a record whose data is not fully present is logged, then the reader skips
///   [`resync_skip`](PcapReader::with_resync_skip) bytes and tries again from there. This is a
///   best-effort heuristic: nothing guarantees that the new position is a record boundary.
///
/// ```rust
/// use pcap_dissector::PcapReader;
///
/// # let buffer = [0xa1, 0xb2, 0xc3, 0xd4, 0, 2, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff, 0, 0, 0, 1];
/// let reader = PcapReader::from_slice(&buffer).expect("not a pcap file");
/// println!("linktype: {}", reader.header().network);
/// for frame in reader {
///     println!("{} bytes captured", frame.captured_length);
/// }
/// ```
pub struct LegacyPcapReader<'a> {
    header: PcapHeader,
    // remaining (unparsed) data
    rem: &'a [u8],
    offset: usize,
    parse: LegacyParseFn,
    resync_skip: usize,
    logger: Logger,
}

/// Short name for [`LegacyPcapReader`]
pub type PcapReader<'a> = LegacyPcapReader<'a>;

impl<'a> LegacyPcapReader<'a> {
    /// Parse the global header and return a reader positioned on the first record
    pub fn from_slice(i: &'a [u8]) -> Result<LegacyPcapReader<'a>, PcapError> {
        let (rem, header) = complete("pcap global header", i, parse_pcap_header)?;
        let parse = if header.is_bigendian() {
            parse_pcap_frame_be
        } else {
            parse_pcap_frame
        };
        Ok(LegacyPcapReader {
            offset: header.size(),
            header,
            rem,
            parse,
            resync_skip: DEFAULT_PCAP_RESYNC_SKIP,
            logger: Logger::noop(),
        })
    }

    /// Number of bytes skipped after a record parsing error (at least 1)
    pub fn with_resync_skip(mut self, skip: usize) -> Self {
        self.resync_skip = skip.max(1);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn header(&self) -> &PcapHeader {
        &self.header
    }

    /// Offset of the next record, from the start of the buffer
    pub fn position(&self) -> usize {
        self.offset
    }

    fn advance(&mut self, n: usize) {
        let n = n.min(self.rem.len());
        self.rem = &self.rem[n..];
        self.offset += n;
    }
}

impl<'a> Iterator for LegacyPcapReader<'a> {
    type Item = Frame<'a>;

    fn next(&mut self) -> Option<Frame<'a>> {
        loop {
            if self.rem.is_empty() {
                return None;
            }
            if self.rem.len() < PCAP_RECORD_HDR_SZ {
                log_info!(
                    self.logger,
                    "pcap: ignoring truncated tail of {} byte(s) at offset {}",
                    self.rem.len(),
                    self.offset
                );
                self.advance(self.rem.len());
                return None;
            }
            match complete("pcap record", self.rem, self.parse) {
                Ok((rem, block)) => {
                    let consumed = self.rem.len() - rem.len();
                    self.advance(consumed);
                    return Some(block.into_frame(self.header.network));
                }
                Err(e) => {
                    log_warn!(
                        self.logger,
                        "pcap: bad record at offset {}: {}; skipping {} byte(s)",
                        self.offset,
                        e,
                        self.resync_skip
                    );
                    self.advance(self.resync_skip);
                }
            }
        }
    }
}
