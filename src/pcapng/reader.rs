use crate::endianness::Endianness;
use crate::error::PcapError;
use crate::frame::{Frame, Timestamp};
use crate::logging::Logger;
use crate::utils::require;

use super::*;

/// Default number of bytes skipped when no block can be framed at the current offset
pub const DEFAULT_PCAPNG_RESYNC_SKIP: usize = 4;

/// Iterator over the packets of a pcapng buffer
///
/// The reader keeps track of the current [`Section`]: byte order, interfaces and name records
/// are updated as the corresponding blocks are read, and reset by every section header block.
/// Packet blocks (EPB, SPB) are returned as [`Frame`]s; other blocks only update the state.
///
/// Only [`PcapNGReader::from_slice`] can fail, if the buffer does not start with a valid
/// section header. Past that point, problems are logged and skipped:
///
/// - a block that cannot be framed (bad lengths, truncated header) makes the reader skip
///   [`resync_skip`](PcapNGReader::with_resync_skip) bytes and try again. This is a best-effort
///   heuristic;
/// - a block whose body is invalid is skipped as a whole;
/// - a packet referencing an unknown interface is skipped;
/// - blocks of unknown type are skipped.
///
/// ```rust
/// use pcap_dissector::PcapNGReader;
///
/// # let buffer = [
/// #     0x0a, 0x0d, 0x0d, 0x0a, 0x1c, 0, 0, 0, 0x4d, 0x3c, 0x2b, 0x1a, 1, 0, 0, 0,
/// #     0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x1c, 0, 0, 0];
/// let reader = PcapNGReader::from_slice(&buffer).expect("not a pcapng file");
/// for frame in reader {
///     println!("{} bytes on interface {:?}", frame.captured_length, frame.interface);
/// }
/// ```
pub struct PcapNGReader<'a> {
    data: &'a [u8],
    offset: usize,
    section: Section,
    resync_skip: usize,
    logger: Logger,
}

/// Short name for [`PcapNGReader`]
pub type PcapNgReader<'a> = PcapNGReader<'a>;

impl<'a> PcapNGReader<'a> {
    /// Check the leading section header and return a reader positioned on it
    pub fn from_slice(i: &'a [u8]) -> Result<PcapNGReader<'a>, PcapError> {
        require("pcapng section header", i, 12)?;
        let magic = Endianness::Big.read_u32(i, 0).unwrap_or_default();
        if magic != SHB_MAGIC {
            return Err(PcapError::HeaderNotRecognized { magic });
        }
        let endianness = section_endianness(i)?;
        Ok(PcapNGReader {
            data: i,
            offset: 0,
            section: Section::new(endianness),
            resync_skip: DEFAULT_PCAPNG_RESYNC_SKIP,
            logger: Logger::noop(),
        })
    }

    /// Number of bytes skipped after a framing error (at least 1)
    pub fn with_resync_skip(mut self, skip: usize) -> Self {
        self.resync_skip = skip.max(1);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// The section being read
    pub fn section(&self) -> &Section {
        &self.section
    }

    /// Offset of the next block, from the start of the buffer
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Update the section state with `block`, and return a frame for packet blocks
    fn handle_block(&mut self, block: Block<'a>, offset: usize) -> Option<Frame<'a>> {
        match block {
            Block::SectionHeader(shb) => {
                log_debug!(
                    self.logger,
                    "pcapng: section {}.{} ({:?}) at offset {}, written by {}",
                    shb.major_version,
                    shb.minor_version,
                    shb.endianness,
                    offset,
                    shb.shb_userappl().unwrap_or("unknown application")
                );
                self.section = Section::from_header(&shb);
                None
            }
            Block::InterfaceDescription(idb) => {
                let iface = self.section.add_interface(&idb);
                log_debug!(
                    self.logger,
                    "pcapng: interface {} ({}) at offset {}",
                    iface.interface_id,
                    iface.link_type,
                    offset
                );
                None
            }
            Block::EnhancedPacket(epb) => match self.section.interface(epb.if_id) {
                Ok(iface) => Some(Frame {
                    timestamp: epb.decode_ts(iface.ts_offset, iface.ts_resolution),
                    original_length: epb.origlen,
                    captured_length: epb.caplen,
                    link_type: iface.link_type,
                    interface: Some(iface.clone()),
                    data: epb.data,
                }),
                Err(e) => {
                    log_warn!(
                        self.logger,
                        "pcapng: skipping packet at offset {}: {}",
                        offset,
                        e
                    );
                    None
                }
            },
            Block::SimplePacket(spb) => match self.section.interface(0) {
                Ok(iface) => {
                    let data = spb.packet_data(iface.snap_len);
                    Some(Frame {
                        timestamp: Timestamp {
                            secs: 0,
                            fraction: 0,
                            units_per_sec: iface.ts_resolution,
                        },
                        original_length: spb.origlen,
                        captured_length: data.len() as u32,
                        link_type: iface.link_type,
                        interface: Some(iface.clone()),
                        data,
                    })
                }
                Err(e) => {
                    log_warn!(
                        self.logger,
                        "pcapng: skipping simple packet at offset {}: {}",
                        offset,
                        e
                    );
                    None
                }
            },
            Block::NameResolution(nrb) => {
                self.section.add_names(&nrb);
                None
            }
            Block::Unknown(ub) => {
                log_debug!(
                    self.logger,
                    "pcapng: skipping block type {:#010x} at offset {}",
                    ub.block_type,
                    offset
                );
                None
            }
        }
    }
}

impl<'a> Iterator for PcapNGReader<'a> {
    type Item = Frame<'a>;

    fn next(&mut self) -> Option<Frame<'a>> {
        while self.offset < self.data.len() {
            let offset = self.offset;
            let raw = match read_block(self.data, offset, self.section.endianness) {
                Ok(raw) => raw,
                Err(e) => {
                    log_warn!(
                        self.logger,
                        "pcapng: cannot read block at offset {}: {}; skipping {} byte(s)",
                        offset,
                        e,
                        self.resync_skip
                    );
                    self.offset = offset.saturating_add(self.resync_skip).min(self.data.len());
                    continue;
                }
            };
            self.offset += raw.bytes_read;
            match raw.interpret() {
                Ok(block) => {
                    if let Some(frame) = self.handle_block(block, offset) {
                        return Some(frame);
                    }
                }
                Err(e) => {
                    log_warn!(
                        self.logger,
                        "pcapng: skipping block type {:#010x} at offset {}: {}",
                        raw.block_type,
                        offset,
                        e
                    );
                    // a section starts even if its header is unreadable
                    if raw.block_type == SHB_MAGIC {
                        self.section = Section::new(raw.endianness);
                    }
                }
            }
        }
        None
    }
}
