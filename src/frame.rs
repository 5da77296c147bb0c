//! Frames produced by the container readers

use std::sync::Arc;

use crate::linktype::Linktype;

pub(crate) const MICROS_PER_SEC: u64 = 1_000_000;

/// Capture timestamp: whole seconds plus a fraction expressed in `units_per_sec`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timestamp {
    pub secs: i64,
    pub fraction: u32,
    pub units_per_sec: u64,
}

impl Timestamp {
    pub fn from_micros(secs: u32, micros: u32) -> Timestamp {
        Timestamp {
            secs: i64::from(secs),
            fraction: micros,
            units_per_sec: MICROS_PER_SEC,
        }
    }

    /// Timestamp as (fractional) seconds since the epoch
    pub fn as_f64(&self) -> f64 {
        self.secs as f64 + f64::from(self.fraction) / self.units_per_sec as f64
    }
}

/// Capture interface, as described by a PCAPNG Interface Description Block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceInfo {
    /// Index of the interface in its section
    pub interface_id: u32,
    pub link_type: Linktype,
    /// Maximum captured length, 0 meaning unlimited
    pub snap_len: u32,
    /// Timestamp units per second (`if_tsresol`, default 10^6)
    pub ts_resolution: u64,
    /// Seconds added to every timestamp (`if_tsoffset`)
    pub ts_offset: i64,
    pub name: Option<String>,
}

/// One captured packet
///
/// `data` borrows the capture buffer; no packet bytes are copied.
#[derive(Clone, Debug)]
pub struct Frame<'a> {
    pub timestamp: Timestamp,
    /// Length of the packet on the wire
    pub original_length: u32,
    /// Number of bytes saved in the capture
    pub captured_length: u32,
    /// Interface the packet was captured on (PCAPNG only)
    pub interface: Option<Arc<InterfaceInfo>>,
    pub link_type: Linktype,
    pub data: &'a [u8],
}

impl<'a> Frame<'a> {
    /// True if the packet was cut by the capture snap length
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.captured_length < self.original_length
    }
}
