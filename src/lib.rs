//! # PCAP and PCAPNG readers, and a protocol decoder pipeline
//!
//! This crate reads packets from capture files held in memory and decodes them layer by layer.
//!
//! - [`PcapReader`] and [`PcapNGReader`] iterate over the [`Frame`]s of a legacy pcap or a pcapng
//!   buffer, without copying packet data. [`CaptureReader`] picks the right one from the magic
//!   number.
//! - A [`DecodePipeline`] chains the [`Decoder`]s of a [`DecoderRegistry`] over a frame. Decoding
//!   is total: bytes that cannot be decoded become a final raw layer.
//! - [`protocols`] contains Ethernet, IPv4, UDP and DNS decoders. The DNS decoder supports name
//!   compression, with a bounded number of pointer jumps.
//!
//! Readers and pipelines never fail on bad records or packets: problems are reported through
//! their [`Logger`], which discards everything by default.
//!
//! # Example
//!
//! ```rust
//! use pcap_dissector::{CaptureReader, DecodePipeline};
//!
//! # let buffer = [0xd4, 0xc3, 0xb2, 0xa1, 2, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 4, 0, 1, 0, 0, 0];
//! let reader = CaptureReader::from_slice(&buffer).expect("not a capture file");
//! let pipeline = DecodePipeline::default();
//! for frame in reader {
//!     let packet = pipeline.decode_frame(&frame);
//!     if let Some(dns) = packet.dns() {
//!         for q in &dns.questions {
//!             println!("{} {}", q.name, q.qtype);
//!         }
//!     }
//! }
//! ```

#[macro_use]
mod logging;

mod capture;
mod decode;
mod endianness;
mod error;
mod frame;
mod linktype;
mod utils;

pub mod pcap;
pub mod pcapng;
pub mod protocols;

pub use capture::*;
pub use decode::*;
pub use endianness::Endianness;
pub use error::*;
pub use frame::*;
pub use linktype::*;
pub use logging::Logger;
pub use pcap::*;
pub use pcapng::*;
