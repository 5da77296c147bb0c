//! Protocol decoders
//!
//! [`dns`] is the application decoder. [`ethernet`], [`ipv4`] and [`udp`] are thin reference
//! decoders, so that DNS can be reached from a captured frame. Other protocols can be added by
//! implementing [`Decoder`](crate::Decoder) and registering it in a
//! [`DecoderRegistry`](crate::DecoderRegistry).

pub mod dns;
pub mod ethernet;
pub mod ipv4;
pub mod udp;
