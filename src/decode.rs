//! Protocol decoding
//!
//! A [`Decoder`] turns the leading bytes of a buffer into a typed header. Decoders are
//! registered in a [`DecoderRegistry`] under one or more [`ProtocolId`]s, and chained by a
//! [`DecodePipeline`]: each decoder names the identifier of the next protocol, and the pipeline
//! looks it up in the registry.
//!
//! Decoders only return the length of their header; the pipeline slices the buffer itself, so
//! the header and payload of a layer always add up to the bytes handed to the decoder.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;

use crate::error::PcapError;
use crate::linktype::Linktype;
use crate::protocols::dns::DnsMessage;
use crate::protocols::ethernet::EthernetHeader;
use crate::protocols::ipv4::Ipv4Header;
use crate::protocols::udp::UdpHeader;

mod pipeline;
mod registry;

pub use pipeline::*;
pub use registry::*;

/// Name of the layers holding bytes that could not be decoded
pub const RAW_DATA: &str = "Raw Data";

/// Identifier used to select the decoder of the next layer
///
/// Each variant is a separate namespace, so that for ex. UDP port 53 and TCP port 53 can have
/// different decoders.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProtocolId {
    /// Link-layer header type of the capture
    Link(Linktype),
    EtherType(u16),
    /// IP protocol number (IPv4 protocol / IPv6 next header)
    IpProtocol(u8),
    UdpPort(u16),
    TcpPort(u16),
    /// Any other identifier
    Named(Cow<'static, str>),
}

impl ProtocolId {
    pub fn named<S: Into<Cow<'static, str>>>(name: S) -> ProtocolId {
        ProtocolId::Named(name.into())
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProtocolId::Link(l) => write!(f, "link type {}", l),
            ProtocolId::EtherType(t) => write!(f, "ethertype {:#06x}", t),
            ProtocolId::IpProtocol(p) => write!(f, "ip protocol {}", p),
            ProtocolId::UdpPort(p) => write!(f, "udp port {}", p),
            ProtocolId::TcpPort(p) => write!(f, "tcp port {}", p),
            ProtocolId::Named(s) => write!(f, "{}", s),
        }
    }
}

/// Information given to a decoder about the buffer it decodes
#[derive(Clone, Debug)]
pub struct DecodeContext {
    /// Identifier that selected the decoder
    pub protocol: ProtocolId,
    /// Offset of the buffer from the start of the packet
    pub offset: usize,
    /// Number of layers already decoded
    pub depth: usize,
}

/// Result of a successful decoding: the header length and the decoded fields
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded<T> {
    pub header_length: usize,
    pub data: T,
}

impl<T> Decoded<T> {
    pub fn new(header_length: usize, data: T) -> Decoded<T> {
        Decoded {
            header_length,
            data,
        }
    }
}

/// A protocol decoder
///
/// `decode` returns:
/// - `Ok(Some(_))` with the length of the decoded header, which must be at least 1 and at most
///   the buffer length;
/// - `Ok(None)` if the bytes are not valid for this protocol (for ex. a wrong version number);
/// - `Err(_)` if the input is malformed.
///
/// Implementations must not keep any state between calls: a decoder can be shared by several
/// threads.
pub trait Decoder: Send + Sync {
    type Data: Into<LayerData>;

    fn protocol_name(&self) -> &'static str;

    fn decode(
        &self,
        buffer: &[u8],
        ctx: &DecodeContext,
    ) -> Result<Option<Decoded<Self::Data>>, PcapError>;

    /// Identifier of the protocol carried in the payload, or `None` if this layer is the last one
    fn next_protocol(&self, data: &Self::Data) -> Option<ProtocolId>;
}

/// A decoded layer, before slicing
pub struct DecodedLayer {
    pub header_length: usize,
    pub data: LayerData,
    pub next: Option<ProtocolId>,
}

/// Object-safe form of [`Decoder`], as stored in the registry
///
/// Implemented for all decoders.
pub trait ErasedDecoder: Send + Sync {
    fn protocol_name(&self) -> &'static str;

    fn decode_layer(
        &self,
        buffer: &[u8],
        ctx: &DecodeContext,
    ) -> Result<Option<DecodedLayer>, PcapError>;
}

impl<D: Decoder> ErasedDecoder for D {
    fn protocol_name(&self) -> &'static str {
        Decoder::protocol_name(self)
    }

    fn decode_layer(
        &self,
        buffer: &[u8],
        ctx: &DecodeContext,
    ) -> Result<Option<DecodedLayer>, PcapError> {
        Ok(self.decode(buffer, ctx)?.map(|decoded| {
            let next = self.next_protocol(&decoded.data);
            DecodedLayer {
                header_length: decoded.header_length,
                data: decoded.data.into(),
                next,
            }
        }))
    }
}

/// Fields of a layer decoded outside of this crate
pub trait LayerFields: fmt::Debug + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

impl<T: fmt::Debug + Send + Sync + 'static> LayerFields for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Decoded fields of a layer
#[derive(Debug)]
pub enum LayerData {
    Ethernet(EthernetHeader),
    Ipv4(Ipv4Header),
    Udp(UdpHeader),
    Dns(DnsMessage),
    Custom(Box<dyn LayerFields>),
}

impl LayerData {
    pub fn custom<T: LayerFields>(fields: T) -> LayerData {
        LayerData::Custom(Box::new(fields))
    }

    /// Access the fields of a `Custom` layer
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            LayerData::Custom(b) => (**b).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl From<EthernetHeader> for LayerData {
    fn from(h: EthernetHeader) -> Self {
        LayerData::Ethernet(h)
    }
}

impl From<Ipv4Header> for LayerData {
    fn from(h: Ipv4Header) -> Self {
        LayerData::Ipv4(h)
    }
}

impl From<UdpHeader> for LayerData {
    fn from(h: UdpHeader) -> Self {
        LayerData::Udp(h)
    }
}

impl From<DnsMessage> for LayerData {
    fn from(m: DnsMessage) -> Self {
        LayerData::Dns(m)
    }
}

/// One layer of a decoded packet
#[derive(Debug)]
pub enum Layer<'a> {
    Structured {
        protocol_name: &'static str,
        header: &'a [u8],
        data: LayerData,
        payload: &'a [u8],
    },
    /// Bytes that could not be decoded; always the last layer
    Raw {
        protocol_name: &'static str,
        data: &'a [u8],
    },
}

impl<'a> Layer<'a> {
    pub(crate) fn raw(data: &'a [u8]) -> Layer<'a> {
        Layer::Raw {
            protocol_name: RAW_DATA,
            data,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Layer::Structured { protocol_name, .. } | Layer::Raw { protocol_name, .. } => {
                protocol_name
            }
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Layer::Raw { .. })
    }

    /// Decoded fields, or `None` for a raw layer
    pub fn data(&self) -> Option<&LayerData> {
        match self {
            Layer::Structured { data, .. } => Some(data),
            Layer::Raw { .. } => None,
        }
    }
}

/// Layers of a packet, outermost first
#[derive(Debug, Default)]
pub struct DecodedPacket<'a> {
    pub layers: Vec<Layer<'a>>,
}

impl<'a> DecodedPacket<'a> {
    /// First layer with the given protocol name
    pub fn layer(&self, protocol_name: &str) -> Option<&Layer<'a>> {
        self.layers
            .iter()
            .find(|l| l.protocol_name() == protocol_name)
    }

    pub fn last(&self) -> Option<&Layer<'a>> {
        self.layers.last()
    }

    /// The DNS message of the packet, if any
    pub fn dns(&self) -> Option<&DnsMessage> {
        self.layers.iter().find_map(|l| match l.data() {
            Some(LayerData::Dns(m)) => Some(m),
            _ => None,
        })
    }

    /// Concatenate the headers and raw bytes of all layers, and the payload of the last one
    ///
    /// The result is the buffer given to the pipeline.
    pub fn reassemble(&self) -> Vec<u8> {
        let mut v = Vec::new();
        for layer in &self.layers {
            match layer {
                Layer::Structured { header, .. } => v.extend_from_slice(header),
                Layer::Raw { data, .. } => v.extend_from_slice(data),
            }
        }
        if let Some(Layer::Structured { payload, .. }) = self.layers.last() {
            v.extend_from_slice(payload);
        }
        v
    }
}
