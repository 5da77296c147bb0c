use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::decode::{DecodeContext, DecodedPacket, DecoderRegistry, Layer, ProtocolId};
use crate::error::PcapError;
use crate::frame::Frame;
use crate::logging::Logger;

/// Default maximum number of decoded layers per packet
pub const DEFAULT_MAX_LAYERS: usize = 32;

/// Chains the decoders of a registry over a packet
///
/// Decoding is total: [`decode_packet`](DecodePipeline::decode_packet) never fails and never
/// panics. When no decoder is found, or a decoder rejects its input, fails or panics, the bytes
/// it was given become a final [`Layer::Raw`] and decoding stops. Every input byte is part of
/// exactly one layer header, raw layer, or of the payload of the last layer.
///
/// ```rust
/// use pcap_dissector::{DecodePipeline, ProtocolId};
///
/// let pipeline = DecodePipeline::default();
/// let packet = pipeline.decode_packet(&[0x45, 0x00], ProtocolId::EtherType(0x0800));
/// // too short for an IPv4 header
/// assert_eq!(packet.layers.len(), 1);
/// assert!(packet.layers[0].is_raw());
/// ```
#[derive(Debug)]
pub struct DecodePipeline {
    registry: DecoderRegistry,
    max_layers: usize,
    logger: Logger,
}

impl DecodePipeline {
    pub fn new(registry: DecoderRegistry) -> DecodePipeline {
        DecodePipeline {
            registry,
            max_layers: DEFAULT_MAX_LAYERS,
            logger: Logger::noop(),
        }
    }

    /// Maximum number of structured layers; the rest of a deeper packet is kept as raw data
    pub fn with_max_layers(mut self, max_layers: usize) -> Self {
        self.max_layers = max_layers;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DecoderRegistry {
        &mut self.registry
    }

    /// Decode a frame, starting with the decoder of its link type
    pub fn decode_frame<'a>(&self, frame: &Frame<'a>) -> DecodedPacket<'a> {
        self.decode_packet(frame.data, ProtocolId::Link(frame.link_type))
    }

    /// Decode `buffer`, starting with the decoder registered for `start`
    pub fn decode_packet<'a>(&self, buffer: &'a [u8], start: ProtocolId) -> DecodedPacket<'a> {
        let mut layers = Vec::new();
        let mut rem = buffer;
        let mut id = start;
        let mut offset = 0;
        loop {
            if layers.len() >= self.max_layers {
                log_debug!(
                    self.logger,
                    "layer limit ({}) reached at offset {}",
                    self.max_layers,
                    offset
                );
                layers.push(Layer::raw(rem));
                break;
            }
            let decoder = match self.registry.get(&id) {
                Some(d) => d,
                None => {
                    log_debug!(self.logger, "no decoder for {} at offset {}", id, offset);
                    layers.push(Layer::raw(rem));
                    break;
                }
            };
            let name = decoder.protocol_name();
            let ctx = DecodeContext {
                protocol: id,
                offset,
                depth: layers.len(),
            };
            let result = panic::catch_unwind(AssertUnwindSafe(|| decoder.decode_layer(rem, &ctx)));
            let decoded = match result {
                Ok(Ok(Some(decoded))) => decoded,
                Ok(Ok(None)) => {
                    log_debug!(
                        self.logger,
                        "{}: input not recognized at offset {}",
                        name,
                        offset
                    );
                    layers.push(Layer::raw(rem));
                    break;
                }
                Ok(Err(e)) => {
                    self.log_failure(name, offset, &e);
                    layers.push(Layer::raw(rem));
                    break;
                }
                Err(panic) => {
                    log_error!(
                        self.logger,
                        "{}: unexpected decoder failure at offset {}: panic: {}",
                        name,
                        offset,
                        panic_message(&*panic)
                    );
                    layers.push(Layer::raw(rem));
                    break;
                }
            };
            let header_length = decoded.header_length;
            if header_length == 0 || header_length > rem.len() {
                let e = PcapError::DecoderContract {
                    protocol: name,
                    header_length,
                    input_len: rem.len(),
                };
                self.log_failure(name, offset, &e);
                layers.push(Layer::raw(rem));
                break;
            }
            let (header, payload) = rem.split_at(header_length);
            layers.push(Layer::Structured {
                protocol_name: name,
                header,
                data: decoded.data,
                payload,
            });
            if payload.is_empty() {
                break;
            }
            match decoded.next {
                Some(next) => {
                    id = next;
                    rem = payload;
                    offset += header_length;
                }
                None => break,
            }
        }
        DecodedPacket { layers }
    }

    fn log_failure(&self, name: &str, offset: usize, e: &PcapError) {
        if e.is_structural() {
            log_warn!(
                self.logger,
                "{}: malformed input at offset {}: {}",
                name,
                offset,
                e
            );
        } else {
            log_error!(
                self.logger,
                "{}: unexpected decoder failure at offset {}: {}",
                name,
                offset,
                e
            );
        }
    }
}

impl Default for DecodePipeline {
    /// A pipeline over [`DecoderRegistry::with_defaults`]
    fn default() -> Self {
        DecodePipeline::new(DecoderRegistry::with_defaults())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
