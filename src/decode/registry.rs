use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::decode::{Decoder, ErasedDecoder, ProtocolId};
use crate::linktype::Linktype;
use crate::protocols::dns::{DnsDecoder, DNS_PORT, MDNS_PORT};
use crate::protocols::ethernet::{EthernetDecoder, ETHERTYPE_IPV4};
use crate::protocols::ipv4::Ipv4Decoder;
use crate::protocols::udp::{UdpDecoder, IPPROTO_UDP};

/// Priority of the decoders registered by [`DecoderRegistry::with_defaults`]
pub const DEFAULT_PRIORITY: i32 = 100;

#[derive(Clone)]
struct Entry {
    priority: i32,
    decoder: Arc<dyn ErasedDecoder>,
}

/// Decoders, indexed by protocol identifier
///
/// Several decoders can be registered for the same identifier: they are kept sorted by ascending
/// priority, and [`get`](DecoderRegistry::get) returns the first one. Lower numbers win; decoders
/// with the same priority keep their registration order.
#[derive(Clone, Default)]
pub struct DecoderRegistry {
    decoders: HashMap<ProtocolId, Vec<Entry>>,
}

impl DecoderRegistry {
    /// An empty registry
    pub fn new() -> DecoderRegistry {
        DecoderRegistry::default()
    }

    /// A registry with the Ethernet, IPv4, UDP and DNS decoders, at [`DEFAULT_PRIORITY`]
    pub fn with_defaults() -> DecoderRegistry {
        let mut registry = DecoderRegistry::new();
        let ipv4: Arc<dyn ErasedDecoder> = Arc::new(Ipv4Decoder);
        let dns: Arc<dyn ErasedDecoder> = Arc::new(DnsDecoder);
        registry
            .register(
                ProtocolId::Link(Linktype::ETHERNET),
                EthernetDecoder,
                DEFAULT_PRIORITY,
            )
            .register_arc(
                ProtocolId::EtherType(ETHERTYPE_IPV4),
                ipv4.clone(),
                DEFAULT_PRIORITY,
            )
            .register_arc(ProtocolId::Link(Linktype::RAW), ipv4.clone(), DEFAULT_PRIORITY)
            .register_arc(ProtocolId::Link(Linktype::IPV4), ipv4, DEFAULT_PRIORITY)
            .register(ProtocolId::IpProtocol(IPPROTO_UDP), UdpDecoder, DEFAULT_PRIORITY)
            .register_arc(ProtocolId::UdpPort(DNS_PORT), dns.clone(), DEFAULT_PRIORITY)
            .register_arc(ProtocolId::UdpPort(MDNS_PORT), dns, DEFAULT_PRIORITY);
        registry
    }

    pub fn register<D>(&mut self, id: ProtocolId, decoder: D, priority: i32) -> &mut Self
    where
        D: Decoder + 'static,
    {
        self.register_arc(id, Arc::new(decoder), priority)
    }

    /// Register a shared decoder, for ex. the same instance under several identifiers
    pub fn register_arc(
        &mut self,
        id: ProtocolId,
        decoder: Arc<dyn ErasedDecoder>,
        priority: i32,
    ) -> &mut Self {
        let entries = self.decoders.entry(id).or_insert_with(Vec::new);
        entries.push(Entry { priority, decoder });
        // stable: equal priorities keep their registration order
        entries.sort_by_key(|e| e.priority);
        self
    }

    /// Decoder with the lowest priority value for `id`
    pub fn get(&self, id: &ProtocolId) -> Option<&Arc<dyn ErasedDecoder>> {
        self.decoders
            .get(id)
            .and_then(|entries| entries.first())
            .map(|e| &e.decoder)
    }

    /// All decoders registered for `id`, with their priority, best first
    pub fn candidates<'r>(
        &'r self,
        id: &ProtocolId,
    ) -> impl Iterator<Item = (i32, &'r Arc<dyn ErasedDecoder>)> + 'r {
        self.decoders
            .get(id)
            .into_iter()
            .flat_map(|entries| entries.iter().map(|e| (e.priority, &e.decoder)))
    }

    /// Number of registered identifiers
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut m = f.debug_map();
        for (id, entries) in &self.decoders {
            let names: Vec<_> = entries
                .iter()
                .map(|e| (e.priority, e.decoder.protocol_name()))
                .collect();
            m.entry(id, &names);
        }
        m.finish()
    }
}
