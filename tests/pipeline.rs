use hex_literal::hex;
use pcap_dissector::protocols::dns::RData;
use pcap_dissector::*;

static ETH_UNKNOWN: &[u8] = &hex!(
    "
00 11 22 33 44 55 66 77 88 99 aa bb 88 b5
de ad be ef"
);

static DNS_RESPONSE: &[u8] = &hex!(
    "
12 34 81 80 00 01 00 01 00 00 00 00
03 77 77 77 07 65 78 61 6d 70 6c 65 03 63 6f 6d 00 00 01 00 01
c0 0c 00 01 00 01 00 00 0e 10 00 04 5d b8 d8 22"
);

/// Ethernet / IPv4 / UDP (53 -> 40000) frame around `payload`
fn dns_frame(payload: &[u8]) -> Vec<u8> {
    let mut v = hex!("00 11 22 33 44 55 66 77 88 99 aa bb 08 00").to_vec();
    let total = (20 + 8 + payload.len()) as u16;
    v.extend_from_slice(&[0x45, 0x00]);
    v.extend_from_slice(&total.to_be_bytes());
    v.extend_from_slice(&hex!("00 01 00 00 40 11 00 00 c0 a8 00 01 c0 a8 00 02"));
    let udp_len = (8 + payload.len()) as u16;
    v.extend_from_slice(&hex!("00 35 9c 40"));
    v.extend_from_slice(&udp_len.to_be_bytes());
    v.extend_from_slice(&[0, 0]);
    v.extend_from_slice(payload);
    v
}

#[test]
fn test_unregistered_ethertype() {
    let pipeline = DecodePipeline::default();
    let packet = pipeline.decode_packet(ETH_UNKNOWN, ProtocolId::Link(Linktype::ETHERNET));
    assert_eq!(packet.layers.len(), 2);
    assert_eq!(packet.layers[0].protocol_name(), "Ethernet");
    match &packet.layers[1] {
        Layer::Raw {
            protocol_name,
            data,
        } => {
            assert_eq!(*protocol_name, RAW_DATA);
            assert_eq!(*data, &ETH_UNKNOWN[14..]);
        }
        l => panic!("unexpected layer {:?}", l),
    }
}

#[test]
fn test_ethernet_ipv4_udp_dns() {
    let frame = dns_frame(DNS_RESPONSE);
    let pipeline = DecodePipeline::default();
    let packet = pipeline.decode_packet(&frame, ProtocolId::Link(Linktype::ETHERNET));
    let names: Vec<_> = packet.layers.iter().map(|l| l.protocol_name()).collect();
    assert_eq!(names, vec!["Ethernet", "IPv4", "UDP", "DNS"]);
    match packet.layers[2].data() {
        Some(LayerData::Udp(udp)) => assert_eq!(udp.source_port, 53),
        d => panic!("unexpected data {:?}", d),
    }
    let dns = packet.dns().expect("dns layer");
    assert_eq!(dns.transaction_id, 0x1234);
    assert_eq!(dns.answers[0].name, "www.example.com");
    assert_eq!(
        dns.answers[0].rdata,
        RData::A("93.184.216.34".parse().unwrap())
    );
    assert_eq!(packet.reassemble(), frame);
}

#[test]
fn test_malformed_dns_becomes_raw() {
    let mut payload = DNS_RESPONSE.to_vec();
    // answer name points to itself
    payload[33] = 0xc0;
    payload[34] = 33;
    let frame = dns_frame(&payload);
    let pipeline = DecodePipeline::default();
    let packet = pipeline.decode_packet(&frame, ProtocolId::Link(Linktype::ETHERNET));
    assert_eq!(packet.layers.len(), 4);
    let last = packet.last().expect("layers");
    assert!(last.is_raw());
    match last {
        Layer::Raw { data, .. } => assert_eq!(*data, &payload[..]),
        l => panic!("unexpected layer {:?}", l),
    }
    assert!(packet.dns().is_none());
    assert_eq!(packet.reassemble(), frame);
}

#[test]
fn test_reassemble_truncated_prefixes() {
    // every prefix of a valid frame decodes, and reconstructs the input
    let frame = dns_frame(DNS_RESPONSE);
    let pipeline = DecodePipeline::default();
    for len in 0..=frame.len() {
        let buf = &frame[..len];
        let packet = pipeline.decode_packet(buf, ProtocolId::Link(Linktype::ETHERNET));
        assert!(packet.layers.len() <= buf.len().max(1));
        assert_eq!(packet.reassemble(), buf.to_vec(), "prefix of {} bytes", len);
    }
}

#[test]
fn test_decode_frames_from_pcap() {
    let frame = dns_frame(DNS_RESPONSE);
    let mut buf = hex!(
        "
D4 C3 B2 A1 02 00 04 00 00 00 00 00 00 00 00 00
00 00 04 00 01 00 00 00"
    )
    .to_vec();
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&(frame.len() as u32).to_le_bytes());
    buf.extend_from_slice(&(frame.len() as u32).to_le_bytes());
    buf.extend_from_slice(&frame);

    let pipeline = DecodePipeline::default();
    let reader = CaptureReader::from_slice(&buf).expect("reader");
    let mut count = 0;
    for frame in reader {
        let packet = pipeline.decode_frame(&frame);
        let dns = packet.dns().expect("dns");
        assert_eq!(dns.questions[0].name, "www.example.com");
        count += 1;
    }
    assert_eq!(count, 1);
}

#[test]
fn test_custom_decoder_takes_priority() {
    #[derive(Debug, PartialEq)]
    struct Port(u16);

    struct PortDecoder;

    impl Decoder for PortDecoder {
        type Data = LayerData;

        fn protocol_name(&self) -> &'static str {
            "custom"
        }

        fn decode(
            &self,
            buffer: &[u8],
            ctx: &DecodeContext,
        ) -> Result<Option<Decoded<LayerData>>, PcapError> {
            match ctx.protocol {
                ProtocolId::UdpPort(p) => Ok(Some(Decoded::new(
                    buffer.len(),
                    LayerData::custom(Port(p)),
                ))),
                _ => Ok(None),
            }
        }

        fn next_protocol(&self, _data: &LayerData) -> Option<ProtocolId> {
            None
        }
    }

    let mut pipeline = DecodePipeline::default();
    pipeline
        .registry_mut()
        .register(ProtocolId::UdpPort(53), PortDecoder, 0);
    let frame = dns_frame(DNS_RESPONSE);
    let packet = pipeline.decode_frame(&Frame {
        timestamp: Timestamp::from_micros(0, 0),
        original_length: frame.len() as u32,
        captured_length: frame.len() as u32,
        interface: None,
        link_type: Linktype::ETHERNET,
        data: &frame,
    });
    let last = packet.last().and_then(|l| l.data()).expect("custom layer");
    assert_eq!(last.downcast_ref::<Port>(), Some(&Port(53)));
    assert!(packet.dns().is_none());
}
