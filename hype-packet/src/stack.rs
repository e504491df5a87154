//! Stacking engine
//!
//! [`pack`] nests an ordered list of layers (outermost first) into one chain,
//! hands checksum seeds down the chain and encodes it into a single buffer.
//! [`unpack_all`] walks raw bytes from a known first layer, following each
//! layer's declared payload type through the codec table until a layer
//! declares no payload or a type with no codec.

use crate::buffer::Buffer;
use crate::packet::{Layer, Packet};
use crate::registry::constructor_for;
use hype_core::{Error, Result, Type};
use tracing::{debug, trace};

/// Decoding options for [`unpack_all_with`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnpackOptions {
    /// Verify each layer's checksum, failing with `ChecksumMismatch`
    pub verify_checksums: bool,
}

/// Nest `layers` (outermost first) into one owned chain.
///
/// Fails with `PacketConstruction` on an empty list or when a layer cannot
/// carry the layer after it.
pub fn link(layers: Vec<Packet>) -> Result<Packet> {
    let mut inner_first = layers.into_iter().rev();
    let mut chain = inner_first
        .next()
        .ok_or_else(|| Error::construction("no layers to pack"))?;

    for mut outer in inner_first {
        outer.set_payload(chain)?;
        chain = outer;
    }
    Ok(chain)
}

/// Encode `layers` (outermost first) into one contiguous byte sequence
pub fn pack(layers: Vec<Packet>) -> Result<Vec<u8>> {
    let mut chain = link(layers).map_err(|e| {
        debug!(error = %e, "failed to link layers");
        e
    })?;
    chain.seed_checksums();

    let mut buf = Buffer::with_capacity(chain.wire_length());
    chain.encode(&mut buf).map_err(|e| {
        debug!(error = %e, "failed to encode {}", chain.kind());
        e
    })?;
    Ok(buf.into_vec())
}

/// Decode every layer of `raw`, starting with a layer of type `first`.
///
/// Each element's `payload_type()` equals the `kind()` of the element after
/// it. Bytes past the last decodable layer are left undecoded.
pub fn unpack_all(raw: &[u8], first: Type) -> Result<Vec<Packet>> {
    unpack_all_with(raw, first, UnpackOptions::default())
}

/// [`unpack_all`] with options
pub fn unpack_all_with(raw: &[u8], first: Type, options: UnpackOptions) -> Result<Vec<Packet>> {
    let mut constructor = constructor_for(first).ok_or(Error::UnknownLinkType(first))?;

    let mut buf = Buffer::from_slice(raw);
    let mut layers = Vec::new();
    let mut seed = None;

    loop {
        let start = buf.position();
        let mut packet = constructor();
        packet.decode(&mut buf).map_err(|e| {
            debug!(error = %e, offset = start, "failed to decode {}", packet.kind());
            e
        })?;

        if options.verify_checksums
            && !packet.verify_checksum(&raw[start..buf.window_end()], seed)
        {
            debug!(offset = start, "bad {} checksum", packet.kind());
            return Err(Error::ChecksumMismatch(packet.kind()));
        }

        seed = packet.pseudo_header_sum(buf.remaining_len() as u32);

        let next = packet.payload_type();
        layers.push(packet);

        if next.is_none() {
            break;
        }
        match constructor_for(next) {
            Some(c) => constructor = c,
            None => {
                trace!(offset = buf.position(), "no codec for {}, stopping", next);
                break;
            }
        }
    }

    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arp::Arp;
    use crate::checksum::validate_checksum;
    use crate::ethernet::Ethernet;
    use crate::icmpv4::{IcmpType, Icmpv4};
    use crate::icmpv6::Icmpv6;
    use crate::ipv4::Ipv4;
    use crate::ipv6::Ipv6;
    use crate::raw::Raw;
    use crate::udp::{Udp, UdpPort};
    use crate::vlan::Vlan;
    use hype_core::{EtherType, IpProtocol, MacAddr};
    use std::net::Ipv4Addr;

    const SRC_MAC: MacAddr = MacAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
    const DST_MAC: MacAddr = MacAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x02]);

    fn ping_layers() -> Vec<Packet> {
        vec![
            Ethernet::new().with_addresses(DST_MAC, SRC_MAC).into(),
            Ipv4::new()
                .with_addresses(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2))
                .into(),
            Icmpv4::echo_request(0x4242, 1).into(),
        ]
    }

    fn assert_linked(layers: &[Packet]) {
        for pair in layers.windows(2) {
            assert_eq!(pair[0].payload_type(), pair[1].kind());
        }
    }

    #[test]
    fn test_pack_arp_probe() {
        let bytes = pack(vec![
            Ethernet::new()
                .with_addresses(MacAddr::BROADCAST, SRC_MAC)
                .into(),
            Arp::probe(SRC_MAC, Ipv4Addr::new(192, 168, 1, 10)).into(),
        ])
        .unwrap();

        assert_eq!(bytes.len(), 42);
        assert_eq!(&bytes[12..14], &[0x08, 0x06]);
        assert_eq!(&bytes[0..6], &[0xff; 6]);
    }

    #[test]
    fn test_pack_empty() {
        let err = pack(vec![]).unwrap_err();
        assert!(matches!(err, Error::PacketConstruction(_)));
    }

    #[test]
    fn test_pack_inconsistent_layers() {
        let err = pack(vec![Ethernet::new().into(), Udp::new().into()]).unwrap_err();
        assert!(matches!(err, Error::PacketConstruction(_)));

        let err = pack(vec![Arp::new().into(), Raw::new(vec![1]).into()]).unwrap_err();
        assert!(matches!(err, Error::PacketConstruction(_)));
    }

    #[test]
    fn test_unpack_truncated_ethernet() {
        let err = unpack_all(&[0u8; 13], Type::Ethernet).unwrap_err();
        assert!(matches!(
            err,
            Error::ShortBuffer {
                needed: 2,
                remaining: 1
            }
        ));
    }

    #[test]
    fn test_unpack_truncated_inner_layer_fails_whole_call() {
        let bytes = pack(ping_layers()).unwrap();
        let err = unpack_all(&bytes[..bytes.len() - 3], Type::Ethernet).unwrap_err();
        assert!(err.is_short_buffer());
    }

    #[test]
    fn test_unpack_unknown_ether_type() {
        let mut frame = vec![0u8; 14];
        frame[12..14].copy_from_slice(&[0x88, 0xb5]);
        frame.extend_from_slice(&[0xaa; 20]);

        let layers = unpack_all(&frame, Type::Ethernet).unwrap();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].kind(), Type::Ethernet);
    }

    #[test]
    fn test_unpack_unknown_link_type() {
        let err = unpack_all(&[0u8; 64], Type::Tcp).unwrap_err();
        assert!(matches!(err, Error::UnknownLinkType(Type::Tcp)));

        let err = unpack_all(&[0u8; 64], Type::None).unwrap_err();
        assert!(matches!(err, Error::UnknownLinkType(Type::None)));
    }

    #[test]
    fn test_unpack_stops_at_unregistered_type() {
        let mut ip = Ipv4::new();
        ip.protocol = IpProtocol::TCP;
        let bytes = pack(vec![
            Ethernet::new().into(),
            ip.into(),
            Raw::new(vec![0; 20]).into(),
        ])
        .unwrap();

        let layers = unpack_all(&bytes, Type::Ethernet).unwrap();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[1].payload_type(), Type::Tcp);
    }

    #[test]
    fn test_round_trip_ping() {
        let bytes = pack(ping_layers()).unwrap();
        assert_eq!(bytes.len(), 14 + 20 + 8);

        let layers = unpack_all(&bytes, Type::Ethernet).unwrap();
        let kinds: Vec<Type> = layers.iter().map(|l| l.kind()).collect();
        assert_eq!(kinds, vec![Type::Ethernet, Type::Ipv4, Type::Icmpv4]);
        assert_linked(&layers);

        match &layers[2] {
            Packet::Icmpv4(icmp) => {
                assert_eq!(icmp.icmp_type, IcmpType::ECHO_REQUEST);
                assert_eq!(icmp.id, 0x4242);
            }
            other => panic!("unexpected layer {:?}", other),
        }

        assert_eq!(pack(layers).unwrap(), bytes);
    }

    #[test]
    fn test_icmp_checksum_detects_corruption() {
        let bytes = pack(ping_layers()).unwrap();
        assert_eq!(pack(ping_layers()).unwrap(), bytes);

        let icmp = &bytes[34..];
        assert!(validate_checksum(icmp, 0));

        let mut corrupted = bytes.clone();
        corrupted[38] ^= 0x01;
        assert!(!validate_checksum(&corrupted[34..], 0));

        let err = unpack_all_with(
            &corrupted,
            Type::Ethernet,
            UnpackOptions {
                verify_checksums: true,
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch(Type::Icmpv4)));

        // verification is opt-in
        assert_eq!(unpack_all(&corrupted, Type::Ethernet).unwrap().len(), 3);
    }

    #[test]
    fn test_link_padding_does_not_leak() {
        let mut bytes = pack(ping_layers()).unwrap();
        bytes.extend_from_slice(&[0u8; 18]);

        let layers = unpack_all(&bytes, Type::Ethernet).unwrap();
        assert_eq!(layers.len(), 3);
    }

    #[test]
    fn test_vlan_udp_round_trip_verifies() {
        let mut vlan = Vlan::new().with_priority(5).with_vlan_id(100);
        vlan.drop_eligible = true;

        let layers = vec![
            Ethernet::new().with_addresses(DST_MAC, SRC_MAC).into(),
            vlan.into(),
            Ipv4::new()
                .with_addresses(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2))
                .into(),
            Udp::new().with_ports(UdpPort(5353), UdpPort(5353)).into(),
            Raw::new(b"hello".to_vec()).into(),
        ];
        let bytes = pack(layers).unwrap();
        assert_eq!(&bytes[12..14], &[0x81, 0x00]);
        assert_eq!(&bytes[14..16], &[0xb0, 0x64]);
        assert_eq!(&bytes[16..18], &[0x08, 0x00]);

        let decoded = unpack_all_with(
            &bytes,
            Type::Ethernet,
            UnpackOptions {
                verify_checksums: true,
            },
        )
        .unwrap();
        let kinds: Vec<Type> = decoded.iter().map(|l| l.kind()).collect();
        assert_eq!(
            kinds,
            vec![Type::Ethernet, Type::Vlan, Type::Ipv4, Type::Udp, Type::Raw]
        );
        assert_linked(&decoded);
        assert_eq!(decoded[4], Packet::Raw(Raw::new(b"hello".to_vec())));
    }

    #[test]
    fn test_ipv6_seeds_icmpv6() {
        let layers = vec![
            Ethernet::new().into(),
            Ipv6::new()
                .with_addresses("fe80::1".parse().unwrap(), "fe80::2".parse().unwrap())
                .into(),
            Icmpv6::echo_request(1, 1).into(),
        ];
        let bytes = pack(layers).unwrap();
        assert_eq!(&bytes[12..14], &[0x86, 0xdd]);
        // seeded: checksum present
        assert_ne!(&bytes[56..58], &[0, 0]);

        let options = UnpackOptions {
            verify_checksums: true,
        };
        assert_eq!(unpack_all_with(&bytes, Type::Ethernet, options).unwrap().len(), 3);

        let mut corrupted = bytes.clone();
        corrupted[61] ^= 0x80;
        let err = unpack_all_with(&corrupted, Type::Ethernet, options).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch(Type::Icmpv6)));
    }

    #[test]
    fn test_icmpv6_over_ipv4_is_seeded() {
        let bytes = pack(vec![
            Ipv4::new()
                .with_addresses(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2))
                .into(),
            Icmpv6::new().into(),
        ])
        .unwrap();
        assert_eq!(bytes[9], 58);
        assert_ne!(&bytes[22..24], &[0, 0]);

        let layers = unpack_all(&bytes, Type::Ipv4).unwrap();
        assert_eq!(layers.len(), 2);
    }

    #[test]
    fn test_link_builds_nested_chain() {
        let chain = link(ping_layers()).unwrap();
        assert_eq!(chain.layers().count(), 3);
        assert_eq!(chain.wire_length(), 42);
        match &chain {
            Packet::Ethernet(eth) => assert_eq!(eth.ether_type, EtherType::IPV4),
            other => panic!("unexpected layer {:?}", other),
        }
    }

    #[test]
    fn test_unpack_reverses_pack() {
        let layers: Vec<Packet> = vec![
            Ethernet::new()
                .with_addresses(MacAddr::BROADCAST, SRC_MAC)
                .with_ether_type(EtherType::ARP)
                .into(),
            Arp::request(SRC_MAC, Ipv4Addr::new(192, 168, 1, 10), Ipv4Addr::new(192, 168, 1, 1))
                .into(),
        ];

        let bytes = pack(layers.clone()).unwrap();
        assert_eq!(unpack_all(&bytes, Type::Ethernet).unwrap(), layers);
    }

    #[test]
    fn test_pack_rejects_oversized_ipv4() {
        let err = pack(vec![
            Ethernet::new().into(),
            Ipv4::new().into(),
            Raw::new(vec![0xab; 65536]).into(),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::PacketConstruction(_)));

        let bytes = pack(vec![Ipv4::new().into(), Raw::new(vec![0xab; 65515]).into()]).unwrap();
        assert_eq!(bytes.len(), 65535);
        assert_eq!(&bytes[2..4], &[0xff, 0xff]);
    }

    #[test]
    fn test_pack_rejects_oversized_ipv6_and_udp() {
        let err = pack(vec![Ipv6::new().into(), Raw::new(vec![0; 65536]).into()]).unwrap_err();
        assert!(matches!(err, Error::PacketConstruction(_)));

        let err = pack(vec![Udp::new().into(), Raw::new(vec![0; 65528]).into()]).unwrap_err();
        assert!(matches!(err, Error::PacketConstruction(_)));
    }

    #[test]
    fn test_large_frame_without_length_field() {
        let layers: Vec<Packet> = vec![Ethernet::new().into(), Raw::new(vec![0; 70000]).into()];
        assert_eq!(link(layers.clone()).unwrap().wire_length(), 70014);
        assert_eq!(pack(layers).unwrap().len(), 70014);
    }
}
