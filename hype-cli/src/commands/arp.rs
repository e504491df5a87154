//! Resolve an IPv4 address with an ARP request

use std::net::Ipv4Addr;

use hype_capture::{filters, CaptureHandle};
use hype_core::{MacAddr, Result, Type};
use hype_packet::{pack, Arp, Ethernet, Packet};
use tracing::{debug, info};

use super::wait_for;

#[derive(Debug, Clone)]
pub struct ArpRequest {
    pub source_mac: MacAddr,
    pub source_ip: Ipv4Addr,
    pub target: Ipv4Addr,
    /// Give up after inspecting this many frames
    pub limit: Option<u64>,
}

/// Broadcast a who-has for `request.target` and wait for the matching reply.
///
/// Returns `None` if the capture source ran dry or the frame limit was hit
/// before a reply arrived.
pub fn resolve<H: CaptureHandle>(
    handle: &mut H,
    request: &ArpRequest,
) -> Result<Option<MacAddr>> {
    handle.activate()?;
    handle.apply_filter(&filters::protocol(Type::Arp))?;

    let frame = pack(vec![
        Ethernet::new()
            .with_addresses(MacAddr::BROADCAST, request.source_mac)
            .into(),
        Arp::request(request.source_mac, request.source_ip, request.target).into(),
    ])?;

    handle.inject(&frame)?;
    debug!("Sent ARP request for {}", request.target);

    let found = wait_for(handle, request.limit, |layers| {
        layers.iter().find_map(|layer| match layer {
            Packet::Arp(arp) if arp.is_reply() && arp.sender_proto_addr == request.target => {
                Some(arp.sender_hw_addr)
            }
            _ => None,
        })
    })?;

    if let Some(mac) = found {
        info!("{} is at {}", request.target, mac);
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hype_capture::MemoryCapture;
    use hype_packet::{unpack_all, ArpOperation, Vlan};

    const OUR_MAC: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 1]);
    const THEIR_MAC: MacAddr = MacAddr([0x00, 0x21, 0x96, 0x6e, 0xf0, 0x70]);

    fn request() -> ArpRequest {
        ArpRequest {
            source_mac: OUR_MAC,
            source_ip: Ipv4Addr::new(192, 168, 1, 10),
            target: Ipv4Addr::new(192, 168, 1, 1),
            limit: None,
        }
    }

    fn reply_from(sender: Ipv4Addr, mac: MacAddr) -> Vec<u8> {
        let arp = Arp {
            operation: ArpOperation::REPLY,
            sender_hw_addr: mac,
            sender_proto_addr: sender,
            target_hw_addr: OUR_MAC,
            target_proto_addr: Ipv4Addr::new(192, 168, 1, 10),
            ..Arp::new()
        };
        pack(vec![Ethernet::new().with_addresses(OUR_MAC, mac).into(), arp.into()]).unwrap()
    }

    #[test]
    fn test_sends_broadcast_request() {
        let mut handle = MemoryCapture::new(Type::Ethernet);
        assert_eq!(resolve(&mut handle, &request()).unwrap(), None);

        assert_eq!(handle.filter(), Some("arp"));
        assert_eq!(handle.injected().len(), 1);

        let layers = unpack_all(&handle.injected()[0], Type::Ethernet).unwrap();
        assert_eq!(layers.len(), 2);
        match (&layers[0], &layers[1]) {
            (Packet::Ethernet(eth), Packet::Arp(arp)) => {
                assert_eq!(eth.destination, MacAddr::BROADCAST);
                assert_eq!(eth.source, OUR_MAC);
                assert!(!arp.is_reply());
                assert_eq!(arp.target_proto_addr, Ipv4Addr::new(192, 168, 1, 1));
            }
            other => panic!("unexpected layers {:?}", other),
        }
    }

    #[test]
    fn test_matches_reply_from_target() {
        let mut handle = MemoryCapture::new(Type::Ethernet).with_frames(vec![
            vec![0u8; 3],
            reply_from(Ipv4Addr::new(192, 168, 1, 99), MacAddr([0x02, 0, 0, 0, 0, 99])),
            reply_from(Ipv4Addr::new(192, 168, 1, 1), THEIR_MAC),
        ]);

        assert_eq!(resolve(&mut handle, &request()).unwrap(), Some(THEIR_MAC));
    }

    #[test]
    fn test_ignores_requests_for_target() {
        let echoed = Arp::request(
            THEIR_MAC,
            Ipv4Addr::new(192, 168, 1, 1),
            Ipv4Addr::new(192, 168, 1, 10),
        );
        let frame = pack(vec![Ethernet::new().into(), echoed.into()]).unwrap();
        let mut handle = MemoryCapture::new(Type::Ethernet).with_frames(vec![frame]);

        assert_eq!(resolve(&mut handle, &request()).unwrap(), None);
    }

    #[test]
    fn test_gives_up_at_limit() {
        let mut handle = MemoryCapture::new(Type::Ethernet).with_frames(vec![
            reply_from(Ipv4Addr::new(192, 168, 1, 99), MacAddr([0x02, 0, 0, 0, 0, 99])),
            reply_from(Ipv4Addr::new(192, 168, 1, 1), THEIR_MAC),
        ]);
        let request = ArpRequest {
            limit: Some(1),
            ..request()
        };

        assert_eq!(resolve(&mut handle, &request).unwrap(), None);
        assert_eq!(handle.capture().unwrap().map(|f| f.len()), Some(42));
    }

    #[test]
    fn test_matches_reply_behind_vlan_tag() {
        let arp = Arp {
            operation: ArpOperation::REPLY,
            sender_hw_addr: THEIR_MAC,
            sender_proto_addr: Ipv4Addr::new(192, 168, 1, 1),
            ..Arp::new()
        };
        let frame = pack(vec![
            Ethernet::new().with_addresses(OUR_MAC, THEIR_MAC).into(),
            Vlan::new().with_vlan_id(10).into(),
            arp.into(),
        ])
        .unwrap();
        let mut handle = MemoryCapture::new(Type::Ethernet).with_frames(vec![frame]);

        assert_eq!(resolve(&mut handle, &request()).unwrap(), Some(THEIR_MAC));
    }
}
