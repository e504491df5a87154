//! ICMP echo over a raw link

use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use hype_capture::{filters, CaptureHandle};
use hype_core::{MacAddr, Result, Type};
use hype_packet::{pack, Ethernet, Icmpv4, Ipv4, Packet};
use tracing::{debug, info};

use super::wait_for;

#[derive(Debug, Clone)]
pub struct PingRequest {
    pub source_mac: MacAddr,
    /// Next hop towards `target`
    pub gateway_mac: MacAddr,
    pub source_ip: Ipv4Addr,
    pub target: Ipv4Addr,
    pub id: u16,
    pub seq: u16,
    /// Give up after inspecting this many frames
    pub limit: Option<u64>,
}

/// Send one echo request and wait for its reply.
///
/// Returns the round-trip time, or `None` if no reply was seen.
pub fn ping<H: CaptureHandle>(
    handle: &mut H,
    request: &PingRequest,
) -> Result<Option<Duration>> {
    handle.activate()?;
    handle.apply_filter(&filters::all_of(&[
        filters::protocol(Type::Icmpv4),
        filters::src_host(IpAddr::V4(request.target)),
    ]))?;

    let echo = Icmpv4::echo_request(request.id, request.seq);
    let frame = pack(vec![
        Ethernet::new()
            .with_addresses(request.gateway_mac, request.source_mac)
            .into(),
        Ipv4::new()
            .with_addresses(request.source_ip, request.target)
            .into(),
        echo.clone().into(),
    ])?;

    let sent = Instant::now();
    handle.inject(&frame)?;
    debug!(
        "Sent echo request id={} seq={} to {}",
        request.id, request.seq, request.target
    );

    let reply = wait_for(handle, request.limit, |layers| {
        let from_target = layers
            .iter()
            .any(|layer| matches!(layer, Packet::Ipv4(ip) if ip.source == request.target));
        let answers = layers
            .iter()
            .any(|layer| matches!(layer, Packet::Icmpv4(icmp) if icmp.answers(&echo)));
        (from_target && answers).then(|| sent.elapsed())
    })?;

    if let Some(rtt) = reply {
        info!("Reply from {}: seq={} time={:?}", request.target, request.seq, rtt);
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hype_capture::MemoryCapture;
    use hype_packet::{unpack_all, IcmpType, Layer};

    const OUR_MAC: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 1]);
    const GATEWAY_MAC: MacAddr = MacAddr([0x00, 0x21, 0x96, 0x6e, 0xf0, 0x70]);
    const OUR_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);
    const TARGET: Ipv4Addr = Ipv4Addr::new(8, 8, 8, 8);

    fn request() -> PingRequest {
        PingRequest {
            source_mac: OUR_MAC,
            gateway_mac: GATEWAY_MAC,
            source_ip: OUR_IP,
            target: TARGET,
            id: 666,
            seq: 1,
            limit: None,
        }
    }

    fn reply(from: Ipv4Addr, id: u16, seq: u16) -> Vec<u8> {
        let icmp = Icmpv4 {
            icmp_type: IcmpType::ECHO_REPLY,
            ..Icmpv4::echo_request(id, seq)
        };
        pack(vec![
            Ethernet::new().with_addresses(OUR_MAC, GATEWAY_MAC).into(),
            Ipv4::new().with_addresses(from, OUR_IP).into(),
            icmp.into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_sends_echo_request() {
        let mut handle = MemoryCapture::new(Type::Ethernet);
        assert_eq!(ping(&mut handle, &request()).unwrap(), None);

        assert_eq!(handle.filter(), Some("(icmp) and (src host 8.8.8.8)"));
        assert_eq!(handle.injected().len(), 1);

        let layers = unpack_all(&handle.injected()[0], Type::Ethernet).unwrap();
        let kinds: Vec<Type> = layers.iter().map(|l| l.kind()).collect();
        assert_eq!(kinds, vec![Type::Ethernet, Type::Ipv4, Type::Icmpv4]);

        match (&layers[0], &layers[1], &layers[2]) {
            (Packet::Ethernet(eth), Packet::Ipv4(ip), Packet::Icmpv4(icmp)) => {
                assert_eq!(eth.destination, GATEWAY_MAC);
                assert_eq!(ip.source, OUR_IP);
                assert_eq!(ip.destination, TARGET);
                assert_eq!(icmp.icmp_type, IcmpType::ECHO_REQUEST);
                assert_eq!(icmp.id, 666);
            }
            other => panic!("unexpected layers {:?}", other),
        }
    }

    #[test]
    fn test_waits_for_matching_reply() {
        let mut handle = MemoryCapture::new(Type::Ethernet).with_frames(vec![
            reply(TARGET, 1, 1),
            reply(Ipv4Addr::new(1, 1, 1, 1), 666, 1),
            reply(TARGET, 666, 1),
        ]);

        assert!(ping(&mut handle, &request()).unwrap().is_some());
        assert_eq!(handle.capture().unwrap(), None);
    }

    #[test]
    fn test_no_reply_within_limit() {
        let mut handle = MemoryCapture::new(Type::Ethernet)
            .with_frames(vec![reply(TARGET, 666, 2), reply(TARGET, 666, 1)]);
        let request = PingRequest {
            limit: Some(1),
            ..request()
        };

        assert_eq!(ping(&mut handle, &request).unwrap(), None);
    }

    #[test]
    fn test_matches_reply_on_raw_ip_link() {
        let icmp = Icmpv4 {
            icmp_type: IcmpType::ECHO_REPLY,
            ..Icmpv4::echo_request(666, 1)
        };
        let frame = pack(vec![
            Ipv4::new().with_addresses(TARGET, OUR_IP).into(),
            icmp.into(),
        ])
        .unwrap();
        let mut handle = MemoryCapture::new(Type::Ipv4).with_frames(vec![frame]);

        assert!(ping(&mut handle, &request()).unwrap().is_some());
    }
}
