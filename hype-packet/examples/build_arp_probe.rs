//! Example: Building an ARP probe
//!
//! Builds the broadcast "who-has" probe used for address conflict detection
//! and prints its rendered form.

use hype_core::MacAddr;
use hype_packet::{link, Arp, Ethernet, Layer};
use std::net::Ipv4Addr;

fn main() {
    let src_mac = MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    let target = Ipv4Addr::new(192, 168, 1, 10);

    let chain = link(vec![
        Ethernet::new()
            .with_addresses(MacAddr::BROADCAST, src_mac)
            .into(),
        Arp::probe(src_mac, target).into(),
    ])
    .expect("Failed to link ARP probe");

    println!("ARP probe: {}", chain);
    println!("Wire length: {} bytes", chain.wire_length());

    let bytes = hype_packet::pack(vec![chain]).expect("Failed to encode ARP probe");
    println!("Bytes: {:02X?}", bytes);
}
