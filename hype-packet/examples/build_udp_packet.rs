//! Example: Building a UDP packet
//!
//! This example demonstrates how to use the hype-packet crate to build
//! a complete UDP packet with Ethernet, IPv4, and UDP layers, then decode
//! it again.

use hype_core::{MacAddr, Type};
use hype_packet::{pack, unpack_all, Ethernet, Ipv4, Raw, Udp, UdpPort};
use std::net::Ipv4Addr;

fn main() {
    // Network addresses
    let src_mac = MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    let dst_mac = MacAddr([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
    let src_ip = Ipv4Addr::new(192, 168, 1, 100);
    let dst_ip = Ipv4Addr::new(192, 168, 1, 1);

    // DNS query payload (simplified)
    let dns_query = vec![
        0x12, 0x34, // Transaction ID
        0x01, 0x00, // Flags: standard query
        0x00, 0x01, // Questions: 1
        0x00, 0x00, // Answer RRs: 0
        0x00, 0x00, // Authority RRs: 0
        0x00, 0x00, // Additional RRs: 0
    ];

    let packet = pack(vec![
        Ethernet::new().with_addresses(dst_mac, src_mac).into(),
        Ipv4::new().with_addresses(src_ip, dst_ip).with_ttl(64).into(),
        Udp::new().with_ports(UdpPort(54321), UdpPort::DNS).into(),
        Raw::new(dns_query).into(),
    ])
    .expect("Failed to build UDP packet");

    println!("UDP packet built successfully!");
    println!("Total size: {} bytes", packet.len());
    println!("Ethernet header: {:02X?}", &packet[..14]);
    println!("IP protocol: {} (UDP)", packet[23]);
    println!("UDP checksum: {:02X?}", &packet[40..42]);

    let layers = unpack_all(&packet, Type::Ethernet).expect("Failed to decode UDP packet");
    for layer in &layers {
        println!("  {}", layer);
    }
}
