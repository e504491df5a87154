//! Type-to-codec table
//!
//! Maps each protocol [`Type`] that has a codec to a constructor returning a
//! fresh, zero-valued [`Packet`] of that variant. Types without a codec
//! (`Tcp`, `Lldp`, `None`) yield `None`, which the stacking engine treats as
//! the end of decodable layers.

use crate::arp::Arp;
use crate::ethernet::Ethernet;
use crate::icmpv4::Icmpv4;
use crate::icmpv6::Icmpv6;
use crate::ipv4::Ipv4;
use crate::ipv6::Ipv6;
use crate::packet::Packet;
use crate::raw::Raw;
use crate::udp::Udp;
use crate::vlan::Vlan;
use hype_core::Type;

/// Constructor for a zero-valued packet of `kind`, if it has a codec
pub fn constructor_for(kind: Type) -> Option<fn() -> Packet> {
    let constructor: fn() -> Packet = match kind {
        Type::Ethernet => || Packet::Ethernet(Ethernet::new()),
        Type::Vlan => || Packet::Vlan(Vlan::new()),
        Type::Arp => || Packet::Arp(Arp::new()),
        Type::Ipv4 => || Packet::Ipv4(Ipv4::new()),
        Type::Ipv6 => || Packet::Ipv6(Ipv6::new()),
        Type::Icmpv4 => || Packet::Icmpv4(Icmpv4::new()),
        Type::Icmpv6 => || Packet::Icmpv6(Icmpv6::new()),
        Type::Udp => || Packet::Udp(Udp::new()),
        Type::Raw => || Packet::Raw(Raw::default()),
        Type::None | Type::Tcp | Type::Lldp => return None,
    };
    Some(constructor)
}
