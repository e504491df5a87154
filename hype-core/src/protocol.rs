//! Protocol type registry
//!
//! [`Type`] identifies every protocol hype knows about. The mappings here are
//! fixed at compile time and never mutated, so they can be consulted from any
//! number of threads without synchronization:
//!
//! - `Type` ↔ canonical name, used when rendering packets
//! - `Type` ↔ link-layer capture code, for types that can be the outermost
//!   layer of a captured frame
//! - `Type` ↔ EtherType, for types nested directly under Ethernet or 802.1Q
//! - `Type` ↔ IP protocol number, for types nested under IPv4 or IPv6
//!
//! The table that maps a `Type` to a codec lives in `hype-packet`, since it
//! needs the concrete packet variants.

use crate::types::{EtherType, IpProtocol};
use std::fmt;

/// Protocol identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Type {
    /// No further payload: decoding stops here
    #[default]
    None,
    Ethernet,
    Vlan,
    Arp,
    Ipv4,
    Ipv6,
    Icmpv4,
    Icmpv6,
    Udp,
    Tcp,
    Lldp,
    Raw,
}

/// Link-layer capture code for Ethernet (DLT_EN10MB)
pub const LINKTYPE_ETHERNET: u32 = 1;

/// Link-layer capture code for raw IPv4
pub const LINKTYPE_IPV4: u32 = 228;

/// Link-layer capture code for raw IPv6
pub const LINKTYPE_IPV6: u32 = 229;

impl Type {
    /// Canonical name used when rendering
    pub fn name(self) -> &'static str {
        match self {
            Type::None => "none",
            Type::Ethernet => "eth",
            Type::Vlan => "vlan",
            Type::Arp => "arp",
            Type::Ipv4 => "ipv4",
            Type::Ipv6 => "ipv6",
            Type::Icmpv4 => "icmpv4",
            Type::Icmpv6 => "icmpv6",
            Type::Udp => "udp",
            Type::Tcp => "tcp",
            Type::Lldp => "lldp",
            Type::Raw => "raw",
        }
    }

    /// Resolve a link-layer capture code; unknown codes map to `Type::None`
    pub fn from_link_type(code: u32) -> Type {
        match code {
            LINKTYPE_ETHERNET => Type::Ethernet,
            LINKTYPE_IPV4 => Type::Ipv4,
            LINKTYPE_IPV6 => Type::Ipv6,
            _ => Type::None,
        }
    }

    /// Link-layer capture code, for types that can be the outermost layer
    pub fn link_type(self) -> Option<u32> {
        match self {
            Type::Ethernet => Some(LINKTYPE_ETHERNET),
            Type::Ipv4 => Some(LINKTYPE_IPV4),
            Type::Ipv6 => Some(LINKTYPE_IPV6),
            _ => None,
        }
    }

    /// Resolve an EtherType; unknown values map to `Type::None`
    pub fn from_ether_type(ether_type: EtherType) -> Type {
        match ether_type {
            EtherType::IPV4 => Type::Ipv4,
            EtherType::ARP => Type::Arp,
            EtherType::VLAN => Type::Vlan,
            EtherType::IPV6 => Type::Ipv6,
            EtherType::LLDP => Type::Lldp,
            _ => Type::None,
        }
    }

    /// EtherType, for types that can be nested under Ethernet or 802.1Q
    pub fn ether_type(self) -> Option<EtherType> {
        match self {
            Type::Ipv4 => Some(EtherType::IPV4),
            Type::Arp => Some(EtherType::ARP),
            Type::Vlan => Some(EtherType::VLAN),
            Type::Ipv6 => Some(EtherType::IPV6),
            Type::Lldp => Some(EtherType::LLDP),
            _ => None,
        }
    }

    /// Resolve an IP protocol number; unknown values map to `Type::None`
    pub fn from_ip_protocol(protocol: IpProtocol) -> Type {
        match protocol {
            IpProtocol::ICMP => Type::Icmpv4,
            IpProtocol::TCP => Type::Tcp,
            IpProtocol::UDP => Type::Udp,
            IpProtocol::ICMPV6 => Type::Icmpv6,
            _ => Type::None,
        }
    }

    /// IP protocol number, for types that can be nested under IPv4 or IPv6
    pub fn ip_protocol(self) -> Option<IpProtocol> {
        match self {
            Type::Icmpv4 => Some(IpProtocol::ICMP),
            Type::Tcp => Some(IpProtocol::TCP),
            Type::Udp => Some(IpProtocol::UDP),
            Type::Icmpv6 => Some(IpProtocol::ICMPV6),
            _ => None,
        }
    }

    pub fn is_none(self) -> bool {
        self == Type::None
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
