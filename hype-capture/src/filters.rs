//! BPF expression builders keyed on hype's protocol types

use std::net::IpAddr;

use hype_core::{EtherType, IpProtocol, Type};

/// Expression matching frames that carry `kind` somewhere in the stack.
///
/// Returns an empty expression, which libpcap treats as "match everything",
/// for types with no BPF counterpart (`Ethernet`, `Raw`, `None`).
pub fn protocol(kind: Type) -> String {
    match kind {
        Type::Vlan => "vlan".to_string(),
        Type::Arp => "arp".to_string(),
        Type::Ipv4 => "ip".to_string(),
        Type::Ipv6 => "ip6".to_string(),
        Type::Icmpv4 => "icmp".to_string(),
        Type::Icmpv6 => "icmp6".to_string(),
        Type::Udp => "udp".to_string(),
        Type::Tcp => "tcp".to_string(),
        other => match (other.ether_type(), other.ip_protocol()) {
            (Some(ether_type), _) => ether_proto(ether_type),
            (None, Some(protocol)) => ip_proto(protocol),
            (None, None) => String::new(),
        },
    }
}

pub fn ether_proto(ether_type: EtherType) -> String {
    format!("ether proto 0x{:04x}", ether_type.to_u16())
}

pub fn ip_proto(protocol: IpProtocol) -> String {
    format!("ip proto {}", protocol.to_u8())
}

/// 802.1Q frames tagged with `vlan_id`
pub fn vlan_id(vlan_id: u16) -> String {
    format!("vlan {}", vlan_id & 0x0fff)
}

pub fn src_host(addr: IpAddr) -> String {
    format!("src host {}", addr)
}

pub fn dst_host(addr: IpAddr) -> String {
    format!("dst host {}", addr)
}

/// Conjunction of `exprs`; empty expressions are dropped
pub fn all_of(exprs: &[String]) -> String {
    join(exprs, " and ")
}

/// Disjunction of `exprs`; empty expressions are dropped
pub fn any_of(exprs: &[String]) -> String {
    join(exprs, " or ")
}

fn join(exprs: &[String], op: &str) -> String {
    let parts: Vec<&String> = exprs.iter().filter(|e| !e.is_empty()).collect();
    match parts.as_slice() {
        [] => String::new(),
        [only] => (*only).clone(),
        many => many
            .iter()
            .map(|e| format!("({})", e))
            .collect::<Vec<_>>()
            .join(op),
    }
}
