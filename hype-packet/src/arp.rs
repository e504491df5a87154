//! ARP over Ethernet/IPv4 (RFC 826)
//!
//! Only the 28-byte Ethernet/IPv4 form is supported: hardware address length
//! 6 and protocol address length 4. ARP never carries a payload.

use crate::buffer::Buffer;
use crate::packet::Layer;
use crate::render::Field;
use hype_core::{Error, EtherType, MacAddr, Result, Type};
use std::fmt;
use std::net::Ipv4Addr;

/// ARP operation code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArpOperation(pub u16);

impl ArpOperation {
    pub const REQUEST: ArpOperation = ArpOperation(1);
    pub const REPLY: ArpOperation = ArpOperation(2);
}

impl Default for ArpOperation {
    fn default() -> Self {
        ArpOperation::REQUEST
    }
}

impl fmt::Display for ArpOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ArpOperation::REQUEST => f.write_str("request"),
            ArpOperation::REPLY => f.write_str("reply"),
            ArpOperation(other) => write!(f, "{}", other),
        }
    }
}

/// ARP message
#[derive(Debug, Clone, PartialEq)]
pub struct Arp {
    pub hardware_type: u16,
    pub protocol_type: EtherType,
    pub operation: ArpOperation,
    pub sender_hw_addr: MacAddr,
    pub sender_proto_addr: Ipv4Addr,
    pub target_hw_addr: MacAddr,
    pub target_proto_addr: Ipv4Addr,
}

impl Arp {
    pub const HEADER_SIZE: u16 = 28;

    /// Hardware type for Ethernet
    pub const HARDWARE_ETHERNET: u16 = 1;

    const HW_ADDR_LEN: u8 = 6;
    const PROTO_ADDR_LEN: u8 = 4;

    /// An Ethernet/IPv4 request with all addresses zeroed
    pub fn new() -> Self {
        Arp {
            hardware_type: Self::HARDWARE_ETHERNET,
            protocol_type: EtherType::IPV4,
            operation: ArpOperation::REQUEST,
            sender_hw_addr: MacAddr::ZERO,
            sender_proto_addr: Ipv4Addr::UNSPECIFIED,
            target_hw_addr: MacAddr::ZERO,
            target_proto_addr: Ipv4Addr::UNSPECIFIED,
        }
    }

    /// Who-has request for `target`
    pub fn request(sender_mac: MacAddr, sender_ip: Ipv4Addr, target: Ipv4Addr) -> Self {
        Arp {
            sender_hw_addr: sender_mac,
            sender_proto_addr: sender_ip,
            target_proto_addr: target,
            ..Self::new()
        }
    }

    /// Probe (RFC 5227): a request with an unspecified sender address
    pub fn probe(sender_mac: MacAddr, target: Ipv4Addr) -> Self {
        Self::request(sender_mac, Ipv4Addr::UNSPECIFIED, target)
    }

    pub fn is_reply(&self) -> bool {
        self.operation == ArpOperation::REPLY
    }
}

impl Default for Arp {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for Arp {
    fn kind(&self) -> Type {
        Type::Arp
    }

    fn header_len(&self) -> usize {
        usize::from(Self::HEADER_SIZE)
    }

    fn encode(&self, buf: &mut Buffer) -> Result<()> {
        buf.write_int(self.hardware_type);
        buf.write_int(self.protocol_type.to_u16());
        buf.write_int(Self::HW_ADDR_LEN);
        buf.write_int(Self::PROTO_ADDR_LEN);
        buf.write_int(self.operation.0);
        buf.write_bytes(self.sender_hw_addr.as_bytes());
        buf.write_bytes(&self.sender_proto_addr.octets());
        buf.write_bytes(self.target_hw_addr.as_bytes());
        buf.write_bytes(&self.target_proto_addr.octets());
        Ok(())
    }

    fn decode(&mut self, buf: &mut Buffer) -> Result<()> {
        self.hardware_type = buf.read_int()?;
        self.protocol_type = EtherType(buf.read_int()?);

        let hw_len: u8 = buf.read_int()?;
        let proto_len: u8 = buf.read_int()?;
        if hw_len != Self::HW_ADDR_LEN || proto_len != Self::PROTO_ADDR_LEN {
            return Err(Error::parsing(format!(
                "unsupported ARP address lengths {}/{}",
                hw_len, proto_len
            )));
        }

        self.operation = ArpOperation(buf.read_int()?);
        self.sender_hw_addr = MacAddr(buf.read_array()?);
        self.sender_proto_addr = Ipv4Addr::from(buf.read_array::<4>()?);
        self.target_hw_addr = MacAddr(buf.read_array()?);
        self.target_proto_addr = Ipv4Addr::from(buf.read_array::<4>()?);
        Ok(())
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::plain("op", self.operation),
            Field::plain("hwsrc", self.sender_hw_addr),
            Field::plain("psrc", self.sender_proto_addr),
            Field::plain("hwdst", self.target_hw_addr),
            Field::plain("pdst", self.target_proto_addr),
        ]
    }
}
