//! ICMP for IPv6 (RFC 4443)
//!
//! The checksum covers the enclosing layer's pseudo-header, so it is only
//! computed once a seed has been handed down; without one the field is
//! written as zero.

use crate::buffer::Buffer;
use crate::checksum::{internet_checksum, validate_checksum};
use crate::icmpv4::code_field;
use crate::packet::Layer;
use crate::render::Field;
use hype_core::{Result, Type};
use std::fmt;

/// ICMPv6 message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Icmpv6Type(pub u8);

impl Icmpv6Type {
    pub const DESTINATION_UNREACHABLE: Icmpv6Type = Icmpv6Type(1);
    pub const PACKET_TOO_BIG: Icmpv6Type = Icmpv6Type(2);
    pub const TIME_EXCEEDED: Icmpv6Type = Icmpv6Type(3);
    pub const PARAMETER_PROBLEM: Icmpv6Type = Icmpv6Type(4);
    pub const ECHO_REQUEST: Icmpv6Type = Icmpv6Type(128);
    pub const ECHO_REPLY: Icmpv6Type = Icmpv6Type(129);
    pub const ROUTER_SOLICITATION: Icmpv6Type = Icmpv6Type(133);
    pub const ROUTER_ADVERTISEMENT: Icmpv6Type = Icmpv6Type(134);
    pub const NEIGHBOR_SOLICITATION: Icmpv6Type = Icmpv6Type(135);
    pub const NEIGHBOR_ADVERTISEMENT: Icmpv6Type = Icmpv6Type(136);

    pub fn name(self) -> Option<&'static str> {
        match self {
            Icmpv6Type::DESTINATION_UNREACHABLE => Some("dst-unreach"),
            Icmpv6Type::PACKET_TOO_BIG => Some("too-big"),
            Icmpv6Type::TIME_EXCEEDED => Some("time-exceeded"),
            Icmpv6Type::PARAMETER_PROBLEM => Some("param-problem"),
            Icmpv6Type::ECHO_REQUEST => Some("echo-request"),
            Icmpv6Type::ECHO_REPLY => Some("echo-reply"),
            Icmpv6Type::ROUTER_SOLICITATION => Some("router-solicit"),
            Icmpv6Type::ROUTER_ADVERTISEMENT => Some("router-advert"),
            Icmpv6Type::NEIGHBOR_SOLICITATION => Some("neighbor-solicit"),
            Icmpv6Type::NEIGHBOR_ADVERTISEMENT => Some("neighbor-advert"),
            _ => None,
        }
    }
}

impl fmt::Display for Icmpv6Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

/// ICMPv6 message
#[derive(Debug, Clone, PartialEq)]
pub struct Icmpv6 {
    pub icmp_type: Icmpv6Type,
    pub code: u8,
    /// Checksum as last decoded
    pub checksum: u16,
    /// Type-specific 4-byte body
    pub body: u32,
    seed: Option<u32>,
}

impl Icmpv6 {
    pub const HEADER_SIZE: u16 = 8;

    pub fn new() -> Self {
        Icmpv6 {
            icmp_type: Icmpv6Type::ECHO_REQUEST,
            code: 0,
            checksum: 0,
            body: 0,
            seed: None,
        }
    }

    /// Echo request; the body holds identifier and sequence number
    pub fn echo_request(id: u16, seq: u16) -> Self {
        Icmpv6 {
            body: ((id as u32) << 16) | seq as u32,
            ..Self::new()
        }
    }

    pub fn checksum_seed(&self) -> Option<u32> {
        self.seed
    }
}

impl Default for Icmpv6 {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for Icmpv6 {
    fn kind(&self) -> Type {
        Type::Icmpv6
    }

    fn header_len(&self) -> usize {
        usize::from(Self::HEADER_SIZE)
    }

    fn encode(&self, buf: &mut Buffer) -> Result<()> {
        let start = buf.len();

        buf.write_int(self.icmp_type.0);
        buf.write_int(self.code);
        buf.write_int(0u16);
        buf.write_int(self.body);

        match self.seed {
            Some(seed) => {
                let checksum = internet_checksum(buf.bytes_from(start), seed);
                buf.patch_u16(start + 2, checksum)
            }
            None => Ok(()),
        }
    }

    fn decode(&mut self, buf: &mut Buffer) -> Result<()> {
        self.icmp_type = Icmpv6Type(buf.read_int()?);
        self.code = buf.read_int()?;
        self.checksum = buf.read_int()?;
        self.body = buf.read_int()?;
        Ok(())
    }

    fn set_checksum_seed(&mut self, seed: u32) {
        self.seed = Some(seed);
    }

    fn verify_checksum(&self, segment: &[u8], seed: Option<u32>) -> bool {
        match seed {
            Some(seed) => validate_checksum(segment, seed),
            None => true,
        }
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::plain("type", self.icmp_type),
            code_field(self.code),
            Field::hex("sum", self.checksum),
            Field::hex("body", self.body),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::reencode;

    fn encode(icmp: &Icmpv6) -> Vec<u8> {
        let mut buf = Buffer::new();
        icmp.encode(&mut buf).unwrap();
        buf.into_vec()
    }

    #[test]
    fn test_unseeded_checksum_is_zero() {
        let bytes = encode(&Icmpv6::echo_request(1, 2));
        assert_eq!(bytes, vec![128, 0, 0, 0, 0x00, 0x01, 0x00, 0x02]);
    }

    #[test]
    fn test_zero_seed_still_checksums() {
        let mut icmp = Icmpv6::echo_request(1, 2);
        icmp.set_checksum_seed(0);
        let bytes = encode(&icmp);
        assert_ne!(&bytes[2..4], &[0, 0]);
        assert!(validate_checksum(&bytes, 0));
    }

    #[test]
    fn test_seeded_checksum_verifies_with_seed() {
        let mut icmp = Icmpv6::new();
        icmp.set_checksum_seed(0x1234);
        let bytes = encode(&icmp);

        let mut decoded = Icmpv6::new();
        decoded.decode(&mut Buffer::from_slice(&bytes)).unwrap();
        assert!(decoded.verify_checksum(&bytes, Some(0x1234)));
        assert!(!decoded.verify_checksum(&bytes, Some(0x1235)));
        assert!(decoded.verify_checksum(&bytes, None));
        assert_eq!(decoded.checksum_seed(), None);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Icmpv6Type::NEIGHBOR_SOLICITATION.to_string(), "neighbor-solicit");
        assert_eq!(Icmpv6Type(200).to_string(), "200");
    }

    #[test]
    fn test_decode_inverts_encode() {
        let mut icmp = Icmpv6 {
            icmp_type: Icmpv6Type::PACKET_TOO_BIG,
            body: 1280,
            ..Icmpv6::new()
        };

        let decoded = reencode(&icmp);
        icmp.checksum = decoded.checksum;
        assert_eq!(decoded, icmp);
    }
}
