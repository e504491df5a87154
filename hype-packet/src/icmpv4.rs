//! ICMP for IPv4 (RFC 792)
//!
//! Type, code, checksum and a 4-byte body interpreted as identifier and
//! sequence number. The checksum covers only the ICMP message and is always
//! computed on encode.

use crate::buffer::Buffer;
use crate::checksum::{internet_checksum, validate_checksum};
use crate::packet::Layer;
use crate::render::Field;
use hype_core::{Result, Type};
use std::fmt;

/// ICMPv4 message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IcmpType(pub u8);

impl IcmpType {
    pub const ECHO_REPLY: IcmpType = IcmpType(0);
    pub const DESTINATION_UNREACHABLE: IcmpType = IcmpType(3);
    pub const REDIRECT: IcmpType = IcmpType(5);
    pub const ECHO_REQUEST: IcmpType = IcmpType(8);
    pub const TIME_EXCEEDED: IcmpType = IcmpType(11);
    pub const PARAMETER_PROBLEM: IcmpType = IcmpType(12);
    pub const TIMESTAMP: IcmpType = IcmpType(13);
    pub const TIMESTAMP_REPLY: IcmpType = IcmpType(14);

    pub fn name(self) -> Option<&'static str> {
        match self {
            IcmpType::ECHO_REPLY => Some("echo-reply"),
            IcmpType::DESTINATION_UNREACHABLE => Some("dst-unreach"),
            IcmpType::REDIRECT => Some("redirect"),
            IcmpType::ECHO_REQUEST => Some("echo-request"),
            IcmpType::TIME_EXCEEDED => Some("time-exceeded"),
            IcmpType::PARAMETER_PROBLEM => Some("param-problem"),
            IcmpType::TIMESTAMP => Some("timestamp"),
            IcmpType::TIMESTAMP_REPLY => Some("timestamp-reply"),
            _ => None,
        }
    }
}

impl fmt::Display for IcmpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Rendered ICMP code: hex when non-zero, omitted otherwise
pub(crate) fn code_field(code: u8) -> Field {
    if code == 0 {
        Field::plain("code", "")
    } else {
        Field::hex("code", code)
    }
}

/// ICMPv4 message
#[derive(Debug, Clone, PartialEq)]
pub struct Icmpv4 {
    pub icmp_type: IcmpType,
    pub code: u8,
    /// Checksum as last decoded; recomputed on encode
    pub checksum: u16,
    pub id: u16,
    pub seq: u16,
}

impl Icmpv4 {
    pub const HEADER_SIZE: u16 = 8;

    /// An echo request with zero identifier and sequence
    pub fn new() -> Self {
        Icmpv4 {
            icmp_type: IcmpType::ECHO_REQUEST,
            code: 0,
            checksum: 0,
            id: 0,
            seq: 0,
        }
    }

    pub fn echo_request(id: u16, seq: u16) -> Self {
        Icmpv4 {
            id,
            seq,
            ..Self::new()
        }
    }

    /// True if `self` is the echo reply answering `request`
    pub fn answers(&self, request: &Icmpv4) -> bool {
        self.icmp_type == IcmpType::ECHO_REPLY
            && request.icmp_type == IcmpType::ECHO_REQUEST
            && self.id == request.id
            && self.seq == request.seq
    }
}

impl Default for Icmpv4 {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for Icmpv4 {
    fn kind(&self) -> Type {
        Type::Icmpv4
    }

    fn header_len(&self) -> usize {
        usize::from(Self::HEADER_SIZE)
    }

    fn encode(&self, buf: &mut Buffer) -> Result<()> {
        let start = buf.len();

        buf.write_int(self.icmp_type.0);
        buf.write_int(self.code);
        buf.write_int(0u16);
        buf.write_int(self.id);
        buf.write_int(self.seq);

        let checksum = internet_checksum(buf.bytes_from(start), 0);
        buf.patch_u16(start + 2, checksum)
    }

    fn decode(&mut self, buf: &mut Buffer) -> Result<()> {
        self.icmp_type = IcmpType(buf.read_int()?);
        self.code = buf.read_int()?;
        self.checksum = buf.read_int()?;
        self.id = buf.read_int()?;
        self.seq = buf.read_int()?;
        Ok(())
    }

    fn verify_checksum(&self, segment: &[u8], _seed: Option<u32>) -> bool {
        validate_checksum(segment, 0)
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::plain("type", self.icmp_type),
            code_field(self.code),
            Field::hex("sum", self.checksum),
            Field::plain("id", self.id),
            Field::plain("seq", self.seq),
        ]
    }
}
