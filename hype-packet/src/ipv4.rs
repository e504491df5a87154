//! IPv4 header encoding and decoding (RFC 791)
//!
//! The total length and header checksum are always derived on encode. The
//! protocol field follows the payload set with `set_payload`, and the
//! pseudo-header partial sum for that payload comes from `pseudo_header_sum`.

use crate::buffer::Buffer;
use crate::checksum::{internet_checksum, ipv4_pseudo_header, validate_checksum};
use crate::packet::{length_field, Layer, Packet};
use crate::render::Field;
use hype_core::{Error, IpProtocol, Result, Type};
use std::fmt;
use std::net::Ipv4Addr;

/// IP Flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IpFlags {
    /// Reserved bit (must be 0)
    pub reserved: bool,
    /// Don't Fragment flag
    pub dont_fragment: bool,
    /// More Fragments flag
    pub more_fragments: bool,
}

impl IpFlags {
    /// No flags set
    pub const NONE: IpFlags = IpFlags {
        reserved: false,
        dont_fragment: false,
        more_fragments: false,
    };

    /// Don't Fragment flag set
    pub const DONT_FRAGMENT: IpFlags = IpFlags {
        reserved: false,
        dont_fragment: true,
        more_fragments: false,
    };

    /// Convert to 3-bit value
    pub fn to_u8(self) -> u8 {
        let mut flags = 0u8;
        if self.reserved {
            flags |= 0b100;
        }
        if self.dont_fragment {
            flags |= 0b010;
        }
        if self.more_fragments {
            flags |= 0b001;
        }
        flags
    }

    /// Parse from 3-bit value
    pub fn from_u8(value: u8) -> Self {
        IpFlags {
            reserved: (value & 0b100) != 0,
            dont_fragment: (value & 0b010) != 0,
            more_fragments: (value & 0b001) != 0,
        }
    }
}

impl fmt::Display for IpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (self.reserved, "rf"),
            (self.dont_fragment, "df"),
            (self.more_fragments, "mf"),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect();
        f.write_str(&names.join("|"))
    }
}

/// Protocol number a network layer should declare for a payload of kind
/// `kind`; Raw payloads keep the caller-set `current` value.
pub(crate) fn protocol_for(outer: Type, current: IpProtocol, kind: Type) -> Result<IpProtocol> {
    match (kind.ip_protocol(), kind) {
        (Some(protocol), _) => Ok(protocol),
        (None, Type::Raw) => Ok(current),
        (None, _) => Err(Error::construction(format!(
            "{} cannot be carried by {}",
            kind, outer
        ))),
    }
}

/// IPv4 header
#[derive(Debug, Clone, PartialEq)]
pub struct Ipv4 {
    /// Type of Service / DSCP
    pub tos: u8,
    /// Total length as last decoded; recomputed on encode
    pub length: u16,
    pub identification: u16,
    pub flags: IpFlags,
    /// Fragment offset (in 8-byte blocks)
    pub fragment_offset: u16,
    pub ttl: u8,
    pub protocol: IpProtocol,
    /// Header checksum as last decoded; recomputed on encode
    pub checksum: u16,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    /// Options, padded with zeros to a 4-byte boundary on encode
    pub options: Vec<u8>,
    payload: Option<Box<Packet>>,
}

impl Ipv4 {
    /// Minimum IPv4 header size (without options)
    pub const MIN_HEADER_SIZE: u16 = 20;

    /// Maximum IPv4 header size (with maximum options)
    pub const MAX_HEADER_SIZE: u16 = 60;

    pub const DEFAULT_TTL: u8 = 64;

    pub fn new() -> Self {
        Ipv4 {
            tos: 0,
            length: 0,
            identification: 0,
            flags: IpFlags::DONT_FRAGMENT,
            fragment_offset: 0,
            ttl: Self::DEFAULT_TTL,
            protocol: IpProtocol::default(),
            checksum: 0,
            source: Ipv4Addr::UNSPECIFIED,
            destination: Ipv4Addr::UNSPECIFIED,
            options: Vec::new(),
            payload: None,
        }
    }

    pub fn with_addresses(mut self, source: Ipv4Addr, destination: Ipv4Addr) -> Self {
        self.source = source;
        self.destination = destination;
        self
    }

    /// Set the Time to Live
    pub fn with_ttl(mut self, ttl: u8) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the identification field
    pub fn with_identification(mut self, id: u16) -> Self {
        self.identification = id;
        self
    }

    /// Set the fragment offset
    pub fn with_fragment_offset(mut self, offset: u16) -> Self {
        self.fragment_offset = offset & 0x1fff;
        self
    }

    /// Set IP options
    pub fn with_options(mut self, options: Vec<u8>) -> Self {
        self.options = options;
        self
    }

    fn padded_options_len(&self) -> usize {
        (self.options.len() + 3) & !3
    }
}

impl Default for Ipv4 {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for Ipv4 {
    fn kind(&self) -> Type {
        Type::Ipv4
    }

    fn header_len(&self) -> usize {
        usize::from(Self::MIN_HEADER_SIZE) + self.padded_options_len()
    }

    fn encode(&self, buf: &mut Buffer) -> Result<()> {
        let header_len = self.header_len();
        if header_len > usize::from(Self::MAX_HEADER_SIZE) {
            return Err(Error::construction(format!(
                "IPv4 options too long: {} bytes",
                self.options.len()
            )));
        }
        let total_len = length_field(Type::Ipv4, self.wire_length())?;

        let start = buf.len();
        let ihl = (header_len / 4) as u8;

        buf.write_int((4u8 << 4) | ihl);
        buf.write_int(self.tos);
        buf.write_int(total_len);
        buf.write_int(self.identification);
        buf.write_int(((self.flags.to_u8() as u16) << 13) | (self.fragment_offset & 0x1fff));
        buf.write_int(self.ttl);
        buf.write_int(self.protocol.to_u8());
        buf.write_int(0u16);
        buf.write_bytes(&self.source.octets());
        buf.write_bytes(&self.destination.octets());
        buf.write_bytes(&self.options);
        for _ in self.options.len()..self.padded_options_len() {
            buf.write_int(0u8);
        }

        let checksum = internet_checksum(buf.bytes_from(start), 0);
        buf.patch_u16(start + 10, checksum)?;

        match &self.payload {
            Some(payload) => payload.encode(buf),
            None => Ok(()),
        }
    }

    fn decode(&mut self, buf: &mut Buffer) -> Result<()> {
        let version_ihl: u8 = buf.read_int()?;
        let version = version_ihl >> 4;
        if version != 4 {
            return Err(Error::parsing(format!("IPv4 header with version {}", version)));
        }

        let header_len = (version_ihl & 0x0f) as u16 * 4;
        if header_len < Self::MIN_HEADER_SIZE {
            return Err(Error::parsing(format!(
                "IPv4 header length {} below minimum",
                header_len
            )));
        }

        self.tos = buf.read_int()?;
        self.length = buf.read_int()?;
        self.identification = buf.read_int()?;

        let flags_and_offset: u16 = buf.read_int()?;
        self.flags = IpFlags::from_u8((flags_and_offset >> 13) as u8);
        self.fragment_offset = flags_and_offset & 0x1fff;

        self.ttl = buf.read_int()?;
        self.protocol = IpProtocol(buf.read_int()?);
        self.checksum = buf.read_int()?;
        self.source = Ipv4Addr::from(buf.read_array::<4>()?);
        self.destination = Ipv4Addr::from(buf.read_array::<4>()?);
        self.options = buf
            .next((header_len - Self::MIN_HEADER_SIZE) as usize)?
            .to_vec();

        if self.length < header_len {
            return Err(Error::parsing(format!(
                "IPv4 total length {} shorter than header",
                self.length
            )));
        }
        buf.limit((self.length - header_len) as usize);
        Ok(())
    }

    fn payload(&self) -> Option<&Packet> {
        self.payload.as_deref()
    }

    fn payload_mut(&mut self) -> Option<&mut Packet> {
        self.payload.as_deref_mut()
    }

    fn take_payload(&mut self) -> Option<Packet> {
        self.payload.take().map(|p| *p)
    }

    fn payload_type(&self) -> Type {
        Type::from_ip_protocol(self.protocol)
    }

    fn set_payload(&mut self, payload: Packet) -> Result<()> {
        self.protocol = protocol_for(Type::Ipv4, self.protocol, payload.kind())?;
        self.payload = Some(Box::new(payload));
        Ok(())
    }

    fn pseudo_header_sum(&self, payload_len: u32) -> Option<u32> {
        Some(ipv4_pseudo_header(
            self.source,
            self.destination,
            self.protocol.to_u8(),
            u16::try_from(payload_len).ok()?,
        ))
    }

    fn verify_checksum(&self, segment: &[u8], _seed: Option<u32>) -> bool {
        let header_len = self.header_len().min(segment.len());
        validate_checksum(&segment[..header_len], 0)
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::hex("tos", self.tos),
            Field::plain("len", self.length),
            Field::plain("id", self.identification),
            Field::plain("flags", self.flags),
            Field::plain("frag", self.fragment_offset),
            Field::plain("ttl", self.ttl),
            match Type::from_ip_protocol(self.protocol) {
                Type::None => Field::plain("proto", self.protocol),
                kind => Field::plain("proto", kind),
            },
            Field::hex("sum", self.checksum),
            Field::plain("src", self.source),
            Field::plain("dst", self.destination),
            Field::skip("options"),
        ]
    }
}
