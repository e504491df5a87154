//! IPv6 fixed header (RFC 8200)
//!
//! Extension headers are not decoded; the next header field is mapped
//! straight onto the payload type.

use crate::buffer::Buffer;
use crate::checksum::ipv6_pseudo_header;
use crate::ipv4::protocol_for;
use crate::packet::{length_field, Layer, Packet};
use crate::render::Field;
use hype_core::{Error, IpProtocol, Result, Type};
use std::net::Ipv6Addr;

/// IPv6 header
#[derive(Debug, Clone, PartialEq)]
pub struct Ipv6 {
    pub traffic_class: u8,
    /// Flow label (20 bits)
    pub flow_label: u32,
    /// Payload length as last decoded; recomputed on encode
    pub length: u16,
    pub next_header: IpProtocol,
    pub hop_limit: u8,
    pub source: Ipv6Addr,
    pub destination: Ipv6Addr,
    payload: Option<Box<Packet>>,
}

impl Ipv6 {
    pub const HEADER_SIZE: u16 = 40;

    pub const DEFAULT_HOP_LIMIT: u8 = 64;

    pub fn new() -> Self {
        Ipv6 {
            traffic_class: 0,
            flow_label: 0,
            length: 0,
            next_header: IpProtocol::default(),
            hop_limit: Self::DEFAULT_HOP_LIMIT,
            source: Ipv6Addr::UNSPECIFIED,
            destination: Ipv6Addr::UNSPECIFIED,
            payload: None,
        }
    }

    pub fn with_addresses(mut self, source: Ipv6Addr, destination: Ipv6Addr) -> Self {
        self.source = source;
        self.destination = destination;
        self
    }
}

impl Default for Ipv6 {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for Ipv6 {
    fn kind(&self) -> Type {
        Type::Ipv6
    }

    fn header_len(&self) -> usize {
        usize::from(Self::HEADER_SIZE)
    }

    fn encode(&self, buf: &mut Buffer) -> Result<()> {
        let first_word =
            (6u32 << 28) | ((self.traffic_class as u32) << 20) | (self.flow_label & 0x000f_ffff);
        let payload_len =
            length_field(Type::Ipv6, self.payload.as_ref().map_or(0, |p| p.wire_length()))?;

        buf.write_int(first_word);
        buf.write_int(payload_len);
        buf.write_int(self.next_header.to_u8());
        buf.write_int(self.hop_limit);
        buf.write_bytes(&self.source.octets());
        buf.write_bytes(&self.destination.octets());

        match &self.payload {
            Some(payload) => payload.encode(buf),
            None => Ok(()),
        }
    }

    fn decode(&mut self, buf: &mut Buffer) -> Result<()> {
        let first_word: u32 = buf.read_int()?;
        let version = first_word >> 28;
        if version != 6 {
            return Err(Error::parsing(format!("IPv6 header with version {}", version)));
        }

        self.traffic_class = (first_word >> 20) as u8;
        self.flow_label = first_word & 0x000f_ffff;
        self.length = buf.read_int()?;
        self.next_header = IpProtocol(buf.read_int()?);
        self.hop_limit = buf.read_int()?;
        self.source = Ipv6Addr::from(buf.read_array::<16>()?);
        self.destination = Ipv6Addr::from(buf.read_array::<16>()?);

        buf.limit(self.length as usize);
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
        Type::from_ip_protocol(self.next_header)
    }

    fn set_payload(&mut self, payload: Packet) -> Result<()> {
        self.next_header = protocol_for(Type::Ipv6, self.next_header, payload.kind())?;
        self.payload = Some(Box::new(payload));
        Ok(())
    }

    fn pseudo_header_sum(&self, payload_len: u32) -> Option<u32> {
        Some(ipv6_pseudo_header(
            self.source,
            self.destination,
            self.next_header.to_u8(),
            payload_len,
        ))
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::hex("class", self.traffic_class),
            Field::hex("flow", self.flow_label),
            Field::plain("len", self.length),
            match Type::from_ip_protocol(self.next_header) {
                Type::None => Field::plain("next", self.next_header),
                kind => Field::plain("next", kind),
            },
            Field::plain("hlim", self.hop_limit),
            Field::plain("src", self.source),
            Field::plain("dst", self.destination),
        ]
    }
}
