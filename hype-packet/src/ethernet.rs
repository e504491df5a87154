//! Ethernet II frame encoding and decoding
//!
//! The header is exactly 14 bytes: destination MAC, source MAC and EtherType.
//! No minimum-frame padding is added on encode.

use crate::buffer::Buffer;
use crate::packet::{Layer, Packet};
use crate::render::Field;
use hype_core::{Error, EtherType, MacAddr, Result, Type};

/// Ethernet II header
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ethernet {
    pub destination: MacAddr,
    pub source: MacAddr,
    pub ether_type: EtherType,
    payload: Option<Box<Packet>>,
}

impl Ethernet {
    /// Ethernet II header size
    pub const HEADER_SIZE: u16 = 14;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_addresses(mut self, destination: MacAddr, source: MacAddr) -> Self {
        self.destination = destination;
        self.source = source;
        self
    }

    pub fn with_ether_type(mut self, ether_type: EtherType) -> Self {
        self.ether_type = ether_type;
        self
    }
}

/// EtherType a link layer should declare for a payload of kind `kind`.
///
/// Raw payloads keep whatever the caller put in `current`, since opaque bytes
/// have no EtherType of their own.
pub(crate) fn ether_type_for(outer: Type, current: EtherType, kind: Type) -> Result<EtherType> {
    match (kind.ether_type(), kind) {
        (Some(ether_type), _) => Ok(ether_type),
        (None, Type::Raw) => Ok(current),
        (None, _) => Err(Error::construction(format!(
            "{} cannot be carried by {}",
            kind, outer
        ))),
    }
}

/// Rendered form of an EtherType: the protocol name when known
pub(crate) fn ether_type_field(ether_type: EtherType) -> Field {
    match Type::from_ether_type(ether_type) {
        Type::None => Field::hex("type", ether_type.to_u16()),
        kind => Field::plain("type", kind),
    }
}

impl Layer for Ethernet {
    fn kind(&self) -> Type {
        Type::Ethernet
    }

    fn header_len(&self) -> usize {
        usize::from(Self::HEADER_SIZE)
    }

    fn encode(&self, buf: &mut Buffer) -> Result<()> {
        buf.write_bytes(self.destination.as_bytes());
        buf.write_bytes(self.source.as_bytes());
        buf.write_int(self.ether_type.to_u16());

        match &self.payload {
            Some(payload) => payload.encode(buf),
            None => Ok(()),
        }
    }

    fn decode(&mut self, buf: &mut Buffer) -> Result<()> {
        self.destination = MacAddr(buf.read_array()?);
        self.source = MacAddr(buf.read_array()?);
        self.ether_type = EtherType(buf.read_int()?);
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
        Type::from_ether_type(self.ether_type)
    }

    fn set_payload(&mut self, payload: Packet) -> Result<()> {
        self.ether_type = ether_type_for(Type::Ethernet, self.ether_type, payload.kind())?;
        self.payload = Some(Box::new(payload));
        Ok(())
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::plain("dst", self.destination),
            Field::plain("src", self.source),
            ether_type_field(self.ether_type),
        ]
    }
}
