//! The packet contract
//!
//! Every protocol codec implements [`Layer`]. [`Packet`] is the closed set of
//! codecs the engine knows about; it implements `Layer` itself by dispatching
//! to the wrapped variant, so the stacking engine never needs to know which
//! concrete codec it is driving.
//!
//! Layers that carry a nested protocol own their payload exclusively
//! (`Option<Box<Packet>>`), so a chain is a singly-linked list from the
//! outermost layer to the innermost one and can never be cyclic or shared.

use crate::arp::Arp;
use crate::buffer::Buffer;
use crate::ethernet::Ethernet;
use crate::icmpv4::Icmpv4;
use crate::icmpv6::Icmpv6;
use crate::ipv4::Ipv4;
use crate::ipv6::Ipv6;
use crate::raw::Raw;
use crate::render::{render_layer, Field};
use crate::udp::Udp;
use crate::vlan::Vlan;
use hype_core::{Error, Result, Type};
use std::fmt;

/// Uniform interface implemented by every protocol codec
pub trait Layer {
    /// Protocol of this layer, fixed per codec
    fn kind(&self) -> Type;

    /// Length of this layer's own header on the wire
    fn header_len(&self) -> usize;

    /// Own header length plus the payload's `wire_length`, if one is set.
    ///
    /// This is exactly what `encode` writes. Layers with a 16-bit length
    /// field refuse to encode when it does not fit.
    fn wire_length(&self) -> usize {
        self.header_len() + self.payload().map_or(0, |p| p.wire_length())
    }

    /// Write this layer's header, then its payload, at the end of `buf`
    fn encode(&self, buf: &mut Buffer) -> Result<()>;

    /// Read this layer's header from the cursor of `buf`
    fn decode(&mut self, buf: &mut Buffer) -> Result<()>;

    fn payload(&self) -> Option<&Packet> {
        None
    }

    fn payload_mut(&mut self) -> Option<&mut Packet> {
        None
    }

    /// Detach the payload, leaving the declared payload type untouched
    fn take_payload(&mut self) -> Option<Packet> {
        None
    }

    /// Declared type of the nested protocol; `Type::None` stops decoding
    fn payload_type(&self) -> Type {
        Type::None
    }

    /// Take ownership of `payload` and record its kind as the declared
    /// payload type. Terminal layers reject any payload.
    fn set_payload(&mut self, payload: Packet) -> Result<()> {
        Err(Error::construction(format!(
            "{} cannot carry a {} payload",
            self.kind(),
            payload.kind()
        )))
    }

    /// Record a pseudo-header partial sum to fold into this layer's checksum.
    /// No-op for layers whose checksum does not depend on an enclosing layer.
    fn set_checksum_seed(&mut self, _seed: u32) {}

    /// Pseudo-header partial sum this layer contributes to a payload of
    /// `payload_len` bytes; only network layers provide one
    fn pseudo_header_sum(&self, _payload_len: u32) -> Option<u32> {
        None
    }

    /// Check the checksum of a decoded layer. `segment` spans from the first
    /// byte of this layer to the end of its extent.
    fn verify_checksum(&self, _segment: &[u8], _seed: Option<u32>) -> bool {
        true
    }

    /// Header fields in display order
    fn fields(&self) -> Vec<Field>;
}

/// Narrow `len` to a 16-bit length field of a `kind` header
pub(crate) fn length_field(kind: Type, len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| {
        Error::construction(format!("{} length {} exceeds {} bytes", kind, len, u16::MAX))
    })
}

/// Any supported protocol layer
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Ethernet(Ethernet),
    Vlan(Vlan),
    Arp(Arp),
    Ipv4(Ipv4),
    Ipv6(Ipv6),
    Icmpv4(Icmpv4),
    Icmpv6(Icmpv6),
    Udp(Udp),
    Raw(Raw),
}

macro_rules! dispatch {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            Packet::Ethernet($p) => $body,
            Packet::Vlan($p) => $body,
            Packet::Arp($p) => $body,
            Packet::Ipv4($p) => $body,
            Packet::Ipv6($p) => $body,
            Packet::Icmpv4($p) => $body,
            Packet::Icmpv6($p) => $body,
            Packet::Udp($p) => $body,
            Packet::Raw($p) => $body,
        }
    };
}

impl Layer for Packet {
    fn kind(&self) -> Type {
        dispatch!(self, p => p.kind())
    }

    fn header_len(&self) -> usize {
        dispatch!(self, p => p.header_len())
    }

    fn wire_length(&self) -> usize {
        dispatch!(self, p => p.wire_length())
    }

    fn encode(&self, buf: &mut Buffer) -> Result<()> {
        dispatch!(self, p => p.encode(buf))
    }

    fn decode(&mut self, buf: &mut Buffer) -> Result<()> {
        dispatch!(self, p => p.decode(buf))
    }

    fn payload(&self) -> Option<&Packet> {
        dispatch!(self, p => p.payload())
    }

    fn payload_mut(&mut self) -> Option<&mut Packet> {
        dispatch!(self, p => p.payload_mut())
    }

    fn take_payload(&mut self) -> Option<Packet> {
        dispatch!(self, p => p.take_payload())
    }

    fn payload_type(&self) -> Type {
        dispatch!(self, p => p.payload_type())
    }

    fn set_payload(&mut self, payload: Packet) -> Result<()> {
        dispatch!(self, p => p.set_payload(payload))
    }

    fn set_checksum_seed(&mut self, seed: u32) {
        dispatch!(self, p => p.set_checksum_seed(seed))
    }

    fn pseudo_header_sum(&self, payload_len: u32) -> Option<u32> {
        dispatch!(self, p => p.pseudo_header_sum(payload_len))
    }

    fn verify_checksum(&self, segment: &[u8], seed: Option<u32>) -> bool {
        dispatch!(self, p => p.verify_checksum(segment, seed))
    }

    fn fields(&self) -> Vec<Field> {
        dispatch!(self, p => p.fields())
    }
}

impl Packet {
    /// Iterate a linked chain, outermost layer first
    pub fn layers(&self) -> impl Iterator<Item = &Packet> {
        std::iter::successors(Some(self), |p| p.payload())
    }

    /// Hand each payload the pseudo-header seed computed by its enclosing
    /// layer, all the way down the chain.
    ///
    /// Must run after the chain is fully linked and before `encode`, since the
    /// seed depends on the payload's final length.
    pub fn seed_checksums(&mut self) {
        let seed = self
            .payload()
            .and_then(|payload| u32::try_from(payload.wire_length()).ok())
            .and_then(|len| self.pseudo_header_sum(len));

        if let Some(payload) = self.payload_mut() {
            if let Some(seed) = seed {
                payload.set_checksum_seed(seed);
            }
            payload.seed_checksums();
        }
    }

    /// Render this layer and its payloads as `name(field=value ...) / ...`
    pub fn render(&self) -> String {
        join_rendered(self.layers())
    }
}

/// Render a flat list of decoded layers the same way a linked chain renders
pub fn render_layers(layers: &[Packet]) -> String {
    join_rendered(layers.iter())
}

fn join_rendered<'a>(layers: impl Iterator<Item = &'a Packet>) -> String {
    layers
        .map(|layer| render_layer(layer.kind().name(), &layer.fields()))
        .collect::<Vec<_>>()
        .join(" / ")
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Packet {
                fn from(layer: $variant) -> Self {
                    Packet::$variant(layer)
                }
            }
        )*
    };
}

impl_from_variant!(Ethernet, Vlan, Arp, Ipv4, Ipv6, Icmpv4, Icmpv6, Udp, Raw);

/// Encode a single layer and decode the bytes back into a fresh one
#[cfg(test)]
pub(crate) fn reencode<L: Layer + Default>(layer: &L) -> L {
    let mut buf = Buffer::new();
    layer.encode(&mut buf).unwrap();
    let bytes = buf.into_vec();

    let mut decoded = L::default();
    decoded.decode(&mut Buffer::from_slice(&bytes)).unwrap();
    decoded
}
