//! IEEE 802.1Q VLAN tag
//!
//! The 4-byte tag follows the outer EtherType (0x8100): a 16-bit TCI holding
//! the 3-bit priority, the drop eligible indicator and the 12-bit VLAN id,
//! then the EtherType of the tagged payload.

use crate::buffer::Buffer;
use crate::ethernet::{ether_type_field, ether_type_for};
use crate::packet::{Layer, Packet};
use crate::render::Field;
use hype_core::{EtherType, Result, Type};

const PRIORITY_SHIFT: u16 = 13;
const DEI_MASK: u16 = 0x1000;
const VLAN_ID_MASK: u16 = 0x0fff;

/// 802.1Q tag
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vlan {
    /// Priority code point (3 bits)
    pub priority: u8,
    /// Drop eligible indicator
    pub drop_eligible: bool,
    /// VLAN identifier (12 bits)
    pub vlan_id: u16,
    pub ether_type: EtherType,
    payload: Option<Box<Packet>>,
}

impl Vlan {
    pub const HEADER_SIZE: u16 = 4;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vlan_id(mut self, vlan_id: u16) -> Self {
        self.vlan_id = vlan_id & VLAN_ID_MASK;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority & 0x07;
        self
    }

    /// Tag control information as sent on the wire
    pub fn tci(&self) -> u16 {
        let mut tci = ((self.priority as u16) & 0x07) << PRIORITY_SHIFT;
        if self.drop_eligible {
            tci |= DEI_MASK;
        }
        tci | (self.vlan_id & VLAN_ID_MASK)
    }
}

impl Layer for Vlan {
    fn kind(&self) -> Type {
        Type::Vlan
    }

    fn header_len(&self) -> usize {
        usize::from(Self::HEADER_SIZE)
    }

    fn encode(&self, buf: &mut Buffer) -> Result<()> {
        buf.write_int(self.tci());
        buf.write_int(self.ether_type.to_u16());

        match &self.payload {
            Some(payload) => payload.encode(buf),
            None => Ok(()),
        }
    }

    fn decode(&mut self, buf: &mut Buffer) -> Result<()> {
        let tci: u16 = buf.read_int()?;
        self.priority = (tci >> PRIORITY_SHIFT) as u8;
        self.drop_eligible = tci & DEI_MASK != 0;
        self.vlan_id = tci & VLAN_ID_MASK;
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
        self.ether_type = ether_type_for(Type::Vlan, self.ether_type, payload.kind())?;
        self.payload = Some(Box::new(payload));
        Ok(())
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::plain("prio", self.priority),
            Field::plain("drop", self.drop_eligible),
            Field::plain("vlan", self.vlan_id),
            ether_type_field(self.ether_type),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::reencode;
    use crate::ipv4::Ipv4;

    #[test]
    fn test_tci_bit_layout() {
        let mut vlan = Vlan::new().with_priority(5).with_vlan_id(100);
        vlan.drop_eligible = true;
        assert_eq!(vlan.tci(), 0xb064);

        vlan.drop_eligible = false;
        assert_eq!(vlan.tci(), 0xa064);
    }

    #[test]
    fn test_encode_decode() {
        let mut vlan = Vlan::new().with_priority(5).with_vlan_id(100);
        vlan.drop_eligible = true;
        vlan.ether_type = EtherType::IPV4;

        let mut buf = Buffer::new();
        vlan.encode(&mut buf).unwrap();
        let bytes = buf.into_vec();
        assert_eq!(bytes, vec![0xb0, 0x64, 0x08, 0x00]);

        let mut decoded = Vlan::new();
        decoded.decode(&mut Buffer::from_slice(&bytes)).unwrap();
        assert_eq!(decoded.priority, 5);
        assert!(decoded.drop_eligible);
        assert_eq!(decoded.vlan_id, 100);
        assert_eq!(decoded.payload_type(), Type::Ipv4);
    }

    #[test]
    fn test_set_payload() {
        let mut vlan = Vlan::new();
        vlan.set_payload(Ipv4::new().into()).unwrap();
        assert_eq!(vlan.ether_type, EtherType::IPV4);
        assert_eq!(vlan.wire_length(), 24);
    }

    #[test]
    fn test_vlan_id_is_masked() {
        let vlan = Vlan::new().with_vlan_id(0xffff);
        assert_eq!(vlan.vlan_id, 0x0fff);
    }

    #[test]
    fn test_decode_inverts_encode() {
        let vlan = Vlan {
            drop_eligible: true,
            ether_type: EtherType::ARP,
            ..Vlan::new().with_vlan_id(100).with_priority(5)
        };
        assert_eq!(reencode(&vlan), vlan);
    }
}
