//! UDP datagram encoding and decoding (RFC 768)
//!
//! The checksum covers the pseudo-header of the enclosing network layer, so
//! it is only computed once a seed has been handed down.

use crate::buffer::Buffer;
use crate::checksum::{internet_checksum, validate_checksum};
use crate::packet::{length_field, Layer, Packet};
use crate::render::Field;
use hype_core::{Error, Result, Type};

/// Common UDP port numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UdpPort(pub u16);

impl UdpPort {
    /// DNS (53)
    pub const DNS: UdpPort = UdpPort(53);

    /// DHCP Server (67)
    pub const DHCP_SERVER: UdpPort = UdpPort(67);

    /// DHCP Client (68)
    pub const DHCP_CLIENT: UdpPort = UdpPort(68);

    /// NTP (123)
    pub const NTP: UdpPort = UdpPort(123);

    pub fn to_u16(self) -> u16 {
        self.0
    }
}

impl From<u16> for UdpPort {
    fn from(port: u16) -> Self {
        UdpPort(port)
    }
}

/// UDP header
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Udp {
    pub source_port: UdpPort,
    pub destination_port: UdpPort,
    /// Length (header + data) as last decoded; recomputed on encode
    pub length: u16,
    /// Checksum as last decoded
    pub checksum: u16,
    payload_kind: Type,
    seed: Option<u32>,
    payload: Option<Box<Packet>>,
}

impl Udp {
    /// UDP header size in bytes
    pub const HEADER_SIZE: u16 = 8;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ports(mut self, source: UdpPort, destination: UdpPort) -> Self {
        self.source_port = source;
        self.destination_port = destination;
        self
    }
}

impl Layer for Udp {
    fn kind(&self) -> Type {
        Type::Udp
    }

    fn header_len(&self) -> usize {
        usize::from(Self::HEADER_SIZE)
    }

    fn encode(&self, buf: &mut Buffer) -> Result<()> {
        let length = length_field(Type::Udp, self.wire_length())?;
        let start = buf.len();

        buf.write_int(self.source_port.to_u16());
        buf.write_int(self.destination_port.to_u16());
        buf.write_int(length);
        buf.write_int(0u16);

        if let Some(payload) = &self.payload {
            payload.encode(buf)?;
        }

        if let Some(seed) = self.seed {
            // zero means "no checksum" on the wire
            let checksum = match internet_checksum(buf.bytes_from(start), seed) {
                0 => 0xffff,
                sum => sum,
            };
            buf.patch_u16(start + 6, checksum)?;
        }
        Ok(())
    }

    fn decode(&mut self, buf: &mut Buffer) -> Result<()> {
        self.source_port = UdpPort(buf.read_int()?);
        self.destination_port = UdpPort(buf.read_int()?);
        self.length = buf.read_int()?;
        self.checksum = buf.read_int()?;

        if self.length < Self::HEADER_SIZE {
            return Err(Error::parsing(format!(
                "UDP length {} shorter than header",
                self.length
            )));
        }
        buf.limit((self.length - Self::HEADER_SIZE) as usize);

        self.payload_kind = if buf.remaining_len() > 0 {
            Type::Raw
        } else {
            Type::None
        };
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
        self.payload_kind
    }

    fn set_payload(&mut self, payload: Packet) -> Result<()> {
        self.payload_kind = payload.kind();
        self.payload = Some(Box::new(payload));
        Ok(())
    }

    fn set_checksum_seed(&mut self, seed: u32) {
        self.seed = Some(seed);
    }

    fn verify_checksum(&self, segment: &[u8], seed: Option<u32>) -> bool {
        match seed {
            Some(_) if self.checksum == 0 => true,
            Some(seed) => validate_checksum(segment, seed),
            None => true,
        }
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::plain("sport", self.source_port.to_u16()),
            Field::plain("dport", self.destination_port.to_u16()),
            Field::plain("len", self.length),
            Field::hex("sum", self.checksum),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::reencode;
    use crate::checksum::ipv4_pseudo_header;
    use crate::raw::Raw;
    use std::net::Ipv4Addr;

    fn datagram() -> Udp {
        let mut udp = Udp::new().with_ports(UdpPort(12345), UdpPort::DNS);
        udp.set_payload(Raw::new(vec![0x01, 0x02, 0x03, 0x04]).into())
            .unwrap();
        udp
    }

    fn encode(udp: &Udp) -> Vec<u8> {
        let mut buf = Buffer::new();
        udp.encode(&mut buf).unwrap();
        buf.into_vec()
    }

    #[test]
    fn test_encode_without_seed() {
        let bytes = encode(&datagram());
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[0..2], &[0x30, 0x39]);
        assert_eq!(&bytes[2..4], &[0x00, 0x35]);
        assert_eq!(&bytes[4..6], &[0x00, 0x0c]);
        assert_eq!(&bytes[6..8], &[0x00, 0x00]);
        assert_eq!(&bytes[8..], &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_encode_with_seed() {
        let seed = ipv4_pseudo_header(
            Ipv4Addr::new(192, 168, 1, 1),
            Ipv4Addr::new(192, 168, 1, 2),
            17,
            12,
        );
        let mut udp = datagram();
        udp.set_checksum_seed(seed);
        let bytes = encode(&udp);

        assert_ne!(&bytes[6..8], &[0x00, 0x00]);
        assert!(validate_checksum(&bytes, seed));
    }

    #[test]
    fn test_decode_clamps_to_length() {
        let mut bytes = encode(&datagram());
        bytes.extend_from_slice(&[0xee; 6]);

        let mut buf = Buffer::from_slice(&bytes);
        let mut udp = Udp::new();
        udp.decode(&mut buf).unwrap();

        assert_eq!(udp.length, 12);
        assert_eq!(udp.payload_type(), Type::Raw);
        assert_eq!(buf.remaining_len(), 4);
    }

    #[test]
    fn test_decode_empty_datagram() {
        let bytes = [0x00, 0x35, 0x00, 0x35, 0x00, 0x08, 0x00, 0x00];
        let mut udp = Udp::new();
        udp.decode(&mut Buffer::from_slice(&bytes)).unwrap();
        assert_eq!(udp.payload_type(), Type::None);
    }

    #[test]
    fn test_decode_rejects_short_length() {
        let bytes = [0x00, 0x35, 0x00, 0x35, 0x00, 0x04, 0x00, 0x00];
        let err = Udp::new()
            .decode(&mut Buffer::from_slice(&bytes))
            .unwrap_err();
        assert!(matches!(err, Error::PacketParsing(_)));
    }

    #[test]
    fn test_zero_checksum_is_accepted() {
        let bytes = encode(&datagram());
        let mut udp = Udp::new();
        udp.decode(&mut Buffer::from_slice(&bytes)).unwrap();
        assert!(udp.verify_checksum(&bytes, Some(0x1234)));
    }

    #[test]
    fn test_decode_inverts_encode() {
        let mut udp = Udp::new().with_ports(UdpPort(40000), UdpPort::DNS);

        let decoded = reencode(&udp);
        assert_eq!(decoded.length, 8);
        udp.length = decoded.length;
        udp.checksum = decoded.checksum;
        assert_eq!(decoded, udp);
    }
}
