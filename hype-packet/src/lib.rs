//! Layered packet codec engine for hype
//!
//! A network frame is modelled as a chain of protocol layers, outermost
//! first. This crate encodes such a chain into wire bytes and decodes wire
//! bytes back into layers, following each layer's declared payload type.
//! It includes support for:
//!
//! - **Ethernet II** frames and **802.1Q** VLAN tags
//! - **ARP** over Ethernet/IPv4
//! - **IPv4** (with options) and **IPv6** fixed headers
//! - **ICMPv4**, **ICMPv6** and **UDP**, with pseudo-header checksums seeded
//!   by the enclosing network layer
//! - **Raw** opaque bytes
//!
//! # Architecture
//!
//! - [`buffer`] - Cursor-based byte buffer shared by every codec
//! - [`checksum`] - Internet checksum and pseudo-header sums
//! - [`packet`] - The [`Layer`] contract and the [`Packet`] enum
//! - [`registry`] - Type-to-codec table used while decoding
//! - [`stack`] - [`pack`] and [`unpack_all`]
//! - [`render`] - Field-by-field textual rendering
//!
//! # Quick Start
//!
//! ## Building an ARP probe
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use hype_core::MacAddr;
//! use hype_packet::{pack, Arp, Ethernet};
//!
//! let src = MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
//!
//! let frame = pack(vec![
//!     Ethernet::new().with_addresses(MacAddr::BROADCAST, src).into(),
//!     Arp::probe(src, Ipv4Addr::new(192, 168, 1, 10)).into(),
//! ])
//! .unwrap();
//!
//! assert_eq!(frame.len(), 42);
//! ```
//!
//! ## Decoding a frame
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use hype_core::Type;
//! use hype_packet::{pack, unpack_all, Ethernet, Icmpv4, Ipv4, Layer};
//!
//! let frame = pack(vec![
//!     Ethernet::new().into(),
//!     Ipv4::new()
//!         .with_addresses(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2))
//!         .into(),
//!     Icmpv4::echo_request(1, 1).into(),
//! ])
//! .unwrap();
//!
//! let layers = unpack_all(&frame, Type::Ethernet).unwrap();
//! assert_eq!(layers.len(), 3);
//! assert_eq!(layers[2].kind(), Type::Icmpv4);
//! ```

pub mod arp;
pub mod buffer;
pub mod checksum;
pub mod ethernet;
pub mod icmpv4;
pub mod icmpv6;
pub mod ipv4;
pub mod ipv6;
pub mod packet;
pub mod raw;
pub mod registry;
pub mod render;
pub mod stack;
pub mod udp;
pub mod vlan;

// Re-export commonly used types for convenience
pub use arp::{Arp, ArpOperation};
pub use buffer::Buffer;
pub use ethernet::Ethernet;
pub use icmpv4::{IcmpType, Icmpv4};
pub use icmpv6::{Icmpv6, Icmpv6Type};
pub use ipv4::{IpFlags, Ipv4};
pub use ipv6::Ipv6;
pub use packet::{render_layers, Layer, Packet};
pub use raw::Raw;
pub use registry::constructor_for;
pub use stack::{link, pack, unpack_all, unpack_all_with, UnpackOptions};
pub use udp::{Udp, UdpPort};
pub use vlan::Vlan;
