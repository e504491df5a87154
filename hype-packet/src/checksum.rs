//! Checksum calculations for network packets
//!
//! This module provides the Internet Checksum (RFC 1071) used by the IPv4
//! header, ICMP, ICMPv6 and UDP, and the pseudo-header partial sums that a
//! network layer hands down to its transport payload as a checksum seed.

use std::net::{Ipv4Addr, Ipv6Addr};

/// Sums the data as big-endian 16-bit words without folding.
///
/// An odd trailing byte is padded with a zero low byte.
pub fn checksum_accumulate(data: &[u8]) -> u32 {
    let mut sum: u64 = 0;

    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u64;
    }

    if let Some(&byte) = chunks.remainder().first() {
        sum += (byte as u64) << 8;
    }

    fold(sum) as u32
}

/// Folds carries into the low 16 bits until none remain
fn fold(mut sum: u64) -> u16 {
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}

/// Calculates the Internet Checksum as defined in RFC 1071.
///
/// `seed` is a partial sum contributed by an enclosing layer (usually a
/// pseudo-header, see [`ipv4_pseudo_header`]); it is added to the sum of
/// `data` before the final fold and complement. Pass 0 when there is none.
///
/// # Examples
///
/// ```
/// use hype_packet::checksum::internet_checksum;
///
/// let data = vec![0x45, 0x00, 0x00, 0x3c];
/// let checksum = internet_checksum(&data, 0);
/// assert_eq!(checksum, !0x453cu16);
/// ```
pub fn internet_checksum(data: &[u8], seed: u32) -> u16 {
    let sum = checksum_accumulate(data) as u64 + seed as u64;
    !fold(sum)
}

/// Validates an Internet checksum.
///
/// Summing data that already contains its checksum field yields 0 (or 0xFFFF,
/// which is equivalent in one's complement) when the checksum is correct.
pub fn validate_checksum(data: &[u8], seed: u32) -> bool {
    let result = internet_checksum(data, seed);
    result == 0 || result == 0xFFFF
}

/// Partial sum of the IPv4 pseudo-header (RFC 768 / RFC 793)
///
/// # Arguments
///
/// * `src` - Source IPv4 address
/// * `dst` - Destination IPv4 address
/// * `protocol` - IP protocol number of the transport payload
/// * `length` - Length of the transport header plus data
pub fn ipv4_pseudo_header(src: Ipv4Addr, dst: Ipv4Addr, protocol: u8, length: u16) -> u32 {
    checksum_accumulate(&src.octets())
        + checksum_accumulate(&dst.octets())
        + protocol as u32
        + length as u32
}

/// Partial sum of the IPv6 pseudo-header (RFC 8200, section 8.1)
pub fn ipv6_pseudo_header(src: Ipv6Addr, dst: Ipv6Addr, next_header: u8, length: u32) -> u32 {
    checksum_accumulate(&src.octets())
        + checksum_accumulate(&dst.octets())
        + (length >> 16)
        + (length & 0xFFFF)
        + next_header as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internet_checksum_empty() {
        assert_eq!(internet_checksum(&[], 0), 0xFFFF);
    }

    #[test]
    fn test_internet_checksum_rfc1071_example() {
        // RFC 1071 section 3: the folded sum of these bytes is 0xddf2
        let data = [0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7];
        assert_eq!(checksum_accumulate(&data), 0xddf2);
        assert_eq!(internet_checksum(&data, 0), !0xddf2);
    }

    #[test]
    fn test_internet_checksum_odd_length() {
        // trailing byte is padded with a zero low byte
        let data = [0x00, 0x01, 0x02];
        assert_eq!(checksum_accumulate(&data), 0x0201);
    }

    #[test]
    fn test_seed_is_added_before_complement() {
        let data = [0x00, 0x01, 0x00, 0x02];
        assert_eq!(internet_checksum(&data, 0x10), !0x0013);
        // seeds that carry are folded like any other sum
        assert_eq!(internet_checksum(&data, 0x1_0000), !0x0004);
    }

    #[test]
    fn test_validate_checksum() {
        let data = vec![0x45, 0x00, 0x00, 0x3c];
        let checksum = internet_checksum(&data, 0);

        let mut data_with_checksum = data.clone();
        data_with_checksum.extend_from_slice(&checksum.to_be_bytes());

        assert!(validate_checksum(&data_with_checksum, 0));
        data_with_checksum[0] ^= 0x01;
        assert!(!validate_checksum(&data_with_checksum, 0));
    }

    #[test]
    fn test_validate_checksum_with_seed() {
        let seed = ipv4_pseudo_header(
            Ipv4Addr::new(192, 168, 1, 1),
            Ipv4Addr::new(192, 168, 1, 2),
            17,
            8,
        );
        let mut data = vec![0x00, 0x35, 0x00, 0x35, 0x00, 0x08, 0x00, 0x00];
        let checksum = internet_checksum(&data, seed);
        data[6..8].copy_from_slice(&checksum.to_be_bytes());

        assert!(validate_checksum(&data, seed));
        assert!(!validate_checksum(&data, 0));
    }

    #[test]
    fn test_ipv4_pseudo_header() {
        let sum = ipv4_pseudo_header(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            1,
            8,
        );
        assert_eq!(sum, 0x0a00 + 0x0001 + 0x0a00 + 0x0002 + 1 + 8);
    }

    #[test]
    fn test_ipv6_pseudo_header_splits_length() {
        let sum = ipv6_pseudo_header(Ipv6Addr::UNSPECIFIED, Ipv6Addr::LOCALHOST, 58, 0x0001_0008);
        assert_eq!(sum, 1 + 0x0001 + 0x0008 + 58);
    }
}
