//! Cursor-based byte buffer
//!
//! A [`Buffer`] is used in one of two modes for the duration of a single
//! `pack` or `unpack_all` call:
//!
//! - **write mode**: integers are appended big-endian, raw bytes are appended
//!   as-is, and two-byte fields already written can be patched back in (used
//!   for checksums that are only known after the header has been written)
//! - **read mode**: a read cursor walks the wrapped bytes; any read that asks
//!   for more bytes than remain fails with [`Error::ShortBuffer`] instead of
//!   returning short data
//!
//! The readable window can be narrowed with [`Buffer::limit`] so a layer with
//! an explicit length field keeps trailing padding away from inner layers.

use bytes::{BufMut, BytesMut};
use hype_core::{Error, Result};

/// A fixed-width integer with a big-endian wire representation
pub trait WireInt: Copy {
    /// Width in bytes
    const SIZE: usize;

    /// Append `self` to `buf` in network byte order
    fn put(self, buf: &mut BytesMut);

    /// Decode from exactly `SIZE` bytes in network byte order
    fn from_be_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_wire_int {
    ($($ty:ty => $put:ident),* $(,)?) => {
        $(
            impl WireInt for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn put(self, buf: &mut BytesMut) {
                    buf.$put(self);
                }

                fn from_be_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_be_bytes(raw)
                }
            }
        )*
    };
}

impl_wire_int!(u8 => put_u8, u16 => put_u16, u32 => put_u32, u64 => put_u64);

/// Byte container with a read cursor and an append-only write end
#[derive(Debug, Default)]
pub struct Buffer {
    data: BytesMut,
    /// Read cursor
    pos: usize,
    /// End of the readable window
    end: usize,
}

impl Buffer {
    /// Create an empty buffer for writing
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer for writing with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Buffer {
            data: BytesMut::with_capacity(capacity),
            pos: 0,
            end: 0,
        }
    }

    /// Wrap `raw` for reading
    pub fn from_slice(raw: &[u8]) -> Self {
        Buffer {
            data: BytesMut::from(raw),
            pos: 0,
            end: raw.len(),
        }
    }

    /// Append `value` in its fixed big-endian width
    pub fn write_int<T: WireInt>(&mut self, value: T) {
        value.put(&mut self.data);
        self.end = self.data.len();
    }

    /// Append raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.put_slice(bytes);
        self.end = self.data.len();
    }

    /// Consume a fixed-width big-endian integer
    pub fn read_int<T: WireInt>(&mut self) -> Result<T> {
        let bytes = self.next(T::SIZE)?;
        Ok(T::from_be_slice(bytes))
    }

    /// Consume and return the next `n` bytes
    pub fn next(&mut self, n: usize) -> Result<&[u8]> {
        let remaining = self.remaining_len();
        if n > remaining {
            return Err(Error::short_buffer(n, remaining));
        }

        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..self.pos])
    }

    /// Consume exactly `N` bytes into an array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.next(N)?);
        Ok(out)
    }

    /// Bytes left to read in the current window
    pub fn remaining_len(&self) -> usize {
        self.end.saturating_sub(self.pos)
    }

    /// Current read cursor
    pub fn position(&self) -> usize {
        self.pos
    }

    /// End of the current readable window
    pub fn window_end(&self) -> usize {
        self.end
    }

    /// Narrow the readable window to at most `len` bytes past the cursor.
    /// Never widens the window.
    pub fn limit(&mut self, len: usize) {
        self.end = self.end.min(self.pos.saturating_add(len));
    }

    /// Number of bytes written (or wrapped)
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View of the bytes from `offset` to the current write end
    pub fn bytes_from(&self, offset: usize) -> &[u8] {
        let offset = offset.min(self.data.len());
        &self.data[offset..]
    }

    /// Overwrite a two-byte big-endian field that was already written
    pub fn patch_u16(&mut self, offset: usize, value: u16) -> Result<()> {
        let len = self.data.len();
        if offset.checked_add(2).map_or(true, |end| end > len) {
            return Err(Error::short_buffer(2, len.saturating_sub(offset)));
        }

        self.data[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Consume the buffer, returning everything written
    pub fn into_vec(self) -> Vec<u8> {
        self.data.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_int_big_endian() {
        let mut buf = Buffer::new();
        buf.write_int(0x12u8);
        buf.write_int(0x3456u16);
        buf.write_int(0x789abcdeu32);

        assert_eq!(
            buf.into_vec(),
            vec![0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde]
        );
    }

    #[test]
    fn test_read_int_advances_cursor() {
        let mut buf = Buffer::from_slice(&[0x08, 0x06, 0x00, 0x01, 0xff]);

        assert_eq!(buf.read_int::<u16>().unwrap(), 0x0806);
        assert_eq!(buf.position(), 2);
        assert_eq!(buf.read_int::<u16>().unwrap(), 0x0001);
        assert_eq!(buf.remaining_len(), 1);
        assert_eq!(buf.read_int::<u8>().unwrap(), 0xff);
        assert_eq!(buf.remaining_len(), 0);
    }

    #[test]
    fn test_short_read_fails_without_consuming() {
        let mut buf = Buffer::from_slice(&[0x01, 0x02, 0x03]);

        let err = buf.read_int::<u32>().unwrap_err();
        assert!(matches!(
            err,
            Error::ShortBuffer {
                needed: 4,
                remaining: 3
            }
        ));
        assert_eq!(buf.position(), 0);

        assert!(buf.next(4).is_err());
        assert_eq!(buf.next(3).unwrap(), &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_read_array() {
        let mut buf = Buffer::from_slice(&[1, 2, 3, 4, 5, 6, 7]);
        let mac: [u8; 6] = buf.read_array().unwrap();
        assert_eq!(mac, [1, 2, 3, 4, 5, 6]);
        assert!(buf.read_array::<2>().is_err());
    }

    #[test]
    fn test_limit_narrows_window() {
        let mut buf = Buffer::from_slice(&[0u8; 10]);
        buf.next(2).unwrap();
        buf.limit(4);
        assert_eq!(buf.remaining_len(), 4);
        assert_eq!(buf.window_end(), 6);

        // never widens
        buf.limit(100);
        assert_eq!(buf.remaining_len(), 4);
    }

    #[test]
    fn test_patch_u16() {
        let mut buf = Buffer::new();
        buf.write_int(0xaabbu16);
        buf.write_int(0x0000u16);
        buf.write_int(0xccddu16);

        buf.patch_u16(2, 0x1234).unwrap();
        assert_eq!(buf.bytes_from(0), &[0xaa, 0xbb, 0x12, 0x34, 0xcc, 0xdd]);
        assert_eq!(buf.bytes_from(4), &[0xcc, 0xdd]);

        assert!(buf.patch_u16(5, 0).is_err());
    }
}
