//! Opaque trailing bytes

use crate::buffer::Buffer;
use crate::packet::Layer;
use crate::render::Field;
use hype_core::{Result, Type};

/// Bytes with no further structure; decoding consumes everything left in the
/// readable window
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Raw {
    pub data: Vec<u8>,
}

impl Raw {
    pub fn new(data: Vec<u8>) -> Self {
        Raw { data }
    }
}

impl Layer for Raw {
    fn kind(&self) -> Type {
        Type::Raw
    }

    fn header_len(&self) -> usize {
        self.data.len()
    }

    fn encode(&self, buf: &mut Buffer) -> Result<()> {
        buf.write_bytes(&self.data);
        Ok(())
    }

    fn decode(&mut self, buf: &mut Buffer) -> Result<()> {
        let remaining = buf.remaining_len();
        self.data = buf.next(remaining)?.to_vec();
        Ok(())
    }

    fn fields(&self) -> Vec<Field> {
        vec![Field::plain("len", self.data.len()), Field::skip("data")]
    }
}
