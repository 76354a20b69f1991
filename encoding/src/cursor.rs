//! Bounds-checked reading and writing of in-memory byte buffers.
//!
//! [`ByteCursor`] reads numbers and byte runs from a borrowed buffer
//! at a moving position, in a configurable byte order.
//! Every read is checked against the buffer's end before any byte is
//! consumed, so a failed read leaves the position untouched.
//! [`ByteWriter`] is its counterpart for growing an output buffer.
use byteordered::byteorder::{BigEndian, ByteOrder, LittleEndian};
use byteordered::Endianness;
use snafu::{ensure, Snafu};

/// A read which would go past the end of the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum Error {
    #[snafu(display(
        "Cannot read {} bytes at offset {}: only {} bytes available",
        requested,
        position,
        available
    ))]
    OutOfBounds {
        position: usize,
        requested: usize,
        available: usize,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A reading position over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
    endianness: Endianness,
}

macro_rules! read_numbers {
    ($($read_one: ident, $read_many: ident, $t: ty, $width: expr, $method: ident;)*) => {
        $(
            #[doc = concat!("Read one `", stringify!($t), "` in the cursor's byte order.")]
            pub fn $read_one(&mut self) -> Result<$t> {
                let bytes = self.read_bytes($width)?;
                Ok(match self.endianness {
                    Endianness::Little => LittleEndian::$method(bytes),
                    Endianness::Big => BigEndian::$method(bytes),
                })
            }

            #[doc = concat!("Read `count` consecutive `", stringify!($t), "` values.")]
            pub fn $read_many(&mut self, count: usize) -> Result<Vec<$t>> {
                let len = self.checked_len(count, $width)?;
                let bytes = self.read_bytes(len)?;
                Ok(bytes
                    .chunks_exact($width)
                    .map(|chunk| match self.endianness {
                        Endianness::Little => LittleEndian::$method(chunk),
                        Endianness::Big => BigEndian::$method(chunk),
                    })
                    .collect())
            }
        )*
    };
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8], endianness: Endianness) -> Self {
        ByteCursor {
            data,
            position: 0,
            endianness,
        }
    }

    /// The whole underlying buffer.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// Move to an absolute position, which may be the end of the buffer.
    pub fn seek(&mut self, position: usize) -> Result<()> {
        ensure!(
            position <= self.data.len(),
            OutOfBoundsSnafu {
                position,
                requested: 0_usize,
                available: 0_usize,
            }
        );
        self.position = position;
        Ok(())
    }

    /// Move forward by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Look at the next `n` bytes without consuming them.
    pub fn peek_bytes(&self, n: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        ensure!(
            n <= available,
            OutOfBoundsSnafu {
                position: self.position,
                requested: n,
                available,
            }
        );
        Ok(&self.data[self.position..self.position + n])
    }

    /// Consume the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(n)?;
        self.position += n;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Peek at the next `u16` without consuming it.
    pub fn peek_u16(&self) -> Result<u16> {
        let bytes = self.peek_bytes(2)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_u16(bytes),
            Endianness::Big => BigEndian::read_u16(bytes),
        })
    }

    read_numbers! {
        read_u16, read_u16_values, u16, 2, read_u16;
        read_i16, read_i16_values, i16, 2, read_i16;
        read_u32, read_u32_values, u32, 4, read_u32;
        read_i32, read_i32_values, i32, 4, read_i32;
        read_u64, read_u64_values, u64, 8, read_u64;
        read_i64, read_i64_values, i64, 8, read_i64;
        read_f32, read_f32_values, f32, 4, read_f32;
        read_f64, read_f64_values, f64, 8, read_f64;
    }

    fn checked_len(&self, count: usize, width: usize) -> Result<usize> {
        count.checked_mul(width).ok_or_else(|| Error::OutOfBounds {
            position: self.position,
            requested: usize::MAX,
            available: self.remaining(),
        })
    }
}

/// A growable output buffer with byte order aware writes.
#[derive(Debug, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
    endianness: Endianness,
}

macro_rules! write_numbers {
    ($($write: ident, $t: ty, $width: expr, $method: ident;)*) => {
        $(
            #[doc = concat!("Append one `", stringify!($t), "` in the writer's byte order.")]
            pub fn $write(&mut self, value: $t) {
                let mut bytes = [0_u8; $width];
                match self.endianness {
                    Endianness::Little => LittleEndian::$method(&mut bytes, value),
                    Endianness::Big => BigEndian::$method(&mut bytes, value),
                }
                self.buf.extend_from_slice(&bytes);
            }
        )*
    };
}

impl ByteWriter {
    pub fn new(endianness: Endianness) -> Self {
        ByteWriter {
            buf: Vec::new(),
            endianness,
        }
    }

    pub fn with_capacity(capacity: usize, endianness: Endianness) -> Self {
        ByteWriter {
            buf: Vec::with_capacity(capacity),
            endianness,
        }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    write_numbers! {
        write_u16, u16, 2, write_u16;
        write_i16, i16, 2, write_i16;
        write_u32, u32, 4, write_u32;
        write_i32, i32, 4, write_i32;
        write_u64, u64, 8, write_u64;
        write_i64, i64, 8, write_i64;
        write_f32, f32, 4, write_f32;
        write_f64, f64, 8, write_f64;
    }

    /// Overwrite 4 bytes at `position` with `value`,
    /// typically to patch a length field once the content is known.
    pub fn set_u32_at(&mut self, position: usize, value: u32) -> Result<()> {
        let available = self.buf.len().saturating_sub(position);
        ensure!(
            available >= 4,
            OutOfBoundsSnafu {
                position,
                requested: 4_usize,
                available,
            }
        );
        let target = &mut self.buf[position..position + 4];
        match self.endianness {
            Endianness::Little => LittleEndian::write_u32(target, value),
            Endianness::Big => BigEndian::write_u32(target, value),
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
