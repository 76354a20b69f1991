//! Typed pixel sample buffers.
use crate::error::{
    BufferSizeMismatchSnafu, IncompatibleBufferSnafu, OffsetOutOfBoundsSnafu, Result,
    UnsupportedPixelFormatSnafu,
};
use dwv_core::PrimitiveValue;
use snafu::{ensure, OptionExt};
use std::borrow::Cow;

/// Apply the same expression to the samples of every buffer variant.
macro_rules! for_each_buffer {
    ($buffer: expr, $v: ident => $e: expr) => {
        match $buffer {
            PixelBuffer::U8($v) => $e,
            PixelBuffer::I8($v) => $e,
            PixelBuffer::U16($v) => $e,
            PixelBuffer::I16($v) => $e,
            PixelBuffer::U32($v) => $e,
            PixelBuffer::I32($v) => $e,
            PixelBuffer::F32($v) => $e,
            PixelBuffer::F64($v) => $e,
        }
    };
}

/// Pixel samples, typed after Bits Allocated and Pixel Representation.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// How stored samples are laid out in the pixel data.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct SampleFormat {
    pub bits_allocated: u16,
    pub bits_stored: u16,
    /// 0 for unsigned, 1 for two's complement samples
    pub pixel_representation: u16,
}

impl SampleFormat {
    pub fn is_signed(&self) -> bool {
        self.pixel_representation == 1
    }
}

impl PixelBuffer {
    /// An empty buffer for the given sample format.
    pub fn empty(format: SampleFormat) -> Result<Self> {
        Self::with_zeros(format, 0)
    }

    /// A zero-filled buffer of `len` samples.
    pub fn with_zeros(format: SampleFormat, len: usize) -> Result<Self> {
        let signed = format.is_signed();
        Ok(match (format.bits_allocated, signed) {
            (1, _) | (8, false) => PixelBuffer::U8(vec![0; len]),
            (8, true) => PixelBuffer::I8(vec![0; len]),
            (16, false) => PixelBuffer::U16(vec![0; len]),
            (16, true) => PixelBuffer::I16(vec![0; len]),
            (32, false) => PixelBuffer::U32(vec![0; len]),
            (32, true) => PixelBuffer::I32(vec![0; len]),
            _ => {
                return UnsupportedPixelFormatSnafu {
                    bits_allocated: format.bits_allocated,
                    pixel_representation: format.pixel_representation,
                }
                .fail()
            }
        })
    }

    /// The name of the sample type.
    pub fn type_name(&self) -> &'static str {
        match self {
            PixelBuffer::U8(_) => "u8",
            PixelBuffer::I8(_) => "i8",
            PixelBuffer::U16(_) => "u16",
            PixelBuffer::I16(_) => "i16",
            PixelBuffer::U32(_) => "u32",
            PixelBuffer::I32(_) => "i32",
            PixelBuffer::F32(_) => "f32",
            PixelBuffer::F64(_) => "f64",
        }
    }

    pub fn len(&self) -> usize {
        for_each_buffer!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_signed(&self) -> bool {
        !matches!(
            self,
            PixelBuffer::U8(_) | PixelBuffer::U16(_) | PixelBuffer::U32(_)
        )
    }

    /// The sample at an offset, without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not less than the buffer length.
    #[inline]
    pub fn get(&self, offset: usize) -> f64 {
        for_each_buffer!(self, v => v[offset] as f64)
    }

    /// The sample at an offset, `None` if out of bounds.
    pub fn try_get(&self, offset: usize) -> Option<f64> {
        for_each_buffer!(self, v => v.get(offset).map(|x| *x as f64))
    }

    /// Overwrite a sample, returning the previous value.
    ///
    /// The value is converted to the sample type,
    /// saturating if it does not fit.
    pub fn set(&mut self, offset: usize, value: f64) -> Result<f64> {
        let len = self.len();
        ensure!(offset < len, OffsetOutOfBoundsSnafu { offset, len });
        Ok(for_each_buffer!(self, v => {
            let old = v[offset] as f64;
            v[offset] = saturate(value);
            old
        }))
    }

    /// Append the samples of another buffer of the same type.
    pub fn extend_from(&mut self, other: &PixelBuffer) -> Result<()> {
        self.insert_from(self.len(), other)
    }

    /// Insert the samples of another buffer of the same type at `offset`.
    pub fn insert_from(&mut self, offset: usize, other: &PixelBuffer) -> Result<()> {
        let len = self.len();
        ensure!(offset <= len, OffsetOutOfBoundsSnafu { offset, len });
        let expected = self.type_name();
        match (self, other) {
            (PixelBuffer::U8(a), PixelBuffer::U8(b)) => splice(a, offset, b),
            (PixelBuffer::I8(a), PixelBuffer::I8(b)) => splice(a, offset, b),
            (PixelBuffer::U16(a), PixelBuffer::U16(b)) => splice(a, offset, b),
            (PixelBuffer::I16(a), PixelBuffer::I16(b)) => splice(a, offset, b),
            (PixelBuffer::U32(a), PixelBuffer::U32(b)) => splice(a, offset, b),
            (PixelBuffer::I32(a), PixelBuffer::I32(b)) => splice(a, offset, b),
            (PixelBuffer::F32(a), PixelBuffer::F32(b)) => splice(a, offset, b),
            (PixelBuffer::F64(a), PixelBuffer::F64(b)) => splice(a, offset, b),
            (_, other) => {
                return IncompatibleBufferSnafu {
                    expected,
                    actual: other.type_name(),
                }
                .fail()
            }
        }
        Ok(())
    }

    /// Iterate over the samples as floating point values.
    pub fn iter(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        for_each_buffer!(self, v => Box::new(v.iter().map(|x| *x as f64)))
    }

    /// The minimum and maximum of the samples in a range of offsets.
    pub fn min_max(&self, range: std::ops::Range<usize>) -> Option<(f64, f64)> {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        for_each_buffer!(self, v => v[start..end].iter().map(|x| *x as f64).fold(None, |acc, x| {
            match acc {
                None => Some((x, x)),
                Some((lo, hi)) => Some((f64::min(lo, x), f64::max(hi, x))),
            }
        }))
    }

    /// Build a buffer from the value of a native pixel data element.
    ///
    /// The value is reinterpreted as little endian samples
    /// of `bits_allocated` bits. Signed samples are sign extended
    /// from `bits_stored` bits, unsigned samples are masked.
    pub fn from_primitive(value: &PrimitiveValue, format: SampleFormat) -> Result<Self> {
        match value {
            PrimitiveValue::F32(v) => return Ok(PixelBuffer::F32(v.to_vec())),
            PrimitiveValue::F64(v) => return Ok(PixelBuffer::F64(v.to_vec())),
            _ => {}
        }
        let bytes = native_bytes(value).context(UnsupportedPixelFormatSnafu {
            bits_allocated: format.bits_allocated,
            pixel_representation: format.pixel_representation,
        })?;
        Self::from_bytes(&bytes, format)
    }

    /// Build a buffer from little endian sample bytes.
    pub fn from_bytes(bytes: &[u8], format: SampleFormat) -> Result<Self> {
        let signed = format.is_signed();
        let stored = u32::from(format.bits_stored.clamp(1, format.bits_allocated.max(1)));
        Ok(match (format.bits_allocated, signed) {
            (1, _) => PixelBuffer::U8(
                bytes
                    .iter()
                    .flat_map(|b| (0..8).map(move |i| (b >> i) & 1))
                    .collect(),
            ),
            (8, false) => PixelBuffer::U8(bytes.iter().map(|b| mask(u32::from(*b), stored) as u8).collect()),
            (8, true) => PixelBuffer::I8(
                bytes
                    .iter()
                    .map(|b| sign_extend(u32::from(*b), stored) as i8)
                    .collect(),
            ),
            (16, _) => {
                let words = bytes
                    .chunks_exact(2)
                    .map(|c| u32::from(u16::from_le_bytes([c[0], c[1]])));
                if signed {
                    PixelBuffer::I16(words.map(|w| sign_extend(w, stored) as i16).collect())
                } else {
                    PixelBuffer::U16(words.map(|w| mask(w, stored) as u16).collect())
                }
            }
            (32, _) => {
                let words = bytes
                    .chunks_exact(4)
                    .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]));
                if signed {
                    PixelBuffer::I32(words.map(|w| sign_extend(w, stored)).collect())
                } else {
                    PixelBuffer::U32(words.map(|w| mask(w, stored)).collect())
                }
            }
            _ => {
                return UnsupportedPixelFormatSnafu {
                    bits_allocated: format.bits_allocated,
                    pixel_representation: format.pixel_representation,
                }
                .fail()
            }
        })
    }

    /// Keep the first `len` samples, failing if there are fewer.
    pub(crate) fn truncated(mut self, len: usize) -> Result<Self> {
        let actual = self.len();
        ensure!(
            actual >= len,
            BufferSizeMismatchSnafu {
                expected: len,
                actual
            }
        );
        for_each_buffer!(&mut self, v => v.truncate(len));
        Ok(self)
    }
}

fn splice<T: Copy>(target: &mut Vec<T>, offset: usize, source: &[T]) {
    target.splice(offset..offset, source.iter().copied());
}

fn saturate<T: num_traits::NumCast + num_traits::Bounded>(value: f64) -> T {
    T::from(value).unwrap_or_else(|| {
        if value < 0. {
            T::min_value()
        } else {
            T::max_value()
        }
    })
}

fn mask(value: u32, bits: u32) -> u32 {
    if bits >= 32 {
        value
    } else {
        value & ((1 << bits) - 1)
    }
}

fn sign_extend(value: u32, bits: u32) -> i32 {
    if bits >= 32 {
        return value as i32;
    }
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// The value as little endian bytes, for integer values.
fn native_bytes(value: &PrimitiveValue) -> Option<Cow<'_, [u8]>> {
    Some(match value {
        PrimitiveValue::U8(v) => Cow::Borrowed(&v[..]),
        PrimitiveValue::U16(v) => Cow::Owned(v.iter().flat_map(|x| x.to_le_bytes()).collect()),
        PrimitiveValue::I16(v) => Cow::Owned(v.iter().flat_map(|x| x.to_le_bytes()).collect()),
        PrimitiveValue::U32(v) => Cow::Owned(v.iter().flat_map(|x| x.to_le_bytes()).collect()),
        PrimitiveValue::I32(v) => Cow::Owned(v.iter().flat_map(|x| x.to_le_bytes()).collect()),
        PrimitiveValue::Empty => Cow::Borrowed(&[][..]),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn format(bits_allocated: u16, bits_stored: u16, pixel_representation: u16) -> SampleFormat {
        SampleFormat {
            bits_allocated,
            bits_stored,
            pixel_representation,
        }
    }

    #[rstest]
    #[case(format(8, 8, 0), "u8")]
    #[case(format(8, 8, 1), "i8")]
    #[case(format(16, 12, 0), "u16")]
    #[case(format(16, 16, 1), "i16")]
    #[case(format(32, 32, 0), "u32")]
    #[case(format(32, 32, 1), "i32")]
    #[case(format(1, 1, 0), "u8")]
    fn buffer_type_follows_format(#[case] format: SampleFormat, #[case] name: &str) {
        assert_eq!(PixelBuffer::empty(format).unwrap().type_name(), name);
    }

    #[test]
    fn unsupported_format() {
        assert!(PixelBuffer::empty(format(12, 12, 0)).is_err());
    }

    #[test]
    fn signed_12_bit_samples_are_sign_extended() {
        let value = PrimitiveValue::from(vec![0x0FFF_u16, 0x0800, 0x07FF, 0xF001]);
        let buffer = PixelBuffer::from_primitive(&value, format(16, 12, 1)).unwrap();
        assert_eq!(buffer, PixelBuffer::I16(vec![-1, -2048, 2047, 1]));
    }

    #[test]
    fn unsigned_samples_are_masked() {
        let value = PrimitiveValue::from(vec![0xF123_u16, 0x0456]);
        let buffer = PixelBuffer::from_primitive(&value, format(16, 12, 0)).unwrap();
        assert_eq!(buffer, PixelBuffer::U16(vec![0x0123, 0x0456]));
    }

    #[test]
    fn bytes_as_16_bit_samples() {
        let value = PrimitiveValue::from(vec![0x34_u8, 0x12, 0xFF, 0xFF]);
        let buffer = PixelBuffer::from_primitive(&value, format(16, 16, 1)).unwrap();
        assert_eq!(buffer, PixelBuffer::I16(vec![0x1234, -1]));
    }

    #[test]
    fn single_bit_samples() {
        let value = PrimitiveValue::from(vec![0b0000_0101_u8]);
        let buffer = PixelBuffer::from_primitive(&value, format(1, 1, 0)).unwrap();
        assert_eq!(buffer, PixelBuffer::U8(vec![1, 0, 1, 0, 0, 0, 0, 0]));
    }

    #[test]
    fn set_returns_previous_value() {
        let mut buffer = PixelBuffer::U8(vec![1, 2, 3]);
        assert_eq!(buffer.set(1, 300.).unwrap(), 2.);
        assert_eq!(buffer.get(1), 255.);
        assert_eq!(buffer.set(0, -4.).unwrap(), 1.);
        assert_eq!(buffer.get(0), 0.);
        assert!(buffer.set(3, 0.).is_err());
        assert_eq!(buffer.min_max(0..3), Some((0., 255.)));
    }

    #[test]
    fn insert_checks_type() {
        let mut buffer = PixelBuffer::U16(vec![1, 4]);
        buffer.insert_from(1, &PixelBuffer::U16(vec![2, 3])).unwrap();
        assert_eq!(buffer, PixelBuffer::U16(vec![1, 2, 3, 4]));
        assert!(buffer.extend_from(&PixelBuffer::U8(vec![5])).is_err());
        assert_eq!(buffer.len(), 4);
    }
}
