//! Decoding of data element headers and primitive values
//! from a [`ByteCursor`].
//!
//! The functions in this module read one piece of the stream at a time
//! and never look at the data dictionary:
//! resolving the value representation of implicit VR elements
//! is left to the caller.
use crate::cursor::{self, ByteCursor};
use crate::text::{DecodeTextError, SpecificCharacterSet, TextCodec};
use dwv_core::header::{Length, SequenceItemHeader, SequenceItemHeaderError, Tag, VrKind, VR};
use dwv_core::value::{PrimitiveValue, C};
use snafu::{ResultExt, Snafu};

/// Module-level error type:
/// for errors which may occur while decoding DICOM data.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Failed to read the header's tag field"))]
    ReadTag { source: cursor::Error },
    #[snafu(display("Failed to read the header's value representation"))]
    ReadVr { source: cursor::Error },
    #[snafu(display("Failed to read the header's reserved bytes"))]
    ReadReserved { source: cursor::Error },
    #[snafu(display("Failed to read the header's element length field"))]
    ReadLength { source: cursor::Error },
    #[snafu(display("Failed to read the value of {}", tag))]
    ReadValue { tag: Tag, source: cursor::Error },
    #[snafu(display("Failed to decode the text of {}", tag))]
    DecodeText { tag: Tag, source: DecodeTextError },
    #[snafu(display("Bad sequence item header"))]
    BadSequenceHeader { source: SequenceItemHeaderError },
}

impl Error {
    /// The bounds failure behind this error, if the stream ended too early.
    pub fn out_of_bounds(&self) -> Option<&cursor::Error> {
        match self {
            Error::ReadTag { source }
            | Error::ReadVr { source }
            | Error::ReadReserved { source }
            | Error::ReadLength { source }
            | Error::ReadValue { source, .. } => Some(source),
            Error::DecodeText { .. } | Error::BadSequenceHeader { .. } => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A data element header as laid out in the stream.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RawHeader {
    pub tag: Tag,
    /// The VR, `None` when the header was read in implicit VR
    /// or belongs to an item or delimiter.
    pub vr: Option<VR>,
    pub len: Length,
    /// The number of bytes the header occupied.
    pub header_len: usize,
}

/// The outcome of reading a header in explicit VR.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ExplicitHeader {
    Header(RawHeader),
    /// The two bytes after the tag are not a known VR code.
    /// The cursor is left at the start of the header.
    InvalidVr { tag: Tag, code: [u8; 2] },
}

/// Read a tag in the cursor's byte order.
pub fn decode_tag(cursor: &mut ByteCursor) -> Result<Tag> {
    let start = cursor.position();
    let group = cursor.read_u16().context(ReadTagSnafu)?;
    let element = cursor.read_u16().map_err(|source| {
        // leave the cursor where the tag began
        let _ = cursor.seek(start);
        Error::ReadTag { source }
    })?;
    Ok(Tag(group, element))
}

/// Read a data element header in explicit VR.
///
/// Items and delimiters (group `FFFE`) have no VR field
/// and come back with `vr: None`.
pub fn decode_explicit_header(cursor: &mut ByteCursor) -> Result<ExplicitHeader> {
    let start = cursor.position();
    let tag = decode_tag(cursor)?;
    if tag.0 == 0xFFFE {
        let len = cursor.read_u32().context(ReadLengthSnafu)?;
        return Ok(ExplicitHeader::Header(RawHeader {
            tag,
            vr: None,
            len: Length(len),
            header_len: 8,
        }));
    }

    let code = cursor.read_bytes(2).context(ReadVrSnafu)?;
    let code = [code[0], code[1]];
    let vr = match VR::from_binary(code) {
        Some(vr) => vr,
        None => {
            let _ = cursor.seek(start);
            return Ok(ExplicitHeader::InvalidVr { tag, code });
        }
    };

    let (len, header_len) = if vr.has_long_length() {
        cursor.skip(2).context(ReadReservedSnafu)?;
        (cursor.read_u32().context(ReadLengthSnafu)?, 12)
    } else {
        (u32::from(cursor.read_u16().context(ReadLengthSnafu)?), 8)
    };

    Ok(ExplicitHeader::Header(RawHeader {
        tag,
        vr: Some(vr),
        len: Length(len),
        header_len,
    }))
}

/// Read a data element header in implicit VR.
pub fn decode_implicit_header(cursor: &mut ByteCursor) -> Result<RawHeader> {
    let tag = decode_tag(cursor)?;
    let len = cursor.read_u32().context(ReadLengthSnafu)?;
    Ok(RawHeader {
        tag,
        vr: None,
        len: Length(len),
        header_len: 8,
    })
}

/// Read an item, item delimiter or sequence delimiter header.
pub fn decode_item_header(cursor: &mut ByteCursor) -> Result<SequenceItemHeader> {
    let tag = decode_tag(cursor)?;
    let len = cursor.read_u32().context(ReadLengthSnafu)?;
    SequenceItemHeader::new(tag, Length(len)).context(BadSequenceHeaderSnafu)
}

fn is_padding(c: char) -> bool {
    c == ' ' || c == '\0'
}

/// Read `len` bytes and interpret them as a primitive value of the given VR.
///
/// Text is decoded with `charset` when the VR admits an extended repertoire,
/// split on `\` when multi-valued, and stripped of padding.
/// Numbers follow the cursor's byte order;
/// bytes which do not complete a value are ignored.
/// Sequences cannot be read here and yield their raw bytes.
pub fn decode_primitive(
    cursor: &mut ByteCursor,
    tag: Tag,
    vr: VR,
    len: usize,
    charset: SpecificCharacterSet,
) -> Result<PrimitiveValue> {
    let bytes = cursor.read_bytes(len).context(ReadValueSnafu { tag })?;
    if bytes.is_empty() {
        return Ok(PrimitiveValue::Empty);
    }

    let kind = vr.kind();
    if let VrKind::Text { multi, extended } = kind {
        let codec = if extended {
            charset
        } else {
            SpecificCharacterSet::Default
        };
        let text = codec.decode(bytes).context(DecodeTextSnafu { tag })?;
        return Ok(text_value(&text, multi, extended));
    }

    // the value bytes are complete, so reading them as numbers cannot fail
    let mut values = ByteCursor::new(bytes, cursor.endianness());
    let width = kind.width().unwrap_or(1);
    let count = len / width;
    if len % width != 0 {
        tracing::trace!("{} {}: dropping {} trailing value bytes", tag, vr, len % width);
    }
    let value = match kind {
        VrKind::Integer {
            width: 2,
            signed: false,
        } => PrimitiveValue::U16(C::from_vec(values.read_u16_values(count).context(ReadValueSnafu { tag })?)),
        VrKind::Integer {
            width: 2,
            signed: true,
        } => PrimitiveValue::I16(C::from_vec(values.read_i16_values(count).context(ReadValueSnafu { tag })?)),
        VrKind::Integer {
            width: 4,
            signed: false,
        } => PrimitiveValue::U32(C::from_vec(values.read_u32_values(count).context(ReadValueSnafu { tag })?)),
        VrKind::Integer {
            width: 4,
            signed: true,
        } => PrimitiveValue::I32(C::from_vec(values.read_i32_values(count).context(ReadValueSnafu { tag })?)),
        VrKind::Integer { signed: false, .. } => {
            PrimitiveValue::U64(C::from_vec(values.read_u64_values(count).context(ReadValueSnafu { tag })?))
        }
        VrKind::Integer { signed: true, .. } => {
            PrimitiveValue::I64(C::from_vec(values.read_i64_values(count).context(ReadValueSnafu { tag })?))
        }
        VrKind::Float { width: 4 } => {
            PrimitiveValue::F32(C::from_vec(values.read_f32_values(count).context(ReadValueSnafu { tag })?))
        }
        VrKind::Float { .. } => {
            PrimitiveValue::F64(C::from_vec(values.read_f64_values(count).context(ReadValueSnafu { tag })?))
        }
        VrKind::Tag => {
            let raw = values
                .read_u16_values(count * 2)
                .context(ReadValueSnafu { tag })?;
            PrimitiveValue::Tags(raw.chunks_exact(2).map(|c| Tag(c[0], c[1])).collect())
        }
        VrKind::Binary | VrKind::Sequence | VrKind::Text { .. } => {
            PrimitiveValue::U8(C::from_slice(bytes))
        }
    };
    Ok(value)
}

/// Build a text value out of decoded characters.
fn text_value(text: &str, multi: bool, extended: bool) -> PrimitiveValue {
    // leading spaces are only insignificant in the default repertoire
    let trim = |s: &str| -> String {
        let s = s.trim_end_matches(is_padding);
        if extended {
            s.to_string()
        } else {
            s.trim_start_matches(' ').to_string()
        }
    };

    if text.trim_end_matches(is_padding).is_empty() {
        return PrimitiveValue::Empty;
    }
    if multi {
        PrimitiveValue::Strs(text.split('\\').map(trim).collect())
    } else {
        PrimitiveValue::Str(text.trim_end_matches(is_padding).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteordered::Endianness;
    use rstest::rstest;

    #[rustfmt::skip]
    const EXPLICIT_LE: &[u8] = &[
        // (0008,0060) CS "MR"
        0x08, 0x00, 0x60, 0x00, b'C', b'S', 0x02, 0x00, b'M', b'R',
        // (7FE0,0010) OB, reserved, length 4
        0xE0, 0x7F, 0x10, 0x00, b'O', b'B', 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
        0x01, 0x02, 0x03, 0x04,
    ];

    #[test]
    fn explicit_headers() {
        let mut cursor = ByteCursor::new(EXPLICIT_LE, Endianness::Little);
        let header = match decode_explicit_header(&mut cursor).unwrap() {
            ExplicitHeader::Header(h) => h,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(header.tag, Tag(0x0008, 0x0060));
        assert_eq!(header.vr, Some(VR::CS));
        assert_eq!(header.len, Length(2));
        assert_eq!(header.header_len, 8);
        let value = decode_primitive(
            &mut cursor,
            header.tag,
            VR::CS,
            2,
            SpecificCharacterSet::Default,
        )
        .unwrap();
        assert_eq!(value, PrimitiveValue::from("MR"));

        let header = match decode_explicit_header(&mut cursor).unwrap() {
            ExplicitHeader::Header(h) => h,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(header.vr, Some(VR::OB));
        assert_eq!(header.len, Length(4));
        assert_eq!(header.header_len, 12);
    }

    #[test]
    fn invalid_vr_rewinds() {
        #[rustfmt::skip]
        let data = [0x10, 0x00, 0x10, 0x00, b'z', b'z', 0x00, 0x00];
        let mut cursor = ByteCursor::new(&data, Endianness::Little);
        let outcome = decode_explicit_header(&mut cursor).unwrap();
        assert_eq!(
            outcome,
            ExplicitHeader::InvalidVr {
                tag: Tag(0x0010, 0x0010),
                code: *b"zz"
            }
        );
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn truncated_header() {
        let data = [0x08, 0x00, 0x60];
        let mut cursor = ByteCursor::new(&data, Endianness::Little);
        let err = decode_implicit_header(&mut cursor).unwrap_err();
        assert!(err.out_of_bounds().is_some());
    }

    #[rstest]
    #[case(VR::DS, b"1.5\\-2 ".as_slice(), PrimitiveValue::Strs(["1.5".to_string(), "-2".to_string()].into_iter().collect()))]
    #[case(VR::UI, b"1.2.3\0".as_slice(), PrimitiveValue::from("1.2.3"))]
    #[case(VR::LT, b"a\\b ".as_slice(), PrimitiveValue::Str("a\\b".to_string()))]
    #[case(VR::CS, b"  ".as_slice(), PrimitiveValue::Empty)]
    #[case(VR::US, [0x00, 0x02, 0x01, 0x00].as_slice(), PrimitiveValue::from(vec![512_u16, 1]))]
    #[case(VR::SS, [0xFE, 0xFF].as_slice(), PrimitiveValue::from(-2_i16))]
    #[case(VR::FL, [0x00, 0x00, 0xC0, 0x3F].as_slice(), PrimitiveValue::from(1.5_f32))]
    #[case(VR::AT, [0x10, 0x00, 0x20, 0x00].as_slice(), PrimitiveValue::from(Tag(0x0010, 0x0020)))]
    #[case(VR::OB, [0x01, 0x02, 0x03].as_slice(), PrimitiveValue::from(vec![1_u8, 2, 3]))]
    fn primitive_values_le(#[case] vr: VR, #[case] bytes: &[u8], #[case] expected: PrimitiveValue) {
        let mut cursor = ByteCursor::new(bytes, Endianness::Little);
        let value = decode_primitive(
            &mut cursor,
            Tag(0x0009, 0x1000),
            vr,
            bytes.len(),
            SpecificCharacterSet::Default,
        )
        .unwrap();
        assert_eq!(value, expected);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn big_endian_numbers() {
        let bytes = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
        let mut cursor = ByteCursor::new(&bytes, Endianness::Big);
        let value = decode_primitive(
            &mut cursor,
            Tag(0x0028, 0x0010),
            VR::UL,
            4,
            SpecificCharacterSet::Default,
        )
        .unwrap();
        assert_eq!(value, PrimitiveValue::from(0x0200_0000_u32));
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn extended_text_uses_character_set() {
        let bytes = b"Sim\xF5es^Jo\xE3o ";
        let mut cursor = ByteCursor::new(bytes, Endianness::Little);
        let value = decode_primitive(
            &mut cursor,
            Tag(0x0010, 0x0010),
            VR::PN,
            bytes.len(),
            SpecificCharacterSet::IsoIr100,
        )
        .unwrap();
        assert_eq!(value, PrimitiveValue::from("Simões^João"));
    }

    #[test]
    fn invalid_bytes_keep_value_count() {
        let bytes = b"a\xFFb\\cd";
        let mut cursor = ByteCursor::new(bytes, Endianness::Little);
        let value = decode_primitive(
            &mut cursor,
            Tag(0x0010, 0x1001),
            VR::PN,
            bytes.len(),
            SpecificCharacterSet::IsoIr192,
        )
        .unwrap();
        assert_eq!(value.multiplicity(), 2);
        assert_eq!(
            value.to_multi_str().as_ref(),
            &["a\u{FFFD}b".to_string(), "cd".to_string()][..]
        );
    }
}
