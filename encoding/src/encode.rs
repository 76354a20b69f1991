//! Encoding of data element headers and primitive values
//! into a [`ByteWriter`].
use crate::cursor::{self, ByteWriter};
use crate::text::{EncodeTextError, SpecificCharacterSet, TextCodec};
use dwv_core::header::{Tag, VrKind, VR};
use dwv_core::value::{ConvertValueError, PrimitiveValue};
use snafu::{ensure, ResultExt, Snafu};

/// Module-level error type:
/// for errors which may occur while encoding DICOM data.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not convert the value of {} to {}", tag, vr))]
    ConvertValue {
        tag: Tag,
        vr: VR,
        source: ConvertValueError,
    },
    #[snafu(display("Could not encode the text of {}", tag))]
    EncodeText { tag: Tag, source: EncodeTextError },
    #[snafu(display(
        "Value of {} is {} bytes long, too long for a {} header",
        tag,
        len,
        vr
    ))]
    ValueTooLong { tag: Tag, vr: VR, len: usize },
    #[snafu(display("{} is not a primitive value representation", vr))]
    NotPrimitive { tag: Tag, vr: VR },
    #[snafu(display("Could not patch the length of {}", tag))]
    PatchLength { tag: Tag, source: cursor::Error },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Write a tag in the writer's byte order.
pub fn encode_tag(writer: &mut ByteWriter, tag: Tag) {
    writer.write_u16(tag.0);
    writer.write_u16(tag.1);
}

/// Write a data element header in explicit VR.
///
/// Returns the position of the length field,
/// so that it can be patched later.
pub fn encode_explicit_header(
    writer: &mut ByteWriter,
    tag: Tag,
    vr: VR,
    len: u32,
) -> Result<usize> {
    encode_tag(writer, tag);
    writer.write_bytes(&vr.to_bytes());
    if vr.has_long_length() {
        writer.write_u16(0);
        let position = writer.position();
        writer.write_u32(len);
        Ok(position)
    } else {
        ensure!(
            len <= u32::from(u16::MAX),
            ValueTooLongSnafu {
                tag,
                vr,
                len: len as usize
            }
        );
        let position = writer.position();
        writer.write_u16(len as u16);
        Ok(position)
    }
}

/// Write a data element header in implicit VR.
///
/// Returns the position of the length field.
pub fn encode_implicit_header(writer: &mut ByteWriter, tag: Tag, len: u32) -> usize {
    encode_tag(writer, tag);
    let position = writer.position();
    writer.write_u32(len);
    position
}

/// Write an item or delimiter header.
///
/// Returns the position of the length field.
pub fn encode_item_header(writer: &mut ByteWriter, tag: Tag, len: u32) -> usize {
    encode_implicit_header(writer, tag, len)
}

/// Encode a primitive value as the value field of an element
/// with the given VR, padded to an even length.
///
/// The value is converted when its type does not match the VR,
/// so that, for instance, text replacing a numeric value
/// is parsed into numbers.
pub fn encode_primitive(
    writer: &mut ByteWriter,
    tag: Tag,
    vr: VR,
    value: &PrimitiveValue,
    charset: SpecificCharacterSet,
) -> Result<()> {
    let start = writer.position();
    match vr.kind() {
        VrKind::Text { extended, .. } => {
            if !value.is_empty() {
                let codec = if extended {
                    charset
                } else {
                    SpecificCharacterSet::Default
                };
                let text = value.to_str();
                let bytes = codec.encode(&text).context(EncodeTextSnafu { tag })?;
                writer.write_bytes(&bytes);
            }
        }
        VrKind::Integer { width, signed } => {
            let convert = ConvertValueSnafu { tag, vr };
            match (width, signed) {
                (2, false) => {
                    for v in value.to_multi_int::<u16>().context(convert)? {
                        writer.write_u16(v);
                    }
                }
                (2, true) => {
                    for v in value.to_multi_int::<i16>().context(convert)? {
                        writer.write_i16(v);
                    }
                }
                (4, false) => {
                    for v in value.to_multi_int::<u32>().context(convert)? {
                        writer.write_u32(v);
                    }
                }
                (4, true) => {
                    for v in value.to_multi_int::<i32>().context(convert)? {
                        writer.write_i32(v);
                    }
                }
                (_, false) => {
                    for v in value.to_multi_int::<u64>().context(convert)? {
                        writer.write_u64(v);
                    }
                }
                (_, true) => {
                    for v in value.to_multi_int::<i64>().context(convert)? {
                        writer.write_i64(v);
                    }
                }
            }
        }
        VrKind::Float { width } => {
            let values = value
                .to_multi_float64()
                .context(ConvertValueSnafu { tag, vr })?;
            for v in values {
                if width == 4 {
                    writer.write_f32(v as f32);
                } else {
                    writer.write_f64(v);
                }
            }
        }
        VrKind::Tag => match value {
            PrimitiveValue::Empty => {}
            PrimitiveValue::Tags(tags) => {
                for t in tags {
                    encode_tag(writer, *t);
                }
            }
            other => {
                // tags may also come as pairs of numbers
                let raw = other
                    .to_multi_int::<u16>()
                    .context(ConvertValueSnafu { tag, vr })?;
                for v in raw {
                    writer.write_u16(v);
                }
            }
        },
        VrKind::Binary => match value.as_bytes() {
            Some(bytes) => writer.write_bytes(bytes),
            None => {
                let bytes = value
                    .to_multi_int::<u8>()
                    .context(ConvertValueSnafu { tag, vr })?;
                writer.write_bytes(&bytes);
            }
        },
        VrKind::Sequence => return NotPrimitiveSnafu { tag, vr }.fail(),
    }

    if (writer.position() - start) % 2 == 1 {
        writer.write_u8(vr.padding());
    }
    Ok(())
}

/// Encode a primitive value into a new buffer,
/// in the given byte order.
pub fn primitive_bytes(
    tag: Tag,
    vr: VR,
    value: &PrimitiveValue,
    endianness: byteordered::Endianness,
    charset: SpecificCharacterSet,
) -> Result<Vec<u8>> {
    let mut writer = ByteWriter::new(endianness);
    encode_primitive(&mut writer, tag, vr, value, charset)?;
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::ByteCursor;
    use crate::decode::{decode_explicit_header, decode_primitive, ExplicitHeader};
    use byteordered::Endianness;
    use rstest::rstest;

    #[test]
    fn text_is_padded() {
        let tag = Tag(0x0008, 0x0060);
        let bytes = primitive_bytes(
            tag,
            VR::CS,
            &PrimitiveValue::from("CT1"),
            Endianness::Little,
            SpecificCharacterSet::Default,
        )
        .unwrap();
        assert_eq!(bytes, b"CT1 ");

        let bytes = primitive_bytes(
            Tag(0x0008, 0x0018),
            VR::UI,
            &PrimitiveValue::from("1.2.3"),
            Endianness::Little,
            SpecificCharacterSet::Default,
        )
        .unwrap();
        assert_eq!(bytes, b"1.2.3\0");
    }

    #[test]
    fn text_replaces_numbers() {
        let bytes = primitive_bytes(
            Tag(0x0028, 0x0010),
            VR::US,
            &PrimitiveValue::from("512"),
            Endianness::Big,
            SpecificCharacterSet::Default,
        )
        .unwrap();
        assert_eq!(bytes, [0x02, 0x00]);

        let err = primitive_bytes(
            Tag(0x0028, 0x0010),
            VR::US,
            &PrimitiveValue::from("Anonymized"),
            Endianness::Little,
            SpecificCharacterSet::Default,
        );
        assert!(matches!(err, Err(Error::ConvertValue { .. })));
    }

    #[test]
    fn short_headers_reject_long_values() {
        let mut writer = ByteWriter::new(Endianness::Little);
        assert!(encode_explicit_header(&mut writer, Tag(0x0010, 0x0010), VR::PN, 70_000).is_err());
        assert!(encode_explicit_header(&mut writer, Tag(0x0010, 0x0010), VR::UT, 70_000).is_ok());
    }

    #[rstest]
    #[case(VR::US, PrimitiveValue::from(vec![1_u16, 512]))]
    #[case(VR::SL, PrimitiveValue::from(-70_000_i32))]
    #[case(VR::FD, PrimitiveValue::from(vec![0.5_f64, -1.25]))]
    #[case(VR::AT, PrimitiveValue::from(Tag(0x0028, 0x0010)))]
    #[case(VR::OB, PrimitiveValue::from(vec![1_u8, 2]))]
    #[case(VR::PN, PrimitiveValue::from("Doe^John"))]
    fn headers_and_values_decode_back(
        #[case] vr: VR,
        #[case] value: PrimitiveValue,
        #[values(Endianness::Little, Endianness::Big)] endianness: Endianness,
    ) {
        let tag = Tag(0x0011, 0x1001);
        let body = primitive_bytes(tag, vr, &value, endianness, SpecificCharacterSet::Default)
            .unwrap();
        let mut writer = ByteWriter::new(endianness);
        encode_explicit_header(&mut writer, tag, vr, body.len() as u32).unwrap();
        writer.write_bytes(&body);
        let bytes = writer.into_inner();

        let mut cursor = ByteCursor::new(&bytes, endianness);
        let header = match decode_explicit_header(&mut cursor).unwrap() {
            ExplicitHeader::Header(header) => header,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(header.tag, tag);
        assert_eq!(header.vr, Some(vr));
        let len = header.len.get().unwrap() as usize;
        let decoded =
            decode_primitive(&mut cursor, tag, vr, len, SpecificCharacterSet::Default).unwrap();
        assert_eq!(decoded, value);
        assert!(cursor.is_at_end());
    }
}
