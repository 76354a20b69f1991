//! The data element type.
use crate::dataset::DataSet;
use crate::header::{DataElementHeader, HasLength, Header, Length, Tag, VR};
use crate::value::{ConvertValueError, PixelFragmentSequence, PrimitiveValue, Value};
use num_traits::NumCast;
use std::borrow::Cow;
use std::ops::Range;
use std::str::FromStr;

/// A data element: header, value,
/// and the byte range it occupied in the buffer it was decoded from.
///
/// Equality ignores the byte range and the concrete value length,
/// only comparing tag, VR, value, and whether the length is undefined.
#[derive(Debug, Clone)]
pub struct DataElement {
    header: DataElementHeader,
    value: Value,
    span: Option<Range<usize>>,
}

impl PartialEq for DataElement {
    fn eq(&self, other: &Self) -> bool {
        self.header.tag == other.header.tag
            && self.header.vr == other.header.vr
            && self.header.len.is_undefined() == other.header.len.is_undefined()
            && self.value == other.value
    }
}

impl HasLength for DataElement {
    fn length(&self) -> Length {
        self.header.len
    }
}

impl Header for DataElement {
    fn tag(&self) -> Tag {
        self.header.tag
    }
}

impl DataElement {
    /// Create a data element from the given parts.
    ///
    /// The length is left undefined for sequences and fragment sequences,
    /// and otherwise stays zero until the element is encoded.
    pub fn new<T: Into<Tag>>(tag: T, vr: VR, value: impl Into<Value>) -> Self {
        let value = value.into();
        let len = match value {
            Value::Primitive(_) => Length(0),
            _ => Length::UNDEFINED,
        };
        DataElement {
            header: DataElementHeader::new(tag, vr, len),
            value,
            span: None,
        }
    }

    /// Create a data element with an explicit header,
    /// as done by decoders.
    pub fn with_header(header: DataElementHeader, value: Value) -> Self {
        DataElement {
            header,
            value,
            span: None,
        }
    }

    /// Create an element with no value.
    pub fn empty<T: Into<Tag>>(tag: T, vr: VR) -> Self {
        DataElement::with_header(
            DataElementHeader::new(tag, vr, Length(0)),
            Value::Primitive(PrimitiveValue::Empty),
        )
    }

    /// Attach the byte range `[start, end)` this element occupied
    /// in its source buffer.
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span = Some(start..end);
        self
    }

    pub fn header(&self) -> &DataElementHeader {
        &self.header
    }

    pub fn vr(&self) -> VR {
        self.header.vr
    }

    /// The value length as declared in the header (`vl`).
    pub fn vl(&self) -> Length {
        self.header.len
    }

    pub fn is_undefined_length(&self) -> bool {
        self.header.len.is_undefined()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn into_parts(self) -> (DataElementHeader, Value) {
        (self.header, self.value)
    }

    /// The offset of the first header byte in the source buffer.
    pub fn start_offset(&self) -> Option<usize> {
        self.span.as_ref().map(|r| r.start)
    }

    /// The offset right after the last value byte
    /// (or after the closing delimiter) in the source buffer.
    pub fn end_offset(&self) -> Option<usize> {
        self.span.as_ref().map(|r| r.end)
    }

    pub fn span(&self) -> Option<Range<usize>> {
        self.span.clone()
    }

    /// The items of a sequence element.
    pub fn items(&self) -> Option<&[DataSet]> {
        self.value.items()
    }

    pub fn fragments(&self) -> Option<&PixelFragmentSequence> {
        self.value.pixel_sequence()
    }

    pub fn primitive(&self) -> Option<&PrimitiveValue> {
        self.value.primitive()
    }

    /// The value as a single string, joining multiple values with `\`.
    pub fn to_str(&self) -> Result<Cow<str>, ConvertValueError> {
        self.primitive_or_fail("string").map(PrimitiveValue::to_str)
    }

    pub fn to_multi_str(&self) -> Result<Cow<[String]>, ConvertValueError> {
        self.primitive_or_fail("strings")
            .map(PrimitiveValue::to_multi_str)
    }

    pub fn to_int<T>(&self) -> Result<T, ConvertValueError>
    where
        T: NumCast + FromStr,
    {
        self.primitive_or_fail("integer")?.to_int()
    }

    pub fn to_multi_int<T>(&self) -> Result<Vec<T>, ConvertValueError>
    where
        T: NumCast + FromStr,
    {
        self.primitive_or_fail("integer")?.to_multi_int()
    }

    pub fn to_float64(&self) -> Result<f64, ConvertValueError> {
        self.primitive_or_fail("float")?.to_float64()
    }

    pub fn to_multi_float64(&self) -> Result<Vec<f64>, ConvertValueError> {
        self.primitive_or_fail("float")?.to_multi_float64()
    }

    /// Make a copy of this element with a different value,
    /// keeping tag and VR.
    pub fn with_value(&self, value: impl Into<Value>) -> Self {
        DataElement::new(self.header.tag, self.header.vr, value)
    }

    fn primitive_or_fail(&self, requested: &'static str) -> Result<&PrimitiveValue, ConvertValueError> {
        self.value
            .primitive()
            .ok_or(ConvertValueError::Incompatible {
                requested,
                original: self.value.value_type(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_spans_and_defined_lengths() {
        let a = DataElement::with_header(
            DataElementHeader::new(Tag(0x0028, 0x0010), VR::US, Length(2)),
            PrimitiveValue::from(32_u16).into(),
        )
        .with_span(10, 20);
        let b = DataElement::new(Tag(0x0028, 0x0010), VR::US, PrimitiveValue::from(32_u16));
        assert_eq!(a, b);
        assert_eq!(a.start_offset(), Some(10));
        assert_eq!(a.end_offset(), Some(20));
        assert_eq!(b.start_offset(), None);
    }

    #[test]
    fn conversions() {
        let rows = DataElement::new(Tag(0x0028, 0x0010), VR::US, PrimitiveValue::from(512_u16));
        assert_eq!(rows.to_int::<u32>(), Ok(512));
        assert_eq!(rows.to_str().unwrap(), "512");

        let spacing = DataElement::new(
            Tag(0x0028, 0x0030),
            VR::DS,
            PrimitiveValue::from(vec!["0.5".to_string(), "0.25".to_string()]),
        );
        assert_eq!(spacing.to_multi_float64(), Ok(vec![0.5, 0.25]));
    }
}
