//! Representation of DICOM values.
//!
//! A value is either primitive (text, numbers, tags or bytes),
//! a sequence of nested data sets,
//! or an encapsulated pixel data fragment sequence.
use crate::dataset::DataSet;
use crate::header::{Length, Tag};
use num_traits::{NumCast, ToPrimitive};
use smallvec::SmallVec;
use snafu::Snafu;
use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// An aggregation of one or more elements in a value.
pub type C<T> = SmallVec<[T; 2]>;

/// An enum representing an abstraction of a DICOM element's data value type.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ValueType {
    /// No data. Used for any value of length 0.
    Empty,
    /// A sequence of items.
    Item,
    /// Encapsulated pixel data fragments.
    PixelSequence,
    /// A sequence of strings.
    Strs,
    /// A single string.
    Str,
    /// A sequence of attribute tags.
    Tags,
    /// A sequence of unsigned 8-bit integers.
    U8,
    /// A sequence of signed 16-bit integers.
    I16,
    /// A sequence of unsigned 16-bit integers.
    U16,
    /// A sequence of signed 32-bit integers.
    I32,
    /// A sequence of unsigned 32-bit integers.
    U32,
    /// A sequence of signed 64-bit integers.
    I64,
    /// A sequence of unsigned 64-bit integers.
    U64,
    /// A sequence of 32-bit floating point numbers.
    F32,
    /// A sequence of 64-bit floating point numbers.
    F64,
}

/// An error emitted when a value cannot be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum ConvertValueError {
    #[snafu(display("cannot convert {:?} value to {}", original, requested))]
    Incompatible {
        requested: &'static str,
        original: ValueType,
    },
    #[snafu(display("no value to convert to {}", requested))]
    NoValue { requested: &'static str },
    #[snafu(display("could not parse `{}` as {}", value, requested))]
    Parse {
        requested: &'static str,
        value: String,
    },
    #[snafu(display("value {} does not fit in {}", value, requested))]
    Narrow {
        requested: &'static str,
        value: String,
    },
}

/// A primitive DICOM value,
/// holding zero or more values of the same type.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    /// No data. Used for any value of length 0.
    Empty,
    /// A sequence of strings.
    /// Used for AE, AS, CS, DA, DS, DT, IS, LO, PN, SH, TM, UC and UI.
    Strs(C<String>),
    /// A single string.
    /// Used for LT, ST, UT and UR, which are never multi-valued.
    Str(String),
    /// A sequence of attribute tags. Used for AT.
    Tags(C<Tag>),
    /// Bytes. Used for OB and UN.
    U8(C<u8>),
    /// Used for SS.
    I16(C<i16>),
    /// Used for US and OW.
    U16(C<u16>),
    /// Used for SL.
    I32(C<i32>),
    /// Used for UL and OL.
    U32(C<u32>),
    /// Used for SV.
    I64(C<i64>),
    /// Used for UV and OV.
    U64(C<u64>),
    /// Used for FL and OF.
    F32(C<f32>),
    /// Used for FD and OD.
    F64(C<f64>),
}

/// Apply the same expression to the inner values of every numeric variant.
macro_rules! for_each_number {
    ($value: expr, $v: ident => $e: expr, $otherwise: pat => $o: expr) => {
        match $value {
            PrimitiveValue::U8($v) => $e,
            PrimitiveValue::I16($v) => $e,
            PrimitiveValue::U16($v) => $e,
            PrimitiveValue::I32($v) => $e,
            PrimitiveValue::U32($v) => $e,
            PrimitiveValue::I64($v) => $e,
            PrimitiveValue::U64($v) => $e,
            PrimitiveValue::F32($v) => $e,
            PrimitiveValue::F64($v) => $e,
            $otherwise => $o,
        }
    };
}

impl PrimitiveValue {
    /// Create a single string value.
    pub fn new_str(s: impl Into<String>) -> Self {
        PrimitiveValue::Strs(smallvec::smallvec![s.into()])
    }

    /// Obtain the type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            PrimitiveValue::Empty => ValueType::Empty,
            PrimitiveValue::Strs(_) => ValueType::Strs,
            PrimitiveValue::Str(_) => ValueType::Str,
            PrimitiveValue::Tags(_) => ValueType::Tags,
            PrimitiveValue::U8(_) => ValueType::U8,
            PrimitiveValue::I16(_) => ValueType::I16,
            PrimitiveValue::U16(_) => ValueType::U16,
            PrimitiveValue::I32(_) => ValueType::I32,
            PrimitiveValue::U32(_) => ValueType::U32,
            PrimitiveValue::I64(_) => ValueType::I64,
            PrimitiveValue::U64(_) => ValueType::U64,
            PrimitiveValue::F32(_) => ValueType::F32,
            PrimitiveValue::F64(_) => ValueType::F64,
        }
    }

    /// The number of individual values.
    pub fn multiplicity(&self) -> u32 {
        let n = for_each_number!(self, v => v.len(), other => match other {
            PrimitiveValue::Empty => 0,
            PrimitiveValue::Str(_) => 1,
            PrimitiveValue::Strs(v) => v.len(),
            PrimitiveValue::Tags(v) => v.len(),
            _ => 0,
        });
        n as u32
    }

    /// Whether the value holds no data at all.
    pub fn is_empty(&self) -> bool {
        self.multiplicity() == 0
    }

    /// Convert the value to a single string,
    /// joining multiple values with a backslash.
    pub fn to_str(&self) -> Cow<str> {
        fn join<T: fmt::Display>(values: &[T]) -> String {
            values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("\\")
        }
        match self {
            PrimitiveValue::Empty => Cow::Borrowed(""),
            PrimitiveValue::Str(s) => Cow::Borrowed(s.as_str()),
            PrimitiveValue::Strs(v) if v.len() == 1 => Cow::Borrowed(v[0].as_str()),
            PrimitiveValue::Strs(v) => Cow::Owned(v.join("\\")),
            PrimitiveValue::Tags(v) => Cow::Owned(join(v)),
            other => for_each_number!(other, v => Cow::Owned(join(v)), _ => Cow::Borrowed("")),
        }
    }

    /// Retrieve all values as strings.
    pub fn to_multi_str(&self) -> Cow<[String]> {
        match self {
            PrimitiveValue::Strs(v) => Cow::Borrowed(&v[..]),
            PrimitiveValue::Str(s) => Cow::Owned(vec![s.clone()]),
            PrimitiveValue::Empty => Cow::Owned(Vec::new()),
            PrimitiveValue::Tags(v) => Cow::Owned(v.iter().map(|t| t.to_string()).collect()),
            other => for_each_number!(
                other,
                v => Cow::Owned(v.iter().map(|x| x.to_string()).collect()),
                _ => Cow::Owned(Vec::new())
            ),
        }
    }

    /// Retrieve the raw byte content, if the value is made of bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PrimitiveValue::U8(v) => Some(v),
            _ => None,
        }
    }

    /// Retrieve the attribute tags, if the value is made of tags.
    pub fn as_tags(&self) -> Option<&[Tag]> {
        match self {
            PrimitiveValue::Tags(v) => Some(v),
            _ => None,
        }
    }

    /// Retrieve the first value as an integer.
    ///
    /// Textual values are trimmed and parsed,
    /// binary numbers are converted if they fit in the target type.
    pub fn to_int<T>(&self) -> Result<T, ConvertValueError>
    where
        T: NumCast + FromStr,
    {
        fn narrow_first<T: NumCast, N: NumCast + Copy + fmt::Display>(
            values: &[N],
        ) -> Result<T, ConvertValueError> {
            let x = values.first().ok_or(ConvertValueError::NoValue {
                requested: "integer",
            })?;
            T::from(*x).ok_or_else(|| ConvertValueError::Narrow {
                requested: "integer",
                value: x.to_string(),
            })
        }
        match self {
            PrimitiveValue::Strs(_) | PrimitiveValue::Str(_) => {
                let values = self.to_multi_str();
                let s = values
                    .first()
                    .ok_or(ConvertValueError::NoValue {
                        requested: "integer",
                    })?
                    .trim();
                s.parse().map_err(|_| ConvertValueError::Parse {
                    requested: "integer",
                    value: s.to_string(),
                })
            }
            PrimitiveValue::F32(_) | PrimitiveValue::F64(_) | PrimitiveValue::Tags(_) => {
                IncompatibleSnafu {
                    requested: "integer",
                    original: self.value_type(),
                }
                .fail()
            }
            PrimitiveValue::Empty => Err(ConvertValueError::NoValue {
                requested: "integer",
            }),
            other => for_each_number!(
                other,
                v => narrow_first(v),
                _ => Err(ConvertValueError::NoValue { requested: "integer" })
            ),
        }
    }

    /// Retrieve all values as integers.
    pub fn to_multi_int<T>(&self) -> Result<Vec<T>, ConvertValueError>
    where
        T: NumCast + FromStr,
    {
        fn narrow<T: NumCast, N: NumCast + Copy + fmt::Display>(
            values: &[N],
        ) -> Result<Vec<T>, ConvertValueError> {
            values
                .iter()
                .map(|x| {
                    T::from(*x).ok_or_else(|| ConvertValueError::Narrow {
                        requested: "integer",
                        value: x.to_string(),
                    })
                })
                .collect()
        }
        match self {
            PrimitiveValue::Strs(_) | PrimitiveValue::Str(_) => self
                .to_multi_str()
                .iter()
                .map(|s| {
                    let s = s.trim();
                    s.parse().map_err(|_| ConvertValueError::Parse {
                        requested: "integer",
                        value: s.to_string(),
                    })
                })
                .collect(),
            PrimitiveValue::F32(_) | PrimitiveValue::F64(_) | PrimitiveValue::Tags(_) => {
                IncompatibleSnafu {
                    requested: "integer",
                    original: self.value_type(),
                }
                .fail()
            }
            PrimitiveValue::Empty => Ok(Vec::new()),
            other => for_each_number!(other, v => narrow(v), _ => Ok(Vec::new())),
        }
    }

    /// Retrieve the first value as a 64-bit floating point number.
    pub fn to_float64(&self) -> Result<f64, ConvertValueError> {
        match self {
            PrimitiveValue::Strs(_) | PrimitiveValue::Str(_) => {
                let values = self.to_multi_str();
                let s = values
                    .first()
                    .ok_or(ConvertValueError::NoValue { requested: "float" })?
                    .trim();
                s.parse().map_err(|_| ConvertValueError::Parse {
                    requested: "float",
                    value: s.to_string(),
                })
            }
            _ => self
                .to_multi_float64()?
                .into_iter()
                .next()
                .ok_or(ConvertValueError::NoValue { requested: "float" }),
        }
    }

    /// Retrieve all values as 64-bit floating point numbers.
    pub fn to_multi_float64(&self) -> Result<Vec<f64>, ConvertValueError> {
        match self {
            PrimitiveValue::Strs(_) | PrimitiveValue::Str(_) => self
                .to_multi_str()
                .iter()
                .map(|s| {
                    let s = s.trim();
                    s.parse().map_err(|_| ConvertValueError::Parse {
                        requested: "float",
                        value: s.to_string(),
                    })
                })
                .collect(),
            PrimitiveValue::Tags(_) => IncompatibleSnafu {
                requested: "float",
                original: self.value_type(),
            }
            .fail(),
            PrimitiveValue::Empty => Ok(Vec::new()),
            other => for_each_number!(
                other,
                v => Ok(v.iter().filter_map(ToPrimitive::to_f64).collect()),
                _ => Ok(Vec::new())
            ),
        }
    }
}

macro_rules! impl_from_values {
    ($typ: ty, $variant: ident) => {
        impl From<$typ> for PrimitiveValue {
            fn from(value: $typ) -> Self {
                PrimitiveValue::$variant(smallvec::smallvec![value])
            }
        }

        impl From<Vec<$typ>> for PrimitiveValue {
            fn from(value: Vec<$typ>) -> Self {
                PrimitiveValue::$variant(C::from_vec(value))
            }
        }
    };
}

impl_from_values!(u8, U8);
impl_from_values!(i16, I16);
impl_from_values!(u16, U16);
impl_from_values!(i32, I32);
impl_from_values!(u32, U32);
impl_from_values!(i64, I64);
impl_from_values!(u64, U64);
impl_from_values!(f32, F32);
impl_from_values!(f64, F64);
impl_from_values!(Tag, Tags);

impl From<&str> for PrimitiveValue {
    fn from(value: &str) -> Self {
        PrimitiveValue::new_str(value)
    }
}

impl From<String> for PrimitiveValue {
    fn from(value: String) -> Self {
        PrimitiveValue::new_str(value)
    }
}

impl From<Vec<String>> for PrimitiveValue {
    fn from(value: Vec<String>) -> Self {
        PrimitiveValue::Strs(C::from_vec(value))
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_str())
    }
}

/// A sequence of items, each item being a nested data set.
#[derive(Debug, Clone)]
pub struct DataSetSequence {
    items: C<DataSet>,
    length: Length,
}

impl DataSetSequence {
    /// Create a sequence with the given items and declared length.
    pub fn new(items: impl Into<C<DataSet>>, length: Length) -> Self {
        DataSetSequence {
            items: items.into(),
            length,
        }
    }

    /// Create a sequence of undefined length.
    pub fn undefined(items: impl Into<C<DataSet>>) -> Self {
        Self::new(items, Length::UNDEFINED)
    }

    pub fn items(&self) -> &[DataSet] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut C<DataSet> {
        &mut self.items
    }

    pub fn into_items(self) -> C<DataSet> {
        self.items
    }

    /// The length declared for this sequence.
    pub fn length(&self) -> Length {
        self.length
    }
}

impl PartialEq for DataSetSequence {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

/// The fragments of an encapsulated pixel data element,
/// preceded by its Basic Offset Table.
#[derive(Debug, Clone)]
pub struct PixelFragmentSequence {
    offset_table: C<u32>,
    fragments: C<Vec<u8>>,
    /// absolute byte range of each fragment's value in the source buffer
    fragment_ranges: Vec<Range<usize>>,
}

impl PixelFragmentSequence {
    /// Create a fragment sequence which was not read from a buffer.
    pub fn new(offset_table: impl Into<C<u32>>, fragments: impl Into<C<Vec<u8>>>) -> Self {
        PixelFragmentSequence {
            offset_table: offset_table.into(),
            fragments: fragments.into(),
            fragment_ranges: Vec::new(),
        }
    }

    /// Create a fragment sequence with the source byte range of each fragment.
    pub fn with_ranges(
        offset_table: impl Into<C<u32>>,
        fragments: impl Into<C<Vec<u8>>>,
        fragment_ranges: Vec<Range<usize>>,
    ) -> Self {
        PixelFragmentSequence {
            offset_table: offset_table.into(),
            fragments: fragments.into(),
            fragment_ranges,
        }
    }

    /// The Basic Offset Table, empty if absent.
    pub fn offset_table(&self) -> &[u32] {
        &self.offset_table
    }

    pub fn fragments(&self) -> &[Vec<u8>] {
        &self.fragments
    }

    /// The byte ranges of each fragment in the buffer it was decoded from.
    /// Empty if the sequence was built in memory.
    pub fn fragment_ranges(&self) -> &[Range<usize>] {
        &self.fragment_ranges
    }

    pub fn into_parts(self) -> (C<u32>, C<Vec<u8>>) {
        (self.offset_table, self.fragments)
    }
}

impl PartialEq for PixelFragmentSequence {
    fn eq(&self, other: &Self) -> bool {
        self.offset_table == other.offset_table && self.fragments == other.fragments
    }
}

/// The value of a data element.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Primitive value.
    Primitive(PrimitiveValue),
    /// A sequence of items.
    Sequence(DataSetSequence),
    /// Encapsulated pixel data.
    PixelSequence(PixelFragmentSequence),
}

impl Value {
    /// The number of values, items, or fragments.
    pub fn multiplicity(&self) -> u32 {
        match self {
            Value::Primitive(v) => v.multiplicity(),
            Value::Sequence(seq) => seq.items().len() as u32,
            Value::PixelSequence(seq) => seq.fragments().len() as u32,
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Primitive(v) => v.value_type(),
            Value::Sequence(_) => ValueType::Item,
            Value::PixelSequence(_) => ValueType::PixelSequence,
        }
    }

    pub fn primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            Value::Primitive(v) => Some(v),
            _ => None,
        }
    }

    /// The items of a sequence value.
    pub fn items(&self) -> Option<&[DataSet]> {
        match self {
            Value::Sequence(seq) => Some(seq.items()),
            _ => None,
        }
    }

    pub fn pixel_sequence(&self) -> Option<&PixelFragmentSequence> {
        match self {
            Value::PixelSequence(seq) => Some(seq),
            _ => None,
        }
    }
}

impl From<PrimitiveValue> for Value {
    fn from(value: PrimitiveValue) -> Self {
        Value::Primitive(value)
    }
}

impl From<DataSetSequence> for Value {
    fn from(value: DataSetSequence) -> Self {
        Value::Sequence(value)
    }
}

impl From<PixelFragmentSequence> for Value {
    fn from(value: PixelFragmentSequence) -> Self {
        Value::PixelSequence(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn strings_to_int() {
        let value = PrimitiveValue::Strs(smallvec![" 12 ".to_string(), "-3".to_string()]);
        assert_eq!(value.to_int::<i32>(), Ok(12));
        assert_eq!(value.to_multi_int::<i32>(), Ok(vec![12, -3]));
        assert!(matches!(
            value.to_int::<u16>(),
            Ok(12)
        ));
        assert!(matches!(
            PrimitiveValue::from("abc").to_int::<i32>(),
            Err(ConvertValueError::Parse { .. })
        ));
    }

    #[test]
    fn first_int_ignores_trailing_values() {
        let value = PrimitiveValue::Strs(smallvec!["7".to_string(), "abc".to_string()]);
        assert_eq!(value.to_int::<i32>(), Ok(7));
        assert!(value.to_multi_int::<i32>().is_err());
        assert_eq!(value.to_float64(), Ok(7.));

        let value = PrimitiveValue::I32(smallvec![5, -1]);
        assert_eq!(value.to_int::<u16>(), Ok(5));
        assert!(matches!(
            value.to_multi_int::<u16>(),
            Err(ConvertValueError::Narrow { .. })
        ));
        assert!(matches!(
            PrimitiveValue::Empty.to_int::<u16>(),
            Err(ConvertValueError::NoValue { .. })
        ));
    }

    #[test]
    fn numbers_narrow() {
        let value = PrimitiveValue::from(70_000_u32);
        assert!(matches!(
            value.to_int::<u16>(),
            Err(ConvertValueError::Narrow { .. })
        ));
        assert_eq!(value.to_int::<u32>(), Ok(70_000));
        assert!(matches!(
            PrimitiveValue::from(1.5_f64).to_int::<i32>(),
            Err(ConvertValueError::Incompatible { .. })
        ));
    }

    #[test]
    fn floats_from_decimal_strings() {
        let value = PrimitiveValue::Strs(smallvec!["0.5".to_string(), "1e2 ".to_string()]);
        assert_eq!(value.to_multi_float64(), Ok(vec![0.5, 100.0]));
        assert_eq!(PrimitiveValue::from(3_u16).to_float64(), Ok(3.0));
        assert_eq!(
            PrimitiveValue::from(vec![-1.25_f64, 2.5]).to_multi_float64(),
            Ok(vec![-1.25, 2.5])
        );
        assert!(matches!(
            PrimitiveValue::Empty.to_float64(),
            Err(ConvertValueError::NoValue { .. })
        ));
    }

    #[test]
    fn joined_strings() {
        let value = PrimitiveValue::Strs(smallvec!["A".to_string(), "B".to_string()]);
        assert_eq!(value.to_str(), "A\\B");
        assert_eq!(value.multiplicity(), 2);
        assert_eq!(PrimitiveValue::from(vec![1_u16, 2, 3]).to_str(), "1\\2\\3");
        assert_eq!(PrimitiveValue::Empty.multiplicity(), 0);
        assert_eq!(PrimitiveValue::Str("text".into()).multiplicity(), 1);
    }
}
