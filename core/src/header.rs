//! This module contains the basic types for interpreting DICOM data elements:
//! the attribute tag, the value representation, the value length,
//! and the element and item headers read off the wire.

use snafu::{Backtrace, Snafu};
use std::fmt;
use std::str::{from_utf8, FromStr};

/// Error type for issues constructing a sequence item header.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SequenceItemHeaderError {
    /// Unexpected header tag.
    /// Only Item (0xFFFE, 0xE000),
    /// Item Delimiter (0xFFFE, 0xE00D),
    /// or Sequence Delimiter (0xFFFE, 0xE0DD)
    /// are admitted.
    #[snafu(display("Unexpected tag {}", tag))]
    UnexpectedTag { tag: Tag, backtrace: Backtrace },
    /// Unexpected delimiter value length.
    /// Must be zero for item delimiters.
    #[snafu(display("Unexpected delimiter length {}", len))]
    UnexpectedDelimiterLength { len: Length, backtrace: Backtrace },
}

type Result<T, E = SequenceItemHeaderError> = std::result::Result<T, E>;

/// Anything read off a header with a value length: elements and items.
pub trait HasLength {
    fn length(&self) -> Length;

    /// Whether the value holds no bytes.
    /// Undefined lengths are never empty.
    fn is_empty(&self) -> bool {
        self.length() == Length(0)
    }
}

/// An element or item header.
pub trait Header: HasLength {
    fn tag(&self) -> Tag;

    fn is_item(&self) -> bool {
        self.tag() == Tag::ITEM
    }

    fn is_item_delimiter(&self) -> bool {
        self.tag() == Tag::ITEM_DELIMITER
    }

    fn is_sequence_delimiter(&self) -> bool {
        self.tag() == Tag::SEQUENCE_DELIMITER
    }

    /// Pixel data with an undefined length holds fragments.
    fn is_encapsulated_pixeldata(&self) -> bool {
        self.tag() == Tag::PIXEL_DATA && self.length().is_undefined()
    }
}

/// A data structure for a data element header, containing
/// a tag, value representation and specified length.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct DataElementHeader {
    /// DICOM tag
    pub tag: Tag,
    /// Value Representation
    pub vr: VR,
    /// Element length
    pub len: Length,
}

impl HasLength for DataElementHeader {
    #[inline]
    fn length(&self) -> Length {
        self.len
    }
}

impl Header for DataElementHeader {
    #[inline]
    fn tag(&self) -> Tag {
        self.tag
    }
}

impl DataElementHeader {
    /// Create a new data element header with the given properties.
    #[inline]
    pub fn new<T: Into<Tag>>(tag: T, vr: VR, len: Length) -> DataElementHeader {
        DataElementHeader {
            tag: tag.into(),
            vr,
            len,
        }
    }

    /// Retrieve the element's value representation, which can be unknown.
    #[inline]
    pub fn vr(&self) -> VR {
        self.vr
    }

    /// Check whether the header suggests the value to be a sequence value:
    /// if the value representation is SQ or the length is undefined.
    #[inline]
    pub fn is_non_primitive(&self) -> bool {
        self.vr == VR::SQ || self.length().is_undefined()
    }
}

/// Data type for describing a sequence item data element.
/// If the element represents an item, it will also contain
/// the specified length.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum SequenceItemHeader {
    /// The cursor contains an item.
    Item {
        /// the length of the item in bytes (can be 0xFFFFFFFF if undefined)
        len: Length,
    },
    /// The cursor read an item delimiter.
    ItemDelimiter,
    /// The cursor read a sequence delimiter.
    SequenceDelimiter,
}

impl SequenceItemHeader {
    /// Create a sequence item header using the element's raw properties.
    /// An error is raised if the given properties do not relate to a
    /// sequence item, a sequence item delimiter or a sequence delimiter.
    pub fn new<T: Into<Tag>>(tag: T, len: Length) -> Result<SequenceItemHeader> {
        match tag.into() {
            Tag::ITEM => Ok(SequenceItemHeader::Item { len }),
            Tag::ITEM_DELIMITER => {
                // delimiters should not have a positive length
                if len != Length(0) {
                    UnexpectedDelimiterLengthSnafu { len }.fail()
                } else {
                    Ok(SequenceItemHeader::ItemDelimiter)
                }
            }
            Tag::SEQUENCE_DELIMITER => Ok(SequenceItemHeader::SequenceDelimiter),
            tag => UnexpectedTagSnafu { tag }.fail(),
        }
    }
}

impl HasLength for SequenceItemHeader {
    #[inline]
    fn length(&self) -> Length {
        match *self {
            SequenceItemHeader::Item { len } => len,
            SequenceItemHeader::ItemDelimiter | SequenceItemHeader::SequenceDelimiter => Length(0),
        }
    }
}

impl Header for SequenceItemHeader {
    #[inline]
    fn tag(&self) -> Tag {
        match *self {
            SequenceItemHeader::Item { .. } => Tag::ITEM,
            SequenceItemHeader::ItemDelimiter => Tag::ITEM_DELIMITER,
            SequenceItemHeader::SequenceDelimiter => Tag::SEQUENCE_DELIMITER,
        }
    }
}

macro_rules! value_representations {
    ($($vr:ident => $name:literal,)*) => {
        /// A DICOM value representation.
        #[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Ord, PartialOrd)]
        pub enum VR {
            $(
                #[doc = $name]
                $vr,
            )*
        }

        impl VR {
            /// The two letter code of this VR.
            pub fn to_string(self) -> &'static str {
                match self {
                    $(VR::$vr => stringify!($vr),)*
                }
            }
        }

        /// Only the two letter codes in upper case are recognized.
        impl FromStr for VR {
            type Err = &'static str;

            fn from_str(code: &str) -> std::result::Result<Self, Self::Err> {
                match code {
                    $(stringify!($vr) => Ok(VR::$vr),)*
                    _ => Err("no such value representation"),
                }
            }
        }
    };
}

value_representations! {
    AE => "Application Entity",
    AS => "Age String",
    AT => "Attribute Tag",
    CS => "Code String",
    DA => "Date",
    DS => "Decimal String",
    DT => "Date Time",
    FL => "Floating Point Single",
    FD => "Floating Point Double",
    IS => "Integer String",
    LO => "Long String",
    LT => "Long Text",
    OB => "Other Byte",
    OD => "Other Double",
    OF => "Other Float",
    OL => "Other Long",
    OV => "Other Very Long",
    OW => "Other Word",
    PN => "Person Name",
    SH => "Short String",
    SL => "Signed Long",
    SQ => "Sequence of Items",
    SS => "Signed Short",
    ST => "Short Text",
    SV => "Signed Very Long",
    TM => "Time",
    UC => "Unlimited Characters",
    UI => "Unique Identifier (UID)",
    UL => "Unsigned Long",
    UN => "Unknown",
    UR => "Universal Resource Identifier or Universal Resource Locator (URI/URL)",
    US => "Unsigned Short",
    UT => "Unlimited Text",
    UV => "Unsigned Very Long",
}

/// The category of a value representation,
/// which determines how its value bytes are decoded and encoded.
///
/// Every [`VR`] maps to exactly one kind,
/// so codecs can match on this enum exhaustively
/// instead of enumerating value representations.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum VrKind {
    /// Character data.
    Text {
        /// whether the value may hold several values separated by `\`
        multi: bool,
        /// whether the Specific Character Set applies,
        /// as opposed to the default character repertoire
        extended: bool,
    },
    /// Binary integers of a fixed width (in bytes).
    Integer { width: u8, signed: bool },
    /// IEEE 754 floating point numbers of a fixed width (in bytes).
    Float { width: u8 },
    /// Attribute tags, as pairs of 16-bit integers.
    Tag,
    /// Nested data sets.
    Sequence,
    /// Opaque bytes.
    Binary,
}

impl VrKind {
    /// The width in bytes of each value, if values have a fixed width.
    pub fn width(self) -> Option<usize> {
        match self {
            VrKind::Integer { width, .. } | VrKind::Float { width } => Some(width as usize),
            VrKind::Tag => Some(4),
            VrKind::Binary => Some(1),
            VrKind::Text { .. } | VrKind::Sequence => None,
        }
    }
}

impl VR {
    /// Read a VR from the two bytes of an explicit VR header.
    pub fn from_binary(code: [u8; 2]) -> Option<Self> {
        from_utf8(&code).ok()?.parse().ok()
    }

    /// The two letter code as written in an explicit VR header.
    pub fn to_bytes(self) -> [u8; 2] {
        match self.to_string().as_bytes() {
            [a, b] => [*a, *b],
            _ => [b'U', b'N'],
        }
    }

    /// Obtain the category of this value representation.
    pub fn kind(self) -> VrKind {
        use VR::*;
        match self {
            AE | AS | CS | DA | DS | DT | IS | TM | UI => VrKind::Text {
                multi: true,
                extended: false,
            },
            LO | PN | SH | UC => VrKind::Text {
                multi: true,
                extended: true,
            },
            LT | ST | UT => VrKind::Text {
                multi: false,
                extended: true,
            },
            UR => VrKind::Text {
                multi: false,
                extended: false,
            },
            US | OW => VrKind::Integer {
                width: 2,
                signed: false,
            },
            SS => VrKind::Integer {
                width: 2,
                signed: true,
            },
            UL | OL => VrKind::Integer {
                width: 4,
                signed: false,
            },
            SL => VrKind::Integer {
                width: 4,
                signed: true,
            },
            UV | OV => VrKind::Integer {
                width: 8,
                signed: false,
            },
            SV => VrKind::Integer {
                width: 8,
                signed: true,
            },
            FL | OF => VrKind::Float { width: 4 },
            FD | OD => VrKind::Float { width: 8 },
            AT => VrKind::Tag,
            SQ => VrKind::Sequence,
            OB | UN => VrKind::Binary,
        }
    }

    /// Whether an explicit VR header of this representation
    /// has 2 reserved bytes followed by a 4-byte length,
    /// instead of a 2-byte length.
    pub fn has_long_length(self) -> bool {
        use VR::*;
        matches!(self, OB | OD | OF | OL | OV | OW | SQ | SV | UC | UN | UR | UT | UV)
    }

    /// The byte used to pad odd-length values to an even length.
    pub fn padding(self) -> u8 {
        match self.kind() {
            VrKind::Text { .. } if self != VR::UI => b' ',
            _ => 0,
        }
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(VR::to_string(*self))
    }
}

/// Idiomatic alias for a tag's group number.
pub type GroupNumber = u16;
/// Idiomatic alias for a tag's element number.
pub type ElementNumber = u16;

/// The data type for DICOM data element tags.
///
/// Besides the `(group, element)` pair,
/// a tag can be written as an 8 hexadecimal digit key
/// (for instance `"00080060"` for _Modality_),
/// which is the form used to index decoded element maps.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
pub struct Tag(pub GroupNumber, pub ElementNumber);

impl Tag {
    /// Item (FFFE,E000)
    pub const ITEM: Tag = Tag(0xFFFE, 0xE000);
    /// Item Delimitation Item (FFFE,E00D)
    pub const ITEM_DELIMITER: Tag = Tag(0xFFFE, 0xE00D);
    /// Sequence Delimitation Item (FFFE,E0DD)
    pub const SEQUENCE_DELIMITER: Tag = Tag(0xFFFE, 0xE0DD);
    /// Pixel Data (7FE0,0010)
    pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

    /// Getter for the tag's group value.
    #[inline]
    pub fn group(self) -> GroupNumber {
        self.0
    }

    /// Getter for the tag's element value.
    #[inline]
    pub fn element(self) -> ElementNumber {
        self.1
    }

    /// Whether the tag belongs to a private group (odd group number).
    #[inline]
    pub fn is_private(self) -> bool {
        self.0 & 1 == 1
    }

    /// Whether the tag is a private creator, `(gggg,0010-00FF)` with odd `gggg`.
    #[inline]
    pub fn is_private_creator(self) -> bool {
        self.is_private() && (0x0010..=0x00FF).contains(&self.1)
    }

    /// Whether the tag is a group length, `(gggg,0000)`.
    #[inline]
    pub fn is_group_length(self) -> bool {
        self.1 == 0x0000
    }

    /// Whether the tag is in the delimitation group (FFFE).
    #[inline]
    pub fn is_delimitation(self) -> bool {
        self.0 == 0xFFFE
    }

    /// The 8 character key of this tag, in upper case hexadecimal.
    pub fn key(self) -> String {
        format!("{:04X}{:04X}", self.0, self.1)
    }

    /// Parse a tag from its 8 character hexadecimal key.
    pub fn from_key(key: &str) -> Option<Tag> {
        if key.len() != 8 || !key.is_ascii() {
            return None;
        }
        let group = u16::from_str_radix(&key[..4], 16).ok()?;
        let element = u16::from_str_radix(&key[4..], 16).ok()?;
        Some(Tag(group, element))
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({:#06X?}, {:#06X?})", self.0, self.1)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

impl PartialEq<(u16, u16)> for Tag {
    fn eq(&self, other: &(u16, u16)) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}

impl From<(u16, u16)> for Tag {
    #[inline]
    fn from(value: (u16, u16)) -> Tag {
        Tag(value.0, value.1)
    }
}

impl From<[u16; 2]> for Tag {
    #[inline]
    fn from(value: [u16; 2]) -> Tag {
        Tag(value[0], value[1])
    }
}

/// Parse a tag in one of the forms `(gggg,eeee)`, `gggg,eeee` or `ggggeeee`.
impl FromStr for Tag {
    type Err = &'static str;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(s);
        let key: String = match s.split_once(',') {
            Some((group, element)) if group.len() == 4 && element.len() == 4 => {
                [group, element].concat()
            }
            Some(_) => return Err("invalid tag components"),
            None => s.to_string(),
        };
        Tag::from_key(&key).ok_or("invalid tag")
    }
}

/// A value length in bytes, as read from an element or item header.
///
/// `0xFFFF_FFFF` stands for an undefined length,
/// where the end of the value is found through delimitation items.
/// An undefined length never compares equal to anything,
/// not even to another undefined length.
///
/// ```
/// # use dwv_core::Length;
/// assert_ne!(Length::UNDEFINED, Length::UNDEFINED);
/// assert!(Length::UNDEFINED.inner_eq(Length::UNDEFINED));
/// ```
#[derive(Clone, Copy)]
pub struct Length(pub u32);

const UNDEFINED_LEN: u32 = 0xFFFF_FFFF;

impl Length {
    pub const UNDEFINED: Self = Length(UNDEFINED_LEN);

    #[inline]
    pub fn new(len: u32) -> Self {
        Length(len)
    }

    /// A defined length.
    ///
    /// # Panic
    ///
    /// Panics if `len` is the undefined length marker.
    #[inline]
    pub fn defined(len: u32) -> Self {
        assert_ne!(len, UNDEFINED_LEN);
        Length(len)
    }

    #[inline]
    pub fn is_undefined(self) -> bool {
        self.0 == UNDEFINED_LEN
    }

    #[inline]
    pub fn is_defined(self) -> bool {
        self.0 != UNDEFINED_LEN
    }

    /// The number of bytes, or `None` if undefined.
    #[inline]
    pub fn get(self) -> Option<u32> {
        if self.is_undefined() {
            None
        } else {
            Some(self.0)
        }
    }

    /// Compare the raw values, so that two undefined lengths are equivalent.
    #[inline]
    pub fn inner_eq(self, other: Length) -> bool {
        self.0 == other.0
    }
}

impl From<u32> for Length {
    #[inline]
    fn from(len: u32) -> Self {
        Length(len)
    }
}

impl PartialEq<Length> for Length {
    fn eq(&self, rhs: &Length) -> bool {
        self.is_defined() && self.0 == rhs.0
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.get() {
            Some(len) => write!(f, "Length({})", len),
            None => f.write_str("Length(Undefined)"),
        }
    }
}

/// Undefined lengths are printed as `U/L`.
impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.get() {
            Some(len) => write!(f, "{}", len),
            None => f.write_str("U/L"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_from_u16_pair() {
        let t = Tag::from((0x0010u16, 0x0020u16));
        assert_eq!(0x0010u16, t.group());
        assert_eq!(0x0020u16, t.element());
    }

    #[test]
    fn tag_key_round_trips() {
        assert_eq!(Tag(0x0008, 0x0060).key(), "00080060");
        assert_eq!(Tag(0x7FE0, 0x0010).key(), "7FE00010");
        assert_eq!(Tag::from_key("7fe00010"), Some(Tag(0x7FE0, 0x0010)));
        assert_eq!(Tag::from_key("0008006"), None);
        assert_eq!(Tag::from_key("0008006Z"), None);
    }

    #[test]
    fn tag_parse_forms() {
        assert_eq!("(0010,0010)".parse::<Tag>(), Ok(Tag(0x0010, 0x0010)));
        assert_eq!("0028,0100".parse::<Tag>(), Ok(Tag(0x0028, 0x0100)));
        assert_eq!("00280101".parse::<Tag>(), Ok(Tag(0x0028, 0x0101)));
        assert!("0028,01000".parse::<Tag>().is_err());
        assert!("PatientName".parse::<Tag>().is_err());
    }

    #[test]
    fn private_tags() {
        assert!(Tag(0x0009, 0x1001).is_private());
        assert!(Tag(0x0009, 0x0010).is_private_creator());
        assert!(!Tag(0x0009, 0x1010).is_private_creator());
        assert!(!Tag(0x0010, 0x0010).is_private());
    }

    #[test]
    fn display_tag() {
        assert_eq!(Tag(0x0028, 0x0010).to_string(), "(0028,0010)");
        assert_eq!(format!("{:?}", Tag(0x0028, 0x0010)), "Tag(0x0028, 0x0010)");
    }

    #[test]
    fn vr_kinds() {
        assert_eq!(
            VR::US.kind(),
            VrKind::Integer {
                width: 2,
                signed: false
            }
        );
        assert_eq!(VR::FD.kind(), VrKind::Float { width: 8 });
        assert_eq!(VR::SQ.kind(), VrKind::Sequence);
        assert_eq!(VR::UN.kind(), VrKind::Binary);
        assert_eq!(
            VR::PN.kind(),
            VrKind::Text {
                multi: true,
                extended: true
            }
        );
        assert!(VR::OB.has_long_length());
        assert!(VR::UT.has_long_length());
        assert!(!VR::US.has_long_length());
        assert_eq!(VR::UI.padding(), 0);
        assert_eq!(VR::LO.padding(), b' ');
        assert_eq!(VR::OB.padding(), 0);
    }

    #[test]
    fn vr_from_binary() {
        assert_eq!(VR::from_binary(*b"OW"), Some(VR::OW));
        assert_eq!(VR::from_binary(*b"ZZ"), None);
        assert_eq!(VR::from_binary([0x00, 0x10]), None);
    }

    #[test]
    fn sequence_item_headers() {
        assert_eq!(
            SequenceItemHeader::new(Tag::ITEM, Length(16)).unwrap(),
            SequenceItemHeader::Item { len: Length(16) }
        );
        assert_eq!(
            SequenceItemHeader::new(Tag::ITEM_DELIMITER, Length(0)).unwrap(),
            SequenceItemHeader::ItemDelimiter
        );
        assert!(SequenceItemHeader::new(Tag::ITEM_DELIMITER, Length(2)).is_err());
        assert!(SequenceItemHeader::new(Tag(0x0008, 0x0005), Length(0)).is_err());
    }

    #[test]
    fn undefined_length_comparisons() {
        assert_ne!(Length::UNDEFINED, Length::UNDEFINED);
        assert!(Length::UNDEFINED.inner_eq(Length::UNDEFINED));
        assert_eq!(Length(8), Length(8));
        assert_eq!(Length::UNDEFINED.get(), None);
        assert_eq!(Length(4).get(), Some(4));
    }
}
