//! Error and warning types of the parser and writer.
use dwv_core::Tag;
use dwv_encoding::{decode, encode};
use snafu::{Backtrace, Snafu};
use std::fmt;

/// The coarse category of an [`Error`].
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// Not a DICOM file, or one this crate cannot read:
    /// bad magic code, unsupported transfer syntax, broken meta group.
    Format,
    /// The buffer ended in the middle of an element.
    TruncatedBuffer,
    /// A sequence or item is not properly delimited,
    /// or nesting limits were exceeded.
    MalformedSequence,
    /// A write rule has an unknown action.
    InvalidRuleAction,
    /// A data set could not be encoded.
    Encode,
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Missing DICM magic code at offset {}", offset))]
    MissingMagicCode { offset: usize, backtrace: Backtrace },
    #[snafu(display("Unsupported transfer syntax `{}`", uid))]
    UnsupportedTransferSyntax { uid: String, backtrace: Backtrace },
    #[snafu(display("File meta group not found at offset {}", offset))]
    MissingMetaGroup { offset: usize, backtrace: Backtrace },
    #[snafu(display("File meta group length {} does not match its content", len))]
    BadMetaGroupLength { len: u32, backtrace: Backtrace },
    #[snafu(display("Could not read element header at offset {}", offset))]
    ReadHeader {
        offset: usize,
        #[snafu(backtrace)]
        source: decode::Error,
    },
    #[snafu(display("Could not read value of {} at offset {}", tag, offset))]
    ReadValue {
        tag: Tag,
        offset: usize,
        #[snafu(backtrace)]
        source: decode::Error,
    },
    #[snafu(display(
        "Value of {} at offset {} is {} bytes long, but only {} bytes remain",
        tag,
        offset,
        len,
        available
    ))]
    ValueOutOfBounds {
        tag: Tag,
        offset: usize,
        len: u32,
        available: usize,
        backtrace: Backtrace,
    },
    #[snafu(display("Missing delimiter for {} started at offset {}", tag, offset))]
    MissingDelimiter {
        tag: Tag,
        offset: usize,
        backtrace: Backtrace,
    },
    #[snafu(display(
        "Inconsistent item end: expected end at offset {} but reached {}",
        expected,
        actual
    ))]
    InconsistentItemEnd {
        expected: usize,
        actual: usize,
        backtrace: Backtrace,
    },
    #[snafu(display("Unexpected {} at offset {}", tag, offset))]
    UnexpectedItem {
        tag: Tag,
        offset: usize,
        backtrace: Backtrace,
    },
    #[snafu(display("Undefined length for non-sequence element {} at offset {}", tag, offset))]
    UndefinedLength {
        tag: Tag,
        offset: usize,
        backtrace: Backtrace,
    },
    #[snafu(display("Sequence nesting deeper than {} at offset {}", max_depth, offset))]
    DepthExceeded {
        max_depth: usize,
        offset: usize,
        backtrace: Backtrace,
    },
    #[snafu(display("More than {} items at offset {}", max_items, offset))]
    TooManyItems {
        max_items: usize,
        offset: usize,
        backtrace: Backtrace,
    },
    #[snafu(display("Invalid action `{}` for write rule `{}`", action, key))]
    InvalidRuleAction {
        key: String,
        action: String,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not parse write rules"))]
    ParseRules {
        source: serde_json::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not encode {}", tag))]
    EncodeElement {
        tag: Tag,
        #[snafu(backtrace)]
        source: encode::Error,
    },
    #[snafu(display(
        "{} cannot be written in transfer syntax {}",
        what,
        uid
    ))]
    IncompatibleTransferSyntax {
        what: &'static str,
        uid: String,
        backtrace: Backtrace,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingMagicCode { .. }
            | Error::UnsupportedTransferSyntax { .. }
            | Error::MissingMetaGroup { .. }
            | Error::BadMetaGroupLength { .. } => ErrorKind::Format,
            Error::ReadHeader { source, .. } | Error::ReadValue { source, .. } => {
                match source {
                    decode::Error::BadSequenceHeader { .. } => ErrorKind::MalformedSequence,
                    e if e.out_of_bounds().is_some() => ErrorKind::TruncatedBuffer,
                    _ => ErrorKind::Format,
                }
            }
            Error::ValueOutOfBounds { .. } => ErrorKind::TruncatedBuffer,
            Error::MissingDelimiter { .. }
            | Error::InconsistentItemEnd { .. }
            | Error::UnexpectedItem { .. }
            | Error::UndefinedLength { .. }
            | Error::DepthExceeded { .. }
            | Error::TooManyItems { .. } => ErrorKind::MalformedSequence,
            Error::InvalidRuleAction { .. } | Error::ParseRules { .. } => {
                ErrorKind::InvalidRuleAction
            }
            Error::EncodeElement { .. } | Error::IncompatibleTransferSyntax { .. } => {
                ErrorKind::Encode
            }
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A recoverable condition met while parsing.
///
/// Warnings never stop the parser:
/// they are collected in the parse result and logged.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Warning {
    /// An implicit VR element is not in the dictionary,
    /// so it was read as `UN`.
    UnknownVr { tag: Tag },
    /// An explicit VR header had an unknown VR code,
    /// so it was read as an implicit VR header.
    InvalidVrCode { tag: Tag, code: [u8; 2] },
    /// A Specific Character Set term is not supported.
    CharacterSet { term: String },
    /// The file meta group has no transfer syntax,
    /// so Implicit VR Little Endian was assumed.
    MissingTransferSyntax,
    /// A value has an odd length.
    OddValueLength { tag: Tag, len: u32 },
    /// The data set is followed by bytes which do not make an element.
    TrailingBytes { offset: usize, len: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::UnknownVr { tag } => {
                write!(f, "Unknown VR for {}, read as UN", tag)
            }
            Warning::InvalidVrCode { tag, code } => write!(
                f,
                "Invalid VR code {:?} for {}, read as implicit VR",
                String::from_utf8_lossy(code),
                tag
            ),
            Warning::CharacterSet { term } => write!(
                f,
                "Unsupported character set `{}`, using the default repertoire",
                term
            ),
            Warning::MissingTransferSyntax => f.write_str(
                "Missing transfer syntax, assuming Implicit VR Little Endian",
            ),
            Warning::OddValueLength { tag, len } => {
                write!(f, "Odd value length {} for {}", len, tag)
            }
            Warning::TrailingBytes { offset, len } => {
                write!(f, "Ignored {} trailing bytes at offset {}", len, offset)
            }
        }
    }
}
