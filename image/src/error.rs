//! Error type of image construction and mutation.
use dwv_core::value::ConvertValueError;
use snafu::{Backtrace, Snafu};

#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Missing required attribute `{}`", name))]
    MissingElement {
        name: &'static str,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not convert attribute `{}`", name))]
    ConvertValue {
        name: &'static str,
        source: ConvertValueError,
        backtrace: Backtrace,
    },

    #[snafu(display("Semantically invalid value `{}` for attribute `{}`", value, name))]
    InvalidValue {
        name: &'static str,
        value: String,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Unsupported pixel format: {} bits allocated, pixel representation {}",
        bits_allocated,
        pixel_representation
    ))]
    UnsupportedPixelFormat {
        bits_allocated: u16,
        pixel_representation: u16,
        backtrace: Backtrace,
    },

    #[snafu(display("Pixel buffer holds {} samples, expected {}", actual, expected))]
    BufferSizeMismatch {
        expected: usize,
        actual: usize,
        backtrace: Backtrace,
    },

    #[snafu(display("Offset {} is out of bounds (buffer length {})", offset, len))]
    OffsetOutOfBounds {
        offset: usize,
        len: usize,
        backtrace: Backtrace,
    },

    #[snafu(display("Got {} values for {} offsets", values, offsets))]
    ValuesLengthMismatch {
        offsets: usize,
        values: usize,
        backtrace: Backtrace,
    },

    #[snafu(display("Cannot combine a {} buffer with a {} buffer", expected, actual))]
    IncompatibleBuffer {
        expected: &'static str,
        actual: &'static str,
        backtrace: Backtrace,
    },

    #[snafu(display("Pixel data in transfer syntax `{}` needs a frame decoder", uid))]
    MissingFrameDecoder { uid: String, backtrace: Backtrace },

    #[snafu(display("Could not decode frame #{}", frame))]
    DecodeFrame {
        frame: usize,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[snafu(display("Unknown attribute name `{}`", name))]
    UnknownTagName { name: String, backtrace: Backtrace },

    #[snafu(display("Invalid JSON value for `{}`: {}", name, reason))]
    InvalidJson {
        name: String,
        reason: &'static str,
        backtrace: Backtrace,
    },

    #[snafu(display("Index {} is out of bounds", index))]
    IndexOutOfBounds { index: String, backtrace: Backtrace },

    #[snafu(display("A slice already exists at {} in time point {}", origin, time))]
    DuplicateSlice {
        origin: String,
        time: u32,
        backtrace: Backtrace,
    },

    #[snafu(display("No window level preset named `{}`", name))]
    UnknownPreset { name: String, backtrace: Backtrace },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
