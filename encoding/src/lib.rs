//! DICOM encoding and decoding primitives.
//!
//! This crate provides the building blocks for reading and writing
//! DICOM data in memory:
//!
//! - [`cursor`]: bounds-checked byte cursors and writers
//! - [`decode`] and [`encode`]: element headers and primitive values
//! - [`text`]: character sets, as named by Specific Character Set (0008,0005)
//! - [`transfer_syntax`]: the registry of [transfer syntax specifiers],
//!   which tell the byte order and VR mode of a data set
//!
//! All APIs work on byte slices that are already fully in memory.
//!
//! [transfer syntax specifiers]: transfer_syntax::TransferSyntax
pub mod cursor;
pub mod decode;
pub mod encode;
pub mod text;
pub mod transfer_syntax;

pub use byteordered::Endianness;
pub use cursor::{ByteCursor, ByteWriter};
pub use text::{SpecificCharacterSet, TextCodec};
pub use transfer_syntax::{Codec, TransferSyntax, TransferSyntaxIndex, TransferSyntaxRegistry};
