//! Decoding and encoding of whole DICOM files held in memory.
//!
//! [`DicomParser`] turns a byte buffer into a [`ParsedFile`]:
//! the file meta group, the main data set,
//! and the warnings collected along the way.
//! [`DicomWriter`] turns it back into bytes,
//! applying [`WriteRules`] to the main data set.
//!
//! ```no_run
//! use dwv_parser::{DicomParser, DicomWriter, WriteRules};
//! # fn run(bytes: &[u8]) -> Result<(), dwv_parser::Error> {
//! let file = DicomParser::new().parse(bytes)?;
//! for warning in &file.warnings {
//!     println!("{}", warning);
//! }
//! let _anonymised = DicomWriter::new()
//!     .with_rules(WriteRules::anonymise())
//!     .write(&file)?;
//! # Ok(())
//! # }
//! ```
pub mod error;
pub mod fragments;
pub mod meta;
pub mod options;
pub mod read;
pub mod write;

pub use error::{Error, ErrorKind, Result, Warning};
pub use fragments::{frame_data, frame_fragments, frame_ranges};
pub use meta::FileMetaTable;
pub use options::ReadOptions;
pub use read::{DicomParser, ParsedFile};
pub use write::{Action, DicomWriter, SequenceLength, WriteOptions, WriteRule, WriteRules};
