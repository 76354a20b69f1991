//! Encoding of DICOM files, with write rules.
pub mod rules;
pub mod writer;

pub use rules::{Action, WriteRule, WriteRules};
pub use writer::{DicomWriter, SequenceLength, WriteOptions};
