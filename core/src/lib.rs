#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(missing_debug_implementations, unused_qualifications, unused_import_braces)]

//! Core library of the dwv DICOM stack,
//! containing the data structures shared by the codec and the image pipeline.
//!
//! - [`header`] comprises the data types for DICOM element headers,
//!   including DICOM tags, value representations and their kinds,
//!   and value lengths.
//! - [`value`] holds the values of data elements,
//!   with the awareness of multiplicity and the possible presence of
//!   sequences or encapsulated pixel data.
//! - [`element`] and [`dataset`] define the decoded element
//!   and the ordered element map keyed by tag.
//! - [`dictionary`] describes the behavior of DICOM data dictionaries,
//!   which translate attribute names and tags to a dictionary entry.

pub mod dataset;
pub mod dictionary;
pub mod element;
pub mod header;
pub mod prelude;
pub mod value;

pub use dataset::DataSet;
pub use dictionary::{DataDictionary, DataDictionaryEntry, Multiplicity};
pub use element::DataElement;
pub use header::{DataElementHeader, HasLength, Header, Length, Tag, VrKind, VR};
pub use value::{PrimitiveValue, Value};

// re-export crates that are part of the public API
pub use smallvec;
