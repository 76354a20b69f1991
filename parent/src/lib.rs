//! # dwv
//!
//! This crate serves as a parent for the library crates of the project,
//! re-exporting each of them as a module.
//! The crates can also be fetched independently,
//! they all bear the `dwv-` prefix.
//!
//! ## Decoding and encoding
//!
//! - The [`core`] crate holds the data types the other crates rely on:
//!   tags ([`Tag`](dwv_core::Tag)),
//!   value representations ([`VR`](dwv_core::VR)),
//!   [values](dwv_core::Value) and [data elements](dwv_core::DataElement)
//!   gathered in [data sets](dwv_core::DataSet).
//! - The standard data dictionary is in [`dictionary_std`],
//!   with constants for known tags in [`tags`][dictionary_std::tags]
//!   and known UIDs in [`uids`][dictionary_std::uids].
//! - [`encoding`] reads and writes values and headers
//!   in any supported transfer syntax,
//!   and decodes text in the specific character sets.
//! - [`parser`] turns whole files into data sets and back,
//!   applying write rules such as anonymisation.
//!
//! ## Display
//!
//! - [`image`] builds images out of parsed data sets:
//!   geometry, rescale, window level, colour maps and views.
//! - To print human readable summaries of a parsed file,
//!   see the [`dump`] module.

pub use dwv_core as core;
pub use dwv_dictionary_std as dictionary_std;
pub use dwv_dump as dump;
pub use dwv_encoding as encoding;
pub use dwv_image as image;
pub use dwv_parser as parser;
