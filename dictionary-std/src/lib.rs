//! This crate implements a curated standard DICOM dictionary and constants.
//!
//! ## Run-time dictionaries
//!
//! - [`data_element`]: the standard attributes most relevant to decoding
//!   and displaying images, with their VR and value multiplicity.
//!   Private attributes never resolve here.
//! - [`PrivateDictionary`]: a caller-supplied dictionary of private attributes.
//! - [`groups`]: names of attribute groups (e.g. _Patient_, _Pixel Data_).
//!
//! ## Constants
//!
//! - [`tags`], which map an attribute alias to a DICOM tag
//! - [`uids`], for transfer syntaxes and common storage SOP classes
pub mod data_element;
pub mod groups;
mod private;
pub mod tags;
pub mod uids;

pub use data_element::{entry_count, StandardDataDictionary};
pub use groups::{group_by_name, group_name};
pub use private::PrivateDictionary;
