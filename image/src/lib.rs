//! Images, geometry and views over decoded DICOM data sets.
//!
//! An [`ImageFactory`] builds an [`Image`] out of a parsed data set:
//! a typed [`PixelBuffer`] laid out on a [`Geometry`],
//! with the rescale of every slice and the meta data needed for display.
//! Slices and frames of other files can be appended to an image.
//!
//! A [`View`] renders one plane of an image as RGBA,
//! through the pixel value pipeline:
//! rescale, window level, then a [`ColourMap`].
//!
//! ```no_run
//! use dwv_image::{ImageFactory, View};
//! use dwv_parser::DicomParser;
//! use std::sync::Arc;
//! # fn run(bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let file = DicomParser::new().parse(bytes)?;
//! let image = ImageFactory::new().create_from_file(&file)?;
//! let mut view = View::new(Arc::new(image));
//! view.set_window_level_preset("minmax", true)?;
//! let rgba = view.generate_image_data();
//! # Ok(())
//! # }
//! ```
pub mod attribute;
pub mod buffer;
pub mod colour_map;
pub mod error;
pub mod factory;
pub mod geometry;
pub mod image;
pub mod json;
pub mod lut;
pub mod math;
pub mod transform;
pub mod view;

pub use buffer::{PixelBuffer, SampleFormat};
pub use colour_map::ColourMap;
pub use error::{Error, Result};
pub use factory::{FrameDecoder, FrameInfo, ImageFactory};
pub use geometry::{Geometry, Size, Spacing};
pub use image::{DataRange, Histogram, Image, ImageMeta, WindowPreset};
pub use json::{data_set_from_json, image_from_json, view_from_json};
pub use lut::{LutKey, RescaleLut, WindowLut};
pub use math::{Index, Matrix33, Point3D, Vector3D};
pub use transform::{RescaleSlopeAndIntercept, WindowCenterAndWidth};
pub use view::{ListenerId, View, ViewEvent};
