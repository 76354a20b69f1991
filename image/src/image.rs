//! The image volume: pixel buffer, geometry and per-slice rescale.
use crate::buffer::{PixelBuffer, SampleFormat};
use crate::error::{
    BufferSizeMismatchSnafu, IncompatibleBufferSnafu, OffsetOutOfBoundsSnafu, Result,
    ValuesLengthMismatchSnafu,
};
use crate::geometry::Geometry;
use crate::math::{Index, Point3D};
use crate::transform::{RescaleSlopeAndIntercept, WindowCenterAndWidth};
use snafu::ensure;

/// A named window level.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPreset {
    pub name: String,
    pub wl: WindowCenterAndWidth,
}

/// Descriptive attributes of an image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMeta {
    pub modality: Option<String>,
    pub bits_stored: u16,
    pub bits_allocated: u16,
    pub pixel_representation: u16,
    /// window levels found in the data set
    pub window_presets: Vec<WindowPreset>,
    /// one per slice, in slice order over all time points
    pub sop_instance_uids: Vec<String>,
}

impl Default for ImageMeta {
    fn default() -> Self {
        ImageMeta {
            modality: None,
            bits_stored: 8,
            bits_allocated: 8,
            pixel_representation: 0,
            window_presets: Vec::new(),
            sop_instance_uids: Vec::new(),
        }
    }
}

impl ImageMeta {
    pub fn is_signed(&self) -> bool {
        self.pixel_representation == 1
    }

    pub fn sample_format(&self) -> SampleFormat {
        SampleFormat {
            bits_allocated: self.bits_allocated,
            bits_stored: self.bits_stored,
            pixel_representation: self.pixel_representation,
        }
    }
}

/// Minimum and maximum values.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DataRange {
    pub min: f64,
    pub max: f64,
}

/// Counts of rescaled values in equal-width bins over the rescaled range.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub range: DataRange,
    pub bins: Vec<u64>,
}

/// A multi-slice, multi-frame image.
///
/// Samples are stored time point first, then slice, row, column
/// and component.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    geometry: Geometry,
    buffer: PixelBuffer,
    rsis: Vec<RescaleSlopeAndIntercept>,
    photometric_interpretation: String,
    planar_configuration: u16,
    number_of_components: usize,
    meta: ImageMeta,
}

impl Image {
    /// Create an image from a geometry and its samples.
    ///
    /// The buffer must hold exactly one sample per component
    /// of every position of the geometry.
    pub fn new(geometry: Geometry, buffer: PixelBuffer, number_of_components: usize) -> Result<Self> {
        let number_of_components = number_of_components.max(1);
        let expected = geometry.size().plane_size()
            * geometry.current_total_number_of_slices()
            * number_of_components;
        ensure!(
            buffer.len() == expected,
            BufferSizeMismatchSnafu {
                expected,
                actual: buffer.len()
            }
        );
        let photometric_interpretation = if number_of_components == 3 {
            "RGB"
        } else {
            "MONOCHROME2"
        }
        .to_string();
        Ok(Image {
            rsis: vec![RescaleSlopeAndIntercept::IDENTITY; geometry.current_total_number_of_slices()],
            geometry,
            buffer,
            photometric_interpretation,
            planar_configuration: 0,
            number_of_components,
            meta: ImageMeta::default(),
        })
    }

    pub fn with_photometric_interpretation(mut self, value: impl Into<String>) -> Self {
        self.photometric_interpretation = value.into();
        self
    }

    pub fn with_planar_configuration(mut self, value: u16) -> Self {
        self.planar_configuration = value;
        self
    }

    pub fn with_meta(mut self, meta: ImageMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Use the same rescale for every slice.
    pub fn with_rsi(mut self, rsi: RescaleSlopeAndIntercept) -> Self {
        self.rsis.iter_mut().for_each(|r| *r = rsi);
        self
    }

    /// Set the rescale of one slice, counted over all time points.
    pub fn set_rsi(&mut self, slice: usize, rsi: RescaleSlopeAndIntercept) -> Result<()> {
        let len = self.rsis.len();
        ensure!(slice < len, OffsetOutOfBoundsSnafu { offset: slice, len });
        self.rsis[slice] = rsi;
        Ok(())
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn meta(&self) -> &ImageMeta {
        &self.meta
    }

    pub fn photometric_interpretation(&self) -> &str {
        &self.photometric_interpretation
    }

    pub fn planar_configuration(&self) -> u16 {
        self.planar_configuration
    }

    pub fn number_of_components(&self) -> usize {
        self.number_of_components
    }

    /// The number of time points.
    pub fn number_of_frames(&self) -> usize {
        self.geometry.times().count()
    }

    fn slice_len(&self) -> usize {
        self.geometry.size().plane_size() * self.number_of_components
    }

    /// The slice number, over all time points, of a buffer offset.
    pub fn slice_of_offset(&self, offset: usize) -> usize {
        offset / self.slice_len().max(1)
    }

    /// The slice number, over all time points, of an index.
    ///
    /// `None` if the index time point does not exist.
    pub fn slice_of_index(&self, index: &Index) -> Option<usize> {
        let time = self.geometry.time_at(index.get(3))?;
        Some(self.geometry.current_number_of_slices_before_time(time) + index.get(2))
    }

    /// The buffer offset of the first component at an index.
    pub fn index_to_offset(&self, index: &Index) -> Option<usize> {
        let slice = self.slice_of_index(index)?;
        let size = self.geometry.size();
        let in_plane = index.get(1) * size.dim_size(0) + index.get(0);
        Some(slice * self.slice_len() + in_plane * self.number_of_components)
    }

    /// The rescale of a slice, counted over all time points.
    pub fn rsi(&self, slice: usize) -> RescaleSlopeAndIntercept {
        self.rsis
            .get(slice)
            .or_else(|| self.rsis.first())
            .copied()
            .unwrap_or_default()
    }

    /// Whether every slice has the same rescale.
    pub fn is_constant_rsi(&self) -> bool {
        self.rsis.windows(2).all(|w| w[0] == w[1])
    }

    /// Whether every slice has the identity rescale.
    pub fn is_identity_rsi(&self) -> bool {
        self.rsis.iter().all(|r| r.is_identity())
    }

    /// The distinct rescales of the image, in slice order.
    pub fn distinct_rsis(&self) -> Vec<RescaleSlopeAndIntercept> {
        let mut out: Vec<RescaleSlopeAndIntercept> = Vec::new();
        for rsi in &self.rsis {
            if !out.contains(rsi) {
                out.push(*rsi);
            }
        }
        out
    }

    /// The sample at a buffer offset.
    ///
    /// No bounds checking: the offset must come from a valid index.
    #[inline]
    pub fn value_at_offset(&self, offset: usize) -> f64 {
        self.buffer.get(offset)
    }

    /// The first component sample at an index.
    ///
    /// No bounds checking: validate the index with the geometry first.
    ///
    /// # Panics
    ///
    /// Panics if the index is outside of the image.
    pub fn value_at_index(&self, index: &Index) -> f64 {
        let offset = self.index_to_offset(index).unwrap_or(usize::MAX);
        self.buffer.get(offset)
    }

    /// The sample at a buffer offset, rescaled with its slice rescale.
    #[inline]
    pub fn rescaled_value_at_offset(&self, offset: usize) -> f64 {
        self.rsi(self.slice_of_offset(offset))
            .apply(self.buffer.get(offset))
    }

    pub fn rescaled_value_at_index(&self, index: &Index) -> f64 {
        let offset = self.index_to_offset(index).unwrap_or(usize::MAX);
        self.rescaled_value_at_offset(offset)
    }

    /// Set the same value at several offsets, returning the previous values.
    ///
    /// Nothing is modified if any offset is out of bounds.
    pub fn set_at_offsets(&mut self, offsets: &[usize], value: f64) -> Result<Vec<f64>> {
        self.check_offsets(offsets)?;
        offsets
            .iter()
            .map(|&offset| self.buffer.set(offset, value))
            .collect()
    }

    /// Set one value per offset, returning the previous values.
    ///
    /// Nothing is modified if the lengths differ or any offset is out of bounds.
    pub fn set_at_offsets_with_values(
        &mut self,
        offsets: &[usize],
        values: &[f64],
    ) -> Result<Vec<f64>> {
        ensure!(
            offsets.len() == values.len(),
            ValuesLengthMismatchSnafu {
                offsets: offsets.len(),
                values: values.len()
            }
        );
        self.check_offsets(offsets)?;
        offsets
            .iter()
            .zip(values)
            .map(|(&offset, &value)| self.buffer.set(offset, value))
            .collect()
    }

    fn check_offsets(&self, offsets: &[usize]) -> Result<()> {
        let len = self.buffer.len();
        if let Some(&offset) = offsets.iter().find(|&&o| o >= len) {
            return OffsetOutOfBoundsSnafu { offset, len }.fail();
        }
        Ok(())
    }

    fn check_slice_buffer(&self, buffer: &PixelBuffer, slices: usize) -> Result<()> {
        ensure!(
            std::mem::discriminant(buffer) == std::mem::discriminant(&self.buffer),
            IncompatibleBufferSnafu {
                expected: self.buffer.type_name(),
                actual: buffer.type_name(),
            }
        );
        let expected = self.slice_len() * slices;
        ensure!(
            buffer.len() == expected,
            BufferSizeMismatchSnafu {
                expected,
                actual: buffer.len()
            }
        );
        Ok(())
    }

    /// Insert a single-slice image at its place along the scroll axis.
    ///
    /// A slice of an unknown time point starts a new time point.
    /// Returns the slice number of the new slice over all time points.
    pub fn append_slice(&mut self, slice: &Image) -> Result<usize> {
        self.check_slice_buffer(&slice.buffer, 1)?;
        let time = slice.geometry.initial_time();
        let origin = slice.geometry.origin();
        let k = if self.geometry.has_time(time) {
            let index = self.geometry.get_slice_index(origin, time);
            self.geometry.append_origin(origin, index, time)?
        } else {
            self.geometry.append_frame(origin, time)?;
            0
        };
        let global = self.geometry.current_number_of_slices_before_time(time) + k;
        self.insert_slice(global, &slice.buffer, slice.rsi(0), slice.meta.sop_instance_uids.first())
    }

    /// Add a time point made of one slice.
    pub fn append_frame_buffer(
        &mut self,
        buffer: &PixelBuffer,
        origin: Point3D,
        time: u32,
        rsi: RescaleSlopeAndIntercept,
    ) -> Result<usize> {
        self.check_slice_buffer(buffer, 1)?;
        self.geometry.append_frame(origin, time)?;
        let global = self.geometry.current_number_of_slices_before_time(time);
        self.insert_slice(global, buffer, rsi, None)
    }

    fn insert_slice(
        &mut self,
        global: usize,
        buffer: &PixelBuffer,
        rsi: RescaleSlopeAndIntercept,
        uid: Option<&String>,
    ) -> Result<usize> {
        self.buffer.insert_from(global * self.slice_len(), buffer)?;
        let at = global.min(self.rsis.len());
        self.rsis.insert(at, rsi);
        if let Some(uid) = uid {
            let at = global.min(self.meta.sop_instance_uids.len());
            self.meta.sop_instance_uids.insert(at, uid.clone());
        }
        Ok(global)
    }

    /// The buffer offsets of the first time point.
    fn first_frame(&self) -> std::ops::Range<usize> {
        let slices = self.geometry.number_of_slices(self.geometry.initial_time());
        let start = self.geometry.current_number_of_slices_before_time(self.geometry.initial_time())
            * self.slice_len();
        start..start + slices * self.slice_len()
    }

    /// The range of stored values over the first time point.
    pub fn data_range(&self) -> Option<DataRange> {
        self.buffer
            .min_max(self.first_frame())
            .map(|(min, max)| DataRange { min, max })
    }

    /// The range of rescaled values over the first time point.
    pub fn rescaled_data_range(&self) -> Option<DataRange> {
        let frame = self.first_frame();
        let slice_len = self.slice_len().max(1);
        let mut range: Option<DataRange> = None;
        for start in frame.clone().step_by(slice_len) {
            let Some((lo, hi)) = self.buffer.min_max(start..(start + slice_len).min(frame.end)) else {
                continue;
            };
            let rsi = self.rsi(start / slice_len);
            let (a, b) = (rsi.apply(lo), rsi.apply(hi));
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            range = Some(match range {
                None => DataRange { min: lo, max: hi },
                Some(r) => DataRange {
                    min: r.min.min(lo),
                    max: r.max.max(hi),
                },
            });
        }
        range
    }

    /// Histogram of the rescaled values of the first time point.
    pub fn histogram(&self, bins: usize) -> Option<Histogram> {
        let range = self.rescaled_data_range()?;
        let bins = bins.max(1);
        let mut counts = vec![0_u64; bins];
        let width = (range.max - range.min) / bins as f64;
        for offset in self.first_frame() {
            let value = self.rescaled_value_at_offset(offset);
            let bin = if width > 0. {
                (((value - range.min) / width) as usize).min(bins - 1)
            } else {
                0
            };
            counts[bin] += 1;
        }
        Some(Histogram {
            range,
            bins: counts,
        })
    }

    /// Whether window level applies: monochrome images, except segmentations.
    pub fn can_window_level(&self) -> bool {
        self.photometric_interpretation.starts_with("MONOCHROME")
            && self.number_of_components == 1
            && self.meta.modality.as_deref() != Some("SEG")
    }

    /// Whether there is more than one position along a dimension.
    pub fn can_scroll(&self, dimension: usize) -> bool {
        if dimension == 3 {
            self.number_of_frames() > 1
        } else {
            self.geometry.size().can_scroll(dimension)
        }
    }
}
