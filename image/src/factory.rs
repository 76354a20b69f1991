//! Construction of images from decoded data sets.
use crate::attribute::{self, find_in_group, per_frame_groups};
use crate::buffer::{PixelBuffer, SampleFormat};
use crate::error::{
    BufferSizeMismatchSnafu, DecodeFrameSnafu, MissingElementSnafu, MissingFrameDecoderSnafu,
    Result,
};
use crate::geometry::{Geometry, Size, Spacing};
use crate::image::{Image, ImageMeta, WindowPreset};
use crate::math::{Matrix33, Point3D};
use crate::transform::{RescaleSlopeAndIntercept, WindowCenterAndWidth};
use dwv_core::value::Value;
use dwv_core::{DataElement, DataSet};
use dwv_dictionary_std::tags;
use dwv_parser::{frame_data, ParsedFile};
use snafu::{ensure, OptionExt, ResultExt};
use std::fmt;
use tracing::{debug, warn};

/// What a frame decoder needs to know about the frame it decodes.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    pub rows: u16,
    pub columns: u16,
    pub samples_per_pixel: u16,
    pub format: SampleFormat,
    pub photometric_interpretation: String,
    pub transfer_syntax: String,
}

impl FrameInfo {
    /// The number of samples of one decoded frame.
    pub fn frame_len(&self) -> usize {
        usize::from(self.rows) * usize::from(self.columns) * usize::from(self.samples_per_pixel)
    }
}

/// A decoder of compressed frames (JPEG, JPEG-LS, JPEG 2000, RLE...).
///
/// Decoded frames must hold [`FrameInfo::frame_len`] samples,
/// interleaved by pixel for colour images.
pub trait FrameDecoder {
    fn decode(
        &self,
        frame: &[u8],
        info: &FrameInfo,
    ) -> std::result::Result<PixelBuffer, Box<dyn std::error::Error + Send + Sync + 'static>>;
}

/// Builds [`Image`]s out of decoded data sets.
#[derive(Default)]
pub struct ImageFactory {
    decoder: Option<Box<dyn FrameDecoder + Send + Sync>>,
}

impl fmt::Debug for ImageFactory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ImageFactory")
            .field("decoder", &self.decoder.as_ref().map(|_| ".."))
            .finish()
    }
}

impl ImageFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a decoder for encapsulated pixel data.
    pub fn with_decoder(mut self, decoder: impl FrameDecoder + Send + Sync + 'static) -> Self {
        self.decoder = Some(Box::new(decoder));
        self
    }

    /// Create an image from a parsed file.
    pub fn create_from_file(&self, file: &ParsedFile) -> Result<Image> {
        self.build(&file.dataset, Some(file.transfer_syntax.uid()))
    }

    /// Create an image from a data set with native pixel data.
    pub fn create(&self, dataset: &DataSet) -> Result<Image> {
        self.build(dataset, None)
    }

    fn build(&self, obj: &DataSet, transfer_syntax: Option<&str>) -> Result<Image> {
        let rows = attribute::rows(obj)?;
        let columns = attribute::cols(obj)?;
        let frames = attribute::number_of_frames(obj)?;
        let samples_per_pixel = attribute::samples_per_pixel(obj)?;
        let format = SampleFormat {
            bits_allocated: attribute::bits_allocated(obj)?,
            bits_stored: attribute::bits_stored(obj)?,
            pixel_representation: attribute::pixel_representation(obj)?,
        };
        let mut photometric = attribute::photometric_interpretation(obj)?;
        let mut planar_configuration = attribute::planar_configuration(obj);
        debug!(
            "Creating {}x{} image of {} frame(s), {} bits allocated, {}",
            columns, rows, frames, format.bits_allocated, photometric
        );

        let info = FrameInfo {
            rows,
            columns,
            samples_per_pixel,
            format,
            photometric_interpretation: photometric.clone(),
            transfer_syntax: transfer_syntax.unwrap_or_default().to_string(),
        };
        let frame_len = info.frame_len();
        let expected = frame_len * frames as usize;
        let buffer = self.pixel_buffer(obj, &info, frames)?;
        ensure!(
            buffer.len() >= expected,
            BufferSizeMismatchSnafu {
                expected,
                actual: buffer.len()
            }
        );
        if buffer.len() > expected {
            debug!("Ignoring {} trailing samples", buffer.len() - expected);
        }
        let mut buffer = buffer.truncated(expected)?;

        if samples_per_pixel == 3 && photometric == "YBR_FULL" {
            if let PixelBuffer::U8(samples) = &mut buffer {
                ybr_full_to_rgb(samples, frame_len, planar_configuration);
                photometric = "RGB".to_string();
                planar_configuration = 0;
            } else {
                warn!("YBR_FULL data with more than 8 bits is kept as is");
            }
        }

        let (row_spacing, column_spacing) = attribute::pixel_spacing(obj)?;
        let slice_spacing = attribute::slice_spacing(obj)?.unwrap_or(1.);
        let spacing = Spacing::new(vec![column_spacing, row_spacing, slice_spacing]);
        let orientation = attribute::image_orientation(obj)?
            .map(|(row, column)| Matrix33::from_cosines(row, column))
            .unwrap_or_default();
        let origin = attribute::image_position(obj)?.unwrap_or_default();
        let size = Size::new(vec![usize::from(columns), usize::from(rows), 1]);
        let (slope, intercept) = attribute::rescale(obj)?;
        let rsi = RescaleSlopeAndIntercept::new(slope, intercept);
        let uid = attribute::sop_instance_uid(obj)?.unwrap_or_default();

        let per_frame = per_frame_groups(obj);
        let frame_positions = frame_positions(per_frame, frames)?;
        let first_origin = frame_positions
            .as_ref()
            .and_then(|p| p.first().copied())
            .unwrap_or(origin);
        let mut geometry = Geometry::new(first_origin, size, spacing, orientation, 0);

        // frame number of each slice, in slice order
        let mut order: Vec<usize> = vec![0];
        let mut rsis = vec![frame_rsi(per_frame.first(), rsi)?];
        match &frame_positions {
            Some(positions) => {
                // one volume, each frame a slice
                for (frame, position) in positions.iter().enumerate().skip(1) {
                    let index = geometry.get_slice_index(*position, 0);
                    let k = geometry.append_origin(*position, index, 0)?;
                    order.insert(k, frame);
                    rsis.insert(k, frame_rsi(per_frame.get(frame), rsi)?);
                }
                if order.iter().enumerate().any(|(i, f)| i != *f) {
                    buffer = reorder_frames(&buffer, &order, frame_len)?;
                }
            }
            None => {
                // each frame a time point
                for frame in 1..frames as usize {
                    geometry.append_frame(origin, frame as u32)?;
                    order.push(frame);
                    rsis.push(frame_rsi(per_frame.get(frame), rsi)?);
                }
            }
        }

        let meta = ImageMeta {
            modality: attribute::modality(obj)?,
            bits_stored: format.bits_stored,
            bits_allocated: format.bits_allocated,
            pixel_representation: format.pixel_representation,
            window_presets: window_presets(obj)?,
            sop_instance_uids: vec![uid; order.len()],
        };

        let mut image = Image::new(geometry, buffer, usize::from(samples_per_pixel))?
            .with_photometric_interpretation(photometric)
            .with_planar_configuration(planar_configuration)
            .with_meta(meta);
        for (slice, rsi) in rsis.into_iter().enumerate() {
            image.set_rsi(slice, rsi)?;
        }
        Ok(image)
    }

    fn pixel_buffer(&self, obj: &DataSet, info: &FrameInfo, frames: u32) -> Result<PixelBuffer> {
        let element = pixel_element(obj).context(MissingElementSnafu { name: "PixelData" })?;
        match element.value() {
            Value::Primitive(value) => PixelBuffer::from_primitive(value, info.format),
            Value::PixelSequence(sequence) => {
                let decoder = self.decoder.as_ref().context(MissingFrameDecoderSnafu {
                    uid: info.transfer_syntax.as_str(),
                })?;
                let mut buffer = PixelBuffer::empty(info.format)?;
                for (frame, data) in frame_data(sequence, frames).into_iter().enumerate() {
                    let decoded = decoder
                        .decode(&data, info)
                        .context(DecodeFrameSnafu { frame })?;
                    if frame == 0 {
                        buffer = decoded;
                    } else {
                        buffer.extend_from(&decoded)?;
                    }
                }
                Ok(buffer)
            }
            Value::Sequence(_) => MissingElementSnafu { name: "PixelData" }.fail(),
        }
    }
}

fn pixel_element(obj: &DataSet) -> Option<&DataElement> {
    obj.element(tags::PIXEL_DATA)
        .or_else(|| obj.element(tags::FLOAT_PIXEL_DATA))
        .or_else(|| obj.element(tags::DOUBLE_FLOAT_PIXEL_DATA))
}

/// The positions of the frames when each frame is a slice of a volume.
fn frame_positions(per_frame: &[DataSet], frames: u32) -> Result<Option<Vec<Point3D>>> {
    if frames < 2 || per_frame.len() != frames as usize {
        return Ok(None);
    }
    let mut positions = Vec::with_capacity(per_frame.len());
    for group in per_frame {
        let Some(element) = find_in_group(group, tags::IMAGE_POSITION_PATIENT) else {
            return Ok(None);
        };
        let mut item = DataSet::new();
        item.put(element.clone());
        match attribute::image_position(&item)? {
            Some(p) => positions.push(p),
            None => return Ok(None),
        }
    }
    // frames sharing a position are time points
    let distinct = positions.iter().enumerate().all(|(i, p)| {
        positions[i + 1..]
            .iter()
            .all(|q| !p.is_similar(*q, crate::math::EPSILON))
    });
    Ok(distinct.then_some(positions))
}

fn frame_rsi(group: Option<&DataSet>, default: RescaleSlopeAndIntercept) -> Result<RescaleSlopeAndIntercept> {
    let Some(group) = group else {
        return Ok(default);
    };
    let mut item = DataSet::new();
    for tag in [tags::RESCALE_SLOPE, tags::RESCALE_INTERCEPT] {
        if let Some(e) = find_in_group(group, tag) {
            item.put(e.clone());
        }
    }
    if item.is_empty() {
        return Ok(default);
    }
    let (slope, intercept) = attribute::rescale(&item)?;
    Ok(RescaleSlopeAndIntercept::new(slope, intercept))
}

fn window_presets(obj: &DataSet) -> Result<Vec<WindowPreset>> {
    Ok(attribute::window_levels(obj)?
        .into_iter()
        .enumerate()
        .map(|(j, (center, width, name))| WindowPreset {
            name: name.unwrap_or_else(|| format!("Default{}", j)),
            wl: WindowCenterAndWidth::new(center, width),
        })
        .collect())
}

fn reorder_frames(buffer: &PixelBuffer, order: &[usize], frame_len: usize) -> Result<PixelBuffer> {
    let mut out = buffer.clone();
    for (slice, &frame) in order.iter().enumerate() {
        for i in 0..frame_len {
            out.set(slice * frame_len + i, buffer.get(frame * frame_len + i))?;
        }
    }
    Ok(out)
}

/// Convert full range YCbCr samples to RGB in place.
fn ybr_full_to_rgb(samples: &mut [u8], frame_len: usize, planar_configuration: u16) {
    let convert = |y: u8, cb: u8, cr: u8| {
        let (y, cb, cr) = (f64::from(y), f64::from(cb) - 128., f64::from(cr) - 128.);
        let clamp = |v: f64| v.round().clamp(0., 255.) as u8;
        [
            clamp(y + 1.402 * cr),
            clamp(y - 0.344136 * cb - 0.714136 * cr),
            clamp(y + 1.772 * cb),
        ]
    };
    if planar_configuration == 1 {
        let plane = frame_len / 3;
        for frame in samples.chunks_exact_mut(frame_len.max(1)) {
            let mut rgb = Vec::with_capacity(frame_len);
            for i in 0..plane {
                rgb.extend(convert(frame[i], frame[plane + i], frame[2 * plane + i]));
            }
            frame.copy_from_slice(&rgb);
        }
    } else {
        for pixel in samples.chunks_exact_mut(3) {
            let rgb = convert(pixel[0], pixel[1], pixel[2]);
            pixel.copy_from_slice(&rgb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Index;
    use dwv_core::value::{DataSetSequence, PixelFragmentSequence};
    use dwv_core::{PrimitiveValue, Tag, VR};

    fn element(tag: Tag, vr: VR, value: impl Into<PrimitiveValue>) -> DataElement {
        DataElement::new(tag, vr, value.into())
    }

    fn strs(values: &[&str]) -> PrimitiveValue {
        PrimitiveValue::from(values.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    fn base(rows: u16, columns: u16) -> DataSet {
        let mut obj = DataSet::new();
        obj.put(element(tags::ROWS, VR::US, rows));
        obj.put(element(tags::COLUMNS, VR::US, columns));
        obj.put(element(tags::BITS_ALLOCATED, VR::US, 8_u16));
        obj.put(element(tags::BITS_STORED, VR::US, 8_u16));
        obj.put(element(tags::PIXEL_REPRESENTATION, VR::US, 0_u16));
        obj
    }

    #[test]
    fn single_frame() {
        let mut obj = base(2, 3);
        obj.put(element(tags::PIXEL_SPACING, VR::DS, strs(&["0.5", "0.25"])));
        obj.put(element(tags::IMAGE_POSITION_PATIENT, VR::DS, strs(&["1", "2", "3"])));
        obj.put(element(tags::RESCALE_SLOPE, VR::DS, "2"));
        obj.put(element(tags::RESCALE_INTERCEPT, VR::DS, "-10"));
        obj.put(element(tags::PIXEL_DATA, VR::OB, vec![0_u8, 1, 2, 3, 4, 5]));
        let image = ImageFactory::new().create(&obj).unwrap();
        assert_eq!(image.geometry().size().values(), &[3, 2, 1]);
        assert_eq!(image.geometry().spacing().values(), &[0.25, 0.5, 1.]);
        assert_eq!(image.geometry().origin(), Point3D::new(1., 2., 3.));
        assert_eq!(image.value_at_index(&Index::new(vec![2, 1, 0])), 5.);
        assert_eq!(image.rescaled_value_at_offset(5), 0.);
        assert_eq!(image.photometric_interpretation(), "MONOCHROME2");
    }

    #[test]
    fn frames_become_time_points() {
        let mut obj = base(1, 2);
        obj.put(element(tags::NUMBER_OF_FRAMES, VR::IS, "3"));
        obj.put(element(tags::PIXEL_DATA, VR::OB, vec![1_u8, 1, 2, 2, 3, 3]));
        let image = ImageFactory::new().create(&obj).unwrap();
        assert_eq!(image.number_of_frames(), 3);
        assert_eq!(image.geometry().current_total_number_of_slices(), 3);
        assert_eq!(image.value_at_index(&Index::new(vec![0, 0, 0, 2])), 3.);
    }

    fn put_frame_positions(obj: &mut DataSet, z: &[&str]) {
        obj.put(element(tags::NUMBER_OF_FRAMES, VR::IS, z.len().to_string()));
        let groups: Vec<DataSet> = z
            .iter()
            .map(|&z| {
                let mut position = DataSet::new();
                position.put(element(tags::IMAGE_POSITION_PATIENT, VR::DS, strs(&["0", "0", z])));
                let mut group = DataSet::new();
                group.put(DataElement::new(
                    tags::PLANE_POSITION_SEQUENCE,
                    VR::SQ,
                    DataSetSequence::undefined(vec![position]),
                ));
                group
            })
            .collect();
        obj.put(DataElement::new(
            tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
            VR::SQ,
            DataSetSequence::undefined(groups),
        ));
    }

    #[test]
    fn per_frame_positions_make_slices() {
        let mut obj = base(1, 1);
        put_frame_positions(&mut obj, &["0", "10", "5"]);
        obj.put(element(tags::PIXEL_DATA, VR::OB, vec![0_u8, 10, 5]));
        let image = ImageFactory::new().create(&obj).unwrap();
        assert_eq!(image.number_of_frames(), 1);
        assert_eq!(image.geometry().size().dim_size(2), 3);
        // slices go down the normal
        assert_eq!(image.buffer(), &PixelBuffer::U8(vec![10, 5, 0]));
    }

    #[test]
    fn repeated_frame_position_makes_time_points() {
        let mut obj = base(1, 1);
        put_frame_positions(&mut obj, &["0", "10", "10"]);
        obj.put(element(tags::PIXEL_DATA, VR::OB, vec![0_u8, 10, 11]));
        let image = ImageFactory::new().create(&obj).unwrap();
        assert_eq!(image.number_of_frames(), 3);
        assert_eq!(image.geometry().size().dim_size(2), 1);
        assert_eq!(image.buffer(), &PixelBuffer::U8(vec![0, 10, 11]));
    }

    #[test]
    fn truncated_pixel_data() {
        let mut obj = base(2, 2);
        obj.put(element(tags::PIXEL_DATA, VR::OB, vec![0_u8, 1, 2]));
        assert!(matches!(
            ImageFactory::new().create(&obj),
            Err(crate::Error::BufferSizeMismatch { expected: 4, actual: 3, .. })
        ));
    }

    struct Raw;

    impl FrameDecoder for Raw {
        fn decode(
            &self,
            frame: &[u8],
            info: &FrameInfo,
        ) -> std::result::Result<PixelBuffer, Box<dyn std::error::Error + Send + Sync + 'static>> {
            Ok(PixelBuffer::from_bytes(frame, info.format)?)
        }
    }

    #[test]
    fn encapsulated_needs_decoder() {
        let mut obj = base(1, 2);
        obj.put(element(tags::NUMBER_OF_FRAMES, VR::IS, "2"));
        obj.put(DataElement::new(
            tags::PIXEL_DATA,
            VR::OB,
            PixelFragmentSequence::new(Vec::<u32>::new(), vec![vec![1, 2], vec![3, 4]]),
        ));
        assert!(matches!(
            ImageFactory::new().create(&obj),
            Err(crate::Error::MissingFrameDecoder { .. })
        ));
        let image = ImageFactory::new().with_decoder(Raw).create(&obj).unwrap();
        assert_eq!(image.buffer(), &PixelBuffer::U8(vec![1, 2, 3, 4]));
    }

    #[test]
    fn ybr_full_is_converted() {
        let mut samples = vec![128, 128, 128, 255, 128, 128];
        ybr_full_to_rgb(&mut samples, 6, 0);
        assert_eq!(samples, vec![128, 128, 128, 255, 255, 255]);
    }
}
