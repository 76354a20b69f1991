//! Utility module for fetching key attributes from a decoded data set.
//!
//! Attributes of enhanced multi-frame objects may live in the
//! Shared Functional Groups Sequence instead of the top level data set;
//! the `find` helpers look there too.

use crate::error::{ConvertValueSnafu, InvalidValueSnafu, MissingElementSnafu, Result};
use crate::math::{Point3D, Vector3D};
use dwv_core::{DataElement, DataSet, Tag};
use dwv_dictionary_std::tags;
use snafu::{ensure, OptionExt, ResultExt};

/// Functional group sequences and the attributes they carry.
const FUNCTIONAL_GROUPS: &[(Tag, &[Tag])] = &[
    (
        tags::PIXEL_MEASURES_SEQUENCE,
        &[tags::PIXEL_SPACING, tags::SLICE_THICKNESS, tags::SPACING_BETWEEN_SLICES],
    ),
    (tags::PLANE_ORIENTATION_SEQUENCE, &[tags::IMAGE_ORIENTATION_PATIENT]),
    (tags::PLANE_POSITION_SEQUENCE, &[tags::IMAGE_POSITION_PATIENT]),
    (
        tags::PIXEL_VALUE_TRANSFORMATION_SEQUENCE,
        &[tags::RESCALE_SLOPE, tags::RESCALE_INTERCEPT, tags::RESCALE_TYPE],
    ),
    (
        tags::FRAME_VOILUT_SEQUENCE,
        &[
            tags::WINDOW_CENTER,
            tags::WINDOW_WIDTH,
            tags::WINDOW_CENTER_WIDTH_EXPLANATION,
        ],
    ),
];

/// Look for an attribute inside one functional group item.
pub fn find_in_group(group: &DataSet, tag: Tag) -> Option<&DataElement> {
    FUNCTIONAL_GROUPS
        .iter()
        .filter(|(_, carried)| carried.contains(&tag))
        .filter_map(|(sequence, _)| group.element(*sequence))
        .filter_map(|e| e.items()?.first())
        .find_map(|item| item.element(tag))
}

/// Look for an attribute at the top level of the data set,
/// then in the shared functional groups.
pub fn find(obj: &DataSet, tag: Tag) -> Option<&DataElement> {
    obj.element(tag)
        .filter(|e| !e.primitive().map_or(false, |v| v.is_empty()))
        .or_else(|| {
            let shared = obj
                .element(tags::SHARED_FUNCTIONAL_GROUPS_SEQUENCE)?
                .items()?
                .first()?;
            find_in_group(shared, tag)
        })
}

/// The items of the Per-Frame Functional Groups Sequence, if any.
pub fn per_frame_groups(obj: &DataSet) -> &[DataSet] {
    obj.element(tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE)
        .and_then(|e| e.items())
        .unwrap_or(&[])
}

fn retrieve_required_u16(obj: &DataSet, tag: Tag, name: &'static str) -> Result<u16> {
    find(obj, tag)
        .context(MissingElementSnafu { name })?
        .to_int()
        .context(ConvertValueSnafu { name })
}

fn retrieve_optional_u16(obj: &DataSet, tag: Tag, name: &'static str) -> Result<Option<u16>> {
    find(obj, tag)
        .map(|e| e.to_int().context(ConvertValueSnafu { name }))
        .transpose()
}

fn retrieve_optional_string(obj: &DataSet, tag: Tag, name: &'static str) -> Result<Option<String>> {
    find(obj, tag)
        .map(|e| {
            e.to_str()
                .map(|s| s.trim().to_string())
                .context(ConvertValueSnafu { name })
        })
        .transpose()
}

fn retrieve_optional_floats(
    element: Option<&DataElement>,
    name: &'static str,
) -> Result<Option<Vec<f64>>> {
    element
        .map(|e| e.to_multi_float64().context(ConvertValueSnafu { name }))
        .transpose()
}

/// Get the Rows from the data set
pub fn rows(obj: &DataSet) -> Result<u16> {
    retrieve_required_u16(obj, tags::ROWS, "Rows")
}

/// Get the Columns from the data set
pub fn cols(obj: &DataSet) -> Result<u16> {
    retrieve_required_u16(obj, tags::COLUMNS, "Columns")
}

/// Get the SamplesPerPixel from the data set, 1 by default
pub fn samples_per_pixel(obj: &DataSet) -> Result<u16> {
    Ok(retrieve_optional_u16(obj, tags::SAMPLES_PER_PIXEL, "SamplesPerPixel")?.unwrap_or(1))
}

/// Get the BitsAllocated from the data set
pub fn bits_allocated(obj: &DataSet) -> Result<u16> {
    retrieve_required_u16(obj, tags::BITS_ALLOCATED, "BitsAllocated")
}

/// Get the BitsStored from the data set, BitsAllocated by default
pub fn bits_stored(obj: &DataSet) -> Result<u16> {
    match retrieve_optional_u16(obj, tags::BITS_STORED, "BitsStored")? {
        Some(v) => Ok(v),
        None => bits_allocated(obj),
    }
}

/// Get the PixelRepresentation from the data set, 0 by default
pub fn pixel_representation(obj: &DataSet) -> Result<u16> {
    let value = retrieve_optional_u16(obj, tags::PIXEL_REPRESENTATION, "PixelRepresentation")?
        .unwrap_or(0);
    ensure!(
        value <= 1,
        InvalidValueSnafu {
            name: "PixelRepresentation",
            value: value.to_string(),
        }
    );
    Ok(value)
}

/// Get the PlanarConfiguration from the data set, returning 0 by default
pub fn planar_configuration(obj: &DataSet) -> u16 {
    find(obj, tags::PLANAR_CONFIGURATION)
        .map_or(Ok(0), |e| e.to_int())
        .unwrap_or(0)
}

/// Get the PhotometricInterpretation from the data set,
/// MONOCHROME2 by default
pub fn photometric_interpretation(obj: &DataSet) -> Result<String> {
    Ok(
        retrieve_optional_string(obj, tags::PHOTOMETRIC_INTERPRETATION, "PhotometricInterpretation")?
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "MONOCHROME2".to_string()),
    )
}

/// Get the NumberOfFrames from the data set, 1 by default
pub fn number_of_frames(obj: &DataSet) -> Result<u32> {
    let frames = match find(obj, tags::NUMBER_OF_FRAMES) {
        Some(e) => e
            .to_int::<i64>()
            .context(ConvertValueSnafu {
                name: "NumberOfFrames",
            })?,
        None => 1,
    };
    ensure!(
        frames >= 0 && frames <= i64::from(u32::MAX),
        InvalidValueSnafu {
            name: "NumberOfFrames",
            value: frames.to_string(),
        }
    );
    Ok((frames as u32).max(1))
}

/// Get the Modality from the data set
pub fn modality(obj: &DataSet) -> Result<Option<String>> {
    retrieve_optional_string(obj, tags::MODALITY, "Modality")
}

/// Get the SOPInstanceUID from the data set
pub fn sop_instance_uid(obj: &DataSet) -> Result<Option<String>> {
    retrieve_optional_string(obj, tags::SOP_INSTANCE_UID, "SOPInstanceUID")
}

/// Get the pixel spacing as (row spacing, column spacing),
/// from PixelSpacing, then ImagerPixelSpacing, 1 by default
pub fn pixel_spacing(obj: &DataSet) -> Result<(f64, f64)> {
    let element = find(obj, tags::PIXEL_SPACING).or_else(|| find(obj, tags::IMAGER_PIXEL_SPACING));
    match retrieve_optional_floats(element, "PixelSpacing")?.as_deref() {
        Some([row, column, ..]) if *row > 0. && *column > 0. => Ok((*row, *column)),
        Some([]) | None => Ok((1., 1.)),
        Some(other) => InvalidValueSnafu {
            name: "PixelSpacing",
            value: format!("{:?}", other),
        }
        .fail(),
    }
}

/// Get the distance between slices,
/// from SpacingBetweenSlices, then SliceThickness
pub fn slice_spacing(obj: &DataSet) -> Result<Option<f64>> {
    let element =
        find(obj, tags::SPACING_BETWEEN_SLICES).or_else(|| find(obj, tags::SLICE_THICKNESS));
    Ok(retrieve_optional_floats(element, "SpacingBetweenSlices")?
        .and_then(|v| v.first().copied())
        .filter(|v| *v > 0.))
}

/// Get the ImagePositionPatient of an item
pub fn image_position(obj: &DataSet) -> Result<Option<Point3D>> {
    retrieve_optional_floats(find(obj, tags::IMAGE_POSITION_PATIENT), "ImagePositionPatient")?
        .map(|v| {
            Point3D::from_slice(&v).context(InvalidValueSnafu {
                name: "ImagePositionPatient",
                value: format!("{:?}", v),
            })
        })
        .transpose()
}

/// Get the ImageOrientationPatient as row and column direction cosines
pub fn image_orientation(obj: &DataSet) -> Result<Option<(Vector3D, Vector3D)>> {
    retrieve_optional_floats(
        find(obj, tags::IMAGE_ORIENTATION_PATIENT),
        "ImageOrientationPatient",
    )?
    .map(|v| match v.as_slice() {
        [rx, ry, rz, cx, cy, cz] => Ok((Vector3D::new(*rx, *ry, *rz), Vector3D::new(*cx, *cy, *cz))),
        _ => InvalidValueSnafu {
            name: "ImageOrientationPatient",
            value: format!("{:?}", v),
        }
        .fail(),
    })
    .transpose()
}

/// Get the rescale slope and intercept, 1 and 0 by default
pub fn rescale(obj: &DataSet) -> Result<(f64, f64)> {
    let slope = retrieve_optional_floats(find(obj, tags::RESCALE_SLOPE), "RescaleSlope")?
        .and_then(|v| v.first().copied())
        .filter(|v| *v != 0.)
        .unwrap_or(1.);
    let intercept = retrieve_optional_floats(find(obj, tags::RESCALE_INTERCEPT), "RescaleIntercept")?
        .and_then(|v| v.first().copied())
        .unwrap_or(0.);
    Ok((slope, intercept))
}

/// Get the window levels as (center, width, explanation) triples
pub fn window_levels(obj: &DataSet) -> Result<Vec<(f64, f64, Option<String>)>> {
    let centers = retrieve_optional_floats(find(obj, tags::WINDOW_CENTER), "WindowCenter")?
        .unwrap_or_default();
    let widths = retrieve_optional_floats(find(obj, tags::WINDOW_WIDTH), "WindowWidth")?
        .unwrap_or_default();
    let explanations = find(obj, tags::WINDOW_CENTER_WIDTH_EXPLANATION)
        .and_then(|e| e.to_multi_str().ok())
        .map(|v| v.into_owned())
        .unwrap_or_default();
    Ok(centers
        .into_iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (center, width))| {
            let name = explanations
                .get(i)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            (center, width, name)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwv_core::value::DataSetSequence;
    use dwv_core::{PrimitiveValue, VR};

    fn element(tag: Tag, vr: VR, value: impl Into<PrimitiveValue>) -> DataElement {
        DataElement::new(tag, vr, value.into())
    }

    fn strs(values: &[&str]) -> PrimitiveValue {
        PrimitiveValue::from(values.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    fn dataset() -> DataSet {
        let mut obj = DataSet::new();
        obj.put(element(tags::ROWS, VR::US, 32_u16));
        obj.put(element(tags::COLUMNS, VR::US, 16_u16));
        obj.put(element(tags::BITS_ALLOCATED, VR::US, 16_u16));
        obj.put(element(tags::WINDOW_CENTER, VR::DS, strs(&["40", "400"])));
        obj.put(element(tags::WINDOW_WIDTH, VR::DS, strs(&["400", "2000"])));
        obj.put(element(
            tags::WINDOW_CENTER_WIDTH_EXPLANATION,
            VR::LO,
            strs(&["SOFT", ""]),
        ));
        obj
    }

    #[test]
    fn required_and_defaults() {
        let obj = dataset();
        assert_eq!(rows(&obj).unwrap(), 32);
        assert_eq!(cols(&obj).unwrap(), 16);
        assert_eq!(bits_stored(&obj).unwrap(), 16);
        assert_eq!(pixel_representation(&obj).unwrap(), 0);
        assert_eq!(photometric_interpretation(&obj).unwrap(), "MONOCHROME2");
        assert_eq!(number_of_frames(&obj).unwrap(), 1);
        assert_eq!(pixel_spacing(&obj).unwrap(), (1., 1.));
        assert_eq!(rescale(&obj).unwrap(), (1., 0.));
        assert!(matches!(
            samples_per_pixel(&DataSet::new()),
            Ok(1)
        ));
        assert!(rows(&DataSet::new()).is_err());
    }

    #[test]
    fn window_level_pairs() {
        let levels = window_levels(&dataset()).unwrap();
        assert_eq!(
            levels,
            vec![(40., 400., Some("SOFT".to_string())), (400., 2000., None)]
        );
    }

    #[test]
    fn shared_functional_groups() {
        let mut measures = DataSet::new();
        measures.put(element(tags::PIXEL_SPACING, VR::DS, strs(&["0.5", "0.25"])));
        let mut shared = DataSet::new();
        shared.put(DataElement::new(
            tags::PIXEL_MEASURES_SEQUENCE,
            VR::SQ,
            DataSetSequence::undefined(vec![measures]),
        ));
        let mut obj = dataset();
        obj.put(DataElement::new(
            tags::SHARED_FUNCTIONAL_GROUPS_SEQUENCE,
            VR::SQ,
            DataSetSequence::undefined(vec![shared]),
        ));
        assert_eq!(pixel_spacing(&obj).unwrap(), (0.5, 0.25));
    }

    #[test]
    fn bad_orientation() {
        let mut obj = dataset();
        obj.put(element(tags::IMAGE_ORIENTATION_PATIENT, VR::DS, strs(&["1", "0", "0"])));
        assert!(image_orientation(&obj).is_err());
    }
}
