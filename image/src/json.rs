//! Simplified JSON input.
//!
//! A JSON object maps attribute keywords (such as `"Rows"`)
//! or 8 digit hexadecimal tags (such as `"00280010"`) to plain values:
//!
//! ```
//! # use dwv_image::json::image_from_json;
//! let image = image_from_json(&serde_json::json!({
//!     "Rows": 2,
//!     "Columns": 2,
//!     "BitsAllocated": 8,
//!     "PixelRepresentation": 0,
//!     "PixelData": [0, 64, 128, 255],
//! }))?;
//! assert_eq!(image.geometry().size().values(), &[2, 2, 1]);
//! # Ok::<(), dwv_image::Error>(())
//! ```
//!
//! Value representations come from the standard dictionary.
//! Arrays of objects become sequences,
//! and `PixelData` is typed after `BitsAllocated` and `PixelRepresentation`.
use crate::error::{InvalidJsonSnafu, Result, UnknownTagNameSnafu};
use crate::factory::ImageFactory;
use crate::image::Image;
use crate::view::View;
use dwv_core::value::{DataSetSequence, PrimitiveValue, C};
use dwv_core::{DataDictionary, DataDictionaryEntry, DataElement, DataSet, Tag, VR};
use dwv_dictionary_std::{tags, StandardDataDictionary};
use serde_json::{Map, Number, Value as Json};
use snafu::OptionExt;
use std::sync::Arc;

/// Build a data set from a simplified JSON object.
pub fn data_set_from_json(json: &Json) -> Result<DataSet> {
    let object = json.as_object().context(InvalidJsonSnafu {
        name: "<root>",
        reason: "expected an object",
    })?;
    from_object(object)
}

/// Build an image from a simplified JSON object.
pub fn image_from_json(json: &Json) -> Result<Image> {
    let dataset = data_set_from_json(json)?;
    ImageFactory::new().create(&dataset)
}

/// Build a view of an image described by a simplified JSON object.
pub fn view_from_json(json: &Json) -> Result<View> {
    image_from_json(json).map(|image| View::new(Arc::new(image)))
}

fn from_object(object: &Map<String, Json>) -> Result<DataSet> {
    let mut dataset = DataSet::new();
    let mut pixel_data = None;
    for (key, value) in object {
        let (tag, vr) = resolve(key, value)?;
        if tag == tags::PIXEL_DATA {
            // needs the sample format, which may come later
            pixel_data = Some(value);
            continue;
        }
        dataset.put(element(key, tag, vr, value)?);
    }
    if let Some(value) = pixel_data {
        let (vr, samples) = pixel_values(&dataset, value)?;
        dataset.put(DataElement::new(tags::PIXEL_DATA, vr, samples));
    }
    Ok(dataset)
}

/// The tag and value representation of a key.
fn resolve(key: &str, value: &Json) -> Result<(Tag, VR)> {
    let dict = StandardDataDictionary;
    if let Some(entry) = dict.by_name(key) {
        return Ok((entry.tag(), entry.vr()));
    }
    let tag = Tag::from_key(key).context(UnknownTagNameSnafu { name: key })?;
    let vr = match dict.by_tag(tag) {
        Some(entry) => entry.vr(),
        None => guess_vr(value),
    };
    Ok((tag, vr))
}

/// The representation of attributes outside of the dictionary.
fn guess_vr(value: &Json) -> VR {
    let first = match value {
        Json::Array(values) => values.first(),
        other => Some(other),
    };
    match first {
        Some(Json::Object(_)) => VR::SQ,
        Some(Json::Number(n)) if n.is_f64() => VR::FD,
        Some(Json::Number(_)) => VR::SL,
        _ => VR::LO,
    }
}

fn element(key: &str, tag: Tag, vr: VR, value: &Json) -> Result<DataElement> {
    if vr == VR::SQ {
        let items = match value {
            Json::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_object()
                        .context(InvalidJsonSnafu {
                            name: key,
                            reason: "sequence items must be objects",
                        })
                        .and_then(from_object)
                })
                .collect::<Result<Vec<_>>>()?,
            Json::Null => Vec::new(),
            _ => {
                return InvalidJsonSnafu {
                    name: key,
                    reason: "expected an array of objects",
                }
                .fail()
            }
        };
        return Ok(DataElement::new(tag, vr, DataSetSequence::undefined(items)));
    }

    let values: Vec<&Json> = match value {
        Json::Array(values) => values.iter().collect(),
        Json::Null => Vec::new(),
        other => vec![other],
    };
    Ok(DataElement::new(tag, vr, primitive(key, vr, &values)?))
}

fn primitive(key: &str, vr: VR, values: &[&Json]) -> Result<PrimitiveValue> {
    if values.is_empty() {
        return Ok(PrimitiveValue::Empty);
    }
    Ok(match vr {
        VR::US | VR::OW => PrimitiveValue::U16(numbers(key, values)?),
        VR::SS => PrimitiveValue::I16(numbers(key, values)?),
        VR::UL | VR::OL => PrimitiveValue::U32(numbers(key, values)?),
        VR::SL => PrimitiveValue::I32(numbers(key, values)?),
        VR::UV | VR::OV => PrimitiveValue::U64(numbers(key, values)?),
        VR::SV => PrimitiveValue::I64(numbers(key, values)?),
        VR::FL | VR::OF => PrimitiveValue::F32(numbers(key, values)?),
        VR::FD | VR::OD => PrimitiveValue::F64(numbers(key, values)?),
        VR::OB | VR::UN => PrimitiveValue::U8(numbers(key, values)?),
        VR::AT => PrimitiveValue::Tags(
            values
                .iter()
                .map(|v| {
                    v.as_str().and_then(Tag::from_key).context(InvalidJsonSnafu {
                        name: key,
                        reason: "expected an 8 digit hexadecimal tag",
                    })
                })
                .collect::<Result<_>>()?,
        ),
        VR::LT | VR::ST | VR::UT | VR::UR => {
            let text = strings(key, values)?;
            PrimitiveValue::Str(text.join("\\"))
        }
        _ => PrimitiveValue::Strs(C::from_vec(strings(key, values)?)),
    })
}

/// Text of every value: strings as they are, numbers as written.
fn strings(key: &str, values: &[&Json]) -> Result<Vec<String>> {
    values
        .iter()
        .map(|v| match v {
            Json::String(s) => Ok(s.clone()),
            Json::Number(n) => Ok(n.to_string()),
            _ => InvalidJsonSnafu {
                name: key,
                reason: "expected strings or numbers",
            }
            .fail(),
        })
        .collect()
}

/// Values of a numeric representation, from numbers or numeric strings.
fn numbers<T>(key: &str, values: &[&Json]) -> Result<C<T>>
where
    T: num_traits::NumCast,
{
    values
        .iter()
        .map(|v| {
            let n = match v {
                Json::Number(n) => as_f64(n),
                Json::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            n.and_then(T::from).context(InvalidJsonSnafu {
                name: key,
                reason: "expected numbers in range",
            })
        })
        .collect()
}

fn as_f64(n: &Number) -> Option<f64> {
    n.as_i64()
        .map(|i| i as f64)
        .or_else(|| n.as_u64().map(|u| u as f64))
        .or_else(|| n.as_f64())
}

/// Pixel samples typed after the sample format of the data set.
fn pixel_values(dataset: &DataSet, value: &Json) -> Result<(VR, PrimitiveValue)> {
    const NAME: &str = "PixelData";
    let values: Vec<&Json> = match value {
        Json::Array(values) => values.iter().collect(),
        _ => {
            return InvalidJsonSnafu {
                name: NAME,
                reason: "expected an array of numbers",
            }
            .fail()
        }
    };
    let bits_allocated = crate::attribute::bits_allocated(dataset)?;
    let signed = crate::attribute::pixel_representation(dataset)? == 1;
    let samples = match (bits_allocated, signed) {
        (1 | 8, false) => (VR::OB, PrimitiveValue::U8(numbers(NAME, &values)?)),
        (8, true) => {
            let samples: C<i8> = numbers(NAME, &values)?;
            let bytes = samples.iter().map(|s| s.to_le_bytes()[0]).collect();
            (VR::OB, PrimitiveValue::U8(bytes))
        }
        (16, false) => (VR::OW, PrimitiveValue::U16(numbers(NAME, &values)?)),
        (16, true) => (VR::OW, PrimitiveValue::I16(numbers(NAME, &values)?)),
        (32, false) => (VR::OL, PrimitiveValue::U32(numbers(NAME, &values)?)),
        (32, true) => (VR::OL, PrimitiveValue::I32(numbers(NAME, &values)?)),
        _ => {
            return InvalidJsonSnafu {
                name: NAME,
                reason: "unsupported BitsAllocated",
            }
            .fail()
        }
    };
    Ok(samples)
}
