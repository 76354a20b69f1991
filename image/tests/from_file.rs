//! Images built from encoded files, and views over them.
use dwv_core::value::PrimitiveValue;
use dwv_core::{DataElement, DataSet, Tag, VR};
use dwv_dictionary_std::{tags, uids};
use dwv_encoding::transfer_syntax;
use dwv_image::{ColourMap, ImageFactory, Index, Point3D, View, WindowCenterAndWidth};
use dwv_parser::{DicomParser, DicomWriter, FileMetaTable, ParsedFile};
use rstest::rstest;
use std::sync::Arc;

fn element(tag: Tag, vr: VR, value: impl Into<PrimitiveValue>) -> DataElement {
    DataElement::new(tag, vr, value.into())
}

fn strs(values: &[&str]) -> PrimitiveValue {
    PrimitiveValue::from(values.iter().map(|s| s.to_string()).collect::<Vec<_>>())
}

/// A 32x32 CT slice with 12 bit samples counting up from the first pixel.
fn ct_slice(uid: &str, z: &str) -> DataSet {
    let mut ds = DataSet::new();
    ds.put(element(tags::SOP_CLASS_UID, VR::UI, uids::CT_IMAGE_STORAGE));
    ds.put(element(tags::SOP_INSTANCE_UID, VR::UI, uid));
    ds.put(element(tags::MODALITY, VR::CS, "CT"));
    ds.put(element(tags::IMAGE_POSITION_PATIENT, VR::DS, strs(&["-16", "-16", z])));
    ds.put(element(
        tags::IMAGE_ORIENTATION_PATIENT,
        VR::DS,
        strs(&["1", "0", "0", "0", "1", "0"]),
    ));
    ds.put(element(tags::SAMPLES_PER_PIXEL, VR::US, 1_u16));
    ds.put(element(tags::PHOTOMETRIC_INTERPRETATION, VR::CS, "MONOCHROME2"));
    ds.put(element(tags::ROWS, VR::US, 32_u16));
    ds.put(element(tags::COLUMNS, VR::US, 32_u16));
    ds.put(element(tags::PIXEL_SPACING, VR::DS, strs(&["0.5", "0.5"])));
    ds.put(element(tags::BITS_ALLOCATED, VR::US, 16_u16));
    ds.put(element(tags::BITS_STORED, VR::US, 12_u16));
    ds.put(element(tags::HIGH_BIT, VR::US, 11_u16));
    ds.put(element(tags::PIXEL_REPRESENTATION, VR::US, 0_u16));
    ds.put(element(tags::WINDOW_CENTER, VR::DS, "40"));
    ds.put(element(tags::WINDOW_WIDTH, VR::DS, "400"));
    ds.put(element(tags::RESCALE_INTERCEPT, VR::DS, "-1024"));
    ds.put(element(tags::RESCALE_SLOPE, VR::DS, "1"));
    let pixels: Vec<u16> = (0..32 * 32).map(|i| (i * 3 % 4096) as u16).collect();
    ds.put(element(tags::PIXEL_DATA, VR::OW, pixels));
    ds
}

fn encode_and_parse(ds: &DataSet, ts: &str) -> ParsedFile {
    let meta = FileMetaTable::new(uids::CT_IMAGE_STORAGE, "1.2.3", ts);
    let bytes = DicomWriter::new()
        .write_parts(&meta, ds, transfer_syntax::get(ts).unwrap())
        .unwrap();
    DicomParser::new().parse(&bytes).unwrap()
}

#[rstest]
#[case(uids::IMPLICIT_VR_LITTLE_ENDIAN)]
#[case(uids::EXPLICIT_VR_LITTLE_ENDIAN)]
#[case(uids::EXPLICIT_VR_BIG_ENDIAN)]
fn image_from_file(#[case] ts: &str) {
    let file = encode_and_parse(&ct_slice("1.2.3.1", "0"), ts);
    assert_eq!(file.element(tags::ROWS).unwrap().to_int::<u16>().unwrap(), 32);
    assert_eq!(file.element(tags::COLUMNS).unwrap().to_int::<u16>().unwrap(), 32);

    let image = ImageFactory::new().create_from_file(&file).unwrap();
    assert_eq!(image.geometry().size().values(), &[32, 32, 1]);
    assert_eq!(image.geometry().spacing().values(), &[0.5, 0.5, 1.]);
    assert_eq!(image.meta().bits_stored, 12);
    assert_eq!(image.meta().sop_instance_uids, ["1.2.3.1"]);

    // row 4, column 0
    let index = Index::new(vec![0, 4, 0]);
    assert_eq!(image.value_at_index(&index), 384.);
    assert_eq!(image.rescaled_value_at_index(&index), 384. - 1024.);

    let range = image.rescaled_data_range().unwrap();
    assert_eq!(range.min, -1024.);
    assert_eq!(range.max, 3069. - 1024.);
}

#[test]
fn volume_from_slices() {
    let factory = ImageFactory::new();
    let first = encode_and_parse(&ct_slice("1.2.3.1", "0"), uids::EXPLICIT_VR_LITTLE_ENDIAN);
    let second = encode_and_parse(&ct_slice("1.2.3.2", "2.5"), uids::EXPLICIT_VR_LITTLE_ENDIAN);
    let third = encode_and_parse(&ct_slice("1.2.3.3", "-2.5"), uids::EXPLICIT_VR_LITTLE_ENDIAN);

    let mut volume = factory.create_from_file(&first).unwrap();
    assert_eq!(volume.append_slice(&factory.create_from_file(&second).unwrap()).unwrap(), 0);
    assert_eq!(volume.append_slice(&factory.create_from_file(&third).unwrap()).unwrap(), 2);

    let geometry = volume.geometry();
    assert_eq!(geometry.size().values(), &[32, 32, 3]);
    assert_eq!(geometry.current_total_number_of_slices(), 3);
    assert!(geometry.is_sorted(0));
    assert_eq!(volume.meta().sop_instance_uids, ["1.2.3.2", "1.2.3.1", "1.2.3.3"]);
    assert_eq!(
        geometry.index_to_world(&Index::new(vec![2, 0, 1])),
        Some(Point3D::new(-15., -16., 0.))
    );
    assert_eq!(
        geometry.world_to_index(Point3D::new(-15., -16., -2.5), 0),
        Some(Index::new(vec![2, 0, 2]))
    );

    let mut view = View::new(Arc::new(volume));
    assert_eq!(view.scroll_dimension(), 2);
    assert!(view.increment_scroll_index(true));
    assert!(view.increment_scroll_index(true));
    assert!(!view.increment_scroll_index(true));
    assert_eq!(view.current_position(), Some(Point3D::new(-16., -16., -2.5)));
}

#[test]
fn rendered_plane() {
    let file = encode_and_parse(&ct_slice("1.2.3.1", "0"), uids::EXPLICIT_VR_LITTLE_ENDIAN);
    let image = ImageFactory::new().create_from_file(&file).unwrap();
    let mut view = View::new(Arc::new(image));
    assert_eq!(view.current_preset_name(), "Default0");
    assert_eq!(view.window_level().center(), 40.);
    assert_eq!(view.window_level().width(), 400.);

    let rgba = view.generate_image_data();
    assert_eq!(rgba.len(), 32 * 32 * 4);
    // -1024 HU is below the window
    assert_eq!(&rgba[..4], &[0, 0, 0, 255]);

    // a window starting at -1024 HU, one grey level per unit
    view.set_window_level(WindowCenterAndWidth::new(-896., 256.), false);
    view.set_colour_map(ColourMap::InvPlain, false);
    let rgba = view.generate_image_data();
    // the second pixel holds 3
    assert_eq!(&rgba[4..8], &[252, 252, 252, 255]);
}
