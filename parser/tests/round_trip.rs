//! Decoding files produced by the writer, and writing them again.
use dwv_core::value::{DataSetSequence, PixelFragmentSequence, PrimitiveValue};
use dwv_core::{DataElement, DataSet, Header, Tag, VR};
use dwv_dictionary_std::{tags, uids};
use dwv_encoding::transfer_syntax;
use dwv_parser::{
    frame_data, frame_ranges, DicomParser, DicomWriter, ErrorKind, FileMetaTable, ReadOptions,
    SequenceLength, WriteOptions, WriteRule, WriteRules,
};
use rstest::rstest;

fn element(tag: Tag, vr: VR, value: impl Into<PrimitiveValue>) -> DataElement {
    DataElement::new(tag, vr, value.into())
}

fn referenced_image() -> DataSet {
    let mut item = DataSet::new();
    item.put(element(tags::REFERENCED_SOP_CLASS_UID, VR::UI, uids::CT_IMAGE_STORAGE));
    item.put(element(tags::REFERENCED_SOP_INSTANCE_UID, VR::UI, "1.2.3.4.5.6"));
    item
}

fn sample_data_set() -> DataSet {
    let mut ds = DataSet::new();
    ds.put(element(tags::SPECIFIC_CHARACTER_SET, VR::CS, "ISO_IR 100"));
    ds.put(element(tags::SOP_CLASS_UID, VR::UI, uids::CT_IMAGE_STORAGE));
    ds.put(element(tags::MODALITY, VR::CS, "CT"));
    ds.put(DataElement::new(
        tags::REFERENCED_IMAGE_SEQUENCE,
        VR::SQ,
        DataSetSequence::undefined(vec![referenced_image(), referenced_image()]),
    ));
    ds.put(element(tags::PATIENT_NAME, VR::PN, "Müller^Jürgen"));
    ds.put(element(tags::PATIENT_ID, VR::LO, "ID-0042"));
    ds.put(element(tags::PATIENT_BIRTH_DATE, VR::DA, "19700101"));
    ds.put(element(tags::SLICE_THICKNESS, VR::DS, "2.5"));
    ds.put(element(tags::INSTANCE_NUMBER, VR::IS, "7"));
    ds.put(element(
        tags::IMAGE_POSITION_PATIENT,
        VR::DS,
        vec!["-10".to_string(), "20.5".to_string(), "3".to_string()],
    ));
    ds.put(element(
        tags::IMAGE_COMMENTS,
        VR::LT,
        PrimitiveValue::Str("Some comment".to_string()),
    ));
    ds.put(element(tags::FRAME_INCREMENT_POINTER, VR::AT, tags::FRAME_TIME));
    ds.put(element(tags::ROWS, VR::US, 2_u16));
    ds.put(element(tags::COLUMNS, VR::US, 2_u16));
    ds.put(element(tags::BITS_ALLOCATED, VR::US, 16_u16));
    ds.put(element(tags::BITS_STORED, VR::US, 12_u16));
    ds.put(element(tags::PIXEL_REPRESENTATION, VR::US, 0_u16));
    ds.put(element(tags::RESCALE_INTERCEPT, VR::DS, "-1024"));
    ds.put(element(tags::RESCALE_SLOPE, VR::DS, "1"));
    ds.put(element(tags::PIXEL_DATA, VR::OW, vec![1_u16, 2, 3, 4000]));
    ds
}

fn write(ds: &DataSet, ts: &str, options: WriteOptions) -> Vec<u8> {
    let meta = FileMetaTable::new(uids::CT_IMAGE_STORAGE, "1.2.3.4", ts);
    DicomWriter::new()
        .with_options(options)
        .write_parts(&meta, ds, transfer_syntax::get(ts).unwrap())
        .unwrap()
}

#[rstest]
#[case(uids::IMPLICIT_VR_LITTLE_ENDIAN)]
#[case(uids::EXPLICIT_VR_LITTLE_ENDIAN)]
#[case(uids::EXPLICIT_VR_BIG_ENDIAN)]
fn decode_encode_decode(#[case] ts: &str) {
    let ds = sample_data_set();
    let bytes = write(&ds, ts, WriteOptions::new());

    let file = DicomParser::new().parse(&bytes).unwrap();
    assert_eq!(file.transfer_syntax.uid(), ts);
    assert!(file.warnings.is_empty(), "{:?}", file.warnings);
    assert_eq!(file.dataset, ds);
    assert_eq!(
        file.element(tags::PATIENT_NAME).unwrap().to_str().unwrap(),
        "Müller^Jürgen"
    );

    // writing the decoded file gives back the same bytes
    let again = DicomWriter::new().write(&file).unwrap();
    assert_eq!(again, bytes);
    let reparsed = DicomParser::new().parse(&again).unwrap();
    assert_eq!(reparsed.dataset, file.dataset);
    assert_eq!(reparsed.meta, file.meta);
}

#[rstest]
fn transcode(
    #[values(
        uids::IMPLICIT_VR_LITTLE_ENDIAN,
        uids::EXPLICIT_VR_LITTLE_ENDIAN,
        uids::EXPLICIT_VR_BIG_ENDIAN
    )]
    from: &str,
    #[values(
        uids::IMPLICIT_VR_LITTLE_ENDIAN,
        uids::EXPLICIT_VR_LITTLE_ENDIAN,
        uids::EXPLICIT_VR_BIG_ENDIAN
    )]
    to: &str,
) {
    let ds = sample_data_set();
    let file = DicomParser::new()
        .parse(&write(&ds, from, WriteOptions::new()))
        .unwrap();
    let bytes = DicomWriter::new()
        .with_options(WriteOptions::new().transfer_syntax(to))
        .write(&file)
        .unwrap();
    let file = DicomParser::new().parse(&bytes).unwrap();
    assert_eq!(file.meta.transfer_syntax(), Some(to));
    assert_eq!(file.dataset, ds);
}

#[test]
fn icon_sample_format_stays_in_its_item() {
    let mut icon = DataSet::new();
    icon.put(element(tags::ROWS, VR::US, 2_u16));
    icon.put(element(tags::COLUMNS, VR::US, 2_u16));
    icon.put(element(tags::BITS_ALLOCATED, VR::US, 8_u16));
    icon.put(element(tags::PIXEL_DATA, VR::OB, vec![1_u8, 2, 3, 4]));
    let mut ds = sample_data_set();
    ds.put(DataElement::new(
        tags::ICON_IMAGE_SEQUENCE,
        VR::SQ,
        DataSetSequence::undefined(vec![icon]),
    ));

    let file = DicomParser::new()
        .parse(&write(&ds, uids::IMPLICIT_VR_LITTLE_ENDIAN, WriteOptions::new()))
        .unwrap();
    let pixels = file.element(tags::PIXEL_DATA).unwrap();
    assert_eq!(pixels.vr(), VR::OW);
    assert_eq!(
        pixels.primitive(),
        Some(&PrimitiveValue::from(vec![1_u16, 2, 3, 4000]))
    );
    assert_eq!(file.dataset, ds);

    // big endian swaps words, not bytes
    let bytes = DicomWriter::new()
        .with_options(WriteOptions::new().transfer_syntax(uids::EXPLICIT_VR_BIG_ENDIAN))
        .write(&file)
        .unwrap();
    let file = DicomParser::new().parse(&bytes).unwrap();
    assert_eq!(file.dataset, ds);
}

#[test]
fn text_is_encoded_with_the_declared_character_set() {
    let bytes = write(
        &sample_data_set(),
        uids::EXPLICIT_VR_LITTLE_ENDIAN,
        WriteOptions::new(),
    );
    // Latin-1, not UTF-8
    let needle: &[u8] = b"M\xFCller^J\xFCrgen";
    assert!(bytes.windows(needle.len()).any(|w| w == needle));
}

#[test]
fn unknown_character_set_falls_back() {
    let mut ds = sample_data_set();
    ds.put(element(tags::SPECIFIC_CHARACTER_SET, VR::CS, "ISO_IR 999"));
    ds.put(element(tags::PATIENT_NAME, VR::PN, "Doe^John"));
    let file = DicomParser::new()
        .parse(&write(&ds, uids::EXPLICIT_VR_LITTLE_ENDIAN, WriteOptions::new()))
        .unwrap();
    assert_eq!(
        file.warnings,
        vec![dwv_parser::Warning::CharacterSet {
            term: "ISO_IR 999".to_string()
        }]
    );
    assert_eq!(
        file.element(tags::PATIENT_NAME).unwrap().to_str().unwrap(),
        "Doe^John"
    );
}

#[rstest]
#[case(SequenceLength::Defined, false)]
#[case(SequenceLength::Undefined, true)]
fn sequence_length_modes(#[case] mode: SequenceLength, #[case] undefined: bool) {
    let ds = sample_data_set();
    let bytes = write(
        &ds,
        uids::EXPLICIT_VR_LITTLE_ENDIAN,
        WriteOptions::new().undefined_length_sequences(mode),
    );
    let file = DicomParser::new().parse(&bytes).unwrap();
    let sequence = file.element(tags::REFERENCED_IMAGE_SEQUENCE).unwrap();
    assert_eq!(sequence.is_undefined_length(), undefined);
    let items = sequence.items().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1], referenced_image());

    // the length mode read back is kept on the next write
    let again = DicomWriter::new().write(&file).unwrap();
    assert_eq!(again, bytes);
}

#[test]
fn group_lengths_are_recomputed() {
    let mut ds = DataSet::new();
    ds.put(element(Tag(0x0008, 0x0000), VR::UL, 999_u32));
    ds.put(element(tags::SOP_CLASS_UID, VR::UI, uids::CT_IMAGE_STORAGE));
    ds.put(element(tags::MODALITY, VR::CS, "MR"));
    ds.put(element(tags::PATIENT_ID, VR::LO, "1"));

    let bytes = write(&ds, uids::EXPLICIT_VR_LITTLE_ENDIAN, WriteOptions::new());
    let file = DicomParser::new().parse(&bytes).unwrap();

    let meta_length = file
        .meta
        .data_set()
        .element(tags::FILE_META_INFORMATION_GROUP_LENGTH)
        .unwrap();
    let first = file.dataset.iter().next().unwrap();
    assert_eq!(
        file.meta.group_length(),
        Some((first.start_offset().unwrap() - meta_length.end_offset().unwrap()) as u32)
    );

    let group_length = file.dataset.element(Tag(0x0008, 0x0000)).unwrap();
    let modality = file.dataset.element(tags::MODALITY).unwrap();
    assert_eq!(
        group_length.to_int::<u32>(),
        Ok((modality.end_offset().unwrap() - group_length.end_offset().unwrap()) as u32)
    );
}

#[test]
fn missing_magic_code_is_a_format_error() {
    let mut bytes = write(
        &sample_data_set(),
        uids::EXPLICIT_VR_LITTLE_ENDIAN,
        WriteOptions::new(),
    );
    bytes[129] = b'X';
    let err = DicomParser::new().parse(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn truncated_file() {
    let bytes = write(
        &sample_data_set(),
        uids::EXPLICIT_VR_LITTLE_ENDIAN,
        WriteOptions::new(),
    );
    let err = DicomParser::new()
        .parse(&bytes[..bytes.len() - 3])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TruncatedBuffer);
}

#[test]
fn missing_sequence_delimiter() {
    let mut ds = DataSet::new();
    ds.put(element(tags::MODALITY, VR::CS, "CT"));
    ds.put(DataElement::new(
        tags::REFERENCED_IMAGE_SEQUENCE,
        VR::SQ,
        DataSetSequence::undefined(vec![referenced_image()]),
    ));
    let bytes = write(&ds, uids::EXPLICIT_VR_LITTLE_ENDIAN, WriteOptions::new());
    // drop the sequence delimitation item
    let err = DicomParser::new()
        .parse(&bytes[..bytes.len() - 8])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedSequence);
}

fn nested(depth: usize) -> DataSet {
    let mut ds = DataSet::new();
    ds.put(element(tags::CODE_VALUE, VR::SH, "leaf"));
    for _ in 0..depth {
        let mut outer = DataSet::new();
        outer.put(DataElement::new(
            tags::CONTENT_SEQUENCE,
            VR::SQ,
            DataSetSequence::undefined(vec![ds]),
        ));
        ds = outer;
    }
    ds
}

#[rstest]
#[case(SequenceLength::Defined)]
#[case(SequenceLength::Undefined)]
fn nesting_depth_limit(#[case] mode: SequenceLength) {
    let bytes = write(
        &nested(4),
        uids::EXPLICIT_VR_LITTLE_ENDIAN,
        WriteOptions::new().undefined_length_sequences(mode),
    );
    let file = DicomParser::with_options(ReadOptions::new().max_depth(4))
        .parse(&bytes)
        .unwrap();
    let mut item = &file.dataset;
    for _ in 0..4 {
        item = &item.element(tags::CONTENT_SEQUENCE).unwrap().items().unwrap()[0];
    }
    assert_eq!(item.element(tags::CODE_VALUE).unwrap().to_str().unwrap(), "leaf");

    let err = DicomParser::with_options(ReadOptions::new().max_depth(3))
        .parse(&bytes)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedSequence);
}

#[test]
fn item_count_limit() {
    let bytes = write(
        &sample_data_set(),
        uids::EXPLICIT_VR_LITTLE_ENDIAN,
        WriteOptions::new(),
    );
    assert!(DicomParser::with_options(ReadOptions::new().max_items(2))
        .parse(&bytes)
        .is_ok());
    let err = DicomParser::with_options(ReadOptions::new().max_items(1))
        .parse(&bytes)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedSequence);
}

#[test]
fn encapsulated_frames() {
    let mut ds = DataSet::new();
    ds.put(element(tags::NUMBER_OF_FRAMES, VR::IS, "2"));
    ds.put(element(tags::BITS_ALLOCATED, VR::US, 8_u16));
    ds.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OB,
        PixelFragmentSequence::new(Vec::<u32>::new(), vec![vec![0xFF, 0xD8, 1, 2], vec![0xFF, 0xD8, 3]]),
    ));
    let bytes = write(&ds, uids::JPEG_BASELINE8_BIT, WriteOptions::new());
    let file = DicomParser::new().parse(&bytes).unwrap();

    let pixel_data = file.element(tags::PIXEL_DATA).unwrap();
    let fragments = pixel_data.fragments().unwrap();
    assert!(fragments.offset_table().is_empty());
    // odd fragments are padded on write
    assert_eq!(fragments.fragments()[1], vec![0xFF, 0xD8, 3, 0]);

    let frames = frame_data(fragments, 2);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].as_ref(), &[0xFF, 0xD8, 1, 2]);
    let ranges = frame_ranges(fragments, 2);
    assert_eq!(&bytes[ranges[1][0].clone()], frames[1].as_ref());

    // native transfer syntaxes cannot hold fragments
    let err = DicomWriter::new()
        .with_options(WriteOptions::new().transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN))
        .write(&file)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encode);
}

#[test]
fn unsupported_target_transfer_syntax() {
    let file = DicomParser::new()
        .parse(&write(
            &sample_data_set(),
            uids::EXPLICIT_VR_LITTLE_ENDIAN,
            WriteOptions::new(),
        ))
        .unwrap();
    let err = DicomWriter::new()
        .with_options(WriteOptions::new().transfer_syntax(uids::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN))
        .write(&file)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn anonymised_copy() {
    let file = DicomParser::new()
        .parse(&write(
            &sample_data_set(),
            uids::EXPLICIT_VR_LITTLE_ENDIAN,
            WriteOptions::new(),
        ))
        .unwrap();
    let bytes = DicomWriter::new()
        .with_rules(WriteRules::anonymise())
        .write(&file)
        .unwrap();
    let anonymised = DicomParser::new().parse(&bytes).unwrap();
    assert_eq!(
        anonymised.element(tags::PATIENT_NAME).unwrap().to_str().unwrap(),
        "Anonymized"
    );
    assert!(anonymised
        .element(tags::PATIENT_BIRTH_DATE)
        .unwrap()
        .primitive()
        .unwrap()
        .is_empty());
    assert_eq!(anonymised.element(tags::MODALITY), file.element(tags::MODALITY));
    assert_eq!(anonymised.meta, file.meta);
}

#[test]
fn rules_by_group_and_default() {
    let ds = sample_data_set();
    let rules = WriteRules::new()
        .with_rule("default", WriteRule::remove())
        .with_rule("Image Presentation", WriteRule::copy())
        .with_rule("Identifying", WriteRule::copy());
    let file = DicomParser::new()
        .parse(&write(&ds, uids::EXPLICIT_VR_LITTLE_ENDIAN, WriteOptions::new()))
        .unwrap();
    let bytes = DicomWriter::new().with_rules(rules).write(&file).unwrap();
    let out = DicomParser::new().parse(&bytes).unwrap();
    assert!(out.dataset.tags().all(|t| t.0 == 0x0008 || t.0 == 0x0028));
    assert!(out.element(tags::ROWS).is_some());
    assert!(out.element(tags::MODALITY).is_some());
    assert!(out.element(tags::PATIENT_NAME).is_none());
}

#[test]
fn private_sequences_as_un() {
    let mut item = DataSet::new();
    item.put(element(tags::CODE_VALUE, VR::SH, "T-1"));
    item.put(element(Tag(0x0029, 0x1011), VR::UN, vec![1_u8, 2]));
    let mut ds = DataSet::new();
    ds.put(element(Tag(0x0029, 0x0010), VR::LO, "ACME"));
    ds.put(DataElement::new(
        Tag(0x0029, 0x1010),
        VR::SQ,
        DataSetSequence::new(vec![item.clone()], dwv_core::Length(0)),
    ));

    let bytes = write(
        &ds,
        uids::EXPLICIT_VR_LITTLE_ENDIAN,
        WriteOptions::new().use_un_vr_for_private_sq(true),
    );
    let header: &[u8] = &[0x29, 0x00, 0x10, 0x10, b'U', b'N', 0, 0, 0xFF, 0xFF, 0xFF, 0xFF];
    assert!(bytes.windows(header.len()).any(|w| w == header));

    let file = DicomParser::new().parse(&bytes).unwrap();
    let sequence = file.element(Tag(0x0029, 0x1010)).unwrap();
    assert_eq!(sequence.vr(), VR::UN);
    let items = sequence.items().unwrap();
    assert_eq!(items, &[item]);
    assert_eq!(file.element(Tag(0x0029, 0x0010)).unwrap().to_str().unwrap(), "ACME");
}
