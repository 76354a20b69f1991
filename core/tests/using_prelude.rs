use dwv_core::prelude::*;

#[test]
fn can_use_prelude() {
    let elem = DataElement::new(Tag(0x0010, 0x0010), VR::PN, PrimitiveValue::from("Doe^John"));
    assert_eq!(elem.tag(), Tag(0x0010, 0x0010));
    assert!(!elem.is_undefined_length());

    let mut set = DataSet::new();
    set.put(elem.clone());
    assert_eq!(set.element_by_key("00100010"), Some(&elem));
}

#[test]
fn sequence_elements_have_undefined_length_until_encoded() {
    let item: DataSet = vec![DataElement::new(
        Tag(0x0008, 0x0100),
        VR::SH,
        PrimitiveValue::from("T-D1100"),
    )]
    .into_iter()
    .collect();
    let seq = DataElement::new(
        Tag(0x0008, 0x2218),
        VR::SQ,
        dwv_core::value::DataSetSequence::undefined(vec![item]),
    );
    assert!(seq.is_undefined_length());
    assert_eq!(seq.items().map(|items| items.len()), Some(1));
    assert_eq!(seq.value().multiplicity(), 1);
}
