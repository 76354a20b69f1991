//! The DICOM file meta information group (0002,xxxx).
use dwv_core::value::PrimitiveValue;
use dwv_core::{DataElement, DataSet, Header, Tag, VR};
use dwv_dictionary_std::tags;

/// The implementation class UID written by this crate.
pub const IMPLEMENTATION_CLASS_UID: &str = "1.2.826.0.1.3680043.9.7278.1.1";
/// The implementation version name written by this crate.
pub const IMPLEMENTATION_VERSION_NAME: &str = "DWV_RS_010";

/// The elements of the file meta group, with typed accessors.
///
/// The table keeps every meta element as it was read,
/// including the declared group length.
/// [`DicomWriter`](crate::DicomWriter) recomputes the group length
/// whenever the table is written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileMetaTable {
    elements: DataSet,
}

impl FileMetaTable {
    /// Create a meta group for a new file.
    pub fn new(
        media_storage_sop_class_uid: &str,
        media_storage_sop_instance_uid: &str,
        transfer_syntax: &str,
    ) -> Self {
        let mut elements = DataSet::new();
        elements.put(DataElement::new(
            tags::FILE_META_INFORMATION_VERSION,
            VR::OB,
            PrimitiveValue::from(vec![0_u8, 1]),
        ));
        elements.put(DataElement::new(
            tags::MEDIA_STORAGE_SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(media_storage_sop_class_uid),
        ));
        elements.put(DataElement::new(
            tags::MEDIA_STORAGE_SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(media_storage_sop_instance_uid),
        ));
        elements.put(DataElement::new(
            tags::TRANSFER_SYNTAX_UID,
            VR::UI,
            PrimitiveValue::from(transfer_syntax),
        ));
        elements.put(DataElement::new(
            tags::IMPLEMENTATION_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(IMPLEMENTATION_CLASS_UID),
        ));
        elements.put(DataElement::new(
            tags::IMPLEMENTATION_VERSION_NAME,
            VR::SH,
            PrimitiveValue::from(IMPLEMENTATION_VERSION_NAME),
        ));
        FileMetaTable { elements }
    }

    pub fn from_data_set(elements: DataSet) -> Self {
        FileMetaTable { elements }
    }

    pub fn data_set(&self) -> &DataSet {
        &self.elements
    }

    pub fn into_data_set(self) -> DataSet {
        self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn text(&self, tag: Tag) -> Option<&str> {
        match self.elements.element(tag)?.primitive()? {
            PrimitiveValue::Strs(values) => values.first().map(String::as_str),
            PrimitiveValue::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// The group length as declared in the source, if any.
    pub fn group_length(&self) -> Option<u32> {
        self.elements
            .element(tags::FILE_META_INFORMATION_GROUP_LENGTH)?
            .to_int()
            .ok()
    }

    /// The Transfer Syntax UID (0002,0010).
    pub fn transfer_syntax(&self) -> Option<&str> {
        self.text(tags::TRANSFER_SYNTAX_UID)
    }

    pub fn media_storage_sop_class_uid(&self) -> Option<&str> {
        self.text(tags::MEDIA_STORAGE_SOP_CLASS_UID)
    }

    pub fn media_storage_sop_instance_uid(&self) -> Option<&str> {
        self.text(tags::MEDIA_STORAGE_SOP_INSTANCE_UID)
    }

    pub fn implementation_class_uid(&self) -> Option<&str> {
        self.text(tags::IMPLEMENTATION_CLASS_UID)
    }

    pub fn implementation_version_name(&self) -> Option<&str> {
        self.text(tags::IMPLEMENTATION_VERSION_NAME)
    }

    pub fn set_transfer_syntax(&mut self, uid: &str) {
        self.elements.put(DataElement::new(
            tags::TRANSFER_SYNTAX_UID,
            VR::UI,
            PrimitiveValue::from(uid),
        ));
    }

    /// The meta elements to write, in tag order,
    /// with the transfer syntax set to `uid`
    /// and without the group length.
    pub(crate) fn elements_for(&self, uid: &str) -> Vec<DataElement> {
        let mut elements: Vec<_> = self
            .elements
            .iter()
            .filter(|e| e.tag() != tags::FILE_META_INFORMATION_GROUP_LENGTH)
            .filter(|e| e.tag() != tags::TRANSFER_SYNTAX_UID)
            .cloned()
            .collect();
        elements.push(DataElement::new(
            tags::TRANSFER_SYNTAX_UID,
            VR::UI,
            PrimitiveValue::from(uid),
        ));
        elements.sort_by_key(|e| e.tag());
        elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let mut meta = FileMetaTable::new(
            "1.2.840.10008.5.1.4.1.1.2",
            "1.2.3.4",
            "1.2.840.10008.1.2.1",
        );
        assert_eq!(meta.transfer_syntax(), Some("1.2.840.10008.1.2.1"));
        assert_eq!(meta.media_storage_sop_class_uid(), Some("1.2.840.10008.5.1.4.1.1.2"));
        assert_eq!(meta.media_storage_sop_instance_uid(), Some("1.2.3.4"));
        assert_eq!(meta.implementation_class_uid(), Some(IMPLEMENTATION_CLASS_UID));
        assert_eq!(meta.group_length(), None);

        meta.set_transfer_syntax("1.2.840.10008.1.2");
        assert_eq!(meta.transfer_syntax(), Some("1.2.840.10008.1.2"));

        let elements = meta.elements_for("1.2.840.10008.1.2.2");
        let order: Vec<_> = elements.iter().map(|e| e.tag()).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
        assert_eq!(
            elements
                .iter()
                .find(|e| e.tag() == tags::TRANSFER_SYNTAX_UID)
                .map(|e| e.to_str().unwrap().into_owned()),
            Some("1.2.840.10008.1.2.2".to_string())
        );
    }
}
