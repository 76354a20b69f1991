//! An ordered collection of data elements.
use crate::dictionary::{DataDictionary, DataDictionaryEntry};
use crate::element::DataElement;
use crate::header::{Header, Tag};
use std::collections::HashMap;

/// A DICOM data set: a map from tag to data element
/// which keeps the order in which elements were inserted.
///
/// A tag appears at most once.
/// Replacing an element keeps it in its original position.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    elements: Vec<DataElement>,
    index: HashMap<Tag, usize>,
}

impl PartialEq for DataSet {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl DataSet {
    pub fn new() -> Self {
        DataSet::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.index.contains_key(&tag)
    }

    /// Retrieve the element with the given tag.
    pub fn element(&self, tag: Tag) -> Option<&DataElement> {
        self.index.get(&tag).map(|&i| &self.elements[i])
    }

    /// Retrieve an element by its 8 character hexadecimal key,
    /// such as `"00280010"`.
    pub fn element_by_key(&self, key: &str) -> Option<&DataElement> {
        Tag::from_key(key).and_then(|tag| self.element(tag))
    }

    /// Retrieve an element by its dictionary keyword.
    pub fn element_by_name<D>(&self, dict: &D, name: &str) -> Option<&DataElement>
    where
        D: DataDictionary,
    {
        dict.by_name(name).and_then(|e| self.element(e.tag()))
    }

    /// Insert an element, returning the element previously stored
    /// under the same tag.
    pub fn put(&mut self, element: DataElement) -> Option<DataElement> {
        let tag = element.tag();
        match self.index.get(&tag) {
            Some(&i) => Some(std::mem::replace(&mut self.elements[i], element)),
            None => {
                self.index.insert(tag, self.elements.len());
                self.elements.push(element);
                None
            }
        }
    }

    /// Remove and return the element with the given tag.
    pub fn remove_element(&mut self, tag: Tag) -> Option<DataElement> {
        let i = self.index.remove(&tag)?;
        let element = self.elements.remove(i);
        for position in self.index.values_mut() {
            if *position > i {
                *position -= 1;
            }
        }
        Some(element)
    }

    /// Iterate over the elements in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, DataElement> {
        self.elements.iter()
    }

    /// Iterate over the tags in insertion order.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.elements.iter().map(|e| e.tag())
    }

    /// Iterate over `(key, element)` pairs, where the key is the
    /// 8 character tag key.
    pub fn keyed(&self) -> impl Iterator<Item = (String, &DataElement)> + '_ {
        self.elements.iter().map(|e| (e.tag().key(), e))
    }
}

impl IntoIterator for DataSet {
    type Item = DataElement;
    type IntoIter = std::vec::IntoIter<DataElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a DataSet {
    type Item = &'a DataElement;
    type IntoIter = std::slice::Iter<'a, DataElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl Extend<DataElement> for DataSet {
    fn extend<I: IntoIterator<Item = DataElement>>(&mut self, iter: I) {
        for element in iter {
            self.put(element);
        }
    }
}

impl FromIterator<DataElement> for DataSet {
    fn from_iter<I: IntoIterator<Item = DataElement>>(iter: I) -> Self {
        let mut set = DataSet::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::VR;
    use crate::value::PrimitiveValue;

    fn element(group: u16, elem: u16, value: &str) -> DataElement {
        DataElement::new(Tag(group, elem), VR::LO, PrimitiveValue::from(value))
    }

    #[test]
    fn keeps_insertion_order() {
        let set: DataSet = vec![
            element(0x0010, 0x0020, "id"),
            element(0x0008, 0x0060, "CT"),
            element(0x0010, 0x0010, "name"),
        ]
        .into_iter()
        .collect();

        let tags: Vec<_> = set.tags().collect();
        assert_eq!(
            tags,
            vec![Tag(0x0010, 0x0020), Tag(0x0008, 0x0060), Tag(0x0010, 0x0010)]
        );
        assert_eq!(
            set.element_by_key("00080060").map(|e| e.to_str().unwrap().into_owned()),
            Some("CT".to_string())
        );
    }

    #[test]
    fn put_replaces_in_place() {
        let mut set = DataSet::new();
        set.put(element(0x0008, 0x0060, "CT"));
        set.put(element(0x0010, 0x0010, "name"));
        let old = set.put(element(0x0008, 0x0060, "MR"));
        assert_eq!(old, Some(element(0x0008, 0x0060, "CT")));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().next(), Some(&element(0x0008, 0x0060, "MR")));
    }

    #[test]
    fn remove_reindexes() {
        let mut set: DataSet = vec![
            element(0x0008, 0x0016, "a"),
            element(0x0008, 0x0018, "b"),
            element(0x0008, 0x0060, "c"),
        ]
        .into_iter()
        .collect();
        assert!(set.remove_element(Tag(0x0008, 0x0018)).is_some());
        assert!(set.remove_element(Tag(0x0008, 0x0018)).is_none());
        assert_eq!(set.element(Tag(0x0008, 0x0060)), Some(&element(0x0008, 0x0060, "c")));
        assert_eq!(set.len(), 2);
    }
}
