//! Caller-supplied dictionary for private attributes.
use dwv_core::dictionary::{
    DataDictionary, DataDictionaryEntry, DataDictionaryEntryBuf, Multiplicity, TagRange,
};
use dwv_core::{Tag, VR};
use std::collections::HashMap;

/// A dictionary of private attributes, keyed by exact tag.
///
/// Private creator elements `(gggg,0010-00FF)` always resolve
/// to a `LO` entry, even when no entry was registered.
///
/// ```
/// # use dwv_dictionary_std::PrivateDictionary;
/// # use dwv_core::{DataDictionary, DataDictionaryEntry, Tag, VR};
/// let mut dict = PrivateDictionary::new();
/// dict.insert(Tag(0x0029, 0x1010), "CSAImageHeaderInfo", VR::OB);
/// assert_eq!(dict.by_tag(Tag(0x0029, 0x1010)).map(|e| e.vr()), Some(VR::OB));
/// assert_eq!(dict.by_tag(Tag(0x0029, 0x0010)).map(|e| e.vr()), Some(VR::LO));
/// assert!(dict.by_tag(Tag(0x0029, 0x1020)).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PrivateDictionary {
    by_tag: HashMap<Tag, DataDictionaryEntryBuf>,
    private_creator: DataDictionaryEntryBuf,
}

impl Default for PrivateDictionary {
    fn default() -> Self {
        PrivateDictionary {
            by_tag: HashMap::new(),
            private_creator: DataDictionaryEntryBuf {
                tag: TagRange::PrivateCreator,
                alias: "PrivateCreator".to_string(),
                vr: VR::LO,
                vm: Multiplicity::ONE,
            },
        }
    }
}

impl PrivateDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single-valued private attribute.
    pub fn insert(&mut self, tag: Tag, alias: impl Into<String>, vr: VR) -> &mut Self {
        self.insert_entry(DataDictionaryEntryBuf {
            tag: TagRange::Single(tag),
            alias: alias.into(),
            vr,
            vm: Multiplicity::ONE,
        })
    }

    /// Register a private attribute entry.
    pub fn insert_entry(&mut self, entry: DataDictionaryEntryBuf) -> &mut Self {
        self.by_tag.insert(entry.tag(), entry);
        self
    }

    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

impl DataDictionary for PrivateDictionary {
    type Entry = DataDictionaryEntryBuf;

    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry> {
        self.by_tag.get(&tag).or_else(|| {
            if tag.is_private_creator() {
                Some(&self.private_creator)
            } else {
                None
            }
        })
    }

    fn by_name(&self, name: &str) -> Option<&Self::Entry> {
        self.by_tag.values().find(|e| e.alias == name)
    }
}
