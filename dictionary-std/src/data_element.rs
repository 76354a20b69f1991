//! Attribute dictionary lookups over the curated entry table.
use crate::tags::ENTRIES;
use dwv_core::dictionary::{DataDictionary, DataDictionaryEntryRef, Multiplicity, TagRange};
use dwv_core::header::Tag;
use dwv_core::VR;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::fmt;

pub(crate) const VM_1: Multiplicity = Multiplicity::exactly(1);
pub(crate) const VM_2: Multiplicity = Multiplicity::exactly(2);
pub(crate) const VM_3: Multiplicity = Multiplicity::exactly(3);
pub(crate) const VM_6: Multiplicity = Multiplicity::exactly(6);
pub(crate) const VM_1_N: Multiplicity = Multiplicity::at_least(1);
pub(crate) const VM_2_N: Multiplicity = Multiplicity::at_least(2);

type EntryRef = &'static DataDictionaryEntryRef<'static>;

/// Entry answering for any `(gggg,0000)` tag missing from the table.
static GROUP_LENGTH: DataDictionaryEntryRef<'static> = DataDictionaryEntryRef {
    tag: TagRange::GroupLength,
    alias: "GenericGroupLength",
    vr: VR::UL,
    vm: VM_1,
};

static INDEX: Lazy<EntryIndex> = Lazy::new(|| {
    let mut index = EntryIndex {
        names: HashMap::with_capacity(ENTRIES.len() + 1),
        tags: HashMap::with_capacity(ENTRIES.len()),
        repeating_groups: HashSet::new(),
    };
    for entry in ENTRIES {
        index.names.insert(entry.alias, entry);
        index.tags.insert(entry.tag.inner(), entry);
        if let TagRange::Group100(tag) = entry.tag {
            index.repeating_groups.insert(tag);
        }
    }
    index.names.insert(GROUP_LENGTH.alias, &GROUP_LENGTH);
    index
});

/// Name and tag indices built once over the entry table.
#[derive(Debug)]
struct EntryIndex {
    names: HashMap<&'static str, EntryRef>,
    tags: HashMap<Tag, EntryRef>,
    /// overlay style `(60xx,eeee)` entries, stored with `xx` zeroed
    repeating_groups: HashSet<Tag>,
}

impl EntryIndex {
    fn lookup(&self, tag: Tag) -> Option<EntryRef> {
        if let Some(entry) = self.tags.get(&tag) {
            return Some(entry);
        }
        let base = Tag(tag.0 & 0xFF00, tag.1);
        if self.repeating_groups.contains(&base) {
            return self.tags.get(&base).copied();
        }
        if tag.is_group_length() {
            return Some(&GROUP_LENGTH);
        }
        None
    }
}

/// The number of attributes known to the standard dictionary.
pub fn entry_count() -> usize {
    INDEX.tags.len()
}

/// The dictionary of public attributes.
///
/// Tags in odd groups never resolve here,
/// see [`PrivateDictionary`](crate::PrivateDictionary) for those.
/// Its index is built on first use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StandardDataDictionary;

impl DataDictionary for StandardDataDictionary {
    type Entry = DataDictionaryEntryRef<'static>;

    fn by_name(&self, name: &str) -> Option<&Self::Entry> {
        INDEX.names.get(name).copied()
    }

    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry> {
        if tag.is_private() {
            None
        } else {
            INDEX.lookup(tag)
        }
    }
}

impl fmt::Display for StandardDataDictionary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Standard DICOM Data Dictionary")
    }
}

#[cfg(test)]
mod tests {
    use super::StandardDataDictionary;
    use dwv_core::dictionary::{
        DataDictionary, DataDictionaryEntry, DataDictionaryEntryRef, Multiplicity, TagRange::*,
    };
    use dwv_core::header::{Tag, VR};

    // tests for just a few attributes to make sure that the entries
    // were well installed into the crate
    #[test]
    fn smoke_test() {
        let dict = StandardDataDictionary;

        assert_eq!(
            dict.by_name("PatientName"),
            Some(&DataDictionaryEntryRef {
                tag: Single(Tag(0x0010, 0x0010)),
                alias: "PatientName",
                vr: VR::PN,
                vm: Multiplicity::ONE,
            })
        );

        let modality = dict.by_tag(Tag(0x0008, 0x0060)).unwrap();
        assert_eq!(modality.alias(), "Modality");
        assert_eq!(modality.vr(), VR::CS);

        let pixel_data = dict
            .by_tag(Tag(0x7FE0, 0x0010))
            .expect("Pixel Data attribute should exist");
        assert_eq!(pixel_data.tag, Single(Tag(0x7FE0, 0x0010)));
        assert_eq!(pixel_data.alias, "PixelData");

        let orientation = dict.by_name("ImageOrientationPatient").unwrap();
        assert_eq!(orientation.vm(), Multiplicity::exactly(6));
        assert!(orientation.vm().admits(6));
    }

    #[test]
    fn every_entry_is_indexed() {
        assert_eq!(super::entry_count(), crate::tags::ENTRIES.len());
        let dict = StandardDataDictionary;
        for entry in crate::tags::ENTRIES {
            assert_eq!(dict.by_name(entry.alias).map(|e| e.tag), Some(entry.tag));
        }
    }

    #[test]
    fn repeating_overlay_groups() {
        let dict = StandardDataDictionary;
        let overlay_data = dict
            .by_tag(Tag(0x60EE, 0x3000))
            .expect("Repeated Overlay Data attribute should exist");
        assert_eq!(overlay_data.tag, Group100(Tag(0x6000, 0x3000)));
        assert_eq!(overlay_data.alias, "OverlayData");
    }

    #[test]
    fn constants_available() {
        use crate::tags::*;
        assert_eq!(PATIENT_NAME, Tag(0x0010, 0x0010));
        assert_eq!(MODALITY, Tag(0x0008, 0x0060));
        assert_eq!(PIXEL_DATA, Tag(0x7FE0, 0x0010));
        assert_eq!(WINDOW_CENTER_WIDTH_EXPLANATION, Tag(0x0028, 0x1055));
    }

    #[test]
    fn has_group_length_tags() {
        let dict = StandardDataDictionary;

        assert_eq!(
            dict.by_tag(Tag(0x0002, 0x0000)).map(|e| e.alias),
            Some("FileMetaInformationGroupLength"),
        );

        assert_eq!(
            dict.by_tag(Tag(0x7FE0, 0x0000)),
            Some(&DataDictionaryEntryRef {
                tag: GroupLength,
                alias: "GenericGroupLength",
                vr: VR::UL,
                vm: Multiplicity::ONE,
            }),
        );
    }

    #[test]
    fn private_tags_never_resolve() {
        let dict = StandardDataDictionary;
        assert_eq!(dict.by_tag(Tag(0x0009, 0x0010)), None);
        assert_eq!(dict.by_tag(Tag(0x0029, 0x1010)), None);
        assert_eq!(dict.by_tag(Tag(0x0011, 0x0000)), None);
        // unknown public tag
        assert_eq!(dict.by_tag(Tag(0x0008, 0x0001)), None);
    }

    #[test]
    fn can_parse_tags() {
        let dict = StandardDataDictionary;

        assert_eq!(dict.parse_tag("(7FE0,0010)"), Some(crate::tags::PIXEL_DATA));
        assert_eq!(dict.parse_tag("0010,21C0"), Some(Tag(0x0010, 0x21C0)));
        assert_eq!(
            dict.parse_tag("OperatorsName"),
            Some(crate::tags::OPERATORS_NAME)
        );
        assert_eq!(dict.parse_tag(""), None);
        assert_eq!(dict.parse_tag("OperatorNickname"), None);
    }
}
