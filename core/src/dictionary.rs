//! Core data element dictionary types.
//!
//! A dictionary maps an attribute tag to its typical value representation,
//! value multiplicity and keyword.
//! The standard dictionary lives in `dwv-dictionary-std`.
use crate::header::{Tag, VR};

/// Specification of a range of tags pertaining to an attribute.
/// Very often, the dictionary of attributes indicates a unique
/// group part and element part `(group,elem)`,
/// but occasionally an attribute may cover
/// a range of groups or elements instead.
/// For example,
/// _Overlay Data_ (60xx,3000) has more than one possible tag,
/// since it is part of a repeating group.
/// Moreover, a unique variant is defined for group length tags
/// and another one for private creator tags.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TagRange {
    /// Only a specific tag
    Single(Tag),
    /// The two rightmost digits of the _group_ portion are open:
    /// `(GGxx,EEEE)`
    Group100(Tag),
    /// The two rightmost digits of the _element_ portion are open:
    /// `(GGGG,EExx)`
    Element100(Tag),
    /// Generic group length tag `(GGGG,0000)`.
    GroupLength,
    /// Generic private creator tag,
    /// from (GGGG,0010) to (GGGG,00FF) with an odd `GGGG`.
    PrivateCreator,
}

impl TagRange {
    /// Retrieve the inner tag representation of this range.
    ///
    /// Open components are zeroed out.
    /// Group lengths yield `(0000,0000)`,
    /// private creators yield `(0009,0010)`.
    pub fn inner(self) -> Tag {
        match self {
            TagRange::Single(tag) => tag,
            TagRange::Group100(tag) => tag,
            TagRange::Element100(tag) => tag,
            TagRange::GroupLength => Tag(0x0000, 0x0000),
            TagRange::PrivateCreator => Tag(0x0009, 0x0010),
        }
    }
}

/// The value multiplicity of an attribute, such as `1`, `2-n` or `2-2n`.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct Multiplicity {
    /// the minimum number of values
    pub min: u32,
    /// the maximum number of values, `None` if unbounded
    pub max: Option<u32>,
    /// the number of values must be a multiple of this step
    pub step: u32,
}

impl Multiplicity {
    pub const ONE: Multiplicity = Multiplicity::exactly(1);

    pub const fn exactly(n: u32) -> Self {
        Multiplicity {
            min: n,
            max: Some(n),
            step: 1,
        }
    }

    /// `n` or more values, with no step.
    pub const fn at_least(n: u32) -> Self {
        Multiplicity {
            min: n,
            max: None,
            step: 1,
        }
    }

    /// Parse the notation used in the standard:
    /// `N`, `N-M`, `N-n` and `N-Nn`.
    pub fn parse(vm: &str) -> Option<Self> {
        match vm.split_once('-') {
            None => vm.parse().ok().map(Multiplicity::exactly),
            Some((min, max)) => {
                let min: u32 = min.parse().ok()?;
                if max == "n" {
                    return Some(Multiplicity::at_least(min));
                }
                if let Some(step) = max.strip_suffix('n') {
                    return Some(Multiplicity {
                        min,
                        max: None,
                        step: step.parse().ok()?,
                    });
                }
                Some(Multiplicity {
                    min,
                    max: Some(max.parse().ok()?),
                    step: 1,
                })
            }
        }
    }

    /// Check whether the given number of values is admitted.
    pub fn admits(&self, count: u32) -> bool {
        count >= self.min
            && self.max.map(|max| count <= max).unwrap_or(true)
            && count % self.step.max(1) == 0
    }
}

/// Type trait for a dictionary of DICOM attributes.
///
/// Entries can be retrieved by tag, via [`by_tag`][1],
/// or by keyword, via [`by_name`][2].
/// Both return `None` when the attribute is not known.
///
/// [1]: DataDictionary::by_tag
/// [2]: DataDictionary::by_name
pub trait DataDictionary {
    /// The type of the dictionary entry.
    type Entry: DataDictionaryEntry;

    /// Fetch a data element entry by its tag.
    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry>;

    /// Fetch an entry by its usual alias
    /// (e.g. "PatientName" or "SOPInstanceUID").
    /// Aliases are case sensitive.
    fn by_name(&self, name: &str) -> Option<&Self::Entry>;

    /// Fetch an entry by its alias or by DICOM tag expression,
    /// in one of the forms `(gggg,eeee)`, `gggg,eeee` or `ggggeeee`.
    fn by_expr(&self, tag: &str) -> Option<&Self::Entry> {
        match tag.parse() {
            Ok(tag) => self.by_tag(tag),
            Err(_) => self.by_name(tag),
        }
    }

    /// Use this data element dictionary to interpret a DICOM tag
    /// written as a tag expression or a keyword.
    fn parse_tag(&self, tag: &str) -> Option<Tag> {
        tag.parse()
            .ok()
            .or_else(|| self.by_name(tag).map(|e| e.tag()))
    }
}

/// The dictionary entry data type, representing a DICOM attribute.
pub trait DataDictionaryEntry {
    /// The full possible tag range of the attribute.
    fn tag_range(&self) -> TagRange;

    /// The attribute tag, or its base tag if it covers a range.
    fn tag(&self) -> Tag {
        self.tag_range().inner()
    }

    /// The alias of the attribute, with no spaces, usually in UpperCamelCase.
    fn alias(&self) -> &str;

    /// The _typical_ value representation of the attribute.
    fn vr(&self) -> VR;

    /// The value multiplicity.
    fn vm(&self) -> Multiplicity;
}

/// A data type for a dictionary entry using string slices
/// for its data.
#[derive(Debug, PartialEq, Clone)]
pub struct DataDictionaryEntryRef<'a> {
    /// The attribute tag range
    pub tag: TagRange,
    /// The alias of the attribute, with no spaces, usually InCapitalizedCamelCase
    pub alias: &'a str,
    /// The _typical_ value representation of the attribute
    pub vr: VR,
    /// The value multiplicity
    pub vm: Multiplicity,
}

impl<'a> DataDictionaryEntry for DataDictionaryEntryRef<'a> {
    fn tag_range(&self) -> TagRange {
        self.tag
    }
    fn alias(&self) -> &str {
        self.alias
    }
    fn vr(&self) -> VR {
        self.vr
    }
    fn vm(&self) -> Multiplicity {
        self.vm
    }
}

/// A data type for a dictionary entry with full ownership.
#[derive(Debug, PartialEq, Clone)]
pub struct DataDictionaryEntryBuf {
    /// The attribute tag range
    pub tag: TagRange,
    /// The alias of the attribute, with no spaces, usually InCapitalizedCamelCase
    pub alias: String,
    /// The _typical_ value representation of the attribute
    pub vr: VR,
    /// The value multiplicity
    pub vm: Multiplicity,
}

impl DataDictionaryEntry for DataDictionaryEntryBuf {
    fn tag_range(&self) -> TagRange {
        self.tag
    }
    fn alias(&self) -> &str {
        self.alias.as_str()
    }
    fn vr(&self) -> VR {
        self.vr
    }
    fn vm(&self) -> Multiplicity {
        self.vm
    }
}

#[cfg(test)]
mod tests {
    use super::Multiplicity;

    #[test]
    fn parse_multiplicity() {
        assert_eq!(Multiplicity::parse("1"), Some(Multiplicity::ONE));
        assert_eq!(
            Multiplicity::parse("1-n"),
            Some(Multiplicity {
                min: 1,
                max: None,
                step: 1
            })
        );
        assert_eq!(
            Multiplicity::parse("2-2n"),
            Some(Multiplicity {
                min: 2,
                max: None,
                step: 2
            })
        );
        assert_eq!(
            Multiplicity::parse("1-3"),
            Some(Multiplicity {
                min: 1,
                max: Some(3),
                step: 1
            })
        );
        assert_eq!(Multiplicity::parse("x"), None);
    }

    #[test]
    fn multiplicity_admits() {
        let vm = Multiplicity::parse("2-2n").unwrap();
        assert!(vm.admits(2));
        assert!(vm.admits(4));
        assert!(!vm.admits(3));
        assert!(!vm.admits(0));
        assert!(Multiplicity::exactly(6).admits(6));
        assert!(!Multiplicity::exactly(6).admits(3));
    }
}
