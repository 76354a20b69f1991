//! Parser configuration.
use dwv_dictionary_std::PrivateDictionary;
use dwv_encoding::text::SpecificCharacterSet;

/// The set of options for [`DicomParser`](crate::DicomParser).
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ReadOptions {
    /// Accept buffers without the 128 byte preamble,
    /// with or without the `DICM` magic code.
    pub no_preamble: bool,
    /// Maximum sequence nesting depth.
    pub max_depth: usize,
    /// Maximum number of sequence items in the whole file.
    pub max_items: usize,
    /// Private attributes used to resolve implicit VR private elements.
    pub private_dictionary: PrivateDictionary,
    /// The character set assumed until a Specific Character Set is read.
    pub default_character_set: SpecificCharacterSet,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            no_preamble: false,
            max_depth: 32,
            max_items: 1 << 20,
            private_dictionary: PrivateDictionary::new(),
            default_character_set: SpecificCharacterSet::Default,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_preamble(mut self, no_preamble: bool) -> Self {
        self.no_preamble = no_preamble;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn private_dictionary(mut self, dictionary: PrivateDictionary) -> Self {
        self.private_dictionary = dictionary;
        self
    }

    pub fn default_character_set(mut self, charset: SpecificCharacterSet) -> Self {
        self.default_character_set = charset;
        self
    }
}
