//! Text values and the Specific Character Set (0008,0005).
//!
//! Only LO, LT, PN, SH, ST, UC and UT values follow the character set
//! of the data set, other text always uses the default repertoire.
//! [`SpecificCharacterSet`] lists the supported sets.

use encoding::all::{
    GB18030, GBK, ISO_8859_1, ISO_8859_2, ISO_8859_3, ISO_8859_4, ISO_8859_5, ISO_8859_6,
    ISO_8859_7, ISO_8859_8, UTF_8, WINDOWS_1254, WINDOWS_31J, WINDOWS_874,
};
use encoding::{DecoderTrap, EncoderTrap, EncodingRef};
use snafu::{Backtrace, Snafu};
use std::borrow::Cow;

/// Text which the character set cannot represent.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum EncodeTextError {
    #[snafu(display("cannot encode text in {}: {}", charset, message))]
    Unmappable {
        charset: &'static str,
        message: Cow<'static, str>,
        backtrace: Backtrace,
    },
}

/// Bytes which the character set cannot turn into text.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum DecodeTextError {
    #[snafu(display("cannot decode text in {}: {}", charset, message))]
    Undecodable {
        charset: &'static str,
        message: Cow<'static, str>,
        backtrace: Backtrace,
    },
}

/// Conversion between text values and their bytes.
///
/// Multiple values stay joined by `\` in both directions.
pub trait TextCodec {
    /// The defined term of (0008,0005) naming this codec, without padding.
    fn name(&self) -> &'static str;

    fn decode(&self, text: &[u8]) -> Result<String, DecodeTextError>;

    fn encode(&self, text: &str) -> Result<Vec<u8>, EncodeTextError>;
}

impl<T: TextCodec + ?Sized> TextCodec for &T {
    fn name(&self) -> &'static str {
        T::name(self)
    }

    fn decode(&self, text: &[u8]) -> Result<String, DecodeTextError> {
        T::decode(self, text)
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, EncodeTextError> {
        T::encode(self, text)
    }
}

/// The supported character sets.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum SpecificCharacterSet {
    /// ISO-IR 6, the default repertoire
    #[default]
    Default,
    /// ISO-IR 100 (ISO-8859-1), Western Europe
    IsoIr100,
    /// ISO-IR 101 (ISO-8859-2), Central and Eastern Europe
    IsoIr101,
    /// ISO-IR 109 (ISO-8859-3), South Europe
    IsoIr109,
    /// ISO-IR 110 (ISO-8859-4), North Europe
    IsoIr110,
    /// ISO-IR 144 (ISO-8859-5), Cyrillic
    IsoIr144,
    /// ISO-IR 127 (ISO-8859-6), Arabic
    IsoIr127,
    /// ISO-IR 126 (ISO-8859-7), Greek
    IsoIr126,
    /// ISO-IR 138 (ISO-8859-8), Hebrew
    IsoIr138,
    /// ISO-IR 148 (ISO-8859-9), Turkish
    IsoIr148,
    /// ISO-IR 13 (JIS X 0201), katakana and romaji
    IsoIr13,
    /// ISO-IR 166 (TIS 620-2533), Thai
    IsoIr166,
    /// ISO-IR 192, UTF-8
    IsoIr192,
    /// GB18030, Simplified Chinese
    Gb18030,
    /// GBK, the two byte subset of GB18030
    Gbk,
}

/// Each set with its defined term, as the IR number when one exists.
const TERMS: [(SpecificCharacterSet, &str); 15] = [
    (SpecificCharacterSet::Default, "ISO_IR 6"),
    (SpecificCharacterSet::IsoIr100, "ISO_IR 100"),
    (SpecificCharacterSet::IsoIr101, "ISO_IR 101"),
    (SpecificCharacterSet::IsoIr109, "ISO_IR 109"),
    (SpecificCharacterSet::IsoIr110, "ISO_IR 110"),
    (SpecificCharacterSet::IsoIr144, "ISO_IR 144"),
    (SpecificCharacterSet::IsoIr127, "ISO_IR 127"),
    (SpecificCharacterSet::IsoIr126, "ISO_IR 126"),
    (SpecificCharacterSet::IsoIr138, "ISO_IR 138"),
    (SpecificCharacterSet::IsoIr148, "ISO_IR 148"),
    (SpecificCharacterSet::IsoIr13, "ISO_IR 13"),
    (SpecificCharacterSet::IsoIr166, "ISO_IR 166"),
    (SpecificCharacterSet::IsoIr192, "ISO_IR 192"),
    (SpecificCharacterSet::Gb18030, "GB18030"),
    (SpecificCharacterSet::Gbk, "GBK"),
];

fn trim_padding(code: &str) -> &str {
    code.trim_matches(|c: char| c == ' ' || c == '\0')
}

impl SpecificCharacterSet {
    /// Look up a defined term of (0008,0005).
    ///
    /// `ISO_IR nnn`, `ISO_IR_nnn` and the ISO 2022 form `ISO 2022 IR nnn`
    /// are all accepted, except for UTF-8 which has no ISO 2022 form.
    /// An empty term is the default repertoire.
    ///
    /// ```
    /// # use dwv_encoding::text::SpecificCharacterSet;
    /// assert_eq!(
    ///     SpecificCharacterSet::from_code("ISO_IR 100"),
    ///     Some(SpecificCharacterSet::IsoIr100)
    /// );
    /// assert_eq!(
    ///     SpecificCharacterSet::from_code("ISO 2022 IR 126"),
    ///     Some(SpecificCharacterSet::IsoIr126)
    /// );
    /// ```
    pub fn from_code(code: &str) -> Option<Self> {
        let code = trim_padding(code);
        if code.is_empty() || code == "Default" {
            return Some(SpecificCharacterSet::Default);
        }
        let ir_number = code
            .strip_prefix("ISO_IR ")
            .or_else(|| code.strip_prefix("ISO_IR_"))
            .or_else(|| code.strip_prefix("ISO 2022 IR ").filter(|n| *n != "192"));
        TERMS
            .iter()
            .find(|(_, term)| match ir_number {
                Some(n) => term.strip_prefix("ISO_IR ") == Some(n),
                None => *term == code,
            })
            .map(|(charset, _)| *charset)
    }

    /// Resolve the character set from all values of (0008,0005).
    ///
    /// The first recognised term wins,
    /// empty values (the ISO 2022 default) are skipped.
    /// Unrecognised terms come back alongside the result,
    /// which is [`SpecificCharacterSet::Default`] if nothing was recognised.
    pub fn from_codes<I, S>(codes: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unknown = Vec::new();
        let mut found = None;
        for code in codes {
            let code = trim_padding(code.as_ref());
            if code.is_empty() {
                continue;
            }
            match SpecificCharacterSet::from_code(code) {
                Some(charset) => {
                    found.get_or_insert(charset);
                }
                None => unknown.push(code.to_string()),
            }
        }
        (found.unwrap_or_default(), unknown)
    }

    fn encoding(self) -> EncodingRef {
        use SpecificCharacterSet::*;
        match self {
            // ISO 8859-1 is a superset of the default repertoire
            Default | IsoIr100 => ISO_8859_1,
            IsoIr101 => ISO_8859_2,
            IsoIr109 => ISO_8859_3,
            IsoIr110 => ISO_8859_4,
            IsoIr144 => ISO_8859_5,
            IsoIr127 => ISO_8859_6,
            IsoIr126 => ISO_8859_7,
            IsoIr138 => ISO_8859_8,
            // same printable characters as ISO 8859-9
            IsoIr148 => WINDOWS_1254,
            // single byte range of Shift_JIS
            IsoIr13 => WINDOWS_31J,
            // superset of TIS 620
            IsoIr166 => WINDOWS_874,
            IsoIr192 => UTF_8,
            Gb18030 => GB18030,
            Gbk => GBK,
        }
    }
}

impl TextCodec for SpecificCharacterSet {
    fn name(&self) -> &'static str {
        TERMS
            .iter()
            .find(|(charset, _)| charset == self)
            .map_or("ISO_IR 6", |(_, term)| *term)
    }

    fn decode(&self, text: &[u8]) -> Result<String, DecodeTextError> {
        self.encoding()
            .decode(text, DecoderTrap::Replace)
            .map_err(|message| {
                UndecodableSnafu {
                    charset: self.name(),
                    message,
                }
                .build()
            })
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, EncodeTextError> {
        self.encoding()
            .encode(text, EncoderTrap::Strict)
            .map_err(|message| {
                UnmappableSnafu {
                    charset: self.name(),
                    message,
                }
                .build()
            })
    }
}
