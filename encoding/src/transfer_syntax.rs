//! Transfer syntax descriptors and the registry of known transfer syntaxes.
//!
//! A transfer syntax fixes the byte order, whether value representations
//! are written explicitly, and whether the pixel data is encapsulated.
//! Only syntaxes whose data set can be read without decompressing the
//! whole stream are supported; compressed pixel data is kept as fragments.
use byteordered::Endianness;
use dwv_dictionary_std::uids;

/// How the data of a transfer syntax is transformed.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum Codec {
    /// Native pixel data, no transformation.
    None,
    /// Pixel data is encapsulated into fragments,
    /// possibly compressed with an image codec.
    EncapsulatedPixelData,
    /// The whole data set is transformed (e.g. deflated).
    /// Reading such data sets is not supported.
    Dataset,
}

/// A DICOM transfer syntax specifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TransferSyntax {
    uid: &'static str,
    name: &'static str,
    byte_order: Endianness,
    explicit_vr: bool,
    codec: Codec,
}

impl TransferSyntax {
    pub const fn new(
        uid: &'static str,
        name: &'static str,
        byte_order: Endianness,
        explicit_vr: bool,
        codec: Codec,
    ) -> Self {
        TransferSyntax {
            uid,
            name,
            byte_order,
            explicit_vr,
            codec,
        }
    }

    /// The unique identifier, without padding.
    pub const fn uid(&self) -> &'static str {
        self.uid
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn endianness(&self) -> Endianness {
        self.byte_order
    }

    pub const fn is_explicit_vr(&self) -> bool {
        self.explicit_vr
    }

    pub const fn codec(&self) -> Codec {
        self.codec
    }

    /// Whether pixel data is stored as a sequence of fragments.
    pub fn is_encapsulated(&self) -> bool {
        self.codec == Codec::EncapsulatedPixelData
    }

    /// Whether data sets in this transfer syntax can be read and written.
    pub fn is_supported(&self) -> bool {
        self.codec != Codec::Dataset
    }
}

/// Implicit VR Little Endian, the default transfer syntax.
pub const IMPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax::new(
    uids::IMPLICIT_VR_LITTLE_ENDIAN,
    "Implicit VR Little Endian",
    Endianness::Little,
    false,
    Codec::None,
);

/// Explicit VR Little Endian, the transfer syntax of the file meta group.
pub const EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax::new(
    uids::EXPLICIT_VR_LITTLE_ENDIAN,
    "Explicit VR Little Endian",
    Endianness::Little,
    true,
    Codec::None,
);

pub const EXPLICIT_VR_BIG_ENDIAN: TransferSyntax = TransferSyntax::new(
    uids::EXPLICIT_VR_BIG_ENDIAN,
    "Explicit VR Big Endian",
    Endianness::Big,
    true,
    Codec::None,
);

pub const ENCAPSULATED_UNCOMPRESSED_EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax =
    TransferSyntax::new(
        uids::ENCAPSULATED_UNCOMPRESSED_EXPLICIT_VR_LITTLE_ENDIAN,
        "Encapsulated Uncompressed Explicit VR Little Endian",
        Endianness::Little,
        true,
        Codec::EncapsulatedPixelData,
    );

pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax::new(
    uids::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
    "Deflated Explicit VR Little Endian",
    Endianness::Little,
    true,
    Codec::Dataset,
);

macro_rules! encapsulated {
    ($uid: expr, $name: literal) => {
        TransferSyntax::new($uid, $name, Endianness::Little, true, Codec::EncapsulatedPixelData)
    };
}

static REGISTRY: &[TransferSyntax] = &[
    IMPLICIT_VR_LITTLE_ENDIAN,
    EXPLICIT_VR_LITTLE_ENDIAN,
    EXPLICIT_VR_BIG_ENDIAN,
    ENCAPSULATED_UNCOMPRESSED_EXPLICIT_VR_LITTLE_ENDIAN,
    DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
    encapsulated!(uids::JPEG_BASELINE8_BIT, "JPEG Baseline (Process 1)"),
    encapsulated!(uids::JPEG_EXTENDED12_BIT, "JPEG Extended (Process 2 & 4)"),
    encapsulated!(uids::JPEG_LOSSLESS, "JPEG Lossless, Non-Hierarchical (Process 14)"),
    encapsulated!(
        uids::JPEG_LOSSLESS_SV1,
        "JPEG Lossless, Non-Hierarchical, First-Order Prediction"
    ),
    encapsulated!(uids::JPEG_LS_LOSSLESS, "JPEG-LS Lossless"),
    encapsulated!(uids::JPEG_LS_NEAR_LOSSLESS, "JPEG-LS Lossy (Near-Lossless)"),
    encapsulated!(uids::JPEG2000_LOSSLESS, "JPEG 2000 (Lossless Only)"),
    encapsulated!(uids::JPEG2000, "JPEG 2000"),
    encapsulated!(uids::RLE_LOSSLESS, "RLE Lossless"),
];

/// Trait for a container of transfer syntax specifiers.
pub trait TransferSyntaxIndex {
    /// Obtain the transfer syntax with the given UID,
    /// ignoring trailing padding.
    fn get(&self, uid: &str) -> Option<&'static TransferSyntax>;
}

/// The registry of all transfer syntaxes known to this crate.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct TransferSyntaxRegistry;

impl TransferSyntaxRegistry {
    pub fn iter(&self) -> impl Iterator<Item = &'static TransferSyntax> {
        REGISTRY.iter()
    }
}

impl TransferSyntaxIndex for TransferSyntaxRegistry {
    fn get(&self, uid: &str) -> Option<&'static TransferSyntax> {
        let uid = uid.trim_end_matches(|c: char| c == '\0' || c == ' ');
        REGISTRY.iter().find(|ts| ts.uid == uid)
    }
}

/// Shorthand for looking up a transfer syntax in [`TransferSyntaxRegistry`].
pub fn get(uid: &str) -> Option<&'static TransferSyntax> {
    TransferSyntaxRegistry.get(uid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.840.10008.1.2", false, Endianness::Little, false)]
    #[case("1.2.840.10008.1.2.1\0", true, Endianness::Little, false)]
    #[case("1.2.840.10008.1.2.2", true, Endianness::Big, false)]
    #[case("1.2.840.10008.1.2.4.50", true, Endianness::Little, true)]
    #[case("1.2.840.10008.1.2.4.91 ", true, Endianness::Little, true)]
    #[case("1.2.840.10008.1.2.5", true, Endianness::Little, true)]
    #[case("1.2.840.10008.1.2.1.98", true, Endianness::Little, true)]
    fn known_syntaxes(
        #[case] uid: &str,
        #[case] explicit: bool,
        #[case] endianness: Endianness,
        #[case] encapsulated: bool,
    ) {
        let ts = get(uid).expect("transfer syntax should be known");
        assert_eq!(ts.is_explicit_vr(), explicit);
        assert_eq!(ts.endianness(), endianness);
        assert_eq!(ts.is_encapsulated(), encapsulated);
        assert!(ts.is_supported());
    }

    #[test]
    fn deflate_and_unknown() {
        let deflated = get("1.2.840.10008.1.2.1.99").expect("deflate is known");
        assert!(!deflated.is_supported());
        assert_eq!(get("1.2.3.4"), None);
        assert_eq!(get(""), None);
    }
}
