//! The DICOM file encoder.
use super::rules::WriteRules;
use crate::error::*;
use crate::meta::FileMetaTable;
use crate::read::ParsedFile;
use dwv_core::value::{DataSetSequence, PixelFragmentSequence, Value};
use dwv_core::{DataElement, DataSet, Header, Length, Tag, VR};
use dwv_dictionary_std::tags;
use dwv_encoding::encode;
use dwv_encoding::text::SpecificCharacterSet;
use dwv_encoding::transfer_syntax::{self, TransferSyntax};
use dwv_encoding::{ByteWriter, Endianness};
use snafu::{ensure, OptionExt, ResultExt};
use tracing::debug;

/// How sequence and item lengths are written.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub enum SequenceLength {
    /// Keep the choice made in the source.
    #[default]
    Preserve,
    /// Always write explicit lengths.
    Defined,
    /// Always write undefined lengths with delimiters.
    Undefined,
}

/// The set of options for [`DicomWriter`].
#[derive(Debug, Default, Clone)]
#[non_exhaustive]
pub struct WriteOptions {
    /// Write in this transfer syntax instead of the source's.
    pub transfer_syntax: Option<String>,
    /// Write private sequences as `UN` with undefined length,
    /// their content in Implicit VR Little Endian.
    pub use_un_vr_for_private_sq: bool,
    /// Length mode of sequences and items.
    pub undefined_length_sequences: SequenceLength,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfer_syntax(mut self, uid: impl Into<String>) -> Self {
        self.transfer_syntax = Some(uid.into());
        self
    }

    pub fn use_un_vr_for_private_sq(mut self, value: bool) -> Self {
        self.use_un_vr_for_private_sq = value;
        self
    }

    pub fn undefined_length_sequences(mut self, mode: SequenceLength) -> Self {
        self.undefined_length_sequences = mode;
        self
    }
}

/// An encoder of DICOM files.
///
/// Write rules are applied to the main data set,
/// never to the file meta group.
/// Group lengths are always recomputed.
#[derive(Debug, Clone, Default)]
pub struct DicomWriter {
    rules: WriteRules,
    options: WriteOptions,
}

impl DicomWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, rules: WriteRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn rules(&self) -> &WriteRules {
        &self.rules
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Encode a parsed file, in its own transfer syntax
    /// unless the options say otherwise.
    pub fn write(&self, file: &ParsedFile) -> Result<Vec<u8>> {
        self.write_parts(&file.meta, &file.dataset, file.transfer_syntax)
    }

    /// Encode a file from its parts.
    pub fn write_parts(
        &self,
        meta: &FileMetaTable,
        dataset: &DataSet,
        source_ts: &'static TransferSyntax,
    ) -> Result<Vec<u8>> {
        let ts = match &self.options.transfer_syntax {
            Some(uid) => transfer_syntax::get(uid)
                .filter(|ts| ts.is_supported())
                .context(UnsupportedTransferSyntaxSnafu { uid: uid.as_str() })?,
            None => source_ts,
        };
        debug!("Writing data set in {} ({})", ts.name(), ts.uid());

        let dataset = self.rules.apply(dataset);

        let mut out = ByteWriter::new(Endianness::Little);
        out.write_bytes(&[0; 128]);
        out.write_bytes(b"DICM");

        // the meta group is always Explicit VR Little Endian
        let meta_encoder = Encoder {
            explicit_vr: true,
            endianness: Endianness::Little,
            ts,
            force_undefined: false,
            options: &self.options,
        };
        let mut meta_body = ByteWriter::new(Endianness::Little);
        meta_encoder.write_elements(
            &mut meta_body,
            meta.elements_for(ts.uid()).iter(),
            SpecificCharacterSet::Default,
        )?;
        encode::encode_explicit_header(
            &mut out,
            tags::FILE_META_INFORMATION_GROUP_LENGTH,
            VR::UL,
            4,
        )
        .context(EncodeElementSnafu {
            tag: tags::FILE_META_INFORMATION_GROUP_LENGTH,
        })?;
        out.write_u32(meta_body.position() as u32);
        out.write_bytes(meta_body.as_slice());

        let encoder = Encoder {
            explicit_vr: ts.is_explicit_vr(),
            endianness: ts.endianness(),
            ts,
            force_undefined: false,
            options: &self.options,
        };
        let mut body = ByteWriter::new(ts.endianness());
        encoder.write_elements(&mut body, dataset.iter(), SpecificCharacterSet::Default)?;
        out.write_bytes(body.as_slice());
        Ok(out.into_inner())
    }
}

/// The encoding state of a data set or sequence item.
#[derive(Copy, Clone)]
struct Encoder<'o> {
    explicit_vr: bool,
    endianness: Endianness,
    ts: &'static TransferSyntax,
    /// write every sequence and item with undefined length
    force_undefined: bool,
    options: &'o WriteOptions,
}

impl<'o> Encoder<'o> {
    fn header(&self, writer: &mut ByteWriter, tag: Tag, vr: VR, len: u32) -> Result<usize> {
        if self.explicit_vr {
            encode::encode_explicit_header(writer, tag, vr, len).context(EncodeElementSnafu { tag })
        } else {
            Ok(encode::encode_implicit_header(writer, tag, len))
        }
    }

    /// Write a list of elements, recomputing group lengths.
    fn write_elements<'e>(
        &self,
        writer: &mut ByteWriter,
        elements: impl IntoIterator<Item = &'e DataElement>,
        mut charset: SpecificCharacterSet,
    ) -> Result<()> {
        // group length tag, position of its value, position after the value
        let mut pending: Option<(Tag, usize, usize)> = None;

        for element in elements {
            let tag = element.tag();
            if let Some((length_tag, value_pos, start)) = pending {
                if length_tag.0 != tag.0 {
                    patch_group_length(writer, length_tag, value_pos, start)?;
                    pending = None;
                }
            }

            if tag.is_group_length() {
                self.header(writer, tag, VR::UL, 4)?;
                let value_pos = writer.position();
                writer.write_u32(0);
                pending = Some((tag, value_pos, writer.position()));
                continue;
            }

            self.write_element(writer, element, charset)?;

            if tag == tags::SPECIFIC_CHARACTER_SET {
                let terms = element
                    .to_multi_str()
                    .map(|t| t.into_owned())
                    .unwrap_or_default();
                charset = SpecificCharacterSet::from_codes(&terms).0;
            }
        }
        if let Some((length_tag, value_pos, start)) = pending {
            patch_group_length(writer, length_tag, value_pos, start)?;
        }
        Ok(())
    }

    fn write_element(
        &self,
        writer: &mut ByteWriter,
        element: &DataElement,
        charset: SpecificCharacterSet,
    ) -> Result<()> {
        let tag = element.tag();
        match element.value() {
            Value::Primitive(value) => {
                ensure!(
                    !(tag == tags::PIXEL_DATA && self.ts.is_encapsulated()),
                    IncompatibleTransferSyntaxSnafu {
                        what: "native pixel data",
                        uid: self.ts.uid(),
                    }
                );
                let bytes = encode::primitive_bytes(tag, element.vr(), value, self.endianness, charset)
                    .context(EncodeElementSnafu { tag })?;
                self.header(writer, tag, element.vr(), bytes.len() as u32)?;
                writer.write_bytes(&bytes);
            }
            Value::Sequence(sequence) => {
                self.write_sequence(writer, element, sequence, charset)?;
            }
            Value::PixelSequence(sequence) => {
                self.write_fragments(writer, element, sequence)?;
            }
        }
        Ok(())
    }

    fn write_sequence(
        &self,
        writer: &mut ByteWriter,
        element: &DataElement,
        sequence: &DataSetSequence,
        charset: SpecificCharacterSet,
    ) -> Result<()> {
        let tag = element.tag();
        let as_un = self.explicit_vr
            && (element.vr() == VR::UN
                || (self.options.use_un_vr_for_private_sq && tag.is_private()));

        let (inner, vr) = if as_un {
            let inner = Encoder {
                explicit_vr: false,
                endianness: Endianness::Little,
                force_undefined: true,
                ..*self
            };
            (inner, VR::UN)
        } else {
            (*self, element.vr())
        };

        let undefined = inner.force_undefined
            || match self.options.undefined_length_sequences {
                SequenceLength::Preserve => sequence.length().is_undefined(),
                SequenceLength::Defined => false,
                SequenceLength::Undefined => true,
            };

        let mut body = ByteWriter::new(inner.endianness);
        for item in sequence.items() {
            let mut item_body = ByteWriter::new(inner.endianness);
            inner.write_elements(&mut item_body, item.iter(), charset)?;
            if undefined {
                encode::encode_item_header(&mut body, Tag::ITEM, Length::UNDEFINED.0);
                body.write_bytes(item_body.as_slice());
                encode::encode_item_header(&mut body, Tag::ITEM_DELIMITER, 0);
            } else {
                encode::encode_item_header(&mut body, Tag::ITEM, item_body.position() as u32);
                body.write_bytes(item_body.as_slice());
            }
        }

        if undefined {
            self.header(writer, tag, vr, Length::UNDEFINED.0)?;
            writer.write_bytes(body.as_slice());
            encode::encode_item_header(writer, Tag::SEQUENCE_DELIMITER, 0);
        } else {
            self.header(writer, tag, vr, body.position() as u32)?;
            writer.write_bytes(body.as_slice());
        }
        Ok(())
    }

    fn write_fragments(
        &self,
        writer: &mut ByteWriter,
        element: &DataElement,
        sequence: &PixelFragmentSequence,
    ) -> Result<()> {
        ensure!(
            self.ts.is_encapsulated(),
            IncompatibleTransferSyntaxSnafu {
                what: "encapsulated pixel data",
                uid: self.ts.uid(),
            }
        );
        self.header(writer, element.tag(), element.vr(), Length::UNDEFINED.0)?;

        let table = sequence.offset_table();
        encode::encode_item_header(writer, Tag::ITEM, (table.len() * 4) as u32);
        for offset in table {
            writer.write_u32(*offset);
        }
        for fragment in sequence.fragments() {
            let padded_len = fragment.len() + fragment.len() % 2;
            encode::encode_item_header(writer, Tag::ITEM, padded_len as u32);
            writer.write_bytes(fragment);
            if padded_len > fragment.len() {
                writer.write_u8(0);
            }
        }
        encode::encode_item_header(writer, Tag::SEQUENCE_DELIMITER, 0);
        Ok(())
    }
}

/// Set a group length value to the number of bytes written since `start`.
fn patch_group_length(
    writer: &mut ByteWriter,
    tag: Tag,
    value_pos: usize,
    start: usize,
) -> Result<()> {
    let len = (writer.position() - start) as u32;
    writer
        .set_u32_at(value_pos, len)
        .map_err(|source| encode::Error::PatchLength { tag, source })
        .context(EncodeElementSnafu { tag })
}
