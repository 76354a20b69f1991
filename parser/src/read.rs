//! The DICOM file decoder.
//!
//! [`DicomParser`] reads a whole file held in memory
//! into a [`FileMetaTable`] and a [`DataSet`].
//! Sequences and encapsulated pixel data are read by recursive descent,
//! bounded by the nesting depth and item count limits
//! of [`ReadOptions`].
use crate::error::*;
use crate::meta::FileMetaTable;
use crate::options::ReadOptions;
use dwv_core::header::{DataElementHeader, Length, SequenceItemHeader};
use dwv_core::value::{DataSetSequence, PixelFragmentSequence, Value, C};
use dwv_core::{DataDictionary, DataDictionaryEntry, DataElement, DataSet, Header, Tag, VR};
use dwv_dictionary_std::{tags, StandardDataDictionary};
use dwv_encoding::decode::{self, ExplicitHeader, RawHeader};
use dwv_encoding::text::SpecificCharacterSet;
use dwv_encoding::transfer_syntax::{self, TransferSyntax};
use dwv_encoding::{ByteCursor, Endianness};
use snafu::{ensure, OptionExt, ResultExt};
use std::ops::Range;
use tracing::{debug, trace, warn};

const PREAMBLE_LEN: usize = 128;
const MAGIC_CODE: &[u8; 4] = b"DICM";

/// The outcome of a successful parse.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// the file meta group
    pub meta: FileMetaTable,
    /// the main data set
    pub dataset: DataSet,
    /// the transfer syntax of the main data set
    pub transfer_syntax: &'static TransferSyntax,
    /// the character set in effect at the end of the main data set
    pub character_set: SpecificCharacterSet,
    /// recoverable conditions met while parsing
    pub warnings: Vec<Warning>,
}

impl ParsedFile {
    /// Retrieve an element of the meta group or of the main data set.
    pub fn element(&self, tag: Tag) -> Option<&DataElement> {
        if tag.0 == 0x0002 {
            self.meta.data_set().element(tag)
        } else {
            self.dataset.element(tag)
        }
    }

    /// Retrieve an element by its 8 character key, such as `"00280010"`.
    pub fn element_by_key(&self, key: &str) -> Option<&DataElement> {
        Tag::from_key(key).and_then(|tag| self.element(tag))
    }

    /// Iterate over all elements, meta group first, in decoding order.
    pub fn elements(&self) -> impl Iterator<Item = &DataElement> {
        self.meta.data_set().iter().chain(self.dataset.iter())
    }
}

/// A decoder of DICOM files.
///
/// The parser holds no state between calls,
/// so the same instance may be used for any number of buffers.
#[derive(Debug, Clone, Default)]
pub struct DicomParser {
    options: ReadOptions,
}

impl DicomParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ReadOptions) -> Self {
        DicomParser { options }
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Decode a whole DICOM file.
    ///
    /// Either the full file is decoded,
    /// or an error is returned and nothing is kept.
    pub fn parse(&self, data: &[u8]) -> Result<ParsedFile> {
        let start = self.locate_start(data)?;
        let mut reader = Reader::new(data, &self.options);
        let mut cursor = ByteCursor::new(data, Endianness::Little);
        cursor.seek(start).ok().context(MissingMagicCodeSnafu {
            offset: PREAMBLE_LEN,
        })?;

        let meta = if peek_tag(&cursor).map(|t| t.0) == Some(0x0002) {
            reader.read_meta(&mut cursor)?
        } else {
            ensure!(
                self.options.no_preamble,
                MissingMetaGroupSnafu { offset: start }
            );
            FileMetaTable::default()
        };

        let transfer_syntax = match meta.transfer_syntax() {
            Some(uid) => transfer_syntax::get(uid)
                .filter(|ts| ts.is_supported())
                .context(UnsupportedTransferSyntaxSnafu { uid })?,
            None => {
                reader.warn(Warning::MissingTransferSyntax);
                &transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN
            }
        };
        debug!(
            "Reading data set in {} ({})",
            transfer_syntax.name(),
            transfer_syntax.uid()
        );

        reader.explicit_vr = transfer_syntax.is_explicit_vr();
        cursor.set_endianness(transfer_syntax.endianness());
        reader.charset = self.options.default_character_set;
        let dataset = reader.read_data_set(&mut cursor, Until::End, 0)?;

        Ok(ParsedFile {
            meta,
            dataset,
            transfer_syntax,
            character_set: reader.charset,
            warnings: reader.warnings,
        })
    }

    /// Find the offset of the first element.
    fn locate_start(&self, data: &[u8]) -> Result<usize> {
        let magic_at = |offset: usize| data.get(offset..offset + 4) == Some(&MAGIC_CODE[..]);
        if magic_at(PREAMBLE_LEN) {
            return Ok(PREAMBLE_LEN + 4);
        }
        ensure!(
            self.options.no_preamble,
            MissingMagicCodeSnafu {
                offset: PREAMBLE_LEN
            }
        );
        if magic_at(0) {
            Ok(4)
        } else {
            Ok(0)
        }
    }
}

/// Peek at the next tag without moving the cursor.
fn peek_tag(cursor: &ByteCursor) -> Option<Tag> {
    let mut probe = cursor.clone();
    decode::decode_tag(&mut probe).ok()
}

/// Take the value bytes of an item whose bounds were already checked.
fn read_item_bytes<'d>(
    cursor: &mut ByteCursor<'d>,
    range: Range<usize>,
    offset: usize,
) -> Result<&'d [u8]> {
    cursor
        .read_bytes(range.len())
        .map_err(|source| decode::Error::ReadValue {
            tag: Tag::ITEM,
            source,
        })
        .context(ReadValueSnafu {
            tag: Tag::ITEM,
            offset,
        })
}

/// Where a data set ends.
#[derive(Debug, Copy, Clone, PartialEq)]
enum Until {
    /// the end of the buffer
    End,
    /// an absolute offset, for defined length items
    Offset(usize),
    /// an item delimiter, for undefined length items
    ItemDelimiter,
    /// the first element of another group
    GroupChange(u16),
}

/// The decoding state of a single parse.
struct Reader<'a> {
    data: &'a [u8],
    options: &'a ReadOptions,
    explicit_vr: bool,
    charset: SpecificCharacterSet,
    bits_allocated: u16,
    items: usize,
    warnings: Vec<Warning>,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], options: &'a ReadOptions) -> Self {
        Reader {
            data,
            options,
            explicit_vr: true,
            charset: SpecificCharacterSet::Default,
            bits_allocated: 0,
            items: 0,
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Read the file meta group, always in Explicit VR Little Endian.
    fn read_meta(&mut self, cursor: &mut ByteCursor) -> Result<FileMetaTable> {
        self.explicit_vr = true;
        self.charset = SpecificCharacterSet::Default;

        let mut elements = DataSet::new();
        let mut declared = None;
        let until = if peek_tag(cursor) == Some(tags::FILE_META_INFORMATION_GROUP_LENGTH) {
            let group_length = self.read_element(cursor, 0)?;
            let len: u32 = group_length
                .to_int()
                .ok()
                .context(BadMetaGroupLengthSnafu { len: 0_u32 })?;
            let end = cursor.position().saturating_add(len as usize);
            ensure!(end <= self.data.len(), BadMetaGroupLengthSnafu { len });
            elements.put(group_length);
            declared = Some(len);
            Until::Offset(end)
        } else {
            Until::GroupChange(0x0002)
        };

        let rest = self.read_data_set(cursor, until, 0)?;
        if let (Until::Offset(end), Some(len)) = (until, declared) {
            ensure!(cursor.position() == end, BadMetaGroupLengthSnafu { len });
        }
        elements.extend(rest);
        trace!("Read {} meta elements", elements.len());
        Ok(FileMetaTable::from_data_set(elements))
    }

    /// Read elements into a new data set until the given end.
    fn read_data_set(
        &mut self,
        cursor: &mut ByteCursor,
        until: Until,
        depth: usize,
    ) -> Result<DataSet> {
        let mut dataset = DataSet::new();
        loop {
            match until {
                Until::End => {
                    if cursor.is_at_end() {
                        break;
                    }
                    let remaining = cursor.remaining();
                    if remaining < 8 && cursor.data()[cursor.position()..].iter().all(|b| *b == 0)
                    {
                        self.warn(Warning::TrailingBytes {
                            offset: cursor.position(),
                            len: remaining,
                        });
                        break;
                    }
                }
                Until::Offset(end) => {
                    if cursor.position() >= end {
                        break;
                    }
                }
                Until::ItemDelimiter => {}
                Until::GroupChange(group) => {
                    if peek_tag(cursor).map(|t| t.0) != Some(group) {
                        break;
                    }
                }
            }

            let offset = cursor.position();
            if until == Until::ItemDelimiter && cursor.is_at_end() {
                return MissingDelimiterSnafu {
                    tag: Tag::ITEM,
                    offset,
                }
                .fail();
            }

            let header = self.read_header(cursor)?;
            match header.tag {
                Tag::ITEM_DELIMITER if until == Until::ItemDelimiter => break,
                tag @ (Tag::ITEM | Tag::ITEM_DELIMITER | Tag::SEQUENCE_DELIMITER) => {
                    return UnexpectedItemSnafu { tag, offset }.fail();
                }
                _ => {}
            }

            let element = self.read_body(cursor, header, offset, depth)?;
            self.observe(&element);
            dataset.put(element);
        }
        Ok(dataset)
    }

    /// Read a whole element, header included.
    fn read_element(&mut self, cursor: &mut ByteCursor, depth: usize) -> Result<DataElement> {
        let offset = cursor.position();
        let header = self.read_header(cursor)?;
        self.read_body(cursor, header, offset, depth)
    }

    /// Keep track of the elements which affect how the rest is read.
    fn observe(&mut self, element: &DataElement) {
        match element.tag() {
            tags::SPECIFIC_CHARACTER_SET => {
                let terms = element
                    .to_multi_str()
                    .map(|t| t.into_owned())
                    .unwrap_or_default();
                let (charset, unknown) = SpecificCharacterSet::from_codes(&terms);
                for term in unknown {
                    self.warn(Warning::CharacterSet { term });
                }
                debug!("Using character set {:?}", charset);
                self.charset = charset;
            }
            tags::BITS_ALLOCATED => {
                if let Ok(bits) = element.to_int::<u16>() {
                    self.bits_allocated = bits;
                }
            }
            _ => {}
        }
    }

    /// Read a data element header and resolve its VR.
    fn read_header(&mut self, cursor: &mut ByteCursor) -> Result<RawHeader> {
        let offset = cursor.position();
        if self.explicit_vr {
            match decode::decode_explicit_header(cursor).context(ReadHeaderSnafu { offset })? {
                ExplicitHeader::Header(header) => return Ok(header),
                ExplicitHeader::InvalidVr { tag, code } => {
                    self.warn(Warning::InvalidVrCode { tag, code });
                }
            }
        }
        let mut header =
            decode::decode_implicit_header(cursor).context(ReadHeaderSnafu { offset })?;
        if header.tag.0 != 0xFFFE {
            header.vr = Some(self.implicit_vr(header.tag));
        }
        Ok(header)
    }

    /// Resolve the VR of an implicit VR element.
    fn implicit_vr(&mut self, tag: Tag) -> VR {
        if tag == tags::PIXEL_DATA {
            return if self.bits_allocated > 8 { VR::OW } else { VR::OB };
        }
        if tag.is_private() {
            return match self.options.private_dictionary.by_tag(tag) {
                Some(entry) => entry.vr(),
                None => {
                    debug!("No private dictionary entry for {}, reading as UN", tag);
                    VR::UN
                }
            };
        }
        match StandardDataDictionary.by_tag(tag) {
            Some(entry) => entry.vr(),
            None => {
                self.warn(Warning::UnknownVr { tag });
                VR::UN
            }
        }
    }

    /// Read the value of an element whose header was just read.
    fn read_body(
        &mut self,
        cursor: &mut ByteCursor,
        header: RawHeader,
        offset: usize,
        depth: usize,
    ) -> Result<DataElement> {
        let tag = header.tag;
        let vr = header.vr.unwrap_or(VR::UN);
        let len = header.len;

        let value = if vr == VR::SQ {
            Value::Sequence(self.read_sequence(cursor, tag, len, offset, depth)?)
        } else if len.is_undefined() && tag == tags::PIXEL_DATA {
            Value::PixelSequence(self.read_fragments(cursor, offset)?)
        } else if len.is_undefined() && vr == VR::UN {
            // the content of UN is always Implicit VR Little Endian
            let explicit_vr = std::mem::replace(&mut self.explicit_vr, false);
            let endianness = cursor.endianness();
            cursor.set_endianness(Endianness::Little);
            let sequence = self.read_sequence(cursor, tag, len, offset, depth);
            cursor.set_endianness(endianness);
            self.explicit_vr = explicit_vr;
            Value::Sequence(sequence?)
        } else if len.is_undefined() {
            return UndefinedLengthSnafu { tag, offset }.fail();
        } else {
            let len = len.0;
            let available = cursor.remaining();
            ensure!(
                len as usize <= available,
                ValueOutOfBoundsSnafu {
                    tag,
                    offset,
                    len,
                    available
                }
            );
            if len % 2 == 1 {
                self.warn(Warning::OddValueLength { tag, len });
            }
            let value =
                decode::decode_primitive(cursor, tag, vr, len as usize, self.charset)
                    .context(ReadValueSnafu { tag, offset })?;
            Value::Primitive(value)
        };

        Ok(DataElement::with_header(DataElementHeader::new(tag, vr, len), value)
            .with_span(offset, cursor.position()))
    }

    fn count_item(&mut self, offset: usize) -> Result<()> {
        self.items += 1;
        ensure!(
            self.items <= self.options.max_items,
            TooManyItemsSnafu {
                max_items: self.options.max_items,
                offset
            }
        );
        Ok(())
    }

    /// Read the items of a sequence.
    fn read_sequence(
        &mut self,
        cursor: &mut ByteCursor,
        tag: Tag,
        len: Length,
        offset: usize,
        depth: usize,
    ) -> Result<DataSetSequence> {
        ensure!(
            depth < self.options.max_depth,
            DepthExceededSnafu {
                max_depth: self.options.max_depth,
                offset
            }
        );
        let end = match len.get() {
            Some(len) => Some(self.defined_end(cursor, tag, offset, len)?),
            None => None,
        };

        let mut items = C::new();
        loop {
            let item_offset = cursor.position();
            match end {
                Some(end) if item_offset == end => break,
                Some(end) if item_offset > end => {
                    return InconsistentItemEndSnafu {
                        expected: end,
                        actual: item_offset,
                    }
                    .fail()
                }
                None if cursor.is_at_end() => {
                    return MissingDelimiterSnafu { tag, offset }.fail();
                }
                _ => {}
            }

            let item_header = decode::decode_item_header(cursor).context(ReadHeaderSnafu {
                offset: item_offset,
            })?;
            match item_header {
                SequenceItemHeader::Item { len: item_len } => {
                    self.count_item(item_offset)?;
                    // items may declare their own character set and sample format
                    let charset = self.charset;
                    let bits_allocated = self.bits_allocated;
                    let item = match item_len.get() {
                        Some(item_len) => {
                            let item_end =
                                self.defined_end(cursor, Tag::ITEM, item_offset, item_len)?;
                            let item = self.read_data_set(cursor, Until::Offset(item_end), depth + 1)?;
                            ensure!(
                                cursor.position() == item_end,
                                InconsistentItemEndSnafu {
                                    expected: item_end,
                                    actual: cursor.position(),
                                }
                            );
                            item
                        }
                        None => self.read_data_set(cursor, Until::ItemDelimiter, depth + 1)?,
                    };
                    self.charset = charset;
                    self.bits_allocated = bits_allocated;
                    items.push(item);
                }
                SequenceItemHeader::SequenceDelimiter if end.is_none() => break,
                other => {
                    return UnexpectedItemSnafu {
                        tag: other.tag(),
                        offset: item_offset,
                    }
                    .fail();
                }
            }
        }
        Ok(DataSetSequence::new(items, len))
    }

    /// Read the offset table and fragments of encapsulated pixel data.
    fn read_fragments(
        &mut self,
        cursor: &mut ByteCursor,
        offset: usize,
    ) -> Result<PixelFragmentSequence> {
        let mut offset_table: Option<C<u32>> = None;
        let mut fragments = C::new();
        let mut ranges: Vec<Range<usize>> = Vec::new();
        loop {
            let item_offset = cursor.position();
            if cursor.is_at_end() {
                return MissingDelimiterSnafu {
                    tag: tags::PIXEL_DATA,
                    offset,
                }
                .fail();
            }
            let item_header = decode::decode_item_header(cursor).context(ReadHeaderSnafu {
                offset: item_offset,
            })?;
            match item_header {
                SequenceItemHeader::Item { len } => {
                    let len = len.get().context(UndefinedLengthSnafu {
                        tag: Tag::ITEM,
                        offset: item_offset,
                    })?;
                    let start = cursor.position();
                    let end = self.defined_end(cursor, Tag::ITEM, item_offset, len)?;
                    let bytes = read_item_bytes(cursor, start..end, item_offset)?;
                    match offset_table {
                        None => {
                            // the Basic Offset Table is always little endian
                            let mut table = ByteCursor::new(bytes, Endianness::Little);
                            let values = table
                                .read_u32_values(bytes.len() / 4)
                                .map_err(|source| decode::Error::ReadValue {
                                    tag: Tag::ITEM,
                                    source,
                                })
                                .context(ReadValueSnafu {
                                    tag: Tag::ITEM,
                                    offset: item_offset,
                                })?;
                            offset_table = Some(C::from_vec(values));
                        }
                        Some(_) => {
                            self.count_item(item_offset)?;
                            fragments.push(bytes.to_vec());
                            ranges.push(start..end);
                        }
                    }
                }
                SequenceItemHeader::SequenceDelimiter => break,
                SequenceItemHeader::ItemDelimiter => {
                    return UnexpectedItemSnafu {
                        tag: Tag::ITEM_DELIMITER,
                        offset: item_offset,
                    }
                    .fail();
                }
            }
        }
        Ok(PixelFragmentSequence::with_ranges(
            offset_table.unwrap_or_default(),
            fragments,
            ranges,
        ))
    }

    /// The absolute end of a defined length value starting at the cursor.
    fn defined_end(
        &self,
        cursor: &ByteCursor,
        tag: Tag,
        offset: usize,
        len: u32,
    ) -> Result<usize> {
        let available = cursor.remaining();
        ensure!(
            len as usize <= available,
            ValueOutOfBoundsSnafu {
                tag,
                offset,
                len,
                available
            }
        );
        Ok(cursor.position() + len as usize)
    }
}
