//! Human readable listings of parsed DICOM files.
//!
//! Each element is printed on its own line with its tag, keyword, VR,
//! multiplicity, length and byte range, followed by a summary of its value.
//! Sequence items are nested by indentation.
//!
//! # Examples
//!
//! ```no_run
//! use dwv_dump::{ColorMode, DumpOptions};
//! use dwv_parser::DicomParser;
//!
//! let bytes = std::fs::read("path/to/file.dcm")?;
//! let file = DicomParser::new().parse(&bytes)?;
//! let mut options = DumpOptions::new();
//! // dump to stdout (width = 100), nested items down to the first level
//! options.width(100).max_depth(1).dump_file(&file)?;
//! # Result::<(), Box<dyn std::error::Error>>::Ok(())
//! ```
use dwv_core::dictionary::{DataDictionary, DataDictionaryEntry};
use dwv_core::value::{PrimitiveValue, Value as DicomValue};
use dwv_core::{DataElement, DataSet, Header, VrKind, VR};
use dwv_dictionary_std::{uids, StandardDataDictionary};
use dwv_encoding::text::TextCodec;
use dwv_image::Image;
use dwv_parser::{FileMetaTable, ParsedFile, Warning};
use owo_colors::*;
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::io::{stdout, Result as IoResult, Write};
use std::str::FromStr;

/// Options and flags to configure how to dump a parsed DICOM file.
///
/// Once set up,
/// [`dump_file`](DumpOptions::dump_file) or
/// [`dump_file_to`](DumpOptions::dump_file_to)
/// print the file meta group, the main data set and the parser warnings.
/// [`dump_data_set_to`](DumpOptions::dump_data_set_to)
/// works on a bare data set.
#[derive(Debug, Default, Clone, PartialEq)]
#[non_exhaustive]
pub struct DumpOptions {
    pub color: ColorMode,
    /// line width used to cut long values, the terminal's if unset
    pub width: Option<u32>,
    /// print text values in full
    pub no_text_limit: bool,
    /// print every value in full
    pub no_limit: bool,
    /// the deepest sequence level to print items of, all of them if unset
    pub max_depth: Option<u32>,
    /// print the byte range of each element in the file
    pub offsets: bool,
}

impl DumpOptions {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn width(&mut self, width: u32) -> &mut Self {
        self.width = Some(width);
        self
    }

    /// Use the terminal width, or 120 columns when there is no terminal.
    pub fn width_auto(&mut self) -> &mut Self {
        self.width = None;
        self
    }

    pub fn no_text_limit(&mut self, value: bool) -> &mut Self {
        self.no_text_limit = value;
        self
    }

    pub fn no_limit(&mut self, value: bool) -> &mut Self {
        self.no_limit = value;
        self
    }

    /// Only print sequence items down to this nesting level.
    /// Level 0 prints the sequences of the main data set without their items.
    pub fn max_depth(&mut self, depth: u32) -> &mut Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set whether to print the byte range of each element.
    pub fn offsets(&mut self, offsets: bool) -> &mut Self {
        self.offsets = offsets;
        self
    }

    pub fn color_mode(&mut self, color: ColorMode) -> &mut Self {
        self.color = color;
        self
    }

    /// Print the file to standard output,
    /// cutting long values to the line width.
    pub fn dump_file(&self, file: &ParsedFile) -> IoResult<()> {
        self.dump_file_impl(stdout(), file, true)
    }

    /// Print the file to `to`, with every value in full.
    pub fn dump_file_to(&self, to: impl Write, file: &ParsedFile) -> IoResult<()> {
        self.dump_file_impl(to, file, false)
    }

    fn dump_file_impl(&self, mut to: impl Write, file: &ParsedFile, to_stdout: bool) -> IoResult<()> {
        self.set_color_override(to_stdout);
        let printer = self.printer(to_stdout);

        meta_dump(&mut to, &file.meta, file)?;
        writeln!(to, "{:-<58}", "")?;
        printer.dump(&mut to, &file.dataset, 0, 0)?;

        if !file.warnings.is_empty() {
            writeln!(to)?;
            warnings_dump(&mut to, &file.warnings)?;
        }
        Ok(())
    }

    /// Dump the contents of a data set to the given writer.
    pub fn dump_data_set_to(&self, mut to: impl Write, dataset: &DataSet) -> IoResult<()> {
        self.set_color_override(false);
        self.printer(false).dump(&mut to, dataset, 0, 0)
    }

    fn set_color_override(&self, to_stdout: bool) {
        match (self.color, to_stdout) {
            (ColorMode::Never, _) => owo_colors::set_override(false),
            (ColorMode::Always, _) => owo_colors::set_override(true),
            (ColorMode::Auto, false) => owo_colors::set_override(false),
            (ColorMode::Auto, true) => owo_colors::unset_override(),
        }
    }

    fn printer(&self, to_stdout: bool) -> Printer {
        let (no_text_limit, no_limit) = if to_stdout {
            (self.no_text_limit, self.no_limit)
        } else {
            (true, true)
        };
        Printer {
            width: determine_width(self.width),
            no_text_limit,
            no_limit,
            max_depth: self.max_depth,
            offsets: self.offsets,
        }
    }
}

/// When to color the output.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ColorMode {
    /// Color only when writing to a terminal.
    /// [`dump_file_to`](DumpOptions::dump_file_to) output stays plain.
    #[default]
    Auto,
    Never,
    Always,
}

const COLOR_MODE_NAMES: [(&str, ColorMode); 3] = [
    ("auto", ColorMode::Auto),
    ("never", ColorMode::Never),
    ("always", ColorMode::Always),
];

impl Display for ColorMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = COLOR_MODE_NAMES
            .iter()
            .find(|(_, mode)| mode == self)
            .map_or("auto", |(name, _)| *name);
        f.write_str(name)
    }
}

impl FromStr for ColorMode {
    type Err = ColorModeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        COLOR_MODE_NAMES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, mode)| *mode)
            .ok_or(ColorModeError)
    }
}

/// Unrecognized color mode name.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct ColorModeError;

impl Display for ColorModeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("color mode must be one of auto, never or always")
    }
}

impl std::error::Error for ColorModeError {}

/// A printed piece of the dump, styled by what it shows.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Styled<T> {
    Tag(T),
    Keyword(T),
    Number(T),
    Text(T),
    Date(T),
    Invalid(T),
    Empty,
}

impl<T: Display> Display for Styled<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        // keep the requested padding when the style adds escape codes
        fn padded(value: impl Display, f: &mut Formatter) -> fmt::Result {
            match f.width() {
                Some(width) => write!(f, "{:width$}", value, width = width),
                None => write!(f, "{}", value),
            }
        }

        match self {
            Styled::Tag(v) => padded(v.if_supports_color(Stream::Stdout, |v| v.dimmed()), f),
            Styled::Keyword(v) => padded(v.if_supports_color(Stream::Stdout, |v| v.bold()), f),
            Styled::Number(v) => padded(v.if_supports_color(Stream::Stdout, |v| v.cyan()), f),
            Styled::Text(v) => padded(v.if_supports_color(Stream::Stdout, |v| v.yellow()), f),
            Styled::Date(v) => padded(v.if_supports_color(Stream::Stdout, |v| v.green()), f),
            Styled::Invalid(v) => padded(v.if_supports_color(Stream::Stdout, |v| v.red()), f),
            Styled::Empty => padded("(no value)".if_supports_color(Stream::Stdout, |v| v.italic()), f),
        }
    }
}

/// Print a parsed file to standard output with the default options.
pub fn dump_file(file: &ParsedFile) -> IoResult<()> {
    DumpOptions::new().dump_file(file)
}

/// Print a parsed file to `to` with the default options.
pub fn dump_file_to(to: impl Write, file: &ParsedFile) -> IoResult<()> {
    DumpOptions::new().dump_file_to(to, file)
}

/// Print a summary of an image:
/// size, spacing, origin, data range and window presets.
pub fn dump_image_to(mut to: impl Write, image: &Image) -> IoResult<()> {
    let bold = |s: &'static str| s.if_supports_color(Stream::Stdout, |v| v.bold()).to_string();
    let geometry = image.geometry();
    writeln!(to, "{}: {}", bold("Size"), geometry.size())?;
    writeln!(
        to,
        "{}: {}",
        bold("Spacing"),
        join_values(geometry.spacing().values(), None, false)
    )?;
    writeln!(to, "{}: {}", bold("Origin"), geometry.origin())?;
    writeln!(to, "{}: {}", bold("Frames"), image.number_of_frames())?;
    writeln!(
        to,
        "{}: {} ({} component{})",
        bold("Photometric interpretation"),
        image.photometric_interpretation(),
        image.number_of_components(),
        if image.number_of_components() == 1 { "" } else { "s" },
    )?;
    if let Some(range) = image.data_range() {
        writeln!(to, "{}: [{}, {}]", bold("Data range"), range.min, range.max)?;
    }
    if let Some(range) = image.rescaled_data_range() {
        writeln!(to, "{}: [{}, {}]", bold("Rescaled data range"), range.min, range.max)?;
    }
    for preset in &image.meta().window_presets {
        writeln!(
            to,
            "{}: {} (center {}, width {})",
            bold("Window preset"),
            preset.name,
            preset.wl.center(),
            preset.wl.width()
        )?;
    }
    Ok(())
}

#[inline]
fn whitespace_or_null(c: char) -> bool {
    c.is_whitespace() || c == '\0'
}

fn meta_dump<W>(to: &mut W, meta: &FileMetaTable, file: &ParsedFile) -> IoResult<()>
where
    W: ?Sized + Write,
{
    let label = |s: &'static str| s.if_supports_color(Stream::Stdout, |v| v.bold()).to_string();

    if let Some(uid) = meta.media_storage_sop_class_uid() {
        let uid = uid.trim_end_matches(whitespace_or_null);
        match uids::sop_class_name(uid) {
            Some(name) => writeln!(to, "{}: {} ({})", label("Media Storage SOP Class UID"), uid, name)?,
            None => writeln!(to, "{}: {}", label("Media Storage SOP Class UID"), uid)?,
        }
    }
    if let Some(uid) = meta.media_storage_sop_instance_uid() {
        writeln!(
            to,
            "{}: {}",
            label("Media Storage SOP Instance UID"),
            uid.trim_end_matches(whitespace_or_null)
        )?;
    }
    writeln!(
        to,
        "{}: {} ({})",
        label("Transfer Syntax"),
        file.transfer_syntax.uid(),
        file.transfer_syntax.name()
    )?;
    if let Some(uid) = meta.implementation_class_uid() {
        writeln!(
            to,
            "{}: {}",
            label("Implementation Class UID"),
            uid.trim_end_matches(whitespace_or_null)
        )?;
    }
    if let Some(name) = meta.implementation_version_name() {
        writeln!(to, "{}: {}", label("Implementation version name"), name.trim_end())?;
    }
    writeln!(to, "{}: {}", label("Character set"), file.character_set.name())?;

    writeln!(to)?;
    Ok(())
}

fn warnings_dump<W>(to: &mut W, warnings: &[Warning]) -> IoResult<()>
where
    W: ?Sized + Write,
{
    writeln!(
        to,
        "{}",
        format!("{} warning{}", warnings.len(), if warnings.len() == 1 { "" } else { "s" })
            .if_supports_color(Stream::Stdout, |v| v.red())
    )?;
    for warning in warnings {
        writeln!(to, "  - {}", warning)?;
    }
    Ok(())
}

/// The resolved dumping parameters.
#[derive(Debug, Copy, Clone)]
struct Printer {
    width: u32,
    no_text_limit: bool,
    no_limit: bool,
    max_depth: Option<u32>,
    offsets: bool,
}

impl Printer {
    /// Print the elements of a data set,
    /// `depth` being the indentation and `level` the sequence nesting level.
    fn dump<W>(&self, to: &mut W, dataset: &DataSet, depth: u32, level: u32) -> IoResult<()>
    where
        W: ?Sized + Write,
    {
        for elem in dataset.iter() {
            self.dump_element(&mut *to, elem, depth, level)?;
        }
        Ok(())
    }

    fn offsets_of(&self, elem: &DataElement) -> String {
        match elem.span().filter(|_| self.offsets) {
            Some(span) => format!(" @{}..{}", span.start, span.end),
            None => String::new(),
        }
    }

    fn dump_element<W>(&self, to: &mut W, elem: &DataElement, depth: u32, level: u32) -> IoResult<()>
    where
        W: ?Sized + Write,
    {
        let indent = vec![b' '; (depth * 2) as usize];
        let tag_alias = StandardDataDictionary
            .by_tag(elem.tag())
            .map(DataDictionaryEntry::alias)
            .unwrap_or("«Unknown Attribute»");
        to.write_all(&indent)?;
        let vm = match elem.vr() {
            VR::OB | VR::OW | VR::UN => 1,
            _ => elem.value().multiplicity(),
        };

        match elem.value() {
            DicomValue::Sequence(seq) => {
                writeln!(
                    to,
                    "{} {:28} {} ({} Item{}){}",
                    Styled::Tag(elem.tag()),
                    Styled::Keyword(tag_alias),
                    elem.vr(),
                    vm,
                    if vm == 1 { "" } else { "s" },
                    self.offsets_of(elem),
                )?;
                if self.max_depth.map_or(true, |max| level < max) {
                    for item in seq.items() {
                        self.dump_item(&mut *to, item, depth + 1, level + 1)?;
                    }
                }
                to.write_all(&indent)?;
                writeln!(
                    to,
                    "{} {}",
                    Styled::Tag("(FFFE,E0DD)"),
                    Styled::Keyword("SequenceDelimitationItem"),
                )?;
            }
            DicomValue::PixelSequence(seq) => {
                let num_items = 1 + seq.fragments().len();
                writeln!(
                    to,
                    "{} {:28} {} (PixelSequence, {} Item{}){}",
                    Styled::Tag(elem.tag()),
                    Styled::Keyword(tag_alias),
                    elem.vr(),
                    num_items,
                    if num_items == 1 { "" } else { "s" },
                    self.offsets_of(elem),
                )?;
                let max = Some(self.width)
                    .filter(|_| !self.no_limit)
                    .map(|w| w.saturating_sub(38 + depth * 2));

                let offset_table = seq.offset_table();
                to.write_all(&indent)?;
                writeln!(
                    to,
                    "  {} offset table ({:>2}, {:>2} bytes): {}",
                    Styled::Tag("(FFFE,E000)"),
                    offset_table.len(),
                    offset_table.len() * 4,
                    offset_table_summary(offset_table, max),
                )?;
                for fragment in seq.fragments() {
                    to.write_all(&indent)?;
                    writeln!(
                        to,
                        "  {} pi ({:>3} bytes): {}",
                        Styled::Tag("(FFFE,E000)"),
                        fragment.len(),
                        hex_bytes(fragment, max)
                    )?;
                }
            }
            DicomValue::Primitive(value) => {
                let vr = elem.vr();
                writeln!(
                    to,
                    "{} {:28} {} ({},{:>3} bytes){}: {}",
                    Styled::Tag(elem.tag()),
                    Styled::Keyword(tag_alias),
                    vr,
                    vm,
                    elem.vl(),
                    self.offsets_of(elem),
                    value_summary(
                        value,
                        vr,
                        self.width.saturating_sub(63 + depth * 2),
                        self.no_text_limit,
                        self.no_limit,
                    ),
                )?;
            }
        }

        Ok(())
    }

    fn dump_item<W>(&self, to: &mut W, item: &DataSet, depth: u32, level: u32) -> IoResult<()>
    where
        W: ?Sized + Write,
    {
        let indent: String = "  ".repeat(depth as usize);
        writeln!(
            to,
            "{}{} na {}",
            indent,
            Styled::Tag("(FFFE,E000)"),
            Styled::Keyword("Item"),
        )?;
        self.dump(to, item, depth + 1, level)?;
        writeln!(
            to,
            "{}{} {}",
            indent,
            Styled::Tag("(FFFE,E00D)"),
            Styled::Keyword("ItemDelimitationItem"),
        )?;
        Ok(())
    }
}

/// Reformat a DA value as `YYYY-MM-DD`.
fn format_date(value: &str) -> Option<String> {
    let value = value.trim_end_matches(whitespace_or_null);
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}-{}-{}", &value[..4], &value[4..6], &value[6..]))
}

/// Reformat a TM value as `HH:MM:SS.FFFFFF`, keeping the given precision.
fn format_time(value: &str) -> Option<String> {
    let value = value.trim_end_matches(whitespace_or_null);
    let (hms, fraction) = match value.split_once('.') {
        Some((hms, fraction)) => (hms, Some(fraction)),
        None => (value, None),
    };
    if hms.is_empty() || hms.len() % 2 != 0 || hms.len() > 6 || !hms.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut out = hms
        .as_bytes()
        .chunks(2)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect::<Vec<_>>()
        .join(":");
    if let Some(fraction) = fraction {
        if hms.len() != 6 || fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        out.push('.');
        out.push_str(fraction);
    }
    Some(out)
}

/// Reformat every value, or show them all as invalid if any fails.
fn formatted_list(values: &[String], format: fn(&str) -> Option<String>, limit: Option<u32>) -> Styled<String> {
    match values.iter().map(|v| format(v)).collect::<Option<Vec<_>>>() {
        Some(formatted) => Styled::Date(join_values(formatted, limit, false)),
        None => Styled::Invalid(join_values(values, limit, true)),
    }
}

fn numbers<T: Display>(values: &[T], limit: Option<u32>) -> Styled<String> {
    Styled::Number(join_values(values, limit, false))
}

fn hex_bytes(values: &[u8], limit: Option<u32>) -> Styled<String> {
    Styled::Number(join_values(values.iter().map(|b| format!("{:02X}", b)), limit, false))
}

fn value_summary(
    value: &PrimitiveValue,
    vr: VR,
    max_characters: u32,
    no_text_limit: bool,
    no_limit: bool,
) -> Styled<String> {
    use PrimitiveValue::*;

    let is_text = matches!(vr.kind(), VrKind::Text { .. });
    let limit = if no_limit || (no_text_limit && is_text) {
        None
    } else {
        Some(max_characters)
    };
    match value {
        Empty => Styled::Empty,
        U8(values) if matches!(vr, VR::OB | VR::UN) => hex_bytes(values, limit),
        U8(values) => numbers(values, limit),
        U16(values) if vr == VR::OW => Styled::Number(join_values(
            values.iter().map(|w| format!("{:04X}", w)),
            limit,
            false,
        )),
        U16(values) => numbers(values, limit),
        I16(values) => numbers(values, limit),
        U32(values) => numbers(values, limit),
        I32(values) => numbers(values, limit),
        U64(values) => numbers(values, limit),
        I64(values) => numbers(values, limit),
        F32(values) => numbers(values, limit),
        F64(values) => numbers(values, limit),
        Tags(values) => Styled::Text(join_values(values, limit, false)),
        Strs(values) if vr == VR::DA => formatted_list(values, format_date, limit),
        Strs(values) if vr == VR::TM => formatted_list(values, format_time, limit),
        Strs(values) => Styled::Text(join_values(
            values.iter().map(|s| s.trim_end_matches(whitespace_or_null)),
            limit,
            true,
        )),
        Str(text) => {
            let quoted = format!("\"{}\"", sanitize(text.trim_end_matches(whitespace_or_null)));
            Styled::Text(match limit {
                Some(max) => truncate(&quoted, max).into_owned(),
                None => quoted,
            })
        }
    }
}

/// Replace line breaks and control characters with visible symbols.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' => '␊',
            '\r' => '␍',
            '\0' => '␀',
            c if c.is_control() => '�',
            c => c,
        })
        .collect()
}

fn offset_table_summary(offsets: &[u32], limit: Option<u32>) -> String {
    if offsets.is_empty() {
        return "(empty)".if_supports_color(Stream::Stdout, |v| v.italic()).to_string();
    }
    join_values(offsets.iter().map(|o| format!("{:04X}", o)), limit, false)
}

/// Join values with `, `, in brackets when there is more than one,
/// stopping once `limit` characters are exceeded.
fn join_values<I>(values: I, limit: Option<u32>, quoted: bool) -> String
where
    I: IntoIterator,
    I::IntoIter: ExactSizeIterator,
    I::Item: Display,
{
    let values = values.into_iter();
    let bracketed = values.len() > 1;
    let budget = limit.map_or(usize::MAX, |max| max as usize);

    let mut out = String::new();
    if bracketed {
        out.push('[');
    }
    for (i, value) in values.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let text = sanitize(&value.to_string());
        if quoted {
            out.push('"');
            out.push_str(&text.replace('"', "\\\""));
            out.push('"');
        } else {
            out.push_str(&text);
        }
        if out.len() > budget {
            break;
        }
    }
    if bracketed {
        out.push(']');
    }
    match limit {
        Some(max) => truncate(&out, max).into_owned(),
        None => out,
    }
}

/// Cut `text` to `max` characters, ending with `...` when cut.
fn truncate(text: &str, max: u32) -> Cow<str> {
    let keep = max.saturating_sub(3) as usize;
    if text.chars().count() <= keep {
        return Cow::Borrowed(text);
    }
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    Cow::Owned(cut)
}

fn determine_width(user_width: Option<u32>) -> u32 {
    user_width
        .or_else(|| terminal_size::terminal_size().map(|(width, _)| u32::from(width.0)))
        .unwrap_or(120)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwv_dictionary_std::tags;
    use dwv_image::json::image_from_json;
    use dwv_parser::{DicomParser, DicomWriter};
    use rstest::rstest;

    fn element(tag: dwv_core::Tag, vr: VR, value: impl Into<PrimitiveValue>) -> DataElement {
        DataElement::new(tag, vr, value.into())
    }

    fn lines(out: &[u8]) -> Vec<&str> {
        std::str::from_utf8(out)
            .expect("output is not valid UTF-8")
            .split('\n')
            .collect()
    }

    fn check_line(line: &str, expected: (&str, &str, &str, &str)) {
        let parts: Vec<&str> = line.split(' ').filter(|p| !p.is_empty()).collect();
        let value = line.split_once(": ").unwrap().1.trim();
        assert_eq!(&parts[..3], &[expected.0, expected.1, expected.2]);
        assert_eq!(value, expected.3);
    }

    #[test]
    fn trims_all_whitespace() {
        assert_eq!("   ".trim_end_matches(whitespace_or_null), "");
        assert_eq!("\0".trim_end_matches(whitespace_or_null), "");
        assert_eq!("1.4.5.6\0".trim_end_matches(whitespace_or_null), "1.4.5.6");
        assert_eq!("AETITLE ".trim_end_matches(whitespace_or_null), "AETITLE");
    }

    #[rstest]
    #[case("20170101", Some("2017-01-01"))]
    #[case("2017010", None)]
    #[case("2017-01-01", None)]
    fn dates(#[case] value: &str, #[case] expected: Option<&str>) {
        assert_eq!(format_date(value).as_deref(), expected);
    }

    #[rstest]
    #[case("1230", Some("12:30"))]
    #[case("123045.25", Some("12:30:45.25"))]
    #[case("1230.5", None)]
    #[case("12a0", None)]
    fn times(#[case] value: &str, #[case] expected: Option<&str>) {
        assert_eq!(format_time(value).as_deref(), expected);
    }

    #[test]
    fn dump_data_set_to_covers_properties() {
        let mut dataset = DataSet::new();
        dataset.put(element(tags::SOP_INSTANCE_UID, VR::UI, "1.2.888.123"));
        dataset.put(element(tags::STUDY_DATE, VR::DA, "20170101"));
        dataset.put(element(tags::CONTENT_DATE, VR::DA, PrimitiveValue::Empty));
        dataset.put(element(tags::MODALITY, VR::CS, "OT"));
        dataset.put(element(
            tags::IMAGE_COMMENTS,
            VR::LT,
            PrimitiveValue::Str("Country Roads 1\nWest Virginia".to_string()),
        ));
        dataset.put(element(tags::SAMPLES_PER_PIXEL, VR::US, 3_u16));

        let mut out = Vec::new();
        DumpOptions::new()
            .color_mode(ColorMode::Never)
            .dump_data_set_to(&mut out, &dataset)
            .unwrap();
        let lines = lines(&out);

        check_line(lines[0], ("(0008,0018)", "SOPInstanceUID", "UI", "\"1.2.888.123\""));
        check_line(lines[1], ("(0008,0020)", "StudyDate", "DA", "2017-01-01"));
        check_line(lines[2], ("(0008,0023)", "ContentDate", "DA", "(no value)"));
        check_line(lines[3], ("(0008,0060)", "Modality", "CS", "\"OT\""));
        check_line(
            lines[4],
            ("(0020,4000)", "ImageComments", "LT", "\"Country Roads 1␊West Virginia\""),
        );
        check_line(lines[5], ("(0028,0002)", "SamplesPerPixel", "US", "3"));
    }

    #[test]
    fn dump_file_to_covers_properties() {
        let mut dataset = DataSet::new();
        dataset.put(element(tags::SOP_INSTANCE_UID, VR::UI, "1.2.888.123"));
        dataset.put(element(tags::MODALITY, VR::CS, "OT"));
        let meta = dwv_parser::FileMetaTable::new(
            uids::CT_IMAGE_STORAGE,
            "1.2.888.123",
            uids::EXPLICIT_VR_LITTLE_ENDIAN,
        );
        let bytes = DicomWriter::new()
            .write_parts(
                &meta,
                &dataset,
                dwv_encoding::transfer_syntax::get(uids::EXPLICIT_VR_LITTLE_ENDIAN).unwrap(),
            )
            .unwrap();
        let file = DicomParser::new().parse(&bytes).unwrap();

        let mut out = Vec::new();
        DumpOptions::new()
            .color_mode(ColorMode::Never)
            .offsets(true)
            .dump_file_to(&mut out, &file)
            .unwrap();
        let lines = lines(&out);

        assert_eq!(
            lines[0],
            "Media Storage SOP Class UID: 1.2.840.10008.5.1.4.1.1.2 (CT Image Storage)"
        );
        assert_eq!(lines[1], "Media Storage SOP Instance UID: 1.2.888.123");
        assert_eq!(
            lines[2],
            "Transfer Syntax: 1.2.840.10008.1.2.1 (Explicit VR Little Endian)"
        );
        let separator = lines.iter().position(|l| l.starts_with("-----")).unwrap();
        let parts: Vec<&str> = lines[separator + 1].split(' ').filter(|p| !p.is_empty()).collect();
        assert_eq!(&parts[..3], &["(0008,0018)", "SOPInstanceUID", "UI"]);
        assert!(lines[separator + 1].contains(" @"));
    }

    #[test]
    fn image_summary() {
        let image = image_from_json(&serde_json::json!({
            "Rows": 2,
            "Columns": 2,
            "BitsAllocated": 8,
            "PixelRepresentation": 0,
            "WindowCenter": 100,
            "WindowWidth": 50,
            "PixelData": [0, 10, 20, 200],
        }))
        .unwrap();
        owo_colors::set_override(false);
        let mut out = Vec::new();
        dump_image_to(&mut out, &image).unwrap();
        let lines = lines(&out);
        assert_eq!(lines[0], "Size: 2x2x1");
        assert!(lines.contains(&"Data range: [0, 200]"));
        assert!(lines.contains(&"Window preset: Default0 (center 100, width 50)"));
    }
}
