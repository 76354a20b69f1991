//! A CLI tool for inspecting the contents of a DICOM file
//! by printing it in a human readable format,
//! and optionally writing it back with anonymisation rules
//! or in another transfer syntax.
use clap::Parser;
use dwv_dump::{dump_image_to, ColorMode, DumpOptions};
use dwv_image::ImageFactory;
use dwv_parser::{DicomParser, DicomWriter, ReadOptions, WriteOptions, WriteRules};
use snafu::{Report, ResultExt, Whatever};
use std::io::{stdout, ErrorKind};
use std::path::PathBuf;
use tracing::{info, warn, Level};

/// Exit code for when an error emerged while reading the DICOM file.
const ERROR_READ: i32 = -2;
/// Exit code for when an error emerged while dumping the file.
const ERROR_PRINT: i32 = -3;
/// Exit code for when the file could not be written back.
const ERROR_WRITE: i32 = -4;
/// Exit code for when no image could be built from the file.
const ERROR_IMAGE: i32 = -5;

/// Dump the contents of a DICOM file
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// The DICOM file to read
    file: PathBuf,
    /// Accept files without the 128 byte preamble
    #[arg(long = "no-preamble")]
    no_preamble: bool,
    /// Only print sequence items down to this nesting level
    #[arg(long = "depth")]
    depth: Option<u32>,
    /// Do not print the byte range of each element
    #[arg(long = "no-offsets")]
    no_offsets: bool,
    /// Print a summary of the image held by the file
    #[arg(long = "image")]
    image: bool,
    /// Write the file back to this path
    #[arg(long = "write", value_name = "OUT")]
    write: Option<PathBuf>,
    /// Write rules to apply, as a JSON file of {"key": {"action", "value"}}
    #[arg(long = "rules", value_name = "RULES.json", requires = "write", conflicts_with = "anonymise")]
    rules: Option<PathBuf>,
    /// Apply the standard anonymisation rules when writing
    #[arg(long = "anonymise", requires = "write")]
    anonymise: bool,
    /// Write in this transfer syntax instead of the source's
    #[arg(long = "transfer-syntax", value_name = "UID", requires = "write")]
    transfer_syntax: Option<String>,
    /// Write private sequences as UN with undefined length
    #[arg(long = "private-sq-as-un", requires = "write")]
    private_sq_as_un: bool,
    /// Print text values to the end
    /// (limited to `width` by default)
    #[arg(long = "no-text-limit")]
    no_text_limit: bool,
    /// Print all values to the end
    /// (implies `no_text_limit`, limited to `width` by default)
    #[arg(long = "no-limit")]
    no_limit: bool,
    /// The width of the display
    /// (default is to check automatically)
    #[arg(short = 'w', long = "width")]
    width: Option<u32>,
    /// The color mode
    #[arg(long = "color", default_value = "auto")]
    color: ColorMode,
    /// Verbose mode
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() {
    let app = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if app.verbose { Level::DEBUG } else { Level::INFO })
            .with_writer(std::io::stderr)
            .finish(),
    )
    .whatever_context("Could not set up global logging subscriber")
    .unwrap_or_else(|e: Whatever| {
        eprintln!("[ERROR] {}", Report::from_error(e));
    });

    std::process::exit(run(app));
}

fn run(app: App) -> i32 {
    let App {
        file: filename,
        no_preamble,
        depth,
        no_offsets,
        image,
        write,
        rules,
        anonymise,
        transfer_syntax,
        private_sq_as_un,
        no_text_limit,
        no_limit,
        width,
        color,
        verbose: _,
    } = app;

    let file = match std::fs::read(&filename)
        .whatever_context::<_, Whatever>("Could not read file")
        .and_then(|bytes| {
            DicomParser::with_options(ReadOptions::new().no_preamble(no_preamble))
                .parse(&bytes)
                .whatever_context("Could not parse file")
        }) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("[ERROR] {}", Report::from_error(e));
            return ERROR_READ;
        }
    };
    for warning in &file.warnings {
        warn!("{}: {}", filename.display(), warning);
    }

    let width = width
        .or_else(|| terminal_size::terminal_size().map(|(width, _)| width.0 as u32))
        .unwrap_or(120);
    let mut options = DumpOptions::new();
    options
        .no_text_limit(no_text_limit)
        .no_limit(no_limit)
        .width(width)
        .offsets(!no_offsets)
        .color_mode(color);
    if let Some(depth) = depth {
        options.max_depth(depth);
    }

    println!("{}: ", filename.display());
    if let Err(ref e) = options.dump_file(&file) {
        if e.kind() == ErrorKind::BrokenPipe {
            // handle broken pipe separately with a no-op
        } else {
            eprintln!("[ERROR] {}", Report::from_error(e));
            return ERROR_PRINT;
        }
    }

    if image {
        match ImageFactory::new().create_from_file(&file) {
            Ok(image) => {
                println!();
                if let Err(e) = dump_image_to(stdout(), &image) {
                    if e.kind() != ErrorKind::BrokenPipe {
                        eprintln!("[ERROR] {}", Report::from_error(e));
                        return ERROR_PRINT;
                    }
                }
            }
            Err(e) => {
                eprintln!("[ERROR] {}", Report::from_error(e));
                return ERROR_IMAGE;
            }
        }
    }

    if let Some(out) = write {
        let rules = match (rules, anonymise) {
            (Some(path), _) => match std::fs::read_to_string(&path)
                .whatever_context::<_, Whatever>("Could not read write rules")
                .and_then(|json| {
                    WriteRules::from_json(&json).whatever_context("Could not parse write rules")
                }) {
                Ok(rules) => rules,
                Err(e) => {
                    eprintln!("[ERROR] {}", Report::from_error(e));
                    return ERROR_WRITE;
                }
            },
            (None, true) => WriteRules::anonymise(),
            (None, false) => WriteRules::new(),
        };
        let mut write_options = WriteOptions::new().use_un_vr_for_private_sq(private_sq_as_un);
        if let Some(uid) = transfer_syntax {
            write_options = write_options.transfer_syntax(uid);
        }
        let written = DicomWriter::new()
            .with_rules(rules)
            .with_options(write_options)
            .write(&file)
            .whatever_context::<_, Whatever>("Could not encode file")
            .and_then(|bytes| {
                std::fs::write(&out, &bytes)
                    .whatever_context::<_, Whatever>("Could not write file")?;
                Ok(bytes.len())
            });
        match written {
            Ok(len) => info!("Wrote {} bytes to {}", len, out.display()),
            Err(e) => {
                eprintln!("[ERROR] {}", Report::from_error(e));
                return ERROR_WRITE;
            }
        }
    }

    0
}

#[cfg(test)]
mod tests {
    use crate::App;
    use clap::{CommandFactory, Parser};

    #[test]
    fn verify_cli() {
        App::command().debug_assert();
    }

    #[test]
    fn rules_need_an_output() {
        assert!(App::try_parse_from(["dwv-dump", "file.dcm", "--anonymise"]).is_err());
        assert!(App::try_parse_from([
            "dwv-dump",
            "file.dcm",
            "--write",
            "out.dcm",
            "--anonymise",
            "--rules",
            "rules.json"
        ])
        .is_err());
        let app = App::try_parse_from(["dwv-dump", "file.dcm", "--write", "out.dcm", "--anonymise"]).unwrap();
        assert!(app.anonymise);
    }
}
