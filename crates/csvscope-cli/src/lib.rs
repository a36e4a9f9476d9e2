//! Shared CLI definitions for csvscope.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::Path;

/// Compression format for data files
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Gzip compression (.gz) - Most common, good balance of speed and compression
    Gzip,
    /// Zstandard compression (.zst) - Modern, fast compression with good ratios
    Zstd,
    /// Bzip2 compression (.bz2) - Good compression ratio, slower than gzip
    Bzip2,
    /// XZ compression (.xz) - Excellent compression ratio, slower than bzip2
    Xz,
}

impl CompressionFormat {
    /// Detect compression format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            Self::from_name(ext)
        } else {
            None
        }
    }

    /// Parse a format from its extension or config name ("gz", "gzip", "zst", ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gz" | "gzip" => Some(Self::Gzip),
            "zst" | "zstd" => Some(Self::Zstd),
            "bz2" | "bz" | "bzip2" => Some(Self::Bzip2),
            "xz" => Some(Self::Xz),
            _ => None,
        }
    }

    /// Get file extension for this compression format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Gzip => "gz",
            Self::Zstd => "zst",
            Self::Bzip2 => "bz2",
            Self::Xz => "xz",
        }
    }
}

/// How each loaded file is labelled in the legend
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum LabelModeArg {
    /// "File 1", "File 2", ... in load order
    FileCounter,
    /// Name of the file's second column (useful when plotting a single file)
    SecondColumn,
    /// The file name the data was loaded from
    FileName,
}

/// Command-line arguments for csvscope
#[derive(Clone, Parser, Debug)]
#[command(
    name = "csvscope",
    version,
    about = "Plot delimited text files of unknown layout in the terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Path(s) to the delimited text file(s) to load, in order.
    /// Each file becomes one dataset; more files can be opened later with `o`.
    #[arg(num_args = 0.., value_name = "PATH")]
    pub paths: Vec<std::path::PathBuf>,

    /// Drop this many data rows immediately after the detected header row
    #[arg(long = "skip-rows", value_name = "N")]
    pub skip_rows: Option<usize>,

    /// Use this delimiter instead of detecting one (e.g. ',' or ';')
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Sniff the delimiter from the first lines instead of probing comma then semicolon
    #[arg(long = "sniff", action)]
    pub sniff: bool,

    /// Specify the compression format explicitly (gzip, zstd, bzip2, xz)
    /// If not specified, compression is auto-detected from file extension.
    #[arg(long = "compression", value_enum)]
    pub compression: Option<CompressionFormat>,

    /// Y column name to select initially (matched case-insensitively)
    #[arg(long = "y", value_name = "NAME")]
    pub y: Option<String>,

    /// How series are labelled in the legend
    #[arg(long = "label-mode", value_enum)]
    pub label_mode: Option<LabelModeArg>,

    /// Render the selected series to an image (.png or .svg) and exit without starting the UI
    #[arg(long = "export", value_name = "FILE")]
    pub export: Option<std::path::PathBuf>,

    /// Write the selected series as JSON and exit without starting the UI
    #[arg(long = "export-json", value_name = "FILE")]
    pub export_json: Option<std::path::PathBuf>,

    /// Enable debug mode to show operational information and verbose logging
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Clear all cache data (including the log file) and exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,

    /// Generate default configuration file at ~/.config/csvscope/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

impl Args {
    /// True when the run produces files and exits instead of starting the UI.
    pub fn is_headless(&self) -> bool {
        self.export.is_some() || self.export_json.is_some()
    }
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render command-line options as markdown.
///
/// Used by the gen_docs binary; output is written to stdout.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let placeholder: String = arg
            .get_value_names()
            .map(|names| {
                names
                    .iter()
                    .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        let option_str = if arg.is_positional() {
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            if !arg.get_action().takes_values() || placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}
