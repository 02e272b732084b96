use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use e_release_fetcher::VersionTriple;

use crate::e_validator::OutputLevel;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "riseclipse-e runs the RiseClipse SCL validator and keeps its jar up to date.",
    long_about = "Without arguments, compares the local validator jar with the latest release.\n\
                  With --download, fetches the latest (or a given) release jar.\n\
                  The validate subcommand runs the validator and reports or exports its messages."
)]
pub struct Cli {
    /// Fetch `latest` or a specific `X.Y.Z` release of the validator jar.
    #[arg(long, value_name = "latest|X.Y.Z")]
    pub download: Option<DownloadTarget>,

    #[arg(long, help = "Path to the validator jar (default: ./RiseClipseValidatorSCL.jar).")]
    pub jar: Option<PathBuf>,

    #[arg(long, help = "java command used to run the jar (default: java on PATH).")]
    pub java: Option<PathBuf>,

    #[arg(long, help = "TOML settings file (default: ./riseclipse.toml when present).")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "SECS", help = "Kill the validator after this many seconds.")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate SCL files or directories.
    Validate {
        #[arg(required = true, help = "Files and directories to validate.")]
        files: Vec<PathBuf>,

        #[arg(long, short = 'l', value_enum, help = "Lowest severity to report.")]
        level: Option<OutputLevel>,

        #[arg(long, short = 'f', value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        #[arg(long, short = 'o', help = "Write the report here instead of stdout.")]
        output: Option<PathBuf>,

        #[arg(long, default_value_t = ',', help = "Field separator for CSV output.")]
        separator: char,

        #[arg(long, help = "XML schema to validate against.")]
        xml_schema: Option<PathBuf>,

        #[arg(long, help = "Also display messages about NSD files.")]
        display_nsd_messages: bool,

        #[arg(long, help = "Ask the validator for coloured text output.")]
        use_color: bool,
    },
}

/// How `validate` presents its result.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Raw validator output.
    Text,
    /// Parsed messages in a terminal table.
    Table,
    Csv,
    Json,
}

/// Argument of `--download`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadTarget {
    Latest,
    Version(VersionTriple),
}

impl FromStr for DownloadTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "latest" {
            return Ok(DownloadTarget::Latest);
        }
        s.parse()
            .map(DownloadTarget::Version)
            .map_err(|e| format!("{} (expected 'latest' or X.Y.Z)", e))
    }
}
