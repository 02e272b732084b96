use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of one validator diagnostic, ordered by increasing importance.
///
/// "Warnings" in the tiered accessors means `Warning` and anything more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Notice,
        Severity::Warning,
        Severity::Error,
    ];

    /// The token the validator prints, e.g. `"WARNING"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Severity::Debug),
            "INFO" => Ok(Severity::Info),
            "NOTICE" => Ok(Severity::Notice),
            "WARNING" => Ok(Severity::Warning),
            "ERROR" => Ok(Severity::Error),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// One diagnostic line produced by the validator, split into its fields.
///
/// `message` is the line exactly as printed; every other field is a piece of it.
///
/// # Example
/// ```
/// use riseclipse_e::{ParsedMessage, Severity};
///
/// let msg = ParsedMessage::parse("ERROR   [NSD] Missing DO (ied.icd:7)").unwrap();
/// assert_eq!(msg.severity, Severity::Error);
/// assert_eq!(msg.line_number(), Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedMessage {
    pub message: String,
    pub category: String,
    pub line: String,
    pub data: String,
    pub filename: String,
    pub severity: Severity,
}

impl ParsedMessage {
    /// Parses one validator output line; see [`crate::e_parser::parse_message`].
    pub fn parse(line: &str) -> Result<Self, crate::e_parser::ParseError> {
        crate::e_parser::parse_message(line)
    }

    /// The line number as an integer, when the locator holds one.
    pub fn line_number(&self) -> Option<u32> {
        self.line.trim().parse().ok()
    }
}
