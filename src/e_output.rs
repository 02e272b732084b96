//! Parsed result of one validator run, with severity views, filters and exporters.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use comfy_table::{Cell, ContentArrangement, Row, Table};
use once_cell::unsync::OnceCell;

use crate::e_error::{LauncherError, Result};
use crate::e_parser::{parse_lines, parse_message, MalformedLine};
use crate::e_types::{ParsedMessage, Severity};

/// CSV column order: every field but `message`, then `message` last.
pub const CSV_HEADER: [&str; 6] = ["category", "line", "data", "filename", "severity", "message"];

/// The messages of one validator run.
///
/// Severity views are computed on first use and cached for the life of the value,
/// empty ones included.
#[derive(Debug, Default)]
pub struct ValidatorOutput {
    messages: Vec<ParsedMessage>,
    malformed: Vec<MalformedLine>,
    errors: OnceCell<Vec<ParsedMessage>>,
    warnings: OnceCell<Vec<ParsedMessage>>,
    notices: OnceCell<Vec<ParsedMessage>>,
    infos: OnceCell<Vec<ParsedMessage>>,
    only_warnings: OnceCell<Vec<ParsedMessage>>,
    only_notices: OnceCell<Vec<ParsedMessage>>,
    only_infos: OnceCell<Vec<ParsedMessage>>,
}

impl ValidatorOutput {
    pub fn from_messages(messages: Vec<ParsedMessage>) -> Self {
        ValidatorOutput {
            messages,
            ..Default::default()
        }
    }

    /// Parses every non-blank line. Lines that do not parse are kept aside in
    /// [`ValidatorOutput::malformed`] instead of aborting the whole run.
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let (messages, malformed) = parse_lines(lines);
        if messages.is_empty() && malformed.is_empty() {
            log::debug!("No messages to parse.");
        }
        ValidatorOutput {
            messages,
            malformed,
            ..Default::default()
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    /// Like [`ValidatorOutput::from_lines`] but fails on the first malformed line.
    pub fn try_from_lines<'a, I>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut messages = Vec::new();
        for (idx, line) in lines.into_iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let msg = parse_message(line).map_err(|source| LauncherError::Malformed {
                line_number: idx + 1,
                source,
            })?;
            messages.push(msg);
        }
        Ok(Self::from_messages(messages))
    }

    pub fn try_from_text(text: &str) -> Result<Self> {
        Self::try_from_lines(text.lines())
    }

    /// Lines of output that were not diagnostics.
    pub fn malformed(&self) -> &[MalformedLine] {
        &self.malformed
    }

    pub fn all_messages(&self) -> &[ParsedMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn at_least<'a>(
        &'a self,
        cell: &'a OnceCell<Vec<ParsedMessage>>,
        min: Severity,
    ) -> &'a [ParsedMessage] {
        cell.get_or_init(|| {
            self.messages
                .iter()
                .filter(|m| m.severity >= min)
                .cloned()
                .collect()
        })
    }

    fn exactly<'a>(
        &'a self,
        cell: &'a OnceCell<Vec<ParsedMessage>>,
        severity: Severity,
    ) -> &'a [ParsedMessage] {
        cell.get_or_init(|| {
            self.messages
                .iter()
                .filter(|m| m.severity == severity)
                .cloned()
                .collect()
        })
    }

    /// ERROR messages.
    pub fn errors(&self) -> &[ParsedMessage] {
        self.at_least(&self.errors, Severity::Error)
    }

    /// WARNING and ERROR messages.
    pub fn warnings(&self) -> &[ParsedMessage] {
        self.at_least(&self.warnings, Severity::Warning)
    }

    /// NOTICE, WARNING and ERROR messages.
    pub fn notices(&self) -> &[ParsedMessage] {
        self.at_least(&self.notices, Severity::Notice)
    }

    /// Everything except DEBUG.
    pub fn infos(&self) -> &[ParsedMessage] {
        self.at_least(&self.infos, Severity::Info)
    }

    pub fn only_warnings(&self) -> &[ParsedMessage] {
        self.exactly(&self.only_warnings, Severity::Warning)
    }

    pub fn only_notices(&self) -> &[ParsedMessage] {
        self.exactly(&self.only_notices, Severity::Notice)
    }

    pub fn only_infos(&self) -> &[ParsedMessage] {
        self.exactly(&self.only_infos, Severity::Info)
    }

    /// Messages whose category contains `category`.
    pub fn by_category(&self, category: &str) -> Vec<&ParsedMessage> {
        self.by_filter(&MessageFilter::new().category(category))
    }

    /// Messages whose text contains `text`.
    pub fn by_message_text(&self, text: &str) -> Vec<&ParsedMessage> {
        self.by_filter(&MessageFilter::new().data(text))
    }

    pub fn by_filename(&self, filename: &str) -> Vec<&ParsedMessage> {
        self.by_filter(&MessageFilter::new().filename(filename))
    }

    pub fn by_line(&self, line: impl ToString) -> Vec<&ParsedMessage> {
        self.by_filter(&MessageFilter::new().line(line))
    }

    /// Messages matching every field set in `filter`.
    pub fn by_filter(&self, filter: &MessageFilter) -> Vec<&ParsedMessage> {
        self.messages.iter().filter(|m| filter.matches(m)).collect()
    }

    /// Number of messages per severity, most severe first.
    pub fn severity_counts(&self) -> Vec<(Severity, usize)> {
        Severity::ALL
            .iter()
            .rev()
            .map(|s| (*s, self.messages.iter().filter(|m| m.severity == *s).count()))
            .collect()
    }

    /// Serialises the messages as CSV using `separator` between fields.
    pub fn to_csv_string(&self, separator: u8) -> Result<String> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(separator)
            .from_writer(Vec::new());
        wtr.write_record(CSV_HEADER)?;
        for m in &self.messages {
            wtr.write_record([
                m.category.as_str(),
                m.line.as_str(),
                m.data.as_str(),
                m.filename.as_str(),
                m.severity.as_str(),
                m.message.as_str(),
            ])?;
        }
        let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Writes the messages to `path` as CSV and returns what was written.
    /// Nothing is written when there are no messages.
    pub fn to_csv(&self, path: impl AsRef<Path>, separator: u8) -> Result<String> {
        if self.messages.is_empty() {
            log::warn!("No messages to write to CSV.");
            return Ok(String::new());
        }
        let csv = self.to_csv_string(separator)?;
        std::fs::write(path.as_ref(), &csv)?;
        Ok(csv)
    }

    /// JSON object mapping the stringified row index to each message.
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        let mut map = serde_json::Map::new();
        for (idx, m) in self.messages.iter().enumerate() {
            map.insert(idx.to_string(), serde_json::to_value(m)?);
        }
        Ok(serde_json::Value::Object(map))
    }

    /// Writes [`ValidatorOutput::to_json_value`] to `path` and returns it.
    pub fn to_json(&self, path: impl AsRef<Path>) -> Result<serde_json::Value> {
        let value = self.to_json_value()?;
        std::fs::write(path.as_ref(), serde_json::to_string(&value)?)?;
        Ok(value)
    }

    /// Reads back a file written by [`ValidatorOutput::to_json`].
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let rows: BTreeMap<String, ParsedMessage> = serde_json::from_str(&text)?;
        let mut indexed: Vec<(usize, ParsedMessage)> = rows
            .into_iter()
            .map(|(k, v)| (k.parse().unwrap_or(usize::MAX), v))
            .collect();
        indexed.sort_by_key(|(idx, _)| *idx);
        Ok(Self::from_messages(
            indexed.into_iter().map(|(_, m)| m).collect(),
        ))
    }

    /// [`ValidatorOutput::to_table`] rendered for a terminal `width` columns wide.
    pub fn render_table(&self, width: u16) -> String {
        self.to_table().render(width)
    }

    /// Column-oriented view with the fixed column set.
    pub fn to_table(&self) -> MessageTable {
        MessageTable {
            rows: self
                .messages
                .iter()
                .map(|m| {
                    [
                        m.message.clone(),
                        m.category.clone(),
                        m.line.clone(),
                        m.data.clone(),
                        m.filename.clone(),
                        m.severity.to_string(),
                    ]
                })
                .collect(),
        }
    }
}

/// Per-field predicates combined with AND. `category` and `data` match by substring,
/// the other fields exactly. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    pub message: Option<String>,
    pub severity: Option<Severity>,
    pub category: Option<String>,
    pub data: Option<String>,
    pub filename: Option<String>,
    pub line: Option<String>,
}

impl MessageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn line(mut self, line: impl ToString) -> Self {
        self.line = Some(line.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, m: &ParsedMessage) -> bool {
        self.message.as_ref().is_none_or(|v| m.message == *v)
            && self.severity.is_none_or(|v| m.severity == v)
            && self.category.as_ref().is_none_or(|v| m.category.contains(v.as_str()))
            && self.data.as_ref().is_none_or(|v| m.data.contains(v.as_str()))
            && self.filename.as_ref().is_none_or(|v| m.filename == *v)
            && self.line.as_ref().is_none_or(|v| m.line == *v)
    }
}

/// Tabular view of the messages with columns in [`MessageTable::COLUMNS`] order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageTable {
    pub rows: Vec<[String; 6]>,
}

impl MessageTable {
    pub const COLUMNS: [&'static str; 6] =
        ["message", "category", "line", "data", "filename", "severity"];

    /// All values of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = Self::COLUMNS.iter().position(|c| *c == name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Terminal rendering without the raw `message` column, which repeats the others.
    pub fn render(&self, width: u16) -> String {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_width(width);
        table.set_header(vec!["severity", "category", "filename", "line", "data"]);
        for r in &self.rows {
            table.add_row(Row::from(vec![
                Cell::new(&r[5]),
                Cell::new(&r[1]),
                Cell::new(&r[4]),
                Cell::new(&r[2]),
                Cell::new(&r[3]),
            ]));
        }
        table.to_string()
    }
}

impl fmt::Display for MessageTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(120))
    }
}
