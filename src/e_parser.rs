use once_cell::sync::Lazy;
use regex::Regex;

use crate::e_types::{ParsedMessage, Severity};

/// Trailing `(file:line)` locator, the last parenthesized group on the line. One level
/// of nested parentheses is allowed inside it, as in `dir(1)/f.xml`.
static LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(((?:[^()]|\([^()]*\))*)\)\s*$").expect("valid location regex")
});
/// First `[Category]` group.
static CATEGORY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]").expect("valid category regex"));

/// Width of the severity column in the validator output (`WARNING` plus a separator).
const SEVERITY_WIDTH: usize = 8;

/// Why a validator output line could not be split into fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no trailing (file:line) locator")]
    MissingLocation,
    #[error("locator '({0})' has no ':' separating file and line")]
    MissingLineNumber(String),
    #[error("no [category] group")]
    MissingCategory,
    #[error("unknown severity '{0}'")]
    UnknownSeverity(String),
}

/// Parses one line of validator output into a [`ParsedMessage`].
///
/// The expected layout is `<SEVERITY> [<CATEGORY>] <text> (<file>:<line>)`. The
/// locator is taken from the last parenthesized group, the category from the first
/// bracketed group, the severity from the first 8 columns of what remains.
///
/// # Example
/// ```
/// use riseclipse_e::e_parser::parse_message;
/// use riseclipse_e::Severity;
///
/// let msg = parse_message("WARNING [Schema] Element is not expected (file.xml:10)").unwrap();
/// assert_eq!(msg.severity, Severity::Warning);
/// assert_eq!(msg.category, "Schema");
/// assert_eq!(msg.data, "Element is not expected");
/// assert_eq!(msg.filename, "file.xml");
/// assert_eq!(msg.line, "10");
/// ```
pub fn parse_message(line: &str) -> Result<ParsedMessage, ParseError> {
    let location = LOCATION_RE
        .captures(line)
        .ok_or(ParseError::MissingLocation)?;
    let (Some(whole), Some(inner)) = (location.get(0), location.get(1)) else {
        return Err(ParseError::MissingLocation);
    };
    let (filename, line_number) = inner
        .as_str()
        .split_once(':')
        .ok_or_else(|| ParseError::MissingLineNumber(inner.as_str().to_string()))?;
    let rest = format!("{}{}", &line[..whole.start()], &line[whole.end()..]);

    let category = CATEGORY_RE
        .captures(&rest)
        .ok_or(ParseError::MissingCategory)?;
    let (Some(group), Some(name)) = (category.get(0), category.get(1)) else {
        return Err(ParseError::MissingCategory);
    };
    let remaining = format!("{}{}", &rest[..group.start()], &rest[group.end()..]);

    let (severity, data) = split_severity(&remaining)?;

    Ok(ParsedMessage {
        message: line.to_string(),
        category: name.as_str().trim().to_string(),
        line: line_number.trim().to_string(),
        data: data.trim().to_string(),
        filename: filename.trim().to_string(),
        severity,
    })
}

/// Splits `<SEVERITY> <data>`. Padded tool output keeps the severity in a fixed
/// 8-column field; anything else is split on the first whitespace-delimited token.
fn split_severity(remaining: &str) -> Result<(Severity, String), ParseError> {
    let column: String = remaining.chars().take(SEVERITY_WIDTH).collect();
    let separator = remaining.chars().nth(SEVERITY_WIDTH);
    if separator.is_none_or(char::is_whitespace) {
        if let Ok(severity) = severity_token(&column).parse::<Severity>() {
            // Skip the column plus its separator.
            let data: String = remaining.chars().skip(SEVERITY_WIDTH + 1).collect();
            return Ok((severity, data));
        }
    }

    let trimmed = remaining.trim_start();
    let (token, data) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    let token = severity_token(token);
    let severity = token
        .parse()
        .map_err(|_| ParseError::UnknownSeverity(token.to_string()))?;
    Ok((severity, data.to_string()))
}

/// Drops surrounding blanks and the `:` the `%1$-7s: ` format leaves behind.
fn severity_token(raw: &str) -> &str {
    raw.trim().trim_end_matches(':').trim_end()
}

/// A line of validator output that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based position of the line in the raw output.
    pub line_number: usize,
    pub line: String,
    pub error: ParseError,
}

/// Parses every non-blank line, keeping going past malformed ones.
pub fn parse_lines<'a, I>(lines: I) -> (Vec<ParsedMessage>, Vec<MalformedLine>)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parsed = Vec::new();
    let mut malformed = Vec::new();
    for (idx, line) in lines.into_iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_message(line) {
            Ok(msg) => parsed.push(msg),
            Err(error) => {
                log::warn!("skipping malformed validator line {}: {}", idx + 1, error);
                malformed.push(MalformedLine {
                    line_number: idx + 1,
                    line: line.to_string(),
                    error,
                });
            }
        }
    }
    (parsed, malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_severity() {
        for severity in Severity::ALL {
            let line = format!("{:<7} [Cat] body text (a.scd:3)", severity.as_str());
            let msg = parse_message(&line).unwrap();
            assert_eq!(msg.severity, severity, "line: {}", line);
            assert_eq!(msg.data, "body text");
        }
    }

    #[test]
    fn colon_after_severity_is_ignored() {
        let msg = parse_message("ERROR  : [NSD] DataObject missing (ied.icd:120)").unwrap();
        assert_eq!(msg.severity, Severity::Error);
        assert_eq!(msg.category, "NSD");
        assert_eq!(msg.data, "DataObject missing");
        assert_eq!(msg.line, "120");
    }

    #[test]
    fn parentheses_in_body_do_not_confuse_the_locator() {
        let msg =
            parse_message("NOTICE  [OCL] value (42) out of range (sub/dir/x.scd:9)").unwrap();
        assert_eq!(msg.filename, "sub/dir/x.scd");
        assert_eq!(msg.line, "9");
        assert_eq!(msg.data, "value (42) out of range");
    }

    #[test]
    fn single_space_layout_keeps_the_whole_body() {
        for severity in Severity::ALL {
            let line = format!("{} [Cat] DataObject missing (f.xml:1)", severity.as_str());
            let msg = parse_message(&line).unwrap();
            assert_eq!(msg.severity, severity, "line: {}", line);
            assert_eq!(msg.category, "Cat");
            assert_eq!(msg.data, "DataObject missing", "line: {}", line);
            assert_eq!(msg.filename, "f.xml");
        }
        let msg = parse_message("INFO [Setup] x (f.xml:2)").unwrap();
        assert_eq!((msg.severity, msg.data.as_str()), (Severity::Info, "x"));
        let msg = parse_message("ERROR: [NSD] Missing DO (f.xml:2)").unwrap();
        assert_eq!((msg.severity, msg.data.as_str()), (Severity::Error, "Missing DO"));
    }

    #[test]
    fn parentheses_inside_the_locator_path() {
        let msg = parse_message("WARNING [X] body (dir(1)/f.xml:3)").unwrap();
        assert_eq!(msg.filename, "dir(1)/f.xml");
        assert_eq!(msg.line, "3");
        assert_eq!(msg.data, "body");

        let msg = parse_message("NOTICE  [OCL] value (42) seen (dir(1)/f.xml:4)").unwrap();
        assert_eq!(msg.filename, "dir(1)/f.xml");
        assert_eq!(msg.data, "value (42) seen");
    }

    #[test]
    fn only_first_bracket_group_is_the_category() {
        let msg = parse_message("INFO    [Links] see [LN0] entry (f.xml:1)").unwrap();
        assert_eq!(msg.category, "Links");
        assert_eq!(msg.data, "see [LN0] entry");
    }

    #[test]
    fn message_keeps_the_original_line() {
        let line = "WARNING [Schema] Element is not expected (file.xml:10)   ";
        assert_eq!(parse_message(line).unwrap().message, line);
    }

    #[test]
    fn missing_groups_are_errors_not_panics() {
        assert_eq!(
            parse_message("WARNING [Schema] no locator"),
            Err(ParseError::MissingLocation)
        );
        assert_eq!(
            parse_message("WARNING no category (f.xml:1)"),
            Err(ParseError::MissingCategory)
        );
        assert_eq!(
            parse_message("WARNING [Schema] body (f.xml)"),
            Err(ParseError::MissingLineNumber("f.xml".to_string()))
        );
        assert!(matches!(
            parse_message("LOADING [Schema] body (f.xml:1)"),
            Err(ParseError::UnknownSeverity(_))
        ));
    }

    #[test]
    fn short_lines_do_not_panic() {
        assert!(parse_message("[]()").is_err());
        assert!(parse_message("é[x](y:1)").is_err());
    }

    #[test]
    fn parse_lines_collects_failures_and_continues() {
        let output = "\
WARNING [Schema] first (a.xml:1)

RiseClipse banner line
ERROR   [Schema] second (a.xml:2)
";
        let (parsed, malformed) = parse_lines(output.lines());
        assert_eq!(parsed.len(), 2);
        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed[0].line_number, 3);
        assert_eq!(malformed[0].error, ParseError::MissingLocation);
    }
}
