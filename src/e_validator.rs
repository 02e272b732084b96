//! Configuration and invocation surface over a [`ToolRunner`].
//!
//! The validator is sensitive to argument order, so [`Validator::compute_arguments`]
//! always emits: level, format string, colour, copyright suppression, tool options,
//! then input paths.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use e_release_fetcher::VersionTriple;
use serde::Deserialize;

use crate::e_error::{LauncherError, Result};
use crate::e_options::OptionList;
use crate::e_output::ValidatorOutput;
use crate::e_runner::{JavaRunner, ToolRunner};

pub const DO_NOT_DISPLAY_COPYRIGHT_OPTION: &str = "--do-not-display-copyright";
pub const FORMAT_STRING_OPTION: &str = "--format-string";
pub const USE_COLOR_OPTION: &str = "--use-color";
pub const HELP_OPTION: &str = "--help";
pub const DEFAULT_OUTPUT_FILE: &str = "riseclipse_output.txt";

/// Line of `--help` output that carries the copyright banner with the version.
const HELP_VERSION_LINE: usize = 16;
const VERSION_MARKER: &str = "version: ";

/// Lowest severity the validator reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputLevel {
    Debug,
    Info,
    Notice,
    #[default]
    Warning,
    Error,
}

impl OutputLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputLevel::Debug => "debug",
            OutputLevel::Info => "info",
            OutputLevel::Notice => "notice",
            OutputLevel::Warning => "warning",
            OutputLevel::Error => "error",
        }
    }

    /// `--warning` and friends.
    pub fn as_flag(&self) -> String {
        format!("--{}", self.as_str())
    }
}

impl fmt::Display for OutputLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "debug" => Ok(OutputLevel::Debug),
            "info" => Ok(OutputLevel::Info),
            "notice" => Ok(OutputLevel::Notice),
            "warning" => Ok(OutputLevel::Warning),
            "error" => Ok(OutputLevel::Error),
            _ => Err(format!("unknown output level: {}", s)),
        }
    }
}

/// Which presentation flags an invocation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentMode {
    /// When false the copyright banner is suppressed regardless of the setting.
    pub display_copyright: bool,
    pub use_format: bool,
    pub set_color: bool,
}

impl ArgumentMode {
    /// Output meant for the line parser: no banner, default line format.
    pub const PARSED: ArgumentMode = ArgumentMode {
        display_copyright: false,
        use_format: false,
        set_color: false,
    };
    pub const TEXT: ArgumentMode = ArgumentMode {
        display_copyright: true,
        use_format: true,
        set_color: false,
    };
    pub const STDOUT: ArgumentMode = ArgumentMode {
        display_copyright: true,
        use_format: true,
        set_color: true,
    };
}

impl Default for ArgumentMode {
    fn default() -> Self {
        ArgumentMode::TEXT
    }
}

/// A configured validator session: level, presentation flags, options and inputs.
#[derive(Debug, Clone)]
pub struct Validator<R: ToolRunner = JavaRunner> {
    runner: R,
    level: OutputLevel,
    format_string: Option<String>,
    use_color: bool,
    display_copyright: bool,
    options: OptionList,
    files: Vec<String>,
}

impl Validator<JavaRunner> {
    /// A validator launched with `java -jar <jar_path>`.
    pub fn with_jar(jar_path: impl Into<PathBuf>) -> Self {
        Validator::new(JavaRunner::new(jar_path))
    }

    pub fn set_jar_file(&mut self, jar_path: impl Into<PathBuf>) {
        self.runner.set_jar_file(jar_path);
    }

    pub fn set_java_command(&mut self, command: impl Into<PathBuf>) {
        self.runner.set_java_command(command);
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.runner.set_timeout(timeout);
    }
}

impl<R: ToolRunner> Validator<R> {
    pub fn new(runner: R) -> Self {
        Validator {
            runner,
            level: OutputLevel::default(),
            format_string: None,
            use_color: false,
            display_copyright: true,
            options: OptionList::new(),
            files: Vec::new(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }

    /// Exit code of the last run.
    pub fn result_code(&self) -> Option<i32> {
        self.runner.result_code()
    }

    pub fn output_level(&self) -> OutputLevel {
        self.level
    }

    pub fn set_output_level(&mut self, level: OutputLevel) {
        self.level = level;
    }

    pub fn output_format(&self) -> Option<&str> {
        self.format_string.as_deref()
    }

    /// Sets the `--format-string` passed in text modes. An empty string unsets it.
    pub fn set_output_format(&mut self, format: impl Into<String>) {
        let format = format.into();
        self.format_string = if format.is_empty() { None } else { Some(format) };
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    pub fn set_use_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    pub fn display_copyright(&self) -> bool {
        self.display_copyright
    }

    pub fn set_display_copyright(&mut self, display: bool) {
        self.display_copyright = display;
    }

    pub fn add_file(&mut self, file: impl AsRef<Path>) {
        self.files.push(file.as_ref().to_string_lossy().into_owned());
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
    }

    /// See [`OptionList::add`].
    pub fn add_option(&mut self, flag: &str, value: Option<&str>) {
        self.options.add(flag, value);
    }

    pub fn remove_option(&mut self, flag: &str) -> bool {
        self.options.remove(flag)
    }

    pub fn options(&self) -> &OptionList {
        &self.options
    }

    /// Builds the argument list for one invocation.
    ///
    /// ```
    /// use riseclipse_e::e_validator::{ArgumentMode, OutputLevel, Validator};
    ///
    /// let mut v = Validator::with_jar("RiseClipseValidatorSCL.jar");
    /// v.set_output_level(OutputLevel::Error);
    /// v.add_option("--opt1", None);
    /// v.add_file("a.xml");
    /// v.add_file("b");
    /// assert_eq!(
    ///     v.compute_arguments(ArgumentMode::TEXT),
    ///     vec!["--error", "--opt1", "a.xml", "b"]
    /// );
    /// ```
    pub fn compute_arguments(&self, mode: ArgumentMode) -> Vec<String> {
        let mut arguments = vec![self.level.as_flag()];
        if mode.use_format {
            if let Some(format) = &self.format_string {
                arguments.push(FORMAT_STRING_OPTION.to_string());
                arguments.push(format.clone());
            }
        }
        if mode.set_color && self.use_color {
            arguments.push(USE_COLOR_OPTION.to_string());
        }
        if (!mode.display_copyright || !self.display_copyright)
            && !self.options.contains(DO_NOT_DISPLAY_COPYRIGHT_OPTION)
        {
            arguments.push(DO_NOT_DISPLAY_COPYRIGHT_OPTION.to_string());
        }
        arguments.extend(self.options.to_args());
        arguments.extend(self.files.iter().cloned());
        arguments
    }

    fn run_mode(&mut self, mode: ArgumentMode) -> Result<String> {
        let arguments = self.compute_arguments(mode);
        Ok(self.runner.run(&arguments)?.stdout)
    }

    /// Runs the validator and parses its output into messages.
    pub fn validate(&mut self) -> Result<ValidatorOutput> {
        let stdout = self.run_mode(ArgumentMode::PARSED)?;
        Ok(ValidatorOutput::from_text(&stdout))
    }

    /// Runs the validator and returns its raw output.
    pub fn validate_to_string(&mut self) -> Result<String> {
        self.run_mode(ArgumentMode::TEXT)
    }

    /// Runs the validator and prints its raw output, coloured when enabled.
    pub fn validate_to_stdout(&mut self) -> Result<()> {
        let text = self.run_mode(ArgumentMode::STDOUT)?;
        println!("{}", text);
        Ok(())
    }

    /// Runs the validator and writes its raw output to `output_file`.
    pub fn validate_to_file(&mut self, output_file: impl AsRef<Path>) -> Result<()> {
        let text = self.run_mode(ArgumentMode::TEXT)?;
        std::fs::write(output_file.as_ref(), text)?;
        Ok(())
    }

    /// Version of the validator, read from its `--help` banner.
    pub fn current_version(&mut self) -> Result<VersionTriple> {
        let help = self.runner.run(&[HELP_OPTION.to_string()])?.stdout;
        parse_version_from_help(&help).ok_or(LauncherError::VersionNotFound)
    }
}

/// Finds `version: X.Y.Z` in the validator's help text.
///
/// The banner line sits at a fixed offset; other lines are scanned when it does not
/// carry the marker, since the layout belongs to the external tool.
pub fn parse_version_from_help(help: &str) -> Option<VersionTriple> {
    let lines: Vec<&str> = help.lines().collect();
    let version_in = |line: &str| -> Option<VersionTriple> {
        let pos = line.find(VERSION_MARKER)?;
        line[pos + VERSION_MARKER.len()..]
            .split_whitespace()
            .next()?
            .parse()
            .ok()
    };
    lines
        .get(HELP_VERSION_LINE)
        .and_then(|line| version_in(*line))
        .or_else(|| lines.iter().find_map(|line| version_in(*line)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::e_runner::ProcessOutput;

    /// Records the arguments it was given and answers with canned stdout.
    #[derive(Debug, Default)]
    struct FakeRunner {
        stdout: String,
        calls: Vec<Vec<String>>,
        code: Option<i32>,
    }

    impl ToolRunner for FakeRunner {
        fn run(&mut self, arguments: &[String]) -> Result<ProcessOutput> {
            self.calls.push(arguments.to_vec());
            self.code = Some(0);
            Ok(ProcessOutput {
                stdout: self.stdout.clone(),
                stderr: String::new(),
                exit_code: self.code,
            })
        }

        fn result_code(&self) -> Option<i32> {
            self.code
        }
    }

    fn fake(stdout: &str) -> Validator<FakeRunner> {
        Validator::new(FakeRunner {
            stdout: stdout.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn default_level_is_warning() {
        let v = fake("");
        assert_eq!(v.compute_arguments(ArgumentMode::TEXT), vec!["--warning"]);
    }

    #[test]
    fn full_argument_order() {
        let mut v = fake("");
        v.set_output_level(OutputLevel::Info);
        v.set_output_format("%1$s %4$s");
        v.set_use_color(true);
        v.set_display_copyright(false);
        v.add_option("--xml-schema", Some("scl.xsd"));
        v.add_file("ied.icd");
        assert_eq!(
            v.compute_arguments(ArgumentMode::STDOUT),
            vec![
                "--info",
                "--format-string",
                "%1$s %4$s",
                "--use-color",
                "--do-not-display-copyright",
                "--xml-schema",
                "scl.xsd",
                "ied.icd",
            ]
        );
    }

    #[test]
    fn color_needs_both_mode_and_setting() {
        let mut v = fake("");
        v.set_use_color(true);
        assert!(!v
            .compute_arguments(ArgumentMode::TEXT)
            .contains(&USE_COLOR_OPTION.to_string()));
        v.set_use_color(false);
        assert!(!v
            .compute_arguments(ArgumentMode::STDOUT)
            .contains(&USE_COLOR_OPTION.to_string()));
    }

    #[test]
    fn copyright_suppression_is_never_duplicated() {
        let mut v = fake("");
        v.set_display_copyright(false);
        v.set_display_copyright(false);
        let args = v.compute_arguments(ArgumentMode::PARSED);
        let count = args
            .iter()
            .filter(|a| *a == DO_NOT_DISPLAY_COPYRIGHT_OPTION)
            .count();
        assert_eq!(count, 1);
        // Parsed mode does not change the stored setting.
        v.set_display_copyright(true);
        let _ = v.compute_arguments(ArgumentMode::PARSED);
        assert!(v.display_copyright());
        assert_eq!(v.compute_arguments(ArgumentMode::TEXT), vec!["--warning"]);
    }

    #[test]
    fn validate_parses_with_banner_suppressed() {
        let mut v = fake("WARNING [Schema] Element is not expected (file.xml:10)\n");
        v.add_file("file.xml");
        let out = v.validate().unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.warnings()[0].filename, "file.xml");
        assert_eq!(
            v.runner().calls[0],
            vec!["--warning", "--do-not-display-copyright", "file.xml"]
        );
        assert_eq!(v.result_code(), Some(0));
    }

    #[test]
    fn validate_ignores_format_string() {
        let mut v = fake("");
        v.set_output_format("%4$s");
        v.validate().unwrap();
        v.validate_to_string().unwrap();
        assert!(!v.runner().calls[0].contains(&FORMAT_STRING_OPTION.to_string()));
        assert!(v.runner().calls[1].contains(&FORMAT_STRING_OPTION.to_string()));
    }

    #[test]
    fn validate_to_file_writes_raw_text() {
        let mut v = fake("raw output\n");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT_FILE);
        v.validate_to_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "raw output\n");
    }

    #[test]
    fn version_from_fixed_banner_line() {
        let mut help: Vec<String> = (0..16).map(|i| format!("line {}", i)).collect();
        help.push("|    RiseClipseValidatorSCL version: 1.2.7 (3 March 2024)    |".to_string());
        let mut v = fake(&help.join("\n"));
        assert_eq!(v.current_version().unwrap(), VersionTriple::new(1, 2, 7));
        assert_eq!(v.runner().calls[0], vec![HELP_OPTION]);
    }

    #[test]
    fn version_found_elsewhere_or_missing() {
        assert_eq!(
            parse_version_from_help("banner\n  version: 2.0.1\n"),
            Some(VersionTriple::new(2, 0, 1))
        );
        let mut v = fake("usage: nothing here");
        assert!(matches!(
            v.current_version(),
            Err(LauncherError::VersionNotFound)
        ));
    }

    #[test]
    fn level_names_round_trip() {
        for name in ["debug", "info", "notice", "warning", "error"] {
            let level: OutputLevel = name.parse().unwrap();
            assert_eq!(level.as_flag(), format!("--{}", name));
        }
        assert!("fatal".parse::<OutputLevel>().is_err());
    }
}
