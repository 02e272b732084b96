//! Launcher for `RiseClipseValidatorSCL.jar`, the IEC 61850 SCL validator.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use crate::e_runner::{JavaRunner, ToolRunner};
use crate::e_validator::Validator;

/// Jar looked for in the working directory when none is given.
pub const RISECLIPSE_VALIDATOR_SCL_JAR: &str = "RiseClipseValidatorSCL.jar";
/// GitHub repository publishing the releases.
pub const RISECLIPSE_VALIDATOR_SCL_REPOSITORY: &str = "riseclipse-validator-scl2003";
/// Artifact base name inside a release (`<name>-<version>.jar`).
pub const RISECLIPSE_VALIDATOR_SCL_ARTIFACT: &str = "RiseClipseValidatorSCL";

/// Options understood by the SCL validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SclOption {
    /// Build explicit links before doing validation (on by default).
    MakeExplicitLinks,
    /// Validate against an XML schema; takes the schema path.
    XmlSchema,
    /// Also display messages about NSD files.
    DisplayNsdMessages,
    /// Exit with distinct codes for warnings and errors.
    UseDifferentExitCodes,
    /// Do not skip files and directories whose name starts with a dot.
    UseFilenamesStartingWithDot,
}

impl SclOption {
    pub fn flag(&self) -> &'static str {
        match self {
            SclOption::MakeExplicitLinks => "--make-explicit-links",
            SclOption::XmlSchema => "--xml-schema",
            SclOption::DisplayNsdMessages => "--display-nsd-messages",
            SclOption::UseDifferentExitCodes => "--use-different-exit-codes",
            SclOption::UseFilenamesStartingWithDot => "--use-filenames-starting-with-dot",
        }
    }

    pub fn takes_value(&self) -> bool {
        matches!(self, SclOption::XmlSchema)
    }
}

/// SCL validator session. Dereferences to the generic [`Validator`] for the
/// level, format, colour, copyright and file settings.
#[derive(Debug, Clone)]
pub struct SclValidator<R: ToolRunner = JavaRunner> {
    validator: Validator<R>,
}

impl SclValidator<JavaRunner> {
    /// Uses [`RISECLIPSE_VALIDATOR_SCL_JAR`] from the working directory.
    pub fn new() -> Self {
        Self::with_jar(RISECLIPSE_VALIDATOR_SCL_JAR)
    }

    pub fn with_jar(jar_path: impl Into<PathBuf>) -> Self {
        Self::with_runner(JavaRunner::new(jar_path))
    }
}

impl Default for SclValidator<JavaRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ToolRunner> SclValidator<R> {
    /// Starts with `--make-explicit-links` set, everything else unset.
    pub fn with_runner(runner: R) -> Self {
        let mut scl = SclValidator {
            validator: Validator::new(runner),
        };
        scl.set(SclOption::MakeExplicitLinks);
        scl
    }

    pub fn into_inner(self) -> Validator<R> {
        self.validator
    }

    /// Turns on a flag that takes no value. Value-taking options are ignored here;
    /// use the dedicated setter.
    pub fn set(&mut self, option: SclOption) {
        if option.takes_value() {
            log::warn!("{} needs a value, not setting it", option.flag());
            return;
        }
        self.validator.add_option(option.flag(), None);
    }

    pub fn unset(&mut self, option: SclOption) {
        self.validator.remove_option(option.flag());
    }

    pub fn is_set(&self, option: SclOption) -> bool {
        self.validator.options().contains(option.flag())
    }

    pub fn set_make_explicit_links(&mut self) {
        self.set(SclOption::MakeExplicitLinks);
    }

    pub fn unset_make_explicit_links(&mut self) {
        self.unset(SclOption::MakeExplicitLinks);
    }

    pub fn set_xml_schema(&mut self, schema_path: impl AsRef<Path>) {
        let schema = schema_path.as_ref().to_string_lossy();
        self.validator
            .add_option(SclOption::XmlSchema.flag(), Some(&*schema));
    }

    pub fn unset_xml_schema(&mut self) {
        self.unset(SclOption::XmlSchema);
    }

    pub fn xml_schema(&self) -> Option<&str> {
        self.validator.options().value_of(SclOption::XmlSchema.flag())
    }

    pub fn set_display_nsd_messages(&mut self) {
        self.set(SclOption::DisplayNsdMessages);
    }

    pub fn unset_display_nsd_messages(&mut self) {
        self.unset(SclOption::DisplayNsdMessages);
    }

    pub fn set_use_different_exit_codes(&mut self) {
        self.set(SclOption::UseDifferentExitCodes);
    }

    pub fn unset_use_different_exit_codes(&mut self) {
        self.unset(SclOption::UseDifferentExitCodes);
    }

    pub fn set_use_filenames_starting_with_dot(&mut self) {
        self.set(SclOption::UseFilenamesStartingWithDot);
    }

    pub fn unset_use_filenames_starting_with_dot(&mut self) {
        self.unset(SclOption::UseFilenamesStartingWithDot);
    }
}

impl<R: ToolRunner> Deref for SclValidator<R> {
    type Target = Validator<R>;

    fn deref(&self) -> &Self::Target {
        &self.validator
    }
}

impl<R: ToolRunner> DerefMut for SclValidator<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.validator
    }
}
