//! Optional `riseclipse.toml` settings. Command-line flags win over the file.
//!
//! ```toml
//! java = "/usr/lib/jvm/java-17/bin/java"
//! jar = "tools/RiseClipseValidatorSCL.jar"
//! level = "notice"
//! timeout_secs = 600
//! xml_schema = "SCL.xsd"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::e_error::{LauncherError, Result};
use crate::e_runner::{JavaRunner, ToolRunner};
use crate::e_validator::OutputLevel;
use crate::e_validator_scl::{SclValidator, RISECLIPSE_VALIDATOR_SCL_JAR};

pub const DEFAULT_CONFIG_FILE: &str = "riseclipse.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherConfig {
    pub java: Option<PathBuf>,
    pub jar: Option<PathBuf>,
    pub level: Option<OutputLevel>,
    pub format_string: Option<String>,
    pub use_color: Option<bool>,
    pub display_copyright: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub xml_schema: Option<PathBuf>,
    pub display_nsd_messages: Option<bool>,
}

impl LauncherConfig {
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| LauncherError::Config {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Loads `riseclipse.toml` from `dir` when present, defaults otherwise.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let candidate = dir.as_ref().join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            log::debug!("loading config from {}", candidate.display());
            Self::load(candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn jar_path(&self) -> PathBuf {
        self.jar
            .clone()
            .unwrap_or_else(|| PathBuf::from(RISECLIPSE_VALIDATOR_SCL_JAR))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Sets the interpreter, jar and timeout of `runner`.
    pub fn apply_to_runner(&self, runner: &mut JavaRunner) {
        runner.set_jar_file(self.jar_path());
        if let Some(java) = &self.java {
            runner.set_java_command(java);
        }
        runner.set_timeout(self.timeout());
    }

    /// Copies every setting present in the file onto `scl`.
    pub fn apply<R: ToolRunner>(&self, scl: &mut SclValidator<R>) {
        if let Some(level) = self.level {
            scl.set_output_level(level);
        }
        if let Some(format) = &self.format_string {
            scl.set_output_format(format.clone());
        }
        if let Some(use_color) = self.use_color {
            scl.set_use_color(use_color);
        }
        if let Some(display) = self.display_copyright {
            scl.set_display_copyright(display);
        }
        if let Some(schema) = &self.xml_schema {
            scl.set_xml_schema(schema);
        }
        match self.display_nsd_messages {
            Some(true) => scl.set_display_nsd_messages(),
            Some(false) => scl.unset_display_nsd_messages(),
            None => {}
        }
    }
}
