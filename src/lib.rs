#![doc = include_str!("../README.md")]

// Re-export std common modules
pub mod prelude {
    pub use std::env;
    pub use std::error::Error;
    pub use std::fs;
    pub use std::io;
    pub use std::path::{Path, PathBuf};
    pub use std::process::exit;
    pub use std::process::Child;
    pub use std::process::Command;
    pub use std::process::Stdio;
    pub use std::time::Instant;
    pub use log::{debug, error, info, warn};
}

pub mod e_cli;
pub use e_cli::Cli;
pub mod e_config;
pub mod e_error;
pub use e_error::LauncherError;
pub mod e_options;
pub mod e_output;
pub use e_output::{MessageFilter, ValidatorOutput};
pub mod e_parser;
pub use e_parser::parse_message;
pub mod e_runner;
pub use e_runner::{JavaRunner, ToolRunner};
pub mod e_types;
pub use e_types::{ParsedMessage, Severity};
pub mod e_validator;
pub use e_validator::Validator;
pub mod e_validator_scl;
pub use e_validator_scl::SclValidator;

pub use e_release_fetcher::{ReleaseFetcher, VersionTriple};
