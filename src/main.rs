//! # riseclipse-e
//!
//! Command-line front end for the RiseClipse SCL validator jar.
//!
//! ```sh
//! riseclipse-e                      # compare local jar with the latest release
//! riseclipse-e --download latest    # fetch the newest jar
//! riseclipse-e --download 1.2.7     # fetch a given version
//! riseclipse-e validate -f table ied.icd nsd/
//! ```

use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;
use e_release_fetcher::ReleaseFetcher;
use nu_ansi_term::Color;

use riseclipse_e::e_cli::{Command, DownloadTarget, ReportFormat};
use riseclipse_e::e_config::LauncherConfig;
use riseclipse_e::e_validator_scl::{
    SclValidator, RISECLIPSE_VALIDATOR_SCL_ARTIFACT, RISECLIPSE_VALIDATOR_SCL_REPOSITORY,
};
use riseclipse_e::{prelude::*, Cli, JavaRunner, VersionTriple};

pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();
    e_release_fetcher::register_user_crate!();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if let Some(target) = cli.download {
        return download(&config, target);
    }

    match cli.command {
        Some(Command::Validate {
            files,
            level,
            format,
            output,
            separator,
            xml_schema,
            display_nsd_messages,
            use_color,
        }) => {
            let mut scl = build_validator(&config);
            if let Some(level) = level {
                scl.set_output_level(level);
            }
            if let Some(schema) = xml_schema {
                scl.set_xml_schema(schema);
            }
            if display_nsd_messages {
                scl.set_display_nsd_messages();
            }
            if use_color {
                scl.set_use_color(true);
            }
            for file in &files {
                scl.add_file(file);
            }
            let separator =
                u8::try_from(separator).context("CSV separator must be a single ASCII character")?;
            validate(&mut scl, format, output.as_deref(), separator)?;
            match scl.result_code() {
                Some(0) | None => Ok(()),
                Some(code) => {
                    debug!("validator exit code {}", code);
                    exit(code)
                }
            }
        }
        None => report_version(&config),
    }
}

/// File settings with the command-line overrides applied.
fn load_config(cli: &Cli) -> Result<LauncherConfig> {
    let mut config = match &cli.config {
        Some(path) => LauncherConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LauncherConfig::load_from_dir(env::current_dir()?)?,
    };
    if let Some(jar) = &cli.jar {
        config.jar = Some(jar.clone());
    }
    if let Some(java) = &cli.java {
        config.java = Some(java.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = Some(timeout);
    }
    Ok(config)
}

fn build_validator(config: &LauncherConfig) -> SclValidator<JavaRunner> {
    let mut runner = JavaRunner::new(config.jar_path());
    config.apply_to_runner(&mut runner);
    let mut scl = SclValidator::with_runner(runner);
    config.apply(&mut scl);
    scl
}

fn fetcher(config: &LauncherConfig) -> ReleaseFetcher {
    let fetcher = ReleaseFetcher::new();
    match config.timeout() {
        Some(timeout) => fetcher.with_timeout(timeout),
        None => fetcher,
    }
}

fn paint(color: Color, text: String) -> String {
    if std::io::stdout().is_terminal() {
        color.bold().paint(text).to_string()
    } else {
        text
    }
}

fn report_version(config: &LauncherConfig) -> Result<()> {
    let jar = config.jar_path();
    if !jar.exists() {
        println!("It seems that the validator is missing.");
        println!(
            "You can download one using '--download latest' command line option \
             (or use a specific version instead of latest)."
        );
        return Ok(());
    }

    let mut scl = build_validator(config);
    let current = scl
        .current_version()
        .with_context(|| format!("Failed to read the version of {}", jar.display()))?;
    println!("Your version is: {}", paint(Color::Cyan, current.to_string()));

    let latest = match fetcher(config).get_latest_version(RISECLIPSE_VALIDATOR_SCL_REPOSITORY) {
        Ok(latest) => latest,
        Err(e) => {
            eprintln!("Could not determine the latest version: {}", e);
            return Ok(());
        }
    };
    match current.cmp(&latest) {
        std::cmp::Ordering::Less => {
            println!(
                "A new version is available: {}",
                paint(Color::Green, latest.to_string())
            );
            println!("You can download it using '--download latest' command line option");
        }
        std::cmp::Ordering::Equal => println!("Your version is the latest one"),
        std::cmp::Ordering::Greater => {
            println!("Your version is ahead of the latest release ({})", latest)
        }
    }
    Ok(())
}

fn download(config: &LauncherConfig, target: DownloadTarget) -> Result<()> {
    let fetcher = fetcher(config);
    let version: VersionTriple = match target {
        DownloadTarget::Latest => {
            match fetcher.get_latest_version(RISECLIPSE_VALIDATOR_SCL_REPOSITORY) {
                Ok(version) => {
                    println!("Latest version is {}", version);
                    version
                }
                Err(e) => {
                    eprintln!("Could not determine the latest version: {}", e);
                    return Ok(());
                }
            }
        }
        DownloadTarget::Version(version) => version,
    };
    let output = config.jar_path();
    match fetcher.download_version(
        RISECLIPSE_VALIDATOR_SCL_REPOSITORY,
        RISECLIPSE_VALIDATOR_SCL_ARTIFACT,
        &version,
        &output,
    ) {
        Ok(bytes) => println!(
            "Downloaded {} {} ({} bytes) to {}",
            RISECLIPSE_VALIDATOR_SCL_ARTIFACT,
            paint(Color::Green, version.to_string()),
            bytes,
            output.display()
        ),
        Err(e) => eprintln!("Downloading {} failed: {}", version, e),
    }
    Ok(())
}

fn validate(
    scl: &mut SclValidator<JavaRunner>,
    format: ReportFormat,
    output: Option<&Path>,
    separator: u8,
) -> Result<()> {
    let started = Instant::now();
    if format == ReportFormat::Text {
        match output {
            Some(path) => {
                scl.validate_to_file(path)?;
                println!("Validator output written to {}", path.display());
            }
            None => scl.validate_to_stdout()?,
        }
        debug!("validation took {:?}", started.elapsed());
        return Ok(());
    }

    let result = scl.validate()?;
    debug!(
        "validation took {:?}, {} messages",
        started.elapsed(),
        result.len()
    );
    for bad in result.malformed() {
        warn!("line {} not understood: {}", bad.line_number, bad.line);
    }

    match (format, output) {
        (ReportFormat::Csv, Some(path)) => {
            if result.to_csv(path, separator)?.is_empty() {
                println!("No messages to export, {} not written", path.display());
            } else {
                println!("CSV report written to {}", path.display());
            }
        }
        (ReportFormat::Csv, None) => print!("{}", result.to_csv_string(separator)?),
        (ReportFormat::Json, Some(path)) => {
            result.to_json(path)?;
        }
        (ReportFormat::Json, None) => {
            println!("{}", serde_json::to_string_pretty(&result.to_json_value()?)?)
        }
        (_, Some(path)) => fs::write(path, result.render_table(120))?,
        (_, None) => {
            println!("{}", result.to_table());
            let summary: Vec<String> = result
                .severity_counts()
                .into_iter()
                .filter(|(_, n)| *n > 0)
                .map(|(s, n)| format!("{} {}", n, s))
                .collect();
            if !summary.is_empty() {
                println!("{}", summary.join(", "));
            }
        }
    }
    Ok(())
}
