use crate::e_error::{LauncherError, Result};
use crate::prelude::*;
use std::io::Read;
use std::thread;
use std::time::Duration;
use which::which;

/// Poll interval while waiting on a child with a deadline.
const WAIT_POLL: Duration = Duration::from_millis(25);

/// What one run of the external tool produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

/// Something that can execute the validator with a list of arguments.
///
/// The facade only needs this; one implementation exists per tool family.
pub trait ToolRunner {
    /// Runs the tool, blocking until it exits, and returns its captured output.
    fn run(&mut self, arguments: &[String]) -> Result<ProcessOutput>;

    /// Exit code of the last run, if any run completed.
    fn result_code(&self) -> Option<i32>;
}

/// Runs a `.jar` with `java -jar <jar> <args...>`.
#[derive(Debug, Clone)]
pub struct JavaRunner {
    java_command: Option<PathBuf>,
    jar_file: PathBuf,
    timeout: Option<Duration>,
    result_code: Option<i32>,
}

impl JavaRunner {
    /// The java command defaults to whatever `java` is on PATH.
    pub fn new(jar_path: impl Into<PathBuf>) -> Self {
        JavaRunner {
            java_command: which("java").ok(),
            jar_file: jar_path.into(),
            timeout: None,
            result_code: None,
        }
    }

    /// Kills the tool and returns [`LauncherError::Timeout`] once `timeout` elapses.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub fn set_jar_file(&mut self, jar_path: impl Into<PathBuf>) {
        self.jar_file = jar_path.into();
    }

    pub fn set_java_command(&mut self, command: impl Into<PathBuf>) {
        self.java_command = Some(command.into());
    }

    pub fn jar_file(&self) -> &Path {
        &self.jar_file
    }

    pub fn java_command(&self) -> Option<&Path> {
        self.java_command.as_deref()
    }

    fn display_command(&self, java: &Path, arguments: &[String]) -> String {
        let mut parts = vec![
            java.display().to_string(),
            "-jar".to_string(),
            self.jar_file.display().to_string(),
        ];
        parts.extend(arguments.iter().cloned());
        parts.join(" ")
    }
}

impl ToolRunner for JavaRunner {
    fn run(&mut self, arguments: &[String]) -> Result<ProcessOutput> {
        if !self.jar_file.exists() {
            return Err(LauncherError::MissingArtifact(self.jar_file.clone()));
        }
        let java = self
            .java_command
            .clone()
            .ok_or(LauncherError::JavaNotFound)?;
        let full_command = self.display_command(&java, arguments);
        debug!("Running: {}", full_command);

        let mut cmd = Command::new(&java);
        cmd.arg("-jar")
            .arg(&self.jar_file)
            .args(arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|source| LauncherError::Launch {
            command: full_command.clone(),
            source,
        })?;

        // Drain both pipes so a chatty child never blocks on a full buffer.
        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let status = match wait_with_timeout(&mut child, self.timeout)? {
            Some(status) => status,
            None => {
                self.result_code = None;
                return Err(LauncherError::Timeout {
                    command: full_command,
                    timeout: self.timeout.unwrap_or_default(),
                });
            }
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();
        if !stderr.trim().is_empty() {
            debug!("validator stderr:\n{}", stderr.trim_end());
        }
        self.result_code = status.code();
        debug!("validator exited with {:?}", self.result_code);
        Ok(ProcessOutput {
            stdout,
            stderr,
            exit_code: self.result_code,
        })
    }

    fn result_code(&self) -> Option<i32> {
        self.result_code
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Waits for `child`, killing it once `timeout` passes. `Ok(None)` means it was killed.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Option<Duration>,
) -> io::Result<Option<std::process::ExitStatus>> {
    let Some(timeout) = timeout else {
        return child.wait().map(Some);
    };
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {}
            Err(e) => {
                error!("lost track of pid {}: {}", child.id(), e);
                terminate(child);
                return Err(e);
            }
        }
        if Instant::now() >= deadline {
            error!("validator exceeded {:?}, killing pid {}", timeout, child.id());
            terminate(child);
            return Ok(None);
        }
        thread::sleep(WAIT_POLL);
    }
}

/// Kills `child` and reaps it. Its pipes close, so the reader threads finish on their own.
fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("kill pid {}: {}", child.id(), e);
    }
    let _ = child.wait();
}
