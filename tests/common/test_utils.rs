#![allow(dead_code)]
use std::fs;
use std::io::Result as IoResult;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::{tempdir, TempDir};

/// Diagnostics printed by the fake validator, one per severity plus a banner line
/// that is not a diagnostic.
pub const FAKE_DIAGNOSTICS: &str = "\
ERROR   [NSD] DataObject Beh is missing (ied.icd:120)
WARNING [Schema] Element is not expected (ied.icd:10)
NOTICE  [SCL] Unused DataTypeTemplate (ied.icd:300)
INFO    [Setup] Loading nsd files (nsd:0)
RiseClipse validation done
";

pub const FAKE_VERSION: &str = "1.2.7";

static SCRIPT_LOCK: Mutex<()> = Mutex::new(());

/// Serialises tests that write and then execute scripts, so no other thread forks
/// while a script is still open for writing (ETXTBSY).
pub fn serial() -> MutexGuard<'static, ()> {
    SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// A temporary directory holding a placeholder jar and a fake `java`.
pub struct TestWorkspace {
    /// Removed with its contents on drop.
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> IoResult<Self> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path().to_path_buf();
        Ok(TestWorkspace { temp_dir, root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// An empty file standing in for the validator jar.
    pub fn write_jar(&self) -> IoResult<PathBuf> {
        let jar = self.root.join("RiseClipseValidatorSCL.jar");
        fs::write(&jar, b"")?;
        Ok(jar)
    }

    /// Writes an executable shell script called as `java -jar <jar> <args...>`.
    /// `body` sees only the validator arguments in `$@`.
    #[cfg(unix)]
    pub fn write_java(&self, body: &str) -> IoResult<PathBuf> {
        use std::os::unix::fs::PermissionsExt;
        let script = self.root.join("fake-java");
        fs::write(&script, format!("#!/bin/sh\nshift 2\n{}\n", body))?;
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
        Ok(script)
    }

    /// A fake validator that answers `--help` with a banner carrying
    /// [`FAKE_VERSION`] on line 17, records its arguments in `args.txt`, prints
    /// [`FAKE_DIAGNOSTICS`] and exits with `exit_code`.
    #[cfg(unix)]
    pub fn write_fake_validator(&self, exit_code: i32) -> IoResult<PathBuf> {
        let args_file = self.root.join("args.txt");
        self.write_java(&format!(
            r#"for arg in "$@"; do
  if [ "$arg" = "--help" ]; then
    i=0
    while [ $i -lt 16 ]; do echo "usage line $i"; i=$((i+1)); done
    echo "Copyright (c) 2016-2024 CentraleSupelec & EDF. RiseClipseValidatorSCL version: {version} (1 March 2024)"
    exit 0
  fi
done
echo "$@" > "{args}"
cat <<'EOF'
{diagnostics}EOF
echo "some trace on stderr" >&2
exit {code}"#,
            version = FAKE_VERSION,
            args = args_file.display(),
            diagnostics = FAKE_DIAGNOSTICS,
            code = exit_code,
        ))
    }

    /// Arguments the fake validator received on its last non-help run.
    pub fn recorded_args(&self) -> IoResult<String> {
        Ok(fs::read_to_string(self.root.join("args.txt"))?
            .trim()
            .to_string())
    }
}
