//! Stub engine executables.
//!
//! Each stub is a small `sh` script inside its own temporary directory,
//! standing in for the real engine binary in process-level tests.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

/// A throwaway engine script. The directory is removed on drop.
#[derive(Debug)]
pub struct StubEngine {
    dir: TempDir,
    path: PathBuf,
}

impl StubEngine {
    /// Create a stub running `body` under `/bin/sh`.
    ///
    /// The script sees the seed as `$1` and the simulation count as `$2`.
    ///
    /// # Errors
    ///
    /// Fails if the temporary directory or script cannot be written.
    pub fn new(body: &str) -> io::Result<Self> {
        Self::in_dir(tempfile::tempdir()?, body)
    }

    /// Stub that swallows its input and prints `output`.
    ///
    /// # Errors
    ///
    /// Fails if the temporary files cannot be written.
    pub fn printing(output: &str) -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let canned = dir.path().join("output.txt");
        fs::write(&canned, output)?;
        Self::in_dir(dir, &format!("cat > /dev/null\ncat '{}'", canned.display()))
    }

    /// Stub that records its stdin and arguments next to itself, then
    /// prints `output`.
    ///
    /// # Errors
    ///
    /// Fails if the temporary files cannot be written.
    pub fn recording(output: &str) -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let root = dir.path().display().to_string();
        fs::write(dir.path().join("output.txt"), output)?;
        Self::in_dir(
            dir,
            &format!(
                "cat > '{root}/stdin.txt'\necho \"$1 $2\" > '{root}/args.txt'\ncat '{root}/output.txt'"
            ),
        )
    }

    fn in_dir(dir: TempDir, body: &str) -> io::Result<Self> {
        let path = dir.path().join("engine.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        debug!(path = %path.display(), "Wrote stub engine");
        Ok(Self { dir, path })
    }

    /// Path of the executable script.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stdin captured by a [`recording`](Self::recording) stub.
    ///
    /// # Errors
    ///
    /// Fails if the stub has not run yet.
    pub fn recorded_stdin(&self) -> io::Result<String> {
        fs::read_to_string(self.dir.path().join("stdin.txt"))
    }

    /// `"<seed> <num_simulations>"` captured by a [`recording`](Self::recording) stub.
    ///
    /// # Errors
    ///
    /// Fails if the stub has not run yet.
    pub fn recorded_args(&self) -> io::Result<String> {
        Ok(fs::read_to_string(self.dir.path().join("args.txt"))?
            .trim_end()
            .to_string())
    }
}
