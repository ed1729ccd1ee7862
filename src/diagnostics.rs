//! Diagnostic log for per-file parse failures.
//!
//! The log is a capability owned by the top-level run and passed down to
//! the parsing pipeline, so tests can inject an in-memory recorder instead
//! of touching the filesystem.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Name of the log file created in the working directory.
pub const LOG_FILE_NAME: &str = "cfdi-extract.log";

/// Capability for recording per-file failures.
pub trait DiagnosticLog {
    /// Record one failure for the given source file.
    fn record(&mut self, path: &Path, cause: &str);
}

/// File-backed log, truncated at startup, one line per failure.
#[derive(Debug)]
pub struct FileDiagnostics {
    file: File,
}

impl FileDiagnostics {
    /// Create or truncate the log file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self> {
        let file =
            File::create(path).with_context(|| format!("Failed to create log file: {}", path.display()))?;
        Ok(Self { file })
    }

    /// Append one free-form line, used for failures outside the parser
    /// such as clipboard delivery.
    pub fn note(&mut self, message: &str) {
        if let Err(error) = writeln!(self.file, "{message}") {
            crate::print_warning!("Failed to write to log file: {error}");
        }
    }
}

impl DiagnosticLog for FileDiagnostics {
    fn record(&mut self, path: &Path, cause: &str) {
        self.note(&format!("Failed to read {}: {cause}", path.display()));
    }
}

/// In-memory log for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryLog {
    pub entries: Vec<(PathBuf, String)>,
}

impl DiagnosticLog for MemoryLog {
    fn record(&mut self, path: &Path, cause: &str) {
        self.entries.push((path.to_path_buf(), cause.to_string()));
    }
}
