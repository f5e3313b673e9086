//! `.env` file loading.
//!
//! Each file is read line by line:
//!
//! - blank lines and lines whose first non-whitespace character is `#` are
//!   skipped;
//! - every other line must look like `KEY=VALUE`, where `KEY` is one or more of
//!   `[A-Za-z0-9_.-]` and `VALUE` is anything (possibly empty);
//! - the line is split at the first `=`, key and value are trimmed, and the
//!   pair is written to the [`EnvStore`] right away.
//!
//! "Whitespace" means ASCII whitespace throughout. A non-breaking space before
//! `=` makes the line invalid, and one at either end of a value is kept.
//!
//! The first bad line, setter failure, or read error stops everything: later
//! lines and later files are not processed, and assignments already made stay
//! in place. Values are never quoted or unescaped: `KEY="a b"` sets `"a b"`
//! including the quotes.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use crate::env::{EnvStore, ProcessEnv};
use crate::error::EnvfigError;

/// File loaded when no paths are given.
pub const DEFAULT_ENV_FILE: &str = ".env";

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?-u:\s)*[A-Za-z0-9_.-]+(?-u:\s)*=.*$").expect("valid assignment regex")
});

/// What a single line of an env file holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvLine<'a> {
    /// Blank or comment line.
    Skip,
    Assignment { key: &'a str, value: &'a str },
    Invalid,
}

/// Classify one line (without its trailing newline).
pub fn parse_line(line: &str) -> EnvLine<'_> {
    let trimmed = trim_ascii(line);
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return EnvLine::Skip;
    }
    if !ASSIGNMENT.is_match(line) {
        return EnvLine::Invalid;
    }
    match line.split_once('=') {
        Some((key, value)) if !trim_ascii(key).is_empty() => EnvLine::Assignment {
            key: trim_ascii(key),
            value: trim_ascii(value),
        },
        _ => EnvLine::Invalid,
    }
}

/// Trim the characters ASCII `\s` matches (this includes vertical tab).
fn trim_ascii(s: &str) -> &str {
    s.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r'))
}

/// Loads `.env` files into an [`EnvStore`].
pub struct EnvFileLoader {
    base_dir: PathBuf,
    env: Arc<dyn EnvStore>,
}

impl EnvFileLoader {
    /// Loader that resolves paths against the working directory and writes to
    /// the process environment.
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            env: Arc::new(ProcessEnv),
        }
    }

    /// Resolve relative env file paths against `dir` (default: `.`).
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Write assignments to `env` instead of the process environment.
    pub fn env_store(mut self, env: impl EnvStore + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Load [`DEFAULT_ENV_FILE`].
    pub fn load(&self) -> Result<(), EnvfigError> {
        self.load_files(&[DEFAULT_ENV_FILE])
    }

    /// Load each file in order. An empty list loads [`DEFAULT_ENV_FILE`].
    pub fn load_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<(), EnvfigError> {
        if paths.is_empty() {
            return self.load();
        }
        for path in paths {
            self.load_file(&self.base_dir.join(path))?;
        }
        Ok(())
    }

    /// Load every assignment from any buffered reader. `path` is only used in
    /// error messages.
    pub fn load_reader<R: BufRead>(&self, reader: R, path: &Path) -> Result<usize, EnvfigError> {
        let mut applied = 0;
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| EnvfigError::EnvFileRead {
                path: path.to_path_buf(),
                source: e,
            })?;
            match parse_line(&line) {
                EnvLine::Skip => {}
                EnvLine::Assignment { key, value } => {
                    self.env.set(key, value)?;
                    debug!(key, "set environment variable");
                    applied += 1;
                }
                EnvLine::Invalid => {
                    return Err(EnvfigError::InvalidEnvFormat {
                        path: path.to_path_buf(),
                        line_number: idx + 1,
                        line,
                    });
                }
            }
        }
        Ok(applied)
    }

    fn load_file(&self, path: &Path) -> Result<(), EnvfigError> {
        let file = File::open(path).map_err(|e| EnvfigError::OpenEnvFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), "loading env file");
        // The handle is dropped on every return path out of load_reader.
        let applied = self.load_reader(BufReader::new(file), path)?;
        debug!(path = %path.display(), applied, "loaded env file");
        Ok(())
    }
}

impl Default for EnvFileLoader {
    fn default() -> Self {
        Self::new()
    }
}
