//! Config file discovery.
//!
//! [`find_config`] scans one directory for a file whose stem matches a logical
//! name; [`find_in_dirs`] tries several directories in order. See
//! [`types`](crate::types) for how stems and extensions are matched.
//!
//! Entries are visited sorted by file name, so "first match" does not depend
//! on the order the filesystem happens to return them in. Exactly one file is
//! returned per call. Only I/O errors on the directory itself or on the
//! matched file are reported; unreadable entries that do not match are never
//! opened.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::EnvfigError;
use crate::types::{ExtensionPolicy, SearchPath};

/// A config file found on disk, with its raw contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedFile {
    pub path: PathBuf,
    /// Everything after the first `.` of the file name.
    pub extension: String,
    pub content: Vec<u8>,
}

/// Split a file name into `(stem, extension)` on the first `.`.
///
/// Returns `None` for names without a `.`.
pub fn split_name(file_name: &str) -> Option<(&str, &str)> {
    file_name.split_once('.')
}

/// Find the config file named `name` in `dir`.
///
/// Fails with [`EnvfigError::Directory`] if `dir` cannot be listed,
/// [`EnvfigError::FileRead`] if the matched file cannot be read, and
/// [`EnvfigError::UnsupportedExtension`] if nothing matches.
pub fn find_config(
    dir: &Path,
    name: &str,
    policy: &ExtensionPolicy,
) -> Result<LocatedFile, EnvfigError> {
    match find_in_dir(dir, name, policy)? {
        Some(found) => Ok(found),
        None => Err(EnvfigError::UnsupportedExtension {
            name: name.to_string(),
        }),
    }
}

/// Find the config file named `name` in the first directory that has one.
///
/// Directories are tried in order. A directory that cannot be listed stops
/// the search with [`EnvfigError::Directory`].
pub fn find_in_dirs(
    dirs: &[PathBuf],
    name: &str,
    policy: &ExtensionPolicy,
) -> Result<LocatedFile, EnvfigError> {
    if dirs.is_empty() {
        return Err(EnvfigError::NoSearchPath);
    }
    for dir in dirs {
        if let Some(found) = find_in_dir(dir, name, policy)? {
            return Ok(found);
        }
    }
    Err(EnvfigError::UnsupportedExtension {
        name: name.to_string(),
    })
}

/// Resolve search paths to concrete directories, dropping any that cannot be
/// resolved (e.g. `Home` without a home directory).
pub fn expand_search_paths(search_paths: &[SearchPath]) -> Vec<PathBuf> {
    search_paths.iter().filter_map(SearchPath::resolve).collect()
}

fn find_in_dir(
    dir: &Path,
    name: &str,
    policy: &ExtensionPolicy,
) -> Result<Option<LocatedFile>, EnvfigError> {
    debug!(dir = %dir.display(), name, "scanning config directory");

    let dir_err = |e: std::io::Error| EnvfigError::Directory {
        dir: dir.to_path_buf(),
        source: e,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(dir_err)? {
        names.push(entry.map_err(dir_err)?.file_name());
    }
    names.sort();

    for os_name in names {
        let Some(file_name) = os_name.to_str() else {
            trace!(entry = ?os_name, "skipping non-unicode entry");
            continue;
        };
        let Some((stem, extension)) = split_name(file_name) else {
            trace!(entry = file_name, "skipping entry without extension");
            continue;
        };
        if !policy.accepts(extension) {
            trace!(entry = file_name, "skipping entry rejected by extension policy");
            continue;
        }
        if stem.to_lowercase() != name.to_lowercase() {
            continue;
        }

        let path = dir.join(file_name);
        let content = std::fs::read(&path).map_err(|e| EnvfigError::FileRead {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), extension, "found config file");
        return Ok(Some(LocatedFile {
            path,
            extension: extension.to_string(),
            content,
        }));
    }

    Ok(None)
}
