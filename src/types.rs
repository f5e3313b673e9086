//! Value types that control where config files are looked for and which
//! files count as config.
//!
//! # Discovery
//!
//! A loader holds a list of [`SearchPath`]s. They are resolved to concrete
//! directories and tried **in order**: the first directory holding a matching
//! file wins, and later directories are not consulted. Defaults to a single
//! relative `config` directory.
//!
//! # Extension policy
//!
//! Inside a directory, a file matches when its stem (name up to the first `.`)
//! equals the logical name case-insensitively **and** its extension passes the
//! [`ExtensionPolicy`]:
//!
//! - [`Allow`](ExtensionPolicy::Allow) (default: `yaml`, `yml`, `json`): only
//!   the listed extensions are candidates. Unrelated files are rejected
//!   deterministically.
//! - [`Deny`](ExtensionPolicy::Deny): every extension except the listed ones.
//!   [`ExtensionPolicy::legacy()`] denies `rs` only, so a `settings.rs` next
//!   to `settings.yaml` is skipped but anything else with the right stem is
//!   read.
//!
//! Files without an extension never match.

use std::path::PathBuf;

/// Directory name used when no search path is configured.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Extensions accepted by the default allow-list.
pub const DEFAULT_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Where to search for config files.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// Platform config directory for an app (XDG on Linux,
    /// ~/Library/Application Support on macOS), e.g. `Platform("myapp".into())`.
    Platform(String),
    /// A subdirectory under the user's home directory, e.g. `Home(".myapp")`.
    Home(&'static str),
    /// Current working directory.
    Cwd,
    /// An explicit path, absolute or relative to the working directory.
    Path(PathBuf),
}

impl SearchPath {
    /// Resolve to a concrete directory.
    ///
    /// Returns `None` if the path cannot be resolved (e.g. no home directory).
    pub fn resolve(&self) -> Option<PathBuf> {
        match self {
            SearchPath::Platform(app_name) => {
                let proj = directories::ProjectDirs::from("", "", app_name)?;
                Some(proj.config_dir().to_path_buf())
            }
            SearchPath::Home(subdir) => {
                let user = directories::UserDirs::new()?;
                Some(user.home_dir().join(subdir))
            }
            SearchPath::Cwd => std::env::current_dir().ok(),
            SearchPath::Path(p) => Some(p.clone()),
        }
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        SearchPath::Path(PathBuf::from(DEFAULT_CONFIG_DIR))
    }
}

impl From<PathBuf> for SearchPath {
    fn from(path: PathBuf) -> Self {
        SearchPath::Path(path)
    }
}

impl From<&std::path::Path> for SearchPath {
    fn from(path: &std::path::Path) -> Self {
        SearchPath::Path(path.to_path_buf())
    }
}

impl From<&str> for SearchPath {
    fn from(path: &str) -> Self {
        SearchPath::Path(PathBuf::from(path))
    }
}

/// Which file extensions are considered config files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionPolicy {
    /// Only these extensions match.
    Allow(Vec<String>),
    /// Every extension except these matches.
    Deny(Vec<String>),
}

impl ExtensionPolicy {
    /// Allow-list of the given extensions.
    pub fn allow<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExtensionPolicy::Allow(extensions.into_iter().map(Into::into).collect())
    }

    /// Deny-list of the given extensions.
    pub fn deny<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExtensionPolicy::Deny(extensions.into_iter().map(Into::into).collect())
    }

    /// Older behavior: accept any extension except Rust source files.
    pub fn legacy() -> Self {
        Self::deny(["rs"])
    }

    /// Whether a file with `extension` (text after the first `.`) is a candidate.
    ///
    /// Comparison is exact: `YAML` is not `yaml`.
    pub fn accepts(&self, extension: &str) -> bool {
        match self {
            ExtensionPolicy::Allow(list) => list.iter().any(|e| e == extension),
            ExtensionPolicy::Deny(list) => !list.iter().any(|e| e == extension),
        }
    }
}

impl Default for ExtensionPolicy {
    fn default() -> Self {
        Self::allow(DEFAULT_EXTENSIONS.iter().copied())
    }
}
