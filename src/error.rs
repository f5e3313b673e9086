use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvfigError {
    #[error("Failed to read config directory {dir}: {source}")]
    Directory {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported extension: no recognized config file named '{name}'")]
    UnsupportedExtension { name: String },

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A `${NAME}` placeholder names a variable that is unset or empty.
    ///
    /// Returned like every other error, but it means the environment is
    /// misconfigured: treat it as fatal rather than retrying.
    #[error("Environment variable {name} not found")]
    VariableNotFound { name: String },

    #[error("Failed to deserialize {path}: {reason}")]
    Unmarshal { path: PathBuf, reason: String },

    #[error("Failed to open env file {path}: {source}")]
    OpenEnvFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid .env format in {path} (line {line_number}): {line}")]
    InvalidEnvFormat {
        path: PathBuf,
        line_number: usize,
        line: String,
    },

    #[error("Failed to read env file {path}: {source}")]
    EnvFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot set environment variable '{key}': {reason}")]
    SetVar { key: String, reason: String },

    #[error("No search paths given; pass at least one to .search_paths()")]
    NoSearchPath,
}

impl EnvfigError {
    /// True when the requested file or directory does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            EnvfigError::UnsupportedExtension { .. } => true,
            EnvfigError::Directory { source, .. } | EnvfigError::OpenEnvFile { source, .. } => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }

    /// True for errors that indicate a misconfigured environment and should
    /// stop startup instead of being handled.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EnvfigError::VariableNotFound { .. })
    }
}
