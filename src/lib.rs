//! Find a config file by name, fill in `${VAR}` placeholders from the
//! environment, and deserialize it into your struct. Load `.env` files first
//! to seed that environment.
//!
//! ```ignore
//! envfig::load_env::<&str>(&[])?;                       // reads ./.env
//! let config: AppConfig = envfig::load_config("app", None)?; // config/app.yaml
//! ```
//!
//! # Loading a config file
//!
//! [`ConfigLoader`] runs three steps per call:
//!
//! 1. **Locate.** Each search directory (default: `config`) is listed and the
//!    first entry whose stem equals the logical name, ignoring case, with an
//!    accepted extension is read. Entries are visited in file-name order.
//!    See [`types`] for the [`ExtensionPolicy`] rules.
//! 2. **Substitute.** Every `${NAME}` is replaced with the value of `NAME`
//!    from the environment. The rewrite is plain text and happens before
//!    parsing, so it works the same in YAML, JSON, or anything else.
//! 3. **Deserialize.** The text goes to the loader's [`Deserializer`]
//!    ([`YamlDeserializer`] unless you pick another). Struct field mapping is
//!    entirely serde's.
//!
//! ```text
//! config/
//!   app.yaml        name: ${APP_NAME}
//!                   version: 1.0
//! ```
//!
//! ```ignore
//! #[derive(Deserialize)]
//! struct AppConfig { name: String, version: f64 }
//!
//! let config: AppConfig = ConfigLoader::new().load("app")?;
//! ```
//!
//! # Loading `.env` files
//!
//! [`EnvFileLoader`] reads `KEY=VALUE` lines, skipping blanks and `#`
//! comments, and sets each variable as it goes. The first malformed line
//! aborts the load; variables set before it stay set. See [`dotenv`] for the
//! exact line format.
//!
//! # The environment as a dependency
//!
//! Both halves talk to the environment through [`EnvStore`]. The default,
//! [`ProcessEnv`], is the real process environment, which is global and
//! unsynchronized: call these loaders from one startup path, before spawning
//! threads. Tests and sandboxes can pass a [`MemoryEnv`] instead.
//!
//! # Error handling
//!
//! Every operation returns [`EnvfigError`]. Nothing is retried. A missing
//! placeholder variable comes back as [`EnvfigError::VariableNotFound`], an
//! ordinary error value, but it means the environment is misconfigured and
//! should usually stop startup; [`EnvfigError::is_fatal`] reports it.

pub mod dotenv;
pub mod env;
pub mod error;
pub mod file;
pub mod format;
pub mod substitute;
pub mod types;

mod loader;

#[cfg(test)]
mod fixtures;

use std::path::Path;

use serde::de::DeserializeOwned;

pub use dotenv::EnvFileLoader;
pub use env::{EnvStore, MemoryEnv, ProcessEnv};
pub use error::EnvfigError;
pub use file::LocatedFile;
pub use format::{
    Deserializer, FnDeserializer, JsonDeserializer, TomlDeserializer, YamlDeserializer,
};
pub use loader::ConfigLoader;
pub use substitute::Substitutor;
pub use types::{ExtensionPolicy, SearchPath};

/// Load config `name` from `dir` (default: `config`) with the default loader.
pub fn load_config<T: DeserializeOwned>(name: &str, dir: Option<&Path>) -> Result<T, EnvfigError> {
    ConfigLoader::new()
        .search_paths(loader::dirs_or_default(dir))
        .load(name)
}

/// Load `.env` files relative to the working directory into the process
/// environment. An empty slice loads `.env`.
pub fn load_env<P: AsRef<Path>>(paths: &[P]) -> Result<(), EnvfigError> {
    EnvFileLoader::new().load_files(paths)
}
