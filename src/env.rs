//! Key-value access to the environment.
//!
//! Both placeholder substitution (reader) and env file loading (writer) go
//! through [`EnvStore`] instead of touching `std::env` directly, so tests can
//! swap in a [`MemoryEnv`] and leave the real process environment alone.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::EnvfigError;

/// Read/write access to a set of environment variables.
pub trait EnvStore: Send + Sync {
    /// Look up a variable. `None` if it is unset or not valid unicode.
    fn get(&self, key: &str) -> Option<String>;

    /// Set a variable, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), EnvfigError>;
}

impl<S: EnvStore + ?Sized> EnvStore for Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EnvfigError> {
        (**self).set(key, value)
    }
}

/// The real process environment.
///
/// Writes are not synchronized with other threads reading the environment.
/// Load env files from a single startup path before spawning threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EnvfigError> {
        validate_assignment(key, value)?;
        // SAFETY: env files are loaded during single-threaded startup; callers
        // that load concurrently must serialize access themselves.
        unsafe {
            std::env::set_var(key, value);
        }
        Ok(())
    }
}

/// An in-memory environment, isolated from the process.
#[derive(Debug, Default)]
pub struct MemoryEnv {
    vars: Mutex<HashMap<String, String>>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `(key, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            vars: Mutex::new(vars),
        }
    }

    /// Snapshot of all variables currently stored.
    pub fn vars(&self) -> HashMap<String, String> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.vars.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EnvStore for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EnvfigError> {
        validate_assignment(key, value)?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reject assignments the platform would refuse (`set_var` panics on these).
fn validate_assignment(key: &str, value: &str) -> Result<(), EnvfigError> {
    let reason = if key.is_empty() {
        "key is empty"
    } else if key.contains('=') {
        "key contains '='"
    } else if key.contains('\0') {
        "key contains a NUL byte"
    } else if value.contains('\0') {
        "value contains a NUL byte"
    } else {
        return Ok(());
    };
    Err(EnvfigError::SetVar {
        key: key.to_string(),
        reason: reason.to_string(),
    })
}
