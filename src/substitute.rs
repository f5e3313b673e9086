//! `${NAME}` placeholder expansion.
//!
//! Pure text rewriting that runs before deserialization and knows nothing about
//! the target format. Every `${NAME}` (NAME = one or more ASCII letters,
//! digits, or underscores) is replaced with the value of the environment
//! variable `NAME` in a single left-to-right pass. Anything else inside `${}`,
//! such as `${CAFÉ}`, is left as written. Inserted values are taken literally:
//! a value containing `${OTHER}` is not expanded again.
//!
//! Expansion is all-or-nothing. If any referenced variable is unset or empty,
//! the whole call fails with [`EnvfigError::VariableNotFound`] naming the first
//! such variable, and no partially rewritten text is returned.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::env::{EnvStore, ProcessEnv};
use crate::error::EnvfigError;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("valid placeholder regex"));

/// Expands placeholders from an [`EnvStore`].
pub struct Substitutor<'a> {
    env: &'a dyn EnvStore,
}

impl<'a> Substitutor<'a> {
    pub fn new(env: &'a dyn EnvStore) -> Self {
        Self { env }
    }

    /// Replace every `${NAME}` in `text` with the value of `NAME`.
    pub fn substitute(&self, text: &str) -> Result<String, EnvfigError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut replaced = 0usize;

        for caps in PLACEHOLDER.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str();
            let value = self
                .env
                .get(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| EnvfigError::VariableNotFound {
                    name: name.to_string(),
                })?;

            out.push_str(&text[last..whole.start()]);
            out.push_str(&value);
            last = whole.end();
            replaced += 1;
        }

        if replaced == 0 {
            return Ok(text.to_string());
        }
        out.push_str(&text[last..]);
        debug!(placeholders = replaced, "expanded environment placeholders");
        Ok(out)
    }
}

/// Expand placeholders from the process environment.
pub fn substitute_env(text: &str) -> Result<String, EnvfigError> {
    Substitutor::new(&ProcessEnv).substitute(text)
}
