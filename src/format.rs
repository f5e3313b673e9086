//! Pluggable deserializers.
//!
//! The loader hands the substituted file text to a [`Deserializer`]; all
//! mapping from document to struct fields is serde's job. [`YamlDeserializer`]
//! is the default and accepts JSON documents as well, since JSON is a subset of
//! YAML.

use serde::de::DeserializeOwned;

/// Turns config text into a typed value.
///
/// Errors are returned as a message; the loader wraps them into
/// [`EnvfigError::Unmarshal`](crate::EnvfigError::Unmarshal) together with the
/// file path.
pub trait Deserializer {
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T, String>;
}

/// YAML (and therefore JSON) via `serde_yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDeserializer;

impl Deserializer for YamlDeserializer {
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T, String> {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }
}

/// Strict JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDeserializer;

impl Deserializer for JsonDeserializer {
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }
}

/// TOML via `toml`. Pair with an extension policy that allows `toml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlDeserializer;

impl Deserializer for TomlDeserializer {
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}

/// Adapts a closure that parses text into an intermediate `serde_json::Value`.
///
/// Useful for formats without a serde deserializer of their own, or for
/// preprocessing a document before it is mapped onto the target type:
///
/// ```ignore
/// let loader = ConfigLoader::new().deserializer(FnDeserializer::new(|text: &str| {
///     my_format::parse(text).map_err(|e| e.to_string())
/// }));
/// ```
pub struct FnDeserializer<F> {
    parse: F,
}

impl<F> FnDeserializer<F>
where
    F: Fn(&str) -> Result<serde_json::Value, String>,
{
    pub fn new(parse: F) -> Self {
        Self { parse }
    }
}

impl<F> Deserializer for FnDeserializer<F>
where
    F: Fn(&str) -> Result<serde_json::Value, String>,
{
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T, String> {
        let value = (self.parse)(content)?;
        serde_json::from_value(value).map_err(|e| e.to_string())
    }
}
