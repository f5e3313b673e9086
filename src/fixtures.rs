#[cfg(test)]
pub mod test {
    use serde::Deserialize;

    /// The two-field shape used throughout the loader tests.
    #[derive(Deserialize, Debug, Default, PartialEq)]
    pub struct AppConfig {
        pub name: String,
        #[serde(deserialize_with = "string_or_number")]
        pub version: String,
    }

    /// Nested settings with an optional field.
    #[derive(Deserialize, Debug, PartialEq)]
    pub struct ServerConfig {
        pub host: String,
        pub port: u16,
        #[serde(default)]
        pub debug: bool,
        pub database: DbConfig,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    pub struct DbConfig {
        pub url: String,
        pub pool_size: Option<usize>,
    }

    /// Accept `version: 1.0` as well as `version: "1.0"`.
    ///
    /// YAML reads an unquoted `1.0` as a float; keep the source spelling by
    /// going through the scalar's string form.
    fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Scalar {
            Str(String),
            Int(i64),
            Float(f64),
        }

        Ok(match Scalar::deserialize(deserializer)? {
            Scalar::Str(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => format!("{f:?}"),
        })
    }
}
