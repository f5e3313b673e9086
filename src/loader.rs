use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::env::{EnvStore, ProcessEnv};
use crate::error::EnvfigError;
use crate::file::{self, LocatedFile};
use crate::format::{Deserializer, YamlDeserializer};
use crate::substitute::Substitutor;
use crate::types::{ExtensionPolicy, SearchPath};

/// Finds a config file by logical name, expands `${VAR}` placeholders, and
/// deserializes it.
///
/// Pipeline per call: locate (first matching file across the search paths) →
/// substitute (from the configured [`EnvStore`]) → deserialize (with `D`).
/// Every step fails the whole call; nothing is retried.
///
/// ```ignore
/// let config: AppConfig = ConfigLoader::new()
///     .search_paths(vec![SearchPath::Path("config".into())])
///     .load("app")?;
/// ```
pub struct ConfigLoader<D = YamlDeserializer> {
    deserializer: D,
    policy: ExtensionPolicy,
    search_paths: Option<Vec<SearchPath>>,
    env: Arc<dyn EnvStore>,
    substitute: bool,
}

impl ConfigLoader<YamlDeserializer> {
    /// A loader with defaults: YAML, allow-list `yaml`/`yml`/`json`, the
    /// `config` directory, and the process environment.
    pub fn new() -> Self {
        Self {
            deserializer: YamlDeserializer,
            policy: ExtensionPolicy::default(),
            search_paths: None,
            env: Arc::new(ProcessEnv),
            substitute: true,
        }
    }
}

impl Default for ConfigLoader<YamlDeserializer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Deserializer> ConfigLoader<D> {
    /// Replace the deserializer.
    pub fn deserializer<D2: Deserializer>(self, deserializer: D2) -> ConfigLoader<D2> {
        ConfigLoader {
            deserializer,
            policy: self.policy,
            search_paths: self.search_paths,
            env: self.env,
            substitute: self.substitute,
        }
    }

    /// Set which extensions count as config files (default: allow `yaml`,
    /// `yml`, `json`).
    pub fn extension_policy(mut self, policy: ExtensionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the search paths. Tried in order; the first directory holding a
    /// matching file wins.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = Some(paths);
        self
    }

    /// Append a search path. If none have been set yet, starts from the
    /// default `config` directory.
    pub fn add_search_path(mut self, path: impl Into<SearchPath>) -> Self {
        self.search_paths
            .get_or_insert_with(|| vec![SearchPath::default()])
            .push(path.into());
        self
    }

    /// Read placeholders from `env` instead of the process environment.
    pub fn env_store(mut self, env: impl EnvStore + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Enable or disable `${VAR}` expansion (default: `true`).
    pub fn substitute(mut self, enabled: bool) -> Self {
        self.substitute = enabled;
        self
    }

    fn effective_search_paths(&self) -> Vec<SearchPath> {
        match &self.search_paths {
            Some(paths) => paths.clone(),
            None => vec![SearchPath::default()],
        }
    }

    /// Find the config file for `name` without parsing it.
    pub fn locate(&self, name: &str) -> Result<LocatedFile, EnvfigError> {
        let dirs = file::expand_search_paths(&self.effective_search_paths());
        file::find_in_dirs(&dirs, name, &self.policy)
    }

    /// Load config `name` from the configured search paths.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T, EnvfigError> {
        let found = self.locate(name)?;
        self.parse(found)
    }

    /// Load config `name` from `dir` only, ignoring the configured search paths.
    pub fn load_from<T: DeserializeOwned>(
        &self,
        name: &str,
        dir: impl AsRef<Path>,
    ) -> Result<T, EnvfigError> {
        let found = file::find_config(dir.as_ref(), name, &self.policy)?;
        self.parse(found)
    }

    /// Like [`load`](Self::load), writing into an existing value.
    ///
    /// `target` is left untouched if loading fails.
    pub fn load_into<T: DeserializeOwned>(
        &self,
        target: &mut T,
        name: &str,
    ) -> Result<(), EnvfigError> {
        *target = self.load(name)?;
        Ok(())
    }

    fn parse<T: DeserializeOwned>(&self, found: LocatedFile) -> Result<T, EnvfigError> {
        let LocatedFile { path, content, .. } = found;
        let text = String::from_utf8(content).map_err(|e| EnvfigError::Unmarshal {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let text = if self.substitute {
            Substitutor::new(self.env.as_ref()).substitute(&text)?
        } else {
            text
        };

        let value = self
            .deserializer
            .deserialize(&text)
            .map_err(|reason| EnvfigError::Unmarshal {
                path: path.clone(),
                reason,
            })?;
        debug!(path = %path.display(), "loaded config");
        Ok(value)
    }
}

/// Directories a default loader with `dir` would search.
pub(crate) fn dirs_or_default(dir: Option<&Path>) -> Vec<SearchPath> {
    match dir {
        Some(d) => vec![SearchPath::Path(PathBuf::from(d))],
        None => vec![SearchPath::default()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MemoryEnv;
    use crate::fixtures::test::{AppConfig, ServerConfig};
    use crate::format::{JsonDeserializer, TomlDeserializer};
    use std::fs;
    use tempfile::TempDir;

    fn loader_in(dir: &TempDir) -> ConfigLoader {
        ConfigLoader::new()
            .search_paths(vec![SearchPath::Path(dir.path().to_path_buf())])
            .env_store(MemoryEnv::new())
    }

    #[test]
    fn default_search_path_is_config() {
        let loader = ConfigLoader::new();
        assert_eq!(
            loader.effective_search_paths(),
            vec![SearchPath::Path("config".into())]
        );
    }

    #[test]
    fn add_search_path_appends_to_default() {
        let loader = ConfigLoader::new().add_search_path("configuration");
        assert_eq!(
            loader.effective_search_paths(),
            vec![
                SearchPath::Path("config".into()),
                SearchPath::Path("configuration".into())
            ]
        );
    }

    #[test]
    fn search_paths_replace() {
        let loader = ConfigLoader::new().search_paths(vec![SearchPath::Cwd]);
        assert_eq!(loader.effective_search_paths(), vec![SearchPath::Cwd]);
    }

    #[test]
    fn load_yaml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.yaml"), "name: TestApp\nversion: 1.0").unwrap();
        let cfg: AppConfig = loader_in(&dir).load("app").unwrap();
        assert_eq!(cfg.name, "TestApp");
        assert_eq!(cfg.version, "1.0");
    }

    #[test]
    fn load_json_with_default_deserializer() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("app.json"),
            "{\n\t\"name\": \"TestApp\",\n\t\"version\": \"1.0\"\n}",
        )
        .unwrap();
        let cfg: AppConfig = loader_in(&dir).load("app").unwrap();
        assert_eq!(cfg.name, "TestApp");
        assert_eq!(cfg.version, "1.0");
    }

    #[test]
    fn load_substitutes_placeholders() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("app.yaml"),
            "name: ${APP_NAME}\nversion: 1.0",
        )
        .unwrap();
        let cfg: AppConfig = loader_in(&dir)
            .env_store(MemoryEnv::from_pairs([("APP_NAME", "TestApp")]))
            .load("app")
            .unwrap();
        assert_eq!(cfg.name, "TestApp");
        assert_eq!(cfg.version, "1.0");
    }

    #[test]
    fn load_nested_with_placeholders() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("server.yml"),
            "host: ${HOST}\nport: ${PORT}\ndatabase:\n  url: postgres://${DB_HOST}/app\n",
        )
        .unwrap();
        let env = MemoryEnv::from_pairs([("HOST", "0.0.0.0"), ("PORT", "8080"), ("DB_HOST", "db")]);
        let cfg: ServerConfig = loader_in(&dir).env_store(env).load("server").unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert!(!cfg.debug);
        assert_eq!(cfg.database.url, "postgres://db/app");
        assert_eq!(cfg.database.pool_size, None);
    }

    #[test]
    fn missing_variable_fails_before_deserializing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.yaml"), "name: ${NOPE}\nversion: 1.0").unwrap();
        let err = loader_in(&dir).load::<AppConfig>("app").unwrap_err();
        assert!(matches!(err, EnvfigError::VariableNotFound { ref name } if name == "NOPE"));
    }

    #[test]
    fn substitution_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.yaml"), "name: ${NOPE}\nversion: 1.0").unwrap();
        let cfg: AppConfig = loader_in(&dir).substitute(false).load("app").unwrap();
        assert_eq!(cfg.name, "${NOPE}");
    }

    #[test]
    fn unsupported_extension_when_no_match() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.toml"), "name = \"TestApp\"").unwrap();
        let err = loader_in(&dir).load::<AppConfig>("app").unwrap_err();
        assert!(matches!(err, EnvfigError::UnsupportedExtension { .. }));
    }

    #[test]
    fn yaml_syntax_error_is_unmarshal_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.yaml"), "\n\tname: TestApp\nversion: 1.0\n").unwrap();
        let err = loader_in(&dir).load::<AppConfig>("app").unwrap_err();
        assert!(
            matches!(err, EnvfigError::Unmarshal { ref path, .. } if path.ends_with("app.yaml"))
        );
    }

    #[test]
    fn malformed_json_is_unmarshal_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("app.json"),
            "\n{\n\t\"name\": \"TestApp\",}\n\t\"version\": \"1.0\"\n}\n",
        )
        .unwrap();
        let err = loader_in(&dir).load::<AppConfig>("app").unwrap_err();
        assert!(matches!(err, EnvfigError::Unmarshal { .. }));
    }

    #[test]
    fn invalid_utf8_is_unmarshal_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.yaml"), [0xff, 0xfe, 0x00]).unwrap();
        let err = loader_in(&dir).load::<AppConfig>("app").unwrap_err();
        assert!(matches!(err, EnvfigError::Unmarshal { .. }));
    }

    #[test]
    fn missing_default_directory_is_directory_error() {
        let dir = TempDir::new().unwrap();
        let err = ConfigLoader::new()
            .load_from::<AppConfig>("app", dir.path().join("config"))
            .unwrap_err();
        assert!(matches!(err, EnvfigError::Directory { .. }));
    }

    #[test]
    fn load_from_ignores_search_paths() {
        let dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        fs::write(other.path().join("app.yaml"), "name: Other\nversion: 2").unwrap();
        let cfg: AppConfig = loader_in(&dir).load_from("app", other.path()).unwrap();
        assert_eq!(cfg.name, "Other");
        assert_eq!(cfg.version, "2");
    }

    #[test]
    fn first_search_path_wins() {
        let dir1 = TempDir::new().unwrap();
        let dir2 = TempDir::new().unwrap();
        fs::write(dir1.path().join("app.yaml"), "name: First\nversion: 1").unwrap();
        fs::write(dir2.path().join("app.yaml"), "name: Second\nversion: 2").unwrap();
        let cfg: AppConfig = ConfigLoader::new()
            .search_paths(vec![dir1.path().into(), dir2.path().into()])
            .load("app")
            .unwrap();
        assert_eq!(cfg.name, "First");
    }

    #[test]
    fn empty_search_paths_errors() {
        let err = ConfigLoader::new()
            .search_paths(vec![])
            .load::<AppConfig>("app")
            .unwrap_err();
        assert!(matches!(err, EnvfigError::NoSearchPath));
    }

    #[test]
    fn load_into_overwrites_on_success_only() {
        let dir = TempDir::new().unwrap();
        let loader = loader_in(&dir);
        let mut cfg = AppConfig {
            name: "before".into(),
            version: "0".into(),
        };

        assert!(loader.load_into(&mut cfg, "app").is_err());
        assert_eq!(cfg.name, "before");

        fs::write(dir.path().join("app.yml"), "name: after\nversion: 1").unwrap();
        loader.load_into(&mut cfg, "app").unwrap();
        assert_eq!(cfg.name, "after");
    }

    #[test]
    fn json_deserializer_rejects_yaml_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.yaml"), "name: TestApp\nversion: 1.0").unwrap();
        let err = loader_in(&dir)
            .deserializer(JsonDeserializer)
            .load::<AppConfig>("app")
            .unwrap_err();
        assert!(matches!(err, EnvfigError::Unmarshal { .. }));
    }

    #[test]
    fn toml_with_matching_policy() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("app.toml"),
            "name = \"${APP_NAME}\"\nversion = \"3\"\n",
        )
        .unwrap();
        let cfg: AppConfig = loader_in(&dir)
            .deserializer(TomlDeserializer)
            .extension_policy(ExtensionPolicy::allow(["toml"]))
            .env_store(MemoryEnv::from_pairs([("APP_NAME", "FromToml")]))
            .load("app")
            .unwrap();
        assert_eq!(cfg.name, "FromToml");
        assert_eq!(cfg.version, "3");
    }

    #[test]
    fn dirs_or_default_uses_config() {
        assert_eq!(dirs_or_default(None), vec![SearchPath::default()]);
        assert_eq!(
            dirs_or_default(Some(Path::new("etc"))),
            vec![SearchPath::Path("etc".into())]
        );
    }
}
