//! Configuration management for `boostme`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`BOOSTME_*`, plus `DB_URL` and `DEBUG`)
//! 3. Project config (`./boostme.yaml`, or `--config`)
//! 4. User config (~/.config/boostme/config.yaml)
//! 5. Profile defaults (development, testing, production)
//! 6. Defaults

use crate::error::{BoostError, Result};
use crate::storage::pool::{DEFAULT_DATABASE_URL, DEFAULT_RECYCLE};
use crate::storage::seed::seed_catalog;
use crate::storage::{DatabaseUrl, PoolOptions, Storage};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Project config file looked up in the working directory.
pub const PROJECT_CONFIG_FILENAME: &str = "boostme.yaml";

const DEFAULT_POOL_SIZE: u32 = 4;

/// Named bundles of defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Testing,
    Production,
}

impl Profile {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Production => "production",
        }
    }
}

impl FromStr for Profile {
    type Err = BoostError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "default" => Ok(Self::Development),
            "testing" | "test" => Ok(Self::Testing),
            "production" | "prod" => Ok(Self::Production),
            other => Err(BoostError::Config(format!("unknown profile: {other}"))),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configuration source, as flat normalized keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&String> {
        self.values.get(&normalize_key(key))
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Build a layer from `(name, value)` pairs shaped like environment
    /// variables.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        let mut prefixed = Vec::new();

        for (key, value) in vars {
            match key.as_str() {
                "DB_URL" => layer.set("db_url", value),
                // Only a literal `true` (any case) turns the legacy flag on.
                "DEBUG" => {
                    let on = value.trim().eq_ignore_ascii_case("true");
                    layer.set("debug", on.to_string());
                }
                _ => {
                    if let Some(stripped) = key.strip_prefix("BOOSTME_") {
                        prefixed.push((stripped.to_lowercase(), value));
                    }
                }
            }
        }

        // Prefixed variables beat the bare legacy names.
        for (key, value) in prefixed {
            layer.set(&key, value);
        }

        layer
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db_url: Option<String>,
    pub config: Option<PathBuf>,
    pub profile: Option<String>,
    pub debug: Option<bool>,
    pub pool_size: Option<u32>,
    pub seed: Option<bool>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(db_url) = &self.db_url {
            layer.set("db_url", db_url.clone());
        }
        if let Some(profile) = &self.profile {
            layer.set("profile", profile.clone());
        }
        if let Some(debug) = self.debug {
            layer.set("debug", debug.to_string());
        }
        if let Some(pool_size) = self.pool_size {
            layer.set("pool_size", pool_size.to_string());
        }
        if let Some(seed) = self.seed {
            layer.set("seed", seed.to_string());
        }

        layer
    }
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.set("db_url", DEFAULT_DATABASE_URL);
    layer.set("profile", Profile::default().as_str());
    layer.set("debug", "false");
    layer.set("pool_size", DEFAULT_POOL_SIZE.to_string());
    layer.set("seed", "true");
    layer
}

/// Defaults implied by a profile.
#[must_use]
pub fn profile_layer(profile: Profile) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    match profile {
        Profile::Development => {}
        Profile::Testing => {
            layer.set("db_url", "sqlite:///:memory:");
            layer.set("seed", "false");
        }
        Profile::Production => layer.set("debug", "false"),
    }
    layer
}

/// Load user config (~/.config/boostme/config.yaml). Without `HOME` there is
/// no user layer.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("boostme")
        .join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Load the project config from `--config` or `./boostme.yaml`.
///
/// # Errors
///
/// Returns an error if an explicit path does not exist, or the file cannot
/// be read or parsed.
pub fn load_project_config(explicit: Option<&Path>) -> Result<ConfigLayer> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(BoostError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            ConfigLayer::from_yaml(path)
        }
        None => ConfigLayer::from_yaml(Path::new(PROJECT_CONFIG_FILENAME)),
    }
}

/// Load configuration with the documented precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed, or the
/// selected profile is unknown.
pub fn load_config(cli: &CliOverrides) -> Result<ConfigLayer> {
    let explicit = ConfigLayer::merge_layers(&[
        load_user_config()?,
        load_project_config(cli.config.as_deref())?,
        ConfigLayer::from_env(),
        cli.as_layer(),
    ]);
    resolve_layers(&explicit)
}

/// Put defaults and profile defaults under the explicitly configured values.
fn resolve_layers(explicit: &ConfigLayer) -> Result<ConfigLayer> {
    let profile = match explicit.get("profile") {
        Some(raw) => raw.parse::<Profile>()?,
        None => Profile::default(),
    };
    Ok(ConfigLayer::merge_layers(&[
        default_config_layer(),
        profile_layer(profile),
        explicit.clone(),
    ]))
}

/// Typed view of the merged configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: DatabaseUrl,
    pub profile: Profile,
    pub debug: bool,
    pub pool_size: u32,
    pub seed: bool,
}

impl Settings {
    /// # Errors
    ///
    /// Returns a config error for an unparsable URL, profile, flag or number.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let database_url = layer
            .get("db_url")
            .map_or(DEFAULT_DATABASE_URL, String::as_str)
            .parse::<DatabaseUrl>()?;
        let profile = match layer.get("profile") {
            Some(raw) => raw.parse::<Profile>()?,
            None => Profile::default(),
        };
        let debug = parse_flag(layer, "debug")?.unwrap_or(false);
        let seed = parse_flag(layer, "seed")?.unwrap_or(true);
        let pool_size = match layer.get("pool_size") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| BoostError::Config(format!("invalid pool_size: {raw}")))?,
            None => DEFAULT_POOL_SIZE,
        };

        Ok(Self {
            database_url,
            profile,
            debug,
            pool_size,
            seed,
        })
    }

    #[must_use]
    pub const fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_size: self.pool_size,
            recycle: Some(DEFAULT_RECYCLE),
        }
    }
}

/// Resolve settings from all configuration sources.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or is invalid.
pub fn load_settings(cli: &CliOverrides) -> Result<Settings> {
    let layer = load_config(cli)?;
    let settings = Settings::from_layer(&layer)?;
    debug!(
        url = %settings.database_url,
        profile = %settings.profile,
        seed = settings.seed,
        "Resolved settings"
    );
    Ok(settings)
}

/// Open storage from settings. A store opened for the first time gets the
/// built-in catalog when seeding is enabled.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or seeding fails.
pub fn open_storage(settings: &Settings) -> Result<Storage> {
    let storage = Storage::open(&settings.database_url, &settings.pool_options())?;
    if settings.seed && storage.is_fresh() {
        seed_catalog(&storage.challenges())?;
    }
    Ok(storage)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('-', "_")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn parse_flag(layer: &ConfigLayer, key: &str) -> Result<Option<bool>> {
    layer
        .get(key)
        .map(|raw| {
            parse_bool(raw).ok_or_else(|| BoostError::Config(format!("invalid {key}: {raw}")))
        })
        .transpose()
}

/// Nested YAML spellings and the flat key they configure.
const YAML_ALIASES: &[(&str, &str)] = &[
    ("database.url", "db_url"),
    ("database.pool_size", "pool_size"),
];

fn canonical_key(key: &str) -> String {
    let key = normalize_key(key);
    YAML_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(key, |(_, canonical)| (*canonical).to_string())
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);
    // Aliases first so a flat key in the same file wins over its nested form.
    let mut entries: Vec<(String, bool, String)> = flat
        .into_iter()
        .map(|(key, value)| {
            let canonical = canonical_key(&key);
            let flat_spelling = normalize_key(&key) == canonical;
            (canonical, flat_spelling, value)
        })
        .collect();
    entries.sort_by(|a, b| (&a.0, a.1).cmp(&(&b.0, b.1)));
    for (key, _, value) in entries {
        layer.set(&key, value);
    }
    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key) = key.as_str() else {
                    continue;
                };
                let next = if prefix.is_empty() {
                    key.to_string()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_yaml(value, &next, out);
            }
        }
        _ => {
            if let Some(scalar) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), scalar);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn defaults_resolve_to_file_database() {
        let layer = resolve_layers(&ConfigLayer::default()).unwrap();
        let settings = Settings::from_layer(&layer).unwrap();
        assert_eq!(
            settings.database_url,
            DatabaseUrl::File(PathBuf::from("boostme.db"))
        );
        assert_eq!(settings.profile, Profile::Development);
        assert!(!settings.debug);
        assert!(settings.seed);
        assert_eq!(settings.pool_size, 4);
    }

    #[test]
    fn testing_profile_uses_memory_without_seed() {
        let mut explicit = ConfigLayer::default();
        explicit.set("profile", "testing");
        let settings = Settings::from_layer(&resolve_layers(&explicit).unwrap()).unwrap();
        assert!(settings.database_url.is_memory());
        assert!(!settings.seed);
    }

    #[test]
    fn explicit_values_beat_profile_defaults() {
        let mut explicit = ConfigLayer::default();
        explicit.set("profile", "testing");
        explicit.set("db_url", "sqlite:///other.db");
        let settings = Settings::from_layer(&resolve_layers(&explicit).unwrap()).unwrap();
        assert_eq!(
            settings.database_url,
            DatabaseUrl::File(PathBuf::from("other.db"))
        );
    }

    #[test]
    fn merge_precedence_order() {
        let mut defaults = default_config_layer();
        defaults.set("db_url", "sqlite:///default.db");

        let mut yaml = ConfigLayer::default();
        yaml.set("db_url", "sqlite:///yaml.db");

        let env_layer = ConfigLayer::from_vars(vars(&[("DB_URL", "sqlite:///env.db")]));

        let cli = CliOverrides {
            db_url: Some("sqlite:///cli.db".into()),
            ..CliOverrides::default()
        }
        .as_layer();

        let merged = ConfigLayer::merge_layers(&[defaults.clone(), yaml.clone(), env_layer.clone()]);
        assert_eq!(merged.get("db_url").unwrap(), "sqlite:///env.db");

        let merged = ConfigLayer::merge_layers(&[defaults, yaml, env_layer, cli]);
        assert_eq!(merged.get("db_url").unwrap(), "sqlite:///cli.db");
    }

    #[test]
    fn env_prefixed_beats_legacy_names() {
        let layer = ConfigLayer::from_vars(vars(&[
            ("BOOSTME_DB_URL", "sqlite:///prefixed.db"),
            ("DB_URL", "sqlite:///legacy.db"),
            ("DEBUG", "TRUE"),
            ("BOOSTME_POOL_SIZE", "8"),
            ("UNRELATED", "x"),
        ]));
        assert_eq!(layer.get("db_url").unwrap(), "sqlite:///prefixed.db");
        assert_eq!(layer.get("debug").unwrap(), "true");
        assert_eq!(layer.get("pool-size").unwrap(), "8");
        assert!(layer.get("unrelated").is_none());
    }

    #[test]
    fn yaml_nested_keys_are_flattened() {
        let yaml = r"
profile: production
database:
  url: sqlite:///prod.db
  pool_size: 2
seed: false
";
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).expect("parse yaml");
        let explicit = layer_from_yaml_value(&value);
        let settings = Settings::from_layer(&resolve_layers(&explicit).unwrap()).unwrap();
        assert_eq!(settings.profile, Profile::Production);
        assert_eq!(
            settings.database_url,
            DatabaseUrl::File(PathBuf::from("prod.db"))
        );
        assert_eq!(settings.pool_size, 2);
        assert!(!settings.seed);
        assert!(!settings.debug);
    }

    #[test]
    fn nested_database_keys_override_defaults() {
        let yaml = r"
database:
  url: sqlite:///nested.db
  pool_size: 6
";
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).expect("parse yaml");
        let layer = layer_from_yaml_value(&value);
        assert_eq!(layer.get("db_url").unwrap(), "sqlite:///nested.db");
        assert_eq!(layer.get("pool_size").unwrap(), "6");
        assert!(layer.get("database.url").is_none());

        let merged = ConfigLayer::merge_layers(&[default_config_layer(), layer]);
        let settings = Settings::from_layer(&merged).unwrap();
        assert_eq!(
            settings.database_url,
            DatabaseUrl::File(PathBuf::from("nested.db"))
        );
        assert_eq!(settings.pool_size, 6);
    }

    #[test]
    fn flat_key_beats_nested_alias_in_one_file() {
        let yaml = r"
db_url: sqlite:///flat.db
database:
  url: sqlite:///nested.db
";
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).expect("parse yaml");
        let layer = layer_from_yaml_value(&value);
        assert_eq!(layer.get("db_url").unwrap(), "sqlite:///flat.db");
    }

    #[test]
    fn legacy_debug_accepts_any_value() {
        for raw in ["", "*", "yes-please", "1", "false"] {
            let explicit = ConfigLayer::from_vars(vars(&[("DEBUG", raw)]));
            let settings = Settings::from_layer(&resolve_layers(&explicit).unwrap())
                .unwrap_or_else(|err| panic!("DEBUG={raw:?} failed: {err}"));
            assert!(!settings.debug, "DEBUG={raw:?}");
        }

        for raw in ["true", "True", " TRUE "] {
            let explicit = ConfigLayer::from_vars(vars(&[("DEBUG", raw)]));
            let settings = Settings::from_layer(&resolve_layers(&explicit).unwrap()).unwrap();
            assert!(settings.debug, "DEBUG={raw:?}");
        }

        let explicit = ConfigLayer::from_vars(vars(&[("BOOSTME_DEBUG", "maybe")]));
        assert!(matches!(
            Settings::from_layer(&resolve_layers(&explicit).unwrap()),
            Err(BoostError::Config(_))
        ));
    }

    #[test]
    fn debug_is_opt_in_for_every_profile() {
        for profile in ["development", "testing", "production"] {
            let mut explicit = ConfigLayer::default();
            explicit.set("profile", profile);
            let settings = Settings::from_layer(&resolve_layers(&explicit).unwrap()).unwrap();
            assert!(!settings.debug, "{profile}");
        }

        let mut explicit = ConfigLayer::default();
        explicit.set("profile", "development");
        explicit.set("debug", "true");
        let settings = Settings::from_layer(&resolve_layers(&explicit).unwrap()).unwrap();
        assert!(settings.debug);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let mut layer = default_config_layer();
        layer.set("debug", "maybe");
        assert!(matches!(Settings::from_layer(&layer), Err(BoostError::Config(_))));

        let mut layer = default_config_layer();
        layer.set("pool_size", "0");
        assert!(matches!(Settings::from_layer(&layer), Err(BoostError::Config(_))));

        let mut explicit = ConfigLayer::default();
        explicit.set("profile", "staging");
        assert!(resolve_layers(&explicit).is_err());
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("nope.yaml");
        assert!(load_project_config(Some(&missing)).is_err());

        let present = temp.path().join("boostme.yaml");
        fs::write(&present, "db_url: sqlite:///from-file.db\n").expect("write config");
        let layer = load_project_config(Some(&present)).expect("layer");
        assert_eq!(layer.get("db_url").unwrap(), "sqlite:///from-file.db");
    }

    #[test]
    fn open_storage_seeds_when_enabled() {
        let settings = Settings {
            database_url: DatabaseUrl::Memory,
            profile: Profile::Testing,
            debug: false,
            pool_size: 1,
            seed: true,
        };
        let storage = open_storage(&settings).unwrap();
        assert!(storage.challenges().count().unwrap() > 0);

        let settings = Settings {
            seed: false,
            ..settings
        };
        let storage = open_storage(&settings).unwrap();
        assert_eq!(storage.challenges().count().unwrap(), 0);
    }
}
