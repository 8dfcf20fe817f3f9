//! # FedEx Web Services Configuration Module
//!
//! This module provides the read-only configuration used by the FedEx clients:
//! - Loading configuration from a YAML file
//! - Merging with the embedded default configuration
//! - Environment variable overrides (`FDX_CONFIG__FEDEX__KEY=...`)
//! - Typed getters for credentials, endpoint and diagnostic flags
//!
//! ## Usage
//!
//! ```no_run
//! use fdxconfig::Config;
//!
//! let config = Config::load_config("")?;
//! let credentials = config.get_credentials()?;
//! let url = config.get_endpoint_url()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Result, anyhow};
use dirs::home_dir;
use serde_yaml::{Mapping, Value};
use std::{env, fs, path::Path, path::PathBuf};
use tracing::info;

pub mod credentials;

pub use credentials::{Credentials, Environment, Localization, PRODUCTION_URL, TEST_URL};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("fdx.yaml");

const ENV_CONFIG_DIR: &str = "FDX_CONFIG";
const ENV_PREFIX: &str = "FDX_CONFIG__";

const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";

// Clés lues telles quelles : jamais converties en nombre
const CREDENTIAL_KEYS: [&str; 4] = ["key", "password", "account_number", "meter_number"];

/// Configuration manager for the FedEx clients
///
/// Unlike a user-editable settings store, this configuration is loaded once
/// and never written back: credentials are immutable for the lifetime of a client.
#[derive(Debug, Clone)]
pub struct Config {
    path: Option<String>,
    data: Value,
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var=ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(".fdx").exists() {
            return ".fdx".to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(".fdx");
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        ".fdx".to_string()
    }

    /// Loads the configuration from the specified directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `FDX_CONFIG` environment variable
    /// 3. `.fdx` in the current directory
    /// 4. `.fdx` in the user's home directory
    ///
    /// The embedded defaults are merged with `config.yaml` when present, then
    /// `FDX_CONFIG__*` environment variables are applied.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        info!(config_dir=%config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let external = match fs::read(&path) {
            Ok(data) => {
                info!(config_file=%path, "Loaded config file");
                Some(serde_yaml::from_slice::<Value>(&data)?)
            }
            Err(_) => {
                info!(config_file=%path, "Config file not found, using default embedded config");
                None
            }
        };

        let mut config = Self::from_value(external)?;
        Self::apply_env_overrides(&mut config.data, env::vars());
        config.path = Some(path);
        Ok(config)
    }

    /// Builds a configuration from a YAML document merged over the defaults.
    ///
    /// No file or environment lookup is performed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let external: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(Some(external))
    }

    fn from_value(external: Option<Value>) -> Result<Self> {
        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        if let Some(external) = external {
            merge_yaml(&mut default_value, &external);
        }

        Ok(Config {
            path: None,
            data: Self::lower_keys_value(default_value),
        })
    }

    /// Path of the `config.yaml` file this configuration was loaded from, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Gets a configuration value at the specified path
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["fedex", "key"]`)
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let mut current = &self.data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();

                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    /// Reads a scalar as a string; numbers and booleans are accepted.
    /// Null and empty strings read as `None`.
    fn get_optional_string(&self, path: &[&str]) -> Result<Option<String>> {
        let value = match self.get_value(path) {
            Ok(value) => value,
            Err(_) => return Ok(None),
        };

        match value {
            Value::Null => Ok(None),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            _ => Err(anyhow!("Path {} is not a scalar value", path.join("."))),
        }
    }

    /// Reads a credential, which must be a YAML string: `1e5` or `0x1F` would
    /// otherwise be rewritten as numbers.
    fn get_credential_string(&self, path: &[&str]) -> Result<Option<String>> {
        match self.get_value(path) {
            Err(_) | Ok(Value::Null) => Ok(None),
            Ok(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Ok(Value::String(s)) => Ok(Some(s)),
            Ok(other) => {
                let key = path.join(".");
                let shown = serde_yaml::to_string(&other).unwrap_or_default();
                Err(anyhow!(
                    "{key} must be a string, found {}; quote the value in config.yaml ({}: \"...\")",
                    shown.trim(),
                    path.last().copied().unwrap_or_default()
                ))
            }
        }
    }

    fn is_credential_path(path: &[&str]) -> bool {
        matches!(path, [section, key]
            if section.eq_ignore_ascii_case("fedex")
                && CREDENTIAL_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key)))
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            return Err(anyhow!("Empty path"));
        }

        let mut current = data;
        for key in &path[..path.len() - 1] {
            let key = Value::String(key.to_lowercase());
            let map = current
                .as_mapping_mut()
                .ok_or_else(|| anyhow!("Path {} is not a Config", path.join(".")))?;
            current = map
                .entry(key)
                .or_insert(Value::Mapping(Mapping::new()));
        }

        let last = Value::String(path[path.len() - 1].to_lowercase());
        current
            .as_mapping_mut()
            .ok_or_else(|| anyhow!("Path {} is not a Config", path.join(".")))?
            .insert(last, value);
        Ok(())
    }

    fn apply_env_overrides<I>(config: &mut Value, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = if Self::is_credential_path(&key_path) {
                    Value::String(value)
                } else {
                    Self::convert_env_value(&value)
                };
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    if let Value::String(s) = k {
                        let new_key = Value::String(s.to_lowercase());
                        let new_val = Self::lower_keys_value(v);
                        new_map.insert(new_key, new_val);
                    } else {
                        new_map.insert(k, Self::lower_keys_value(v));
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    /// Récupère l'environnement FedEx (`test` par défaut)
    pub fn get_environment(&self) -> Result<Environment> {
        match self.get_optional_string(&["fedex", "environment"])? {
            Some(env) => env.parse(),
            None => Ok(Environment::default()),
        }
    }

    /// Récupère les identifiants FedEx
    ///
    /// # Errors
    ///
    /// L'erreur liste toutes les clés manquantes de la section `fedex`.
    pub fn get_credentials(&self) -> Result<Credentials> {
        let mut values = Vec::with_capacity(CREDENTIAL_KEYS.len());
        let mut missing = Vec::new();

        for field in CREDENTIAL_KEYS {
            match self.get_credential_string(&["fedex", field])? {
                Some(value) => values.push(value),
                None => {
                    missing.push(format!("fedex.{field}"));
                    values.push(String::new());
                }
            }
        }

        if !missing.is_empty() {
            return Err(anyhow!(
                "Missing FedEx configuration key(s): {}",
                missing.join(", ")
            ));
        }

        let mut values = values.into_iter();
        Credentials::new(
            values.next().unwrap_or_default(),
            values.next().unwrap_or_default(),
            values.next().unwrap_or_default(),
            values.next().unwrap_or_default(),
            self.get_environment()?,
        )
    }

    /// URL du web service : `fedex.endpoint` si défini, sinon l'URL de l'environnement
    pub fn get_endpoint_url(&self) -> Result<String> {
        match self.get_optional_string(&["fedex", "endpoint"])? {
            Some(url) => Ok(url),
            None => Ok(self.get_environment()?.default_url().to_string()),
        }
    }

    /// Active l'émission de la réponse brute dans les logs
    pub fn get_debug(&self) -> Result<bool> {
        match self.get_value(&["fedex", "debug"]) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => Ok(false),
        }
    }

    /// Timeout global du transport HTTP, en secondes
    pub fn get_timeout_secs(&self) -> Result<Option<u64>> {
        match self.get_value(&["fedex", "timeout_secs"]) {
            Ok(Value::Number(n)) => n
                .as_u64()
                .map(Some)
                .ok_or_else(|| anyhow!("fedex.timeout_secs must be a positive integer")),
            _ => Ok(None),
        }
    }

    pub fn get_localization(&self) -> Result<Localization> {
        let default = Localization::default();
        Ok(Localization {
            language_code: self
                .get_optional_string(&["fedex", "localization", "language_code"])?
                .unwrap_or(default.language_code),
            locale_code: self
                .get_optional_string(&["fedex", "localization", "locale_code"])?
                .unwrap_or(default.locale_code),
        })
    }

    /// Fichier JSON lines où sont journalisés les échanges, si configuré
    pub fn get_audit_log_path(&self) -> Result<Option<PathBuf>> {
        Ok(self
            .get_optional_string(&["audit", "log_path"])?
            .map(PathBuf::from))
    }

    /// Récupère le niveau de log minimum depuis la configuration
    pub fn get_log_min_level(&self) -> Result<String> {
        match self.get_value(&["host", "logger", "min_level"]) {
            Ok(Value::String(s)) => Ok(s),
            _ => Ok(DEFAULT_LOG_MIN_LEVEL.to_string()),
        }
    }
}

/// Merges external YAML configuration into default configuration
///
/// - For mappings (objects), it merges keys from external into default
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(), // pour les scalaires ou séquences, on remplace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
fedex:
  Key: abc123
  password: s3cret
  account_number: "510087000"
  meter_number: "118695473"
  environment: production
"#;

    #[test]
    fn test_defaults_without_credentials() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.get_environment().unwrap(), Environment::Test);
        assert_eq!(config.get_endpoint_url().unwrap(), TEST_URL);
        assert!(!config.get_debug().unwrap());
        assert_eq!(config.get_localization().unwrap(), Localization::default());
        assert_eq!(config.get_log_min_level().unwrap(), "INFO");
        assert!(config.get_audit_log_path().unwrap().is_none());
    }

    #[test]
    fn test_missing_credentials_are_all_reported() {
        let config = Config::from_yaml_str("fedex:\n  key: abc\n").unwrap();
        let msg = config.get_credentials().unwrap_err().to_string();
        assert!(msg.contains("fedex.password"));
        assert!(msg.contains("fedex.account_number"));
        assert!(msg.contains("fedex.meter_number"));
        assert!(!msg.contains("fedex.key"));
    }

    #[test]
    fn test_credentials_from_yaml() {
        let config = Config::from_yaml_str(SAMPLE).unwrap();
        let creds = config.get_credentials().unwrap();
        assert_eq!(creds.key(), "abc123");
        assert_eq!(creds.account_number(), "510087000");
        assert_eq!(creds.meter_number(), "118695473");
        assert_eq!(creds.environment(), Environment::Production);
        assert_eq!(config.get_endpoint_url().unwrap(), PRODUCTION_URL);
    }

    #[test]
    fn test_endpoint_override() {
        let config =
            Config::from_yaml_str("fedex:\n  endpoint: http://127.0.0.1:9000/xml\n").unwrap();
        assert_eq!(config.get_endpoint_url().unwrap(), "http://127.0.0.1:9000/xml");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::from_yaml_str(SAMPLE).unwrap();
        Config::apply_env_overrides(
            &mut config.data,
            vec![
                ("FDX_CONFIG__FEDEX__DEBUG".to_string(), "true".to_string()),
                ("FDX_CONFIG__FEDEX__ENVIRONMENT".to_string(), "test".to_string()),
                ("OTHER__FEDEX__KEY".to_string(), "ignored".to_string()),
            ],
        );
        assert!(config.get_debug().unwrap());
        assert_eq!(config.get_environment().unwrap(), Environment::Test);
        assert_eq!(config.get_credentials().unwrap().key(), "abc123");
    }

    #[test]
    fn test_unquoted_numeric_credentials_are_rejected() {
        let config = Config::from_yaml_str(
            "fedex:\n  key: k\n  password: 1e5\n  account_number: '0510087000'\n  meter_number: '0x1F'\n",
        )
        .unwrap();
        let msg = config.get_credentials().unwrap_err().to_string();
        assert!(msg.contains("fedex.password"), "{msg}");
        assert!(msg.contains("quote"), "{msg}");

        let config = Config::from_yaml_str(
            "fedex:\n  key: k\n  password: '1e5'\n  account_number: '0510087000'\n  meter_number: '0x1F'\n",
        )
        .unwrap();
        let creds = config.get_credentials().unwrap();
        assert_eq!(creds.password(), "1e5");
        assert_eq!(creds.account_number(), "0510087000");
        assert_eq!(creds.meter_number(), "0x1F");
    }

    #[test]
    fn test_env_credentials_are_kept_verbatim() {
        let mut config = Config::from_yaml_str(SAMPLE).unwrap();
        Config::apply_env_overrides(
            &mut config.data,
            vec![
                ("FDX_CONFIG__FEDEX__PASSWORD".to_string(), "1e5".to_string()),
                ("FDX_CONFIG__FEDEX__METER_NUMBER".to_string(), "0x1F".to_string()),
                ("FDX_CONFIG__FEDEX__TIMEOUT_SECS".to_string(), "30".to_string()),
            ],
        );
        let creds = config.get_credentials().unwrap();
        assert_eq!(creds.password(), "1e5");
        assert_eq!(creds.meter_number(), "0x1F");
        assert_eq!(config.get_timeout_secs().unwrap(), Some(30));
    }

    #[test]
    fn test_load_config_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "fedex:\n  timeout_secs: 15\naudit:\n  log_path: /tmp/fdx-audit.jsonl\n",
        )
        .unwrap();

        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.get_timeout_secs().unwrap(), Some(15));
        assert_eq!(
            config.get_audit_log_path().unwrap(),
            Some(PathBuf::from("/tmp/fdx-audit.jsonl"))
        );
        assert!(config.path().unwrap().ends_with("config.yaml"));
    }
}
