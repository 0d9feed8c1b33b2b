//! Bot configuration: the admin allowlist, the single chat the bot serves,
//! the database path, and an optional RNG seed for reproducible draws.
//!
//! Values come from an optional TOML file named by `LOTOBOT_CONFIG`, with
//! per-field environment overrides on top.

use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub admin_ids: Vec<i64>,
    pub chat_id: i64,
    pub database_path: String,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub admin_ids: ValueSource,
    pub chat_id: ValueSource,
    pub database_path: ValueSource,
    pub seed: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            admin_ids: ValueSource::Default,
            chat_id: ValueSource::Default,
            database_path: ValueSource::Default,
            seed: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_ids: Vec::new(),
            chat_id: 0,
            database_path: "lotobot.db".into(),
            seed: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for ConfigError {}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var("LOTOBOT_CONFIG") {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.admin_ids {
            cfg.admin_ids = v;
            sources.admin_ids = ValueSource::File;
        }
        if let Some(v) = f.chat_id {
            cfg.chat_id = v;
            sources.chat_id = ValueSource::File;
        }
        if let Some(v) = f.database_path {
            cfg.database_path = v;
            sources.database_path = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
    }

    if let Ok(admins) = std::env::var("LOTOBOT_ADMINS") {
        if !admins.is_empty() {
            cfg.admin_ids = parse_id_list(&admins)
                .ok_or_else(|| ConfigError::Invalid("Invalid admin id list".into()))?;
            sources.admin_ids = ValueSource::Env;
        }
    }
    if let Ok(chat) = std::env::var("LOTOBOT_CHAT_ID") {
        if !chat.is_empty() {
            cfg.chat_id = chat
                .parse()
                .map_err(|_| ConfigError::Invalid("Invalid chat id".into()))?;
            sources.chat_id = ValueSource::Env;
        }
    }
    if let Ok(path) = std::env::var("LOTOBOT_DB") {
        if !path.is_empty() {
            cfg.database_path = path;
            sources.database_path = ValueSource::Env;
        }
    }
    if let Ok(seed) = std::env::var("LOTOBOT_SEED") {
        if !seed.is_empty() {
            cfg.seed = Some(
                seed.parse()
                    .map_err(|_| ConfigError::Invalid("Invalid seed".into()))?,
            );
            sources.seed = ValueSource::Env;
        }
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    admin_ids: Option<Vec<i64>>,
    #[serde(default)]
    chat_id: Option<i64>,
    #[serde(default)]
    database_path: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.admin_ids.is_empty() {
        return Err(ConfigError::Invalid(
            "Invalid configuration: at least one admin id is required".into(),
        ));
    }
    if cfg.chat_id == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: chat_id must be set".into(),
        ));
    }
    Ok(())
}

fn parse_id_list(s: &str) -> Option<Vec<i64>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for key in [
            "LOTOBOT_CONFIG",
            "LOTOBOT_ADMINS",
            "LOTOBOT_CHAT_ID",
            "LOTOBOT_DB",
            "LOTOBOT_SEED",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn bare_defaults_fail_validation() {
        clear_env();
        assert!(matches!(load(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    #[serial]
    fn env_values_satisfy_validation() {
        clear_env();
        std::env::set_var("LOTOBOT_ADMINS", "100, 200");
        std::env::set_var("LOTOBOT_CHAT_ID", "-1001234567890");

        let resolved = load_with_sources().expect("load");
        assert_eq!(resolved.config.admin_ids, vec![100, 200]);
        assert_eq!(resolved.config.chat_id, -1001234567890);
        assert_eq!(resolved.config.database_path, "lotobot.db");
        assert!(matches!(resolved.sources.admin_ids, ValueSource::Env));
        assert!(matches!(
            resolved.sources.database_path,
            ValueSource::Default
        ));
        clear_env();
    }

    #[test]
    #[serial]
    fn env_overrides_file_values() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "admin_ids = [1]\nchat_id = 42\ndatabase_path = \"from_file.db\"\nseed = 7"
        )
        .expect("write config");

        std::env::set_var("LOTOBOT_CONFIG", file.path());
        std::env::set_var("LOTOBOT_CHAT_ID", "43");

        let resolved = load_with_sources().expect("load");
        assert_eq!(resolved.config.admin_ids, vec![1]);
        assert_eq!(resolved.config.chat_id, 43);
        assert_eq!(resolved.config.database_path, "from_file.db");
        assert_eq!(resolved.config.seed, Some(7));
        assert!(matches!(resolved.sources.chat_id, ValueSource::Env));
        assert!(matches!(resolved.sources.admin_ids, ValueSource::File));
        clear_env();
    }

    #[test]
    #[serial]
    fn bad_env_values_are_rejected() {
        clear_env();
        std::env::set_var("LOTOBOT_ADMINS", "1,two,3");
        std::env::set_var("LOTOBOT_CHAT_ID", "42");
        assert!(matches!(load(), Err(ConfigError::Invalid(_))));
        clear_env();
    }
}
