use std::path::Path;

use serde::Deserialize;
use tracing::info;

use hellodesk_base::{DeskError, DeskResult, PalHandle, ResultExt};

use crate::validation::AGE_MAX;

/// Configuration read from `hellodesk.toml`. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Service title, sent as the `Server` response header.
    pub title: String,
    pub server: ServerConfig,
    pub users: UsersConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Hello FastAPI".to_string(),
            server: ServerConfig::default(),
            users: UsersConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UsersConfig {
    /// Age given to users created without one.
    pub default_age: u8,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self { default_age: 30 }
    }
}

/// Loads the configuration at `path` through the PAL.
///
/// A missing file yields the defaults; a malformed one is an error.
pub fn load_config(pal: &PalHandle, path: &Path) -> DeskResult<Config> {
    if !pal.file_exists(path)? {
        info!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = pal.read_file_to_string(path)?;
    let config = parse_config(&content)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    info!(path = %path.display(), "config loaded");
    Ok(config)
}

fn parse_config(content: &str) -> DeskResult<Config> {
    let config: Config =
        toml::from_str(content).map_err(|e| Box::new(DeskError::parse(e.message())))?;
    if i64::from(config.users.default_age) > AGE_MAX {
        return Err(Box::new(DeskError::parse(format!(
            "users.default_age must be at most {}, got {}",
            AGE_MAX, config.users.default_age
        ))));
    }
    Ok(config)
}
