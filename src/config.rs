// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `RACKLOCK_*` environment variables. Command-line flags are applied on top
//! by the caller.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "RACKLOCK";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory for persistent data (layout, inventory)
    pub data_dir: PathBuf,
    /// Inventory snapshot to read; defaults to inventory.json in `data_dir`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_file: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Colored terminal output
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: directories::ProjectDirs::from("com", "hyperpolymath", "racklock")
                .map_or_else(|| PathBuf::from(".racklock"), |d| d.data_dir().to_path_buf()),
            inventory_file: None,
            log_level: "info".to_string(),
            color: true,
        }
    }
}

impl Config {
    /// Path of the inventory snapshot in effect
    #[must_use]
    pub fn inventory_path(&self) -> PathBuf {
        self.inventory_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(crate::inventory::INVENTORY_FILE))
    }

    /// Read a single setting by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => Some(self.data_dir.display().to_string()),
            "inventory_file" => Some(self.inventory_path().display().to_string()),
            "log_level" => Some(self.log_level.clone()),
            "color" => Some(self.color.to_string()),
            _ => None,
        }
    }

    /// Update a single setting by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "inventory_file" => self.inventory_file = Some(PathBuf::from(value)),
            "log_level" => {
                let level = value.to_lowercase();
                if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
                    anyhow::bail!("Unknown log level: {}. Valid: trace, debug, info, warn, error", value);
                }
                self.log_level = level;
            }
            "color" => {
                self.color = value
                    .parse()
                    .with_context(|| format!("color must be true or false, got {value}"))?;
            }
            other => anyhow::bail!(
                "Unknown config key: {}. Valid: data_dir, inventory_file, log_level, color",
                other
            ),
        }
        Ok(())
    }

    /// Every key with its current value
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        ["data_dir", "inventory_file", "log_level", "color"]
            .into_iter()
            .filter_map(|k| self.get(k).map(|v| (k, v)))
            .collect()
    }

    /// Write the configuration as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Default location of the config file
#[must_use]
pub fn default_path() -> PathBuf {
    directories::ProjectDirs::from("com", "hyperpolymath", "racklock")
        .map_or_else(|| PathBuf::from(".racklock/config.toml"), |d| d.config_dir().join("config.toml"))
}

/// Load configuration from defaults, an optional file and the environment
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = path.map_or_else(default_path, Path::to_path_buf);
    build(&path, true)
}

/// Load only what is persisted: defaults and the file, no environment
///
/// `config set` edits this view so environment overrides never get written back.
pub fn load_file(path: &Path) -> Result<Config> {
    build(path, false)
}

fn build(path: &Path, with_env: bool) -> Result<Config> {
    let defaults = Config::default();

    let mut builder = ::config::Config::builder()
        .set_default("data_dir", defaults.data_dir.display().to_string())?
        .set_default("log_level", defaults.log_level.clone())?
        .set_default("color", defaults.color)?
        .add_source(::config::File::from(path).format(::config::FileFormat::Toml).required(false));
    if with_env {
        builder = builder.add_source(::config::Environment::with_prefix(ENV_PREFIX));
    }
    let settings = builder
        .build()
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    let cfg: Config = settings
        .try_deserialize()
        .context("Invalid configuration")?;
    tracing::debug!(?cfg, "Loaded configuration");
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let data_dir = dir.path().join("data");
        fs::write(
            &path,
            format!("data_dir = \"{}\"\nlog_level = \"debug\"\ncolor = false\n", data_dir.display()),
        )
        .unwrap();

        let cfg = load(Some(&path)).unwrap();
        assert_eq!(cfg.data_dir, data_dir);
        assert_eq!(cfg.log_level, "debug");
        assert!(!cfg.color);
        assert_eq!(cfg.inventory_path(), data_dir.join("inventory.json"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = load(Some(&dir.path().join("none.toml"))).unwrap();
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.inventory_file.is_none());
    }

    #[test]
    fn test_set_validates() {
        let mut cfg = Config::default();
        cfg.set("log_level", "WARN").unwrap();
        assert_eq!(cfg.log_level, "warn");
        assert!(cfg.set("log_level", "loud").is_err());
        assert!(cfg.set("color", "maybe").is_err());
        assert!(cfg.set("nope", "1").is_err());
    }

    #[test]
    fn test_load_file_ignores_environment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_level = \"warn\"\n").unwrap();

        std::env::set_var("RACKLOCK_COLOR", "false");
        let layered = load(Some(&path));
        let on_disk = load_file(&path);
        std::env::remove_var("RACKLOCK_COLOR");

        assert!(!layered.unwrap().color);
        let on_disk = on_disk.unwrap();
        assert!(on_disk.color);
        assert_eq!(on_disk.log_level, "warn");
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("data_dir", &dir.path().join("d").display().to_string()).unwrap();
        cfg.set("inventory_file", "/srv/stock.json").unwrap();
        cfg.save(&path).unwrap();

        let loaded = load(Some(&path)).unwrap();
        assert_eq!(loaded.inventory_path(), PathBuf::from("/srv/stock.json"));
        assert_eq!(loaded.data_dir, cfg.data_dir);
    }
}
