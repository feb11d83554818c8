// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

use crate::config::Config;
use anyhow::Result;
use std::path::Path;

/// Get, set or list configuration values; `set` writes the file at `path`
pub fn run(config: &mut Config, path: &Path, action: &str, key: Option<String>, value: Option<String>) -> Result<()> {
    match action {
        "get" => {
            let key = key.ok_or_else(|| anyhow::anyhow!("Config key is required"))?;
            let value = config
                .get(&key)
                .ok_or_else(|| anyhow::anyhow!("Unknown config key: {}", key))?;
            println!("{value}");
        }
        "set" => {
            let key = key.ok_or_else(|| anyhow::anyhow!("Config key is required"))?;
            let value = value.ok_or_else(|| anyhow::anyhow!("Value is required"))?;
            config.set(&key, &value)?;
            config.save(path)?;
            tracing::info!("Set {} = {} in {}", key, value, path.display());
        }
        "list" | "ls" => {
            for (key, value) in config.entries() {
                println!("{key} = {value}");
            }
        }
        other => anyhow::bail!("Unknown action: {}. Valid: get, set, list", other),
    }
    Ok(())
}
