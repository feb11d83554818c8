// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod bin;
pub mod completions;
pub mod config;
pub mod export;
pub mod locks;
pub mod rack;
pub mod shelf;
pub mod stock;

use crate::config::Config;
use crate::inventory::InventorySnapshot;
use crate::layout::WarehouseLayout;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

/// Resolved settings shared by every command
pub struct Session {
    /// Effective configuration after flags are applied
    pub config: Config,
    /// Emit JSON instead of text where supported
    pub json: bool,
}

impl Session {
    /// Create a session from a loaded configuration
    #[must_use]
    pub fn new(config: Config, json: bool) -> Self {
        Self { config, json }
    }

    /// Directory holding layout.json and, by default, inventory.json
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Load the layout from the data directory
    pub fn load_layout(&self) -> Result<WarehouseLayout> {
        WarehouseLayout::load(self.data_dir())
            .with_context(|| format!("Failed to load layout from {}", self.data_dir().display()))
    }

    /// Save the layout to the data directory
    pub fn save_layout(&self, layout: &WarehouseLayout) -> Result<()> {
        layout.save(self.data_dir())
    }

    /// Load the inventory snapshot in effect
    pub fn load_inventory(&self) -> Result<InventorySnapshot> {
        InventorySnapshot::load(&self.config.inventory_path())
    }

    /// Save the inventory snapshot in effect
    pub fn save_inventory(&self, inventory: &InventorySnapshot) -> Result<()> {
        inventory.save(&self.config.inventory_path())
    }

    /// Lock marker for text output
    #[must_use]
    pub fn lock_marker(&self, locked: bool) -> String {
        match (locked, self.config.color) {
            (true, true) => "LOCKED".red().bold().to_string(),
            (true, false) => "LOCKED".to_string(),
            (false, true) => "free".green().to_string(),
            (false, false) => "free".to_string(),
        }
    }
}

/// Resolve a bin code or ID to a bin ID
pub fn resolve_bin(layout: &WarehouseLayout, code_or_id: &str) -> Result<String> {
    if code_or_id.starts_with("bin:") {
        if layout.get_bin(code_or_id).is_some() {
            return Ok(code_or_id.to_string());
        }
        anyhow::bail!("Bin not found: {}", code_or_id);
    }

    let matches: Vec<_> = layout
        .store
        .bins
        .iter()
        .filter(|b| b.code == code_or_id)
        .collect();

    match matches.len() {
        0 => anyhow::bail!("No bin found with code: {}", code_or_id),
        1 => Ok(matches[0].id.clone()),
        _ => {
            eprintln!("Multiple bins have code '{code_or_id}':");
            for b in &matches {
                eprintln!("  {} on {}", b.id, b.shelf_id);
            }
            anyhow::bail!("Ambiguous bin code. Use full ID.");
        }
    }
}

/// Resolve a rack and level, or a shelf ID, to a shelf ID
pub fn resolve_shelf(layout: &WarehouseLayout, rack: Option<&str>, level: Option<u32>, shelf: Option<&str>) -> Result<String> {
    if let Some(id) = shelf {
        if layout.get_shelf(id).is_some() {
            return Ok(id.to_string());
        }
        anyhow::bail!("Shelf not found: {}", id);
    }

    let rack = rack.ok_or_else(|| anyhow::anyhow!("--rack and --level (or --shelf) are required"))?;
    let level = level.ok_or_else(|| anyhow::anyhow!("--level is required"))?;
    let rack_id = layout.resolve_rack(rack)?;
    layout
        .shelves_in(&rack_id)
        .into_iter()
        .find(|s| s.level == level)
        .map(|s| s.id.clone())
        .ok_or_else(|| anyhow::anyhow!("Rack {} has no shelf at level {}", rack_id, level))
}
