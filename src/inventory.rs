// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Inventory snapshot keyed by bin ID
//!
//! The inventory system of record owns these numbers. Racklock only reads a
//! snapshot of them; the `stock` command edits a local copy for setups that
//! have no live feed.

use crate::error::LayoutError;
use crate::types::InventoryRecord;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// File name of the snapshot inside the data directory
pub const INVENTORY_FILE: &str = "inventory.json";

/// Point-in-time inventory, bin ID -> record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventorySnapshot {
    records: HashMap<String, InventoryRecord>,
}

impl InventorySnapshot {
    /// Create an empty snapshot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot from a JSON file; a missing file is an empty snapshot
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No inventory at {}, using empty snapshot", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Write the snapshot as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.records)
            .context("Failed to serialize inventory")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Record for a bin, if any
    #[must_use]
    pub fn get(&self, bin_id: &str) -> Option<&InventoryRecord> {
        self.records.get(bin_id)
    }

    /// Quantity in a bin; absent bins hold 0
    #[must_use]
    pub fn quantity(&self, bin_id: &str) -> f64 {
        self.get(bin_id).map_or(0.0, |r| r.qty)
    }

    /// Insert a record as-is, replacing any previous one
    pub fn insert(&mut self, bin_id: &str, record: InventoryRecord) -> Option<InventoryRecord> {
        self.records.insert(bin_id.to_string(), record)
    }

    /// Validate and store a record for a bin
    pub fn set(&mut self, bin_id: &str, record: InventoryRecord) -> Result<(), LayoutError> {
        validate(&record)?;
        tracing::debug!(bin = bin_id, sku = %record.sku, qty = record.qty, "Setting stock");
        self.insert(bin_id, record);
        Ok(())
    }

    /// Remove the record for a bin
    pub fn clear(&mut self, bin_id: &str) -> Option<InventoryRecord> {
        self.records.remove(bin_id)
    }

    /// Number of bins with a record
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no bin has a record
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InventoryRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn validate(record: &InventoryRecord) -> Result<(), LayoutError> {
    if record.sku.trim().is_empty() {
        return Err(LayoutError::InvalidRecord("SKU must not be empty".into()));
    }
    if !record.qty.is_finite() {
        return Err(LayoutError::InvalidRecord(format!(
            "quantity must be a finite number (got {})",
            record.qty
        )));
    }
    if record.qty < 0.0 {
        return Err(LayoutError::InvalidRecord(format!(
            "quantity must not be negative (got {})",
            record.qty
        )));
    }
    if let Some(reserved) = record.reserved {
        if !(0.0..=record.qty).contains(&reserved) {
            return Err(LayoutError::InvalidRecord(format!(
                "reserved must be between 0 and {} (got {reserved})",
                record.qty
            )));
        }
    }
    Ok(())
}
