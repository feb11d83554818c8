// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Warehouse layout: racks, shelves and bins with lock-guarded edits

use crate::error::LayoutError;
use crate::inventory::InventorySnapshot;
use crate::lock::{self, HierarchyIndex, LockedRacks};
use crate::types::{Bin, LayoutStore, Rack, Shelf};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// File name of the layout inside the data directory
pub const LAYOUT_FILE: &str = "layout.json";

/// The warehouse layout with a derived parent -> child index
pub struct WarehouseLayout {
    /// Adjacency derived from the store
    index: HierarchyIndex,
    /// The persisted records
    pub store: LayoutStore,
}

impl Default for WarehouseLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl WarehouseLayout {
    /// Create an empty layout
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: HierarchyIndex::new(),
            store: LayoutStore::default(),
        }
    }

    /// Build a layout around an existing store
    #[must_use]
    pub fn from_store(store: LayoutStore) -> Self {
        let mut layout = Self {
            index: HierarchyIndex::new(),
            store,
        };
        layout.rebuild_index();
        layout
    }

    /// Load the layout from a directory containing layout.json
    pub fn load(dir: &Path) -> Result<Self> {
        let layout_path = dir.join(LAYOUT_FILE);

        let store: LayoutStore = if layout_path.exists() {
            let content = fs::read_to_string(&layout_path)
                .with_context(|| format!("Failed to read {}", layout_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", layout_path.display()))?
        } else {
            LayoutStore::default()
        };

        Ok(Self::from_store(store))
    }

    /// Save the layout to a directory
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let layout_path = dir.join(LAYOUT_FILE);
        let json = self.to_json()?;
        fs::write(&layout_path, json)
            .with_context(|| format!("Failed to write {}", layout_path.display()))?;

        Ok(())
    }

    /// Rebuild the index from the store.
    ///
    /// Shelves pointing at unknown racks and bins pointing at unknown shelves
    /// are left out of the index.
    fn rebuild_index(&mut self) {
        self.index.clear();

        for shelf in &self.store.shelves {
            if self.get_rack(&shelf.rack_id).is_some() {
                self.index.link_shelf(&shelf.rack_id, &shelf.id);
            } else {
                tracing::warn!("Shelf {} references unknown rack {}", shelf.id, shelf.rack_id);
            }
        }

        for bin in &self.store.bins {
            if self.get_shelf(&bin.shelf_id).is_some() {
                self.index.link_bin(&bin.shelf_id, &bin.id);
            } else {
                tracing::warn!("Bin {} references unknown shelf {}", bin.id, bin.shelf_id);
            }
        }
    }

    // =========================================================================
    // Additions
    // =========================================================================

    /// Add a rack, or update it in place if the ID is already present
    pub fn add_rack(&mut self, rack: Rack) {
        if let Some(existing) = self.store.racks.iter_mut().find(|r| r.id == rack.id) {
            *existing = rack;
        } else {
            self.store.racks.push(rack);
        }
    }

    /// Add a shelf to an existing rack
    pub fn add_shelf(&mut self, shelf: Shelf) -> Result<(), LayoutError> {
        if self.get_rack(&shelf.rack_id).is_none() {
            return Err(LayoutError::RackNotFound(shelf.rack_id));
        }

        self.index.link_shelf(&shelf.rack_id, &shelf.id);
        if let Some(existing) = self.store.shelves.iter_mut().find(|s| s.id == shelf.id) {
            *existing = shelf;
        } else {
            self.store.shelves.push(shelf);
        }
        Ok(())
    }

    /// Add a bin to an existing shelf
    pub fn add_bin(&mut self, bin: Bin) -> Result<(), LayoutError> {
        if self.get_shelf(&bin.shelf_id).is_none() {
            return Err(LayoutError::ShelfNotFound(bin.shelf_id));
        }

        self.index.link_bin(&bin.shelf_id, &bin.id);
        if let Some(existing) = self.store.bins.iter_mut().find(|b| b.id == bin.id) {
            *existing = bin;
        } else {
            self.store.bins.push(bin);
        }
        Ok(())
    }

    // =========================================================================
    // Guarded structural edits
    // =========================================================================

    /// Fail with `RackLocked` if the rack holds stock in `inventory`
    pub fn ensure_unlocked(&self, rack_id: &str, inventory: &InventorySnapshot) -> Result<(), LayoutError> {
        let locked = lock::compute_lock_status([rack_id], &self.index, inventory);
        if lock::is_rack_locked(rack_id, &locked) {
            return Err(LayoutError::RackLocked {
                rack_id: rack_id.to_string(),
                qty: self.rack_inventory_count(rack_id, inventory),
            });
        }
        Ok(())
    }

    /// Remove an unlocked rack together with its shelves and bins
    pub fn remove_rack(&mut self, rack_id: &str, inventory: &InventorySnapshot) -> Result<Rack, LayoutError> {
        let pos = self
            .store
            .racks
            .iter()
            .position(|r| r.id == rack_id)
            .ok_or_else(|| LayoutError::RackNotFound(rack_id.to_string()))?;
        self.ensure_unlocked(rack_id, inventory)?;

        let shelf_ids: Vec<String> = self
            .store
            .shelves
            .iter()
            .filter(|s| s.rack_id == rack_id)
            .map(|s| s.id.clone())
            .collect();
        self.store.bins.retain(|b| !shelf_ids.contains(&b.shelf_id));
        self.store.shelves.retain(|s| s.rack_id != rack_id);
        self.index.unlink_rack(rack_id);

        tracing::info!("Removed rack {} ({} shelves)", rack_id, shelf_ids.len());
        Ok(self.store.racks.remove(pos))
    }

    /// Remove a shelf and its bins, unless its rack is locked
    pub fn remove_shelf(&mut self, shelf_id: &str, inventory: &InventorySnapshot) -> Result<Shelf, LayoutError> {
        let pos = self
            .store
            .shelves
            .iter()
            .position(|s| s.id == shelf_id)
            .ok_or_else(|| LayoutError::ShelfNotFound(shelf_id.to_string()))?;
        let rack_id = self.store.shelves[pos].rack_id.clone();
        self.ensure_unlocked(&rack_id, inventory)?;

        self.store.bins.retain(|b| b.shelf_id != shelf_id);
        self.index.unlink_shelf(&rack_id, shelf_id);
        Ok(self.store.shelves.remove(pos))
    }

    /// Remove a bin, unless its rack is locked
    pub fn remove_bin(&mut self, bin_id: &str, inventory: &InventorySnapshot) -> Result<Bin, LayoutError> {
        let pos = self
            .store
            .bins
            .iter()
            .position(|b| b.id == bin_id)
            .ok_or_else(|| LayoutError::BinNotFound(bin_id.to_string()))?;
        let shelf_id = self.store.bins[pos].shelf_id.clone();
        if let Some(rack_id) = self.get_shelf(&shelf_id).map(|s| s.rack_id.clone()) {
            self.ensure_unlocked(&rack_id, inventory)?;
        }

        self.index.unlink_bin(&shelf_id, bin_id);
        Ok(self.store.bins.remove(pos))
    }

    /// Change a rack's display name or zone, unless it is locked.
    ///
    /// The ID is kept so shelves and external inventory references stay valid.
    pub fn rename_rack(
        &mut self,
        rack_id: &str,
        name: Option<String>,
        zone: Option<String>,
        inventory: &InventorySnapshot,
    ) -> Result<&Rack, LayoutError> {
        if self.get_rack(rack_id).is_none() {
            return Err(LayoutError::RackNotFound(rack_id.to_string()));
        }
        self.ensure_unlocked(rack_id, inventory)?;

        let rack = self
            .store
            .racks
            .iter_mut()
            .find(|r| r.id == rack_id)
            .ok_or_else(|| LayoutError::RackNotFound(rack_id.to_string()))?;
        if let Some(name) = name {
            rack.name = name;
        }
        if zone.is_some() {
            rack.zone = zone;
        }
        Ok(rack)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Get a rack by ID
    #[must_use]
    pub fn get_rack(&self, id: &str) -> Option<&Rack> {
        self.store.racks.iter().find(|r| r.id == id)
    }

    /// Get a shelf by ID
    #[must_use]
    pub fn get_shelf(&self, id: &str) -> Option<&Shelf> {
        self.store.shelves.iter().find(|s| s.id == id)
    }

    /// Get a bin by ID
    #[must_use]
    pub fn get_bin(&self, id: &str) -> Option<&Bin> {
        self.store.bins.iter().find(|b| b.id == id)
    }

    /// Get all racks
    #[must_use]
    pub fn racks(&self) -> &[Rack] {
        &self.store.racks
    }

    /// Shelves in a rack, ordered by level
    #[must_use]
    pub fn shelves_in(&self, rack_id: &str) -> Vec<&Shelf> {
        let mut shelves: Vec<&Shelf> = self
            .store
            .shelves
            .iter()
            .filter(|s| s.rack_id == rack_id)
            .collect();
        shelves.sort_by_key(|s| s.level);
        shelves
    }

    /// Level for a new shelf stacked on top of a rack; 1 for an empty rack.
    ///
    /// `None` when the top shelf already sits at the highest representable level.
    #[must_use]
    pub fn next_shelf_level(&self, rack_id: &str) -> Option<u32> {
        match self.shelves_in(rack_id).last() {
            Some(top) => top.level.checked_add(1),
            None => Some(1),
        }
    }

    /// Bins on a shelf, in insertion order
    #[must_use]
    pub fn bins_on(&self, shelf_id: &str) -> Vec<&Bin> {
        self.store
            .bins
            .iter()
            .filter(|b| b.shelf_id == shelf_id)
            .collect()
    }

    /// The derived parent -> child index
    #[must_use]
    pub fn index(&self) -> &HierarchyIndex {
        &self.index
    }

    /// Check if the layout has no racks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.racks.is_empty()
    }

    /// Racks holding stock in `inventory`
    #[must_use]
    pub fn locked_racks(&self, inventory: &InventorySnapshot) -> LockedRacks {
        lock::compute_lock_status(
            self.store.racks.iter().map(|r| r.id.as_str()),
            &self.index,
            inventory,
        )
    }

    /// Total quantity held beneath a rack
    #[must_use]
    pub fn rack_inventory_count(&self, rack_id: &str, inventory: &InventorySnapshot) -> f64 {
        lock::rack_inventory_count(rack_id, &self.index, inventory)
    }

    /// Resolve a rack name or ID to its ID
    pub fn resolve_rack(&self, name_or_id: &str) -> Result<String, LayoutError> {
        if let Some(rack) = self
            .store
            .racks
            .iter()
            .find(|r| r.id == name_or_id || r.name == name_or_id)
        {
            return Ok(rack.id.clone());
        }
        let generated = Rack::generate_id(name_or_id);
        self.get_rack(&generated)
            .map(|r| r.id.clone())
            .ok_or_else(|| LayoutError::RackNotFound(name_or_id.to_string()))
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Export to DOT format for Graphviz; locked racks are drawn in red
    #[must_use]
    pub fn to_dot(&self, inventory: &InventorySnapshot) -> String {
        let locked = self.locked_racks(inventory);
        let mut dot = String::from("digraph warehouse {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box, style=rounded];\n\n");

        for rack in &self.store.racks {
            let qty = self.rack_inventory_count(&rack.id, inventory);
            if locked.contains(&rack.id) {
                dot.push_str(&format!(
                    "  \"{}\" [label=\"{}\\nqty {}\", color=red, penwidth=2];\n",
                    dot_escape(&rack.id),
                    dot_escape(&rack.name),
                    qty
                ));
            } else {
                dot.push_str(&format!(
                    "  \"{}\" [label=\"{}\"];\n",
                    dot_escape(&rack.id),
                    dot_escape(&rack.name)
                ));
            }
        }

        for shelf in &self.store.shelves {
            dot.push_str(&format!(
                "  \"{}\" [label=\"L{}\", shape=ellipse];\n",
                dot_escape(&shelf.id),
                shelf.level
            ));
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                dot_escape(&shelf.rack_id),
                dot_escape(&shelf.id)
            ));
        }

        for bin in &self.store.bins {
            let qty = inventory.quantity(&bin.id);
            dot.push_str(&format!(
                "  \"{}\" [label=\"{}\\n{}\", shape=note];\n",
                dot_escape(&bin.id),
                dot_escape(&bin.code),
                qty
            ));
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                dot_escape(&bin.shelf_id),
                dot_escape(&bin.id)
            ));
        }

        dot.push_str("}\n");
        dot
    }

    /// Export to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.store).context("Failed to serialize layout to JSON")
    }

    /// Export to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(&self.store).context("Failed to serialize layout to TOML")
    }
}

/// Escape a string for use inside a double-quoted DOT ID or label
fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InventoryRecord;
    use tempfile::TempDir;

    /// One rack "A1" with shelf level 1 and bins "A1-1-01", "A1-1-02"
    fn make_layout() -> (WarehouseLayout, String, String, Vec<String>) {
        let mut layout = WarehouseLayout::new();
        let rack = Rack::new("A1", Some("north".into()), "test");
        let rack_id = rack.id.clone();
        layout.add_rack(rack);

        let shelf = Shelf::new(&rack_id, 1, "test");
        let shelf_id = shelf.id.clone();
        layout.add_shelf(shelf).unwrap();

        let bins = ["A1-1-01", "A1-1-02"]
            .iter()
            .map(|code| {
                let bin = Bin::new(&shelf_id, code, "test");
                let id = bin.id.clone();
                layout.add_bin(bin).unwrap();
                id
            })
            .collect();
        (layout, rack_id, shelf_id, bins)
    }

    #[test]
    fn test_add_shelf_requires_rack() {
        let mut layout = WarehouseLayout::new();
        let err = layout.add_shelf(Shelf::new("rack:ghost", 1, "test")).unwrap_err();
        assert_eq!(err, LayoutError::RackNotFound("rack:ghost".into()));
    }

    #[test]
    fn test_add_bin_requires_shelf() {
        let mut layout = WarehouseLayout::new();
        let err = layout.add_bin(Bin::new("shelf:ghost/1", "X", "test")).unwrap_err();
        assert_eq!(err, LayoutError::ShelfNotFound("shelf:ghost/1".into()));
    }

    #[test]
    fn test_add_is_idempotent() {
        let (mut layout, rack_id, shelf_id, _) = make_layout();
        layout.add_rack(Rack::new("A1", None, "test"));
        layout.add_shelf(Shelf::new(&rack_id, 1, "test")).unwrap();
        layout.add_bin(Bin::new(&shelf_id, "A1-1-01", "test")).unwrap();

        assert_eq!(layout.racks().len(), 1);
        assert_eq!(layout.shelves_in(&rack_id).len(), 1);
        assert_eq!(layout.bins_on(&shelf_id).len(), 2);
    }

    #[test]
    fn test_stocked_rack_cannot_be_removed() {
        let (mut layout, rack_id, _, bins) = make_layout();
        let mut inventory = InventorySnapshot::new();
        inventory.insert(&bins[1], InventoryRecord::new("SKU-1", 3.0));

        let err = layout.remove_rack(&rack_id, &inventory).unwrap_err();
        assert_eq!(
            err,
            LayoutError::RackLocked {
                rack_id: rack_id.clone(),
                qty: 3.0
            }
        );
        assert!(layout.get_rack(&rack_id).is_some());
    }

    #[test]
    fn test_empty_rack_removal_cascades() {
        let (mut layout, rack_id, shelf_id, bins) = make_layout();
        let mut inventory = InventorySnapshot::new();
        inventory.insert(&bins[0], InventoryRecord::new("SKU-1", 0.0));

        layout.remove_rack(&rack_id, &inventory).unwrap();
        assert!(layout.is_empty());
        assert!(layout.get_shelf(&shelf_id).is_none());
        assert!(layout.store.bins.is_empty());
        assert!(layout.index().shelves_of(&rack_id).is_none());
    }

    #[test]
    fn test_bin_and_shelf_removal_guarded_by_rack() {
        let (mut layout, _, shelf_id, bins) = make_layout();
        let mut inventory = InventorySnapshot::new();
        inventory.insert(&bins[0], InventoryRecord::new("SKU-1", 1.0));

        assert!(matches!(
            layout.remove_bin(&bins[1], &inventory),
            Err(LayoutError::RackLocked { .. })
        ));
        assert!(matches!(
            layout.remove_shelf(&shelf_id, &inventory),
            Err(LayoutError::RackLocked { .. })
        ));

        inventory.clear(&bins[0]);
        layout.remove_bin(&bins[1], &inventory).unwrap();
        assert_eq!(layout.bins_on(&shelf_id).len(), 1);
        layout.remove_shelf(&shelf_id, &inventory).unwrap();
        assert!(layout.store.bins.is_empty());
    }

    #[test]
    fn test_rename_rack_keeps_id() {
        let (mut layout, rack_id, _, _) = make_layout();
        let inventory = InventorySnapshot::new();

        let rack = layout
            .rename_rack(&rack_id, Some("Aisle 1 Rack".into()), None, &inventory)
            .unwrap();
        assert_eq!(rack.id, rack_id);
        assert_eq!(rack.name, "Aisle 1 Rack");
        assert_eq!(rack.zone.as_deref(), Some("north"));
    }

    #[test]
    fn test_save_and_load_rebuilds_index() {
        let (layout, rack_id, _, bins) = make_layout();
        let dir = TempDir::new().unwrap();
        layout.save(dir.path()).unwrap();

        let loaded = WarehouseLayout::load(dir.path()).unwrap();
        let mut inventory = InventorySnapshot::new();
        inventory.insert(&bins[0], InventoryRecord::new("SKU-1", 2.5));

        assert!(loaded.locked_racks(&inventory).contains(&rack_id));
        assert_eq!(loaded.rack_inventory_count(&rack_id, &inventory), 2.5);
    }

    #[test]
    fn test_dangling_records_are_not_indexed() {
        let mut store = LayoutStore::default();
        store.shelves.push(Shelf::new("rack:ghost", 1, "test"));
        let layout = WarehouseLayout::from_store(store);
        assert!(layout.index().shelves_of("rack:ghost").is_none());
    }

    #[test]
    fn test_resolve_rack_by_name() {
        let (layout, rack_id, _, _) = make_layout();
        assert_eq!(layout.resolve_rack("A1").unwrap(), rack_id);
        assert_eq!(layout.resolve_rack(&rack_id).unwrap(), rack_id);
        assert!(layout.resolve_rack("B7").is_err());
    }

    #[test]
    fn test_to_dot_marks_locked() {
        let (layout, _, _, bins) = make_layout();
        let mut inventory = InventorySnapshot::new();
        inventory.insert(&bins[0], InventoryRecord::new("SKU-1", 9.0));

        let dot = layout.to_dot(&inventory);
        assert!(dot.contains("digraph warehouse"));
        assert!(dot.contains("color=red"));
        assert!(dot.contains("qty 9"));
    }

    #[test]
    fn test_to_dot_escapes_names() {
        let mut layout = WarehouseLayout::new();
        layout.add_rack(Rack::new(r#"Rack "A" \ 1"#, None, "test"));

        let dot = layout.to_dot(&InventorySnapshot::new());
        assert!(dot.contains(r#"[label="Rack \"A\" \\ 1"]"#));
        assert!(!dot.contains(r#"label="Rack "A""#));
    }

    #[test]
    fn test_huge_stock_still_blocks_removal() {
        let (mut layout, rack_id, _, bins) = make_layout();
        let mut inventory = InventorySnapshot::new();
        for bin in &bins {
            inventory.insert(bin, InventoryRecord::new("BULK", i64::MAX as f64));
        }

        match layout.remove_rack(&rack_id, &inventory) {
            Err(LayoutError::RackLocked { qty, .. }) => assert!(qty.is_finite() && qty > 0.0),
            other => panic!("expected RackLocked, got {other:?}"),
        }
    }

    #[test]
    fn test_next_shelf_level() {
        let (mut layout, rack_id, _, _) = make_layout();
        assert_eq!(layout.next_shelf_level(&rack_id), Some(2));
        assert_eq!(layout.next_shelf_level("rack:empty"), Some(1));

        layout.add_shelf(Shelf::new(&rack_id, u32::MAX, "test")).unwrap();
        assert_eq!(layout.next_shelf_level(&rack_id), None);
    }

    #[test]
    fn test_to_toml() {
        let (layout, _, _, _) = make_layout();
        let toml = layout.to_toml().unwrap();
        assert!(toml.contains("[[racks]]"));
        assert!(toml.contains("A1-1-01"));
    }
}
