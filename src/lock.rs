// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Rack lock computation
//!
//! A rack is locked when any bin reachable through its shelves holds a
//! positive quantity. The locked set is a pure projection of the current
//! inventory snapshot over the hierarchy: it is recomputed on demand and
//! never stored.

use crate::inventory::InventorySnapshot;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Parent -> child adjacency for the rack/shelf/bin hierarchy
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    rack_to_shelves: HashMap<String, HashSet<String>>,
    shelf_to_bins: HashMap<String, HashSet<String>>,
}

impl HierarchyIndex {
    /// Create an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `shelf_id` sits in `rack_id`
    pub fn link_shelf(&mut self, rack_id: &str, shelf_id: &str) {
        self.rack_to_shelves
            .entry(rack_id.to_string())
            .or_default()
            .insert(shelf_id.to_string());
    }

    /// Record that `bin_id` sits on `shelf_id`
    pub fn link_bin(&mut self, shelf_id: &str, bin_id: &str) {
        self.shelf_to_bins
            .entry(shelf_id.to_string())
            .or_default()
            .insert(bin_id.to_string());
    }

    /// Drop a rack and everything indexed beneath it
    pub fn unlink_rack(&mut self, rack_id: &str) {
        if let Some(shelves) = self.rack_to_shelves.remove(rack_id) {
            for shelf in shelves {
                self.shelf_to_bins.remove(&shelf);
            }
        }
    }

    /// Drop a shelf from its rack, along with its bin set
    pub fn unlink_shelf(&mut self, rack_id: &str, shelf_id: &str) {
        if let Some(shelves) = self.rack_to_shelves.get_mut(rack_id) {
            shelves.remove(shelf_id);
        }
        self.shelf_to_bins.remove(shelf_id);
    }

    /// Drop a bin from its shelf
    pub fn unlink_bin(&mut self, shelf_id: &str, bin_id: &str) {
        if let Some(bins) = self.shelf_to_bins.get_mut(shelf_id) {
            bins.remove(bin_id);
        }
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.rack_to_shelves.clear();
        self.shelf_to_bins.clear();
    }

    /// Shelf IDs under a rack, if the rack has any indexed
    #[must_use]
    pub fn shelves_of(&self, rack_id: &str) -> Option<&HashSet<String>> {
        self.rack_to_shelves.get(rack_id)
    }

    /// Bin IDs on a shelf, if the shelf has any indexed
    #[must_use]
    pub fn bins_of(&self, shelf_id: &str) -> Option<&HashSet<String>> {
        self.shelf_to_bins.get(shelf_id)
    }

    /// Every bin reachable from a rack
    pub fn bins_under_rack<'a>(&'a self, rack_id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.shelves_of(rack_id)
            .into_iter()
            .flatten()
            .filter_map(|shelf| self.bins_of(shelf))
            .flatten()
            .map(String::as_str)
    }
}

/// The set of racks that currently hold stock
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LockedRacks(BTreeSet<String>);

impl LockedRacks {
    /// Is this rack in the set?
    #[must_use]
    pub fn contains(&self, rack_id: &str) -> bool {
        self.0.contains(rack_id)
    }

    /// Number of locked racks
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no rack is locked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Locked rack IDs in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for LockedRacks {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Work out which racks must be locked.
///
/// For each rack, its shelves are walked and each shelf's bins are looked up
/// in `inventory`; the first bin with `qty > 0` locks the rack and ends the
/// walk for that rack. Racks, shelves and bins missing from the index or the
/// snapshot count as empty.
pub fn compute_lock_status<'a, I>(
    racks: I,
    index: &HierarchyIndex,
    inventory: &InventorySnapshot,
) -> LockedRacks
where
    I: IntoIterator<Item = &'a str>,
{
    let mut locked = BTreeSet::new();
    let mut evaluated = 0usize;

    for rack_id in racks {
        evaluated += 1;
        let Some(shelves) = index.shelves_of(rack_id) else {
            continue;
        };

        'shelves: for shelf_id in shelves {
            let Some(bins) = index.bins_of(shelf_id) else {
                continue;
            };
            for bin_id in bins {
                if inventory.get(bin_id).is_some_and(|r| r.qty > 0.0) {
                    locked.insert(rack_id.to_string());
                    break 'shelves;
                }
            }
        }
    }

    tracing::debug!(evaluated, locked = locked.len(), "Computed rack locks");
    LockedRacks(locked)
}

/// Membership check against a computed lock set
#[must_use]
pub fn is_rack_locked(rack_id: &str, locked: &LockedRacks) -> bool {
    locked.contains(rack_id)
}

/// Total quantity held under a rack.
///
/// Unlike [`compute_lock_status`] this visits every reachable bin; it is a
/// display figure, not a gate.
#[must_use]
pub fn rack_inventory_count(
    rack_id: &str,
    index: &HierarchyIndex,
    inventory: &InventorySnapshot,
) -> f64 {
    index
        .bins_under_rack(rack_id)
        .map(|bin| inventory.quantity(bin))
        .sum()
}

/// One row of a lock report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RackLockRow {
    /// Rack ID
    pub rack_id: String,
    /// Whether the rack is locked
    pub locked: bool,
    /// Sum of quantities beneath the rack
    pub total_qty: f64,
    /// Number of bins under the rack holding a positive quantity
    pub stocked_bins: usize,
}

/// Lock state and stock totals for each rack, in the order given
pub fn lock_report<'a, I>(
    racks: I,
    index: &HierarchyIndex,
    inventory: &InventorySnapshot,
) -> Vec<RackLockRow>
where
    I: IntoIterator<Item = &'a str>,
{
    let racks: Vec<&str> = racks.into_iter().collect();
    let locked = compute_lock_status(racks.iter().copied(), index, inventory);

    racks
        .into_iter()
        .map(|rack_id| RackLockRow {
            rack_id: rack_id.to_string(),
            locked: is_rack_locked(rack_id, &locked),
            total_qty: rack_inventory_count(rack_id, index, inventory),
            stocked_bins: index
                .bins_under_rack(rack_id)
                .filter(|bin| inventory.quantity(bin) > 0.0)
                .count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InventoryRecord;

    /// R1 -> S1 -> {B1 (0), B2 (5)}; R2 -> S2 -> {B3 (0)}
    fn fixture() -> (HierarchyIndex, InventorySnapshot) {
        let mut index = HierarchyIndex::new();
        index.link_shelf("R1", "S1");
        index.link_bin("S1", "B1");
        index.link_bin("S1", "B2");
        index.link_shelf("R2", "S2");
        index.link_bin("S2", "B3");

        let mut inventory = InventorySnapshot::new();
        inventory.insert("B1", InventoryRecord::new("SKU-1", 0.0));
        inventory.insert("B2", InventoryRecord::new("SKU-2", 5.0));
        inventory.insert("B3", InventoryRecord::new("SKU-3", 0.0));
        (index, inventory)
    }

    #[test]
    fn test_example_layout() {
        let (index, inventory) = fixture();
        let locked = compute_lock_status(["R1", "R2"], &index, &inventory);

        assert_eq!(locked.iter().collect::<Vec<_>>(), vec!["R1"]);
        assert_eq!(rack_inventory_count("R1", &index, &inventory), 5.0);
        assert_eq!(rack_inventory_count("R2", &index, &inventory), 0.0);
    }

    #[test]
    fn test_rack_without_shelves_is_free() {
        let (index, inventory) = fixture();
        let locked = compute_lock_status(["R9"], &index, &inventory);
        assert!(locked.is_empty());
        assert_eq!(rack_inventory_count("R9", &index, &inventory), 0.0);
    }

    #[test]
    fn test_shelf_without_bins_is_skipped() {
        let (mut index, inventory) = fixture();
        index.link_shelf("R3", "S-empty");
        let locked = compute_lock_status(["R3"], &index, &inventory);
        assert!(!is_rack_locked("R3", &locked));
    }

    #[test]
    fn test_bin_missing_from_inventory_counts_as_empty() {
        let (mut index, inventory) = fixture();
        index.link_bin("S2", "B-unknown");
        let locked = compute_lock_status(["R2"], &index, &inventory);
        assert!(locked.is_empty());
    }

    #[test]
    fn test_negative_quantity_does_not_lock() {
        let (index, mut inventory) = fixture();
        inventory.insert("B3", InventoryRecord::new("SKU-3", -2.0));
        let locked = compute_lock_status(["R2"], &index, &inventory);
        assert!(locked.is_empty());
        assert_eq!(rack_inventory_count("R2", &index, &inventory), -2.0);
    }

    #[test]
    fn test_fractional_quantity_locks_and_counts() {
        let (index, _) = fixture();
        let inventory: InventorySnapshot =
            serde_json::from_str(r#"{ "B1": { "sku": "FLOUR", "qty": 0.5, "unit": "kg" } }"#).unwrap();

        let locked = compute_lock_status(["R1"], &index, &inventory);
        assert!(is_rack_locked("R1", &locked));
        assert_eq!(rack_inventory_count("R1", &index, &inventory), 0.5);

        let report = lock_report(["R1"], &index, &inventory);
        assert_eq!(report[0].stocked_bins, 1);
    }

    #[test]
    fn test_huge_quantities_sum_without_panicking() {
        let (index, mut inventory) = fixture();
        inventory.insert("B1", InventoryRecord::new("BULK", i64::MAX as f64));
        inventory.insert("B2", InventoryRecord::new("BULK", i64::MAX as f64));

        let total = rack_inventory_count("R1", &index, &inventory);
        assert!(total.is_finite());
        assert!(total > i64::MAX as f64);
        assert!(compute_lock_status(["R1"], &index, &inventory).contains("R1"));
    }

    #[test]
    fn test_count_does_not_short_circuit() {
        let (mut index, mut inventory) = fixture();
        index.link_shelf("R1", "S1b");
        index.link_bin("S1b", "B4");
        inventory.insert("B4", InventoryRecord::new("SKU-4", 7.0));

        let locked = compute_lock_status(["R1"], &index, &inventory);
        assert!(locked.contains("R1"));
        assert_eq!(rack_inventory_count("R1", &index, &inventory), 12.0);
    }

    #[test]
    fn test_unlink_rack_drops_bins() {
        let (mut index, inventory) = fixture();
        index.unlink_rack("R1");
        assert!(index.shelves_of("R1").is_none());
        assert!(index.bins_of("S1").is_none());
        assert_eq!(rack_inventory_count("R1", &index, &inventory), 0.0);
    }

    #[test]
    fn test_lock_report_rows() {
        let (index, inventory) = fixture();
        let report = lock_report(["R1", "R2"], &index, &inventory);

        assert_eq!(report.len(), 2);
        assert_eq!(report[0].rack_id, "R1");
        assert!(report[0].locked);
        assert_eq!(report[0].total_qty, 5.0);
        assert_eq!(report[0].stocked_bins, 1);
        assert!(!report[1].locked);
        assert_eq!(report[1].stocked_bins, 0);
    }
}
