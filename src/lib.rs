// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Racklock library - keep stocked racks from being edited
//!
//! This crate models a warehouse layout as a three-level hierarchy
//! (rack -> shelf -> bin) and decides which racks must be locked against
//! structural edits because a bin somewhere beneath them holds stock.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod config;
pub mod error;
pub mod inventory;
pub mod layout;
pub mod lock;

/// Core data types for the warehouse layout and inventory records
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use sha2::{Digest, Sha256};

    /// Convert a display name to a slug usable inside IDs
    #[must_use]
    pub fn slug(name: &str) -> String {
        name.to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect::<String>()
            .trim_matches('-')
            .to_string()
    }

    /// Creation metadata shared by every layout record
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct RecordMeta {
        /// Who created this record (manual, import, test)
        pub created_by: String,
        /// When the record was created
        pub created_at: DateTime<Utc>,
    }

    impl RecordMeta {
        /// Metadata stamped with the current time
        #[must_use]
        pub fn now(created_by: &str) -> Self {
            Self {
                created_by: created_by.to_string(),
                created_at: Utc::now(),
            }
        }
    }

    // =========================================================================
    // Rack
    // =========================================================================

    /// A rack: the top level of the storage hierarchy
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Rack {
        /// Always "Rack"
        pub kind: String,
        /// Unique identifier: rack:<slug>
        pub id: String,
        /// Display name
        pub name: String,
        /// Warehouse zone or aisle, if known
        #[serde(default)]
        pub zone: Option<String>,
        /// Creation metadata
        pub meta: RecordMeta,
    }

    impl Rack {
        /// Generate a deterministic ID for a rack
        #[must_use]
        pub fn generate_id(name: &str) -> String {
            format!("rack:{}", slug(name))
        }

        /// Build a new rack record
        #[must_use]
        pub fn new(name: &str, zone: Option<String>, created_by: &str) -> Self {
            Self {
                kind: "Rack".into(),
                id: Self::generate_id(name),
                name: name.to_string(),
                zone,
                meta: RecordMeta::now(created_by),
            }
        }
    }

    // =========================================================================
    // Shelf
    // =========================================================================

    /// A shelf inside a rack
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Shelf {
        /// Always "Shelf"
        pub kind: String,
        /// Unique identifier: shelf:<rack-slug>/<level>
        pub id: String,
        /// Owning rack ID
        pub rack_id: String,
        /// Vertical level within the rack, 1 is the floor
        pub level: u32,
        /// Creation metadata
        pub meta: RecordMeta,
    }

    impl Shelf {
        /// Generate a deterministic ID for a shelf
        #[must_use]
        pub fn generate_id(rack_id: &str, level: u32) -> String {
            let rack = rack_id.strip_prefix("rack:").unwrap_or(rack_id);
            format!("shelf:{rack}/{level}")
        }

        /// Build a new shelf record
        #[must_use]
        pub fn new(rack_id: &str, level: u32, created_by: &str) -> Self {
            Self {
                kind: "Shelf".into(),
                id: Self::generate_id(rack_id, level),
                rack_id: rack_id.to_string(),
                level,
                meta: RecordMeta::now(created_by),
            }
        }
    }

    // =========================================================================
    // Bin
    // =========================================================================

    /// A bin on a shelf; the unit that holds stock
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Bin {
        /// Always "Bin"
        pub kind: String,
        /// Content-hash ID: bin:<hash of (shelf_id, code)>
        pub id: String,
        /// Owning shelf ID
        pub shelf_id: String,
        /// Human-facing location code printed on the bin label
        pub code: String,
        /// Creation metadata
        pub meta: RecordMeta,
    }

    impl Bin {
        /// Generate a deterministic ID for a bin
        #[must_use]
        pub fn generate_id(shelf_id: &str, code: &str) -> String {
            let mut hasher = Sha256::new();
            hasher.update(shelf_id.as_bytes());
            hasher.update(b"\0");
            hasher.update(code.as_bytes());
            let hash = hex::encode(hasher.finalize());
            format!("bin:{}", &hash[..12])
        }

        /// Build a new bin record
        #[must_use]
        pub fn new(shelf_id: &str, code: &str, created_by: &str) -> Self {
            Self {
                kind: "Bin".into(),
                id: Self::generate_id(shelf_id, code),
                shelf_id: shelf_id.to_string(),
                code: code.to_string(),
                meta: RecordMeta::now(created_by),
            }
        }
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Stock held in one bin, as reported by the inventory system of record
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct InventoryRecord {
        /// Stock-keeping unit
        pub sku: String,
        /// Quantity on hand, fractional for weighed or measured stock
        pub qty: f64,
        /// Unit of measure (ea, kg, case)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub unit: Option<String>,
        /// Quantity reserved for open orders
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub reserved: Option<f64>,
    }

    impl InventoryRecord {
        /// Record with just a SKU and quantity
        #[must_use]
        pub fn new(sku: &str, qty: f64) -> Self {
            Self {
                sku: sku.to_string(),
                qty,
                unit: None,
                reserved: None,
            }
        }
    }

    // =========================================================================
    // Layout Store
    // =========================================================================

    /// The persisted warehouse layout
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct LayoutStore {
        /// All racks
        #[serde(default)]
        pub racks: Vec<Rack>,
        /// All shelves
        #[serde(default)]
        pub shelves: Vec<Shelf>,
        /// All bins
        #[serde(default)]
        pub bins: Vec<Bin>,
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::LayoutError;
    pub use crate::inventory::InventorySnapshot;
    pub use crate::layout::WarehouseLayout;
    pub use crate::lock::{HierarchyIndex, LockedRacks};
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
