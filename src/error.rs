// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Domain errors for layout edits and inventory records

use thiserror::Error;

/// Errors raised by structural edits to the warehouse layout
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    /// No rack with this ID exists
    #[error("Rack not found: {0}")]
    RackNotFound(String),

    /// No shelf with this ID exists
    #[error("Shelf not found: {0}")]
    ShelfNotFound(String),

    /// No bin with this ID exists
    #[error("Bin not found: {0}")]
    BinNotFound(String),

    /// The rack holds stock and cannot be changed structurally
    #[error("Rack {rack_id} is locked: {qty} unit(s) in stock beneath it")]
    RackLocked {
        /// The locked rack
        rack_id: String,
        /// Total quantity currently held under the rack
        qty: f64,
    },

    /// An inventory record failed validation
    #[error("Invalid inventory record: {0}")]
    InvalidRecord(String),
}
