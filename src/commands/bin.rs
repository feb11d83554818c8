// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Bin management commands

use super::{resolve_bin, resolve_shelf, Session};
use crate::types::Bin;
use anyhow::Result;

/// Where a bin lives, as given on the command line
#[derive(Debug, Default)]
pub struct BinLocation {
    /// Rack name or ID
    pub rack: Option<String>,
    /// Shelf level within the rack
    pub level: Option<u32>,
    /// Shelf ID, instead of rack + level
    pub shelf: Option<String>,
}

/// Run bin command
pub fn run(session: &Session, action: &str, code: Option<String>, location: BinLocation) -> Result<()> {
    let mut layout = session.load_layout()?;

    match action {
        "add" | "create" => {
            let code = code.ok_or_else(|| anyhow::anyhow!("Bin code is required"))?;
            let shelf_id = resolve_shelf(
                &layout,
                location.rack.as_deref(),
                location.level,
                location.shelf.as_deref(),
            )?;

            let bin = Bin::new(&shelf_id, &code, "manual");
            let bin_id = bin.id.clone();
            if layout.get_bin(&bin_id).is_some() {
                anyhow::bail!("Bin {} already exists on {}", code, shelf_id);
            }

            layout.add_bin(bin)?;
            session.save_layout(&layout)?;
            println!("Created bin: {code} ({bin_id})");
        }

        "remove" | "delete" | "rm" => {
            let code = code.ok_or_else(|| anyhow::anyhow!("Bin code or ID is required"))?;
            let inventory = session.load_inventory()?;
            let bin_id = resolve_bin(&layout, &code)?;
            let bin = layout.remove_bin(&bin_id, &inventory)?;
            session.save_layout(&layout)?;
            println!("Removed bin: {} ({})", bin.code, bin.id);
        }

        "list" | "ls" => {
            let shelf_id = resolve_shelf(
                &layout,
                location.rack.as_deref(),
                location.level,
                location.shelf.as_deref(),
            )?;
            let bins = layout.bins_on(&shelf_id);

            if session.json {
                println!("{}", serde_json::to_string_pretty(&bins)?);
                return Ok(());
            }

            if bins.is_empty() {
                println!("No bins on {shelf_id}.");
                return Ok(());
            }

            println!("Bins on {} ({}):", shelf_id, bins.len());
            for bin in bins {
                println!("  {} ({})", bin.code, bin.id);
            }
        }

        other => {
            anyhow::bail!("Unknown action: {}. Valid: add, remove, list", other);
        }
    }

    Ok(())
}
