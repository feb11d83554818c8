// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Shelf management commands

use super::{resolve_shelf, Session};
use crate::types::Shelf;
use anyhow::Result;

/// Run shelf command
pub fn run(session: &Session, action: &str, rack: Option<String>, level: Option<u32>) -> Result<()> {
    let mut layout = session.load_layout()?;

    match action {
        "add" | "create" => {
            let rack = rack.ok_or_else(|| anyhow::anyhow!("--rack is required"))?;
            let rack_id = layout.resolve_rack(&rack)?;
            let level = match level {
                Some(level) => level,
                None => layout
                    .next_shelf_level(&rack_id)
                    .ok_or_else(|| anyhow::anyhow!("No level above the top shelf of {rack_id}; pass --level"))?,
            };

            let shelf = Shelf::new(&rack_id, level, "manual");
            let shelf_id = shelf.id.clone();
            if layout.get_shelf(&shelf_id).is_some() {
                anyhow::bail!("Shelf already exists: {}", shelf_id);
            }

            layout.add_shelf(shelf)?;
            session.save_layout(&layout)?;
            println!("Created shelf: level {level} in {rack_id} ({shelf_id})");
        }

        "remove" | "delete" | "rm" => {
            let inventory = session.load_inventory()?;
            let shelf_id = resolve_shelf(&layout, rack.as_deref(), level, None)?;
            let shelf = layout.remove_shelf(&shelf_id, &inventory)?;
            session.save_layout(&layout)?;
            println!("Removed shelf: level {} in {}", shelf.level, shelf.rack_id);
        }

        "list" | "ls" => {
            let rack = rack.ok_or_else(|| anyhow::anyhow!("--rack is required"))?;
            let rack_id = layout.resolve_rack(&rack)?;
            let shelves = layout.shelves_in(&rack_id);

            if session.json {
                println!("{}", serde_json::to_string_pretty(&shelves)?);
                return Ok(());
            }

            if shelves.is_empty() {
                println!("No shelves in {rack_id}. Use 'racklock shelf add --rack {rack}' to create one.");
                return Ok(());
            }

            println!("Shelves in {} ({}):", rack_id, shelves.len());
            for shelf in shelves {
                println!("  level {} - {} bins ({})", shelf.level, layout.bins_on(&shelf.id).len(), shelf.id);
            }
        }

        other => {
            anyhow::bail!("Unknown action: {}. Valid: add, remove, list", other);
        }
    }

    Ok(())
}
