// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Rack management commands

use super::Session;
use crate::types::Rack;
use anyhow::Result;
use serde::Serialize;

/// Arguments for rack commands
#[derive(Debug, Default)]
pub struct RackArgs {
    /// Zone or aisle label
    pub zone: Option<String>,
    /// New display name (rename)
    pub new_name: Option<String>,
}

#[derive(Serialize)]
struct RackSummary<'a> {
    id: &'a str,
    name: &'a str,
    zone: Option<&'a str>,
    shelves: usize,
    locked: bool,
    qty: f64,
}

/// Run rack command
pub fn run(session: &Session, action: &str, name: Option<String>, args: RackArgs) -> Result<()> {
    let mut layout = session.load_layout()?;
    let inventory = session.load_inventory()?;

    match action {
        "add" | "create" => {
            let name = name.ok_or_else(|| anyhow::anyhow!("Rack name is required"))?;
            let rack = Rack::new(&name, args.zone, "manual");
            let rack_id = rack.id.clone();

            if layout.get_rack(&rack_id).is_some() {
                anyhow::bail!("Rack already exists: {}", rack_id);
            }

            layout.add_rack(rack);
            session.save_layout(&layout)?;
            println!("Created rack: {name} ({rack_id})");
        }

        "remove" | "delete" | "rm" => {
            let name = name.ok_or_else(|| anyhow::anyhow!("Rack name or ID is required"))?;
            let rack_id = layout.resolve_rack(&name)?;
            let rack = layout.remove_rack(&rack_id, &inventory)?;
            session.save_layout(&layout)?;
            println!("Removed rack: {} ({})", rack.name, rack.id);
        }

        "rename" => {
            let name = name.ok_or_else(|| anyhow::anyhow!("Rack name or ID is required"))?;
            if args.new_name.is_none() && args.zone.is_none() {
                anyhow::bail!("Nothing to change: pass --to and/or --zone");
            }
            let rack_id = layout.resolve_rack(&name)?;
            let new_name = layout
                .rename_rack(&rack_id, args.new_name, args.zone, &inventory)?
                .name
                .clone();
            session.save_layout(&layout)?;
            println!("Updated rack: {new_name} ({rack_id})");
        }

        "list" | "ls" => {
            let locked = layout.locked_racks(&inventory);
            let summaries: Vec<RackSummary> = layout
                .racks()
                .iter()
                .map(|r| RackSummary {
                    id: &r.id,
                    name: &r.name,
                    zone: r.zone.as_deref(),
                    shelves: layout.shelves_in(&r.id).len(),
                    locked: locked.contains(&r.id),
                    qty: layout.rack_inventory_count(&r.id, &inventory),
                })
                .collect();

            if session.json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
                return Ok(());
            }

            if summaries.is_empty() {
                println!("No racks defined. Use 'racklock rack add <name>' to create one.");
                return Ok(());
            }

            println!("Racks ({}):", summaries.len());
            for s in &summaries {
                let zone = s.zone.map(|z| format!(" [{z}]")).unwrap_or_default();
                println!(
                    "  {}{} - {} shelves, qty {} {}",
                    s.name,
                    zone,
                    s.shelves,
                    s.qty,
                    session.lock_marker(s.locked)
                );
            }
        }

        "show" => {
            let name = name.ok_or_else(|| anyhow::anyhow!("Rack name or ID is required"))?;
            let rack_id = layout.resolve_rack(&name)?;
            let locked = layout.locked_racks(&inventory);
            let Some(rack) = layout.get_rack(&rack_id) else {
                anyhow::bail!("Rack not found: {}", name);
            };

            println!("Rack: {}", rack.name);
            println!("  id: {}", rack.id);
            if let Some(zone) = &rack.zone {
                println!("  zone: {zone}");
            }
            println!("  status: {}", session.lock_marker(locked.contains(&rack.id)));
            println!("  qty: {}", layout.rack_inventory_count(&rack.id, &inventory));

            let shelves = layout.shelves_in(&rack.id);
            if shelves.is_empty() {
                println!("  shelves: (none)");
            }
            for shelf in shelves {
                println!("  level {} ({})", shelf.level, shelf.id);
                for bin in layout.bins_on(&shelf.id) {
                    match inventory.get(&bin.id) {
                        Some(rec) if rec.qty != 0.0 => {
                            let unit = rec.unit.as_deref().unwrap_or("");
                            println!("    {} {} x{} {}", bin.code, rec.sku, rec.qty, unit);
                        }
                        _ => println!("    {} (empty)", bin.code),
                    }
                }
            }
        }

        other => {
            anyhow::bail!("Unknown action: {}. Valid: add, remove, rename, list, show", other);
        }
    }

    Ok(())
}
