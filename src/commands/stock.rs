// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Stock commands - edit the local inventory snapshot

use super::{resolve_bin, Session};
use crate::types::InventoryRecord;
use anyhow::Result;

/// Arguments for `stock set`
#[derive(Debug, Default)]
pub struct StockArgs {
    /// Stock-keeping unit
    pub sku: Option<String>,
    /// Quantity on hand
    pub qty: Option<f64>,
    /// Unit of measure
    pub unit: Option<String>,
    /// Reserved quantity
    pub reserved: Option<f64>,
}

/// Run stock command
pub fn run(session: &Session, action: &str, bin: Option<String>, args: StockArgs) -> Result<()> {
    let layout = session.load_layout()?;
    let mut inventory = session.load_inventory()?;

    match action {
        "set" => {
            let bin = bin.ok_or_else(|| anyhow::anyhow!("Bin code or ID is required"))?;
            let sku = args.sku.ok_or_else(|| anyhow::anyhow!("--sku is required"))?;
            let qty = args.qty.ok_or_else(|| anyhow::anyhow!("--qty is required"))?;
            let bin_id = resolve_bin(&layout, &bin)?;

            let record = InventoryRecord {
                sku,
                qty,
                unit: args.unit,
                reserved: args.reserved,
            };
            inventory.set(&bin_id, record)?;
            session.save_inventory(&inventory)?;
            println!("Set stock in {bin}: qty {qty}");
        }

        "clear" => {
            let bin = bin.ok_or_else(|| anyhow::anyhow!("Bin code or ID is required"))?;
            let bin_id = resolve_bin(&layout, &bin)?;
            if inventory.clear(&bin_id).is_some() {
                session.save_inventory(&inventory)?;
                println!("Cleared stock in {bin}");
            } else {
                println!("No stock recorded in {bin}");
            }
        }

        "list" | "ls" => {
            let mut rows: Vec<_> = inventory.iter().collect();
            rows.sort_by(|a, b| a.0.cmp(b.0));

            if session.json {
                let map: std::collections::BTreeMap<_, _> = rows.into_iter().collect();
                println!("{}", serde_json::to_string_pretty(&map)?);
                return Ok(());
            }

            if rows.is_empty() {
                println!("No stock recorded.");
                return Ok(());
            }

            println!("Stock ({} bins):", rows.len());
            for (bin_id, rec) in rows {
                let code = layout.get_bin(bin_id).map_or(bin_id, |b| b.code.as_str());
                let reserved = rec.reserved.map(|r| format!(" ({r} reserved)")).unwrap_or_default();
                println!(
                    "  {} {} x{} {}{}",
                    code,
                    rec.sku,
                    rec.qty,
                    rec.unit.as_deref().unwrap_or(""),
                    reserved
                );
            }
        }

        other => {
            anyhow::bail!("Unknown action: {}. Valid: set, clear, list", other);
        }
    }

    Ok(())
}
