// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Locks command - report which racks hold stock and are closed to edits

use super::Session;
use crate::lock;
use anyhow::Result;
use tracing::info;

/// Run locks command
pub fn run(session: &Session, rack: Option<String>, locked_only: bool) -> Result<()> {
    let layout = session.load_layout()?;
    let inventory = session.load_inventory()?;

    if layout.is_empty() {
        eprintln!("Warning: Layout is empty. Use 'racklock rack add' first.");
    }

    let rack_ids: Vec<String> = match rack {
        Some(name) => vec![layout.resolve_rack(&name)?],
        None => layout.racks().iter().map(|r| r.id.clone()).collect(),
    };

    info!("Evaluating {} rack(s) against {} stocked bin(s)", rack_ids.len(), inventory.len());
    let mut report = lock::lock_report(rack_ids.iter().map(String::as_str), layout.index(), &inventory);
    if locked_only {
        report.retain(|row| row.locked);
    }

    if session.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let locked = report.iter().filter(|r| r.locked).count();
    println!("Locked racks: {} of {}", locked, report.len());
    for row in &report {
        let name = layout.get_rack(&row.rack_id).map_or(row.rack_id.as_str(), |r| r.name.as_str());
        println!(
            "  {:<16} {:>6}  qty {:<8} stocked bins {}",
            name,
            session.lock_marker(row.locked),
            row.total_qty,
            row.stocked_bins
        );
    }

    Ok(())
}
