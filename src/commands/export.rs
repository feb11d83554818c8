// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Export command - exports the warehouse layout to various formats

use super::Session;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Graphviz DOT format, locked racks highlighted
    Dot,
    /// JSON format
    Json,
    /// TOML format
    Toml,
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dot" | "graphviz" => Ok(Self::Dot),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => anyhow::bail!("Unknown export format: {}. Supported: dot, json, toml", s),
        }
    }
}

impl ExportFormat {
    /// Get file extension for format
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

/// Run the export command
pub fn run(session: &Session, format: &str, output: Option<PathBuf>) -> Result<()> {
    info!("Exporting to {}", format);

    let export_format: ExportFormat = format.parse()?;
    let layout = session.load_layout()?;

    if layout.is_empty() {
        eprintln!("Warning: Layout is empty. Use 'racklock rack add' first.");
    }

    let content = match export_format {
        ExportFormat::Dot => {
            let inventory = session.load_inventory()?;
            layout.to_dot(&inventory)
        }
        ExportFormat::Json => layout.to_json()?,
        ExportFormat::Toml => layout.to_toml()?,
    };

    match output {
        Some(mut path) => {
            if path.extension().is_none() {
                path.set_extension(export_format.extension());
            }
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
