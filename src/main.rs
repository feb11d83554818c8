// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Racklock CLI - keep stocked racks from being edited

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use racklock::commands::{self, bin::BinLocation, rack::RackArgs, stock::StockArgs, Session};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "racklock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "RACKLOCK_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Data directory override
    #[arg(long, env = "RACKLOCK_DATA_DIR", global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Inventory snapshot override (JSON, keyed by bin ID)
    #[arg(long, env = "RACKLOCK_INVENTORY", global = true)]
    inventory: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage racks
    Rack {
        /// Action: add, remove, rename, list, show
        action: String,

        /// Rack name or ID
        name: Option<String>,

        /// Zone or aisle
        #[arg(long)]
        zone: Option<String>,

        /// New display name (rename)
        #[arg(long = "to")]
        new_name: Option<String>,
    },

    /// Manage shelves within a rack
    Shelf {
        /// Action: add, remove, list
        action: String,

        /// Rack name or ID
        #[arg(long)]
        rack: Option<String>,

        /// Shelf level (add picks the next free level if omitted)
        #[arg(long)]
        level: Option<u32>,
    },

    /// Manage bins on a shelf
    Bin {
        /// Action: add, remove, list
        action: String,

        /// Bin code or ID
        code: Option<String>,

        /// Rack name or ID
        #[arg(long)]
        rack: Option<String>,

        /// Shelf level within the rack
        #[arg(long)]
        level: Option<u32>,

        /// Shelf ID (instead of --rack/--level)
        #[arg(long)]
        shelf: Option<String>,
    },

    /// Edit the local inventory snapshot
    Stock {
        /// Action: set, clear, list
        action: String,

        /// Bin code or ID
        bin: Option<String>,

        /// Stock-keeping unit
        #[arg(long)]
        sku: Option<String>,

        /// Quantity on hand
        #[arg(long)]
        qty: Option<f64>,

        /// Unit of measure
        #[arg(long)]
        unit: Option<String>,

        /// Quantity reserved for open orders
        #[arg(long)]
        reserved: Option<f64>,
    },

    /// Show which racks are locked by stock
    Locks {
        /// Only evaluate this rack
        #[arg(long)]
        rack: Option<String>,

        /// Only list locked racks
        #[arg(long)]
        locked_only: bool,
    },

    /// Export the layout to various formats
    Export {
        /// Output format (dot, json, toml)
        #[arg(short, long, default_value = "dot")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Get or set configuration
    Config {
        /// Action: get, set, list
        action: String,

        /// Configuration key
        key: Option<String>,

        /// Value to set
        value: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(racklock::config::default_path);
    let mut config = racklock::config::load(Some(&config_path))?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => "error",
        0 => config.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Command-line overrides
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(path) = cli.inventory {
        config.inventory_file = Some(path);
    }
    if cli.no_color {
        config.color = false;
    }

    let session = Session::new(config, cli.json);

    // Execute command
    match cli.command {
        Commands::Rack { action, name, zone, new_name } => {
            commands::rack::run(&session, &action, name, RackArgs { zone, new_name })
        }
        Commands::Shelf { action, rack, level } => {
            commands::shelf::run(&session, &action, rack, level)
        }
        Commands::Bin { action, code, rack, level, shelf } => {
            commands::bin::run(&session, &action, code, BinLocation { rack, level, shelf })
        }
        Commands::Stock { action, bin, sku, qty, unit, reserved } => {
            commands::stock::run(&session, &action, bin, StockArgs { sku, qty, unit, reserved })
        }
        Commands::Locks { rack, locked_only } => {
            commands::locks::run(&session, rack, locked_only)
        }
        Commands::Export { format, output } => {
            commands::export::run(&session, &format, output)
        }
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command())
        }
        Commands::Config { action, key, value } => {
            // Edits go to the file alone; reads show the env-layered view
            let mut cfg = if action == "set" {
                racklock::config::load_file(&config_path)?
            } else {
                racklock::config::load(Some(&config_path))?
            };
            commands::config::run(&mut cfg, &config_path, &action, key, value)
        }
    }
}
