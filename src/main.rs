//! dim - dungeon inventory manager CLI

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dim::combat::{DiceExpression, RollMode};
use dim::inventory::export_report;
use dim::{Config, InventoryService, Item, DEFAULT_CONFIG_FILE};

/// Dungeon inventory manager
#[derive(Parser, Debug)]
#[command(name = "dim", version, about = "Track tabletop items and roll attacks")]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Inventory save file (overrides config)
    #[arg(short, long)]
    inventory: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every item
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Add an item
    Add {
        #[command(subcommand)]
        kind: AddKind,
    },
    /// Remove items by name (case-insensitive)
    Remove { name: String },
    /// Find items whose name contains a term
    Search { term: String },
    /// Attack with a weapon from the inventory
    Attack {
        /// Weapon name
        weapon: String,
        /// normal, advantage or disadvantage
        #[arg(short, long, default_value = "normal")]
        mode: RollMode,
        /// Added to the d20 roll
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        modifier: i32,
        /// Total needed to hit (defaults to the configured threshold)
        #[arg(short, long)]
        threshold: Option<i32>,
    },
    /// Roll a damage expression such as "2d6 + 3"
    Roll { expression: String },
    /// Write a readable listing of the inventory
    Export {
        /// Output file (defaults to the configured export path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum AddKind {
    /// A plain item
    Regular {
        name: String,
        description: String,
        price: f64,
        weight: f64,
    },
    /// A weapon with a damage expression
    Weapon {
        name: String,
        description: String,
        price: f64,
        weight: f64,
        damage: String,
    },
    /// Armor with an armor class
    Armor {
        name: String,
        description: String,
        price: f64,
        weight: f64,
        armor_class: u32,
    },
}

impl AddKind {
    fn build(self) -> Result<Item, dim::ItemError> {
        match self {
            AddKind::Regular {
                name,
                description,
                price,
                weight,
            } => Item::regular(&name, &description, price, weight),
            AddKind::Weapon {
                name,
                description,
                price,
                weight,
                damage,
            } => Item::weapon(&name, &description, price, weight, &damage),
            AddKind::Armor {
                name,
                description,
                price,
                weight,
                armor_class,
            } => Item::armor(&name, &description, price, weight, armor_class),
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Parse CLI arguments
    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    let inventory_path = args
        .inventory
        .unwrap_or_else(|| config.inventory_path.clone());

    let (mut inventory, diagnostics) = InventoryService::load(&inventory_path);
    for diagnostic in &diagnostics {
        warn!("{}: {}", inventory_path.display(), diagnostic);
    }

    match args.command {
        Command::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(inventory.items())?);
            } else if inventory.is_empty() {
                println!("Inventory is empty.");
            } else {
                for item in inventory.items() {
                    println!("{}", item);
                }
            }
        }
        Command::Add { kind } => {
            let item = kind.build().context("Item not created")?;
            inventory.add(item);
            inventory.save(&inventory_path)?;
        }
        Command::Remove { name } => {
            if inventory.remove(&name) == 0 {
                bail!("{} not found in inventory", name);
            }
            inventory.save(&inventory_path)?;
            println!("{} removed from inventory.", name);
        }
        Command::Search { term } => {
            let found = inventory.search(&term);
            if found.is_empty() {
                println!("No items found matching '{}'.", term);
            } else {
                for item in found {
                    println!("{}", item);
                }
            }
        }
        Command::Attack {
            weapon,
            mode,
            modifier,
            threshold,
        } => {
            let threshold = threshold.unwrap_or(config.default_threshold);
            let report =
                inventory.attack_with(&weapon, mode, modifier, threshold, &mut rand::rng())?;

            println!(
                "You rolled a {} on your d20 ({}), total {} against {}.",
                report.attack.roll, report.attack.mode, report.attack.total, threshold
            );
            match report.damage {
                Some(damage) => println!(
                    "You hit! Dealing {} damage with your {} ({}).",
                    damage, report.weapon, report.damage_expression
                ),
                None => println!("You missed!"),
            }
        }
        Command::Roll { expression } => {
            let expr: DiceExpression = expression.parse()?;
            let (dice, total) = expr.roll_detailed(&mut rand::rng());
            println!("{} -> {:?} = {}", expr, dice, total);
        }
        Command::Export { output } => {
            let path = output.unwrap_or_else(|| config.export_path.clone());
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            export_report(&mut writer, inventory.items(), chrono::Utc::now())?;
            println!("Items copied to: {}", path.display());
        }
    }

    Ok(())
}
