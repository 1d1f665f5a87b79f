//! dim - dungeon inventory manager
//!
//! Tracks tabletop-game items (regular items, weapons, armor), persists them
//! in a tagged line-oriented text format, and resolves d20 attack rolls and
//! weapon damage dice.

pub mod combat;
pub mod inventory;
pub mod items;
pub mod store;

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub use combat::{AttackOutcome, AttackRoll, DiceExpression, RandomSource, RollMode};
pub use inventory::{AttackReport, InventoryError, InventoryService};
pub use items::{Item, ItemError, ItemKind};
pub use store::{Decoded, Diagnostic, StoreError};

/// Config file read when no other path is given
pub const DEFAULT_CONFIG_FILE: &str = "dim.toml";

/// Environment variable prefix for config overrides (e.g. `DIM_INVENTORY_PATH`)
pub const ENV_PREFIX: &str = "DIM_";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Save file for the inventory
    pub inventory_path: PathBuf,
    /// Destination of the human-readable export
    pub export_path: PathBuf,
    /// Attack threshold used when none is given
    pub default_threshold: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inventory_path: PathBuf::from("inventory.txt"),
            export_path: PathBuf::from("items.txt"),
            default_threshold: 5,
        }
    }
}

impl Config {
    /// Defaults, then `file` (if it exists), then `DIM_*` environment variables
    pub fn load(file: &Path) -> Result<Self, figment::Error> {
        Self::figment(file).extract()
    }

    /// The layered provider stack behind [`Config::load`]
    pub fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load(Path::new("missing.toml"))?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                "inventory_path = \"saves/party.txt\"\ndefault_threshold = 12\n",
            )?;

            let config = Config::load(Path::new(DEFAULT_CONFIG_FILE))?;
            assert_eq!(config.inventory_path, PathBuf::from("saves/party.txt"));
            assert_eq!(config.default_threshold, 12);
            assert_eq!(config.export_path, PathBuf::from("items.txt"));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "default_threshold = 12\n")?;
            jail.set_env("DIM_DEFAULT_THRESHOLD", 15);
            jail.set_env("DIM_EXPORT_PATH", "out/report.txt");

            let config: Config = Config::figment(Path::new(DEFAULT_CONFIG_FILE)).extract()?;
            assert_eq!(config.default_threshold, 15);
            assert_eq!(config.export_path, PathBuf::from("out/report.txt"));
            assert_eq!(config.inventory_path, PathBuf::from("inventory.txt"));
            Ok(())
        });
    }

    #[test]
    fn test_bad_type_is_error() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "default_threshold = \"high\"\n")?;
            assert!(Config::load(Path::new(DEFAULT_CONFIG_FILE)).is_err());
            Ok(())
        });
    }
}
