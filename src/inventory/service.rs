//! In-memory inventory with persistence and attack helpers

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::combat::{roll_attack, roll_damage, AttackRoll, RandomSource, RollMode};
use crate::items::Item;
use crate::store::{self, Diagnostic, StoreError};

/// Inventory errors
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("no weapon named '{0}' in inventory")]
    WeaponNotFound(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of attacking with a weapon
#[derive(Debug, Clone, Serialize)]
pub struct AttackReport {
    /// Weapon used
    pub weapon: String,
    /// Damage expression rolled on a hit
    pub damage_expression: String,
    pub attack: AttackRoll,
    /// Damage dealt, present only on a hit
    pub damage: Option<u64>,
}

/// Ordered collection of items
#[derive(Debug, Clone, Default)]
pub struct InventoryService {
    items: Vec<Item>,
}

impl InventoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Load from a save file; problems are returned, not raised
    pub fn load(path: &Path) -> (Self, Vec<Diagnostic>) {
        let (items, diagnostics) = store::load_inventory_file(path).into_parts();
        (Self { items }, diagnostics)
    }

    /// Save to a file
    pub fn save(&self, path: &Path) -> Result<(), InventoryError> {
        store::save_inventory_file(path, &self.items)?;
        Ok(())
    }

    pub fn add(&mut self, item: Item) {
        info!("{} added to inventory", item.name());
        self.items.push(item);
    }

    /// Remove every item with this name (case-insensitive); returns how many
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !same_name(item.name(), name));
        let removed = before - self.items.len();

        if removed > 0 {
            info!("{} removed from inventory", name);
        } else {
            debug!("{} not found in inventory", name);
        }
        removed
    }

    /// Items whose name contains `term` (case-insensitive)
    pub fn search(&self, term: &str) -> Vec<&Item> {
        let term = term.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| item.name().to_lowercase().contains(&term))
            .collect()
    }

    pub fn weapons(&self) -> Vec<&Item> {
        self.items.iter().filter(|item| item.is_weapon()).collect()
    }

    /// First weapon with this name (case-insensitive)
    pub fn find_weapon(&self, name: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|item| item.is_weapon() && same_name(item.name(), name))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Attack with a named weapon, rolling damage on a hit
    pub fn attack_with(
        &self,
        weapon: &str,
        mode: RollMode,
        modifier: i32,
        threshold: i32,
        rng: &mut impl RandomSource,
    ) -> Result<AttackReport, InventoryError> {
        let item = self
            .find_weapon(weapon)
            .ok_or_else(|| InventoryError::WeaponNotFound(weapon.to_string()))?;
        let damage_expression = item.damage().unwrap_or_default().to_string();

        let attack = roll_attack(mode, modifier, threshold, rng);
        let damage = attack
            .is_hit()
            .then(|| roll_damage(&damage_expression, rng));

        debug!(
            "Attack with {}: rolled {} ({}), total {} vs {}",
            item.name(),
            attack.roll,
            attack.mode,
            attack.total,
            attack.threshold
        );

        Ok(AttackReport {
            weapon: item.name().to_string(),
            damage_expression,
            attack,
            damage,
        })
    }
}

/// Case-insensitive name equality (Unicode lowercase)
fn same_name(name: &str, query: &str) -> bool {
    name.to_lowercase() == query.trim().to_lowercase()
}
