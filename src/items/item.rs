//! Item types and construction-time validation

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::combat::{DiceError, DiceExpression};

/// Maximum length of an item name or description, in characters
pub const MAX_TEXT_LEN: usize = 100;

/// Validation errors raised when building an item from fresh input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ItemError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{field} cannot exceed {max} characters (got {len})", max = MAX_TEXT_LEN)]
    TooLong { field: &'static str, len: usize },

    #[error("{0} cannot contain line breaks")]
    LineBreak(&'static str),

    #[error("{field} must be a non-negative number (got {value})")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("invalid damage expression: {0}")]
    Damage(#[from] DiceError),
}

/// Variant-specific item data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemKind {
    /// Plain item, nothing beyond the shared fields
    Regular,
    /// Weapon with its raw damage expression (e.g. "1d8 + 2")
    Weapon { damage: String },
    /// Armor with its armor class
    Armor { armor_class: u32 },
}

impl ItemKind {
    /// Type tag used by the save format
    pub fn tag(&self) -> &'static str {
        match self {
            ItemKind::Regular => "ITEM",
            ItemKind::Weapon { .. } => "WEAPON",
            ItemKind::Armor { .. } => "ARMOR",
        }
    }

    /// Human-readable variant name
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Regular => "Item",
            ItemKind::Weapon { .. } => "Weapon",
            ItemKind::Armor { .. } => "Armor",
        }
    }
}

/// An inventory item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    name: String,
    description: String,
    price: f64,
    weight: f64,
    #[serde(flatten)]
    kind: ItemKind,
}

impl Item {
    /// Create a regular item
    pub fn regular(name: &str, description: &str, price: f64, weight: f64) -> Result<Self, ItemError> {
        Self::validated(name, description, price, weight, ItemKind::Regular)
    }

    /// Create a weapon; the damage expression must parse
    pub fn weapon(
        name: &str,
        description: &str,
        price: f64,
        weight: f64,
        damage: &str,
    ) -> Result<Self, ItemError> {
        let damage = damage.trim();
        if damage.contains(['\n', '\r']) {
            return Err(ItemError::LineBreak("damage"));
        }
        DiceExpression::parse(damage)?;
        let damage = damage.to_string();
        Self::validated(name, description, price, weight, ItemKind::Weapon { damage })
    }

    /// Create a piece of armor
    pub fn armor(
        name: &str,
        description: &str,
        price: f64,
        weight: f64,
        armor_class: u32,
    ) -> Result<Self, ItemError> {
        Self::validated(name, description, price, weight, ItemKind::Armor { armor_class })
    }

    fn validated(
        name: &str,
        description: &str,
        price: f64,
        weight: f64,
        kind: ItemKind,
    ) -> Result<Self, ItemError> {
        let name = validate_text("name", name)?;
        let description = validate_text("description", description)?;
        validate_amount("price", price)?;
        validate_amount("weight", weight)?;

        Ok(Self {
            name,
            description,
            price,
            weight,
            kind,
        })
    }

    /// Assemble an item from already-recovered persisted fields.
    ///
    /// The store applies its own defaults before calling this, so no
    /// validation happens here.
    pub(crate) fn from_parts(
        name: String,
        description: String,
        price: f64,
        weight: f64,
        kind: ItemKind,
    ) -> Self {
        Self {
            name,
            description,
            price,
            weight,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    /// Damage expression, if this is a weapon
    pub fn damage(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Weapon { damage } => Some(damage),
            _ => None,
        }
    }

    /// Armor class, if this is armor
    pub fn armor_class(&self) -> Option<u32> {
        match self.kind {
            ItemKind::Armor { armor_class } => Some(armor_class),
            _ => None,
        }
    }

    pub fn is_weapon(&self) -> bool {
        matches!(self.kind, ItemKind::Weapon { .. })
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}, Description: {}, Price: {}, Weight: {}",
            self.kind.label(),
            self.name,
            self.description,
            self.price,
            self.weight
        )?;
        match &self.kind {
            ItemKind::Regular => Ok(()),
            ItemKind::Weapon { damage } => write!(f, ", Damage: {}", damage),
            ItemKind::Armor { armor_class } => write!(f, ", Armor Class: {}", armor_class),
        }
    }
}

fn validate_text(field: &'static str, value: &str) -> Result<String, ItemError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ItemError::Empty(field));
    }
    if value.contains(['\n', '\r']) {
        return Err(ItemError::LineBreak(field));
    }
    let len = value.chars().count();
    if len > MAX_TEXT_LEN {
        return Err(ItemError::TooLong { field, len });
    }
    Ok(value.to_string())
}

fn validate_amount(field: &'static str, value: f64) -> Result<(), ItemError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ItemError::InvalidAmount { field, value });
    }
    Ok(())
}
