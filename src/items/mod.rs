//! Inventory item model
//!
//! Items come in a closed set of variants:
//! - Regular items (name, description, price, weight)
//! - Weapons, which carry a damage dice expression
//! - Armor, which carries an armor class

mod item;

pub use item::{Item, ItemError, ItemKind, MAX_TEXT_LEN};
