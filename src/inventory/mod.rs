//! Inventory service
//!
//! Holds the in-memory item list and wires it to the store and the
//! combat rolls.

mod export;
mod service;

pub use export::export_report;
pub use service::{AttackReport, InventoryError, InventoryService};
