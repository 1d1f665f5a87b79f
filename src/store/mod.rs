//! Inventory persistence
//!
//! Items are saved in a line-oriented text format (see [`codec`]):
//! - Explicit type tag per record, so variants survive a round trip
//! - Lenient decoding with diagnostics instead of hard failures
//! - Missing save files read as an empty inventory

pub mod codec;
mod file;

use std::fmt;
use std::io::{BufRead, Write};

use thiserror::Error;
use tracing::info;

use crate::items::Item;

pub use codec::{decode, encode, DEFAULT_ARMOR_CLASS, DEFAULT_DAMAGE, SEPARATOR};
pub use file::{load_inventory_file, save_inventory_file};

/// Errors writing an inventory
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A recoverable problem found while loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number (0 when not tied to a line)
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.message)
        } else {
            write!(f, "line {}: {}", self.line, self.message)
        }
    }
}

/// A recovered value plus the diagnostics raised while recovering it
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Decoded<T> {
    /// A value recovered without any problems
    pub fn clean(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.value, self.diagnostics)
    }
}

/// Load an inventory from a stream
pub fn load_inventory(reader: impl BufRead) -> Decoded<Vec<Item>> {
    let decoded = decode(reader);
    info!(
        "Loaded {} items ({} warnings)",
        decoded.value.len(),
        decoded.diagnostics.len()
    );
    decoded
}

/// Save an inventory to a stream
pub fn save_inventory(writer: &mut impl Write, items: &[Item]) -> Result<(), StoreError> {
    encode(writer, items)?;
    info!("Saved {} items", items.len());
    Ok(())
}
