//! Save file helpers

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

use tracing::{info, warn};

use super::{load_inventory, save_inventory, Decoded, Diagnostic, StoreError};
use crate::items::Item;

/// Load the inventory saved at `path`.
///
/// A missing file is a normal first run and yields an empty inventory. Any
/// other open failure also yields an empty inventory, with a diagnostic.
pub fn load_inventory_file(path: &Path) -> Decoded<Vec<Item>> {
    match File::open(path) {
        Ok(file) => load_inventory(BufReader::new(file)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(
                "No inventory at {}, starting with an empty inventory",
                path.display()
            );
            Decoded::clean(Vec::new())
        }
        Err(e) => {
            warn!("Cannot open inventory {}: {}", path.display(), e);
            Decoded {
                value: Vec::new(),
                diagnostics: vec![Diagnostic::new(
                    0,
                    format!("cannot open {}: {}", path.display(), e),
                )],
            }
        }
    }
}

/// Write the inventory to `path`, replacing any previous save
pub fn save_inventory_file(path: &Path, items: &[Item]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    save_inventory(&mut writer, items)?;
    info!("Inventory saved to {}", path.display());
    Ok(())
}
