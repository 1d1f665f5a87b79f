//! Human-readable inventory export

use std::io::Write;

use chrono::{DateTime, Utc};

use crate::items::{Item, ItemKind};
use crate::store::StoreError;

/// Write a readable listing of `items`, one block per item
pub fn export_report(
    writer: &mut impl Write,
    items: &[Item],
    generated_at: DateTime<Utc>,
) -> Result<(), StoreError> {
    writeln!(writer, "Inventory export ({} items)", items.len())?;
    writeln!(writer, "Generated: {}", generated_at.to_rfc3339())?;
    writeln!(writer)?;

    for item in items {
        writeln!(writer, "--- {} ---", item.kind().label())?;
        writeln!(writer, "Name: {}", item.name())?;
        writeln!(writer, "Description: {}", item.description())?;
        writeln!(writer, "Price: {:.2}", item.price())?;
        writeln!(writer, "Weight: {}", item.weight())?;
        match item.kind() {
            ItemKind::Regular => {}
            ItemKind::Weapon { damage } => writeln!(writer, "Damage: {}", damage)?,
            ItemKind::Armor { armor_class } => writeln!(writer, "Armor Class: {}", armor_class)?,
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_export_report() {
        let items = vec![
            Item::weapon("Longsword", "A simple blade", 15.0, 3.0, "1d8 + 1").unwrap(),
            Item::armor("Chainmail", "Sturdy protection", 75.0, 20.0, 14).unwrap(),
        ];
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let mut out = Vec::new();
        export_report(&mut out, &items, at).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Inventory export (2 items)\n\
             Generated: 2024-05-01T12:00:00+00:00\n\
             \n\
             --- Weapon ---\n\
             Name: Longsword\n\
             Description: A simple blade\n\
             Price: 15.00\n\
             Weight: 3\n\
             Damage: 1d8 + 1\n\
             \n\
             --- Armor ---\n\
             Name: Chainmail\n\
             Description: Sturdy protection\n\
             Price: 75.00\n\
             Weight: 20\n\
             Armor Class: 14\n\
             \n"
        );
    }
}
