//! Line-oriented inventory codec
//!
//! Each item is written as a fixed-order record:
//! ```text
//! WEAPON
//! Longsword
//! A simple blade
//! 15.0
//! 3.0
//! 1d8 + 1
//! ---
//! ```
//! The first line is the type tag (`ITEM`, `WEAPON`, `ARMOR`), followed by
//! name, description, price and weight. Weapons add their damage expression
//! and armor adds its armor class. `---` closes every record.
//!
//! Decoding is lenient: bad fields fall back to defaults, unknown tags read
//! as plain items, and a truncated trailing record is dropped. Every
//! recovery is reported as a [`Diagnostic`].

use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

use super::{Decoded, Diagnostic, StoreError};
use crate::combat::DiceExpression;
use crate::items::{Item, ItemKind};

/// Line closing every record
pub const SEPARATOR: &str = "---";

/// Damage used when a weapon record has no usable expression
pub const DEFAULT_DAMAGE: &str = "1d6";

/// Armor class used when an armor record has no usable value
pub const DEFAULT_ARMOR_CLASS: u32 = 0;

/// Description used when a record's description line is blank
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// Record type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordTag {
    Item,
    Weapon,
    Armor,
}

impl RecordTag {
    /// Recognize a tag line (case-insensitive)
    fn parse(line: &str) -> Option<RecordTag> {
        let line = line.trim();
        if line.eq_ignore_ascii_case("ITEM") {
            Some(RecordTag::Item)
        } else if line.eq_ignore_ascii_case("WEAPON") {
            Some(RecordTag::Weapon)
        } else if line.eq_ignore_ascii_case("ARMOR") {
            Some(RecordTag::Armor)
        } else {
            None
        }
    }
}

/// Write items in record order
pub fn encode(writer: &mut impl Write, items: &[Item]) -> Result<(), StoreError> {
    for item in items {
        write_record(writer, item)?;
    }
    writer.flush()?;
    debug!("Encoded {} items", items.len());
    Ok(())
}

fn write_record(writer: &mut impl Write, item: &Item) -> io::Result<()> {
    writeln!(writer, "{}", item.kind().tag())?;
    writeln!(writer, "{}", item.name())?;
    writeln!(writer, "{}", item.description())?;
    writeln!(writer, "{}", format_amount(item.price()))?;
    writeln!(writer, "{}", format_amount(item.weight()))?;
    match item.kind() {
        ItemKind::Regular => {}
        ItemKind::Weapon { damage } => writeln!(writer, "{}", damage)?,
        ItemKind::Armor { armor_class } => writeln!(writer, "{}", armor_class)?,
    }
    writeln!(writer, "{}", SEPARATOR)
}

/// Shortest round-trip decimal, always with a `.`
fn format_amount(value: f64) -> String {
    let s = value.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

/// Read every complete record from the stream.
///
/// Never fails: the worst case is a prefix of the stored items plus
/// diagnostics describing what was skipped.
pub fn decode(reader: impl BufRead) -> Decoded<Vec<Item>> {
    let mut decoder = Decoder::new(reader);
    let mut items = Vec::new();

    while let Some(tag_line) = decoder.next_tag_line() {
        match decoder.read_record(&tag_line) {
            Record::Complete(item) => items.push(item),
            Record::Skipped => {}
            Record::Truncated => break,
        }
    }

    debug!(
        "Decoded {} items ({} diagnostics)",
        items.len(),
        decoder.diagnostics.len()
    );
    Decoded {
        value: items,
        diagnostics: decoder.diagnostics,
    }
}

enum Record {
    Complete(Item),
    /// Record consumed but not usable
    Skipped,
    /// Stream ended mid-record
    Truncated,
}

struct Decoder<R> {
    reader: R,
    line_no: usize,
    pending: Option<String>,
    eof: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<R: BufRead> Decoder<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            pending: None,
            eof: false,
            diagnostics: Vec::new(),
        }
    }

    /// Line most recently consumed; a pushed-back line is not consumed yet
    fn current_line(&self) -> usize {
        if self.pending.is_some() {
            self.line_no - 1
        } else {
            self.line_no
        }
    }

    fn warn(&mut self, message: String) {
        let line = self.current_line();
        warn!("Inventory line {}: {}", line, message);
        self.diagnostics.push(Diagnostic::new(line, message));
    }

    /// Next line without its terminator, or None at end of stream
    fn next_line(&mut self) -> Option<String> {
        if let Some(line) = self.pending.take() {
            return Some(line);
        }
        if self.eof {
            return None;
        }

        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                self.eof = true;
                None
            }
            Ok(_) => {
                self.line_no += 1;
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                Some(String::from_utf8_lossy(&buf).into_owned())
            }
            Err(e) => {
                self.eof = true;
                self.warn(format!("read failed, stopping: {}", e));
                None
            }
        }
    }

    fn push_back(&mut self, line: String) {
        self.pending = Some(line);
    }

    /// Next non-blank line, skipping stray separators
    fn next_tag_line(&mut self) -> Option<String> {
        loop {
            let line = self.next_line()?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed == SEPARATOR {
                self.warn("stray separator where a type tag was expected".to_string());
                continue;
            }
            return Some(line);
        }
    }

    fn required_line(&mut self, field: &str) -> Option<String> {
        let line = self.next_line();
        if line.is_none() {
            self.warn(format!("record truncated before {}, dropping it", field));
        }
        line
    }

    fn read_record(&mut self, tag_line: &str) -> Record {
        let tag = match RecordTag::parse(tag_line) {
            Some(tag) => tag,
            None => {
                self.warn(format!(
                    "unknown type tag '{}', reading it as ITEM",
                    tag_line.trim()
                ));
                RecordTag::Item
            }
        };

        let Some(name) = self.required_line("name") else {
            return Record::Truncated;
        };
        let Some(description) = self.required_line("description") else {
            return Record::Truncated;
        };
        let Some(price) = self.required_line("price") else {
            return Record::Truncated;
        };
        let Some(weight) = self.required_line("weight") else {
            return Record::Truncated;
        };

        let price = self.parse_amount("price", &price);
        let weight = self.parse_amount("weight", &weight);

        let kind = match tag {
            RecordTag::Item => ItemKind::Regular,
            RecordTag::Weapon => ItemKind::Weapon {
                damage: self.read_damage(),
            },
            RecordTag::Armor => ItemKind::Armor {
                armor_class: self.read_armor_class(),
            },
        };

        self.read_separator();

        let name = name.trim();
        if name.is_empty() {
            self.warn("record has a blank name, skipping it".to_string());
            return Record::Skipped;
        }

        let mut description = description.trim().to_string();
        if description.is_empty() {
            self.warn(format!(
                "'{}' has a blank description, using '{}'",
                name, DEFAULT_DESCRIPTION
            ));
            description = DEFAULT_DESCRIPTION.to_string();
        }

        Record::Complete(Item::from_parts(
            name.to_string(),
            description,
            price,
            weight,
            kind,
        ))
    }

    fn parse_amount(&mut self, field: &str, raw: &str) -> f64 {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => value,
            _ => {
                self.warn(format!("invalid {} '{}', using 0", field, raw.trim()));
                0.0
            }
        }
    }

    /// Variant-specific line, or None if it is missing.
    ///
    /// A separator or type tag in this position means the field was left
    /// out; the line is pushed back for the caller after us.
    fn variant_line(&mut self) -> Option<String> {
        let line = self.next_line()?;
        let trimmed = line.trim();
        if trimmed == SEPARATOR || RecordTag::parse(trimmed).is_some() {
            self.push_back(line);
            return None;
        }
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.to_string())
    }

    fn read_damage(&mut self) -> String {
        match self.variant_line() {
            Some(damage) => match DiceExpression::parse(&damage) {
                Ok(_) => damage,
                Err(e) => {
                    self.warn(format!(
                        "invalid weapon damage '{}' ({}), using {}",
                        damage, e, DEFAULT_DAMAGE
                    ));
                    DEFAULT_DAMAGE.to_string()
                }
            },
            None => {
                self.warn(format!("missing weapon damage, using {}", DEFAULT_DAMAGE));
                DEFAULT_DAMAGE.to_string()
            }
        }
    }

    fn read_armor_class(&mut self) -> u32 {
        match self.variant_line() {
            Some(raw) => match raw.parse::<u32>() {
                Ok(armor_class) => armor_class,
                Err(_) => {
                    self.warn(format!(
                        "invalid armor class '{}', using {}",
                        raw, DEFAULT_ARMOR_CLASS
                    ));
                    DEFAULT_ARMOR_CLASS
                }
            },
            None => {
                self.warn(format!("missing armor class, using {}", DEFAULT_ARMOR_CLASS));
                DEFAULT_ARMOR_CLASS
            }
        }
    }

    /// The separator is advisory: anything else is reported and decoding
    /// carries on.
    fn read_separator(&mut self) {
        let Some(line) = self.next_line() else {
            self.warn("last record has no separator".to_string());
            return;
        };

        let trimmed = line.trim();
        if trimmed == SEPARATOR {
            return;
        }
        if RecordTag::parse(trimmed).is_some() {
            self.push_back(line);
            self.warn("missing separator before next record".to_string());
            return;
        }
        self.warn(format!("expected '{}', found '{}'", SEPARATOR, trimmed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_str(text: &str) -> Decoded<Vec<Item>> {
        decode(text.as_bytes())
    }

    fn encode_to_string(items: &[Item]) -> String {
        let mut out = Vec::new();
        encode(&mut out, items).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn sample_items() -> Vec<Item> {
        vec![
            Item::weapon("Longsword", "A simple blade", 15.0, 3.0, "1d8 + 1").unwrap(),
            Item::armor("Chainmail", "Sturdy protection", 75.0, 20.0, 14).unwrap(),
            Item::regular("Torch", "Provides light", 0.5, 0.25).unwrap(),
        ]
    }

    #[test]
    fn test_encode_format() {
        let text = encode_to_string(&sample_items());
        assert_eq!(
            text,
            "WEAPON\nLongsword\nA simple blade\n15.0\n3.0\n1d8 + 1\n---\n\
             ARMOR\nChainmail\nSturdy protection\n75.0\n20.0\n14\n---\n\
             ITEM\nTorch\nProvides light\n0.5\n0.25\n---\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let items = vec![
            Item::weapon("Greataxe", "Two-handed", 30.0, 7.0, "1d12").unwrap(),
            Item::weapon("Flame Tongue", "Burns", 5000.125, 3.0, "2d6 + 2d6 + 3").unwrap(),
            Item::armor("Shield", "Wooden", 10.0, 6.0, 2).unwrap(),
            Item::armor("Robe", "Cloth", 1.0, 4.0, 0).unwrap(),
            Item::regular("Rations", "One day", 0.1, 2.0).unwrap(),
            Item::regular("Feather", "Light", 0.0, 1e-7).unwrap(),
            Item::regular("Ünïcödé", "Ōk ✓", 12.345, 0.3).unwrap(),
        ];

        let decoded = decode_str(&encode_to_string(&items));
        assert!(decoded.is_clean(), "{:?}", decoded.diagnostics);
        assert_eq!(decoded.value, items);
    }

    #[test]
    fn test_decode_sample_file() {
        let text = "WEAPON\nLongsword\nA simple blade\n15.00\n3.0\n1d8 + 1\n---\n\
                    ARMOR\nChainmail\nSturdy protection\n75.00\n20.0\n14\n---\n\
                    ITEM\nTorch\nProvides light\n0.50\n0.25\n---\n";
        let decoded = decode_str(text);
        assert!(decoded.is_clean());
        assert_eq!(decoded.value, sample_items());
    }

    #[test]
    fn test_empty_stream() {
        let decoded = decode_str("");
        assert!(decoded.value.is_empty());
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn test_tags_case_insensitive() {
        let decoded = decode_str("weapon\nDagger\nSmall\n2.0\n1.0\n1d4\n---\n");
        assert!(decoded.is_clean());
        assert_eq!(decoded.value[0].damage(), Some("1d4"));
    }

    #[test]
    fn test_unknown_tag_reads_as_item() {
        let decoded = decode_str("GIZMO\nWidget\nWhirs\n3.5\n1.0\n---\n");
        assert_eq!(decoded.value.len(), 1);
        let item = &decoded.value[0];
        assert_eq!(item.kind(), &ItemKind::Regular);
        assert_eq!(item.name(), "Widget");
        assert_eq!(item.description(), "Whirs");
        assert_eq!(item.price(), 3.5);
        assert_eq!(item.weight(), 1.0);
        assert_eq!(decoded.diagnostics.len(), 1);
        assert!(decoded.diagnostics[0].message.contains("GIZMO"));
    }

    #[test]
    fn test_truncated_record_dropped() {
        let text = "ITEM\nTorch\nProvides light\n0.5\n0.25\n---\n\
                    WEAPON\nDagger\nSmall\n2.0\n";
        let decoded = decode_str(text);
        assert_eq!(decoded.value.len(), 1);
        assert_eq!(decoded.value[0].name(), "Torch");
        assert_eq!(decoded.diagnostics.len(), 1);
        assert!(decoded.diagnostics[0].message.contains("weight"));
    }

    #[test]
    fn test_missing_separator_before_next_tag() {
        let text = "ITEM\nTorch\nProvides light\n0.5\n0.25\n\
                    ARMOR\nShield\nWooden\n10.0\n6.0\n2\n---\n";
        let decoded = decode_str(text);
        assert_eq!(decoded.value.len(), 2);
        assert_eq!(decoded.value[1].armor_class(), Some(2));
        assert_eq!(decoded.diagnostics.len(), 1);
        assert!(decoded.diagnostics[0].message.contains("separator"));
    }

    #[test]
    fn test_recovery_diagnostics_point_at_current_record() {
        let text = "ITEM\nTorch\nProvides light\n0.5\n0.25\n\
                    WEAPON\nClub\nHeavy\n0.1\n2.0\n---\n\
                    ARMOR\nHide\nSmelly\n10.0\n12.0\nITEM\nRope\nLong\n1.0\n1.0\n---\n";
        let decoded = decode_str(text);
        assert_eq!(decoded.value.len(), 4);

        let lines: Vec<_> = decoded
            .diagnostics
            .iter()
            .map(|d| (d.line, d.message.as_str()))
            .collect();
        assert_eq!(
            lines,
            vec![
                (5, "missing separator before next record"),
                (10, "missing weapon damage, using 1d6"),
                (16, "missing armor class, using 0"),
                (16, "missing separator before next record"),
            ]
        );
    }

    #[test]
    fn test_bad_separator_continues() {
        let text = "ITEM\nTorch\nProvides light\n0.5\n0.25\n===\n\
                    ITEM\nRope\nFifty feet\n1.0\n10.0\n---\n";
        let decoded = decode_str(text);
        assert_eq!(decoded.value.len(), 2);
        assert_eq!(decoded.diagnostics.len(), 1);
        assert!(decoded.diagnostics[0].message.contains("==="));
    }

    #[test]
    fn test_missing_final_separator() {
        let decoded = decode_str("ITEM\nTorch\nProvides light\n0.5\n0.25");
        assert_eq!(decoded.value.len(), 1);
        assert_eq!(decoded.diagnostics.len(), 1);
    }

    #[test]
    fn test_weapon_damage_defaults() {
        // Blank damage line
        let decoded = decode_str("WEAPON\nClub\nHeavy\n0.1\n2.0\n\n---\n");
        assert_eq!(decoded.value[0].damage(), Some(DEFAULT_DAMAGE));
        assert_eq!(decoded.diagnostics.len(), 1);

        // Damage line left out entirely
        let decoded = decode_str("WEAPON\nClub\nHeavy\n0.1\n2.0\n---\nITEM\nRope\nLong\n1.0\n1.0\n---\n");
        assert_eq!(decoded.value.len(), 2);
        assert_eq!(decoded.value[0].damage(), Some(DEFAULT_DAMAGE));
        assert_eq!(decoded.diagnostics.len(), 1);

        // Garbage damage
        let decoded = decode_str("WEAPON\nClub\nHeavy\n0.1\n2.0\nlots\n---\n");
        assert_eq!(decoded.value[0].damage(), Some(DEFAULT_DAMAGE));

        // Stream ends where damage should be
        let decoded = decode_str("WEAPON\nClub\nHeavy\n0.1\n2.0\n");
        assert_eq!(decoded.value[0].damage(), Some(DEFAULT_DAMAGE));
        assert_eq!(decoded.diagnostics.len(), 2);
    }

    #[test]
    fn test_armor_class_defaults() {
        let decoded = decode_str("ARMOR\nHide\nSmelly\n10.0\n12.0\nsturdy\n---\n");
        assert_eq!(decoded.value[0].armor_class(), Some(DEFAULT_ARMOR_CLASS));
        assert_eq!(decoded.diagnostics.len(), 1);

        let decoded = decode_str("ARMOR\nHide\nSmelly\n10.0\n12.0\n-3\n---\n");
        assert_eq!(decoded.value[0].armor_class(), Some(DEFAULT_ARMOR_CLASS));

        let decoded = decode_str("ARMOR\nHide\nSmelly\n10.0\n12.0\n---\n");
        assert_eq!(decoded.value[0].armor_class(), Some(DEFAULT_ARMOR_CLASS));
        assert_eq!(decoded.diagnostics.len(), 1);
    }

    #[test]
    fn test_bad_amounts_default_to_zero() {
        let decoded = decode_str("ITEM\nGem\nShiny\nlots\n-2\n---\n");
        let item = &decoded.value[0];
        assert_eq!(item.price(), 0.0);
        assert_eq!(item.weight(), 0.0);
        assert_eq!(decoded.diagnostics.len(), 2);
    }

    #[test]
    fn test_blank_name_skipped() {
        let text = "ITEM\n   \nNothing\n1.0\n1.0\n---\n\
                    ITEM\nRope\nFifty feet\n1.0\n10.0\n---\n";
        let decoded = decode_str(text);
        assert_eq!(decoded.value.len(), 1);
        assert_eq!(decoded.value[0].name(), "Rope");
        assert_eq!(decoded.diagnostics.len(), 1);
    }

    #[test]
    fn test_blank_description_defaulted() {
        let decoded = decode_str("ITEM\nRope\n\n1.0\n10.0\n---\n");
        assert_eq!(decoded.value[0].description(), DEFAULT_DESCRIPTION);
        assert_eq!(decoded.diagnostics.len(), 1);
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let text = "\r\nITEM\r\nTorch\r\nProvides light\r\n0.5\r\n0.25\r\n---\r\n\r\n\r\n";
        let decoded = decode_str(text);
        assert!(decoded.is_clean(), "{:?}", decoded.diagnostics);
        assert_eq!(decoded.value.len(), 1);
        assert_eq!(decoded.value[0].name(), "Torch");
    }

    #[test]
    fn test_stray_separator_skipped() {
        let text = "---\nITEM\nTorch\nProvides light\n0.5\n0.25\n---\n";
        let decoded = decode_str(text);
        assert_eq!(decoded.value.len(), 1);
        assert_eq!(decoded.diagnostics.len(), 1);
    }

    #[test]
    fn test_invalid_utf8_does_not_panic() {
        let bytes: &[u8] = b"ITEM\n\xff\xfeTorch\nLight\n0.5\n0.25\n---\n\xc3\x28\n";
        let decoded = decode(bytes);
        assert_eq!(decoded.value.len(), 1);
        assert!(decoded.value[0].name().ends_with("Torch"));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(15.0), "15.0");
        assert_eq!(format_amount(0.25), "0.25");
        assert_eq!(format_amount(12.5), "12.5");
        assert_eq!(format_amount(0.0), "0.0");
    }
}
