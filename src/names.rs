//! Mapping from raw actor kinds to ship descriptors.
//!
//! The external process labels each actor with an internal type string. A
//! [`NameTable`] turns that label into a display name, a [`ShipClass`] and a
//! [`ShipVariant`]. Class and variant are resolved once when the table is
//! built, so per-frame code never inspects display-name text.

use std::fs;
use std::path::Path;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Physical ship class, which selects the icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipClass {
    /// Small ship.
    Sloop,
    /// Medium ship.
    Brigantine,
    /// Large ship.
    Galleon,
}

impl ShipClass {
    /// Infers the class from a display name.
    ///
    /// "Galleon" wins over "Brig"; anything else is a sloop.
    ///
    /// # Examples
    /// ```
    /// use ship_overlay::names::ShipClass;
    /// assert_eq!(ShipClass::infer("Galleon (Near)"), ShipClass::Galleon);
    /// assert_eq!(ShipClass::infer("Brigantine (Far)"), ShipClass::Brigantine);
    /// assert_eq!(ShipClass::infer("Rowboat"), ShipClass::Sloop);
    /// ```
    #[must_use]
    pub fn infer(display_name: &str) -> Self {
        if display_name.contains("Galleon") {
            Self::Galleon
        } else if display_name.contains("Brig") {
            Self::Brigantine
        } else {
            Self::Sloop
        }
    }
}

/// Which of a ship's two in-memory actors a record mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipVariant {
    /// Full-detail actor used close to the viewer.
    Near,
    /// Proxy actor used beyond the hand-over distance.
    Far,
}

impl ShipVariant {
    /// Infers the variant from a display name containing "Near".
    #[must_use]
    pub fn infer(display_name: &str) -> Self {
        if display_name.contains("Near") {
            Self::Near
        } else {
            Self::Far
        }
    }

    /// Whether this variant should be drawn at `distance`.
    ///
    /// The near actor shows strictly inside `threshold`, the far actor at or
    /// beyond it, so at most one of a pair is ever visible. A ship exactly
    /// at `threshold` is drawn by its far actor only.
    ///
    /// # Examples
    /// ```
    /// use ship_overlay::names::ShipVariant;
    /// assert!(ShipVariant::Near.is_shown_at(1749.0, 1750.0));
    /// assert!(!ShipVariant::Far.is_shown_at(1749.0, 1750.0));
    /// assert!(ShipVariant::Far.is_shown_at(1750.0, 1750.0));
    /// assert!(!ShipVariant::Near.is_shown_at(1750.0, 1750.0));
    /// ```
    #[must_use]
    pub fn is_shown_at(self, distance: f32, threshold: f32) -> bool {
        match self {
            Self::Near => distance < threshold,
            Self::Far => distance >= threshold,
        }
    }
}

/// Everything the overlay needs to know about a raw actor kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShipDescriptor {
    /// Human-readable name shown in the label.
    pub display_name: String,
    /// Icon class.
    pub class: ShipClass,
    /// Near or far actor.
    pub variant: ShipVariant,
}

impl ShipDescriptor {
    /// Builds a descriptor, inferring class and variant from the name.
    #[must_use]
    pub fn from_display_name(name: impl Into<String>) -> Self {
        let display_name = name.into();
        let class = ShipClass::infer(&display_name);
        let variant = ShipVariant::infer(&display_name);
        Self {
            display_name,
            class,
            variant,
        }
    }
}

/// Lookup from raw actor kind to descriptor.
pub trait ShipNames {
    /// Returns the descriptor for `raw_kind`, if it names a ship.
    fn lookup(&self, raw_kind: &str) -> Option<ShipDescriptor>;
}

#[derive(Deserialize)]
struct TableEntry {
    name: String,
    class: Option<ShipClass>,
    variant: Option<ShipVariant>,
}

impl From<TableEntry> for ShipDescriptor {
    fn from(entry: TableEntry) -> Self {
        let inferred = Self::from_display_name(entry.name);
        Self {
            class: entry.class.unwrap_or(inferred.class),
            variant: entry.variant.unwrap_or(inferred.variant),
            ..inferred
        }
    }
}

const BUILTIN_SHIPS: [(&str, &str); 6] = [
    ("BP_SmallShipTemplate_C", "Sloop (Near)"),
    ("BP_SmallShipNetProxy", "Sloop"),
    ("BP_MediumShipTemplate_C", "Brig (Near)"),
    ("BP_MediumShipNetProxy", "Brig"),
    ("BP_LargeShipTemplate_C", "Galleon (Near)"),
    ("BP_LargeShipNetProxy", "Galleon"),
];

/// Static name table, loaded once at start-up.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    entries: HashMap<String, ShipDescriptor>,
}

impl NameTable {
    /// Table of the player ship actors known out of the box.
    #[must_use]
    pub fn builtin() -> Self {
        BUILTIN_SHIPS
            .iter()
            .map(|&(raw, name)| (raw.to_owned(), ShipDescriptor::from_display_name(name)))
            .collect()
    }

    /// Parses a JSON object of `raw_kind -> { "name", "class"?, "variant"? }`.
    ///
    /// Missing `class` or `variant` fields are inferred from `name`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Json`] when the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: HashMap<String, TableEntry> = serde_json::from_str(json)?;
        Ok(raw
            .into_iter()
            .map(|(kind, entry)| (kind, ShipDescriptor::from(entry)))
            .collect())
    }

    /// Reads and parses a name table file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Json`] when it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let json = fs::read_to_string(path_ref).map_err(|e| ConfigError::io(path_ref, e))?;
        Self::from_json_str(&json)
    }

    /// Number of known kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ShipDescriptor)> for NameTable {
    fn from_iter<I: IntoIterator<Item = (String, ShipDescriptor)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl ShipNames for NameTable {
    fn lookup(&self, raw_kind: &str) -> Option<ShipDescriptor> {
        self.entries.get(raw_kind).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("BP_SmallShipTemplate_C", ShipClass::Sloop, ShipVariant::Near)]
    #[case("BP_MediumShipNetProxy", ShipClass::Brigantine, ShipVariant::Far)]
    #[case("BP_LargeShipTemplate_C", ShipClass::Galleon, ShipVariant::Near)]
    #[case("BP_LargeShipNetProxy", ShipClass::Galleon, ShipVariant::Far)]
    fn builtin_table_classifies_ships(
        #[case] raw: &str,
        #[case] class: ShipClass,
        #[case] variant: ShipVariant,
    ) {
        let descriptor = NameTable::builtin()
            .lookup(raw)
            .expect("builtin kind should resolve");
        assert_eq!(descriptor.class, class);
        assert_eq!(descriptor.variant, variant);
    }

    #[test]
    fn unknown_kind_is_absent() {
        assert_eq!(NameTable::builtin().lookup("BP_Rowboat_C"), None);
    }

    #[test]
    fn builtin_table_covers_all_six_actors() {
        let table = NameTable::builtin();
        assert_eq!(table.len(), 6);
        assert!(!table.is_empty());
        assert!(NameTable::default().is_empty());
    }

    #[test]
    fn explicit_fields_override_inference() {
        let table = NameTable::from_json_str(
            r#"{
                "BP_Odd_C": { "name": "Galleon lookalike (Near)", "class": "sloop", "variant": "far" },
                "BP_Plain_C": { "name": "Brig (Near)" }
            }"#,
        )
        .expect("table should parse");

        let odd = table.lookup("BP_Odd_C").expect("odd kind present");
        assert_eq!(odd.class, ShipClass::Sloop);
        assert_eq!(odd.variant, ShipVariant::Far);
        assert_eq!(odd.display_name, "Galleon lookalike (Near)");

        let plain = table.lookup("BP_Plain_C").expect("plain kind present");
        assert_eq!(plain.class, ShipClass::Brigantine);
        assert_eq!(plain.variant, ShipVariant::Near);
    }

    #[rstest]
    #[case(1749.999, true, false)]
    #[case(1750.0, false, true)]
    #[case(1750.001, false, true)]
    #[case(0.0, true, false)]
    fn at_most_one_variant_shows(#[case] distance: f32, #[case] near: bool, #[case] far: bool) {
        assert_eq!(ShipVariant::Near.is_shown_at(distance, 1750.0), near);
        assert_eq!(ShipVariant::Far.is_shown_at(distance, 1750.0), far);
    }
}
