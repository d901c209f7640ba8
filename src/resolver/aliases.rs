use std::collections::BTreeMap;

use crate::persistence::load_json_or_default;

pub const ALIASES_FILE: &str = "aliases.json";

/// Common English names mapped to transliterated or alternate spellings.
const DEFAULT_ALIASES: &[(&str, &[&str])] = &[
    ("iliad", &["ilias", "illiad"]),
    ("odyssey", &["odyssea", "odysseia", "odyssy"]),
    ("anabasis", &["expedition of cyrus", "march up country"]),
    ("apology", &["apologia", "apology of socrates"]),
    ("republic", &["politeia", "respublica"]),
    ("symposium", &["symposion", "banquet"]),
    ("histories", &["historiae", "history", "historiai"]),
    ("medea", &["medeia"]),
    ("oedipus", &["oidipous", "oedipus rex", "oedipus tyrannus"]),
    ("homer", &["homerus", "homeros"]),
    ("plato", &["platon"]),
    ("herodotus", &["herodotos"]),
    ("thucydides", &["thoukydides"]),
    ("sophocles", &["sophokles"]),
];

/// Canonical key → spelling variants, all stored lowercase.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::from_map(
            DEFAULT_ALIASES
                .iter()
                .map(|(key, variants)| {
                    (key.to_string(), variants.iter().map(|v| v.to_string()).collect())
                })
                .collect(),
        )
    }
}

impl AliasTable {
    pub fn from_map(entries: BTreeMap<String, Vec<String>>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(key, variants)| {
                (key.to_lowercase(), variants.iter().map(|v| v.to_lowercase()).collect())
            })
            .collect();
        Self { entries }
    }

    pub fn empty() -> Self {
        Self { entries: BTreeMap::new() }
    }

    /// `aliases.json` in the data directory replaces the built-in table when present.
    pub fn load() -> Self {
        match load_json_or_default::<Option<BTreeMap<String, Vec<String>>>>(ALIASES_FILE) {
            Some(entries) => {
                log::debug!("Loaded {} aliases from {}", entries.len(), ALIASES_FILE);
                Self::from_map(entries)
            }
            None => Self::default(),
        }
    }

    /// Every spelling to search for when `query` names an alias (by key or
    /// by variant). Empty when the query is not an alias.
    pub fn needles(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        let mut needles = Vec::new();

        for (key, variants) in &self.entries {
            if *key == query || variants.iter().any(|v| *v == query) {
                needles.push(key.as_str());
                needles.extend(variants.iter().map(String::as_str));
            }
        }

        needles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_expands_to_key_and_siblings() {
        let table = AliasTable::default();
        assert_eq!(table.needles("Ilias"), vec!["iliad", "ilias", "illiad"]);
    }

    #[test]
    fn test_partial_variant_is_not_an_alias() {
        let table = AliasTable::default();
        assert!(table.needles("ilia").is_empty());
        assert!(table.needles("aeschylus tragedies").is_empty());
    }

    #[test]
    fn test_custom_table_is_lowercased() {
        let mut map = BTreeMap::new();
        map.insert("Clouds".to_string(), vec!["Nephelai".to_string()]);
        let table = AliasTable::from_map(map);
        assert_eq!(table.needles("nephelai"), vec!["clouds", "nephelai"]);
    }
}
