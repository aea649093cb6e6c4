//! Flat property space backing the settings resolution layer
//!
//! Dialect behavior is configured declaratively: each top-level TOML
//! table is a dialect section (`[postgresql]`) or a version-banded
//! section (`[postgresql_9_1]`), and nested tables flatten into
//! dot-separated keys. List values are stored comma-separated, matching
//! the flat `<dialect>.<key>` form the resolution layer works with.

use dialekt_core::{DialectId, VersionBand};
use std::collections::BTreeMap;

/// A flat, read-only key/value space of dialect settings.
#[derive(Debug, Clone, Default)]
pub struct PropertySpace {
    entries: BTreeMap<String, String>,
}

impl PropertySpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document into the flat space.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let table: toml::Table = text.parse()?;
        let mut space = Self::new();
        flatten_into(&mut space.entries, "", &toml::Value::Table(table));
        Ok(space)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|v| v.as_str())
    }

    /// Overlay `other` on top of this space; later values win.
    pub fn merge(&mut self, other: PropertySpace) {
        self.entries.extend(other.entries);
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Version bands that have at least one override for `dialect`.
    ///
    /// Only exact `<dialect>_<major>_<minor>` sections count; a dialect
    /// whose own name embeds an underscore (`sql_server`) does not bleed
    /// into another dialect's bands.
    pub fn bands_for(&self, dialect: &DialectId) -> Vec<VersionBand> {
        let prefix = format!("{}_", dialect.as_str());
        let mut bands: Vec<VersionBand> = self
            .entries
            .keys()
            .filter_map(|key| {
                let section = key.split('.').next()?;
                let suffix = section.strip_prefix(&prefix)?;
                VersionBand::parse(suffix).filter(|b| b.key_suffix() == suffix)
            })
            .collect();
        bands.sort();
        bands.dedup();
        bands
    }
}

fn flatten_into(entries: &mut BTreeMap<String, String>, prefix: &str, value: &toml::Value) {
    match value {
        toml::Value::Table(table) => {
            for (key, nested) in table {
                let full = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(entries, &full, nested);
            }
        }
        toml::Value::Array(items) => {
            let joined = items
                .iter()
                .map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            entries.insert(prefix.to_string(), joined);
        }
        scalar => {
            entries.insert(prefix.to_string(), scalar_to_string(scalar));
        }
    }
}

fn scalar_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_sections_and_lists() {
        let space = PropertySpace::from_toml_str(
            r#"
            [postgresql]
            alias_of = ""
            supports_extensions = false

            [postgresql.ddl]
            pk.inline = false

            [postgresql_9_1]
            supports_extensions = true

            [oracle]
            reservedwords = ["LEVEL", "ROWNUM"]
            "#,
        )
        .unwrap();

        assert_eq!(space.get("postgresql.supports_extensions"), Some("false"));
        assert_eq!(space.get("postgresql.ddl.pk.inline"), Some("false"));
        assert_eq!(space.get("postgresql_9_1.supports_extensions"), Some("true"));
        assert_eq!(space.get("oracle.reservedwords"), Some("LEVEL,ROWNUM"));
        assert_eq!(space.get("missing.key"), None);
    }

    #[test]
    fn test_band_discovery() {
        let space = PropertySpace::from_toml_str(
            r#"
            [postgresql]
            a = 1
            [postgresql_8_3]
            a = 2
            [postgresql_9_1]
            a = 3
            [sql_server]
            b = 1
            [sql_server_11_0]
            b = 2
            "#,
        )
        .unwrap();

        assert_eq!(
            space.bands_for(&DialectId::POSTGRESQL),
            vec![VersionBand::new(8, 3), VersionBand::new(9, 1)]
        );
        assert_eq!(
            space.bands_for(&DialectId::SQL_SERVER),
            vec![VersionBand::new(11, 0)]
        );
        // "sql_server_11_0" must not look like a band of "sql".
        assert!(space.bands_for(&DialectId::from("sql")).is_empty());
    }

    #[test]
    fn test_merge_overlays() {
        let mut base = PropertySpace::from_toml_str("[h2]\nquote.never = false").unwrap();
        let overlay = PropertySpace::from_toml_str("[h2]\nquote.never = true").unwrap();
        base.merge(overlay);
        assert_eq!(base.get("h2.quote.never"), Some("true"));
    }
}
