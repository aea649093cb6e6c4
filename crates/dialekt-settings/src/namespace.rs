//! Settings resolution
//!
//! A `SettingsNamespace` is created once per connection, bound to the
//! detected dialect and version. Resolution order for every key:
//!
//! 1. the highest version-banded section whose band <= the connection's
//!    version
//! 2. the dialect's base section
//! 3. the alias dialect's resolution chain, recursively
//! 4. the caller-supplied default
//!
//! Resolution never errors; absent keys fall through silently.

use crate::{DdlTemplate, PropertySpace};
use dialekt_core::{DialectId, VersionBand};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Alias chains in shipped settings are one or two hops; anything deeper
/// is a configuration mistake and gets cut off.
const MAX_ALIAS_DEPTH: usize = 4;

/// Per-connection, per-dialect settings view over a [`PropertySpace`].
#[derive(Debug)]
pub struct SettingsNamespace {
    space: Arc<PropertySpace>,
    dialect: DialectId,
    version: VersionBand,
    /// Highest qualifying band, discovered once at construction.
    band: Option<VersionBand>,
    alias: Option<Box<SettingsNamespace>>,
    /// Test-only overrides, consulted before anything else.
    local: BTreeMap<String, String>,
}

impl SettingsNamespace {
    pub fn new(space: Arc<PropertySpace>, dialect: DialectId, version: VersionBand) -> Self {
        Self::build(space, dialect, version, 0)
    }

    fn build(
        space: Arc<PropertySpace>,
        dialect: DialectId,
        version: VersionBand,
        depth: usize,
    ) -> Self {
        let band = space
            .bands_for(&dialect)
            .into_iter()
            .filter(|b| b.qualifies_for(version))
            .max();

        let alias = if depth < MAX_ALIAS_DEPTH {
            space
                .get(&format!("{}.alias", dialect.as_str()))
                .filter(|a| !a.is_empty() && *a != dialect.as_str())
                .map(|a| DialectId::new(a))
                .map(|alias_id| {
                    Box::new(Self::build(Arc::clone(&space), alias_id, version, depth + 1))
                })
        } else {
            tracing::warn!(dialect = %dialect, "alias chain too deep, cutting off");
            None
        };

        Self {
            space,
            dialect,
            version,
            band,
            alias,
            local: BTreeMap::new(),
        }
    }

    pub fn dialect(&self) -> &DialectId {
        &self.dialect
    }

    pub fn version(&self) -> VersionBand {
        self.version
    }

    /// The qualifying version band, if any settings section matched.
    pub fn active_band(&self) -> Option<VersionBand> {
        self.band
    }

    /// Resolve a key through the full precedence chain.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.local.get(key) {
            return Some(value);
        }
        if let Some(band) = self.band {
            let banded = format!("{}_{}.{}", self.dialect.as_str(), band.key_suffix(), key);
            if let Some(value) = self.space.get(&banded) {
                return Some(value);
            }
        }
        if let Some(value) = self.space.get(&format!("{}.{}", self.dialect.as_str(), key)) {
            return Some(value);
        }
        self.alias.as_ref().and_then(|alias| alias.resolve(key))
    }

    pub fn get_str(&self, key: &str, default: &str) -> String {
        self.resolve(key).unwrap_or(default).to_string()
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.resolve(key) {
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => true,
                "false" | "0" | "no" | "off" => false,
                other => {
                    tracing::warn!(key = %key, value = %other, "unparseable boolean setting, using default");
                    default
                }
            },
            None => default,
        }
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.resolve(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Comma-separated list value; absent keys yield an empty list.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.resolve(key)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Union of a list key across the whole chain: banded section, base
    /// section and every alias level all contribute, deduplicated in
    /// encounter order. Used where shadowing would be wrong, e.g. the
    /// reserved-word lists (a fork inherits its base's keywords and adds
    /// its own).
    pub fn get_list_union(&self, key: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push_all = |value: &str| {
            for item in value.split(',') {
                let item = item.trim();
                if !item.is_empty() && !out.iter().any(|existing| existing == item) {
                    out.push(item.to_string());
                }
            }
        };
        if let Some(value) = self.local.get(key) {
            push_all(value);
        }
        if let Some(band) = self.band {
            let banded = format!("{}_{}.{}", self.dialect.as_str(), band.key_suffix(), key);
            if let Some(value) = self.space.get(&banded) {
                push_all(value);
            }
        }
        if let Some(value) = self.space.get(&format!("{}.{}", self.dialect.as_str(), key)) {
            push_all(value);
        }
        if let Some(alias) = &self.alias {
            for item in alias.get_list_union(key) {
                if !out.contains(&item) {
                    out.push(item);
                }
            }
        }
        out
    }

    /// A DDL template configured under `key`, if any.
    pub fn template(&self, key: &str) -> Option<DdlTemplate> {
        self.resolve(key).map(DdlTemplate::new)
    }

    /// Test-only mutator: pin a key for this namespace instance,
    /// bypassing the property space. Not part of the public contract.
    #[doc(hidden)]
    pub fn set_local(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.local.insert(key.into(), value.into());
    }
}
