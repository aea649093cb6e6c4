//! The table-type vocabulary for a connection.
//!
//! Drivers report their native object types; settings add types the
//! driver forgets (`tabletypes.extra`), rename legacy labels
//! (`tabletypes.rename`, `FROM:TO` pairs) and suppress noise
//! (`tabletypes.ignore`). Index pseudo-types never belong in the
//! vocabulary, they are structural metadata rather than listable
//! objects.

use std::collections::HashSet;

use dialekt_settings::SettingsNamespace;

const ALWAYS_IGNORED: &[&str] = &["INDEX", "SYSTEM INDEX", "SEQUENCE INDEX"];

/// Merge the driver-reported types with the settings-driven vocabulary.
/// Output is upper-cased, deduplicated and keeps encounter order.
pub fn build_vocabulary(native: Vec<String>, settings: &SettingsNamespace) -> Vec<String> {
    let mut ignored: HashSet<String> = ALWAYS_IGNORED.iter().map(|t| t.to_string()).collect();
    for entry in settings.get_list("tabletypes.ignore") {
        ignored.insert(entry.to_uppercase());
    }

    let renames: Vec<(String, String)> = settings
        .get_list("tabletypes.rename")
        .into_iter()
        .filter_map(|pair| {
            let (from, to) = pair.split_once(':')?;
            Some((from.trim().to_uppercase(), to.trim().to_uppercase()))
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<String> = Vec::new();
    let extra = settings.get_list("tabletypes.extra");
    for raw in native.into_iter().chain(extra) {
        let mut label = raw.trim().to_uppercase();
        if label.is_empty() {
            continue;
        }
        if let Some((_, to)) = renames.iter().find(|(from, _)| *from == label) {
            label = to.clone();
        }
        if ignored.contains(&label) {
            continue;
        }
        if seen.insert(label.clone()) {
            out.push(label);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dialekt_core::{DialectId, VersionBand};
    use dialekt_settings::{PropertySpace, builtin_defaults};

    use super::*;

    fn namespace(dialect: DialectId) -> SettingsNamespace {
        SettingsNamespace::new(
            Arc::new(builtin_defaults()),
            dialect,
            VersionBand::new(99, 0),
        )
    }

    #[test]
    fn test_uppercases_and_dedupes() {
        let settings = namespace(DialectId::POSTGRESQL);
        let vocab = build_vocabulary(
            vec!["table".to_string(), "TABLE".to_string(), "View".to_string()],
            &settings,
        );
        assert_eq!(vocab, vec!["TABLE".to_string(), "VIEW".to_string()]);
    }

    #[test]
    fn test_index_pseudo_types_dropped() {
        let settings = namespace(DialectId::POSTGRESQL);
        let vocab = build_vocabulary(
            vec!["TABLE".to_string(), "INDEX".to_string(), "SYSTEM INDEX".to_string()],
            &settings,
        );
        assert_eq!(vocab, vec!["TABLE".to_string()]);
    }

    #[test]
    fn test_settings_extend_ignore_and_rename() {
        let mut space = PropertySpace::new();
        space.insert("testdb.tabletypes.extra", "MATERIALIZED VIEW");
        space.insert("testdb.tabletypes.ignore", "SYSTEM TOAST TABLE");
        space.insert("testdb.tabletypes.rename", "BASE TABLE:TABLE");
        let settings = SettingsNamespace::new(
            Arc::new(space),
            DialectId::new("testdb"),
            VersionBand::new(1, 0),
        );
        let vocab = build_vocabulary(
            vec![
                "BASE TABLE".to_string(),
                "SYSTEM TOAST TABLE".to_string(),
                "VIEW".to_string(),
            ],
            &settings,
        );
        assert_eq!(
            vocab,
            vec![
                "TABLE".to_string(),
                "VIEW".to_string(),
                "MATERIALIZED VIEW".to_string(),
            ]
        );
    }
}
