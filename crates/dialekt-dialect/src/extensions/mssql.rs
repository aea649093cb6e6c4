//! SQL Server extensions.

use dialekt_core::ObjectDescriptor;
use dialekt_settings::SettingsNamespace;

use crate::registry::ObjectListCleaner;

/// Designer leftovers (`sysdiagrams`, `dtproperties`) register as user
/// tables but belong to the tooling, not the schema.
pub struct SystemObjectCleaner;

const NOISE_TABLES: &[&str] = &["sysdiagrams", "dtproperties"];

impl ObjectListCleaner for SystemObjectCleaner {
    fn name(&self) -> &'static str {
        "mssql-system-object-cleaner"
    }

    fn clean(&self, _settings: &SettingsNamespace, objects: &mut Vec<ObjectDescriptor>) {
        objects.retain(|obj| {
            !NOISE_TABLES
                .iter()
                .any(|noise| obj.name.eq_ignore_ascii_case(noise))
        });
    }
}
