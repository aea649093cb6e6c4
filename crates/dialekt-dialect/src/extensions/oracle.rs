//! Oracle extensions.

use dialekt_core::ObjectDescriptor;
use dialekt_settings::SettingsNamespace;

use crate::registry::ObjectListCleaner;

/// Dropped objects linger in the recycle bin under generated `BIN$...`
/// names and show up in listings until purged. Nobody wants them.
pub struct RecycleBinCleaner;

impl ObjectListCleaner for RecycleBinCleaner {
    fn name(&self) -> &'static str {
        "oracle-recyclebin-cleaner"
    }

    fn clean(&self, _settings: &SettingsNamespace, objects: &mut Vec<ObjectDescriptor>) {
        let before = objects.len();
        objects.retain(|obj| !obj.name.starts_with("BIN$"));
        let removed = before - objects.len();
        if removed > 0 {
            tracing::debug!(removed, "dropped recycle-bin entries");
        }
    }
}
