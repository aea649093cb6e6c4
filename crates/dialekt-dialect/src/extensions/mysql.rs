//! MySQL / MariaDB extensions.

use async_trait::async_trait;

use dialekt_core::{ColumnDescriptor, ExecutionContext, ObjectDescriptor, Result};
use dialekt_settings::SettingsNamespace;

use crate::registry::ColumnFixup;

/// Some drivers flatten `enum('a','b')` and `set('x','y')` column types
/// to a bare `enum` / `set`. The literal list is part of the type, so
/// this fixup restores it from `SHOW COLUMNS`.
pub struct EnumColumnFixup;

impl EnumColumnFixup {
    fn full_name(object: &ObjectDescriptor) -> String {
        match &object.schema {
            Some(schema) => format!("`{}`.`{}`", schema, object.name),
            None => format!("`{}`", object.name),
        }
    }
}

#[async_trait]
impl ColumnFixup for EnumColumnFixup {
    fn name(&self) -> &'static str {
        "mysql-enum-column-fixup"
    }

    async fn fix(
        &self,
        ctx: &ExecutionContext,
        _settings: &SettingsNamespace,
        object: &ObjectDescriptor,
        columns: &mut Vec<ColumnDescriptor>,
    ) -> Result<()> {
        let needs_lookup: Vec<String> = columns
            .iter()
            .filter(|col| {
                let lower = col.native_type.to_lowercase();
                lower == "enum" || lower == "set"
            })
            .map(|col| col.name.clone())
            .collect();
        if needs_lookup.is_empty() {
            return Ok(());
        }
        // Field, Type, Null, Key, Default, Extra
        let sql = format!("SHOW COLUMNS FROM {}", Self::full_name(object));
        let rows = ctx.connection().query(&sql).await?;
        for row in rows {
            let (Some(field), Some(full_type)) = (row.get(0), row.get(1)) else {
                continue;
            };
            if !needs_lookup.iter().any(|name| name == field) {
                continue;
            }
            if let Some(col) = columns.iter_mut().find(|col| col.name == field) {
                tracing::debug!(column = %col.name, declared = %full_type, "restoring literal list");
                col.native_type = full_type.to_string();
            }
        }
        Ok(())
    }
}
