//! DuckDB extensions.

use async_trait::async_trait;

use dialekt_core::{
    ExecutionContext, ListingFilter, MetadataRow, ObjectDescriptor, ObjectKind, Result,
};
use dialekt_settings::SettingsNamespace;

use crate::registry::{DetailTable, ObjectListExtender};

const MACRO_SQL: &str = "SELECT schema_name, function_name, parameters \
     FROM duckdb_functions() WHERE function_type = 'macro'";

/// SQL macros are first-class objects in DuckDB but invisible to the
/// standard listing. Contributed here with their parameter list as a
/// detail sub-table.
pub struct MacroExtender;

#[async_trait]
impl ObjectListExtender for MacroExtender {
    fn name(&self) -> &'static str {
        "duckdb-macro-extender"
    }

    fn handles_kind(&self, kind: &ObjectKind) -> bool {
        *kind == ObjectKind::Macro
    }

    async fn extend(
        &self,
        ctx: &ExecutionContext,
        _settings: &SettingsNamespace,
        filter: &ListingFilter,
        objects: &mut Vec<ObjectDescriptor>,
    ) -> Result<()> {
        let rows = ctx.connection().query(MACRO_SQL).await?;
        for row in rows {
            let Some(name) = row.get(1) else { continue };
            if let Some(wanted) = &filter.schema {
                if row.get(0) != Some(wanted.as_str()) {
                    continue;
                }
            }
            let mut descriptor = ObjectDescriptor::new(name, ObjectKind::Macro);
            if let Some(schema) = row.get(0) {
                descriptor = descriptor.with_schema(schema);
            }
            if !objects.iter().any(|existing| existing.same_object(&descriptor)) {
                objects.push(descriptor);
            }
        }
        Ok(())
    }

    async fn detail_tables(
        &self,
        ctx: &ExecutionContext,
        _settings: &SettingsNamespace,
        object: &ObjectDescriptor,
    ) -> Result<Vec<DetailTable>> {
        let rows = ctx.connection().query(MACRO_SQL).await?;
        let parameters: Vec<MetadataRow> = rows
            .into_iter()
            .filter(|row| row.get(1) == Some(object.name.as_str()))
            .filter_map(|row| row.get(2).map(|p| MetadataRow::from_strs(&[p])))
            .collect();
        if parameters.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![DetailTable {
            name: "Parameters".to_string(),
            columns: vec!["parameter".to_string()],
            rows: parameters,
        }])
    }
}
