//! COMMENT ON statement generation.

use dialekt_core::ColumnDescriptor;
use dialekt_dialect::QuoteHandler;
use dialekt_settings::{DdlTemplate, Placeholder, SettingsNamespace, TemplateValues};

const DEFAULT_TABLE_TEMPLATE: &str = "COMMENT ON TABLE %table_name% IS '%comment%';";
const DEFAULT_COLUMN_TEMPLATE: &str =
    "COMMENT ON COLUMN %table_name%.%column_name% IS '%comment%';";

fn escape(comment: &str) -> String {
    comment.replace('\'', "''")
}

/// Trailing comment statements: table comment first, then one per
/// commented column. Dialects with inline comment clauses get nothing
/// here, their comments were already emitted with the column lines.
pub fn comment_statements(
    table_name: &str,
    table_comment: Option<&str>,
    columns: &[ColumnDescriptor],
    settings: &SettingsNamespace,
    quoter: &QuoteHandler,
) -> Vec<String> {
    if settings.get_bool("ddl.comment.inline", false) {
        return Vec::new();
    }
    let mut statements = Vec::new();
    if let Some(comment) = table_comment {
        if !comment.trim().is_empty() {
            let template = settings
                .template("ddl.comment.table.template")
                .unwrap_or_else(|| DdlTemplate::new(DEFAULT_TABLE_TEMPLATE));
            let values = TemplateValues::new()
                .set(Placeholder::TableName, table_name)
                .set(Placeholder::Comment, escape(comment));
            statements.push(template.render(&values));
        }
    }
    let column_template = settings
        .template("ddl.comment.column.template")
        .unwrap_or_else(|| DdlTemplate::new(DEFAULT_COLUMN_TEMPLATE));
    for column in columns {
        let Some(comment) = &column.comment else {
            continue;
        };
        if comment.trim().is_empty() {
            continue;
        }
        let values = TemplateValues::new()
            .set(Placeholder::TableName, table_name)
            .set(Placeholder::ColumnName, quoter.quote_if_needed(&column.name))
            .set(Placeholder::Comment, escape(comment));
        statements.push(column_template.render(&values));
    }
    statements
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dialekt_core::{DialectId, VersionBand};
    use dialekt_settings::builtin_defaults;

    use super::*;

    fn setup(dialect: DialectId) -> (Arc<SettingsNamespace>, QuoteHandler) {
        let settings = Arc::new(SettingsNamespace::new(
            Arc::new(builtin_defaults()),
            dialect,
            VersionBand::new(99, 0),
        ));
        let quoter = QuoteHandler::from_settings(settings.clone(), "\"");
        (settings, quoter)
    }

    #[test]
    fn test_table_then_column_comments() {
        let (settings, quoter) = setup(DialectId::POSTGRESQL);
        let columns = vec![
            ColumnDescriptor::new("id", 1, "integer"),
            ColumnDescriptor::new("name", 2, "varchar").with_comment("customer's name"),
        ];
        let statements =
            comment_statements("customers", Some("All customers"), &columns, &settings, &quoter);
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[0],
            "COMMENT ON TABLE customers IS 'All customers';"
        );
        assert_eq!(
            statements[1],
            "COMMENT ON COLUMN customers.name IS 'customer''s name';"
        );
    }

    #[test]
    fn test_inline_dialect_emits_nothing() {
        let (settings, quoter) = setup(DialectId::MYSQL);
        let columns = vec![ColumnDescriptor::new("id", 1, "int").with_comment("key")];
        let statements = comment_statements("t", Some("x"), &columns, &settings, &quoter);
        assert!(statements.is_empty());
    }
}
