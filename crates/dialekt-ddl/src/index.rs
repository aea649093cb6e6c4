//! CREATE INDEX generation.

use dialekt_core::{ForeignKeyEdge, IndexDescriptor};
use dialekt_dialect::QuoteHandler;
use dialekt_settings::{DdlTemplate, Placeholder, SettingsNamespace, TemplateValues};

const DEFAULT_INDEX_TEMPLATE: &str =
    "CREATE %unique%INDEX %index_name% ON %table_name% (%column_list%)%expression%;";

fn statement(
    table_name: &str,
    index: &IndexDescriptor,
    settings: &SettingsNamespace,
    quoter: &QuoteHandler,
) -> Option<String> {
    let column_list = if let Some(expr) = &index.functional_expression {
        expr.clone()
    } else if index.columns.is_empty() {
        tracing::debug!(index = %index.name, "index without columns or expression, skipping");
        return None;
    } else {
        index
            .columns
            .iter()
            .map(|c| quoter.quote_if_needed(c))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let values = TemplateValues::new()
        .set(Placeholder::TableName, table_name)
        .set(Placeholder::IndexName, quoter.quote_if_needed(&index.name))
        .set(Placeholder::ColumnList, column_list)
        .set_opt(
            Placeholder::Unique,
            index.unique.then(|| "UNIQUE ".to_string()),
        )
        .set_opt(
            Placeholder::Expression,
            index
                .filter_expression
                .as_ref()
                .map(|filter| format!(" WHERE {filter}")),
        );
    let template = settings
        .template("ddl.index.template")
        .unwrap_or_else(|| DdlTemplate::new(DEFAULT_INDEX_TEMPLATE));
    Some(template.render(&values))
}

/// All CREATE INDEX statements for a table. Indexes backing a
/// constraint are skipped, and so are single-column FK indexes when the
/// dialect creates those automatically.
pub fn index_statements(
    table_name: &str,
    indexes: &[IndexDescriptor],
    foreign_keys: &[ForeignKeyEdge],
    settings: &SettingsNamespace,
    quoter: &QuoteHandler,
) -> Vec<String> {
    let auto_fk_index = settings.get_bool("ddl.fk.auto_index", false);
    indexes
        .iter()
        .filter(|index| !index.constraint_backed)
        .filter(|index| {
            if !auto_fk_index {
                return true;
            }
            let implied = foreign_keys
                .iter()
                .any(|edge| edge.source_columns() == index.columns.iter().map(String::as_str).collect::<Vec<_>>());
            if implied {
                tracing::debug!(index = %index.name, "index implied by foreign key, skipping");
            }
            !implied
        })
        .filter_map(|index| statement(table_name, index, settings, quoter))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dialekt_core::{DialectId, ObjectDescriptor, ObjectKind, VersionBand};
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
    fn test_plain_and_unique_indexes() {
        let (settings, quoter) = setup(DialectId::POSTGRESQL);
        let indexes = vec![
            IndexDescriptor::new("idx_orders_date", vec!["order_date".to_string()]),
            IndexDescriptor::new("uq_orders_ref", vec!["reference".to_string()]).unique(),
        ];
        let statements = index_statements("orders", &indexes, &[], &settings, &quoter);
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[0],
            "CREATE INDEX idx_orders_date ON orders (order_date);"
        );
        assert!(statements[1].starts_with("CREATE UNIQUE INDEX uq_orders_ref"));
    }

    #[test]
    fn test_constraint_backed_suppressed() {
        let (settings, quoter) = setup(DialectId::POSTGRESQL);
        let mut backed = IndexDescriptor::new("orders_pkey", vec!["id".to_string()]);
        backed.constraint_backed = true;
        let statements = index_statements("orders", &[backed], &[], &settings, &quoter);
        assert!(statements.is_empty());
    }

    #[test]
    fn test_fk_implied_index_suppressed_for_mysql() {
        let (settings, quoter) = setup(DialectId::MYSQL);
        let indexes = vec![IndexDescriptor::new(
            "customer_id_idx",
            vec!["customer_id".to_string()],
        )];
        let fks = vec![ForeignKeyEdge {
            name: None,
            source: ObjectDescriptor::new("orders", ObjectKind::Table),
            target: ObjectDescriptor::new("customers", ObjectKind::Table),
            column_pairs: vec![("customer_id".to_string(), "id".to_string())],
            on_update: Default::default(),
            on_delete: Default::default(),
            deferrability: Default::default(),
            match_rule: Default::default(),
        }];
        let statements = index_statements("orders", &indexes, &fks, &settings, &quoter);
        assert!(statements.is_empty());
    }

    #[test]
    fn test_partial_index_keeps_filter() {
        let (settings, quoter) = setup(DialectId::POSTGRESQL);
        let mut partial = IndexDescriptor::new("idx_active", vec!["status".to_string()]);
        partial.filter_expression = Some("status = 'active'".to_string());
        let statements = index_statements("orders", &[partial], &[], &settings, &quoter);
        assert_eq!(
            statements[0],
            "CREATE INDEX idx_active ON orders (status) WHERE status = 'active';"
        );
    }
}
