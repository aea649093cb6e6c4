//! Foreign key clause generation.

use regex::Regex;

use dialekt_core::{FkRule, ForeignKeyEdge};
use dialekt_dialect::QuoteHandler;
use dialekt_settings::{DdlTemplate, Placeholder, SettingsNamespace, TemplateValues};

pub(crate) const DEFAULT_FK_TEMPLATE: &str = "ALTER TABLE %table_name% ADD %constraint_clause%FOREIGN KEY (%source_columns%) \
     REFERENCES %target_table% (%target_columns%)%update_rule%%delete_rule%%deferrability%%match_mode%;";

const INLINE_FK_TEMPLATE: &str = "%constraint_clause%FOREIGN KEY (%source_columns%) \
     REFERENCES %target_table% (%target_columns%)%update_rule%%delete_rule%";

/// Whether a constraint name looks auto-generated for this dialect.
/// Such names are omitted from generated DDL so the target database can
/// mint its own.
pub fn is_system_generated(name: &str, settings: &SettingsNamespace) -> bool {
    let Some(pattern) = settings.resolve("constraint.systemname.pattern") else {
        return false;
    };
    match Regex::new(pattern) {
        Ok(re) => re.is_match(name),
        Err(err) => {
            tracing::warn!(pattern = %pattern, error = %err, "bad system-name pattern, keeping constraint name");
            false
        }
    }
}

/// `CONSTRAINT <name> ` when the edge carries a name worth keeping.
fn constraint_clause(
    name: Option<&str>,
    settings: &SettingsNamespace,
    quoter: &QuoteHandler,
) -> Option<String> {
    let name = name?.trim();
    if name.is_empty() || is_system_generated(name, settings) {
        return None;
    }
    Some(format!("CONSTRAINT {} ", quoter.quote_if_needed(name)))
}

/// ` ON UPDATE <rule>` / ` ON DELETE <rule>`, gated by the dialect's
/// declared rule support. The default rule (NO ACTION) is never spelled
/// out.
fn rule_clause(verb: &str, rule: FkRule, support_key: &str, settings: &SettingsNamespace) -> Option<String> {
    if rule == FkRule::NoAction {
        return None;
    }
    // An absent support list means "emit everything"; a present list is
    // authoritative, even when empty.
    if settings.resolve(support_key).is_some() {
        let supported = settings.get_list(support_key);
        if !supported.iter().any(|s| s == rule.settings_key()) {
            tracing::debug!(rule = rule.settings_key(), key = support_key, "rule not supported by dialect, omitting");
            return None;
        }
    }
    Some(format!(" ON {} {}", verb, rule.sql_keyword()))
}

fn edge_values(
    edge: &ForeignKeyEdge,
    settings: &SettingsNamespace,
    quoter: &QuoteHandler,
) -> Option<TemplateValues> {
    if edge.column_pairs.is_empty() {
        tracing::debug!(fk = ?edge.name, "foreign key without column pairs, skipping");
        return None;
    }
    let source_columns = edge
        .source_columns()
        .iter()
        .map(|c| quoter.quote_if_needed(c))
        .collect::<Vec<_>>()
        .join(", ");
    let target_columns = edge
        .target_columns()
        .iter()
        .map(|c| quoter.quote_if_needed(c))
        .collect::<Vec<_>>()
        .join(", ");
    let match_mode = if settings.get_bool("fk.match.enforced", false) {
        edge.match_rule.sql_clause().map(|clause| format!(" {clause}"))
    } else {
        None
    };
    Some(
        TemplateValues::new()
            .set(Placeholder::SourceColumns, source_columns)
            .set(
                Placeholder::TargetTable,
                quoter.quote_if_needed(&edge.target.name),
            )
            .set(Placeholder::TargetColumns, target_columns)
            .set_opt(
                Placeholder::ConstraintClause,
                constraint_clause(edge.name.as_deref(), settings, quoter),
            )
            .set_opt(
                Placeholder::UpdateRule,
                rule_clause("UPDATE", edge.on_update, "fk.supported_update_rules", settings),
            )
            .set_opt(
                Placeholder::DeleteRule,
                rule_clause("DELETE", edge.on_delete, "fk.supported_delete_rules", settings),
            )
            .set_opt(
                Placeholder::Deferrability,
                edge.deferrability.sql_clause().map(|clause| format!(" {clause}")),
            )
            .set_opt(Placeholder::MatchMode, match_mode),
    )
}

/// Standalone `ALTER TABLE ... ADD FOREIGN KEY` statement for one edge.
pub fn alter_statement(
    table_name: &str,
    edge: &ForeignKeyEdge,
    settings: &SettingsNamespace,
    quoter: &QuoteHandler,
) -> Option<String> {
    let values = edge_values(edge, settings, quoter)?
        .set(Placeholder::TableName, table_name);
    let template = settings
        .template("ddl.fk.template")
        .unwrap_or_else(|| DdlTemplate::new(DEFAULT_FK_TEMPLATE));
    Some(template.render(&values))
}

/// Constraint row for inside a CREATE TABLE body.
pub fn inline_clause(
    edge: &ForeignKeyEdge,
    settings: &SettingsNamespace,
    quoter: &QuoteHandler,
) -> Option<String> {
    let values = edge_values(edge, settings, quoter)?;
    Some(DdlTemplate::new(INLINE_FK_TEMPLATE).render(&values))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dialekt_core::{Deferrability, DialectId, MatchRule, ObjectDescriptor, ObjectKind, VersionBand};
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

    fn edge(name: Option<&str>) -> ForeignKeyEdge {
        ForeignKeyEdge {
            name: name.map(|n| n.to_string()),
            source: ObjectDescriptor::new("ORDERS", ObjectKind::Table),
            target: ObjectDescriptor::new("CUSTOMERS", ObjectKind::Table),
            column_pairs: vec![("CUSTOMER_ID".to_string(), "ID".to_string())],
            on_update: dialekt_core::FkRule::NoAction,
            on_delete: dialekt_core::FkRule::Cascade,
            deferrability: Deferrability::default(),
            match_rule: MatchRule::default(),
        }
    }

    #[test]
    fn test_named_constraint_kept() {
        let (settings, quoter) = setup(DialectId::ORACLE);
        let sql = alter_statement("ORDERS", &edge(Some("FK_ORDERS_CUSTOMER")), &settings, &quoter)
            .unwrap();
        assert!(sql.contains("CONSTRAINT FK_ORDERS_CUSTOMER FOREIGN KEY"));
        assert!(sql.contains("ON DELETE CASCADE"));
    }

    #[test]
    fn test_system_name_omitted() {
        let (settings, quoter) = setup(DialectId::ORACLE);
        let sql =
            alter_statement("ORDERS", &edge(Some("SYS_C00123")), &settings, &quoter).unwrap();
        assert!(!sql.contains("CONSTRAINT"));
        assert!(!sql.contains("SYS_C00123"));
        assert!(sql.contains("ADD FOREIGN KEY (CUSTOMER_ID)"));
    }

    #[test]
    fn test_unsupported_rule_dropped() {
        // Oracle has no ON UPDATE actions at all.
        let (settings, quoter) = setup(DialectId::ORACLE);
        let mut fk = edge(None);
        fk.on_update = dialekt_core::FkRule::Cascade;
        let sql = alter_statement("ORDERS", &fk, &settings, &quoter).unwrap();
        assert!(!sql.contains("ON UPDATE"));
        assert!(sql.contains("ON DELETE CASCADE"));
    }

    #[test]
    fn test_match_clause_only_where_enforced() {
        let mut fk = edge(None);
        fk.match_rule = MatchRule::Full;

        let (settings, quoter) = setup(DialectId::POSTGRESQL);
        let sql = alter_statement("orders", &fk, &settings, &quoter).unwrap();
        assert!(sql.contains("MATCH FULL"));

        let (settings, quoter) = setup(DialectId::ORACLE);
        let sql = alter_statement("ORDERS", &fk, &settings, &quoter).unwrap();
        assert!(!sql.contains("MATCH"));
    }

    #[test]
    fn test_empty_column_pairs_skip_edge() {
        let (settings, quoter) = setup(DialectId::ORACLE);
        let mut fk = edge(None);
        fk.column_pairs.clear();
        assert!(alter_statement("ORDERS", &fk, &settings, &quoter).is_none());
    }
}
