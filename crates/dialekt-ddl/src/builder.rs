//! Table DDL reconstruction.
//!
//! Two paths produce CREATE TABLE text. When the dialect configures a
//! native source-retrieval statement (`ddl.retrieve.table`), that query
//! is issued and its result returned, optionally pretty-printed.
//! Otherwise the DDL is synthesized from the normalized model: aligned
//! column definitions, check constraints, primary key, foreign keys,
//! indexes and comments, inline or trailing per dialect settings.

use std::sync::Arc;

use sqlformat::{FormatOptions, QueryParams};

use dialekt_core::{
    ColumnDescriptor, ConstraintDescriptor, ConstraintKind, DialektError, ExecutionContext,
    ForeignKeyEdge, IndexDescriptor, ObjectDescriptor, Result,
};
use dialekt_dialect::{DialectCoordinator, IdentifierCase, QuoteHandler};
use dialekt_settings::{DdlTemplate, Placeholder, SettingsNamespace, TemplateValues};

use crate::comments::comment_statements;
use crate::foreign_key::{self, is_system_generated};
use crate::index::index_statements;

const DEFAULT_PK_TEMPLATE: &str =
    "ALTER TABLE %table_name% ADD %constraint_clause%PRIMARY KEY (%column_list%);";
const DEFAULT_DROP_TEMPLATE: &str = "DROP TABLE %table_name%%cascade%;";

/// Caller-facing generation switches. Dialect settings provide the
/// defaults; options only tighten them.
#[derive(Debug, Clone)]
pub struct DdlOptions {
    /// Emit a DROP statement ahead of the CREATE.
    pub include_drop: bool,
    /// Force the primary key into the CREATE body even when the dialect
    /// default is a trailing ALTER statement.
    pub inline_primary_key: bool,
    /// Same for foreign keys.
    pub inline_foreign_keys: bool,
    /// Name the primary key `PK_<table>` instead of its stored name.
    pub use_generated_pk_name: bool,
    pub line_ending: String,
}

impl Default for DdlOptions {
    fn default() -> Self {
        Self {
            include_drop: false,
            inline_primary_key: false,
            inline_foreign_keys: false,
            use_generated_pk_name: false,
            line_ending: "\n".to_string(),
        }
    }
}

/// Everything known about one table, ready for reconstruction.
#[derive(Debug, Clone)]
pub struct TableDefinition {
    pub object: ObjectDescriptor,
    pub columns: Vec<ColumnDescriptor>,
    pub primary_key: Option<ConstraintDescriptor>,
    pub check_constraints: Vec<ConstraintDescriptor>,
    pub foreign_keys: Vec<ForeignKeyEdge>,
    pub indexes: Vec<IndexDescriptor>,
    pub comment: Option<String>,
}

impl TableDefinition {
    pub fn new(object: ObjectDescriptor) -> Self {
        Self {
            object,
            columns: Vec::new(),
            primary_key: None,
            check_constraints: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            comment: None,
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_primary_key(mut self, pk: ConstraintDescriptor) -> Self {
        self.primary_key = Some(pk);
        self
    }

    pub fn with_foreign_key(mut self, edge: ForeignKeyEdge) -> Self {
        self.foreign_keys.push(edge);
        self
    }

    /// Gather the full definition through the coordinator. Every probe
    /// beyond the column listing degrades to empty on failure.
    #[tracing::instrument(skip(coordinator, object), fields(table = %object.name))]
    pub async fn load(
        coordinator: &DialectCoordinator,
        object: &ObjectDescriptor,
    ) -> Result<Self> {
        let conn = coordinator.execution().connection().clone();
        let columns = coordinator.object_columns(object).await?;
        let primary_key = ExecutionContext::default_on_failure(
            conn.primary_key(object).await,
            "primary key retrieval",
        )?;
        let check_constraints = ExecutionContext::default_on_failure(
            conn.list_check_constraints(object).await,
            "check constraint retrieval",
        )?;
        let foreign_keys = ExecutionContext::default_on_failure(
            conn.list_foreign_keys(object).await,
            "foreign key retrieval",
        )?;
        let indexes = ExecutionContext::default_on_failure(
            conn.list_indexes(object).await,
            "index retrieval",
        )?;
        Ok(Self {
            object: object.clone(),
            columns,
            primary_key,
            check_constraints,
            foreign_keys,
            indexes,
            comment: object.remarks.clone(),
        })
    }
}

/// Per-connection DDL generator.
pub struct DdlGenerator {
    settings: Arc<SettingsNamespace>,
    quoter: QuoteHandler,
    options: DdlOptions,
}

impl DdlGenerator {
    pub fn new(settings: Arc<SettingsNamespace>) -> Self {
        let quoter = QuoteHandler::from_settings(settings.clone(), "\"");
        Self {
            settings,
            quoter,
            options: DdlOptions::default(),
        }
    }

    /// Build from a live coordinator, inheriting its probed quote
    /// character.
    pub fn for_coordinator(coordinator: &DialectCoordinator) -> Self {
        let settings = coordinator.settings_arc();
        let quoter =
            QuoteHandler::from_settings(settings.clone(), coordinator.quoter().quote_char());
        Self {
            settings,
            quoter,
            options: DdlOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DdlOptions) -> Self {
        self.options = options;
        self
    }

    pub fn settings(&self) -> &SettingsNamespace {
        &self.settings
    }

    fn table_name(&self, object: &ObjectDescriptor) -> String {
        self.quoter
            .quote_if_needed(&self.quoter.adjust_object_name_case(&object.name))
    }

    fn full_name(&self, object: &ObjectDescriptor) -> String {
        match &object.schema {
            Some(schema) => format!(
                "{}.{}",
                self.quoter
                    .quote_if_needed(&self.quoter.adjust_schema_name_case(schema)),
                self.table_name(object)
            ),
            None => self.table_name(object),
        }
    }

    /// Fetch the database's own DDL text for an object via the
    /// configured retrieval statement. [`DialektError::NoConfiguration`]
    /// when the dialect has none.
    pub async fn retrieve_native(
        &self,
        ctx: &ExecutionContext,
        object: &ObjectDescriptor,
    ) -> Result<String> {
        let template = self.settings.template("ddl.retrieve.table").ok_or_else(|| {
            DialektError::NoConfiguration(format!(
                "no native DDL retrieval for dialect {}",
                self.settings.dialect()
            ))
        })?;
        let values = TemplateValues::new()
            .set(Placeholder::ObjectName, object.name.clone())
            .set_opt(Placeholder::SchemaName, object.schema.clone())
            .set_opt(Placeholder::CatalogName, object.catalog.clone())
            .set(Placeholder::TableName, self.table_name(object))
            .set(Placeholder::FullName, self.full_name(object));
        let sql = template.render(&values);
        tracing::debug!(table = %object.name, "retrieving native DDL");

        let conn = ctx.connection().clone();
        let rows = ctx.with_savepoint(|| async { conn.query(&sql).await }).await?;
        // SHOW CREATE TABLE style results put the text in the last
        // column; single-column results work the same way.
        let text = rows
            .first()
            .and_then(|row| (0..row.len()).rev().find_map(|i| row.get(i)))
            .ok_or_else(|| {
                DialektError::Probe(format!("native DDL query returned nothing for {}", object.name))
            })?
            .to_string();
        let text = if self.settings.get_bool("ddl.retrieve.reformat", false) {
            sqlformat::format(&text, &QueryParams::None, &FormatOptions::default())
        } else {
            text
        };
        Ok(self.terminate(&text))
    }

    fn terminate(&self, text: &str) -> String {
        let trimmed = text.trim_end();
        let nl = &self.options.line_ending;
        if trimmed.ends_with(';') {
            format!("{trimmed}{nl}")
        } else {
            format!("{trimmed};{nl}")
        }
    }

    /// CREATE TABLE text for a definition: the native retrieval path
    /// when configured and reachable, synthesis otherwise.
    pub async fn table_ddl(&self, ctx: &ExecutionContext, def: &TableDefinition) -> Result<String> {
        match self.retrieve_native(ctx, &def.object).await {
            Ok(text) => Ok(text),
            Err(DialektError::NoConfiguration(_)) => Ok(self.synthesize_table(def)),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                tracing::warn!(
                    dialect = %self.settings.dialect(),
                    table = %def.object.name,
                    error = %err,
                    "native DDL retrieval failed, synthesizing instead"
                );
                Ok(self.synthesize_table(def))
            }
        }
    }

    fn fold_type(&self, text: &str) -> String {
        match self.quoter.identifier_case() {
            IdentifierCase::Upper => text.to_uppercase(),
            _ => text.to_string(),
        }
    }

    fn format_type(&self, column: &ColumnDescriptor) -> String {
        let native = column.native_type.trim();
        if native.contains('(') {
            return self.fold_type(native);
        }
        let rendered = match (column.size, column.scale) {
            (Some(size), Some(scale)) if !column.jdbc_type.is_character() => {
                // Precision wins over the raw size when the driver
                // reports both.
                let precision = column.precision.map(i64::from).unwrap_or(size);
                format!("{native}({precision},{scale})")
            }
            (Some(size), None) if column.jdbc_type.takes_size_argument() => {
                format!("{native}({size})")
            }
            _ => native.to_string(),
        };
        self.fold_type(&rendered)
    }

    fn column_extras(&self, column: &ColumnDescriptor) -> String {
        let mut extras = String::new();
        if let Some(default) = &column.default_expression {
            if column.generated {
                extras.push_str(&format!(" GENERATED ALWAYS AS ({default})"));
            } else {
                extras.push_str(&format!(" DEFAULT {default}"));
            }
        }
        if !column.nullable {
            extras.push_str(" NOT NULL");
        }
        if let Some(inline) = &column.inline_constraint {
            if !inline.trim().is_empty() {
                extras.push(' ');
                extras.push_str(inline.trim());
            }
        }
        if self.settings.get_bool("ddl.comment.inline", false) {
            if let Some(comment) = &column.comment {
                if !comment.trim().is_empty() {
                    extras.push_str(&format!(" COMMENT '{}'", comment.replace('\'', "''")));
                }
            }
        }
        extras
    }

    fn pk_constraint_clause(&self, pk: &ConstraintDescriptor, table_name: &str) -> Option<String> {
        if self.options.use_generated_pk_name {
            let generated = self
                .quoter
                .adjust_object_name_case(&format!("pk_{}", self.quoter.strip_quotes(table_name)));
            return Some(format!("CONSTRAINT {} ", self.quoter.quote_if_needed(&generated)));
        }
        let name = pk.name.as_deref()?.trim();
        if name.is_empty() || is_system_generated(name, &self.settings) {
            return None;
        }
        Some(format!("CONSTRAINT {} ", self.quoter.quote_if_needed(name)))
    }

    fn pk_statement(&self, pk: &ConstraintDescriptor, table_name: &str) -> Option<String> {
        if pk.columns.is_empty() {
            return None;
        }
        let column_list = pk
            .columns
            .iter()
            .map(|c| {
                self.quoter
                    .quote_if_needed(&self.quoter.adjust_object_name_case(c))
            })
            .collect::<Vec<_>>()
            .join(", ");
        let values = TemplateValues::new()
            .set(Placeholder::TableName, table_name)
            .set(Placeholder::ColumnList, column_list)
            .set_opt(
                Placeholder::ConstraintClause,
                self.pk_constraint_clause(pk, table_name),
            );
        let template = self
            .settings
            .template("ddl.pk.template")
            .unwrap_or_else(|| DdlTemplate::new(DEFAULT_PK_TEMPLATE));
        Some(template.render(&values))
    }

    /// DROP statement for the table, with the dialect's cascade suffix.
    pub fn drop_statement(&self, object: &ObjectDescriptor) -> String {
        let values = TemplateValues::new()
            .set(Placeholder::TableName, self.table_name(object))
            .set_opt(
                Placeholder::Cascade,
                self.settings
                    .resolve("ddl.drop.cascade")
                    .filter(|cascade| !cascade.is_empty())
                    .map(|cascade| cascade.to_string()),
            );
        let template = self
            .settings
            .template("ddl.drop.template")
            .unwrap_or_else(|| DdlTemplate::new(DEFAULT_DROP_TEMPLATE));
        template.render(&values)
    }

    /// Reconstruct CREATE TABLE text from the model alone. A definition
    /// without columns yields an empty string.
    pub fn synthesize_table(&self, def: &TableDefinition) -> String {
        if def.columns.is_empty() {
            tracing::debug!(table = %def.object.name, "no columns available, returning empty DDL");
            return String::new();
        }
        let nl = &self.options.line_ending;
        let table_name = self.table_name(&def.object);
        let inline_pk =
            self.options.inline_primary_key || self.settings.get_bool("ddl.pk.inline", false);
        let inline_fk =
            self.options.inline_foreign_keys || self.settings.get_bool("ddl.fk.inline", false);

        let mut statements: Vec<String> = Vec::new();
        if self.options.include_drop {
            statements.push(self.drop_statement(&def.object));
        }

        let rendered: Vec<(String, String, String)> = def
            .columns
            .iter()
            .map(|column| {
                let name = self
                    .quoter
                    .quote_if_needed(&self.quoter.adjust_object_name_case(&column.name));
                (name, self.format_type(column), self.column_extras(column))
            })
            .collect();
        let name_width = rendered.iter().map(|(n, _, _)| n.len()).max().unwrap_or(0);
        let type_width = rendered.iter().map(|(_, t, _)| t.len()).max().unwrap_or(0);

        let mut body: Vec<String> = rendered
            .into_iter()
            .map(|(name, ty, extras)| {
                if extras.is_empty() {
                    format!("   {name:<name_width$} {ty}")
                } else {
                    format!("   {name:<name_width$} {ty:<type_width$}{extras}")
                }
            })
            .collect();

        for check in &def.check_constraints {
            if check.kind != ConstraintKind::Check {
                continue;
            }
            let Some(expression) = &check.expression else {
                continue;
            };
            if expression.trim().is_empty() {
                continue;
            }
            let clause = match check.name.as_deref() {
                Some(name) if !is_system_generated(name, &self.settings) => format!(
                    "   CONSTRAINT {} CHECK ({})",
                    self.quoter.quote_if_needed(name),
                    expression.trim()
                ),
                _ => format!("   CHECK ({})", expression.trim()),
            };
            body.push(clause);
        }

        if inline_pk {
            if let Some(pk) = &def.primary_key {
                if !pk.columns.is_empty() {
                    let column_list = pk
                        .columns
                        .iter()
                        .map(|c| {
                            self.quoter
                                .quote_if_needed(&self.quoter.adjust_object_name_case(c))
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    let clause = self.pk_constraint_clause(pk, &table_name).unwrap_or_default();
                    body.push(format!("   {clause}PRIMARY KEY ({column_list})"));
                }
            }
        }
        if inline_fk {
            for edge in &def.foreign_keys {
                if let Some(clause) = foreign_key::inline_clause(edge, &self.settings, &self.quoter)
                {
                    body.push(format!("   {clause}"));
                }
            }
        }

        let table_options = self.settings.get_str("ddl.table_options", "");
        let closing = if table_options.is_empty() {
            ");".to_string()
        } else {
            format!(") {table_options};")
        };
        statements.push(format!(
            "CREATE TABLE {table_name}{nl}({nl}{}{nl}{closing}",
            body.join(&format!(",{nl}"))
        ));

        if !inline_pk {
            if let Some(pk) = &def.primary_key {
                if let Some(statement) = self.pk_statement(pk, &table_name) {
                    statements.push(statement);
                }
            }
        }
        if !inline_fk {
            for edge in &def.foreign_keys {
                if let Some(statement) =
                    foreign_key::alter_statement(&table_name, edge, &self.settings, &self.quoter)
                {
                    statements.push(statement);
                }
            }
        }
        statements.extend(index_statements(
            &table_name,
            &def.indexes,
            &def.foreign_keys,
            &self.settings,
            &self.quoter,
        ));
        statements.extend(comment_statements(
            &table_name,
            def.comment.as_deref(),
            &def.columns,
            &self.settings,
            &self.quoter,
        ));

        let mut out = statements.join(&format!("{nl}{nl}"));
        out.push_str(nl);
        out
    }
}
