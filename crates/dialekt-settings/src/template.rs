//! DDL template rendering
//!
//! Templates are plain text with `%token%` placeholders. Rendering works
//! over a typed parameter map: a recognized placeholder is either
//! substituted with its value or deliberately removed when no value was
//! supplied; it is never left dangling in the output. Text that merely
//! contains a `%` (a literal percent, an unknown token shape) passes
//! through unchanged.

use std::collections::BTreeMap;
use std::fmt;

/// The closed vocabulary of template placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    TableName,
    FullName,
    ObjectName,
    ObjectType,
    SchemaName,
    CatalogName,
    ColumnList,
    ColumnName,
    ConstraintClause,
    PkName,
    SourceColumns,
    TargetTable,
    TargetColumns,
    UpdateRule,
    DeleteRule,
    Deferrability,
    MatchMode,
    IndexName,
    Unique,
    TableOptions,
    Expression,
    Comment,
    Cascade,
}

impl Placeholder {
    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::TableName => "table_name",
            Placeholder::FullName => "full_name",
            Placeholder::ObjectName => "object_name",
            Placeholder::ObjectType => "object_type",
            Placeholder::SchemaName => "schema_name",
            Placeholder::CatalogName => "catalog_name",
            Placeholder::ColumnList => "column_list",
            Placeholder::ColumnName => "column_name",
            Placeholder::ConstraintClause => "constraint_clause",
            Placeholder::PkName => "pk_name",
            Placeholder::SourceColumns => "source_columns",
            Placeholder::TargetTable => "target_table",
            Placeholder::TargetColumns => "target_columns",
            Placeholder::UpdateRule => "update_rule",
            Placeholder::DeleteRule => "delete_rule",
            Placeholder::Deferrability => "deferrability",
            Placeholder::MatchMode => "match_mode",
            Placeholder::IndexName => "index_name",
            Placeholder::Unique => "unique",
            Placeholder::TableOptions => "table_options",
            Placeholder::Expression => "expression",
            Placeholder::Comment => "comment",
            Placeholder::Cascade => "cascade",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "table_name" => Placeholder::TableName,
            "full_name" => Placeholder::FullName,
            "object_name" => Placeholder::ObjectName,
            "object_type" => Placeholder::ObjectType,
            "schema_name" => Placeholder::SchemaName,
            "catalog_name" => Placeholder::CatalogName,
            "column_list" => Placeholder::ColumnList,
            "column_name" => Placeholder::ColumnName,
            "constraint_clause" => Placeholder::ConstraintClause,
            "pk_name" => Placeholder::PkName,
            "source_columns" => Placeholder::SourceColumns,
            "target_table" => Placeholder::TargetTable,
            "target_columns" => Placeholder::TargetColumns,
            "update_rule" => Placeholder::UpdateRule,
            "delete_rule" => Placeholder::DeleteRule,
            "deferrability" => Placeholder::Deferrability,
            "match_mode" => Placeholder::MatchMode,
            "index_name" => Placeholder::IndexName,
            "unique" => Placeholder::Unique,
            "table_options" => Placeholder::TableOptions,
            "expression" => Placeholder::Expression,
            "comment" => Placeholder::Comment,
            "cascade" => Placeholder::Cascade,
            _ => return None,
        })
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Typed parameter map for one render call.
#[derive(Debug, Clone, Default)]
pub struct TemplateValues {
    values: BTreeMap<Placeholder, String>,
}

impl TemplateValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, placeholder: Placeholder, value: impl Into<String>) -> Self {
        self.values.insert(placeholder, value.into());
        self
    }

    /// Set only when a value is present; an absent value means the
    /// placeholder will be removed from the output.
    pub fn set_opt(mut self, placeholder: Placeholder, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.values.insert(placeholder, value);
        }
        self
    }

    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        self.values.get(&placeholder).map(|v| v.as_str())
    }
}

/// A parametrized DDL text pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct DdlTemplate {
    raw: String,
}

impl DdlTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The placeholders declared by this template, in order of first
    /// appearance.
    pub fn placeholders(&self) -> Vec<Placeholder> {
        let mut found = Vec::new();
        for (placeholder, _, _) in scan_tokens(&self.raw) {
            if !found.contains(&placeholder) {
                found.push(placeholder);
            }
        }
        found
    }

    /// Render the template against `values`.
    ///
    /// Unset placeholders are removed; runs of blanks left behind by a
    /// removal are collapsed so no clause gap survives in the output.
    pub fn render(&self, values: &TemplateValues) -> String {
        let mut out = String::with_capacity(self.raw.len());
        let mut cursor = 0;
        let mut removed_any = false;
        for (placeholder, start, end) in scan_tokens(&self.raw) {
            out.push_str(&self.raw[cursor..start]);
            match values.get(placeholder) {
                Some(value) => out.push_str(value),
                None => removed_any = true,
            }
            cursor = end;
        }
        out.push_str(&self.raw[cursor..]);
        if removed_any { tidy_blanks(&out) } else { out }
    }
}

/// Locate every `%token%` whose token is a recognized placeholder.
/// Returns (placeholder, byte start, byte end past the closing `%`).
fn scan_tokens(raw: &str) -> Vec<(Placeholder, usize, usize)> {
    let bytes = raw.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        let rest = &raw[i + 1..];
        let Some(close) = rest.find('%') else { break };
        let candidate = &rest[..close];
        if let Some(placeholder) = Placeholder::from_token(candidate) {
            tokens.push((placeholder, i, i + close + 2));
            i += close + 2;
        } else {
            i += 1;
        }
    }
    tokens
}

/// Collapse doubled spaces and space-before-punctuation artifacts left by
/// placeholder removal, line by line.
fn tidy_blanks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let mut prev_space = false;
        for c in line.chars() {
            if c == ' ' {
                if !prev_space {
                    out.push(c);
                }
                prev_space = true;
            } else {
                prev_space = false;
                out.push(c);
            }
        }
        while out.ends_with(' ') {
            out.pop();
        }
    }
    out
}
