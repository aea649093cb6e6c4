//! Connection probe trait
//!
//! The engine never talks a wire protocol itself; it consumes an open,
//! live connection through the small probe surface below. Every probe is
//! allowed to fail or return blank on exotic drivers, and the engine
//! substitutes documented defaults instead of propagating those failures.

use crate::{
    ColumnDescriptor, ConstraintDescriptor, DialektError, ForeignKeyEdge, IndexDescriptor,
    ObjectDescriptor, Result,
};
use async_trait::async_trait;

/// One row of a supplemental probe query, values already stringified.
#[derive(Debug, Clone, Default)]
pub struct MetadataRow {
    values: Vec<Option<String>>,
}

impl MetadataRow {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    pub fn from_strs(values: &[&str]) -> Self {
        Self {
            values: values.iter().map(|v| Some((*v).to_string())).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    pub fn get_i64(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(|v| v.trim().parse().ok())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Filter arguments for a native object listing call.
///
/// Patterns follow the driver convention: `%` and `_` wildcards, `None`
/// meaning "no filter". Cleaning user input into this shape is the
/// coordinator's job.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: Option<String>,
}

/// The metadata surface of a live database connection.
///
/// Implementations wrap a concrete driver handle. Methods marked with a
/// default implementation are genuinely optional driver features and
/// default to `Unsupported`, which the execution context records per
/// connection so the probe is never repeated.
#[async_trait]
pub trait MetadataConnection: Send + Sync {
    /// Driver-reported product name ("PostgreSQL", "Microsoft SQL Server").
    /// This is the one probe that must succeed: without it no dialect can
    /// be established.
    async fn product_name(&self) -> Result<String>;

    /// Driver-reported product version string, free-form.
    async fn product_version(&self) -> Result<String>;

    /// The identifier quote string. Default on failure: `"`.
    async fn identifier_quote_string(&self) -> Result<String>;

    /// The catalog/name separator. Default on failure: `.`.
    async fn catalog_separator(&self) -> Result<String> {
        Ok(".".to_string())
    }

    /// Table types the driver natively reports ("TABLE", "VIEW", ...).
    async fn table_types(&self) -> Result<Vec<String>>;

    async fn list_catalogs(&self) -> Result<Vec<String>> {
        Err(DialektError::Unsupported("list_catalogs".to_string()))
    }

    async fn list_schemas(&self) -> Result<Vec<String>> {
        Err(DialektError::Unsupported("list_schemas".to_string()))
    }

    /// Native object listing restricted to the given native type labels.
    async fn list_objects(
        &self,
        filter: &ListingFilter,
        types: &[String],
    ) -> Result<Vec<ObjectDescriptor>>;

    /// Sequences, listed separately because drivers inconsistently
    /// self-report them through the table-type mechanism.
    async fn list_sequences(&self, _filter: &ListingFilter) -> Result<Vec<ObjectDescriptor>> {
        Err(DialektError::Unsupported("list_sequences".to_string()))
    }

    /// Synonyms/aliases, same story as sequences.
    async fn list_synonyms(&self, _filter: &ListingFilter) -> Result<Vec<ObjectDescriptor>> {
        Err(DialektError::Unsupported("list_synonyms".to_string()))
    }

    /// Resolve a synonym to its target object, `None` when the reference
    /// is broken.
    async fn synonym_target(
        &self,
        _synonym: &ObjectDescriptor,
    ) -> Result<Option<ObjectDescriptor>> {
        Err(DialektError::Unsupported("synonym_target".to_string()))
    }

    /// Generic relational column probe for tables and views.
    async fn list_columns(&self, object: &ObjectDescriptor) -> Result<Vec<ColumnDescriptor>>;

    async fn list_indexes(&self, _object: &ObjectDescriptor) -> Result<Vec<IndexDescriptor>> {
        Err(DialektError::Unsupported("list_indexes".to_string()))
    }

    async fn primary_key(&self, _object: &ObjectDescriptor) -> Result<Option<ConstraintDescriptor>> {
        Err(DialektError::Unsupported("primary_key".to_string()))
    }

    async fn list_foreign_keys(&self, _object: &ObjectDescriptor) -> Result<Vec<ForeignKeyEdge>> {
        Err(DialektError::Unsupported("list_foreign_keys".to_string()))
    }

    async fn list_check_constraints(
        &self,
        _object: &ObjectDescriptor,
    ) -> Result<Vec<ConstraintDescriptor>> {
        Err(DialektError::Unsupported("list_check_constraints".to_string()))
    }

    /// Whether the driver's metadata calls honor an escape character in
    /// search patterns. When false, underscores are passed through as-is.
    fn supports_pattern_escaping(&self) -> bool {
        true
    }

    /// The escape string for `_`/`%` in search patterns.
    fn search_pattern_escape(&self) -> String {
        "\\".to_string()
    }

    /// Run a supplemental probe query (dialect disambiguation, native DDL
    /// retrieval). Rows come back stringified.
    async fn query(&self, sql: &str) -> Result<Vec<MetadataRow>>;

    /// Run a statement for its side effect (savepoint management).
    async fn execute(&self, sql: &str) -> Result<()>;

    async fn auto_commit(&self) -> Result<bool> {
        Ok(true)
    }

    fn is_closed(&self) -> bool {
        false
    }

    /// Savepoint management. The default implementations speak standard
    /// SQL; drivers with a dedicated savepoint API override these.
    async fn create_savepoint(&self, name: &str) -> Result<()> {
        self.execute(&format!("SAVEPOINT {name}")).await
    }

    async fn release_savepoint(&self, name: &str) -> Result<()> {
        self.execute(&format!("RELEASE SAVEPOINT {name}")).await
    }

    async fn rollback_to_savepoint(&self, name: &str) -> Result<()> {
        self.execute(&format!("ROLLBACK TO SAVEPOINT {name}")).await
    }
}
