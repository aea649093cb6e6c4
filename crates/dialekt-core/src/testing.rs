//! In-memory [`MetadataConnection`] double for tests.
//!
//! `ScriptedConnection` is a plain data bag: tests preload product
//! information, object listings, column sets and canned query results,
//! then hand it to the code under test behind an `Arc`. Every statement
//! passed to [`MetadataConnection::execute`] is recorded so tests can
//! assert on savepoint traffic.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::connection::{ListingFilter, MetadataConnection, MetadataRow};
use crate::descriptor::{
    ColumnDescriptor, ConstraintDescriptor, ForeignKeyEdge, IndexDescriptor, ObjectDescriptor,
};
use crate::error::{DialektError, Result};

enum LikeToken {
    Literal(char),
    AnyRun,
    AnyOne,
}

/// Scriptable connection stand-in.
pub struct ScriptedConnection {
    pub product_name: String,
    pub product_version: String,
    /// `None` makes the quote probe fail, exercising the degraded path.
    pub quote_string: Option<String>,
    pub catalog_separator: String,
    pub table_types: Vec<String>,
    pub objects: Vec<ObjectDescriptor>,
    /// `None` reports the listing as unsupported.
    pub sequences: Option<Vec<ObjectDescriptor>>,
    pub synonyms: Option<Vec<ObjectDescriptor>>,
    /// Synonym name to target object.
    pub synonym_targets: HashMap<String, ObjectDescriptor>,
    /// Object name to its column set.
    pub columns: HashMap<String, Vec<ColumnDescriptor>>,
    pub indexes: HashMap<String, Vec<IndexDescriptor>>,
    pub primary_keys: HashMap<String, ConstraintDescriptor>,
    pub foreign_keys: HashMap<String, Vec<ForeignKeyEdge>>,
    pub check_constraints: HashMap<String, Vec<ConstraintDescriptor>>,
    /// Canned result sets keyed by the exact SQL text. Unknown SQL fails
    /// with [`DialektError::Probe`].
    pub query_results: HashMap<String, Vec<MetadataRow>>,
    pub auto_commit: bool,
    pub closed: bool,
    pub escape_patterns: bool,
    /// Everything passed to `execute`, in order.
    pub statements: Mutex<Vec<String>>,
    pub listing_calls: AtomicUsize,
}

impl Default for ScriptedConnection {
    fn default() -> Self {
        Self {
            product_name: "PostgreSQL".to_string(),
            product_version: "15.2".to_string(),
            quote_string: Some("\"".to_string()),
            catalog_separator: ".".to_string(),
            table_types: vec!["TABLE".to_string(), "VIEW".to_string()],
            objects: Vec::new(),
            sequences: None,
            synonyms: None,
            synonym_targets: HashMap::new(),
            columns: HashMap::new(),
            indexes: HashMap::new(),
            primary_keys: HashMap::new(),
            foreign_keys: HashMap::new(),
            check_constraints: HashMap::new(),
            query_results: HashMap::new(),
            auto_commit: false,
            closed: false,
            escape_patterns: true,
            statements: Mutex::new(Vec::new()),
            listing_calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedConnection {
    pub fn new(product_name: &str, product_version: &str) -> Self {
        Self {
            product_name: product_name.to_string(),
            product_version: product_version.to_string(),
            ..Self::default()
        }
    }

    pub fn with_table_types(mut self, types: &[&str]) -> Self {
        self.table_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_object(mut self, object: ObjectDescriptor) -> Self {
        self.objects.push(object);
        self
    }

    pub fn with_columns(mut self, object_name: &str, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns.insert(object_name.to_string(), columns);
        self
    }

    pub fn with_query_result(mut self, sql: &str, rows: Vec<MetadataRow>) -> Self {
        self.query_results.insert(sql.to_string(), rows);
        self
    }

    pub fn executed_statements(&self) -> Vec<String> {
        match self.statements.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn pattern_matches(pattern: Option<&str>, value: &str) -> bool {
        let Some(pattern) = pattern else {
            return true;
        };
        Self::like_match(&Self::like_tokens(pattern), value)
    }

    fn like_tokens(pattern: &str) -> Vec<LikeToken> {
        let mut tokens = Vec::new();
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        tokens.push(LikeToken::Literal(escaped));
                    }
                }
                '%' => tokens.push(LikeToken::AnyRun),
                '_' => tokens.push(LikeToken::AnyOne),
                other => tokens.push(LikeToken::Literal(other)),
            }
        }
        tokens
    }

    fn like_match(tokens: &[LikeToken], value: &str) -> bool {
        let chars: Vec<char> = value.chars().collect();
        fn matches(tokens: &[LikeToken], chars: &[char]) -> bool {
            match tokens.split_first() {
                None => chars.is_empty(),
                Some((LikeToken::Literal(c), rest)) => {
                    chars.first() == Some(c) && matches(rest, &chars[1..])
                }
                Some((LikeToken::AnyOne, rest)) => {
                    !chars.is_empty() && matches(rest, &chars[1..])
                }
                Some((LikeToken::AnyRun, rest)) => {
                    (0..=chars.len()).any(|skip| matches(rest, &chars[skip..]))
                }
            }
        }
        matches(tokens, &chars)
    }
}

#[async_trait]
impl MetadataConnection for ScriptedConnection {
    async fn product_name(&self) -> Result<String> {
        if self.product_name.is_empty() {
            return Err(DialektError::Probe("no product name".to_string()));
        }
        Ok(self.product_name.clone())
    }

    async fn product_version(&self) -> Result<String> {
        Ok(self.product_version.clone())
    }

    async fn identifier_quote_string(&self) -> Result<String> {
        match &self.quote_string {
            Some(quote) => Ok(quote.clone()),
            None => Err(DialektError::Probe("quote string unavailable".to_string())),
        }
    }

    async fn catalog_separator(&self) -> Result<String> {
        Ok(self.catalog_separator.clone())
    }

    async fn table_types(&self) -> Result<Vec<String>> {
        Ok(self.table_types.clone())
    }

    async fn list_objects(
        &self,
        filter: &ListingFilter,
        types: &[String],
    ) -> Result<Vec<ObjectDescriptor>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .objects
            .iter()
            .filter(|obj| types.contains(&obj.kind.native_label().to_string()))
            .filter(|obj| Self::pattern_matches(filter.name.as_deref(), &obj.name))
            .filter(|obj| match &filter.schema {
                Some(schema) => obj.schema.as_deref() == Some(schema.as_str()),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn list_columns(&self, object: &ObjectDescriptor) -> Result<Vec<ColumnDescriptor>> {
        self.columns
            .get(&object.name)
            .cloned()
            .ok_or_else(|| DialektError::Probe(format!("no columns scripted for {}", object.name)))
    }

    async fn list_sequences(&self, filter: &ListingFilter) -> Result<Vec<ObjectDescriptor>> {
        match &self.sequences {
            Some(seqs) => Ok(seqs
                .iter()
                .filter(|obj| Self::pattern_matches(filter.name.as_deref(), &obj.name))
                .cloned()
                .collect()),
            None => Err(DialektError::Unsupported("sequence listing".to_string())),
        }
    }

    async fn list_synonyms(&self, filter: &ListingFilter) -> Result<Vec<ObjectDescriptor>> {
        match &self.synonyms {
            Some(syns) => Ok(syns
                .iter()
                .filter(|obj| Self::pattern_matches(filter.name.as_deref(), &obj.name))
                .cloned()
                .collect()),
            None => Err(DialektError::Unsupported("synonym listing".to_string())),
        }
    }

    async fn synonym_target(&self, object: &ObjectDescriptor) -> Result<Option<ObjectDescriptor>> {
        Ok(self.synonym_targets.get(&object.name).cloned())
    }

    async fn list_indexes(&self, object: &ObjectDescriptor) -> Result<Vec<IndexDescriptor>> {
        Ok(self.indexes.get(&object.name).cloned().unwrap_or_default())
    }

    async fn primary_key(&self, object: &ObjectDescriptor) -> Result<Option<ConstraintDescriptor>> {
        Ok(self.primary_keys.get(&object.name).cloned())
    }

    async fn list_foreign_keys(&self, object: &ObjectDescriptor) -> Result<Vec<ForeignKeyEdge>> {
        Ok(self.foreign_keys.get(&object.name).cloned().unwrap_or_default())
    }

    async fn list_check_constraints(
        &self,
        object: &ObjectDescriptor,
    ) -> Result<Vec<ConstraintDescriptor>> {
        Ok(self
            .check_constraints
            .get(&object.name)
            .cloned()
            .unwrap_or_default())
    }

    async fn query(&self, sql: &str) -> Result<Vec<MetadataRow>> {
        self.query_results
            .get(sql)
            .cloned()
            .ok_or_else(|| DialektError::Probe(format!("unscripted query: {sql}")))
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        if let Ok(mut guard) = self.statements.lock() {
            guard.push(sql.to_string());
        }
        Ok(())
    }

    fn supports_pattern_escaping(&self) -> bool {
        self.escape_patterns
    }

    async fn auto_commit(&self) -> Result<bool> {
        Ok(self.auto_commit)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
