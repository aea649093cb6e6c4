//! Canonical, dialect-independent descriptors for database objects
//!
//! Drivers report object and column metadata in wildly inconsistent
//! shapes; everything the engine hands to callers is normalized into the
//! types in this module first. Descriptors are built during a metadata
//! listing call, are immutable afterwards, and may only be enriched in
//! place by a registered enhancer while the listing pipeline is running.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Object-type tag for a database object.
///
/// The common relational vocabulary is closed and typed; genuinely
/// open-ended, configuration-driven types (Oracle macro libraries,
/// Teradata macros, vendor-specific catalogs) travel as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Table,
    View,
    MaterializedView,
    Synonym,
    Sequence,
    Domain,
    EnumType,
    CompositeType,
    Macro,
    SystemTable,
    SystemView,
    TemporaryTable,
    Custom(String),
}

impl ObjectKind {
    /// Parse a driver-reported table type ("BASE TABLE", "MATERIALIZED
    /// VIEW", ...) into the canonical tag. Unrecognized labels are kept
    /// verbatim (upper-cased) as `Custom`.
    pub fn from_native(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "TABLE" | "BASE TABLE" => ObjectKind::Table,
            "VIEW" => ObjectKind::View,
            "MATERIALIZED VIEW" | "MATERIALIZED_VIEW" => ObjectKind::MaterializedView,
            "SYNONYM" | "ALIAS" => ObjectKind::Synonym,
            "SEQUENCE" => ObjectKind::Sequence,
            "DOMAIN" => ObjectKind::Domain,
            "ENUM" | "ENUM TYPE" => ObjectKind::EnumType,
            "TYPE" | "COMPOSITE TYPE" => ObjectKind::CompositeType,
            "MACRO" => ObjectKind::Macro,
            "SYSTEM TABLE" => ObjectKind::SystemTable,
            "SYSTEM VIEW" => ObjectKind::SystemView,
            "LOCAL TEMPORARY" | "GLOBAL TEMPORARY" | "TEMPORARY TABLE" => {
                ObjectKind::TemporaryTable
            }
            other => ObjectKind::Custom(other.to_string()),
        }
    }

    /// The label used in `CREATE <label> ...` and in native listing calls.
    pub fn native_label(&self) -> &str {
        match self {
            ObjectKind::Table => "TABLE",
            ObjectKind::View => "VIEW",
            ObjectKind::MaterializedView => "MATERIALIZED VIEW",
            ObjectKind::Synonym => "SYNONYM",
            ObjectKind::Sequence => "SEQUENCE",
            ObjectKind::Domain => "DOMAIN",
            ObjectKind::EnumType => "ENUM",
            ObjectKind::CompositeType => "TYPE",
            ObjectKind::Macro => "MACRO",
            ObjectKind::SystemTable => "SYSTEM TABLE",
            ObjectKind::SystemView => "SYSTEM VIEW",
            ObjectKind::TemporaryTable => "LOCAL TEMPORARY",
            ObjectKind::Custom(label) => label,
        }
    }

    /// Whether a generic relational column probe applies to this kind.
    pub fn has_relational_columns(&self) -> bool {
        matches!(
            self,
            ObjectKind::Table
                | ObjectKind::View
                | ObjectKind::MaterializedView
                | ObjectKind::SystemTable
                | ObjectKind::SystemView
                | ObjectKind::TemporaryTable
        )
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.native_label())
    }
}

/// Canonical representation of a database object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub name: String,
    pub schema: Option<String>,
    pub catalog: Option<String>,
    pub kind: ObjectKind,
    pub remarks: Option<String>,
    /// Opaque vendor payload an extension may stash while listing
    /// (e.g. an OID, a recycle-bin marker). Never interpreted here.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub vendor_payload: serde_json::Value,
}

impl ObjectDescriptor {
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            schema: None,
            catalog: None,
            kind,
            remarks: None,
            vendor_payload: serde_json::Value::Null,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    /// Identity comparison used for de-duplication across listing sources.
    pub fn same_object(&self, other: &ObjectDescriptor) -> bool {
        self.name == other.name && self.schema == other.schema && self.catalog == other.catalog
    }
}

/// Normalized JDBC-class type codes.
///
/// Drivers report numeric type codes alongside the native type name;
/// the numeric values follow the `java.sql.Types` constants because that
/// is what every driver's metadata contract speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JdbcType {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    LongVarchar,
    Date,
    Time,
    Timestamp,
    TimestampWithTimezone,
    TimeWithTimezone,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    Clob,
    NClob,
    NChar,
    NVarchar,
    Boolean,
    Array,
    Struct,
    Ref,
    RowId,
    SqlXml,
    Other,
}

impl JdbcType {
    /// Map a driver-reported numeric type code to the normalized enum.
    /// Unknown codes collapse to `Other`.
    pub fn from_code(code: i32) -> Self {
        match code {
            -7 => JdbcType::Bit,
            -6 => JdbcType::TinyInt,
            5 => JdbcType::SmallInt,
            4 => JdbcType::Integer,
            -5 => JdbcType::BigInt,
            6 => JdbcType::Float,
            7 => JdbcType::Real,
            8 => JdbcType::Double,
            2 => JdbcType::Numeric,
            3 => JdbcType::Decimal,
            1 => JdbcType::Char,
            12 => JdbcType::Varchar,
            -1 => JdbcType::LongVarchar,
            91 => JdbcType::Date,
            92 => JdbcType::Time,
            93 => JdbcType::Timestamp,
            2014 => JdbcType::TimestampWithTimezone,
            2013 => JdbcType::TimeWithTimezone,
            -2 => JdbcType::Binary,
            -3 => JdbcType::VarBinary,
            -4 => JdbcType::LongVarBinary,
            2004 => JdbcType::Blob,
            2005 => JdbcType::Clob,
            2011 => JdbcType::NClob,
            -15 => JdbcType::NChar,
            -9 => JdbcType::NVarchar,
            16 => JdbcType::Boolean,
            2003 => JdbcType::Array,
            2002 => JdbcType::Struct,
            2006 => JdbcType::Ref,
            -8 => JdbcType::RowId,
            2009 => JdbcType::SqlXml,
            _ => JdbcType::Other,
        }
    }

    /// Numeric `java.sql.Types` value for this variant. `Other` maps to
    /// the JDBC `OTHER` constant.
    pub fn to_code(&self) -> i32 {
        match self {
            JdbcType::Bit => -7,
            JdbcType::TinyInt => -6,
            JdbcType::SmallInt => 5,
            JdbcType::Integer => 4,
            JdbcType::BigInt => -5,
            JdbcType::Float => 6,
            JdbcType::Real => 7,
            JdbcType::Double => 8,
            JdbcType::Numeric => 2,
            JdbcType::Decimal => 3,
            JdbcType::Char => 1,
            JdbcType::Varchar => 12,
            JdbcType::LongVarchar => -1,
            JdbcType::Date => 91,
            JdbcType::Time => 92,
            JdbcType::Timestamp => 93,
            JdbcType::TimestampWithTimezone => 2014,
            JdbcType::TimeWithTimezone => 2013,
            JdbcType::Binary => -2,
            JdbcType::VarBinary => -3,
            JdbcType::LongVarBinary => -4,
            JdbcType::Blob => 2004,
            JdbcType::Clob => 2005,
            JdbcType::NClob => 2011,
            JdbcType::NChar => -15,
            JdbcType::NVarchar => -9,
            JdbcType::Boolean => 16,
            JdbcType::Array => 2003,
            JdbcType::Struct => 2002,
            JdbcType::Ref => 2006,
            JdbcType::RowId => -8,
            JdbcType::SqlXml => 2009,
            JdbcType::Other => 1111,
        }
    }

    /// Whether a `(size)` or `(precision, scale)` argument belongs in the
    /// rendered type name.
    pub fn takes_size_argument(&self) -> bool {
        matches!(
            self,
            JdbcType::Char
                | JdbcType::Varchar
                | JdbcType::NChar
                | JdbcType::NVarchar
                | JdbcType::Binary
                | JdbcType::VarBinary
                | JdbcType::Numeric
                | JdbcType::Decimal
        )
    }

    pub fn is_character(&self) -> bool {
        matches!(
            self,
            JdbcType::Char
                | JdbcType::Varchar
                | JdbcType::LongVarchar
                | JdbcType::NChar
                | JdbcType::NVarchar
                | JdbcType::Clob
                | JdbcType::NClob
        )
    }
}

/// Column of a table, view or extension-handled object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// 1-based position within the defining object.
    pub ordinal: usize,
    /// Type name exactly as the driver reports it, including any literal
    /// list for enum/set pseudo-types once a fixup has resolved them.
    pub native_type: String,
    pub jdbc_type: JdbcType,
    pub size: Option<i64>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub nullable: bool,
    pub default_expression: Option<String>,
    pub generated: bool,
    /// Inline constraint text to append verbatim after the type
    /// (e.g. a column-level CHECK a dialect only reports inline).
    pub inline_constraint: Option<String>,
    pub comment: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, ordinal: usize, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ordinal,
            native_type: native_type.into(),
            jdbc_type: JdbcType::Other,
            size: None,
            precision: None,
            scale: None,
            nullable: true,
            default_expression: None,
            generated: false,
            inline_constraint: None,
            comment: None,
        }
    }

    pub fn with_jdbc_type(mut self, jdbc_type: JdbcType) -> Self {
        self.jdbc_type = jdbc_type;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.default_expression = Some(expression.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Table-level constraint kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    Check,
    Exclusion,
}

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDescriptor {
    pub name: Option<String>,
    pub kind: ConstraintKind,
    pub columns: Vec<String>,
    /// Expression body for check/exclusion constraints.
    pub expression: Option<String>,
}

impl ConstraintDescriptor {
    pub fn primary_key(name: Option<String>, columns: Vec<String>) -> Self {
        Self {
            name,
            kind: ConstraintKind::PrimaryKey,
            columns,
            expression: None,
        }
    }

    pub fn check(name: Option<String>, expression: impl Into<String>) -> Self {
        Self {
            name,
            kind: ConstraintKind::Check,
            columns: Vec::new(),
            expression: Some(expression.into()),
        }
    }
}

/// Referential action on a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FkRule {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl FkRule {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            FkRule::NoAction => "NO ACTION",
            FkRule::Restrict => "RESTRICT",
            FkRule::Cascade => "CASCADE",
            FkRule::SetNull => "SET NULL",
            FkRule::SetDefault => "SET DEFAULT",
        }
    }

    /// Settings-key fragment used when checking per-dialect action support.
    pub fn settings_key(&self) -> &'static str {
        match self {
            FkRule::NoAction => "noaction",
            FkRule::Restrict => "restrict",
            FkRule::Cascade => "cascade",
            FkRule::SetNull => "setnull",
            FkRule::SetDefault => "setdefault",
        }
    }
}

/// Constraint deferrability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Deferrability {
    #[default]
    NotDeferrable,
    InitiallyImmediate,
    InitiallyDeferred,
}

impl Deferrability {
    pub fn sql_clause(&self) -> Option<&'static str> {
        match self {
            Deferrability::NotDeferrable => None,
            Deferrability::InitiallyImmediate => Some("DEFERRABLE INITIALLY IMMEDIATE"),
            Deferrability::InitiallyDeferred => Some("DEFERRABLE INITIALLY DEFERRED"),
        }
    }
}

/// Match rule of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchRule {
    #[default]
    Simple,
    Full,
    Partial,
}

impl MatchRule {
    pub fn sql_clause(&self) -> Option<&'static str> {
        match self {
            MatchRule::Simple => None,
            MatchRule::Full => Some("MATCH FULL"),
            MatchRule::Partial => Some("MATCH PARTIAL"),
        }
    }
}

/// A directed foreign-key edge between two objects.
///
/// The FK graph for a single table's reconstruction is acyclic; across a
/// whole schema it may contain cycles (self- or mutually-referencing
/// tables), which the schema-export caller must break itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyEdge {
    pub name: Option<String>,
    pub source: ObjectDescriptor,
    pub target: ObjectDescriptor,
    /// Pairs of (source column, target column) in key order.
    pub column_pairs: Vec<(String, String)>,
    pub on_update: FkRule,
    pub on_delete: FkRule,
    pub deferrability: Deferrability,
    pub match_rule: MatchRule,
}

impl ForeignKeyEdge {
    pub fn source_columns(&self) -> Vec<&str> {
        self.column_pairs.iter().map(|(s, _)| s.as_str()).collect()
    }

    pub fn target_columns(&self) -> Vec<&str> {
        self.column_pairs.iter().map(|(_, t)| t.as_str()).collect()
    }
}

/// An index definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
    /// True when the index backs a primary-key or unique constraint and
    /// must not be re-created separately.
    pub constraint_backed: bool,
    /// Partial-index predicate, if any.
    pub filter_expression: Option<String>,
    /// Functional-index expression replacing the column list, if any.
    pub functional_expression: Option<String>,
}

impl IndexDescriptor {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            unique: false,
            constraint_backed: false,
            filter_expression: None,
            functional_expression: None,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_kind_from_native() {
        assert_eq!(ObjectKind::from_native("BASE TABLE"), ObjectKind::Table);
        assert_eq!(ObjectKind::from_native("view"), ObjectKind::View);
        assert_eq!(
            ObjectKind::from_native("Materialized View"),
            ObjectKind::MaterializedView
        );
        assert_eq!(ObjectKind::from_native("ALIAS"), ObjectKind::Synonym);
        assert_eq!(
            ObjectKind::from_native("EDGE TABLE"),
            ObjectKind::Custom("EDGE TABLE".to_string())
        );
    }

    #[test]
    fn test_jdbc_type_codes() {
        assert_eq!(JdbcType::from_code(12), JdbcType::Varchar);
        assert_eq!(JdbcType::from_code(2), JdbcType::Numeric);
        assert_eq!(JdbcType::from_code(93), JdbcType::Timestamp);
        assert_eq!(JdbcType::from_code(99999), JdbcType::Other);
        assert_eq!(JdbcType::Varchar.to_code(), 12);
        assert_eq!(JdbcType::from_code(JdbcType::Blob.to_code()), JdbcType::Blob);
        assert!(JdbcType::Decimal.takes_size_argument());
        assert!(!JdbcType::Date.takes_size_argument());
    }

    #[test]
    fn test_same_object_ignores_kind_and_remarks() {
        let a = ObjectDescriptor::new("orders", ObjectKind::Table).with_schema("public");
        let b = ObjectDescriptor::new("orders", ObjectKind::View)
            .with_schema("public")
            .with_remarks("fixed up later");
        assert!(a.same_object(&b));

        let c = ObjectDescriptor::new("orders", ObjectKind::Table).with_schema("sales");
        assert!(!a.same_object(&c));
    }

    #[test]
    fn test_fk_edge_column_accessors() {
        let edge = ForeignKeyEdge {
            name: Some("fk_orders_customer".to_string()),
            source: ObjectDescriptor::new("orders", ObjectKind::Table),
            target: ObjectDescriptor::new("customer", ObjectKind::Table),
            column_pairs: vec![
                ("customer_id".to_string(), "id".to_string()),
                ("customer_region".to_string(), "region".to_string()),
            ],
            on_update: FkRule::NoAction,
            on_delete: FkRule::Cascade,
            deferrability: Deferrability::NotDeferrable,
            match_rule: MatchRule::Simple,
        };
        assert_eq!(edge.source_columns(), vec!["customer_id", "customer_region"]);
        assert_eq!(edge.target_columns(), vec!["id", "region"]);
    }
}
