//! Canonical dialect identifiers
//!
//! A `DialectId` is the opaque string key under which all per-dialect
//! behavior is registered: settings namespaces, quoting rules, extension
//! registrations. Exactly one id is chosen per connection and it never
//! changes for the connection's lifetime.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Canonical key for a database product's behavior profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialectId(Cow<'static, str>);

impl DialectId {
    pub const ORACLE: DialectId = DialectId(Cow::Borrowed("oracle"));
    pub const POSTGRESQL: DialectId = DialectId(Cow::Borrowed("postgresql"));
    pub const REDSHIFT: DialectId = DialectId(Cow::Borrowed("redshift"));
    pub const GREENPLUM: DialectId = DialectId(Cow::Borrowed("greenplum"));
    pub const COCKROACHDB: DialectId = DialectId(Cow::Borrowed("cockroachdb"));
    pub const YUGABYTE: DialectId = DialectId(Cow::Borrowed("yugabyte"));
    pub const MYSQL: DialectId = DialectId(Cow::Borrowed("mysql"));
    pub const MARIADB: DialectId = DialectId(Cow::Borrowed("mariadb"));
    pub const SQL_SERVER: DialectId = DialectId(Cow::Borrowed("sql_server"));
    pub const SYBASE: DialectId = DialectId(Cow::Borrowed("sybase"));
    pub const DB2: DialectId = DialectId(Cow::Borrowed("db2"));
    pub const DB2_ISERIES: DialectId = DialectId(Cow::Borrowed("db2_iseries"));
    pub const DB2_ZOS: DialectId = DialectId(Cow::Borrowed("db2_zos"));
    pub const H2: DialectId = DialectId(Cow::Borrowed("h2"));
    pub const HSQLDB: DialectId = DialectId(Cow::Borrowed("hsqldb"));
    pub const DERBY: DialectId = DialectId(Cow::Borrowed("derby"));
    pub const FIREBIRD: DialectId = DialectId(Cow::Borrowed("firebird"));
    pub const SQLITE: DialectId = DialectId(Cow::Borrowed("sqlite"));
    pub const DUCKDB: DialectId = DialectId(Cow::Borrowed("duckdb"));
    pub const CLICKHOUSE: DialectId = DialectId(Cow::Borrowed("clickhouse"));
    pub const SNOWFLAKE: DialectId = DialectId(Cow::Borrowed("snowflake"));
    pub const VERTICA: DialectId = DialectId(Cow::Borrowed("vertica"));
    pub const INFORMIX: DialectId = DialectId(Cow::Borrowed("informix"));
    pub const TERADATA: DialectId = DialectId(Cow::Borrowed("teradata"));
    pub const EXASOL: DialectId = DialectId(Cow::Borrowed("exasol"));
    pub const HANA: DialectId = DialectId(Cow::Borrowed("hana"));
    pub const MONETDB: DialectId = DialectId(Cow::Borrowed("monetdb"));
    pub const CUBRID: DialectId = DialectId(Cow::Borrowed("cubrid"));
    pub const MIMER: DialectId = DialectId(Cow::Borrowed("mimer"));

    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// Fallback identifier for an unrecognized product: lower-case the
    /// raw product name and squash everything non-alphanumeric to `_`.
    pub fn slugify(product_name: &str) -> Self {
        let mut slug = String::with_capacity(product_name.len());
        let mut last_was_sep = true;
        for c in product_name.trim().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
                last_was_sep = false;
            } else if !last_was_sep {
                slug.push('_');
                last_was_sep = true;
            }
        }
        while slug.ends_with('_') {
            slug.pop();
        }
        if slug.is_empty() {
            slug.push_str("unknown");
        }
        Self(Cow::Owned(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DialectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for DialectId {
    fn from(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(DialectId::slugify("Adaptive Server Anywhere").as_str(), "adaptive_server_anywhere");
        assert_eq!(DialectId::slugify("SQL/DS v2").as_str(), "sql_ds_v2");
        assert_eq!(DialectId::slugify("  Weird--DB  ").as_str(), "weird_db");
        assert_eq!(DialectId::slugify("").as_str(), "unknown");
    }

    #[test]
    fn test_const_ids_are_canonical() {
        assert_eq!(DialectId::SQL_SERVER.as_str(), "sql_server");
        assert_eq!(DialectId::from("oracle"), DialectId::ORACLE);
    }
}
