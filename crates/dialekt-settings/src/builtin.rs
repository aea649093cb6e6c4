//! Built-in dialect settings
//!
//! The shipped defaults for every dialect the engine knows about, as an
//! embedded TOML document. User configuration overlays on top of this
//! via [`PropertySpace::merge`]; nothing here is special-cased in code.

use crate::PropertySpace;
use std::sync::LazyLock;

/// Shipped per-dialect settings. Section names are dialect ids, with
/// `<dialect>_<major>_<minor>` sections holding version-banded overrides.
pub static BUILTIN_SETTINGS: &str = r##"
[oracle]
"case.objects" = "upper"
reservedwords = ["LEVEL", "ROWNUM", "ROWID", "SYSDATE", "CONNECT", "START", "COMMENT", "AUDIT"]
"sequence.supported" = true
"synonym.supported" = true
"tabletypes.ignore" = ["INDEX"]
"constraint.systemname.pattern" = "^SYS_C[0-9]+$"
"ddl.retrieve.table" = "SELECT dbms_metadata.get_ddl('TABLE', '%object_name%', '%schema_name%') FROM dual"
"ddl.retrieve.reformat" = true
"ddl.drop.cascade" = " CASCADE CONSTRAINTS"
"fk.supported_update_rules" = ["noaction"]
"fk.supported_delete_rules" = ["noaction", "cascade", "setnull"]

[oracle_12_1]
"identity.columns" = true

[postgresql]
"case.objects" = "lower"
reservedwords = ["USER", "ORDER", "GROUP", "CHECK", "COLUMN", "SELECT", "TABLE", "WHERE"]
"sequence.supported" = true
supports_extensions = false
"fk.match.enforced" = true
"constraint.systemname.pattern" = "^[a-z0-9_]+_(pkey|fkey|key|check)[0-9]*$"
"ddl.comment.table.template" = "COMMENT ON TABLE %table_name% IS '%comment%';"
"ddl.comment.column.template" = "COMMENT ON COLUMN %table_name%.%column_name% IS '%comment%';"

[postgresql_8_3]
"window.functions" = true

[postgresql_9_1]
supports_extensions = true

[postgresql_9_3]
"matview.supported" = true

[redshift]
alias = "postgresql"
"sequence.supported" = false
supports_extensions = false

[greenplum]
alias = "postgresql"

[cockroachdb]
alias = "postgresql"
"sequence.supported" = true

[yugabyte]
alias = "postgresql"

[mysql]
"quote.char" = "`"
"case.objects" = "mixed"
reservedwords = ["KEY", "INDEX", "GROUPS", "RANK", "ORDER", "GROUP"]
"metadata.escape_wildcards" = true
"constraint.systemname.pattern" = "^(PRIMARY|[a-z_]+_ibfk_[0-9]+)$"
"ddl.retrieve.table" = "SHOW CREATE TABLE %full_name%"
"ddl.table_options" = "ENGINE=InnoDB"
"ddl.fk.auto_index" = true
"ddl.comment.inline" = true
"fk.supported_update_rules" = ["noaction", "restrict", "cascade", "setnull"]
"fk.supported_delete_rules" = ["noaction", "restrict", "cascade", "setnull"]

[mysql_8_0]
"check.constraints" = true

[mariadb]
alias = "mysql"

[mariadb_10_3]
"sequence.supported" = true

[sql_server]
"quote.brackets" = true
"case.objects" = "mixed"
reservedwords = ["USER", "ORDER", "KEY", "TOP", "PERCENT"]
"constraint.systemname.pattern" = "^(PK|FK|DF|UQ)__[A-Za-z0-9_]+__[A-Za-z0-9]+$"
"ddl.drop.cascade" = ""
"fk.supported_update_rules" = ["noaction", "cascade", "setnull", "setdefault"]
"fk.supported_delete_rules" = ["noaction", "cascade", "setnull", "setdefault"]

[sql_server_11_0]
"sequence.supported" = true

[sybase]
alias = "sql_server"
"quote.brackets" = true

[db2]
"case.objects" = "upper"
"sequence.supported" = true
"synonym.supported" = true
reservedwords = ["CURRENT", "FETCH", "FIRST"]

[db2_iseries]
alias = "db2"

[db2_zos]
alias = "db2"

[h2]
"case.objects" = "upper"
"sequence.supported" = true
"ddl.pk.inline" = true

[hsqldb]
"case.objects" = "upper"
"sequence.supported" = true

[derby]
"case.objects" = "upper"
"constraint.systemname.pattern" = "^SQL[0-9]+$"

[firebird]
"case.objects" = "upper"
"sequence.supported" = true
reservedwords = ["POSITION", "VALUE"]
"constraint.systemname.pattern" = "^INTEG_[0-9]+$"

[sqlite]
"case.objects" = "mixed"
"ddl.pk.inline" = true
"ddl.fk.inline" = true
"ddl.retrieve.table" = "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = '%object_name%'"
"fk.supported_update_rules" = ["noaction", "restrict", "cascade", "setnull", "setdefault"]
"fk.supported_delete_rules" = ["noaction", "restrict", "cascade", "setnull", "setdefault"]

[duckdb]
"case.objects" = "mixed"
"sequence.supported" = true
"ddl.pk.inline" = true
"tabletypes.extra" = ["MACRO"]

[clickhouse]
"case.objects" = "mixed"
"quote.char" = "`"
"ddl.retrieve.table" = "SHOW CREATE TABLE %full_name%"
"ddl.table_options" = "ENGINE = MergeTree()"
"fk.supported_update_rules" = []
"fk.supported_delete_rules" = []

[snowflake]
"case.objects" = "upper"
"sequence.supported" = true
"ddl.retrieve.table" = "SELECT get_ddl('TABLE', '%full_name%')"

[vertica]
"case.objects" = "mixed"
"sequence.supported" = true

[informix]
"case.objects" = "lower"
"quote.never" = true
"synonym.supported" = true

[teradata]
"case.objects" = "upper"
"tabletypes.extra" = ["MACRO"]
"ddl.retrieve.table" = "SHOW TABLE %full_name%"

[exasol]
"case.objects" = "upper"

[hana]
"case.objects" = "upper"
"sequence.supported" = true
"synonym.supported" = true

[monetdb]
"case.objects" = "lower"
"sequence.supported" = true

[cubrid]
"case.objects" = "lower"

[mimer]
"case.objects" = "upper"
"sequence.supported" = true
"##;

/// The parsed shipped defaults.
pub static BUILTIN: LazyLock<PropertySpace> = LazyLock::new(|| {
    PropertySpace::from_toml_str(BUILTIN_SETTINGS).expect("embedded dialect settings are valid TOML")
});

/// A fresh copy of the shipped defaults, ready for user overlays.
pub fn builtin_defaults() -> PropertySpace {
    BUILTIN.clone()
}
