//! Dialect detection from a live connection.
//!
//! Detection walks an ordered rule list against the reported product
//! name (case-insensitive). Forks that report their base product's name
//! sit ahead of the base product and carry a supplemental probe: the
//! probe must return at least one row for the fork to claim the
//! connection, otherwise matching falls through to the next rule. When
//! no rule matches, the product name is slugified into an ad-hoc
//! dialect id so the connection still works with generic settings.

use dialekt_core::{DialectId, DialektError, ExecutionContext, MetadataConnection, Result};

/// How a rule matches the lowercased product name.
#[derive(Debug, Clone, Copy)]
pub enum NameMatch {
    Contains(&'static str),
    StartsWith(&'static str),
    Equals(&'static str),
}

impl NameMatch {
    fn matches(&self, lower: &str) -> bool {
        match self {
            NameMatch::Contains(needle) => lower.contains(needle),
            NameMatch::StartsWith(prefix) => lower.starts_with(prefix),
            NameMatch::Equals(exact) => lower == *exact,
        }
    }
}

/// Confirmation query for forks that masquerade as their base product.
#[derive(Debug, Clone, Copy)]
pub struct ProbeCheck {
    pub sql: &'static str,
    pub description: &'static str,
}

/// One entry in the ordered detection table.
#[derive(Debug, Clone)]
pub struct DetectionRule {
    pub id: DialectId,
    pub matcher: NameMatch,
    pub probe: Option<ProbeCheck>,
}

impl DetectionRule {
    fn plain(id: DialectId, matcher: NameMatch) -> Self {
        Self {
            id,
            matcher,
            probe: None,
        }
    }

    fn probed(id: DialectId, matcher: NameMatch, sql: &'static str, description: &'static str) -> Self {
        Self {
            id,
            matcher,
            probe: Some(ProbeCheck { sql, description }),
        }
    }
}

/// The built-in detection table. Order matters: forks first, then base
/// products, most specific name first.
pub fn default_rules() -> Vec<DetectionRule> {
    use NameMatch::{Contains, Equals, StartsWith};
    vec![
        // PostgreSQL forks. Most report "PostgreSQL" verbatim, so each
        // gets a probe against a catalog object only the fork has.
        DetectionRule::plain(DialectId::REDSHIFT, Contains("redshift")),
        DetectionRule::probed(
            DialectId::REDSHIFT,
            Contains("postgres"),
            "SELECT 1 FROM svv_table_info LIMIT 1",
            "Redshift system view",
        ),
        DetectionRule::plain(DialectId::GREENPLUM, Contains("greenplum")),
        DetectionRule::probed(
            DialectId::GREENPLUM,
            Contains("postgres"),
            "SELECT 1 FROM gp_distribution_policy LIMIT 1",
            "Greenplum distribution catalog",
        ),
        DetectionRule::plain(DialectId::COCKROACHDB, Contains("cockroach")),
        DetectionRule::probed(
            DialectId::COCKROACHDB,
            Contains("postgres"),
            "SELECT 1 FROM crdb_internal.zones LIMIT 1",
            "CockroachDB internal schema",
        ),
        DetectionRule::plain(DialectId::YUGABYTE, Contains("yugabyte")),
        DetectionRule::probed(
            DialectId::YUGABYTE,
            Contains("postgres"),
            "SELECT 1 FROM yb_servers() LIMIT 1",
            "YugabyteDB server function",
        ),
        DetectionRule::plain(DialectId::POSTGRESQL, Contains("postgres")),
        // MariaDB servers frequently report plain "MySQL".
        DetectionRule::plain(DialectId::MARIADB, Contains("mariadb")),
        DetectionRule::probed(
            DialectId::MARIADB,
            Contains("mysql"),
            "SELECT 1 WHERE VERSION() LIKE '%MariaDB%'",
            "MariaDB version banner",
        ),
        DetectionRule::plain(DialectId::MYSQL, Contains("mysql")),
        DetectionRule::plain(DialectId::SYBASE, Contains("adaptive server")),
        DetectionRule::plain(DialectId::SYBASE, Contains("sybase")),
        DetectionRule::plain(DialectId::SQL_SERVER, Contains("sql server")),
        DetectionRule::plain(DialectId::ORACLE, Contains("oracle")),
        // DB2 platform variants before the LUW base product.
        DetectionRule::plain(DialectId::DB2_ISERIES, Contains("as/400")),
        DetectionRule::plain(DialectId::DB2_ISERIES, Contains("db2 udb for as")),
        DetectionRule::plain(DialectId::DB2_ZOS, StartsWith("db2/z")),
        DetectionRule::plain(DialectId::DB2_ZOS, Contains("dsn")),
        DetectionRule::plain(DialectId::DB2, Contains("db2")),
        DetectionRule::plain(DialectId::H2, Equals("h2")),
        DetectionRule::plain(DialectId::HSQLDB, Contains("hsql")),
        DetectionRule::plain(DialectId::DERBY, Contains("derby")),
        DetectionRule::plain(DialectId::FIREBIRD, Contains("firebird")),
        DetectionRule::plain(DialectId::SQLITE, Contains("sqlite")),
        DetectionRule::plain(DialectId::DUCKDB, Contains("duckdb")),
        DetectionRule::plain(DialectId::CLICKHOUSE, Contains("clickhouse")),
        DetectionRule::plain(DialectId::SNOWFLAKE, Contains("snowflake")),
        DetectionRule::plain(DialectId::VERTICA, Contains("vertica")),
        DetectionRule::plain(DialectId::INFORMIX, Contains("informix")),
        DetectionRule::plain(DialectId::TERADATA, Contains("teradata")),
        DetectionRule::plain(DialectId::EXASOL, Contains("exasol")),
        DetectionRule::plain(DialectId::HANA, Contains("hana")),
        DetectionRule::plain(DialectId::HANA, Equals("hdb")),
        DetectionRule::plain(DialectId::MONETDB, Contains("monetdb")),
        DetectionRule::plain(DialectId::CUBRID, Contains("cubrid")),
        DetectionRule::plain(DialectId::MIMER, Contains("mimer")),
    ]
}

/// Resolve the dialect for a connection. A missing product name is the
/// one hard failure; probe errors only skip the rule that needed them.
///
/// Probe queries run through the execution context's savepoint guard.
/// Inside an open transaction a failing probe would otherwise abort the
/// transaction and poison every later metadata read.
pub async fn detect(ctx: &ExecutionContext, rules: &[DetectionRule]) -> Result<DialectId> {
    let raw = ctx
        .connection()
        .product_name()
        .await
        .map_err(|err| DialektError::DialectUnresolved(err.to_string()))?;
    if raw.trim().is_empty() {
        return Err(DialektError::DialectUnresolved(
            "driver reported an empty product name".to_string(),
        ));
    }
    let lower = raw.to_lowercase();
    for rule in rules {
        if !rule.matcher.matches(&lower) {
            continue;
        }
        match &rule.probe {
            None => {
                tracing::debug!(dialect = %rule.id, product = %raw, "dialect matched by name");
                return Ok(rule.id.clone());
            }
            Some(probe) => {
                let conn = ctx.connection().clone();
                let probed = ctx
                    .with_savepoint(|| async { conn.query(probe.sql).await })
                    .await;
                match probed {
                    Ok(rows) if !rows.is_empty() => {
                        tracing::debug!(
                            dialect = %rule.id,
                            check = probe.description,
                            "dialect confirmed by probe"
                        );
                        return Ok(rule.id.clone());
                    }
                    Ok(_) => {
                        tracing::debug!(
                            dialect = %rule.id,
                            check = probe.description,
                            "probe returned no rows, falling through"
                        );
                    }
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => {
                        tracing::debug!(
                            dialect = %rule.id,
                            check = probe.description,
                            error = %err,
                            "probe failed, falling through"
                        );
                    }
                }
            }
        }
    }
    let fallback = DialectId::slugify(&raw);
    tracing::info!(product = %raw, dialect = %fallback, "unknown product, using slug dialect");
    Ok(fallback)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dialekt_core::MetadataRow;
    use dialekt_core::testing::ScriptedConnection;

    use super::*;

    fn context_for(conn: ScriptedConnection) -> ExecutionContext {
        ExecutionContext::new(Arc::new(conn))
    }

    #[tokio::test]
    async fn test_detects_base_product_by_name() {
        let ctx = context_for(ScriptedConnection::new("PostgreSQL", "15.2"));
        let id = detect(&ctx, &default_rules()).await.unwrap();
        assert_eq!(id, DialectId::POSTGRESQL);
    }

    #[tokio::test]
    async fn test_fork_wins_when_probe_confirms() {
        let ctx = context_for(ScriptedConnection::new("PostgreSQL", "8.0.2").with_query_result(
            "SELECT 1 FROM svv_table_info LIMIT 1",
            vec![MetadataRow::from_strs(&["1"])],
        ));
        let id = detect(&ctx, &default_rules()).await.unwrap();
        assert_eq!(id, DialectId::REDSHIFT);
    }

    #[tokio::test]
    async fn test_failed_probes_fall_through_to_base() {
        // No scripted queries at all, so every fork probe errors out.
        let ctx = context_for(ScriptedConnection::new("PostgreSQL 15.2 on x86_64", "15.2"));
        let id = detect(&ctx, &default_rules()).await.unwrap();
        assert_eq!(id, DialectId::POSTGRESQL);
    }

    #[tokio::test]
    async fn test_failed_probes_roll_back_their_savepoints() {
        // Inside a transaction (auto-commit off) every failing fork probe
        // must be undone, or it would abort the whole transaction.
        let conn = Arc::new(ScriptedConnection::new("PostgreSQL", "15.2"));
        let ctx = ExecutionContext::new(conn.clone());
        let id = detect(&ctx, &default_rules()).await.unwrap();
        assert_eq!(id, DialectId::POSTGRESQL);

        let statements = conn.executed_statements();
        assert!(statements.iter().any(|sql| sql.starts_with("SAVEPOINT ")));
        assert!(
            statements
                .iter()
                .any(|sql| sql.starts_with("ROLLBACK TO SAVEPOINT "))
        );
        assert_eq!(ctx.open_savepoints(), 0);
    }

    #[tokio::test]
    async fn test_mariadb_behind_mysql_banner() {
        let ctx = context_for(ScriptedConnection::new("MySQL", "10.6.12").with_query_result(
            "SELECT 1 WHERE VERSION() LIKE '%MariaDB%'",
            vec![MetadataRow::from_strs(&["1"])],
        ));
        let id = detect(&ctx, &default_rules()).await.unwrap();
        assert_eq!(id, DialectId::MARIADB);
    }

    #[tokio::test]
    async fn test_unknown_product_slugifies() {
        let ctx = context_for(ScriptedConnection::new("Frobnitz DB 3000", "1.0"));
        let id = detect(&ctx, &default_rules()).await.unwrap();
        assert_eq!(id.as_str(), "frobnitz_db_3000");
    }

    #[tokio::test]
    async fn test_missing_product_name_is_fatal() {
        let ctx = context_for(ScriptedConnection::new("", "1.0"));
        let err = detect(&ctx, &default_rules()).await.unwrap_err();
        assert!(err.is_fatal());
    }
}
