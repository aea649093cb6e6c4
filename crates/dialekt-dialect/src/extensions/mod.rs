//! Built-in vendor extensions.
//!
//! Each submodule covers one product family. `register_defaults` wires
//! them into a registry with the dialect and minimum version they need.

mod duckdb;
mod mssql;
mod mysql;
mod oracle;
mod postgres;

use std::sync::Arc;

use dialekt_core::{DialectId, VersionBand};

use crate::registry::ExtensionRegistry;

pub use duckdb::MacroExtender;
pub use mssql::SystemObjectCleaner;
pub use mysql::EnumColumnFixup;
pub use oracle::RecycleBinCleaner;
pub use postgres::{DomainExtender, MaterializedViewEnhancer};

pub(crate) fn register_defaults(registry: &mut ExtensionRegistry) {
    // Materialized views joined the PostgreSQL catalog in 9.3.
    registry.register_enhancer(
        DialectId::POSTGRESQL,
        VersionBand::new(9, 3),
        Arc::new(MaterializedViewEnhancer),
    );
    registry.register_extender(
        DialectId::POSTGRESQL,
        VersionBand::new(7, 3),
        Arc::new(DomainExtender),
    );
    registry.register_column_fixup(
        DialectId::MYSQL,
        VersionBand::default(),
        Arc::new(EnumColumnFixup),
    );
    registry.register_column_fixup(
        DialectId::MARIADB,
        VersionBand::default(),
        Arc::new(EnumColumnFixup),
    );
    // The recycle bin appeared with Oracle 10g.
    registry.register_cleaner(
        DialectId::ORACLE,
        VersionBand::new(10, 0),
        Arc::new(RecycleBinCleaner),
    );
    registry.register_cleaner(
        DialectId::SQL_SERVER,
        VersionBand::default(),
        Arc::new(SystemObjectCleaner),
    );
    registry.register_extender(
        DialectId::DUCKDB,
        VersionBand::default(),
        Arc::new(MacroExtender),
    );
}
