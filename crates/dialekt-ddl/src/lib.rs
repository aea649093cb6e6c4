//! Dialekt DDL - reconstruction of CREATE TABLE text
//!
//! Consumes the normalized model (descriptors, constraints, FK edges,
//! indexes) and emits re-executable SQL:
//!
//! - `DdlGenerator` - native retrieval or synthesis per dialect
//! - `TableDefinition` - one table's full structure, loadable through a
//!   coordinator
//! - clause builders for foreign keys, indexes and comments
//! - a small scanner for comment stripping and keyword location

mod builder;
mod comments;
mod foreign_key;
mod index;
pub mod scanner;

pub use builder::*;
pub use comments::comment_statements;
pub use foreign_key::{alter_statement as foreign_key_statement, is_system_generated};
pub use index::index_statements;
