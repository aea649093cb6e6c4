//! Dialekt Core - shared model for the dialect engine
//!
//! This crate provides the types every other dialekt crate depends on:
//!
//! - `DialectId` / `VersionBand` - dialect identity and version banding
//! - `ObjectDescriptor`, `ColumnDescriptor`, constraint/FK/index
//!   descriptors - the canonical metadata model
//! - `MetadataConnection` - the probe surface of a live connection
//! - `ExecutionContext` - savepoint guards and the capability cache
//! - `DialektError` / `Result` - the error taxonomy

mod connection;
mod descriptor;
mod dialect_id;
mod error;
mod exec;
pub mod testing;
mod version;

pub use connection::*;
pub use descriptor::*;
pub use dialect_id::*;
pub use error::*;
pub use exec::*;
pub use version::*;
