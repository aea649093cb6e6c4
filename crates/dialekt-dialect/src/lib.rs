//! Dialekt Dialect - detection, quoting and the listing pipeline
//!
//! The runtime half of the dialect engine:
//!
//! - `detect` / `DetectionRule` - resolve the dialect from a live
//!   connection, forks before base products
//! - `QuoteHandler` - identifier quoting and case folding
//! - `ExtensionRegistry` - extender/enhancer/cleaner hooks
//! - `DialectCoordinator` - the per-connection handshake and the
//!   object-listing pipeline

mod coordinator;
mod detect;
pub mod extensions;
mod quoting;
mod registry;
mod table_types;

pub use coordinator::*;
pub use detect::*;
pub use quoting::*;
pub use registry::*;
pub use table_types::build_vocabulary;
