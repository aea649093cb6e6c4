//! Dialekt Settings - layered dialect configuration
//!
//! This crate owns the settings resolution layer:
//!
//! - `PropertySpace` - the flat `<dialect>.<key>` property store
//! - `SettingsNamespace` - per-connection resolution (band -> dialect ->
//!   alias chain -> default)
//! - `DdlTemplate` / `TemplateValues` - placeholder templates for DDL
//! - `builtin_defaults()` - the shipped per-dialect defaults

mod builtin;
mod namespace;
mod properties;
mod template;

pub use builtin::*;
pub use namespace::*;
pub use properties::*;
pub use template::*;
