//! Extension registry for the object-listing pipeline.
//!
//! Three extension points hook into listing, always in this order:
//!
//! - `ObjectListExtender` - contributes objects the driver cannot list
//!   natively, and may also serve columns and source text for them
//! - `ObjectListEnhancer` - mutates descriptors already in the list
//!   (reclassifying kinds, filling remarks)
//! - `ObjectListCleaner` - removes noise entries, always last
//!
//! Registrations are keyed by dialect id plus a minimum version band,
//! so an extension only activates on connections new enough to have the
//! catalog objects it probes.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use dialekt_core::{
    ColumnDescriptor, DialectId, DialektError, ExecutionContext, ListingFilter, MetadataRow,
    ObjectDescriptor, ObjectKind, Result, VersionBand,
};
use dialekt_settings::SettingsNamespace;

use crate::extensions;

/// A vendor-specific sub-table attached to an object, e.g. the
/// parameter list of a macro.
#[derive(Debug, Clone)]
pub struct DetailTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<MetadataRow>,
}

/// Adds objects the native listing cannot see.
#[async_trait]
pub trait ObjectListExtender: Send + Sync {
    fn name(&self) -> &'static str;

    /// Object kinds this extender is the authority for. Native listing
    /// is skipped for a kind when an extender claims it.
    fn handles_kind(&self, kind: &ObjectKind) -> bool;

    async fn extend(
        &self,
        ctx: &ExecutionContext,
        settings: &SettingsNamespace,
        filter: &ListingFilter,
        objects: &mut Vec<ObjectDescriptor>,
    ) -> Result<()>;

    /// Column set for an object this extender contributed.
    async fn columns(
        &self,
        _ctx: &ExecutionContext,
        _settings: &SettingsNamespace,
        object: &ObjectDescriptor,
    ) -> Result<Vec<ColumnDescriptor>> {
        Err(DialektError::Unsupported(format!(
            "columns for {}",
            object.name
        )))
    }

    /// Source text for an object this extender contributed.
    async fn object_source(
        &self,
        _ctx: &ExecutionContext,
        _settings: &SettingsNamespace,
        object: &ObjectDescriptor,
    ) -> Result<String> {
        Err(DialektError::NoConfiguration(format!(
            "source retrieval for {}",
            object.name
        )))
    }

    /// Vendor sub-tables shown alongside the object.
    async fn detail_tables(
        &self,
        _ctx: &ExecutionContext,
        _settings: &SettingsNamespace,
        _object: &ObjectDescriptor,
    ) -> Result<Vec<DetailTable>> {
        Ok(Vec::new())
    }
}

/// Mutates descriptors already collected.
#[async_trait]
pub trait ObjectListEnhancer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn enhance(
        &self,
        ctx: &ExecutionContext,
        settings: &SettingsNamespace,
        objects: &mut Vec<ObjectDescriptor>,
    ) -> Result<()>;
}

/// Drops noise entries. Cleaners are synchronous and run last.
pub trait ObjectListCleaner: Send + Sync {
    fn name(&self) -> &'static str;

    fn clean(&self, settings: &SettingsNamespace, objects: &mut Vec<ObjectDescriptor>);
}

/// Post-processes a column listing, e.g. restoring enum literal lists
/// a driver flattened away.
#[async_trait]
pub trait ColumnFixup: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fix(
        &self,
        ctx: &ExecutionContext,
        settings: &SettingsNamespace,
        object: &ObjectDescriptor,
        columns: &mut Vec<ColumnDescriptor>,
    ) -> Result<()>;
}

struct Registration<T: ?Sized> {
    dialect: DialectId,
    min_version: VersionBand,
    extension: Arc<T>,
}

impl<T: ?Sized> Registration<T> {
    fn applies(&self, dialect: &DialectId, version: VersionBand) -> bool {
        self.dialect == *dialect && self.min_version.qualifies_for(version)
    }
}

/// Process-level registry. Built once, then projected per connection
/// into an [`ExtensionSet`].
#[derive(Default)]
pub struct ExtensionRegistry {
    extenders: Vec<Registration<dyn ObjectListExtender>>,
    enhancers: Vec<Registration<dyn ObjectListEnhancer>>,
    cleaners: Vec<Registration<dyn ObjectListCleaner>>,
    column_fixups: Vec<Registration<dyn ColumnFixup>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in vendor extensions.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        extensions::register_defaults(&mut registry);
        registry
    }

    pub fn register_extender(
        &mut self,
        dialect: DialectId,
        min_version: VersionBand,
        extension: Arc<dyn ObjectListExtender>,
    ) {
        tracing::debug!(dialect = %dialect, min = %min_version, extension = extension.name(), "registering extender");
        self.extenders.push(Registration {
            dialect,
            min_version,
            extension,
        });
    }

    pub fn register_enhancer(
        &mut self,
        dialect: DialectId,
        min_version: VersionBand,
        extension: Arc<dyn ObjectListEnhancer>,
    ) {
        tracing::debug!(dialect = %dialect, min = %min_version, extension = extension.name(), "registering enhancer");
        self.enhancers.push(Registration {
            dialect,
            min_version,
            extension,
        });
    }

    pub fn register_cleaner(
        &mut self,
        dialect: DialectId,
        min_version: VersionBand,
        extension: Arc<dyn ObjectListCleaner>,
    ) {
        tracing::debug!(dialect = %dialect, min = %min_version, extension = extension.name(), "registering cleaner");
        self.cleaners.push(Registration {
            dialect,
            min_version,
            extension,
        });
    }

    pub fn register_column_fixup(
        &mut self,
        dialect: DialectId,
        min_version: VersionBand,
        extension: Arc<dyn ColumnFixup>,
    ) {
        tracing::debug!(dialect = %dialect, min = %min_version, extension = extension.name(), "registering column fixup");
        self.column_fixups.push(Registration {
            dialect,
            min_version,
            extension,
        });
    }

    /// The extensions active for one connection.
    pub fn for_connection(&self, dialect: &DialectId, version: VersionBand) -> ExtensionSet {
        ExtensionSet {
            extenders: self
                .extenders
                .iter()
                .filter(|reg| reg.applies(dialect, version))
                .map(|reg| reg.extension.clone())
                .collect(),
            enhancers: self
                .enhancers
                .iter()
                .filter(|reg| reg.applies(dialect, version))
                .map(|reg| reg.extension.clone())
                .collect(),
            cleaners: self
                .cleaners
                .iter()
                .filter(|reg| reg.applies(dialect, version))
                .map(|reg| reg.extension.clone())
                .collect(),
            column_fixups: self
                .column_fixups
                .iter()
                .filter(|reg| reg.applies(dialect, version))
                .map(|reg| reg.extension.clone())
                .collect(),
        }
    }
}

/// The slice of the registry that applies to one connection.
#[derive(Default)]
pub struct ExtensionSet {
    extenders: Vec<Arc<dyn ObjectListExtender>>,
    enhancers: Vec<Arc<dyn ObjectListEnhancer>>,
    cleaners: Vec<Arc<dyn ObjectListCleaner>>,
    column_fixups: Vec<Arc<dyn ColumnFixup>>,
}

impl ExtensionSet {
    pub fn extenders(&self) -> &[Arc<dyn ObjectListExtender>] {
        &self.extenders
    }

    pub fn enhancers(&self) -> &[Arc<dyn ObjectListEnhancer>] {
        &self.enhancers
    }

    pub fn cleaners(&self) -> &[Arc<dyn ObjectListCleaner>] {
        &self.cleaners
    }

    pub fn column_fixups(&self) -> &[Arc<dyn ColumnFixup>] {
        &self.column_fixups
    }

    /// Kinds whose listing is served by an extender instead of the
    /// native driver call.
    pub fn handled_kinds(&self, candidates: &[ObjectKind]) -> HashSet<ObjectKind> {
        candidates
            .iter()
            .filter(|kind| self.extenders.iter().any(|ext| ext.handles_kind(kind)))
            .cloned()
            .collect()
    }
}
