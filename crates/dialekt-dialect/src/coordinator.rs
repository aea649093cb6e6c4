//! Per-connection dialect coordinator.
//!
//! `DialectCoordinator::connect` runs the whole handshake once: detect
//! the dialect, band the version, build the settings namespace, probe
//! the quote character and catalog separator, assemble the table-type
//! vocabulary and select the applicable extensions. Everything after
//! detection degrades; only an unresolvable dialect or a dead
//! connection fails the handshake.
//!
//! Listing runs a fixed pipeline: native driver call, sequence and
//! synonym augmentation, extenders, enhancers, cleaners last.

use std::sync::Arc;

use dialekt_core::{
    ColumnDescriptor, DialectId, DialektError, ExecutionContext, ListingFilter,
    MetadataConnection, ObjectDescriptor, ObjectKind, Result, VersionBand,
};
use dialekt_settings::{PropertySpace, SettingsNamespace};

use crate::detect::{DetectionRule, default_rules, detect};
use crate::quoting::QuoteHandler;
use crate::registry::{DetailTable, ExtensionRegistry, ExtensionSet};
use crate::table_types;

pub struct DialectCoordinator {
    exec: Arc<ExecutionContext>,
    dialect: DialectId,
    version: VersionBand,
    settings: Arc<SettingsNamespace>,
    quoter: QuoteHandler,
    extensions: ExtensionSet,
    table_types: Vec<String>,
    catalog_separator: String,
}

impl DialectCoordinator {
    /// Handshake with the built-in detection rules.
    pub async fn connect(
        conn: Arc<dyn MetadataConnection>,
        space: Arc<PropertySpace>,
        registry: &ExtensionRegistry,
    ) -> Result<Self> {
        Self::connect_with_rules(conn, space, registry, &default_rules()).await
    }

    #[tracing::instrument(skip_all)]
    pub async fn connect_with_rules(
        conn: Arc<dyn MetadataConnection>,
        space: Arc<PropertySpace>,
        registry: &ExtensionRegistry,
        rules: &[DetectionRule],
    ) -> Result<Self> {
        if conn.is_closed() {
            return Err(DialektError::ConnectionClosed);
        }
        let exec = Arc::new(ExecutionContext::new(conn.clone()));
        let dialect = detect(&exec, rules).await?;
        let version = match conn.product_version().await {
            Ok(raw) => VersionBand::from_product_version(&raw).unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "product version unavailable, assuming 0.0");
                VersionBand::default()
            }
        };
        tracing::info!(dialect = %dialect, version = %version, "connection dialect resolved");

        let settings = Arc::new(SettingsNamespace::new(space, dialect.clone(), version));

        let probed_quote = match conn.identifier_quote_string().await {
            Ok(quote) if !quote.trim().is_empty() => quote,
            Ok(_) => "\"".to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "quote string probe failed, assuming double quote");
                "\"".to_string()
            }
        };
        let catalog_separator = match conn.catalog_separator().await {
            Ok(sep) if !sep.is_empty() => sep,
            Ok(_) => ".".to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "catalog separator probe failed, assuming dot");
                ".".to_string()
            }
        };

        let native_types =
            ExecutionContext::default_on_failure(conn.table_types().await, "table types")?;
        let table_types = table_types::build_vocabulary(native_types, &settings);
        let quoter = QuoteHandler::from_settings(settings.clone(), &probed_quote);
        let extensions = registry.for_connection(&dialect, version);

        Ok(Self {
            exec,
            dialect,
            version,
            settings,
            quoter,
            extensions,
            table_types,
            catalog_separator,
        })
    }

    pub fn dialect(&self) -> &DialectId {
        &self.dialect
    }

    pub fn version(&self) -> VersionBand {
        self.version
    }

    pub fn settings(&self) -> &SettingsNamespace {
        &self.settings
    }

    pub fn settings_arc(&self) -> Arc<SettingsNamespace> {
        self.settings.clone()
    }

    pub fn execution(&self) -> &ExecutionContext {
        &self.exec
    }

    pub fn quoter(&self) -> &QuoteHandler {
        &self.quoter
    }

    pub fn table_types(&self) -> &[String] {
        &self.table_types
    }

    pub fn catalog_separator(&self) -> &str {
        &self.catalog_separator
    }

    /// Normalize a caller-supplied filter component. `*` and `%` alone
    /// mean "everything" and become `None`; `*` wildcards become `%`;
    /// literal underscores are escaped where the driver supports it, so
    /// `MY_TABLE` does not also match `MYXTABLE`.
    fn clean_pattern(&self, input: Option<&str>, escape_underscores: bool) -> Option<String> {
        let value = input?.trim();
        if value.is_empty() || value == "*" || value == "%" {
            return None;
        }
        let mut pattern = value.replace('*', "%");
        if escape_underscores
            && pattern.contains('_')
            && self.exec.connection().supports_pattern_escaping()
            && self.settings.get_bool("metadata.escape_wildcards", false)
        {
            let escape = self.exec.connection().search_pattern_escape();
            pattern = pattern.replace('_', &format!("{escape}_"));
        }
        Some(pattern)
    }

    /// List objects of the requested kinds. An empty `kinds` slice asks
    /// for every type in the connection vocabulary. Failures inside the
    /// pipeline degrade to whatever was collected so far; repeated calls
    /// with the same arguments return the same result.
    #[tracing::instrument(skip(self), fields(dialect = %self.dialect))]
    pub async fn list_objects(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
        name_pattern: Option<&str>,
        kinds: &[ObjectKind],
    ) -> Result<Vec<ObjectDescriptor>> {
        let filter = ListingFilter {
            catalog: self.clean_pattern(catalog, false),
            schema: self.clean_pattern(schema, false),
            name: self.clean_pattern(name_pattern, true),
        };
        let requested: Vec<ObjectKind> = if kinds.is_empty() {
            self.table_types
                .iter()
                .map(|label| ObjectKind::from_native(label))
                .collect()
        } else {
            kinds.to_vec()
        };
        let handled = self.extensions.handled_kinds(&requested);

        let native_labels: Vec<String> = requested
            .iter()
            .filter(|kind| !handled.contains(kind))
            .filter(|kind| !matches!(kind, ObjectKind::Sequence | ObjectKind::Synonym))
            .map(|kind| kind.native_label().to_string())
            .collect();

        let mut objects: Vec<ObjectDescriptor> = if native_labels.is_empty() {
            Vec::new()
        } else {
            let conn = self.exec.connection().clone();
            ExecutionContext::default_on_failure(
                self.exec
                    .with_savepoint(|| async { conn.list_objects(&filter, &native_labels).await })
                    .await,
                "object listing",
            )?
        };

        if Self::wants(&requested, &ObjectKind::Sequence)
            && !handled.contains(&ObjectKind::Sequence)
            && self.settings.get_bool("sequence.supported", false)
            && !self.exec.is_recorded_unsupported("sequence listing")
        {
            let listed = self.exec.connection().list_sequences(&filter).await;
            self.merge_auxiliary("sequence listing", listed, &mut objects)?;
        }
        if Self::wants(&requested, &ObjectKind::Synonym)
            && !handled.contains(&ObjectKind::Synonym)
            && self.settings.get_bool("synonym.supported", false)
            && !self.exec.is_recorded_unsupported("synonym listing")
        {
            let listed = self.exec.connection().list_synonyms(&filter).await;
            self.merge_auxiliary("synonym listing", listed, &mut objects)?;
        }

        for extender in self.extensions.extenders() {
            if !requested.iter().any(|kind| extender.handles_kind(kind)) {
                continue;
            }
            if let Err(err) = extender
                .extend(&self.exec, &self.settings, &filter, &mut objects)
                .await
            {
                if err.is_fatal() {
                    return Err(err);
                }
                tracing::warn!(extension = extender.name(), error = %err, "extender failed, continuing");
            }
        }
        for enhancer in self.extensions.enhancers() {
            if let Err(err) = enhancer
                .enhance(&self.exec, &self.settings, &mut objects)
                .await
            {
                if err.is_fatal() {
                    return Err(err);
                }
                tracing::warn!(extension = enhancer.name(), error = %err, "enhancer failed, continuing");
            }
        }
        for cleaner in self.extensions.cleaners() {
            cleaner.clean(&self.settings, &mut objects);
        }
        Ok(objects)
    }

    fn wants(requested: &[ObjectKind], kind: &ObjectKind) -> bool {
        requested.iter().any(|k| k == kind)
    }

    /// Fold an auxiliary listing into the result set. A driver that
    /// reports the listing as unsupported is never asked again on this
    /// connection; other failures degrade per the usual policy.
    fn merge_auxiliary(
        &self,
        capability: &str,
        listed: Result<Vec<ObjectDescriptor>>,
        objects: &mut Vec<ObjectDescriptor>,
    ) -> Result<()> {
        if let Err(DialektError::Unsupported(_)) = &listed {
            self.exec.record_unsupported(capability);
        }
        let listed = ExecutionContext::default_on_failure(listed, capability)?;
        Self::merge_missing(objects, listed);
        Ok(())
    }

    fn merge_missing(objects: &mut Vec<ObjectDescriptor>, incoming: Vec<ObjectDescriptor>) {
        for candidate in incoming {
            if !objects.iter().any(|existing| existing.same_object(&candidate)) {
                objects.push(candidate);
            }
        }
    }

    /// Column set for one object. Non-relational kinds ask the extender
    /// that contributed them; everything else goes through the driver
    /// and the registered column fixups.
    #[tracing::instrument(skip(self, object), fields(object = %object.name))]
    pub async fn object_columns(&self, object: &ObjectDescriptor) -> Result<Vec<ColumnDescriptor>> {
        if !object.kind.has_relational_columns() {
            for extender in self.extensions.extenders() {
                if !extender.handles_kind(&object.kind) {
                    continue;
                }
                match extender.columns(&self.exec, &self.settings, object).await {
                    Ok(columns) => return Ok(columns),
                    Err(DialektError::Unsupported(_)) => continue,
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => {
                        tracing::warn!(extension = extender.name(), error = %err, "extension column lookup failed");
                        return Ok(Vec::new());
                    }
                }
            }
            tracing::debug!(kind = ?object.kind, "object kind has no relational columns");
            return Ok(Vec::new());
        }

        let conn = self.exec.connection().clone();
        let mut columns = ExecutionContext::default_on_failure(
            self.exec
                .with_savepoint(|| async { conn.list_columns(object).await })
                .await,
            "column listing",
        )?;
        for fixup in self.extensions.column_fixups() {
            if let Err(err) = fixup
                .fix(&self.exec, &self.settings, object, &mut columns)
                .await
            {
                if err.is_fatal() {
                    return Err(err);
                }
                tracing::warn!(extension = fixup.name(), error = %err, "column fixup failed, keeping driver columns");
            }
        }
        Ok(columns)
    }

    /// Source text for an object served by an extender. Errors with
    /// [`DialektError::NoConfiguration`] when nothing can provide it.
    pub async fn object_source(&self, object: &ObjectDescriptor) -> Result<String> {
        for extender in self.extensions.extenders() {
            if !extender.handles_kind(&object.kind) {
                continue;
            }
            match extender.object_source(&self.exec, &self.settings, object).await {
                Err(DialektError::NoConfiguration(_)) => continue,
                other => return other,
            }
        }
        Err(DialektError::NoConfiguration(format!(
            "no source retrieval for {} objects",
            object.kind.native_label()
        )))
    }

    /// Vendor detail sub-tables for an object, empty when no extender
    /// claims its kind.
    pub async fn object_details(&self, object: &ObjectDescriptor) -> Result<Vec<DetailTable>> {
        for extender in self.extensions.extenders() {
            if extender.handles_kind(&object.kind) {
                return extender
                    .detail_tables(&self.exec, &self.settings, object)
                    .await;
            }
        }
        Ok(Vec::new())
    }

    /// Follow a synonym to its target. Broken or unresolvable links
    /// return the synonym itself, logged rather than failed.
    pub async fn resolve_synonym(&self, object: &ObjectDescriptor) -> ObjectDescriptor {
        if object.kind != ObjectKind::Synonym
            || !self.settings.get_bool("synonym.supported", false)
        {
            return object.clone();
        }
        match self.exec.connection().synonym_target(object).await {
            Ok(Some(target)) => target,
            Ok(None) => {
                tracing::warn!(synonym = %object.name, "synonym target missing, keeping synonym");
                object.clone()
            }
            Err(err) => {
                tracing::warn!(synonym = %object.name, error = %err, "synonym resolution failed");
                object.clone()
            }
        }
    }

    /// Fully qualified, quoted name for an object.
    pub fn qualified_name(&self, object: &ObjectDescriptor) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(catalog) = &object.catalog {
            parts.push(self.quoter.quote_if_needed(catalog));
        }
        if let Some(schema) = &object.schema {
            parts.push(self.quoter.quote_if_needed(schema));
        }
        parts.push(self.quoter.quote_if_needed(&object.name));
        parts.join(&self.catalog_separator)
    }

    pub fn quote_if_needed(&self, name: &str) -> String {
        self.quoter.quote_if_needed(name)
    }

    pub fn adjust_object_name_case(&self, name: &str) -> String {
        self.quoter.adjust_object_name_case(name)
    }

    pub fn adjust_schema_name_case(&self, name: &str) -> String {
        self.quoter.adjust_schema_name_case(name)
    }
}
