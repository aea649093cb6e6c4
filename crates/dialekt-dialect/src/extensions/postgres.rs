//! PostgreSQL family extensions.

use async_trait::async_trait;

use dialekt_core::{
    ExecutionContext, ListingFilter, ObjectDescriptor, ObjectKind, Result,
};
use dialekt_settings::SettingsNamespace;

use crate::registry::{ObjectListEnhancer, ObjectListExtender};

const MATVIEW_SQL: &str =
    "SELECT schemaname, matviewname FROM pg_catalog.pg_matviews";

/// Older drivers report materialized views as plain tables or views.
/// This enhancer reclassifies them using `pg_matviews`.
pub struct MaterializedViewEnhancer;

#[async_trait]
impl ObjectListEnhancer for MaterializedViewEnhancer {
    fn name(&self) -> &'static str {
        "postgres-matview-enhancer"
    }

    async fn enhance(
        &self,
        ctx: &ExecutionContext,
        _settings: &SettingsNamespace,
        objects: &mut Vec<ObjectDescriptor>,
    ) -> Result<()> {
        let rows = ctx.connection().query(MATVIEW_SQL).await?;
        for row in rows {
            let schema = row.get(0);
            let Some(name) = row.get(1) else { continue };
            for obj in objects.iter_mut() {
                if obj.name == name
                    && obj.schema.as_deref() == schema
                    && obj.kind != ObjectKind::MaterializedView
                {
                    tracing::debug!(object = %obj.name, "reclassifying as materialized view");
                    obj.kind = ObjectKind::MaterializedView;
                }
            }
        }
        Ok(())
    }
}

const DOMAIN_SQL: &str = "SELECT domain_schema, domain_name \
     FROM information_schema.domains WHERE domain_name IS NOT NULL";

/// Domains never appear in the JDBC-style object listing, so they are
/// contributed here from `information_schema.domains`.
pub struct DomainExtender;

#[async_trait]
impl ObjectListExtender for DomainExtender {
    fn name(&self) -> &'static str {
        "postgres-domain-extender"
    }

    fn handles_kind(&self, kind: &ObjectKind) -> bool {
        *kind == ObjectKind::Domain
    }

    async fn extend(
        &self,
        ctx: &ExecutionContext,
        _settings: &SettingsNamespace,
        filter: &ListingFilter,
        objects: &mut Vec<ObjectDescriptor>,
    ) -> Result<()> {
        let rows = ctx.connection().query(DOMAIN_SQL).await?;
        for row in rows {
            let Some(name) = row.get(1) else { continue };
            if let Some(wanted) = &filter.schema {
                if row.get(0) != Some(wanted.as_str()) {
                    continue;
                }
            }
            let mut descriptor = ObjectDescriptor::new(name, ObjectKind::Domain);
            if let Some(schema) = row.get(0) {
                descriptor = descriptor.with_schema(schema);
            }
            if !objects.iter().any(|existing| existing.same_object(&descriptor)) {
                objects.push(descriptor);
            }
        }
        Ok(())
    }
}
