//! End-to-end coordinator tests against a scripted connection.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use dialekt_core::testing::ScriptedConnection;
use dialekt_core::{DialectId, MetadataRow, ObjectDescriptor, ObjectKind};
use dialekt_dialect::{DialectCoordinator, ExtensionRegistry};
use dialekt_settings::builtin_defaults;

async fn coordinator_for(conn: ScriptedConnection) -> DialectCoordinator {
    let registry = ExtensionRegistry::with_defaults();
    DialectCoordinator::connect(Arc::new(conn), Arc::new(builtin_defaults()), &registry)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_handshake_resolves_dialect_and_band() {
    let conn = ScriptedConnection::new("PostgreSQL", "9.1.24");
    let coordinator = coordinator_for(conn).await;
    assert_eq!(*coordinator.dialect(), DialectId::POSTGRESQL);
    // The 9.1 band unlocks extension support; the 8.x bands do not.
    assert!(coordinator.settings().get_bool("supports_extensions", false));
}

#[tokio::test]
async fn test_band_stays_below_actual_version() {
    let conn = ScriptedConnection::new("PostgreSQL", "8.4.0");
    let coordinator = coordinator_for(conn).await;
    assert!(!coordinator.settings().get_bool("supports_extensions", true));
    // 8.3 qualifies for 8.4, so window functions are on.
    assert!(coordinator.settings().get_bool("window.functions", false));
}

#[tokio::test]
async fn test_listing_merges_sequences_and_dedupes() {
    let mut conn = ScriptedConnection::new("PostgreSQL", "15.2")
        .with_object(ObjectDescriptor::new("customers", ObjectKind::Table))
        .with_object(ObjectDescriptor::new("orders_view", ObjectKind::View));
    conn.sequences = Some(vec![
        ObjectDescriptor::new("customers_id_seq", ObjectKind::Sequence),
        // Already known from the native listing by name+schema+catalog.
        ObjectDescriptor::new("customers", ObjectKind::Table),
    ]);
    let coordinator = coordinator_for(conn).await;
    let objects = coordinator
        .list_objects(
            None,
            None,
            None,
            &[ObjectKind::Table, ObjectKind::View, ObjectKind::Sequence],
        )
        .await
        .unwrap();
    let names: Vec<&str> = objects.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["customers", "orders_view", "customers_id_seq"]);
}

#[tokio::test]
async fn test_listing_is_idempotent() {
    let conn = ScriptedConnection::new("PostgreSQL", "15.2")
        .with_object(ObjectDescriptor::new("customers", ObjectKind::Table));
    let coordinator = coordinator_for(conn).await;
    let first = coordinator
        .list_objects(None, None, None, &[ObjectKind::Table])
        .await
        .unwrap();
    let second = coordinator
        .list_objects(None, None, None, &[ObjectKind::Table])
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unsupported_sequences_degrade_to_native_listing() {
    // sequences stays None, so the augmentation call reports Unsupported.
    let conn = ScriptedConnection::new("PostgreSQL", "15.2")
        .with_object(ObjectDescriptor::new("customers", ObjectKind::Table));
    let coordinator = coordinator_for(conn).await;
    let objects = coordinator
        .list_objects(None, None, None, &[ObjectKind::Table, ObjectKind::Sequence])
        .await
        .unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].name, "customers");
}

#[tokio::test]
async fn test_matview_enhancer_reclassifies() {
    let conn = ScriptedConnection::new("PostgreSQL", "15.2")
        .with_object(ObjectDescriptor::new("sales_summary", ObjectKind::Table).with_schema("public"))
        .with_object(ObjectDescriptor::new("customers", ObjectKind::Table).with_schema("public"))
        .with_query_result(
            "SELECT schemaname, matviewname FROM pg_catalog.pg_matviews",
            vec![MetadataRow::from_strs(&["public", "sales_summary"])],
        );
    let coordinator = coordinator_for(conn).await;
    let objects = coordinator
        .list_objects(None, None, None, &[ObjectKind::Table])
        .await
        .unwrap();
    let summary = objects.iter().find(|o| o.name == "sales_summary").unwrap();
    assert_eq!(summary.kind, ObjectKind::MaterializedView);
    let customers = objects.iter().find(|o| o.name == "customers").unwrap();
    assert_eq!(customers.kind, ObjectKind::Table);
}

#[tokio::test]
async fn test_matview_enhancer_gated_below_9_3() {
    let conn = ScriptedConnection::new("PostgreSQL", "9.2.4")
        .with_object(ObjectDescriptor::new("sales_summary", ObjectKind::Table).with_schema("public"));
    let coordinator = coordinator_for(conn).await;
    // No pg_matviews query is scripted; on 9.2 the enhancer must not
    // even run, so the listing succeeds untouched.
    let objects = coordinator
        .list_objects(None, None, None, &[ObjectKind::Table])
        .await
        .unwrap();
    assert_eq!(objects[0].kind, ObjectKind::Table);
}

#[tokio::test]
async fn test_domain_extender_skips_native_call() {
    let conn = Arc::new(ScriptedConnection::new("PostgreSQL", "15.2").with_query_result(
        "SELECT domain_schema, domain_name FROM information_schema.domains WHERE domain_name IS NOT NULL",
        vec![MetadataRow::from_strs(&["public", "us_postal_code"])],
    ));
    let registry = ExtensionRegistry::with_defaults();
    let coordinator =
        DialectCoordinator::connect(conn.clone(), Arc::new(builtin_defaults()), &registry)
            .await
            .unwrap();
    let objects = coordinator
        .list_objects(None, None, None, &[ObjectKind::Domain])
        .await
        .unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].kind, ObjectKind::Domain);
    // The extender owns the Domain kind, so the driver listing is
    // never invoked.
    assert_eq!(conn.listing_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_recycle_bin_cleaner_runs_last() {
    let conn = ScriptedConnection::new("Oracle", "19.0")
        .with_object(ObjectDescriptor::new("EMPLOYEES", ObjectKind::Table))
        .with_object(ObjectDescriptor::new("BIN$abcdef==$0", ObjectKind::Table));
    let coordinator = coordinator_for(conn).await;
    let objects = coordinator
        .list_objects(None, None, None, &[ObjectKind::Table])
        .await
        .unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].name, "EMPLOYEES");
}

#[tokio::test]
async fn test_underscore_escaped_when_dialect_asks() {
    let conn = ScriptedConnection::new("MySQL", "8.0.33")
        .with_object(ObjectDescriptor::new("MY_TABLE", ObjectKind::Table))
        .with_object(ObjectDescriptor::new("MYXTABLE", ObjectKind::Table));
    let coordinator = coordinator_for(conn).await;
    let objects = coordinator
        .list_objects(None, None, Some("MY_TABLE"), &[ObjectKind::Table])
        .await
        .unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].name, "MY_TABLE");
}

#[tokio::test]
async fn test_star_pattern_means_everything() {
    let conn = ScriptedConnection::new("PostgreSQL", "15.2")
        .with_object(ObjectDescriptor::new("a", ObjectKind::Table))
        .with_object(ObjectDescriptor::new("b", ObjectKind::Table));
    let coordinator = coordinator_for(conn).await;
    let objects = coordinator
        .list_objects(None, None, Some("*"), &[ObjectKind::Table])
        .await
        .unwrap();
    assert_eq!(objects.len(), 2);
}

#[tokio::test]
async fn test_synonym_resolution_degrades_to_input() {
    let mut conn = ScriptedConnection::new("Oracle", "19.0");
    conn.synonym_targets.insert(
        "EMP_SYN".to_string(),
        ObjectDescriptor::new("EMPLOYEES", ObjectKind::Table),
    );
    let coordinator = coordinator_for(conn).await;

    let good = ObjectDescriptor::new("EMP_SYN", ObjectKind::Synonym);
    let resolved = coordinator.resolve_synonym(&good).await;
    assert_eq!(resolved.name, "EMPLOYEES");

    let broken = ObjectDescriptor::new("DANGLING", ObjectKind::Synonym);
    let resolved = coordinator.resolve_synonym(&broken).await;
    assert_eq!(resolved.name, "DANGLING");
}

#[tokio::test]
async fn test_enum_fixup_restores_literal_list() {
    use dialekt_core::ColumnDescriptor;
    let conn = ScriptedConnection::new("MySQL", "8.0.33")
        .with_columns(
            "shirts",
            vec![
                ColumnDescriptor::new("id", 1, "int"),
                ColumnDescriptor::new("size", 2, "enum"),
            ],
        )
        .with_query_result(
            "SHOW COLUMNS FROM `shirts`",
            vec![
                MetadataRow::from_strs(&["id", "int", "NO", "PRI", "", ""]),
                MetadataRow::from_strs(&["size", "enum('S','M','L')", "YES", "", "", ""]),
            ],
        );
    let coordinator = coordinator_for(conn).await;
    let table = ObjectDescriptor::new("shirts", ObjectKind::Table);
    let columns = coordinator.object_columns(&table).await.unwrap();
    assert_eq!(columns[1].native_type, "enum('S','M','L')");
    assert_eq!(columns[0].native_type, "int");
}

#[tokio::test]
async fn test_listing_runs_under_savepoint_in_transaction() {
    let conn = ScriptedConnection::new("PostgreSQL", "15.2")
        .with_object(ObjectDescriptor::new("customers", ObjectKind::Table));
    let registry = ExtensionRegistry::with_defaults();
    let conn = Arc::new(conn);
    let coordinator = DialectCoordinator::connect(
        conn.clone(),
        Arc::new(builtin_defaults()),
        &registry,
    )
    .await
    .unwrap();
    coordinator
        .list_objects(None, None, None, &[ObjectKind::Table])
        .await
        .unwrap();
    let statements = conn.executed_statements();
    assert!(statements.iter().any(|sql| sql.starts_with("SAVEPOINT ")));
    assert!(statements.iter().any(|sql| sql.starts_with("RELEASE SAVEPOINT ")));
    assert_eq!(conn.listing_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_qualified_name_quotes_each_part() {
    let conn = ScriptedConnection::new("PostgreSQL", "15.2");
    let coordinator = coordinator_for(conn).await;
    let object = ObjectDescriptor::new("Order", ObjectKind::Table).with_schema("public");
    assert_eq!(coordinator.qualified_name(&object), "public.\"Order\"");
}
