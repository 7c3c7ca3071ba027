//! Integration tests for transparent soft deletion.

use fadedb::{
    decode_row, Engine, EntityDef, ExecutionPipeline, FieldDef, FilterExpr, Instance, Predicate,
    RelationDef, ScalarType, Schema, SelectQuery, SoftDeleteRegistry, SoftDeleteRewriter,
    SourceRef, StorageConfig, Value,
};
use std::sync::Arc;

fn blog_schema() -> Schema {
    let user = EntityDef::new("User", "id")
        .with_table("users")
        .with_field(FieldDef::scalar("id", ScalarType::Uuid))
        .with_field(FieldDef::scalar("name", ScalarType::String))
        .with_field(FieldDef::scalar("age", ScalarType::Int32))
        .with_field(FieldDef::optional_scalar("deleted_at", ScalarType::Timestamp))
        .with_soft_delete();

    let post = EntityDef::new("Post", "id")
        .with_table("posts")
        .with_field(FieldDef::scalar("id", ScalarType::Uuid))
        .with_field(FieldDef::scalar("author_id", ScalarType::Uuid))
        .with_field(FieldDef::scalar("title", ScalarType::String))
        .with_field(FieldDef::optional_scalar("deleted_at", ScalarType::Timestamp))
        .with_soft_delete();

    let audit = EntityDef::new("AuditLog", "id")
        .with_table("audit_log")
        .with_field(FieldDef::scalar("id", ScalarType::Uuid))
        .with_field(FieldDef::scalar("message", ScalarType::String));

    Schema::new()
        .with_entity(user)
        .with_entity(post)
        .with_entity(audit)
        .with_relation(RelationDef::has_many(
            "posts", "User", "id", "Post", "author_id",
        ))
}

fn open_engine() -> Engine {
    Engine::open(StorageConfig::temporary(), blog_schema()).unwrap()
}

fn insert_user(engine: &Engine, name: &str, age: i32) -> [u8; 16] {
    let mut session = engine.session();
    let mut user = Instance::new("User")
        .with_value("name", name)
        .with_value("age", age);
    session.add(&mut user).unwrap();
    session.commit().unwrap();
    user.get("id").and_then(Value::as_uuid).unwrap()
}

fn insert_post(engine: &Engine, author_id: [u8; 16], title: &str) -> [u8; 16] {
    let mut session = engine.session();
    let mut post = Instance::new("Post")
        .with_value("author_id", author_id)
        .with_value("title", title);
    session.add(&mut post).unwrap();
    session.commit().unwrap();
    post.get("id").and_then(Value::as_uuid).unwrap()
}

fn delete_by_id(engine: &Engine, entity: &str, id: [u8; 16]) {
    let mut session = engine.session();
    let mut instance = session.get(entity, id).unwrap().unwrap();
    session.delete(&mut instance).unwrap();
    session.commit().unwrap();
}

// ============== Tests ==============

#[test]
fn test_deleted_rows_vanish_from_reads() {
    let engine = open_engine();
    let _alice = insert_user(&engine, "Alice", 30);
    let bob = insert_user(&engine, "Bob", 25);

    delete_by_id(&engine, "User", bob);

    let session = engine.session();
    let users = session.query("User").all().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].get("name"), Some(&Value::String("Alice".into())));

    assert!(session.get("User", bob).unwrap().is_none());
}

#[test]
fn test_deleted_row_remains_in_storage() {
    let engine = open_engine();
    insert_user(&engine, "Alice", 30);
    let bob = insert_user(&engine, "Bob", 25);

    delete_by_id(&engine, "User", bob);

    // The row is still physically present.
    assert_eq!(engine.storage().count_table("users").unwrap(), 2);

    // And its deletion timestamp is set.
    let record = engine
        .storage()
        .scan_table("users")
        .map(|r| r.unwrap())
        .find(|(id, _)| *id == bob)
        .map(|(_, record)| record)
        .unwrap();
    let fields = decode_row(&record.data).unwrap();
    let deleted_at = fields.iter().find(|(name, _)| name == "deleted_at");
    assert!(matches!(deleted_at, Some((_, Value::Timestamp(_)))));
}

#[test]
fn test_escape_hatch_returns_deleted() {
    let engine = open_engine();
    insert_user(&engine, "Alice", 30);
    let bob = insert_user(&engine, "Bob", 25);

    delete_by_id(&engine, "User", bob);

    let session = engine.session();
    let users = session.query("User").with_deleted_at().all().unwrap();
    assert_eq!(users.len(), 2);

    let deleted: Vec<_> = users
        .iter()
        .filter(|u| matches!(u.get("deleted_at"), Some(Value::Timestamp(_))))
        .collect();
    assert_eq!(deleted.len(), 1);
    assert_eq!(
        deleted[0].get("name"),
        Some(&Value::String("Bob".into()))
    );
}

#[test]
fn test_caller_filters_combine_with_injection() {
    let engine = open_engine();
    insert_user(&engine, "Alice", 30);
    let bob = insert_user(&engine, "Bob", 35);
    insert_user(&engine, "Carol", 40);

    delete_by_id(&engine, "User", bob);

    // Bob matches the age filter but stays hidden.
    let session = engine.session();
    let users = session
        .query("User")
        .filter(FilterExpr::gt("users.age", 28i32))
        .all()
        .unwrap();
    assert_eq!(users.len(), 2); // Alice and Carol

    // With the escape hatch the same filter sees all three.
    let users = session
        .query("User")
        .filter(FilterExpr::gt("users.age", 28i32))
        .with_deleted_at()
        .all()
        .unwrap();
    assert_eq!(users.len(), 3);
}

#[test]
fn test_filter_matching_deleted_row_finds_nothing() {
    let engine = open_engine();
    insert_user(&engine, "John", 41);
    let karen = insert_user(&engine, "Karen", 37);

    delete_by_id(&engine, "User", karen);

    let session = engine.session();

    // Filtering for the deleted row by name comes back empty.
    let by_name = session
        .query("User")
        .filter(FilterExpr::eq("users.name", "Karen"))
        .all()
        .unwrap();
    assert!(by_name.is_empty());

    // The live row is unaffected.
    let john = session
        .query("User")
        .filter(FilterExpr::eq("users.name", "John"))
        .all()
        .unwrap();
    assert_eq!(john.len(), 1);

    // Opting in finds the deleted row again.
    let karen_rows = session
        .query("User")
        .filter(FilterExpr::eq("users.name", "Karen"))
        .with_deleted_at()
        .all()
        .unwrap();
    assert_eq!(karen_rows.len(), 1);
}

#[test]
fn test_caller_null_filter_survives_escape_hatch() {
    let engine = open_engine();
    insert_user(&engine, "Alice", 30);
    let bob = insert_user(&engine, "Bob", 25);

    delete_by_id(&engine, "User", bob);

    // A hand-written null check is a caller filter, not an injected one,
    // so the escape hatch must not strip it.
    let session = engine.session();
    let users = session
        .query("User")
        .filter(FilterExpr::is_null("users.deleted_at"))
        .with_deleted_at()
        .all()
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].get("name"), Some(&Value::String("Alice".into())));
}

#[test]
fn test_join_filters_both_sides() {
    let engine = open_engine();
    let alice = insert_user(&engine, "Alice", 30);
    insert_post(&engine, alice, "first");
    let second = insert_post(&engine, alice, "second");

    let session = engine.session();
    assert_eq!(session.query("User").join("Post").count().unwrap(), 2);

    // Deleting a post removes its combined rows.
    delete_by_id(&engine, "Post", second);
    assert_eq!(session.query("User").join("Post").count().unwrap(), 1);

    // Deleting the user removes the rest.
    delete_by_id(&engine, "User", alice);
    assert_eq!(session.query("User").join("Post").count().unwrap(), 0);
}

#[test]
fn test_raw_table_query_gets_filtered() {
    let engine = open_engine();
    insert_user(&engine, "Alice", 30);
    let bob = insert_user(&engine, "Bob", 25);

    delete_by_id(&engine, "User", bob);

    // A query built without the builder still goes through the rewriter.
    let rows = engine.execute(SelectQuery::from_table("users")).unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_include_deleted_flag_respected() {
    let engine = open_engine();
    insert_user(&engine, "Alice", 30);
    let bob = insert_user(&engine, "Bob", 25);

    delete_by_id(&engine, "User", bob);

    let rows = engine
        .execute(SelectQuery::from_table("users").including_deleted())
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_aliased_scan_is_exempt() {
    let engine = open_engine();
    insert_user(&engine, "Alice", 30);
    let bob = insert_user(&engine, "Bob", 25);

    delete_by_id(&engine, "User", bob);

    // Aliased sources are outside the rewriter's contract.
    let rows = engine
        .execute(SelectQuery::from_source(SourceRef::table_alias(
            "users", "u",
        )))
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_derived_scan_is_exempt() {
    let engine = open_engine();
    insert_user(&engine, "Alice", 30);
    let bob = insert_user(&engine, "Bob", 25);

    delete_by_id(&engine, "User", bob);

    let inner = SelectQuery::from_table("users");
    let rows = engine
        .execute(SelectQuery::from_source(SourceRef::derived(inner, "d")))
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_rewrite_applied_once() {
    let registry = Arc::new(SoftDeleteRegistry::from_schema(&blog_schema()));
    let mut pipeline = ExecutionPipeline::new();
    pipeline.register(Arc::new(SoftDeleteRewriter::new(registry)));

    let mut query = SelectQuery::from_table("users");
    pipeline.apply(&mut query);
    pipeline.apply(&mut query);

    let tags = query
        .predicates
        .iter()
        .filter(|p| matches!(p, Predicate::SoftDelete { .. }))
        .count();
    assert_eq!(tags, 1);
}

#[test]
fn test_mistyped_timestamp_column_still_hides() {
    // deleted_at declared as a string: the marker still gates visibility.
    let schema = Schema::new().with_entity(
        EntityDef::new("Note", "id")
            .with_table("notes")
            .with_field(FieldDef::scalar("id", ScalarType::Uuid))
            .with_field(FieldDef::scalar("body", ScalarType::String))
            .with_field(FieldDef::scalar("deleted_at", ScalarType::String))
            .with_soft_delete(),
    );
    let engine = Engine::open(StorageConfig::temporary(), schema).unwrap();

    let mut session = engine.session();
    let mut note = Instance::new("Note").with_value("body", "text");
    session.add(&mut note).unwrap();
    session.commit().unwrap();

    session.delete(&mut note).unwrap();
    session.commit().unwrap();

    assert!(session.query("Note").all().unwrap().is_empty());
    assert_eq!(session.query("Note").with_deleted_at().count().unwrap(), 1);
}

#[test]
fn test_custom_deletion_column() {
    let schema = Schema::new().with_entity(
        EntityDef::new("Draft", "id")
            .with_table("drafts")
            .with_field(FieldDef::scalar("id", ScalarType::Uuid))
            .with_field(FieldDef::scalar("title", ScalarType::String))
            .with_field(FieldDef::optional_scalar("removed_at", ScalarType::Timestamp))
            .with_soft_delete_column("removed_at"),
    );
    let engine = Engine::open(StorageConfig::temporary(), schema).unwrap();

    let mut session = engine.session();
    let mut draft = Instance::new("Draft").with_value("title", "wip");
    session.add(&mut draft).unwrap();
    session.commit().unwrap();

    session.delete(&mut draft).unwrap();
    session.commit().unwrap();

    assert!(matches!(
        draft.get("removed_at"),
        Some(Value::Timestamp(_))
    ));
    assert!(session.query("Draft").all().unwrap().is_empty());
    assert_eq!(session.query("Draft").with_deleted_at().count().unwrap(), 1);
}

#[test]
fn test_marked_entity_without_column_hard_deletes() {
    // Soft delete marked but the column is not defined: deletes fall back
    // to physical removal.
    let schema = Schema::new().with_entity(
        EntityDef::new("Ephemeral", "id")
            .with_table("ephemeral")
            .with_field(FieldDef::scalar("id", ScalarType::Uuid))
            .with_field(FieldDef::scalar("label", ScalarType::String))
            .with_soft_delete(),
    );
    let engine = Engine::open(StorageConfig::temporary(), schema).unwrap();

    let mut session = engine.session();
    let mut row = Instance::new("Ephemeral").with_value("label", "x");
    session.add(&mut row).unwrap();
    session.commit().unwrap();

    session.delete(&mut row).unwrap();
    session.commit().unwrap();

    assert_eq!(engine.storage().count_table("ephemeral").unwrap(), 0);
    assert!(session
        .query("Ephemeral")
        .with_deleted_at()
        .all()
        .unwrap()
        .is_empty());
}

#[test]
fn test_clearing_timestamp_restores_row() {
    let engine = open_engine();
    let bob = insert_user(&engine, "Bob", 25);
    delete_by_id(&engine, "User", bob);

    let mut session = engine.session();
    assert!(session.get("User", bob).unwrap().is_none());

    // Load through the escape hatch, clear the timestamp, write back.
    let mut restored = session
        .query("User")
        .with_deleted_at()
        .first()
        .unwrap()
        .unwrap();
    restored.set("deleted_at", Value::Null);
    session.update(&restored).unwrap();
    session.commit().unwrap();

    let found = session.get("User", bob).unwrap();
    assert_eq!(
        found.unwrap().get("name"),
        Some(&Value::String("Bob".into()))
    );
}

#[test]
fn test_non_capable_entity_untouched_by_rewriter() {
    let engine = open_engine();

    let mut session = engine.session();
    let mut entry = Instance::new("AuditLog").with_value("message", "created");
    session.add(&mut entry).unwrap();
    session.commit().unwrap();

    // No deletion filter exists for audit_log.
    let query = session.query("AuditLog").build().unwrap();
    assert!(query.predicates.is_empty());
    assert_eq!(session.query("AuditLog").count().unwrap(), 1);
}
