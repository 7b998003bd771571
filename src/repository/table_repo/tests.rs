use super::TableRepository;
use crate::domain::catalog::{Component, Platform, Release, StageName};
use crate::domain::tool_kit::ComponentVersion;
use crate::repository::entity::Entity;
use crate::repository::error::{DbErrorKind, RepositoryError, Severity};
use crate::schema::initialize_schema;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = crate::db::open_in_memory_connection().unwrap();
    initialize_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

#[test]
fn test_add_row_then_lookup_by_id_round_trip() {
    let conn = setup_test_db();
    let repo: TableRepository<Component> = TableRepository::new(conn);

    let added = repo
        .add_row(&Component::new("einstimer", Some("timing engine".to_string())), "alice")
        .unwrap();

    assert_eq!(added.id, 1);
    assert_eq!(added.audit.created_by.as_deref(), Some("alice"));
    assert!(added.audit.created_on.is_some());
    assert!(added.audit.updated_on.is_none());

    let found = repo.lookup_by_id(added.id).unwrap();
    assert_eq!(found, added);
}

#[test]
fn test_lookup_missing_id_is_severe_not_found() {
    let conn = setup_test_db();
    let repo: TableRepository<Release> = TableRepository::new(conn);

    let err = repo.lookup_by_id(999).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.severity(), Severity::Severe);
    assert!(repo.find_by_id(999).unwrap().is_none());
}

#[test]
fn test_next_id_sequential_never_collides() {
    let conn = setup_test_db();
    let repo: TableRepository<Release> = TableRepository::new(conn);

    assert_eq!(repo.next_id().unwrap(), 1);

    let mut ids = HashSet::new();
    for i in 0..20 {
        let r = repo
            .add_row(&Release::new(format!("14.{}", i), None), "alice")
            .unwrap();
        assert!(ids.insert(r.id), "重复 id: {}", r.id);
    }
    assert_eq!(ids.len(), 20);
    assert_eq!(repo.next_id().unwrap(), 21);
}

#[test]
fn test_next_id_after_hard_delete_of_max() {
    let conn = setup_test_db();
    let repo: TableRepository<Platform> = TableRepository::new(conn);

    let a = repo.add_row(&Platform::new("aix", None), "alice").unwrap();
    let b = repo.add_row(&Platform::new("linux", None), "alice").unwrap();
    repo.delete_row(b.id, "alice").unwrap();

    let c = repo.add_row(&Platform::new("windows", None), "alice").unwrap();
    assert_ne!(c.id, a.id);
    assert!(repo.find_by_id(c.id).unwrap().is_some());
}

#[test]
fn test_soft_delete_excluded_from_active_lookups() {
    let conn = setup_test_db();
    let repo: TableRepository<Component> = TableRepository::new(conn);

    let keep = repo.add_row(&Component::new("keep", None), "alice").unwrap();
    let gone = repo.add_row(&Component::new("gone", None), "alice").unwrap();

    repo.delete_row(gone.id, "bob").unwrap();

    // 按 id 仍可查到，并带删除审计
    let deleted = repo.lookup_by_id(gone.id).unwrap();
    assert!(deleted.is_deleted());
    assert_eq!(deleted.audit.deleted_by.as_deref(), Some("bob"));

    // 有效查询排除
    let active = repo.list_active().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, keep.id);
    assert!(repo.find_by_name("gone").unwrap().is_none());
    assert_eq!(repo.count_active().unwrap(), 1);
    assert_eq!(repo.list_all().unwrap().len(), 2);

    // 重复删除视为未找到
    assert!(repo.delete_row(gone.id, "bob").unwrap_err().is_not_found());
}

#[test]
fn test_restore_row() {
    let conn = setup_test_db();
    let repo: TableRepository<Component> = TableRepository::new(conn);

    let c = repo.add_row(&Component::new("vim", None), "alice").unwrap();
    repo.delete_row(c.id, "alice").unwrap();

    let restored = repo.restore_row(c.id, "carol").unwrap();
    assert!(!restored.is_deleted());
    assert_eq!(restored.audit.updated_by.as_deref(), Some("carol"));
    assert_eq!(repo.lookup_by_name("vim").unwrap().id, c.id);

    // 未删除的记录不可恢复
    assert!(repo.restore_row(c.id, "carol").unwrap_err().is_not_found());
}

#[test]
fn test_restore_on_hard_delete_table_rejected() {
    let conn = setup_test_db();
    let repo: TableRepository<Platform> = TableRepository::new(conn);

    let err = repo.restore_row(1, "alice").unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError(_)));
}

#[test]
fn test_hard_delete_removes_row() {
    let conn = setup_test_db();
    let repo: TableRepository<Platform> = TableRepository::new(conn);

    let p = repo
        .add_row(&Platform::new("64-bit Linux", Some("64-linux50".to_string())), "alice")
        .unwrap();
    assert_eq!(p.short_name.as_deref(), Some("64-linux50"));

    repo.delete_row(p.id, "alice").unwrap();
    assert!(repo.find_by_id(p.id).unwrap().is_none());
    assert!(repo.delete_row(p.id, "alice").unwrap_err().is_not_found());
}

#[test]
fn test_update_row_sets_updated_audit() {
    let conn = setup_test_db();
    let repo: TableRepository<Component> = TableRepository::new(conn);

    let mut c = repo.add_row(&Component::new("hdl", None), "alice").unwrap();
    c.description = Some("HDL compiler".to_string());

    let updated = repo.update_row(&c, "bob").unwrap();
    assert_eq!(updated.description.as_deref(), Some("HDL compiler"));
    assert_eq!(updated.audit.updated_by.as_deref(), Some("bob"));
    assert_eq!(updated.audit.created_by.as_deref(), Some("alice"));
}

#[test]
fn test_update_deleted_row_is_not_found() {
    let conn = setup_test_db();
    let repo: TableRepository<Component> = TableRepository::new(conn);

    let c = repo.add_row(&Component::new("old", None), "alice").unwrap();
    repo.delete_row(c.id, "alice").unwrap();

    assert!(repo.update_row(&c, "alice").unwrap_err().is_not_found());
}

#[test]
fn test_unique_name_violation_is_classified() {
    let conn = setup_test_db();
    let repo: TableRepository<Component> = TableRepository::new(conn);

    repo.add_row(&Component::new("dup", None), "alice").unwrap();
    let err = repo.add_row(&Component::new("dup", None), "alice").unwrap_err();

    assert_eq!(err.db_kind(), Some(DbErrorKind::UniqueConstraint));
    assert_eq!(err.severity(), Severity::Severe);
    assert!(err.to_string().contains("Component::add_row"));
}

#[test]
fn test_name_of_soft_deleted_row_can_be_reused() {
    let conn = setup_test_db();
    let repo: TableRepository<Component> = TableRepository::new(conn);

    let old = repo.add_row(&Component::new("einstimer", None), "alice").unwrap();
    repo.delete_row(old.id, "alice").unwrap();

    let again = repo.add_row(&Component::new("einstimer", None), "bob").unwrap();
    assert_ne!(again.id, old.id);
    assert_eq!(repo.lookup_by_name("einstimer").unwrap().id, again.id);

    // 同名有效记录存在时，旧行不能恢复
    let err = repo.restore_row(old.id, "alice").unwrap_err();
    assert_eq!(err.db_kind(), Some(DbErrorKind::UniqueConstraint));
    assert!(repo.lookup_by_id(old.id).unwrap().is_deleted());
}

#[test]
fn test_update_columns_keeps_other_columns() {
    let conn = setup_test_db();
    let repo: TableRepository<Component> = TableRepository::new(conn);

    let c = repo
        .add_row(&Component::new("einstimer", Some("v1".to_string())), "alice")
        .unwrap();
    let stale = c.clone();

    let mut renamed = c.clone();
    renamed.name = "einstimer2".to_string();
    repo.update_row(&renamed, "alice").unwrap();

    let updated = repo
        .update_columns(stale.id, &[("description", Value::Text("v2".to_string()))], "bob")
        .unwrap();
    assert_eq!(updated.name, "einstimer2");
    assert_eq!(updated.description.as_deref(), Some("v2"));
    assert_eq!(updated.audit.updated_by.as_deref(), Some("bob"));
}

#[test]
fn test_update_columns_rejects_unknown_or_deleted() {
    let conn = setup_test_db();
    let repo: TableRepository<Component> = TableRepository::new(conn);

    let c = repo.add_row(&Component::new("old", None), "alice").unwrap();

    let err = repo
        .update_columns(c.id, &[("component_id", Value::Integer(9))], "alice")
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError(_)));
    assert!(matches!(
        repo.update_columns(c.id, &[], "alice").unwrap_err(),
        RepositoryError::ValidationError(_)
    ));

    repo.delete_row(c.id, "alice").unwrap();
    let err = repo
        .update_columns(c.id, &[("description", Value::Null)], "alice")
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(repo
        .update_columns(404, &[("description", Value::Null)], "alice")
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_foreign_key_violation_is_classified() {
    let conn = setup_test_db();
    let repo: TableRepository<ComponentVersion> = TableRepository::new(conn);

    let err = repo
        .add_row(&ComponentVersion::new(404, 404, None), "alice")
        .unwrap_err();
    assert_eq!(err.db_kind(), Some(DbErrorKind::ForeignKey));
}

#[test]
fn test_lookup_by_name_without_name_column() {
    let conn = setup_test_db();
    let repo: TableRepository<ComponentVersion> = TableRepository::new(conn);

    let err = repo.lookup_by_name("x").unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError(_)));
}

#[test]
fn test_seeded_dictionary_and_keyed_lookup() {
    let conn = setup_test_db();
    let repo: TableRepository<StageName> = TableRepository::new(conn);

    let prod = repo.lookup_by_name("PRODUCTION").unwrap();
    assert_eq!(prod.id, 3);

    let keyed = repo.keyed_active().unwrap();
    assert_eq!(keyed.len(), 3);
    assert_eq!(keyed.get("1").map(|s| s.name.as_str()), Some("DEVELOPMENT"));
    assert_eq!(keyed["3"].id_key(), "3");
}
