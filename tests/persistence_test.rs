// ==========================================
// 文件数据库持久化测试
// ==========================================
// 测试目标: 重新打开数据库后数据、字典与主键序列保持一致
// ==========================================


use tempfile::NamedTempFile;
use test_helpers::test_config;
use tk_release_db::domain::{Component, Platform, StageName};
use tk_release_db::repository::raw;
use tk_release_db::repository::tables::COMPONENT;
use tk_release_db::{DbSession, Entity};

#[test]
fn test_reopen_keeps_rows_and_sequence() {
    let tmp = NamedTempFile::new().unwrap();
    let config = test_config(tmp.path().to_str().unwrap());

    let deleted_id = {
        let session = DbSession::open(&config).unwrap();
        let repo = session.table::<Component>();
        repo.add_row(&Component::new("einstimer", None), session.actor())
            .unwrap();
        let second = repo
            .add_row(&Component::new("hdlc", None), session.actor())
            .unwrap();
        repo.delete_row(second.id, session.actor()).unwrap();
        second.id
    };

    // 重新打开: 建表幂等，字典不重复
    let session = DbSession::open(&config).unwrap();
    assert_eq!(session.table::<StageName>().list_active().unwrap().len(), 3);

    let repo = session.table::<Component>();
    assert_eq!(repo.count_active().unwrap(), 1);
    assert!(repo.lookup_by_id(deleted_id).unwrap().is_deleted());

    // 软删除的行仍占用主键
    let next = repo
        .add_row(&Component::new("vhdl", None), session.actor())
        .unwrap();
    assert_eq!(next.id, deleted_id + 1);
}

#[test]
fn test_export_csv_to_file() {
    let tmp = NamedTempFile::new().unwrap();
    let config = test_config(tmp.path().to_str().unwrap());
    let session = DbSession::open(&config).unwrap();

    session
        .table::<Component>()
        .add_row(&Component::new("einstimer", Some("timing, static".to_string())), "alice")
        .unwrap();

    let out = NamedTempFile::new().unwrap();
    let file = out.reopen().unwrap();
    let rows = session
        .with_connection(|conn| raw::export_csv(conn, &COMPONENT, true, file))
        .unwrap();
    assert_eq!(rows, 1);

    let mut reader = csv::Reader::from_path(out.path()).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "component_id");
    assert_eq!(&headers[1], "name");

    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(&record[1], "einstimer");
    assert_eq!(&record[2], "timing, static");
    assert_eq!(&record[3], "alice");
}

#[test]
fn test_created_only_table_hard_deletes() {
    let tmp = NamedTempFile::new().unwrap();
    let session = DbSession::open(&test_config(tmp.path().to_str().unwrap())).unwrap();
    let repo = session.table::<Platform>();

    let p = repo
        .add_row(&Platform::new("64-bit AIX", Some("64-aix".to_string())), "alice")
        .unwrap();
    assert_eq!(repo.find_by_name("64-bit AIX").unwrap().map(|x| x.id), Some(p.id));

    repo.delete_row(p.id, "alice").unwrap();
    assert!(repo.find_by_id(p.id).unwrap().is_none());
}
